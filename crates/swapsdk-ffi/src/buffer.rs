//! Buffer ownership bridge
//!
//! Structured data crosses the boundary inside a [`WireBuffer`]: a
//! {capacity, length, data} triple matching the C ABI. Buffers come in two
//! provenances. Native-owned buffers are allocated by the native library and
//! must be released through its free entry point exactly once. Host-owned
//! byte vectors stay under ordinary Rust ownership and never touch the
//! native allocator.
//!
//! [`BufferBridge`] holds the two native entry points and is the only way
//! native-owned buffers are created or released on this side.

use crate::gateway;
use crate::status::CallStatus;

/// Native allocation entry point: size in, fresh buffer out.
pub type AllocFn = unsafe extern "C" fn(i32, *mut CallStatus) -> WireBuffer;
/// Native release entry point. Valid at most once per buffer.
pub type FreeFn = unsafe extern "C" fn(WireBuffer, *mut CallStatus);

/// Byte region passed by value across the C ABI.
///
/// A null `data` pointer is the zero-length sentinel: it carries no native
/// allocation and must never be released. The borrow checker scopes
/// [`WireBuffer::as_slice`] views, but nothing at runtime stops a view from
/// being taken again after [`BufferBridge::release`]; callers keep views
/// inside the call that produced the buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct WireBuffer {
    capacity: i32,
    len: i32,
    data: *mut u8,
}

// Safety: WireBuffer is a plain {capacity, len, pointer} triple. The native
// library allows its buffers to be released from any thread.
unsafe impl Send for WireBuffer {}

impl WireBuffer {
    /// The no-allocation sentinel.
    pub fn empty() -> Self {
        Self {
            capacity: 0,
            len: 0,
            data: std::ptr::null_mut(),
        }
    }

    /// Assemble a buffer from its wire parts, as a native allocator or a
    /// generated shim would.
    ///
    /// # Safety
    ///
    /// `data` must point to an allocation of at least `capacity` bytes with
    /// the first `len` initialized, or be null with both counts zero.
    pub unsafe fn from_raw_parts(capacity: i32, len: i32, data: *mut u8) -> Self {
        Self { capacity, len, data }
    }

    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    pub fn len(&self) -> i32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len <= 0
    }

    pub fn data(&self) -> *mut u8 {
        self.data
    }

    /// Non-owning view of the readable bytes. Empty for the sentinel.
    pub fn as_slice(&self) -> &[u8] {
        if self.data.is_null() || self.len <= 0 {
            return &[];
        }
        // Invariant: `data` points at `len` initialized bytes for as long as
        // the buffer has not been released.
        unsafe { std::slice::from_raw_parts(self.data, self.len as usize) }
    }
}

/// The pair of native entry points that create and destroy native-owned
/// buffers, plus the copy-in/copy-out helpers built on them.
#[derive(Clone, Copy)]
pub struct BufferBridge {
    alloc_fn: AllocFn,
    free_fn: FreeFn,
}

impl BufferBridge {
    /// # Safety contract (not enforced)
    ///
    /// Both function pointers must be the matching alloc/free pair exported
    /// by the same native library build.
    pub fn new(alloc_fn: AllocFn, free_fn: FreeFn) -> Self {
        Self { alloc_fn, free_fn }
    }

    /// Copy host bytes into a fresh native-owned buffer, for arguments the
    /// native side takes ownership of during a call. Empty input yields the
    /// sentinel.
    pub fn allocate_from_bytes(&self, bytes: &[u8]) -> WireBuffer {
        if bytes.is_empty() {
            return WireBuffer::empty();
        }
        let size = i32::try_from(bytes.len()).unwrap_or_else(|_| {
            panic!("payload of {} bytes exceeds the i32 buffer limit", bytes.len())
        });
        let mut buffer =
            gateway::invoke_infallible(self, |status| unsafe { (self.alloc_fn)(size, status) });
        debug_assert!(buffer.capacity >= size, "native allocator returned a short buffer");
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer.data, bytes.len());
        }
        buffer.len = size;
        buffer
    }

    /// Release a native-owned buffer. No-op for the sentinel. Calling this
    /// twice on the same buffer is a double free; the consume helpers below
    /// make that hard to do by taking the buffer by value.
    pub fn release(&self, buffer: WireBuffer) {
        if buffer.data.is_null() {
            return;
        }
        gateway::invoke_infallible(self, |status| unsafe { (self.free_fn)(buffer, status) });
    }

    /// Copy a native-owned buffer onto the host heap and release it. This is
    /// the standard way to consume a buffer returned from a native call.
    pub fn take_into_vec(&self, buffer: WireBuffer) -> Vec<u8> {
        let bytes = buffer.as_slice().to_vec();
        self.release(buffer);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sentinel_has_no_allocation() {
        let buffer = WireBuffer::empty();
        assert!(buffer.data().is_null());
        assert!(buffer.is_empty());
        assert_eq!(buffer.as_slice(), &[] as &[u8]);
    }

    #[test]
    fn test_release_of_sentinel_is_noop() {
        let bridge = testing::bridge();
        bridge.release(WireBuffer::empty());
    }

    #[test]
    fn test_allocate_copies_bytes() {
        let bridge = testing::bridge();
        let buffer = bridge.allocate_from_bytes(b"swap");
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.as_slice(), b"swap");
        bridge.release(buffer);
    }

    #[test]
    fn test_allocate_empty_returns_sentinel() {
        let bridge = testing::bridge();
        let buffer = bridge.allocate_from_bytes(&[]);
        assert!(buffer.data().is_null());
    }

    #[test]
    fn test_take_into_vec_roundtrips() {
        let bridge = testing::bridge();
        let buffer = bridge.allocate_from_bytes(&[1, 2, 3, 255]);
        assert_eq!(bridge.take_into_vec(buffer), vec![1, 2, 3, 255]);
    }
}
