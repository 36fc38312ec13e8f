//! In-process fake of the native library's allocation entry points
//!
//! Lets the marshaling core be exercised without a real shared object: the
//! fake alloc/free pair is Vec-backed, and [`counting_free`] records object
//! frees through the pointer itself so parallel tests never share state.

use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::buffer::{BufferBridge, WireBuffer};
use crate::status::CallStatus;

/// Fake native allocator: a fresh zero-length buffer of `size` capacity.
pub extern "C" fn fake_alloc(size: i32, _status: *mut CallStatus) -> WireBuffer {
    if size <= 0 {
        return WireBuffer::empty();
    }
    let mut storage = Vec::<u8>::with_capacity(size as usize);
    // The allocator may round up; the buffer must carry the capacity the
    // storage was actually created with for `fake_free` to reclaim it.
    let capacity = storage.capacity() as i32;
    let data = storage.as_mut_ptr();
    std::mem::forget(storage);
    unsafe { WireBuffer::from_raw_parts(capacity, 0, data) }
}

/// Fake native release: reclaims a buffer produced by [`fake_alloc`].
///
/// # Safety
///
/// `buffer` must come from [`fake_alloc`] and must not be used afterwards.
pub unsafe extern "C" fn fake_free(buffer: WireBuffer, _status: *mut CallStatus) {
    let data = buffer.data();
    if data.is_null() {
        return;
    }
    unsafe {
        drop(Vec::from_raw_parts(
            data,
            buffer.len().max(0) as usize,
            buffer.capacity().max(0) as usize,
        ));
    }
}

/// A [`BufferBridge`] over the fake entry points.
pub fn bridge() -> BufferBridge {
    BufferBridge::new(fake_alloc, fake_free)
}

/// Fake object destructor that counts invocations through the object
/// pointer, which must point at an `AtomicUsize` owned by the test.
///
/// # Safety
///
/// `pointer` must reference a live `AtomicUsize`.
pub unsafe extern "C" fn counting_free(pointer: *const c_void, _status: *mut CallStatus) {
    let counter = unsafe { &*(pointer as *const AtomicUsize) };
    counter.fetch_add(1, Ordering::SeqCst);
}
