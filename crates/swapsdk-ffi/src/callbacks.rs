//! Callback dispatch registry
//!
//! The native library calls back into Rust through one multiplexed reverse
//! entry point per interface: {handle, method index, argument bytes} in, an
//! output buffer and a result code out. [`CallbackRegistry`] owns the handle
//! table for one interface and implements that multiplexer.
//!
//! The registry is an explicitly constructed object. The bindings layer
//! builds one per interface at initialization and hands it to the
//! native-facing shim; there is no module-level global state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once, RwLock};

use crate::buffer::{BufferBridge, WireBuffer};
use crate::codec::lower_into_vec;

/// Callback completed; the output buffer holds the encoded return value.
pub const CALLBACK_SUCCESS: i32 = 0;
/// Callback reports a typed domain error, encoded in the output buffer.
pub const CALLBACK_ERROR: i32 = 1;
/// Callback failed in a way native code cannot handle (unknown method
/// index, uninformative failure). Treated as a fault on the native side.
pub const CALLBACK_UNEXPECTED: i32 = 2;

/// Reserved method index: native side is done with this handle.
pub const METHOD_FREE: i32 = 0;

/// Result of one demultiplexed callback method invocation.
pub enum CallbackOutcome {
    /// Encoded return value (empty for void methods).
    Success(Vec<u8>),
    /// Encoded typed error payload for a fallible method.
    DomainError(Vec<u8>),
    /// No usable result; the message is relayed for diagnostics only.
    Unexpected(String),
}

struct HandleTable<T: ?Sized> {
    by_handle: HashMap<u64, Arc<T>>,
    // Keyed by the Arc's data address, so re-lowering the same
    // implementation returns the handle already issued for it.
    by_identity: HashMap<usize, u64>,
}

impl<T: ?Sized> HandleTable<T> {
    fn new() -> Self {
        Self {
            by_handle: HashMap::new(),
            by_identity: HashMap::new(),
        }
    }
}

fn identity_of<T: ?Sized>(implementation: &Arc<T>) -> usize {
    Arc::as_ptr(implementation).cast::<()>() as usize
}

/// Handle table and multiplexer for one declared callback interface.
pub struct CallbackRegistry<T: ?Sized + Send + Sync> {
    table: RwLock<HandleTable<T>>,
    next_handle: AtomicU64,
    registered: Once,
}

impl<T: ?Sized + Send + Sync> CallbackRegistry<T> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HandleTable::new()),
            next_handle: AtomicU64::new(1),
            registered: Once::new(),
        }
    }

    /// Run `register_with_native` exactly once for this registry. The
    /// closure is expected to call the native init entry point that installs
    /// the reverse entry point for this interface; it must complete before
    /// any native call that might invoke a callback of this kind, so every
    /// caller blocks until the winning closure has returned.
    pub fn ensure_registered(&self, register_with_native: impl FnOnce()) {
        self.registered.call_once(|| {
            tracing::debug!("registering callback interface with native library");
            register_with_native();
        });
    }

    /// Lower an implementation to its integer handle. Idempotent: lowering
    /// the same `Arc` again returns the handle already issued. Handles are
    /// monotonically increasing and never reused.
    pub fn insert(&self, implementation: Arc<T>) -> u64 {
        let identity = identity_of(&implementation);
        let mut table = self.table.write().expect("callback handle table poisoned");
        if let Some(&handle) = table.by_identity.get(&identity) {
            return handle;
        }
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        table.by_handle.insert(handle, implementation);
        table.by_identity.insert(identity, handle);
        handle
    }

    /// Lift a handle back to its implementation. A miss means the native
    /// side referenced a handle this side never issued or already dropped,
    /// which is a protocol fault.
    pub fn get(&self, handle: u64) -> Arc<T> {
        let table = self.table.read().expect("callback handle table poisoned");
        match table.by_handle.get(&handle) {
            Some(implementation) => Arc::clone(implementation),
            None => panic!("native referenced unknown callback handle {handle}"),
        }
    }

    /// Drop a handle. No-op if it was already removed.
    pub fn remove(&self, handle: u64) {
        let mut table = self.table.write().expect("callback handle table poisoned");
        if let Some(implementation) = table.by_handle.remove(&handle) {
            table.by_identity.remove(&identity_of(&implementation));
            tracing::trace!(handle, "dropped callback handle");
        }
    }

    pub fn len(&self) -> usize {
        self.table
            .read()
            .expect("callback handle table poisoned")
            .by_handle
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Body of the multiplexed reverse entry point.
    ///
    /// Method index 0 drops the handle. Any other index is resolved by
    /// `demux`, the interface-specific decoder/invoker supplied by the
    /// generated layer; `demux` returns [`CallbackOutcome::Unexpected`] for
    /// out-of-range indices instead of invoking anything.
    ///
    /// The handle table lock is held only for the lookup, never across the
    /// callback invocation itself.
    pub fn dispatch<F>(
        &self,
        bridge: &BufferBridge,
        handle: u64,
        method: i32,
        args: &[u8],
        out_buf: &mut WireBuffer,
        demux: F,
    ) -> i32
    where
        F: FnOnce(&T, i32, &[u8]) -> CallbackOutcome,
    {
        if method == METHOD_FREE {
            self.remove(handle);
            *out_buf = WireBuffer::empty();
            return CALLBACK_SUCCESS;
        }
        let implementation = self.get(handle);
        match demux(&implementation, method, args) {
            CallbackOutcome::Success(bytes) => {
                *out_buf = bridge.allocate_from_bytes(&bytes);
                CALLBACK_SUCCESS
            }
            CallbackOutcome::DomainError(bytes) => {
                *out_buf = bridge.allocate_from_bytes(&bytes);
                CALLBACK_ERROR
            }
            CallbackOutcome::Unexpected(message) => {
                tracing::error!(handle, method, %message, "callback produced an unexpected result");
                *out_buf = bridge.allocate_from_bytes(&lower_into_vec(&message));
                CALLBACK_UNEXPECTED
            }
        }
    }
}

impl<T: ?Sized + Send + Sync> Default for CallbackRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::lift_from_slice;
    use crate::testing;
    use std::sync::atomic::AtomicUsize;

    trait Probe: Send + Sync {
        fn poke(&self) -> u32;
    }

    struct CountingProbe {
        value: u32,
        calls: AtomicUsize,
    }

    impl CountingProbe {
        fn new(value: u32) -> Arc<Self> {
            Arc::new(Self {
                value,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Probe for CountingProbe {
        fn poke(&self) -> u32 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.value
        }
    }

    // The trait object must be + 'static here: a bare `&dyn Probe` fn item
    // elaborates to a for<'a> signature that fails dispatch's FnOnce bound.
    fn demux_probe(probe: &(dyn Probe + 'static), method: i32, _args: &[u8]) -> CallbackOutcome {
        match method {
            1 => CallbackOutcome::Success(lower_into_vec(&probe.poke())),
            other => CallbackOutcome::Unexpected(format!("unknown method index {other}")),
        }
    }

    #[test]
    fn test_insert_is_idempotent_per_instance() {
        let registry = CallbackRegistry::<dyn Probe>::new();
        let probe = CountingProbe::new(7);
        let first = registry.insert(probe.clone());
        let second = registry.insert(probe);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_instances_get_distinct_handles() {
        let registry = CallbackRegistry::<dyn Probe>::new();
        let a = registry.insert(CountingProbe::new(1));
        let b = registry.insert(CountingProbe::new(2));
        assert_ne!(a, b);
        assert_eq!(registry.get(a).poke(), 1);
        assert_eq!(registry.get(b).poke(), 2);
    }

    #[test]
    #[should_panic(expected = "unknown callback handle")]
    fn test_get_unknown_handle_faults() {
        let registry = CallbackRegistry::<dyn Probe>::new();
        registry.get(99);
    }

    #[test]
    fn test_dispatch_invokes_method_and_encodes_result() {
        let registry = CallbackRegistry::<dyn Probe>::new();
        let bridge = testing::bridge();
        let probe = CountingProbe::new(41);
        let handle = registry.insert(probe.clone());

        let mut out = WireBuffer::empty();
        let code = registry.dispatch(&bridge, handle, 1, &[], &mut out, demux_probe);
        assert_eq!(code, CALLBACK_SUCCESS);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        let result: u32 = lift_from_slice(&bridge.take_into_vec(out));
        assert_eq!(result, 41);
    }

    #[test]
    fn test_dispatch_method_zero_drops_handle() {
        let registry = CallbackRegistry::<dyn Probe>::new();
        let bridge = testing::bridge();
        let handle = registry.insert(CountingProbe::new(0));

        let mut out = WireBuffer::empty();
        let code = registry.dispatch(&bridge, handle, METHOD_FREE, &[], &mut out, demux_probe);
        assert_eq!(code, CALLBACK_SUCCESS);
        assert!(out.data().is_null());
        assert!(registry.is_empty());

        // Dropping again is a no-op.
        let mut out = WireBuffer::empty();
        let code = registry.dispatch(&bridge, handle, METHOD_FREE, &[], &mut out, demux_probe);
        assert_eq!(code, CALLBACK_SUCCESS);
    }

    #[test]
    #[should_panic(expected = "unknown callback handle")]
    fn test_dispatch_after_drop_faults() {
        let registry = CallbackRegistry::<dyn Probe>::new();
        let bridge = testing::bridge();
        let handle = registry.insert(CountingProbe::new(0));
        registry.remove(handle);

        let mut out = WireBuffer::empty();
        registry.dispatch(&bridge, handle, 1, &[], &mut out, demux_probe);
    }

    #[test]
    fn test_dispatch_out_of_range_method_is_unexpected() {
        let registry = CallbackRegistry::<dyn Probe>::new();
        let bridge = testing::bridge();
        let probe = CountingProbe::new(0);
        let handle = registry.insert(probe.clone());

        let mut out = WireBuffer::empty();
        let code = registry.dispatch(&bridge, handle, 42, &[], &mut out, demux_probe);
        assert_eq!(code, CALLBACK_UNEXPECTED);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        let message: String = lift_from_slice(&bridge.take_into_vec(out));
        assert!(message.contains("42"));
    }

    #[test]
    fn test_concurrent_insertion_yields_stable_distinct_handles() {
        let registry = Arc::new(CallbackRegistry::<dyn Probe>::new());
        let workers: Vec<_> = (0..8)
            .map(|value| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let probe = CountingProbe::new(value);
                    let handle = registry.insert(probe.clone());
                    // Re-lowering from the same thread must be stable.
                    assert_eq!(registry.insert(probe), handle);
                    (handle, value)
                })
            })
            .collect();

        let mut seen = std::collections::HashSet::new();
        for worker in workers {
            let (handle, value) = worker.join().unwrap();
            assert!(seen.insert(handle), "handle {handle} issued twice");
            assert_eq!(registry.get(handle).poke(), value);
        }
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_ensure_registered_runs_once() {
        let registry = CallbackRegistry::<dyn Probe>::new();
        let runs = AtomicUsize::new(0);
        registry.ensure_registered(|| {
            runs.fetch_add(1, Ordering::SeqCst);
        });
        registry.ensure_registered(|| {
            runs.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ensure_registered_blocks_until_registration_completes() {
        use std::sync::atomic::AtomicBool;

        let registry = Arc::new(CallbackRegistry::<dyn Probe>::new());
        let started = Arc::new(AtomicBool::new(false));
        let completed = Arc::new(AtomicBool::new(false));

        let winner = {
            let registry = Arc::clone(&registry);
            let started = Arc::clone(&started);
            let completed = Arc::clone(&completed);
            std::thread::spawn(move || {
                registry.ensure_registered(|| {
                    started.store(true, Ordering::SeqCst);
                    std::thread::sleep(std::time::Duration::from_millis(200));
                    completed.store(true, Ordering::SeqCst);
                });
            })
        };

        while !started.load(Ordering::SeqCst) {
            std::thread::yield_now();
        }
        // The native init call is still running on the winner thread; a
        // second caller must not proceed until it has finished.
        registry.ensure_registered(|| {});
        assert!(
            completed.load(Ordering::SeqCst),
            "ensure_registered returned while registration was still running"
        );
        winner.join().unwrap();
    }

    #[test]
    fn test_handles_are_not_reused_after_removal() {
        let registry = CallbackRegistry::<dyn Probe>::new();
        let first = registry.insert(CountingProbe::new(1));
        registry.remove(first);
        let second = registry.insert(CountingProbe::new(2));
        assert!(second > first);
    }
}
