//! Object lifetime protocol for opaque native handles
//!
//! A native constructor returns an opaque pointer the host side must free
//! exactly once, while method calls may dereference it concurrently from
//! any thread. [`NativeObject`] enforces this with a live-call counter and
//! a destroyed flag, both atomic:
//!
//! - the counter starts at 1, the construction reference;
//! - every call path takes an [`ObjectGuard`] via [`NativeObject::acquire`],
//!   which holds a +1 for the entire native invocation;
//! - [`NativeObject::dispose`] flips the destroyed flag (one winner) and
//!   drops the construction reference;
//! - whichever release drives the counter to zero invokes the native free
//!   function, and only that one.
//!
//! Using an object after disposal is a protocol fault and panics.

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::status::{CallStatus, CALL_SUCCESS};

/// Native destructor for one object kind.
pub type ObjectFreeFn = unsafe extern "C" fn(*const c_void, *mut CallStatus);

/// An opaque native-allocated object exposed to Rust as a handle.
pub struct NativeObject {
    pointer: *const c_void,
    live_calls: AtomicI64,
    destroyed: AtomicBool,
    free_fn: ObjectFreeFn,
}

// Safety: the native library guarantees its objects may be used and freed
// from any thread; all host-side mutable state is atomic.
unsafe impl Send for NativeObject {}
unsafe impl Sync for NativeObject {}

impl NativeObject {
    /// Wrap a pointer returned by a native constructor.
    ///
    /// # Safety
    ///
    /// `pointer` must be a live object from the same native build as
    /// `free_fn`, and ownership of its single reference transfers here.
    pub unsafe fn new(pointer: *const c_void, free_fn: ObjectFreeFn) -> Self {
        Self {
            pointer,
            live_calls: AtomicI64::new(1),
            destroyed: AtomicBool::new(false),
            free_fn,
        }
    }

    /// Take a guard for one native invocation.
    ///
    /// The guard keeps the object alive until it drops, so the raw pointer
    /// stays valid for as long as the native side can still be using it.
    /// Panics if the object was already disposed.
    pub fn acquire(&self) -> ObjectGuard<'_> {
        if self.destroyed.load(Ordering::Acquire) {
            panic!("attempted to use a destroyed native object");
        }
        let mut current = self.live_calls.load(Ordering::Relaxed);
        loop {
            if current <= 0 {
                panic!("attempted to use a freed native object");
            }
            if current == i64::MAX {
                panic!("native object reference count overflow");
            }
            match self.live_calls.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return ObjectGuard { object: self },
                Err(observed) => current = observed,
            }
        }
    }

    /// Explicitly destroy the object. The first caller wins; later calls
    /// (including the implicit one from `Drop`) are no-ops. The native free
    /// runs once the last in-flight guard releases.
    pub fn dispose(&self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            self.release_one();
        }
    }

    fn release_one(&self) {
        if self.live_calls.fetch_sub(1, Ordering::AcqRel) == 1 {
            // This thread observed the transition to zero and owns the free.
            let mut status = CallStatus::new();
            unsafe { (self.free_fn)(self.pointer, &mut status) };
            if status.code != CALL_SUCCESS {
                // Cannot propagate from a release path; the free still
                // counts as having run.
                tracing::error!(code = status.code, "native object free reported an error");
            }
        }
    }
}

impl Drop for NativeObject {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// RAII receipt for one in-flight native invocation on a [`NativeObject`].
pub struct ObjectGuard<'a> {
    object: &'a NativeObject,
}

impl ObjectGuard<'_> {
    /// The raw pointer to pass to the native entry point. Valid until the
    /// guard drops.
    pub fn pointer(&self) -> *const c_void {
        self.object.pointer
    }
}

impl Drop for ObjectGuard<'_> {
    fn drop(&mut self) {
        self.object.release_one();
    }
}
