//! EventListener callback interface
//!
//! The native SDK pushes [`SdkEvent`]s to host implementations of
//! [`EventListener`]. [`EventDispatcher`] owns the handle table for the
//! interface and demultiplexes the reverse entry point.

use std::sync::Arc;

use swapsdk_ffi::buffer::{BufferBridge, WireBuffer};
use swapsdk_ffi::callbacks::{CallbackOutcome, CallbackRegistry};
use swapsdk_ffi::codec::lift_from_slice;

use crate::events::SdkEvent;

/// Method indices of the EventListener interface (0 is reserved for
/// dropping the handle).
const METHOD_ON_EVENT: i32 = 1;

/// Host-side receiver for the SDK event stream. Invoked from native worker
/// threads, so implementations must be thread-safe.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: SdkEvent);
}

/// Handle table and method demux for [`EventListener`] callbacks.
///
/// Constructed explicitly and handed to the native-facing shim at
/// initialization; one instance serves every listener of this interface.
pub struct EventDispatcher {
    registry: CallbackRegistry<dyn EventListener>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            registry: CallbackRegistry::new(),
        }
    }

    /// Install the reverse entry point with the native library, once.
    pub fn ensure_registered(&self, register_with_native: impl FnOnce()) {
        self.registry.ensure_registered(register_with_native);
    }

    /// Lower a listener to the handle passed into native calls.
    pub fn lower(&self, listener: Arc<dyn EventListener>) -> u64 {
        self.registry.insert(listener)
    }

    /// Lift a handle back to the listener. Faults if native references a
    /// handle this side never issued.
    pub fn lift(&self, handle: u64) -> Arc<dyn EventListener> {
        self.registry.get(handle)
    }

    pub fn active_handles(&self) -> usize {
        self.registry.len()
    }

    /// Body of the multiplexed reverse entry point for this interface.
    pub fn handle_call(
        &self,
        bridge: &BufferBridge,
        handle: u64,
        method: i32,
        args: &[u8],
        out_buf: &mut WireBuffer,
    ) -> i32 {
        self.registry
            .dispatch(bridge, handle, method, args, out_buf, |listener, method, args| {
                match method {
                    METHOD_ON_EVENT => {
                        listener.on_event(lift_from_slice(args));
                        CallbackOutcome::Success(Vec::new())
                    }
                    other => CallbackOutcome::Unexpected(format!(
                        "unknown method index {other} for EventListener"
                    )),
                }
            })
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
