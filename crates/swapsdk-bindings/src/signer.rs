//! Signer callback interface
//!
//! The native SDK delegates signing to the host: it hands over message
//! bytes and expects either a signature or a typed [`SdkError`]. This is
//! the fallible-callback shape: errors are encoded into the output buffer
//! and flagged with the CALLBACK_ERROR result code.

use std::sync::Arc;

use swapsdk_ffi::buffer::{BufferBridge, WireBuffer};
use swapsdk_ffi::callbacks::{CallbackOutcome, CallbackRegistry};
use swapsdk_ffi::codec::{lift_from_slice, lower_into_vec};

use crate::error::SdkError;

const METHOD_SIGN: i32 = 1;

/// Host-side signer the native SDK calls out to. Invoked from native
/// threads; implementations must be thread-safe.
pub trait Signer: Send + Sync {
    fn sign(&self, message: Vec<u8>) -> Result<Vec<u8>, SdkError>;
}

/// Handle table and method demux for [`Signer`] callbacks.
pub struct SignerDispatcher {
    registry: CallbackRegistry<dyn Signer>,
}

impl SignerDispatcher {
    pub fn new() -> Self {
        Self {
            registry: CallbackRegistry::new(),
        }
    }

    pub fn ensure_registered(&self, register_with_native: impl FnOnce()) {
        self.registry.ensure_registered(register_with_native);
    }

    pub fn lower(&self, signer: Arc<dyn Signer>) -> u64 {
        self.registry.insert(signer)
    }

    pub fn lift(&self, handle: u64) -> Arc<dyn Signer> {
        self.registry.get(handle)
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
            .dispatch(bridge, handle, method, args, out_buf, |signer, method, args| {
                match method {
                    METHOD_SIGN => match signer.sign(lift_from_slice(args)) {
                        Ok(signature) => CallbackOutcome::Success(lower_into_vec(&signature)),
                        Err(error) => CallbackOutcome::DomainError(lower_into_vec(&error)),
                    },
                    other => CallbackOutcome::Unexpected(format!(
                        "unknown method index {other} for Signer"
                    )),
                }
            })
    }
}

impl Default for SignerDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
