//! SwapSDK FFI marshaling core
//!
//! The glue that lets Rust call a precompiled swap-payment SDK through its
//! stable C ABI and receive callbacks from it:
//! - binary codec for the call protocol ([`codec`])
//! - buffer ownership bridge for byte payloads ([`buffer`])
//! - call gateway interpreting the tri-state call status ([`gateway`])
//! - reference-counted lifetimes for opaque native objects ([`object`])
//! - handle-table dispatch for native-to-Rust callbacks ([`callbacks`])
//! - library loading and ABI contract verification ([`loader`], [`version`])
//!
//! The domain types that flow through these channels are generated
//! elsewhere; this crate knows only their wire form.
//!
//! # Error discipline
//!
//! Typed domain errors reported by the native library surface as ordinary
//! `Result`s. Everything that indicates the boundary itself is broken (a
//! short read, an unknown variant or status code, a handle miss, a
//! use-after-destroy, an ABI mismatch) panics, because the integrity of
//! every subsequent call is already compromised.

/// Crate version, reported alongside the native contract version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod buffer;
pub mod callbacks;
pub mod codec;
pub mod gateway;
pub mod loader;
pub mod object;
pub mod status;
pub mod version;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use buffer::{AllocFn, BufferBridge, FreeFn, WireBuffer};
pub use callbacks::{
    CallbackOutcome, CallbackRegistry, CALLBACK_ERROR, CALLBACK_SUCCESS, CALLBACK_UNEXPECTED,
    METHOD_FREE,
};
pub use codec::{lift_from_slice, lower_into_vec, CodecError, Lift, Lower, Reader, Writer};
pub use gateway::{invoke, invoke_infallible};
pub use loader::{LoadError, NativeLibrary};
pub use object::{NativeObject, ObjectFreeFn, ObjectGuard};
pub use status::{CallStatus, CALL_ERROR, CALL_PANIC, CALL_SUCCESS};
pub use version::ApiContract;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        assert_eq!(VERSION, "0.1.0");
    }
}
