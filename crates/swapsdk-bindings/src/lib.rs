//! SwapSDK schema layer
//!
//! Domain records, enums, events, typed errors, and callback interfaces for
//! the native SwapSDK, expressed purely through the codec combinators and
//! dispatch machinery of [`swapsdk_ffi`]. In the shipped product this crate
//! is regenerated from the interface definition alongside every native
//! build; the compiled-in contract in [`contract`] is what detects a
//! mismatched pairing at startup.
//!
//! Nothing in here computes anything: every type is a wire shape plus its
//! [`Lower`](swapsdk_ffi::Lower)/[`Lift`](swapsdk_ffi::Lift) pair, and every
//! interface is a handle table plus a method demux.

pub mod contract;
pub mod error;
pub mod events;
pub mod listener;
pub mod payment;
pub mod signer;

pub use contract::{api_contract, CONTRACT_VERSION, ENTRY_POINT_CHECKSUMS};
pub use error::{lift_sdk_error, SdkError};
pub use events::SdkEvent;
pub use listener::{EventDispatcher, EventListener};
pub use payment::{Payment, PaymentState, ReceiveRequest};
pub use signer::{Signer, SignerDispatcher};
