//! Call gateway
//!
//! Wraps a raw native entry point invocation and turns the [`CallStatus`]
//! out-parameter into Rust idiom: `Ok` for success, `Err` with a lifted
//! typed error for a declared-fallible call, and a panic for everything
//! that indicates the boundary itself is broken (an error from an
//! infallible call, a relayed native panic, an unknown status code).

use crate::buffer::BufferBridge;
use crate::status::{CallStatus, CALL_ERROR, CALL_PANIC, CALL_SUCCESS};

/// Invoke a native entry point and interpret its call status.
///
/// `entry_point` receives the status out-parameter and performs the actual
/// call with its own already-lowered arguments. `error_lift` decodes the
/// serialized error payload for calls declared fallible; passing `None`
/// declares the call infallible, making any reported error a fault.
///
/// The caller still owns any native-owned buffer embedded in the returned
/// value and must consume it via [`BufferBridge::take_into_vec`] or release
/// it explicitly.
pub fn invoke<R, E, F, L>(
    bridge: &BufferBridge,
    error_lift: Option<L>,
    entry_point: F,
) -> Result<R, E>
where
    F: FnOnce(*mut CallStatus) -> R,
    L: FnOnce(Vec<u8>) -> E,
{
    let mut status = CallStatus::new();
    let value = entry_point(&mut status);
    match status.code {
        CALL_SUCCESS => Ok(value),
        CALL_ERROR => {
            let payload = bridge.take_into_vec(status.error_buf);
            match error_lift {
                Some(lift) => Err(lift(payload)),
                None => panic!("native call declared infallible reported an error"),
            }
        }
        CALL_PANIC => {
            let payload = bridge.take_into_vec(status.error_buf);
            if payload.is_empty() {
                panic!("native panic while constructing the panic message");
            }
            let message = String::from_utf8_lossy(&payload);
            panic!("native panic: {message}");
        }
        other => panic!("native call returned unknown status code {other}"),
    }
}

/// [`invoke`] for entry points declared infallible.
pub fn invoke_infallible<R, F>(bridge: &BufferBridge, entry_point: F) -> R
where
    F: FnOnce(*mut CallStatus) -> R,
{
    type NeverLift = fn(Vec<u8>) -> std::convert::Infallible;
    match invoke::<R, std::convert::Infallible, F, NeverLift>(bridge, None, entry_point) {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
