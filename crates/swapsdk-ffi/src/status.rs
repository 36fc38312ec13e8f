//! Call status out-parameter shared with the native library
//!
//! Every native entry point takes a trailing `*mut CallStatus` it populates
//! before returning. The code distinguishes a completed call, a typed domain
//! error the caller is meant to handle, and a native-side panic that must be
//! relayed as a hard fault.

use crate::buffer::WireBuffer;

/// Call completed; the return value is valid.
pub const CALL_SUCCESS: i8 = 0;
/// Call reports a typed domain error; `error_buf` holds its serialized form.
pub const CALL_ERROR: i8 = 1;
/// Native side panicked; `error_buf` holds the UTF-8 message, possibly empty.
pub const CALL_PANIC: i8 = 2;

/// Out-parameter record for a single native call.
///
/// Layout is part of the C ABI contract: a one-byte code followed by a
/// [`WireBuffer`] owned by the native side when non-empty.
#[repr(C)]
#[derive(Debug)]
pub struct CallStatus {
    pub code: i8,
    pub error_buf: WireBuffer,
}

impl CallStatus {
    /// Zero-initialized status, as the native side expects before a call.
    pub fn new() -> Self {
        Self {
            code: CALL_SUCCESS,
            error_buf: WireBuffer::empty(),
        }
    }
}

impl Default for CallStatus {
    fn default() -> Self {
        Self::new()
    }
}
