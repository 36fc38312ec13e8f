//! Typed domain errors reported by the native SDK
//!
//! These travel through the CALL_ERROR path of the call gateway and surface
//! to callers as ordinary `Result::Err` values.

use swapsdk_ffi::codec::{lift_from_slice, CodecError, Lift, Lower, Reader, Writer};
use thiserror::Error;

/// Domain error for fallible SDK entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    #[error("sdk error: {message}")]
    Generic { message: String },

    #[error("insufficient funds: {available_sat} sat available, {required_sat} sat required")]
    InsufficientFunds {
        available_sat: u64,
        required_sat: u64,
    },

    #[error("sdk already started")]
    AlreadyStarted,
}

impl Lower for SdkError {
    fn lower(&self, writer: &mut Writer) {
        match self {
            SdkError::Generic { message } => {
                writer.write_i32(1);
                message.lower(writer);
            }
            SdkError::InsufficientFunds {
                available_sat,
                required_sat,
            } => {
                writer.write_i32(2);
                available_sat.lower(writer);
                required_sat.lower(writer);
            }
            SdkError::AlreadyStarted => writer.write_i32(3),
        }
    }
}

impl Lift for SdkError {
    fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_i32()? {
            1 => Ok(SdkError::Generic {
                message: String::lift(reader)?,
            }),
            2 => Ok(SdkError::InsufficientFunds {
                available_sat: u64::lift(reader)?,
                required_sat: u64::lift(reader)?,
            }),
            3 => Ok(SdkError::AlreadyStarted),
            index => Err(CodecError::UnknownVariant {
                type_name: "SdkError",
                index,
            }),
        }
    }
}

/// Error lifter handed to the call gateway for fallible entry points.
pub fn lift_sdk_error(payload: Vec<u8>) -> SdkError {
    lift_from_slice(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use swapsdk_ffi::codec::lower_into_vec;

    #[rstest]
    #[case(SdkError::Generic { message: "timeout".to_string() })]
    #[case(SdkError::InsufficientFunds { available_sat: 10, required_sat: 5000 })]
    #[case(SdkError::AlreadyStarted)]
    fn test_error_roundtrip(#[case] error: SdkError) {
        assert_eq!(lift_sdk_error(lower_into_vec(&error)), error);
    }

    #[test]
    fn test_display_messages() {
        let error = SdkError::InsufficientFunds {
            available_sat: 10,
            required_sat: 5000,
        };
        assert_eq!(
            error.to_string(),
            "insufficient funds: 10 sat available, 5000 sat required"
        );
    }

    #[test]
    #[should_panic(expected = "unknown variant index 9 for SdkError")]
    fn test_unknown_error_variant_faults() {
        lift_sdk_error(9i32.to_be_bytes().to_vec());
    }

    #[test]
    fn test_gateway_integration() {
        use swapsdk_ffi::status::CALL_ERROR;
        use swapsdk_ffi::testing;

        let bridge = testing::bridge();
        let native_error = SdkError::AlreadyStarted;
        let result: Result<(), SdkError> =
            swapsdk_ffi::gateway::invoke(&bridge, Some(lift_sdk_error), |status| unsafe {
                (*status).code = CALL_ERROR;
                (*status).error_buf = bridge.allocate_from_bytes(&lower_into_vec(&native_error));
            });
        assert_eq!(result, Err(SdkError::AlreadyStarted));
    }
}
