//! SDK event stream types
//!
//! Tagged union: a 1-based i32 variant index followed by that variant's
//! fields. An unknown index means the native build emits events this
//! schema predates, which is version skew and therefore a fault on lift.

use swapsdk_ffi::codec::{CodecError, Lift, Lower, Reader, Writer};

use crate::payment::Payment;

/// Events pushed by the native SDK to a registered listener.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkEvent {
    PaymentSucceeded { payment: Payment },
    PaymentFailed { error: String },
    PaymentPending { payment: Payment },
    Synced,
}

impl Lower for SdkEvent {
    fn lower(&self, writer: &mut Writer) {
        match self {
            SdkEvent::PaymentSucceeded { payment } => {
                writer.write_i32(1);
                payment.lower(writer);
            }
            SdkEvent::PaymentFailed { error } => {
                writer.write_i32(2);
                error.lower(writer);
            }
            SdkEvent::PaymentPending { payment } => {
                writer.write_i32(3);
                payment.lower(writer);
            }
            SdkEvent::Synced => writer.write_i32(4),
        }
    }
}

impl Lift for SdkEvent {
    fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_i32()? {
            1 => Ok(SdkEvent::PaymentSucceeded {
                payment: Payment::lift(reader)?,
            }),
            2 => Ok(SdkEvent::PaymentFailed {
                error: String::lift(reader)?,
            }),
            3 => Ok(SdkEvent::PaymentPending {
                payment: Payment::lift(reader)?,
            }),
            4 => Ok(SdkEvent::Synced),
            index => Err(CodecError::UnknownVariant {
                type_name: "SdkEvent",
                index,
            }),
        }
    }
}
