//! Payment records and enums
//!
//! Wire layout follows the schema definitions: records are field
//! concatenations in declared order, flat enums are a 1-based i32 index.

use swapsdk_ffi::codec::{CodecError, Lift, Lower, Reader, Writer};

/// Lifecycle state of a swap-backed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Created,
    Pending,
    Complete,
    Failed,
    Refundable,
}

impl Lower for PaymentState {
    fn lower(&self, writer: &mut Writer) {
        let index = match self {
            PaymentState::Created => 1,
            PaymentState::Pending => 2,
            PaymentState::Complete => 3,
            PaymentState::Failed => 4,
            PaymentState::Refundable => 5,
        };
        writer.write_i32(index);
    }
}

impl Lift for PaymentState {
    fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_i32()? {
            1 => Ok(PaymentState::Created),
            2 => Ok(PaymentState::Pending),
            3 => Ok(PaymentState::Complete),
            4 => Ok(PaymentState::Failed),
            5 => Ok(PaymentState::Refundable),
            index => Err(CodecError::UnknownVariant {
                type_name: "PaymentState",
                index,
            }),
        }
    }
}

/// One payment as reported by the native SDK.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub destination: String,
    pub amount_sat: u64,
    pub fees_sat: Option<u64>,
    pub state: PaymentState,
}

impl Lower for Payment {
    fn lower(&self, writer: &mut Writer) {
        self.destination.lower(writer);
        self.amount_sat.lower(writer);
        self.fees_sat.lower(writer);
        self.state.lower(writer);
    }
}

impl Lift for Payment {
    fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            destination: String::lift(reader)?,
            amount_sat: u64::lift(reader)?,
            fees_sat: Option::<u64>::lift(reader)?,
            state: PaymentState::lift(reader)?,
        })
    }
}

/// Arguments for preparing a receive flow.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiveRequest {
    pub amount_sat: Option<u64>,
    pub description: String,
}

impl Lower for ReceiveRequest {
    fn lower(&self, writer: &mut Writer) {
        self.amount_sat.lower(writer);
        self.description.lower(writer);
    }
}

impl Lift for ReceiveRequest {
    fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount_sat: Option::<u64>::lift(reader)?,
            description: String::lift(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use swapsdk_ffi::codec::{lift_from_slice, lower_into_vec};

    #[rstest]
    #[case(PaymentState::Created, 1)]
    #[case(PaymentState::Pending, 2)]
    #[case(PaymentState::Complete, 3)]
    #[case(PaymentState::Failed, 4)]
    #[case(PaymentState::Refundable, 5)]
    fn test_payment_state_wire_index(#[case] state: PaymentState, #[case] index: i32) {
        assert_eq!(lower_into_vec(&state), index.to_be_bytes().to_vec());
        assert_eq!(lift_from_slice::<PaymentState>(&lower_into_vec(&state)), state);
    }

    #[test]
    #[should_panic(expected = "unknown variant index 6 for PaymentState")]
    fn test_payment_state_unknown_index_faults() {
        let bytes = 6i32.to_be_bytes();
        let _: PaymentState = lift_from_slice(&bytes);
    }

    #[test]
    fn test_payment_roundtrip() {
        let payment = Payment {
            destination: "lq1qq...".to_string(),
            amount_sat: 123_456,
            fees_sat: Some(250),
            state: PaymentState::Pending,
        };
        let decoded: Payment = lift_from_slice(&lower_into_vec(&payment));
        assert_eq!(decoded, payment);
    }

    #[test]
    fn test_receive_request_all_absent_vs_all_present() {
        let absent = ReceiveRequest {
            amount_sat: None,
            description: String::new(),
        };
        let present = ReceiveRequest {
            amount_sat: Some(u64::MAX),
            description: "invoice".to_string(),
        };
        assert_eq!(
            lift_from_slice::<ReceiveRequest>(&lower_into_vec(&absent)),
            absent
        );
        assert_eq!(
            lift_from_slice::<ReceiveRequest>(&lower_into_vec(&present)),
            present
        );
    }

    #[test]
    #[should_panic(expected = "protocol fault")]
    fn test_truncated_payment_faults() {
        let bytes = lower_into_vec(&Payment {
            destination: "dest".to_string(),
            amount_sat: 1,
            fees_sat: None,
            state: PaymentState::Created,
        });
        let _: Payment = lift_from_slice(&bytes[..bytes.len() - 1]);
    }
}
