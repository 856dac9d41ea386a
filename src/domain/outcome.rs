use super::event::DisconnectReason;
use rust_decimal::Decimal;
use thiserror::Error;

/// User-facing failure taxonomy of a vend session.
///
/// The `Display` text is what a presentation layer shows to the user.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum VendError {
    #[error("Pairing failed")]
    ConnectionFailed,
    #[error("Timeout!")]
    ConnectionTimedOut,
    #[error("Pairing failed")]
    InvalidDeviceResponse,
    #[error("Timeout!")]
    SelectionTimedOut,
    #[error("Vending failed")]
    SettlementFailed,
    #[error("Invalid product selected")]
    InvalidProductSelected,
    #[error("Vending cancelled")]
    Abandoned,
}

impl VendError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            VendError::ConnectionFailed => "connection_failed",
            VendError::ConnectionTimedOut => "connection_timed_out",
            VendError::InvalidDeviceResponse => "invalid_device_response",
            VendError::SelectionTimedOut => "selection_timed_out",
            VendError::SettlementFailed => "settlement_failed",
            VendError::InvalidProductSelected => "invalid_product_selected",
            VendError::Abandoned => "abandoned",
        }
    }
}

impl From<DisconnectReason> for VendError {
    /// Flat classification of disconnect reasons. No recovery is attempted.
    fn from(reason: DisconnectReason) -> Self {
        match reason {
            DisconnectReason::ConnectionTimedOut => VendError::ConnectionTimedOut,
            DisconnectReason::InvalidDeviceResponse => VendError::InvalidDeviceResponse,
            DisconnectReason::TransportUnavailable
            | DisconnectReason::DeviceNotLocated
            | DisconnectReason::Unknown => VendError::ConnectionFailed,
        }
    }
}

/// Final result of a vend session.
#[derive(Debug, PartialEq, Clone)]
pub enum Outcome {
    Completed { amount: Decimal, payload: String },
    Failed(VendError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }

    pub fn failure(&self) -> Option<VendError> {
        match self {
            Outcome::Completed { .. } => None,
            Outcome::Failed(reason) => Some(*reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_disconnect_classification() {
        assert_eq!(
            VendError::from(DisconnectReason::ConnectionTimedOut),
            VendError::ConnectionTimedOut
        );
        assert_eq!(
            VendError::from(DisconnectReason::InvalidDeviceResponse),
            VendError::InvalidDeviceResponse
        );
        assert_eq!(
            VendError::from(DisconnectReason::TransportUnavailable),
            VendError::ConnectionFailed
        );
        assert_eq!(
            VendError::from(DisconnectReason::DeviceNotLocated),
            VendError::ConnectionFailed
        );
        assert_eq!(
            VendError::from(DisconnectReason::Unknown),
            VendError::ConnectionFailed
        );
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(VendError::ConnectionTimedOut.to_string(), "Timeout!");
        assert_eq!(VendError::InvalidDeviceResponse.to_string(), "Pairing failed");
        assert_eq!(VendError::ConnectionFailed.to_string(), "Pairing failed");
        assert_eq!(VendError::SettlementFailed.to_string(), "Vending failed");
    }

    #[test]
    fn test_outcome_accessors() {
        let done = Outcome::Completed {
            amount: dec!(1.00),
            payload: "ok".to_string(),
        };
        assert!(done.is_success());
        assert_eq!(done.failure(), None);

        let failed = Outcome::Failed(VendError::SettlementFailed);
        assert!(!failed.is_success());
        assert_eq!(failed.failure(), Some(VendError::SettlementFailed));
    }
}
