use super::session::SessionId;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Why a transport link went down.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    ConnectionTimedOut,
    TransportUnavailable,
    InvalidDeviceResponse,
    DeviceNotLocated,
    Unknown,
}

/// Settlement status reported with `ProcessCompleted`.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Success,
    Failure,
}

/// Asynchronous notifications emitted by a device transport.
#[derive(Debug, PartialEq, Clone)]
pub enum TransportEvent {
    Connected,
    Disconnected(DisconnectReason),
    AuthRequested {
        amount: Decimal,
        token: Option<String>,
    },
    ProcessStarted,
    ProcessCompleted {
        amount: Decimal,
        status: ProcessStatus,
        payload: String,
    },
    InvalidProduct,
    TimeoutWarning,
}

impl TransportEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TransportEvent::Connected => "connected",
            TransportEvent::Disconnected(_) => "disconnected",
            TransportEvent::AuthRequested { .. } => "auth_requested",
            TransportEvent::ProcessStarted => "process_started",
            TransportEvent::ProcessCompleted { .. } => "process_completed",
            TransportEvent::InvalidProduct => "invalid_product",
            TransportEvent::TimeoutWarning => "timeout_warning",
        }
    }
}

/// A transport event tagged with the session whose transport produced it.
///
/// The tag lets the controller drop late events from a transport that
/// belongs to an abandoned or superseded session.
#[derive(Debug, PartialEq, Clone)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: TransportEvent,
}
