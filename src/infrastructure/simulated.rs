use crate::domain::event::{DisconnectReason, ProcessStatus, TransportEvent};
use crate::domain::ports::{DeviceTransport, SessionSink, TransportBox, TransportConnector};
use crate::domain::settings::{CannedOutcome, TransportSpec};
use crate::error::TransportError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// Price of the item every simulated machine vends.
pub const SIMULATED_AMOUNT: Decimal = dec!(1.00);

/// Opens simulated transports.
///
/// No hardware transport is linked into this crate, so real specs are
/// refused and the session fails to pair.
#[derive(Debug, Default, Clone)]
pub struct SimulatedConnector {
    selection_delay: Option<Duration>,
}

impl SimulatedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays the simulated item selection by `delay`.
    ///
    /// The delayed event is emitted from a tokio task, so transports opened
    /// with a delay must be connected from within a tokio runtime; outside one
    /// the selection is emitted immediately.
    pub fn with_selection_delay(mut self, delay: Duration) -> Self {
        self.selection_delay = Some(delay);
        self
    }
}

impl TransportConnector for SimulatedConnector {
    fn open(
        &mut self,
        spec: &TransportSpec,
        sink: SessionSink,
    ) -> Result<TransportBox, TransportError> {
        match spec {
            TransportSpec::Simulated(outcome) => Ok(Box::new(SimulatedTransport::new(
                *outcome,
                sink,
                self.selection_delay,
            ))),
            TransportSpec::Real { model, serial, .. } => Err(TransportError::Unavailable(
                format!("no hardware transport for {} ({})", model, serial),
            )),
        }
    }
}

/// Plays back a canned outcome.
pub struct SimulatedTransport {
    outcome: CannedOutcome,
    sink: SessionSink,
    selection_delay: Option<Duration>,
    closed: Arc<AtomicBool>,
}

impl SimulatedTransport {
    pub fn new(outcome: CannedOutcome, sink: SessionSink, selection_delay: Option<Duration>) -> Self {
        Self {
            outcome,
            sink,
            selection_delay,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn emit(&self, event: TransportEvent) {
        if !self.closed.load(Ordering::SeqCst) {
            self.sink.emit(event);
        }
    }

    fn select_item(&self) {
        let event = TransportEvent::AuthRequested {
            amount: SIMULATED_AMOUNT,
            token: Some(format!("sim-{}", self.sink.session().0)),
        };

        let runtime = tokio::runtime::Handle::try_current();
        match (self.selection_delay, runtime) {
            (Some(delay), Ok(runtime)) => {
                let sink = self.sink.clone();
                let closed = self.closed.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if !closed.load(Ordering::SeqCst) {
                        sink.emit(event);
                    }
                });
            }
            _ => self.emit(event),
        }
    }
}

impl DeviceTransport for SimulatedTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }

        debug!(outcome = %self.outcome, "simulated transport connecting");
        match self.outcome {
            CannedOutcome::DeviceNotLocated => {
                self.emit(TransportEvent::Disconnected(DisconnectReason::DeviceNotLocated));
            }
            CannedOutcome::ConnectionFailed => {
                self.emit(TransportEvent::Connected);
                self.emit(TransportEvent::Disconnected(
                    DisconnectReason::TransportUnavailable,
                ));
            }
            CannedOutcome::AllSuccess | CannedOutcome::VendingFailed => {
                self.emit(TransportEvent::Connected);
                self.select_item();
            }
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn send_keep_alive(&mut self) {
        debug!("simulated transport keep-alive");
    }

    fn approve_authorization(&mut self, payload: &str) {
        let status = match self.outcome {
            CannedOutcome::VendingFailed => ProcessStatus::Failure,
            _ => ProcessStatus::Success,
        };

        self.emit(TransportEvent::ProcessStarted);
        self.emit(TransportEvent::ProcessCompleted {
            amount: SIMULATED_AMOUNT,
            status,
            payload: format!("settled:{}", payload),
        });
    }
}
