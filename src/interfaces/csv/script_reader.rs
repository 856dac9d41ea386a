use crate::domain::event::{DisconnectReason, ProcessStatus, TransportEvent};
use crate::error::{Result, SessionError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ScriptEventKind {
    Start,
    Connected,
    Disconnected,
    AuthRequested,
    ProcessStarted,
    ProcessCompleted,
    InvalidProduct,
    TimeoutWarning,
    Tick,
    Approve,
    Abandon,
}

/// One raw row of an event script.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScriptRecord {
    pub event: ScriptEventKind,
    pub amount: Option<Decimal>,
    pub token: Option<String>,
    pub status: Option<ProcessStatus>,
    pub payload: Option<String>,
    pub reason: Option<DisconnectReason>,
}

/// A validated script step.
#[derive(Debug, PartialEq, Clone)]
pub enum ScriptStep {
    Start,
    Transport(TransportEvent),
    Tick,
    Approve(String),
    Abandon,
}

impl TryFrom<ScriptRecord> for ScriptStep {
    type Error = SessionError;

    fn try_from(record: ScriptRecord) -> Result<Self> {
        let missing =
            |field: &str| SessionError::ScriptError(format!("{:?} needs a {}", record.event, field));

        let step = match record.event {
            ScriptEventKind::Start => ScriptStep::Start,
            ScriptEventKind::Connected => ScriptStep::Transport(TransportEvent::Connected),
            ScriptEventKind::Disconnected => ScriptStep::Transport(TransportEvent::Disconnected(
                record.reason.unwrap_or(DisconnectReason::Unknown),
            )),
            ScriptEventKind::AuthRequested => ScriptStep::Transport(TransportEvent::AuthRequested {
                amount: record.amount.ok_or_else(|| missing("amount"))?,
                token: record.token.clone(),
            }),
            ScriptEventKind::ProcessStarted => ScriptStep::Transport(TransportEvent::ProcessStarted),
            ScriptEventKind::ProcessCompleted => {
                ScriptStep::Transport(TransportEvent::ProcessCompleted {
                    amount: record.amount.ok_or_else(|| missing("amount"))?,
                    status: record.status.ok_or_else(|| missing("status"))?,
                    payload: record.payload.clone().unwrap_or_default(),
                })
            }
            ScriptEventKind::InvalidProduct => ScriptStep::Transport(TransportEvent::InvalidProduct),
            ScriptEventKind::TimeoutWarning => ScriptStep::Transport(TransportEvent::TimeoutWarning),
            ScriptEventKind::Tick => ScriptStep::Tick,
            ScriptEventKind::Approve => {
                ScriptStep::Approve(record.payload.clone().ok_or_else(|| missing("payload"))?)
            }
            ScriptEventKind::Abandon => ScriptStep::Abandon,
        };
        Ok(step)
    }
}

/// Reads an event script from a CSV source.
///
/// Scripts have the header `event, amount, token, status, payload, reason`;
/// columns a step does not use may be left empty or omitted.
pub struct ScriptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScriptReader<R> {
    /// Creates a new `ScriptReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates script steps.
    pub fn steps(self) -> impl Iterator<Item = Result<ScriptStep>> {
        self.reader
            .into_deserialize::<ScriptRecord>()
            .map(|result| result.map_err(SessionError::from).and_then(ScriptStep::try_from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "event, amount, token, status, payload, reason\n";

    fn read(body: &str) -> Vec<Result<ScriptStep>> {
        let data = format!("{}{}", HEADER, body);
        ScriptReader::new(data.as_bytes()).steps().collect()
    }

    #[test]
    fn test_reader_valid_script() {
        let steps = read(
            "start,,,,,\n\
             connected,,,,,\n\
             auth_requested, 1.50, tok,,,\n\
             approve,,,, dummyPayload,\n\
             process_completed, 1.50,, success, receipt-1,\n",
        );

        let steps: Vec<ScriptStep> = steps.into_iter().map(|s| s.unwrap()).collect();
        assert_eq!(
            steps,
            vec![
                ScriptStep::Start,
                ScriptStep::Transport(TransportEvent::Connected),
                ScriptStep::Transport(TransportEvent::AuthRequested {
                    amount: dec!(1.50),
                    token: Some("tok".to_string()),
                }),
                ScriptStep::Approve("dummyPayload".to_string()),
                ScriptStep::Transport(TransportEvent::ProcessCompleted {
                    amount: dec!(1.50),
                    status: ProcessStatus::Success,
                    payload: "receipt-1".to_string(),
                }),
            ]
        );
    }

    #[test]
    fn test_disconnect_reason_defaults_to_unknown() {
        let steps = read("disconnected,,,,,\ndisconnected,,,,,connection_timed_out\n");
        assert_eq!(
            steps[0].as_ref().unwrap(),
            &ScriptStep::Transport(TransportEvent::Disconnected(DisconnectReason::Unknown))
        );
        assert_eq!(
            steps[1].as_ref().unwrap(),
            &ScriptStep::Transport(TransportEvent::Disconnected(
                DisconnectReason::ConnectionTimedOut
            ))
        );
    }

    #[test]
    fn test_short_rows_leave_trailing_columns_empty() {
        let steps = read("start\nconnected\nauth_requested, 1.00\napprove,,,, p\n");
        let steps: Vec<ScriptStep> = steps.into_iter().map(|s| s.unwrap()).collect();
        assert_eq!(
            steps,
            vec![
                ScriptStep::Start,
                ScriptStep::Transport(TransportEvent::Connected),
                ScriptStep::Transport(TransportEvent::AuthRequested {
                    amount: dec!(1.00),
                    token: None,
                }),
                ScriptStep::Approve("p".to_string()),
            ]
        );
    }

    #[test]
    fn test_reader_malformed_line() {
        let steps = read("teleport,,,,,\ntick,,,,,\n");
        assert!(steps[0].is_err());
        assert_eq!(steps[1].as_ref().unwrap(), &ScriptStep::Tick);
    }

    #[test]
    fn test_missing_required_field() {
        let steps = read("auth_requested,,,,,\napprove,,,,,\n");
        assert!(matches!(steps[0], Err(SessionError::ScriptError(_))));
        assert!(matches!(steps[1], Err(SessionError::ScriptError(_))));
    }
}
