use super::countdown::Countdown;
use super::machine::Machine;
use super::outcome::Outcome;
use rust_decimal::Decimal;
use std::fmt;

/// Lifecycle states of a vend session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    AwaitingSelection,
    Authorizing,
    Settling,
    Completed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Failed)
    }

    /// Whether a session in this state still holds a transport.
    pub fn is_active(&self) -> bool {
        !self.is_terminal() && *self != SessionState::Idle
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::AwaitingSelection => "awaiting_selection",
            SessionState::Authorizing => "authorizing",
            SessionState::Settling => "settling",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one vend attempt. Ids are never reused by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One attempt to buy from one machine.
#[derive(Debug, Clone, PartialEq)]
pub struct VendSession {
    pub id: SessionId,
    pub machine: Machine,
    pub state: SessionState,
    pub countdown: Countdown,
    /// Amount of the most recent authorization request.
    pub last_auth_amount: Option<Decimal>,
    pub outcome: Option<Outcome>,
}

impl VendSession {
    pub fn new(id: SessionId, machine: Machine, countdown_budget: u32) -> Self {
        Self {
            id,
            machine,
            state: SessionState::Idle,
            countdown: Countdown::new(countdown_budget),
            last_auth_amount: None,
            outcome: None,
        }
    }
}
