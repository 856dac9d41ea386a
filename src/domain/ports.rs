use super::event::{SessionEvent, TransportEvent};
use super::outcome::Outcome;
use super::session::{SessionId, SessionState};
use super::settings::{Settings, SimulationMode, TransportSpec};
use crate::error::{Result, TransportError};
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

/// Where a transport delivers its events.
pub type EventSink = UnboundedSender<SessionEvent>;

/// Channel to a physical or simulated vending machine.
///
/// Every call is fire-and-forget: results come back later as
/// [`TransportEvent`]s on the sink the transport was opened with.
pub trait DeviceTransport: Send {
    fn connect(&mut self) -> std::result::Result<(), TransportError>;
    fn disconnect(&mut self);
    fn send_keep_alive(&mut self);
    fn approve_authorization(&mut self, payload: &str);
}

/// Opens transports for new sessions.
pub trait TransportConnector: Send {
    /// `sink` is already bound to the session the transport will serve.
    fn open(
        &mut self,
        spec: &TransportSpec,
        sink: SessionSink,
    ) -> std::result::Result<TransportBox, TransportError>;
}

/// An [`EventSink`] bound to one session id.
#[derive(Debug, Clone)]
pub struct SessionSink {
    session: SessionId,
    sink: EventSink,
}

impl SessionSink {
    pub fn new(session: SessionId, sink: EventSink) -> Self {
        Self { session, sink }
    }

    /// Delivers `event`. Returns `false` once the receiving side is gone.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.sink
            .send(SessionEvent {
                session: self.session,
                event,
            })
            .is_ok()
    }

    pub fn session(&self) -> SessionId {
        self.session
    }
}

/// Receives everything a presentation layer needs to render a session.
pub trait Presenter: Send {
    fn on_state_changed(&mut self, state: SessionState);
    fn on_countdown_tick(&mut self, remaining: u32);
    fn on_outcome(&mut self, outcome: &Outcome);
    fn on_invalid_selection(&mut self) {}
}

/// A presenter notification as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    StateChanged(SessionState),
    CountdownTick(u32),
    InvalidSelection,
    Outcome(Outcome),
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings>;
    async fn save(&self, settings: Settings) -> Result<()>;

    async fn simulation_mode(&self) -> Result<SimulationMode> {
        Ok(self.load().await?.simulation)
    }

    async fn set_simulation_mode(&self, mode: SimulationMode) -> Result<()> {
        let mut settings = self.load().await?;
        settings.simulation = mode;
        self.save(settings).await
    }
}

pub type TransportBox = Box<dyn DeviceTransport>;
pub type ConnectorBox = Box<dyn TransportConnector>;
pub type PresenterBox = Box<dyn Presenter>;
pub type SettingsStoreBox = Box<dyn SettingsStore>;
