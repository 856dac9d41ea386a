use crate::domain::countdown::{DEFAULT_COUNTDOWN_BUDGET, Tick};
use crate::domain::event::SessionEvent;
use crate::domain::machine::Machine;
use crate::domain::outcome::{Outcome, VendError};
use crate::domain::ports::{ConnectorBox, EventSink, PresenterBox, SessionSink, TransportBox};
use crate::domain::session::{SessionId, SessionState, VendSession};
use crate::domain::settings::{SessionConfig, TransportSpec};
use crate::domain::transition::{Effect, Input, Step, transition};
use crate::error::{Result, SessionError};
use tracing::{debug, info, warn};

/// Drives one vend session at a time.
///
/// `VendSessionController` is a synchronous reactor: it never blocks and
/// never spawns. Transport events, countdown ticks and user commands must all
/// be fed to it from a single execution context, which is what
/// [`SessionRunner`](super::runner::SessionRunner) provides.
pub struct VendSessionController {
    connector: ConnectorBox,
    presenter: PresenterBox,
    events: EventSink,
    countdown_budget: u32,
    next_id: u64,
    session: Option<VendSession>,
    transport: Option<TransportBox>,
}

impl VendSessionController {
    /// Creates a new `VendSessionController`.
    ///
    /// # Arguments
    ///
    /// * `connector` - Opens a transport for every new session.
    /// * `presenter` - Receives state, countdown and outcome notifications.
    /// * `events` - Sink handed to transports; its receiver must feed
    ///   [`handle_event`](Self::handle_event).
    pub fn new(connector: ConnectorBox, presenter: PresenterBox, events: EventSink) -> Self {
        Self {
            connector,
            presenter,
            events,
            countdown_budget: DEFAULT_COUNTDOWN_BUDGET,
            next_id: 1,
            session: None,
            transport: None,
        }
    }

    pub fn with_countdown_budget(mut self, budget: u32) -> Self {
        self.countdown_budget = budget.max(1);
        self
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(|session| session.state)
            .unwrap_or_default()
    }

    pub fn session(&self) -> Option<&VendSession> {
        self.session.as_ref()
    }

    pub fn countdown_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.countdown.is_running())
    }

    /// Begins a new session against `machine`.
    ///
    /// A session that is still running is never replaced; it has to reach a
    /// terminal state or be abandoned first. Failing to open the transport is
    /// reported through the presenter, not as an error.
    pub fn start(&mut self, machine: Machine, config: SessionConfig) -> Result<SessionId> {
        let state = self.state();
        if state.is_active() {
            return Err(SessionError::SessionActive(state));
        }

        let id = SessionId(self.next_id);
        self.next_id += 1;

        let spec = TransportSpec::for_session(&config, &machine);
        info!(session = %id, machine = %machine.name, ?spec, "starting vend session");

        self.transport = None;
        self.session = Some(VendSession::new(id, machine, self.countdown_budget));
        self.enter(SessionState::Connecting);

        let sink = SessionSink::new(id, self.events.clone());
        let opened = self.connector.open(&spec, sink).and_then(|mut transport| {
            if let Err(e) = transport.connect() {
                transport.disconnect();
                return Err(e);
            }
            Ok(transport)
        });

        match opened {
            Ok(transport) => self.transport = Some(transport),
            Err(e) => {
                warn!(session = %id, error = %e, "failed to open transport");
                self.apply_step(Step {
                    next: SessionState::Failed,
                    effects: vec![Effect::Finish(Outcome::Failed(VendError::ConnectionFailed))],
                });
            }
        }

        Ok(id)
    }

    /// Processes an event delivered by a transport.
    ///
    /// Events from any session other than the current one, and events the
    /// current state has no transition for, are dropped.
    pub fn handle_event(&mut self, event: SessionEvent) {
        let Some(session) = &self.session else {
            debug!(event = event.event.name(), "no session, dropping transport event");
            return;
        };

        if session.id != event.session {
            debug!(
                current = %session.id,
                stale = %event.session,
                event = event.event.name(),
                "dropping event from superseded transport"
            );
            return;
        }

        let name = event.event.name();
        let state = session.state;
        if !self.apply(Input::Transport(event.event)) {
            debug!(event = name, %state, "ignoring transport event");
        }
    }

    /// Forwards the external authorization approval. Accepted once per session.
    pub fn approve(&mut self, payload: impl Into<String>) -> Result<()> {
        self.command("approve", Input::Approved(payload.into()))
    }

    /// Ends the running session, closing its transport.
    pub fn abandon(&mut self) -> Result<()> {
        self.command("abandon", Input::Abandon)
    }

    /// Advances the selection countdown by one tick.
    pub fn tick(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.countdown.tick() {
            None => {}
            Some(Tick::Remaining(remaining)) => self.presenter.on_countdown_tick(remaining),
            Some(Tick::Expired) => {
                info!(session = %session.id, "item selection timed out");
                self.apply(Input::CountdownExpired);
            }
        }
    }

    fn command(&mut self, command: &'static str, input: Input) -> Result<()> {
        if self.session.is_none() {
            return Err(SessionError::NoActiveSession);
        }

        let state = self.state();
        if self.apply(input) {
            Ok(())
        } else {
            warn!(command, %state, "rejected command");
            Err(SessionError::UnexpectedCommand { command, state })
        }
    }

    fn apply(&mut self, input: Input) -> bool {
        match transition(self.state(), &input) {
            Some(step) => {
                self.apply_step(step);
                true
            }
            None => false,
        }
    }

    fn apply_step(&mut self, step: Step) {
        if step.next != self.state() {
            self.enter(step.next);
        }
        for effect in step.effects {
            self.execute(effect);
        }
    }

    fn enter(&mut self, state: SessionState) {
        if let Some(session) = self.session.as_mut() {
            debug!(session = %session.id, from = %session.state, to = %state, "transition");
            session.state = state;
        }
        self.presenter.on_state_changed(state);
    }

    fn execute(&mut self, effect: Effect) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match effect {
            Effect::StartCountdown => {
                let remaining = session.countdown.start();
                self.presenter.on_countdown_tick(remaining);
            }
            Effect::StopCountdown => {
                if session.countdown.cancel() {
                    debug!(session = %session.id, "countdown stopped");
                }
            }
            Effect::RecordAuthorization(amount) => {
                info!(session = %session.id, %amount, "authorization requested");
                session.last_auth_amount = Some(amount);
            }
            Effect::SendKeepAlive => {
                if let Some(transport) = self.transport.as_mut() {
                    transport.send_keep_alive();
                }
            }
            Effect::ForwardApproval(payload) => {
                if let Some(transport) = self.transport.as_mut() {
                    transport.approve_authorization(&payload);
                }
            }
            Effect::NotifyInvalidSelection => self.presenter.on_invalid_selection(),
            Effect::CloseTransport => {
                if let Some(mut transport) = self.transport.take() {
                    transport.disconnect();
                }
            }
            Effect::Finish(outcome) => {
                info!(session = %session.id, ?outcome, "vend session finished");
                self.transport = None;
                session.outcome = Some(outcome.clone());
                self.presenter.on_outcome(&outcome);
            }
        }
    }
}
