use super::controller::VendSessionController;
use crate::domain::countdown::DEFAULT_COUNTDOWN_BUDGET;
use crate::domain::event::SessionEvent;
use crate::domain::machine::Machine;
use crate::domain::ports::{ConnectorBox, PresenterBox, SettingsStore, SettingsStoreBox};
use crate::domain::session::SessionId;
use crate::error::{Result, SessionError};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Ticks granted for item selection.
    pub countdown_budget: u32,
    /// Time between two countdown ticks. Raised to [`MIN_TICK_INTERVAL`].
    pub tick_interval: Duration,
}

pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            countdown_budget: DEFAULT_COUNTDOWN_BUDGET,
            tick_interval: Duration::from_secs(1),
        }
    }
}

enum Command {
    Start {
        machine: Machine,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    Approve {
        payload: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Abandon {
        reply: oneshot::Sender<Result<()>>,
    },
    Shutdown,
}

/// Cloneable front door to a running [`SessionRunner`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: UnboundedSender<Command>,
}

impl SessionHandle {
    /// Starts a session. Settings are read once, when the runner handles this.
    pub async fn start(&self, machine: Machine) -> Result<SessionId> {
        self.request(|reply| Command::Start { machine, reply }).await
    }

    pub async fn approve(&self, payload: impl Into<String>) -> Result<()> {
        let payload = payload.into();
        self.request(|reply| Command::Approve { payload, reply }).await
    }

    pub async fn abandon(&self) -> Result<()> {
        self.request(|reply| Command::Abandon { reply }).await
    }

    /// Stops the runner, abandoning any running session.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| SessionError::RunnerStopped)?;
        response.await.map_err(|_| SessionError::RunnerStopped)?
    }
}

/// The single execution context of a vend session controller.
///
/// Commands, transport events and countdown ticks are all handled on one
/// task, one at a time, so the controller and the presenter never see two
/// of them concurrently.
pub struct SessionRunner {
    controller: VendSessionController,
    settings: SettingsStoreBox,
    commands: UnboundedReceiver<Command>,
    events: UnboundedReceiver<SessionEvent>,
    tick_interval: Duration,
}

impl SessionRunner {
    pub fn new(
        connector: ConnectorBox,
        presenter: PresenterBox,
        settings: SettingsStoreBox,
        options: RunnerOptions,
    ) -> (Self, SessionHandle) {
        let (events_tx, events) = unbounded_channel();
        let (commands_tx, commands) = unbounded_channel();

        let controller = VendSessionController::new(connector, presenter, events_tx)
            .with_countdown_budget(options.countdown_budget);

        let runner = Self {
            controller,
            settings,
            commands,
            events,
            tick_interval: options.tick_interval.max(MIN_TICK_INTERVAL),
        };
        (
            runner,
            SessionHandle {
                commands: commands_tx,
            },
        )
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let SessionRunner {
            mut controller,
            settings,
            mut commands,
            mut events,
            tick_interval,
        } = self;
        let mut ticker: Option<Interval> = None;

        loop {
            sync_ticker(&mut ticker, controller.countdown_running(), tick_interval);

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => execute(&mut controller, settings.as_ref(), command).await,
                },
                Some(event) = events.recv() => controller.handle_event(event),
                _ = next_tick(&mut ticker) => controller.tick(),
            }
        }

        if controller.state().is_active() {
            debug!("runner stopping, abandoning running session");
            let _ = controller.abandon();
        }
    }
}

async fn execute(
    controller: &mut VendSessionController,
    settings: &dyn SettingsStore,
    command: Command,
) {
    match command {
        Command::Start { machine, reply } => {
            let result = match settings.simulation_mode().await {
                Ok(mode) => controller.start(machine, mode.into()),
                Err(e) => {
                    warn!(error = %e, "failed to read settings");
                    Err(e)
                }
            };
            let _ = reply.send(result);
        }
        Command::Approve { payload, reply } => {
            let _ = reply.send(controller.approve(payload));
        }
        Command::Abandon { reply } => {
            let _ = reply.send(controller.abandon());
        }
        Command::Shutdown => {}
    }
}

/// Creates the ticker when the countdown starts and drops it when it stops.
fn sync_ticker(ticker: &mut Option<Interval>, running: bool, period: Duration) {
    match (running, ticker.is_some()) {
        (true, false) => {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *ticker = Some(interval);
        }
        (false, true) => *ticker = None,
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
