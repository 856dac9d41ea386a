use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use vend_session::application::controller::VendSessionController;
use vend_session::application::runner::{RunnerOptions, SessionRunner};
use vend_session::domain::countdown::DEFAULT_COUNTDOWN_BUDGET;
use vend_session::domain::event::SessionEvent;
use vend_session::domain::machine::Machine;
use vend_session::domain::outcome::Outcome;
use vend_session::domain::ports::{Notification, SettingsStore, SettingsStoreBox};
use vend_session::domain::receipt::Receipt;
use vend_session::domain::session::SessionState;
use vend_session::domain::settings::{CannedOutcome, SimulationMode};
use vend_session::infrastructure::channel_presenter::ChannelPresenter;
use vend_session::infrastructure::in_memory::InMemorySettingsStore;
#[cfg(feature = "storage-rocksdb")]
use vend_session::infrastructure::rocksdb::RocksDBSettingsStore;
use vend_session::infrastructure::scripted::ScriptedConnector;
use vend_session::infrastructure::simulated::SimulatedConnector;
use vend_session::interfaces::csv::notification_writer::NotificationWriter;
use vend_session::interfaces::csv::script_reader::{ScriptReader, ScriptStep};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one vend session and print its notifications as CSV
    Simulate(SimulateArgs),
    /// Drive a session from a CSV event script
    Replay {
        /// Event script CSV file
        script: PathBuf,

        /// Countdown ticks granted for item selection
        #[arg(long, default_value_t = DEFAULT_COUNTDOWN_BUDGET)]
        countdown: u32,
    },
}

#[derive(Args)]
struct SimulateArgs {
    /// Canned outcome to simulate. Persisted into the settings store.
    #[arg(long, value_enum, conflicts_with = "real")]
    outcome: Option<CannedOutcome>,

    /// Use a real transport instead of a simulation. Persisted into the settings store.
    #[arg(long)]
    real: bool,

    /// Path to persistent settings database (optional). If provided, uses RocksDB.
    #[arg(long)]
    settings_db: Option<PathBuf>,

    /// Machine description as JSON. Defaults to the demo machine.
    #[arg(long)]
    machine: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_COUNTDOWN_BUDGET)]
    countdown: u32,

    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    /// Delay before the simulated machine asks for authorization
    #[arg(long, default_value_t = 0)]
    selection_delay_ms: u64,

    /// Delay before the authorization request is approved
    #[arg(long, default_value_t = 2000)]
    approve_delay_ms: u64,

    #[arg(long, default_value = "dummyPayload")]
    payload: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate(args) => simulate(args).await,
        Command::Replay { script, countdown } => replay(script, countdown),
    }
}

fn settings_store(path: Option<PathBuf>) -> Result<SettingsStoreBox> {
    match path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBSettingsStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "WARNING: Persistent settings requested via --settings-db, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory settings."
            );
            Ok(Box::new(InMemorySettingsStore::new()))
        }
        None => Ok(Box::new(InMemorySettingsStore::new())),
    }
}

async fn simulate(args: SimulateArgs) -> Result<()> {
    let settings = settings_store(args.settings_db)?;
    if args.real {
        settings
            .set_simulation_mode(SimulationMode::Off)
            .await
            .into_diagnostic()?;
    } else if let Some(outcome) = args.outcome {
        settings
            .set_simulation_mode(SimulationMode::Canned(outcome))
            .await
            .into_diagnostic()?;
    }

    let machine = match args.machine {
        Some(path) => {
            let data = std::fs::read(path).into_diagnostic()?;
            Machine::from_json(&data).into_diagnostic()?
        }
        None => Machine::demo(),
    };

    let mut connector = SimulatedConnector::new();
    if args.selection_delay_ms > 0 {
        connector = connector.with_selection_delay(Duration::from_millis(args.selection_delay_ms));
    }

    let (tx, mut notifications) = unbounded_channel();
    let options = RunnerOptions {
        countdown_budget: args.countdown,
        tick_interval: Duration::from_millis(args.tick_ms.max(1)),
    };
    let (runner, handle) = SessionRunner::new(
        Box::new(connector),
        Box::new(ChannelPresenter::new(tx)),
        settings,
        options,
    );
    let task = runner.spawn();

    let mut writer = NotificationWriter::new(io::stdout()).into_diagnostic()?;
    handle.start(machine.clone()).await.into_diagnostic()?;

    while let Some(notification) = notifications.recv().await {
        writer.write(&notification).into_diagnostic()?;
        match notification {
            Notification::StateChanged(SessionState::Authorizing) => {
                tokio::time::sleep(Duration::from_millis(args.approve_delay_ms)).await;
                if let Err(e) = handle.approve(args.payload.clone()).await {
                    warn!(error = %e, "approval not accepted");
                }
            }
            Notification::Outcome(outcome) => {
                match &outcome {
                    Outcome::Completed { .. } => {
                        if let Some(receipt) = Receipt::for_outcome(&machine, &outcome) {
                            writer.write_receipt(&receipt).into_diagnostic()?;
                        }
                    }
                    Outcome::Failed(error) => eprintln!("{}", error),
                }
                break;
            }
            _ => {}
        }
    }

    handle.shutdown();
    task.await.into_diagnostic()?;
    Ok(())
}

fn replay(script: PathBuf, countdown: u32) -> Result<()> {
    let file = File::open(script).into_diagnostic()?;
    let (events_tx, mut events) = unbounded_channel();
    let (tx, mut notifications) = unbounded_channel();

    let mut controller = VendSessionController::new(
        Box::new(ScriptedConnector::new()),
        Box::new(ChannelPresenter::new(tx)),
        events_tx,
    )
    .with_countdown_budget(countdown);
    let mut writer = NotificationWriter::new(io::stdout()).into_diagnostic()?;
    let mut current = None;

    for step_result in ScriptReader::new(file).steps() {
        let step = match step_result {
            Ok(step) => step,
            Err(e) => {
                error!("Error reading script step: {}", e);
                continue;
            }
        };

        let rejected = match step {
            ScriptStep::Start => match controller.start(Machine::demo(), SimulationMode::Off.into()) {
                Ok(id) => {
                    current = Some(id);
                    None
                }
                Err(e) => Some(e),
            },
            ScriptStep::Transport(event) => {
                // Events before the first start have nowhere to go.
                if let Some(session) = current {
                    controller.handle_event(SessionEvent { session, event });
                }
                None
            }
            ScriptStep::Tick => {
                controller.tick();
                None
            }
            ScriptStep::Approve(payload) => controller.approve(payload).err(),
            ScriptStep::Abandon => controller.abandon().err(),
        };
        if let Some(e) = rejected {
            warn!("Script command rejected: {}", e);
        }

        while let Ok(event) = events.try_recv() {
            controller.handle_event(event);
        }
        while let Ok(notification) = notifications.try_recv() {
            writer.write(&notification).into_diagnostic()?;
        }
    }

    Ok(())
}
