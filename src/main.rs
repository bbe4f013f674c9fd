//! QuietGuard — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GroveBoard / DfRobotBoard   EventLog        MonotonicClock    │
//! │  (BoardPort)                 (EventSink)     (timer clock)     │
//! │  http::serve                 NotifyWorker                      │
//! │  (SubmissionInbox producer)  (datastore · SMS gateway)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AlarmController (pure logic)              │    │
//! │  │  FSM · timers · access code                            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use tokio::time::MissedTickBehavior;

use quietguard::adapters::board::{build_board, DynBoard};
use quietguard::adapters::event_log::EventLog;
use quietguard::adapters::http::{self, AdmissionState};
use quietguard::adapters::notify::{self, Backend};
use quietguard::adapters::time::MonotonicClock;
use quietguard::app::service::AlarmController;
use quietguard::channels::SubmissionInbox;
use quietguard::config::{BoardKind, SystemConfig};
use quietguard::error::Error as BootError;

// ── CLI ───────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "quietguard")]
#[command(version, about = "Noise-triggered access alarm controller")]
struct Args {
    /// JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Override the board kit from the config file
    #[arg(long, value_enum)]
    kit: Option<KitArg>,

    /// Override the HTTP port from the config file
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KitArg {
    Grove,
    Dfrobot,
}

impl From<KitArg> for BoardKind {
    fn from(kit: KitArg) -> Self {
        match kit {
            KitArg::Grove => Self::Grove,
            KitArg::Dfrobot => Self::Dfrobot,
        }
    }
}

// ── Bring-up ──────────────────────────────────────────────────

fn load_config(args: &Args) -> Result<SystemConfig, BootError> {
    let mut config = SystemConfig::load(&args.config)?;
    if let Some(kit) = args.kit {
        config.kit = kit.into();
    }
    if let Some(port) = args.port {
        config.http_port = port;
    }
    Ok(config)
}

fn bring_up_board(config: &SystemConfig) -> Result<DynBoard, BootError> {
    info!("Board: {:?} kit", config.kit);
    Ok(build_board(config)?)
}

fn start_notifications(config: &SystemConfig) -> Result<EventLog> {
    let backends = Backend::from_config(config);
    if backends.is_empty() {
        info!("Notify: no backends configured, events are logged only");
        return Ok(EventLog::new());
    }
    let (dispatcher, worker) =
        notify::channel(backends).context("building notification client")?;
    info!("Notify: {} backend(s) configured", worker.backend_count());
    tokio::spawn(worker.run());
    Ok(EventLog::with_dispatcher(dispatcher))
}

// ── Main ──────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("QuietGuard v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let args = Args::parse();
    let config = load_config(&args)
        .with_context(|| format!("loading {}", args.config.display()))?;

    // ── 3. Board ──────────────────────────────────────────────
    let mut board = bring_up_board(&config).context("board bring-up failed")?;

    // ── 4. Event log + notification worker ────────────────────
    let mut sink = start_notifications(&config)?;

    // ── 5. Controller + admission endpoint ────────────────────
    let inbox = SubmissionInbox::new();
    let mut controller = AlarmController::new(&config, inbox.clone());

    let admission = AdmissionState::new(inbox, config.submission_rate_per_sec);
    let port = config.http_port;
    let mut server = tokio::spawn(async move { http::serve(admission, port).await });

    let clock = MonotonicClock::new();
    controller.start(clock.now_ms(), &mut board, &mut sink);
    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let mut ticker = tokio::time::interval(Duration::from_millis(config.poll_interval_ms.into()));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                controller.tick(clock.now_ms(), &mut board, &mut sink);
            }
            result = &mut server => {
                match result {
                    Ok(Ok(())) => warn!("HTTP server stopped"),
                    Ok(Err(e)) => error!("HTTP server failed: {e}"),
                    Err(e) => error!("HTTP server task aborted: {e}"),
                }
                anyhow::bail!("admission endpoint is down");
            }
            _ = tokio::signal::ctrl_c() => {
                info!(
                    "Shutdown requested after {}s in {:?}",
                    clock.uptime_secs(),
                    controller.state()
                );
                return Ok(());
            }
        }
    }
}
