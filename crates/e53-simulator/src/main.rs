//! Desktop simulator for the E53 example applications.
//!
//! Runs the e53-core loops against simulated chips on a fake I2C bus.
//! Output pins and cloud reports are written to the log at `info`; set
//! `RUST_LOG=debug` for per-sample values.
//!
//! # Usage
//!
//! ```bash
//! # Agriculture board: fill light and motor thresholds
//! e53-simulator environment --cycles 20
//!
//! # Smart cover: baseline and cover-moved LEDs
//! e53-simulator motion --cycles 10 --interval-ms 200
//!
//! # Infrared intrusion with cloud reports, or with the broker unreachable
//! e53-simulator intrusion --cycles 3
//! e53-simulator intrusion --cycles 3 --offline
//! ```

mod chips;
mod io;

use std::time::Duration;

use clap::{Parser, Subcommand};
use embassy_futures::block_on;
use embassy_futures::select::{Either, select};
use log::{error, info};

use e53_core::apps::{AppError, CloudContext, EnvironmentApp, IntrusionApp, MotionApp};
use e53_core::boards::{E53Ia1, E53Is1, E53Sc2, TripSignal};
use e53_core::config::CloudConfig;
use e53_core::config::intrusion::ALARM_DURATION_MS;

use chips::SimulatedBus;
use io::{HostDelay, LogSink, LoggedPin, ScriptedTripInput};

/// Board delays are divided by this so init and alarms do not stall the run.
const DELAY_SCALE: u32 = 10;

#[derive(Parser)]
#[command(name = "e53-simulator")]
#[command(version)]
#[command(about = "Run the E53 example applications against simulated hardware")]
struct Cli {
    #[command(subcommand)]
    app: App,

    /// Number of polls (or infrared trips) to simulate
    #[arg(short, long, global = true, default_value_t = 10)]
    cycles: u32,

    /// Time between polls or trips, in milliseconds
    #[arg(short, long, global = true, default_value_t = 1000)]
    interval_ms: u64,
}

#[derive(Subcommand)]
enum App {
    /// E53_IA1: light and motor driven by illuminance, humidity and temperature
    Environment,
    /// E53_SC2: LEDs D1/D2 flag a moved cover
    Motion,
    /// E53_IS1: buzzer and cloud report on an infrared trip
    Intrusion {
        /// Simulate a broker that never connected
        #[arg(long)]
        offline: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let interval = Duration::from_millis(cli.interval_ms);

    let result = match cli.app {
        App::Environment => block_on(environment(cli.cycles, interval)),
        App::Motion => block_on(motion(cli.cycles, interval)),
        App::Intrusion { offline } => block_on(intrusion(cli.cycles, interval, offline)),
    };

    if let Err(e) = result {
        error!("Simulation stopped: {}", e);
        std::process::exit(1);
    }
    info!("Simulator exiting");
}

async fn environment(cycles: u32, interval: Duration) -> Result<(), AppError> {
    info!("Starting E53_IA1 simulation ({} cycles)", cycles);

    let mut board = E53Ia1::new(SimulatedBus::new(), HostDelay::new(DELAY_SCALE));
    board.init().await?;

    let mut app = EnvironmentApp::new(
        board,
        LoggedPin::new("light"),
        LoggedPin::new("motor"),
        HostDelay::new(1),
    );
    for _ in 0..cycles {
        app.step().await?;
        std::thread::sleep(interval);
    }
    Ok(())
}

async fn motion(cycles: u32, interval: Duration) -> Result<(), AppError> {
    info!("Starting E53_SC2 simulation ({} cycles)", cycles);

    let mut board = E53Sc2::new(SimulatedBus::new(), HostDelay::new(DELAY_SCALE));
    board.init().await?;

    let mut app = MotionApp::new(
        board,
        LoggedPin::new("D1"),
        LoggedPin::new("D2"),
        HostDelay::new(1),
    );
    for _ in 0..cycles {
        app.step().await?;
        std::thread::sleep(interval);
    }
    Ok(())
}

async fn intrusion(trips: u32, interval: Duration, offline: bool) -> Result<(), AppError> {
    info!(
        "Starting E53_IS1 simulation ({} trips, {})",
        trips,
        if offline { "offline" } else { "online" }
    );

    let cloud_config = CloudConfig::default();
    let cloud = CloudContext::new();
    cloud.set_connected(!offline);

    let trip = TripSignal::new();
    let mut sink = LogSink::new();
    let mut watcher = E53Is1::new(ScriptedTripInput::new(trips, interval));
    let mut app = IntrusionApp::new(
        LoggedPin::new("buzzer"),
        &mut sink,
        HostDelay::new(DELAY_SCALE),
        &cloud,
        cloud_config.device_id,
    )?;

    let outcome = select(watcher.watch(&trip), app.run(&trip)).await;
    drop(app);

    match outcome {
        // The scripted input fails once its trips are used up.
        Either::First(Err(_)) => {
            info!(
                "Trip script finished: {} reports published, alarm {} ms per trip",
                sink.published,
                ALARM_DURATION_MS
            );
            Ok(())
        }
        Either::Second(Err(e)) => Err(e),
    }
}
