//! Drive a synthetic world at 20 Hz and exercise every pacing mode.
//!
//! ```text
//! RUST_LOG=debug cargo run -p cadence-engine --example pacing_demo
//! ```

use std::error::Error;
use std::thread;
use std::time::Duration;

use cadence_bench::{reference_profile, SyntheticWorld};
use cadence_engine::{CadenceConfig, Command, ProfileMode, RealtimeTicker, TickDriver};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CadenceConfig::default();
    let driver = TickDriver::new(&config)?;
    let world = SyntheticWorld::new(&reference_profile(), 42);
    let ticker = RealtimeTicker::spawn(driver, world, &config.realtime)?;

    let script = [
        Command::StartProfiling {
            rounds: 40,
            mode: ProfileMode::Basics,
        },
        Command::Mspt,
        Command::Accelerate(4),
        Command::Query,
        Command::Reset,
        Command::Forward(1500),
        Command::Warp(200),
        Command::Warp(10),
        Command::Reset,
        Command::SlowDown(3),
        Command::Query,
        Command::Reset,
        Command::StartProfiling {
            rounds: 20,
            mode: ProfileMode::Chunk,
        },
        Command::Freeze,
        Command::Reset,
    ];

    for command in script {
        let reply = ticker.submit(command)?;
        info!(?command, success = reply.success, "{}", reply.message);
        thread::sleep(Duration::from_millis(500));
    }

    // Let the chunk session finish.
    thread::sleep(Duration::from_secs(2));
    let (driver, world) = ticker.shutdown()?;
    info!(
        steps = world.steps(),
        mspt = driver.mean_mspt(),
        tps = driver.mean_tps(),
        "demo finished"
    );
    Ok(())
}
