//! Autoseeker device with reproducible movement
//!
//! `SEED` pins the random source, so two runs against the same server send
//! the same positions.

use hqtrack::{Dialect, Simulator, SimulatorConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let host = std::env::var("TRACKER_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port: u16 = std::env::var("TRACKER_PORT")
        .ok()
        .map(|p| p.parse())
        .transpose()?
        .unwrap_or(8888);

    let mut config = SimulatorConfig::new(host, port, Dialect::Autoseeker);
    if let Ok(id) = std::env::var("DEVICE_ID") {
        config = config.with_device_id(id);
    }
    if let Ok(seed) = std::env::var("SEED") {
        config = config.with_seed(seed.parse()?);
    }

    let mut sim = Simulator::new(config);
    sim.start().await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sim.wait() => {}
    }

    sim.stop().await?;

    let state = sim.device().snapshot();
    println!("Final position: {}", state.location);
    println!(
        "Interval {}s, ACC {}, fuel cut {}, fence {}",
        state.status.upload_interval_secs(),
        state.status.acc_status,
        state.status.fuel_cut,
        state.status.geofence_enabled
    );

    Ok(())
}
