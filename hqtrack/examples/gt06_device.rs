//! GT06 device talking to a tracking server
//!
//! ```text
//! TRACKER_HOST=10.0.0.5 TRACKER_PORT=8888 RUST_LOG=hqtrack=debug \
//!     cargo run --example gt06_device
//! ```

use hqtrack::{Dialect, Simulator, SimulatorConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let host = std::env::var("TRACKER_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port: u16 = match std::env::var("TRACKER_PORT") {
        Ok(port) => port.parse()?,
        Err(_) => hqtrack_core::constants::DEFAULT_PORT,
    };

    let mut config = SimulatorConfig::new(host, port, Dialect::Gt06);
    if let Ok(imei) = std::env::var("DEVICE_ID") {
        config = config.with_device_id(imei);
    }

    println!("GT06 device {} -> {}:{}", config.device_id, config.host, config.port);

    let mut sim = Simulator::new(config);
    sim.start().await?;
    println!("✓ Running, Ctrl+C to stop");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("Stopping device...");
        }
        _ = sim.wait() => {
            println!("Connection closed by server");
        }
    }

    sim.stop().await?;

    let session = sim.session();
    println!(
        "✓ Stopped ({} frames received, {} packets sent)",
        session.frames_received(),
        session.packets_sent()
    );

    Ok(())
}
