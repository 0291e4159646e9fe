//! # hqtrack
//!
//! Device-side simulator for GPS trackers speaking the HQ text protocol
//! (`*HQ,...#`), in its GT06 and Autoseeker dialects.
//!
//! ## Features
//!
//! - Frame reassembly across reads, tolerant of garbage between frames
//! - Handler tables for both dialects with exact acknowledgment layouts
//! - Periodic telemetry driven by working mode, with seedable movement
//! - Injectable clock and transport for deterministic tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use hqtrack::{Dialect, Simulator, SimulatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> hqtrack::Result<()> {
//!     let config = SimulatorConfig::new("localhost", 8888, Dialect::Autoseeker);
//!     let mut sim = Simulator::new(config);
//!
//!     sim.start().await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!
//!     println!("{:?}", sim.device().snapshot().status);
//!     sim.stop().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod report;
pub mod simulator;
pub mod telemetry;

// Re-exports
pub use config::{Behavior, SimulatorConfig};
pub use device::{DeviceState, SharedDevice};
pub use dispatch::{CommandContext, Dispatcher, FollowUp, Handler, Reply};
pub use error::{Error, Result};
pub use simulator::Simulator;
pub use telemetry::TelemetryScheduler;

// Re-export protocol and data types
pub use hqtrack_core::{CommandCode, Dialect, Frame, FrameDecoder, Packet, Session, SessionState};
pub use hqtrack_transport::{DuplexTransport, TcpTransport, Transport};
pub use hqtrack_types::{
    Clock, DeviceStatus, FixValidity, FixedClock, Location, SystemClock, WorkingMode,
};
