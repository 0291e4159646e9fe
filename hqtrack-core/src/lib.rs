//! # hqtrack-core
//!
//! Core protocol implementation for HQ text-protocol GPS trackers.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame reassembly (`*...#`)
//! - Packet parsing and rendering
//! - Coordinate encoding
//! - Command codes and dialect rules
//! - Protocol constants

pub mod command;
pub mod constants;
pub mod coordinate;
pub mod dialect;
pub mod error;
pub mod frame;
pub mod packet;
pub mod session;

pub use command::CommandCode;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use frame::{Frame, FrameDecoder};
pub use packet::Packet;
pub use session::{Session, SessionState};
