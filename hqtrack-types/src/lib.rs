//! Type definitions for hqtrack

pub mod clock;
pub mod error;
pub mod location;
pub mod status;

pub use clock::{wire_date, wire_time, Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use location::{FixValidity, Location};
pub use status::{DeviceStatus, WorkingMode};
