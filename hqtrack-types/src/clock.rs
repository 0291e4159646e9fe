//! Wall-clock source for packet timestamps
//!
//! Every outbound packet carries local `HHMMSS`/`DDMMYY` fields. Going through
//! [`Clock`] instead of calling `chrono::Local::now()` directly lets tests pin
//! the time and assert exact wire output.

use std::fmt;

use chrono::{Local, NaiveDateTime};

/// Source of the current local time
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Format a time as the protocol's `HHMMSS`
pub fn wire_time(at: NaiveDateTime) -> String {
    at.format("%H%M%S").to_string()
}

/// Format a date as the protocol's `DDMMYY`
pub fn wire_date(at: NaiveDateTime) -> String {
    at.format("%d%m%y").to_string()
}
