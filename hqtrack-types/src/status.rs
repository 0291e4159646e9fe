//! Device status flags

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Reporting/power mode of a GT06-family device
///
/// Only changed by an explicit mode command; there are no automatic
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum WorkingMode {
    /// Report every upload interval
    #[default]
    Realtime = 0,

    /// Wake once a minute, report only when moving
    PowerSaving = 1,

    /// Wake every five minutes, report nothing
    DeepSleep = 2,
}

impl WorkingMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Realtime => "real-time tracking",
            Self::PowerSaving => "power saving",
            Self::DeepSleep => "deep sleep",
        }
    }
}

impl From<WorkingMode> for u8 {
    fn from(mode: WorkingMode) -> u8 {
        mode as u8
    }
}

impl TryFrom<u8> for WorkingMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Realtime),
            1 => Ok(Self::PowerSaving),
            2 => Ok(Self::DeepSleep),
            _ => Err(Error::UnknownWorkingMode(value.to_string())),
        }
    }
}

impl FromStr for WorkingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw: u8 = s
            .trim()
            .parse()
            .map_err(|_| Error::UnknownWorkingMode(s.to_owned()))?;
        Self::try_from(raw)
    }
}

impl fmt::Display for WorkingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u8)
    }
}

/// Mutable status bundle of a simulated device
///
/// Written only by command handlers, read by the telemetry scheduler and the
/// acknowledgment builders. Last write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    upload_interval_secs: u32,

    /// Working mode (GT06 only; Autoseeker devices stay in real-time)
    pub working_mode: WorkingMode,

    /// ACC (ignition) line as reported by the last interval command
    pub acc_status: u8,

    /// Fuel/electricity supply cut
    pub fuel_cut: bool,

    /// Geofence armed
    pub geofence_enabled: bool,

    battery_percent: u8,

    /// Opaque status bitmask echoed in telemetry
    pub status_mask: String,
}

impl DeviceStatus {
    pub fn new(upload_interval_secs: u32, status_mask: impl Into<String>) -> Self {
        Self {
            upload_interval_secs: upload_interval_secs.max(1),
            working_mode: WorkingMode::Realtime,
            acc_status: 1,
            fuel_cut: false,
            geofence_enabled: false,
            battery_percent: 100,
            status_mask: status_mask.into(),
        }
    }

    /// Seconds between telemetry reports in real-time mode
    pub fn upload_interval_secs(&self) -> u32 {
        self.upload_interval_secs
    }

    /// Set the upload interval; zero is rejected
    pub fn set_upload_interval(&mut self, secs: u32) -> Result<()> {
        if secs == 0 {
            return Err(Error::InvalidUploadInterval(secs));
        }
        self.upload_interval_secs = secs;
        Ok(())
    }

    pub fn battery_percent(&self) -> u8 {
        self.battery_percent
    }

    /// Set battery level, clamped to 100
    pub fn set_battery_percent(&mut self, percent: u8) {
        self.battery_percent = percent.min(100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_working_mode_conversion() {
        assert_eq!(u8::from(WorkingMode::DeepSleep), 2);
        assert_eq!(WorkingMode::try_from(1).unwrap(), WorkingMode::PowerSaving);
        assert_eq!("0".parse::<WorkingMode>().unwrap(), WorkingMode::Realtime);
        let err = WorkingMode::try_from(3).unwrap_err();
        assert!(matches!(err, Error::UnknownWorkingMode(v) if v == "3"));
        let err = "fast".parse::<WorkingMode>().unwrap_err();
        assert!(matches!(err, Error::UnknownWorkingMode(v) if v == "fast"));
    }

    #[test]
    fn test_upload_interval_rejects_zero() {
        let mut status = DeviceStatus::new(10, "F7FFBBFF");
        assert!(matches!(status.set_upload_interval(0), Err(Error::InvalidUploadInterval(0))));
        assert_eq!(status.upload_interval_secs(), 10);

        status.set_upload_interval(15).unwrap();
        assert_eq!(status.upload_interval_secs(), 15);
    }

    #[test]
    fn test_battery_clamped() {
        let mut status = DeviceStatus::new(5, "FFFFFBFF");
        status.set_battery_percent(250);
        assert_eq!(status.battery_percent(), 100);
    }
}
