//! Protocol constants

use std::time::Duration;

/// Default server port of the tracking platform
pub const DEFAULT_PORT: u16 = 8888;

/// Default connection timeout (seconds)
pub const DEFAULT_TIMEOUT: u64 = 5;

/// Default read timeout (seconds)
pub const DEFAULT_READ_TIMEOUT: u64 = 5;

/// Default write timeout (seconds)
pub const DEFAULT_WRITE_TIMEOUT: u64 = 5;

/// Report tags
pub mod tags {
    /// Login
    pub const LOGIN: &str = "V0";

    /// Position report
    pub const REPORT: &str = "V1";

    /// Command acknowledgment
    pub const ACK: &str = "V4";

    /// Heartbeat
    pub const HEARTBEAT: &str = "HTBT";
}

/// Acknowledgment status tokens
pub mod ack {
    /// Command carried out
    pub const DONE: &str = "DONE";

    /// Setting restored
    pub const OK: &str = "OK";

    /// Fixed second field of the Autoseeker interval acknowledgment
    pub const INTERVAL_SUFFIX: &str = "65535";
}

/// Device defaults per dialect
pub mod defaults {
    /// GT06 start position (2240.55181N, 11358.32389E)
    pub const GT06_POSITION: (f64, f64) = (22.675865, 113.972065);

    /// Autoseeker start position (2234.9273N, 11354.3980E)
    pub const AUTOSEEKER_POSITION: (f64, f64) = (22.582122, 113.906633);

    pub const GT06_UPLOAD_INTERVAL_SECS: u32 = 5;
    pub const AUTOSEEKER_UPLOAD_INTERVAL_SECS: u32 = 10;

    pub const GT06_STATUS_MASK: &str = "FFFFFBFF";
    pub const AUTOSEEKER_STATUS_MASK: &str = "F7FFBBFF";

    /// Identities starting with this belong to the G200 model, whose
    /// heartbeat carries the battery level
    pub const G200_IMEI_PREFIX: &str = "86520503";
}

/// Status masks the Autoseeker firmware puts in acknowledgments
pub mod autoseeker {
    pub const INTERVAL_ACK_MASK: &str = "FFFFBBFF";
    pub const FUEL_ACK_MASK: &str = "F7FFBBFF";
    pub const FENCE_ACK_MASK: &str = "FFFFB9FF";
    pub const GENERIC_ACK_MASK: &str = "FFFFFBFF";

    /// Mask of the simulated alarm report
    pub const ALARM_MASK: &str = "FBFBBFF";

    /// Serving cell reported in acknowledgments (MCC, MNC, LAC, cell id)
    pub const ACK_CELL: [&str; 4] = ["460", "00", "10342", "3721"];

    /// Cell, signal and voltage fields of the alarm report
    pub const ALARM_CELL: [&str; 7] = ["460", "00", "10342", "4283", "10", "25", "128"];

    pub const MCC: &str = "460";
    pub const MNC: &str = "00";
    pub const LAC: &str = "10342";
}

/// Canned GT06 query answers
pub mod canned {
    /// Device state check type `1`: firmware version
    pub const FIRMWARE_VERSION: [&str; 2] = ["GW61D_ZDR_TK102_V2.6.2", "2016/07/28 21:16"];

    /// Device state, any other check type
    pub const OTHER_STATE: &str = "Additional device info";

    /// Basic state fields before the interval: APN, user, password, number,
    /// then two fixed flags
    pub const BASIC_STATE_PREFIX: [&str; 6] = ["CMNET", "", "", "13812341234", "1", "100"];

    /// Basic state field after the interval
    pub const BASIC_STATE_SIGNAL: &str = "8";

    /// LBS answer: MCC, MNC, cell count, then LAC/cell pairs
    pub const LBS: [&str; 9] = [
        "460", "00", "03", "009350", "004022", "009350", "004032", "009350", "004031",
    ];
}

/// Telemetry scheduler timing and probabilities
pub mod telemetry {
    use super::Duration;

    /// Chance a report tick also moves the device
    pub const MOVEMENT_PROBABILITY: f64 = 0.7;

    /// Chance a power-saving tick reports (and moves)
    pub const POWER_SAVING_REPORT_PROBABILITY: f64 = 0.3;

    /// Chance a GT06 tick is followed by a heartbeat
    pub const HEARTBEAT_PROBABILITY: f64 = 0.2;

    /// Chance an Autoseeker tick is followed by an alarm report
    pub const ALARM_PROBABILITY: f64 = 0.05;

    /// Largest per-tick change of latitude/longitude, degrees
    pub const MOVEMENT_DELTA_DEG: f64 = 0.001;

    /// Speed range of a moving device
    pub const MAX_SPEED_KMH: f64 = 80.0;

    /// Tick period in power-saving mode
    pub const POWER_SAVING_INTERVAL: Duration = Duration::from_secs(60);

    /// Tick period in deep-sleep mode
    pub const DEEP_SLEEP_INTERVAL: Duration = Duration::from_secs(300);

    /// Pause after a failed scheduler iteration
    pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

    /// Simulated reboot time after a restart command
    pub const RESTART_DELAY: Duration = Duration::from_secs(2);

    /// Autoseeker simulated cell id range
    pub const CELL_ID_RANGE: std::ops::RangeInclusive<u32> = 3000..=5000;

    /// GPS satellites in view
    pub const GPS_SIGNAL_RANGE: std::ops::RangeInclusive<u32> = 5..=15;

    /// GSM signal level
    pub const GSM_SIGNAL_RANGE: std::ops::RangeInclusive<u32> = 20..=30;

    /// Supply voltage
    pub const VOLTAGE_RANGE: std::ops::RangeInclusive<u32> = 25..=30;
}
