//! Simulator configuration

use std::time::Duration;

use hqtrack_core::constants::{self, telemetry};
use hqtrack_core::Dialect;

/// Randomized behavior of the simulated device
///
/// Defaults come from [`hqtrack_core::constants::telemetry`].
#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    /// Chance a report tick also moves the device
    pub movement_probability: f64,

    /// Chance a power-saving tick reports
    pub power_saving_report_probability: f64,

    /// Chance a GT06 tick is followed by a heartbeat
    pub heartbeat_probability: f64,

    /// Chance an Autoseeker tick is followed by an alarm report
    pub alarm_probability: f64,

    /// Largest per-tick position change, degrees
    pub movement_delta_deg: f64,

    /// Top speed of a moving device
    pub max_speed_kmh: f64,

    pub power_saving_interval: Duration,
    pub deep_sleep_interval: Duration,

    /// Pause after a failed scheduler iteration
    pub error_backoff: Duration,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            movement_probability: telemetry::MOVEMENT_PROBABILITY,
            power_saving_report_probability: telemetry::POWER_SAVING_REPORT_PROBABILITY,
            heartbeat_probability: telemetry::HEARTBEAT_PROBABILITY,
            alarm_probability: telemetry::ALARM_PROBABILITY,
            movement_delta_deg: telemetry::MOVEMENT_DELTA_DEG,
            max_speed_kmh: telemetry::MAX_SPEED_KMH,
            power_saving_interval: telemetry::POWER_SAVING_INTERVAL,
            deep_sleep_interval: telemetry::DEEP_SLEEP_INTERVAL,
            error_backoff: telemetry::ERROR_BACKOFF,
        }
    }
}

impl Behavior {
    /// Only scheduled reports: no heartbeats, no alarms
    pub fn reports_only() -> Self {
        Self {
            heartbeat_probability: 0.0,
            alarm_probability: 0.0,
            ..Self::default()
        }
    }

    pub fn with_heartbeat_probability(mut self, probability: f64) -> Self {
        self.heartbeat_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_alarm_probability(mut self, probability: f64) -> Self {
        self.alarm_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_movement_probability(mut self, probability: f64) -> Self {
        self.movement_probability = probability.clamp(0.0, 1.0);
        self
    }
}

/// Session configuration
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hqtrack::{Dialect, SimulatorConfig};
///
/// let config = SimulatorConfig::new("localhost", 8888, Dialect::Autoseeker)
///     .with_read_timeout(Duration::from_secs(2))
///     .with_seed(7);
///
/// assert_eq!(config.device_id, "8168000005");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Device identity sent in every packet
    pub device_id: String,

    pub dialect: Dialect,

    pub connect_timeout: Duration,

    /// Read timeout of the inbound loop; bounds how long it takes to notice
    /// a shutdown
    pub read_timeout: Duration,

    /// Longest a send may stall before the session is dropped
    pub write_timeout: Duration,

    /// Seed for the movement/alarm random source (entropy when `None`)
    pub seed: Option<u64>,

    pub behavior: Behavior,
}

impl SimulatorConfig {
    /// Configuration with the dialect's default identity
    pub fn new(host: impl Into<String>, port: u16, dialect: Dialect) -> Self {
        Self {
            host: host.into(),
            port,
            device_id: dialect.default_device_id().to_string(),
            dialect,
            connect_timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT),
            read_timeout: Duration::from_secs(constants::DEFAULT_READ_TIMEOUT),
            write_timeout: Duration::from_secs(constants::DEFAULT_WRITE_TIMEOUT),
            seed: None,
            behavior: Behavior::default(),
        }
    }

    /// Set device identity
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set write timeout
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Make random behavior reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_per_dialect() {
        let gt06 = SimulatorConfig::new("localhost", 8888, Dialect::Gt06);
        assert_eq!(gt06.device_id, "865205030330012");
        assert_eq!(gt06.read_timeout, Duration::from_secs(5));
        assert_eq!(gt06.write_timeout, Duration::from_secs(5));
        assert_eq!(gt06.seed, None);

        let auto = SimulatorConfig::new("localhost", 8888, Dialect::Autoseeker)
            .with_device_id("8168000099");
        assert_eq!(auto.device_id, "8168000099");
    }

    #[test]
    fn test_behavior_probabilities_clamped() {
        let behavior = Behavior::default()
            .with_alarm_probability(1.5)
            .with_heartbeat_probability(-0.2);

        assert_eq!(behavior.alarm_probability, 1.0);
        assert_eq!(behavior.heartbeat_probability, 0.0);
    }

    #[test]
    fn test_reports_only() {
        let behavior = Behavior::reports_only();
        assert_eq!(behavior.alarm_probability, 0.0);
        assert_eq!(behavior.heartbeat_probability, 0.0);
        assert_eq!(behavior.movement_probability, telemetry::MOVEMENT_PROBABILITY);
    }
}
