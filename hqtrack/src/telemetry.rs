//! Telemetry scheduler
//!
//! Decides how long the outbound loop sleeps and what it sends when it
//! wakes up. All randomness comes from one seedable generator so a session
//! can be replayed exactly.
//!
//! | dialect / mode      | period            | per tick                                   |
//! |---------------------|-------------------|--------------------------------------------|
//! | GT06 real-time      | upload interval   | report, then maybe move                    |
//! | GT06 power-saving   | 60 s              | 30%: move and report                       |
//! | GT06 deep-sleep     | 300 s             | nothing                                    |
//! | GT06 (not sleeping) |                   | 20%: heartbeat                             |
//! | Autoseeker          | upload interval   | report with cell data, maybe move, 5% alarm |

use std::time::Duration;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use hqtrack_core::constants::{autoseeker, telemetry};
use hqtrack_core::{Dialect, Packet, Result};
use hqtrack_types::{FixValidity, Location, WorkingMode};

use crate::config::Behavior;
use crate::device::DeviceState;
use crate::report;

/// Produces the device-originated packets of each outbound tick
#[derive(Debug)]
pub struct TelemetryScheduler {
    dialect: Dialect,
    behavior: Behavior,
    rng: StdRng,
}

impl TelemetryScheduler {
    /// Create a scheduler; `seed` makes every random choice reproducible
    pub fn new(dialect: Dialect, behavior: Behavior, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            dialect,
            behavior,
            rng,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Sleep before the next tick
    pub fn next_delay(&self, state: &DeviceState) -> Duration {
        let interval = Duration::from_secs(u64::from(state.status.upload_interval_secs()));

        if !self.dialect.has_working_modes() {
            return interval;
        }

        match state.status.working_mode {
            WorkingMode::Realtime => interval,
            WorkingMode::PowerSaving => self.behavior.power_saving_interval,
            WorkingMode::DeepSleep => self.behavior.deep_sleep_interval,
        }
    }

    /// Run one tick against `state`, returning the packets to send in order
    ///
    /// # Errors
    ///
    /// Fails only when the position cannot be encoded. The movement applied
    /// before the failure is kept.
    pub fn tick(&mut self, state: &mut DeviceState, now: NaiveDateTime) -> Result<Vec<Packet>> {
        match self.dialect {
            Dialect::Gt06 => self.tick_gt06(state, now),
            Dialect::Autoseeker => self.tick_autoseeker(state, now),
        }
    }

    fn tick_gt06(&mut self, state: &mut DeviceState, now: NaiveDateTime) -> Result<Vec<Packet>> {
        let mut out = Vec::new();

        match state.status.working_mode {
            WorkingMode::Realtime => {
                out.push(report::position_report(state, now, &state.status.status_mask)?);
                self.wander(&mut state.location);
            }
            WorkingMode::PowerSaving => {
                if self.chance(self.behavior.power_saving_report_probability) {
                    self.step(&mut state.location);
                    out.push(report::position_report(state, now, &state.status.status_mask)?);
                } else {
                    trace!("Power saving tick without movement");
                }
            }
            WorkingMode::DeepSleep => {
                trace!("Deep sleep tick");
                return Ok(out);
            }
        }

        if self.chance(self.behavior.heartbeat_probability) {
            out.push(report::heartbeat(state));
        }

        Ok(out)
    }

    fn tick_autoseeker(
        &mut self,
        state: &mut DeviceState,
        now: NaiveDateTime,
    ) -> Result<Vec<Packet>> {
        let mut out = Vec::with_capacity(2);

        let mut heart = report::position_report(state, now, &state.status.status_mask)?;
        heart.extend([autoseeker::MCC, autoseeker::MNC, autoseeker::LAC]);
        heart.extend([
            self.rng.gen_range(telemetry::CELL_ID_RANGE),
            self.rng.gen_range(telemetry::GPS_SIGNAL_RANGE),
            self.rng.gen_range(telemetry::GSM_SIGNAL_RANGE),
            self.rng.gen_range(telemetry::VOLTAGE_RANGE),
        ]
        .map(|n| n.to_string()));
        out.push(heart);

        self.wander(&mut state.location);

        if self.chance(self.behavior.alarm_probability) {
            let mut alarm = report::position_report(state, now, autoseeker::ALARM_MASK)?;
            alarm.extend(autoseeker::ALARM_CELL);
            debug!("Raising simulated alarm");
            out.push(alarm);
        }

        Ok(out)
    }

    /// Movement model: move with the configured probability, else stand still
    fn wander(&mut self, location: &mut Location) {
        if self.chance(self.behavior.movement_probability) {
            self.step(location);
        } else {
            location.set_speed(0.0);
            location.fix = FixValidity::Valid;
        }
    }

    /// Random step: small position change, new speed and heading
    fn step(&mut self, location: &mut Location) {
        let delta = self.behavior.movement_delta_deg.abs();
        let max_speed = self.behavior.max_speed_kmh.max(0.0);

        location.offset(
            self.rng.gen_range(-delta..=delta),
            self.rng.gen_range(-delta..=delta),
        );
        location.set_speed(self.rng.gen_range(0.0..=max_speed));
        location.set_heading(self.rng.gen_range(0..360));
        location.fix = FixValidity::Valid;

        trace!("Moved to {}", location);
    }

    fn chance(&mut self, probability: f64) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            false
        } else if probability >= 1.0 {
            true
        } else {
            self.rng.gen_bool(probability)
        }
    }
}
