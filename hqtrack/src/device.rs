//! Simulated device state

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use hqtrack_core::constants::defaults;
use hqtrack_core::coordinate::{self, Axis, Precision};
use hqtrack_core::{Dialect, Result};
use hqtrack_types::{DeviceStatus, Location};

/// Mutable state of one simulated tracker
///
/// The identity and dialect are fixed at construction. `location` is moved
/// by the telemetry scheduler (or by tests); `status` is written only by
/// command handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    device_id: String,
    dialect: Dialect,

    pub location: Location,
    pub status: DeviceStatus,
}

impl DeviceState {
    /// Device in the dialect's factory state
    pub fn new(dialect: Dialect, device_id: impl Into<String>) -> Self {
        let ((lat, lon), interval, mask) = match dialect {
            Dialect::Gt06 => (
                defaults::GT06_POSITION,
                defaults::GT06_UPLOAD_INTERVAL_SECS,
                defaults::GT06_STATUS_MASK,
            ),
            Dialect::Autoseeker => (
                defaults::AUTOSEEKER_POSITION,
                defaults::AUTOSEEKER_UPLOAD_INTERVAL_SECS,
                defaults::AUTOSEEKER_STATUS_MASK,
            ),
        };

        Self {
            device_id: device_id.into(),
            dialect,
            location: Location::new(lat, lon),
            status: DeviceStatus::new(interval, mask),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether this identity is a G200-model GT06 (battery in heartbeats)
    pub fn is_g200(&self) -> bool {
        self.dialect == Dialect::Gt06 && self.device_id.starts_with(defaults::G200_IMEI_PREFIX)
    }

    /// Position block shared by reports and acknowledgments:
    /// `validity, lat, N/S, lon, E/W, speed, heading`
    pub fn position_fields(&self, precision: Precision) -> Result<Vec<String>> {
        let loc = &self.location;
        let [lat, ns] = coordinate::encode(loc.latitude, Axis::Latitude, precision)?.into_fields();
        let [lon, ew] =
            coordinate::encode(loc.longitude, Axis::Longitude, precision)?.into_fields();

        Ok(vec![
            loc.fix.to_string(),
            lat,
            ns,
            lon,
            ew,
            format!("{:05.2}", loc.speed_kmh()),
            format!("{:03}", loc.heading_deg()),
        ])
    }
}

/// Device state shared by the inbound and outbound loops
///
/// All access goes through one mutex. Guards must not be held across an
/// `.await`.
#[derive(Debug, Clone)]
pub struct SharedDevice {
    inner: Arc<Mutex<DeviceState>>,
}

impl SharedDevice {
    pub fn new(state: DeviceState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.inner.lock()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> DeviceState {
        self.inner.lock().clone()
    }

    /// Replace the location (test injection)
    pub fn set_location(&self, location: Location) {
        self.inner.lock().location = location;
    }
}
