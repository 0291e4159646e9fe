//! Position and motion of a simulated tracker

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// GPS fix validity flag as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixValidity {
    /// `A` - the receiver has a position fix
    #[default]
    Valid,

    /// `V` - no fix, position is the last known one
    Invalid,
}

impl FixValidity {
    /// Wire representation (`A` or `V`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "A",
            Self::Invalid => "V",
        }
    }
}

impl fmt::Display for FixValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixValidity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(Self::Valid),
            "V" => Ok(Self::Invalid),
            other => Err(Error::UnknownFixValidity(other.to_owned())),
        }
    }
}

/// Current position and motion of the device
///
/// Heading is kept in `[0, 360)` and speed is never negative; both are
/// normalized on every write.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees (positive north)
    pub latitude: f64,

    /// Longitude in decimal degrees (positive east)
    pub longitude: f64,

    speed_kmh: f64,
    heading_deg: u16,

    /// Fix validity reported with the position
    pub fix: FixValidity,
}

impl Location {
    /// Create a stationary location with a valid fix
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            speed_kmh: 0.0,
            heading_deg: 0,
            fix: FixValidity::Valid,
        }
    }

    /// Set speed and heading in one go
    pub fn with_motion(mut self, speed_kmh: f64, heading_deg: i32) -> Self {
        self.set_speed(speed_kmh);
        self.set_heading(heading_deg);
        self
    }

    /// Ground speed in km/h
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Heading in whole degrees, `0..360`
    pub fn heading_deg(&self) -> u16 {
        self.heading_deg
    }

    /// Set ground speed; negative and non-finite values clamp to zero
    pub fn set_speed(&mut self, speed_kmh: f64) {
        self.speed_kmh = if speed_kmh.is_finite() && speed_kmh > 0.0 {
            speed_kmh
        } else {
            0.0
        };
    }

    /// Set heading, wrapping any integer into `[0, 360)`
    pub fn set_heading(&mut self, heading_deg: i32) {
        // rem_euclid keeps the result in 0..360
        self.heading_deg = heading_deg.rem_euclid(360) as u16;
    }

    /// Shift the position by the given deltas in degrees
    pub fn offset(&mut self, d_lat: f64, d_lon: f64) {
        self.latitude += d_lat;
        self.longitude += d_lon;
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}) {:.1} km/h @ {}° [{}]",
            self.latitude, self.longitude, self.speed_kmh, self.heading_deg, self.fix
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heading_wraps() {
        let mut loc = Location::new(10.0, 20.0);

        loc.set_heading(360);
        assert_eq!(loc.heading_deg(), 0);

        loc.set_heading(725);
        assert_eq!(loc.heading_deg(), 5);

        loc.set_heading(-90);
        assert_eq!(loc.heading_deg(), 270);
    }

    #[test]
    fn test_speed_never_negative() {
        let mut loc = Location::new(10.0, 20.0);

        loc.set_speed(-3.5);
        assert_eq!(loc.speed_kmh(), 0.0);

        loc.set_speed(f64::NAN);
        assert_eq!(loc.speed_kmh(), 0.0);

        loc.set_speed(42.25);
        assert_eq!(loc.speed_kmh(), 42.25);
    }

    #[test]
    fn test_fix_validity_wire() {
        assert_eq!(FixValidity::Valid.as_str(), "A");
        assert_eq!("V".parse::<FixValidity>().unwrap(), FixValidity::Invalid);
        assert!("X".parse::<FixValidity>().is_err());
    }
}
