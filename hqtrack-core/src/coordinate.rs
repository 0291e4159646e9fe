//! Decimal degrees to `DDMM.MM` / `DDDMM.MM` wire text
//!
//! Latitude uses a two-digit degree field, longitude three. The minutes part
//! has two decimals in telemetry reports but only one in command
//! acknowledgments; both precisions are what real devices send.
//!
//! ```text
//!  22.582122 -> deg 22, min 34.92732
//!  telemetry:        "2234.93"
//!  acknowledgment:   "2234.9"
//! ```

use crate::error::{Error, Result};

/// Which axis is being encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Zero-padded width of the degree field
    pub fn degree_width(self) -> usize {
        match self {
            Self::Latitude => 2,
            Self::Longitude => 3,
        }
    }

    fn max_degrees(self) -> f64 {
        match self {
            Self::Latitude => 90.0,
            Self::Longitude => 180.0,
        }
    }

    fn hemisphere(self, value: f64) -> char {
        match (self, value.is_sign_negative()) {
            (Self::Latitude, false) => 'N',
            (Self::Latitude, true) => 'S',
            (Self::Longitude, false) => 'E',
            (Self::Longitude, true) => 'W',
        }
    }
}

/// Formatting of the minutes part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// `MM.MM`, used in `V1` reports
    Telemetry,

    /// `MM.M`, used in `V4` acknowledgments
    Acknowledgment,
}

impl Precision {
    fn width(self) -> usize {
        match self {
            Self::Telemetry => 5,
            Self::Acknowledgment => 4,
        }
    }

    fn decimals(self) -> usize {
        match self {
            Self::Telemetry => 2,
            Self::Acknowledgment => 1,
        }
    }
}

/// Encoded coordinate with its hemisphere letter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireCoordinate {
    pub value: String,
    pub hemisphere: char,
}

impl WireCoordinate {
    /// The two wire fields: value then hemisphere
    pub fn into_fields(self) -> [String; 2] {
        [self.value, self.hemisphere.to_string()]
    }
}

/// Format the magnitude of `degrees` with a `degree_width`-digit degree field
///
/// # Errors
///
/// Returns [`Error::InvalidCoordinate`] for non-finite values.
///
/// # Examples
///
/// ```
/// use hqtrack_core::coordinate::{to_wire, Precision};
///
/// assert_eq!(to_wire(22.582122, 2, Precision::Telemetry).unwrap(), "2234.93");
/// assert_eq!(to_wire(113.906633, 3, Precision::Acknowledgment).unwrap(), "11354.4");
/// ```
pub fn to_wire(degrees: f64, degree_width: usize, precision: Precision) -> Result<String> {
    if !degrees.is_finite() {
        return Err(Error::InvalidCoordinate(degrees));
    }

    let magnitude = degrees.abs();
    let whole = magnitude.floor();
    let minutes = (magnitude - whole) * 60.0;

    Ok(format!(
        "{:0dw$}{:0mw$.md$}",
        whole as u64,
        minutes,
        dw = degree_width,
        mw = precision.width(),
        md = precision.decimals(),
    ))
}

/// Encode one axis, range-checked, with its hemisphere
///
/// # Errors
///
/// Returns [`Error::InvalidCoordinate`] when the value is non-finite or
/// outside `±90` / `±180`.
pub fn encode(degrees: f64, axis: Axis, precision: Precision) -> Result<WireCoordinate> {
    if !degrees.is_finite() || degrees.abs() > axis.max_degrees() {
        return Err(Error::InvalidCoordinate(degrees));
    }

    Ok(WireCoordinate {
        value: to_wire(degrees, axis.degree_width(), precision)?,
        hemisphere: axis.hemisphere(degrees),
    })
}
