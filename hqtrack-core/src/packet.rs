//! HQ text protocol packet
//!
//! # Packet Structure
//!
//! ```text
//! *HQ,8168000005,D1,093000,015,1#
//! │ │  │          │  │      └──┴── arguments (index 4..)
//! │ │  │          │  └─────────── original timestamp HHMMSS (index 3)
//! │ │  │          └────────────── command code / report tag (index 2)
//! │ │  └───────────────────────── device identity (index 1)
//! │ └──────────────────────────── manufacturer tag (index 0)
//! └────────────────────────────── start sentinel, matched by the final '#'
//! ```
//!
//! Fields never contain `,`, `*` or `#`. There is no length prefix and no
//! checksum. Numeric fields are formatted by the caller; the packet only
//! splits and joins text.

use std::fmt;

use crate::{
    error::{Error, Result},
    frame::Frame,
};

/// Manufacturer tag that opens every packet
pub const MANUFACTURER: &str = "HQ";

/// Index of the device identity
pub const DEVICE_ID_INDEX: usize = 1;

/// Index of the command code or report tag
pub const CODE_INDEX: usize = 2;

/// Index of the original command timestamp
pub const TIMESTAMP_INDEX: usize = 3;

/// Index of the first command argument
pub const ARGS_INDEX: usize = 4;

/// Fewest fields a packet may have
pub const MIN_FIELDS: usize = 3;

/// A parsed frame, or an outbound frame before rendering
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    fields: Vec<String>,
}

impl Packet {
    /// Build a packet from already formatted fields
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Start an outbound packet: `HQ,<device id>,<tag>`
    ///
    /// # Examples
    ///
    /// ```
    /// use hqtrack_core::Packet;
    ///
    /// let login = Packet::outbound("865205030330012", "V0");
    /// assert_eq!(login.render(), "*HQ,865205030330012,V0#");
    /// ```
    pub fn outbound(device_id: &str, tag: &str) -> Self {
        Self::new([MANUFACTURER, device_id, tag])
    }

    /// Append one field
    pub fn push(&mut self, field: impl Into<String>) -> &mut Self {
        self.fields.push(field.into());
        self
    }

    /// Append several fields
    pub fn extend<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Parse frame text
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] if the text is not wrapped in `*`/`#`
    /// or splits into fewer than three fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use hqtrack_core::Packet;
    ///
    /// let packet = Packet::parse("*HQ,8168000005,R7,093000#").unwrap();
    /// assert_eq!(packet.device_id(), Some("8168000005"));
    /// assert_eq!(packet.code(), Some("R7"));
    ///
    /// assert!(Packet::parse("*onlyonefield#").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let body = text
            .trim()
            .strip_prefix('*')
            .and_then(|t| t.strip_suffix('#'))
            .ok_or_else(|| Error::MalformedFrame {
                reason: format!("missing sentinels in {text:?}"),
            })?;

        let fields: Vec<String> = body.split(',').map(str::to_owned).collect();

        if fields.len() < MIN_FIELDS {
            return Err(Error::MalformedFrame {
                reason: format!(
                    "expected at least {MIN_FIELDS} fields, got {}",
                    fields.len()
                ),
            });
        }

        Ok(Self { fields })
    }

    /// Parse a frame produced by [`FrameDecoder`](crate::FrameDecoder)
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        Self::parse(frame.as_str())
    }

    /// Render to wire text
    pub fn render(&self) -> String {
        format!("*{}#", self.fields.join(","))
    }

    /// Render to wire bytes
    pub fn encode(&self) -> Vec<u8> {
        self.render().into_bytes()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index`, if present
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Fields from `index` to the end (empty if out of range)
    pub fn fields_from(&self, index: usize) -> &[String] {
        self.fields.get(index..).unwrap_or_default()
    }

    /// Field at `index`, or [`Error::MissingField`] naming `code`
    pub fn require(&self, index: usize, code: &str) -> Result<&str> {
        self.field(index).ok_or_else(|| Error::MissingField {
            code: code.to_owned(),
            index,
        })
    }

    /// Field at `index` parsed as a number
    pub fn require_number<T>(&self, index: usize, code: &str) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.require(index, code)?;
        raw.trim().parse().map_err(|e: T::Err| Error::InvalidField {
            code: code.to_owned(),
            index,
            value: raw.to_owned(),
            reason: e.to_string(),
        })
    }

    pub fn device_id(&self) -> Option<&str> {
        self.field(DEVICE_ID_INDEX)
    }

    /// Field at the primary code position
    pub fn code(&self) -> Option<&str> {
        self.field(CODE_INDEX)
    }

    /// Original command timestamp
    pub fn timestamp(&self) -> Option<&str> {
        self.field(TIMESTAMP_INDEX)
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("device_id", &self.device_id())
            .field("code", &self.code())
            .field("fields", &self.fields.len())
            .finish()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_command() {
        let packet = Packet::parse("*HQ,8168000005,D1,093000,015,1#").unwrap();

        assert_eq!(packet.len(), 6);
        assert_eq!(packet.device_id(), Some("8168000005"));
        assert_eq!(packet.code(), Some("D1"));
        assert_eq!(packet.timestamp(), Some("093000"));
        assert_eq!(packet.field(4), Some("015"));
        assert_eq!(packet.field(6), None);
    }

    #[test]
    fn test_parse_too_few_fields() {
        let result = Packet::parse("*onlyonefield#");
        assert!(matches!(result, Err(Error::MalformedFrame { .. })));

        let result = Packet::parse("*HQ,1#");
        assert!(matches!(result, Err(Error::MalformedFrame { .. })));
    }

    #[test]
    fn test_parse_missing_sentinels() {
        assert!(Packet::parse("HQ,1,V0#").is_err());
        assert!(Packet::parse("*HQ,1,V0").is_err());
    }

    #[test]
    fn test_empty_fields_kept() {
        let packet = Packet::parse("*HQ,1,S26,,,x#").unwrap();
        assert_eq!(packet.len(), 6);
        assert_eq!(packet.field(3), Some(""));
    }

    #[test]
    fn test_render_outbound() {
        let mut packet = Packet::outbound("865205030330012", "HTBT");
        packet.push("100");

        assert_eq!(packet.render(), "*HQ,865205030330012,HTBT,100#");
        assert_eq!(packet.encode(), b"*HQ,865205030330012,HTBT,100#".to_vec());
    }

    #[test]
    fn test_require() {
        let packet = Packet::parse("*HQ,1,D1,093000,abc#").unwrap();

        assert_eq!(packet.require(3, "D1").unwrap(), "093000");
        assert!(matches!(
            packet.require(5, "D1"),
            Err(Error::MissingField { index: 5, .. })
        ));
        assert!(matches!(
            packet.require_number::<u32>(4, "D1"),
            Err(Error::InvalidField { index: 4, .. })
        ));
    }

    #[test]
    fn test_fields_from() {
        let packet = Packet::parse("*HQ,1,S71,093000,02,111,222#").unwrap();
        assert_eq!(packet.fields_from(5), ["111".to_string(), "222".to_string()]);
        assert!(packet.fields_from(9).is_empty());
    }
}
