//! The two HQ protocol variants

use std::fmt;
use std::str::FromStr;

use crate::{
    command::CommandCode,
    error::{Error, Result},
    packet::{Packet, CODE_INDEX, TIMESTAMP_INDEX},
};

/// Protocol dialect of a simulated device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// GT06-family trackers (IMEI identities, working modes, login/heartbeat)
    Gt06,

    /// Autoseeker trackers (short device ids, cell data in every report)
    Autoseeker,
}

const GT06_COMMANDS: &[CommandCode] = &[
    CommandCode::ChangePassword,
    CommandCode::SetCenterNumber,
    CommandCode::SetAdminNumber,
    CommandCode::SetAlarmMode,
    CommandCode::AlarmTypeSetting,
    CommandCode::FuelControl,
    CommandCode::SetGeoFence,
    CommandCode::SetIpPort,
    CommandCode::SetApn,
    CommandCode::FactoryDefault,
    CommandCode::ReadDeviceState,
    CommandCode::OverspeedSetting,
    CommandCode::CheckLbs,
    CommandCode::SetUploadInterval,
    CommandCode::FastLocate,
    CommandCode::Restart,
    CommandCode::WorkingMode,
    CommandCode::SleepMode,
    CommandCode::Login,
    CommandCode::Heartbeat,
];

const AUTOSEEKER_COMMANDS: &[CommandCode] = &[
    CommandCode::SetUploadInterval,
    CommandCode::FuelControl,
    CommandCode::SetFence,
    CommandCode::SetNumber,
    CommandCode::ClearAlarms,
    CommandCode::Lock,
    CommandCode::SetMileage,
    CommandCode::HeartbeatAck,
];

impl Dialect {
    /// Command codes this dialect answers to
    pub fn commands(self) -> &'static [CommandCode] {
        match self {
            Self::Gt06 => GT06_COMMANDS,
            Self::Autoseeker => AUTOSEEKER_COMMANDS,
        }
    }

    pub fn supports(self, code: CommandCode) -> bool {
        self.commands().contains(&code)
    }

    /// Identity used when none is configured
    pub fn default_device_id(self) -> &'static str {
        match self {
            Self::Gt06 => "865205030330012",
            Self::Autoseeker => "8168000005",
        }
    }

    /// Whether the device has the real-time/power-saving/deep-sleep modes
    pub fn has_working_modes(self) -> bool {
        matches!(self, Self::Gt06)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Gt06 => "GT06",
            Self::Autoseeker => "Autoseeker",
        }
    }

    /// Find the command code of an inbound packet
    ///
    /// Autoseeker always reads index 2. GT06 tries index 2 and, if that is not
    /// one of its codes, index 3: some firmware inserts an extra field before
    /// the code. This is a tolerance quirk, not a documented grammar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCommand`] with the text at index 2 when no
    /// supported code is found.
    pub fn resolve_code(self, packet: &Packet) -> Result<CommandCode> {
        let primary = packet.field(CODE_INDEX).unwrap_or_default();

        if let Some(code) = self.lookup(primary) {
            return Ok(code);
        }

        if self == Self::Gt06 {
            if let Some(code) = packet.field(TIMESTAMP_INDEX).and_then(|f| self.lookup(f)) {
                return Ok(code);
            }
        }

        Err(Error::UnknownCommand(primary.to_owned()))
    }

    fn lookup(self, field: &str) -> Option<CommandCode> {
        field
            .parse::<CommandCode>()
            .ok()
            .filter(|code| self.supports(*code))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gt06" => Ok(Self::Gt06),
            "autoseeker" => Ok(Self::Autoseeker),
            _ => Err(Error::UnknownDialect(s.to_owned())),
        }
    }
}
