//! Server command codes understood by the simulated devices

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Command codes of both dialects
///
/// Some codes (`D1`, `S20`) exist in both dialects with different argument
/// layouts; the dialect's handler table decides how they are read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CommandCode {
    // GT06 configuration
    ChangePassword,
    SetCenterNumber,
    SetAdminNumber,
    SetAlarmMode,
    AlarmTypeSetting,
    FuelControl,
    SetGeoFence,
    SetIpPort,
    SetApn,
    FactoryDefault,
    ReadDeviceState,
    OverspeedSetting,
    CheckLbs,

    // Reporting
    SetUploadInterval,
    FastLocate,

    // Power & session
    Restart,
    WorkingMode,
    SleepMode,
    Login,
    Heartbeat,

    // Autoseeker
    SetFence,
    SetNumber,
    ClearAlarms,
    Lock,
    SetMileage,
    HeartbeatAck,
}

impl CommandCode {
    /// Every known code
    pub const ALL: [CommandCode; 26] = [
        Self::ChangePassword,
        Self::SetCenterNumber,
        Self::SetAdminNumber,
        Self::SetAlarmMode,
        Self::AlarmTypeSetting,
        Self::FuelControl,
        Self::SetGeoFence,
        Self::SetIpPort,
        Self::SetApn,
        Self::FactoryDefault,
        Self::ReadDeviceState,
        Self::OverspeedSetting,
        Self::CheckLbs,
        Self::SetUploadInterval,
        Self::FastLocate,
        Self::Restart,
        Self::WorkingMode,
        Self::SleepMode,
        Self::Login,
        Self::Heartbeat,
        Self::SetFence,
        Self::SetNumber,
        Self::ClearAlarms,
        Self::Lock,
        Self::SetMileage,
        Self::HeartbeatAck,
    ];

    /// Wire code
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChangePassword => "S1",
            Self::SetCenterNumber => "S2",
            Self::SetAdminNumber => "S3",
            Self::SetAlarmMode => "S18",
            Self::AlarmTypeSetting => "S19",
            Self::FuelControl => "S20",
            Self::SetGeoFence => "S21",
            Self::SetIpPort => "S23",
            Self::SetApn => "S24",
            Self::FactoryDefault => "S25",
            Self::ReadDeviceState => "S26",
            Self::OverspeedSetting => "S33",
            Self::CheckLbs => "S80",
            Self::SetUploadInterval => "D1",
            Self::FastLocate => "D2",
            Self::Restart => "R1",
            Self::WorkingMode => "WKMD",
            Self::SleepMode => "SLP",
            Self::Login => "V0",
            Self::Heartbeat => "HTBT",
            Self::SetFence => "SCF",
            Self::SetNumber => "S71",
            Self::ClearAlarms => "R7",
            Self::Lock => "LOCK",
            Self::SetMileage => "MILE",
            Self::HeartbeatAck => "R12",
        }
    }

    /// Human-readable name for logs
    pub fn name(self) -> &'static str {
        match self {
            Self::ChangePassword => "change password",
            Self::SetCenterNumber => "set center number",
            Self::SetAdminNumber => "set admin number",
            Self::SetAlarmMode => "set alarm mode",
            Self::AlarmTypeSetting => "alarm type setting",
            Self::FuelControl => "fuel control",
            Self::SetGeoFence => "set geo-fence",
            Self::SetIpPort => "set ip/port",
            Self::SetApn => "set apn",
            Self::FactoryDefault => "factory default",
            Self::ReadDeviceState => "read device state",
            Self::OverspeedSetting => "overspeed setting",
            Self::CheckLbs => "check lbs",
            Self::SetUploadInterval => "set upload interval",
            Self::FastLocate => "fast locate",
            Self::Restart => "restart",
            Self::WorkingMode => "working mode",
            Self::SleepMode => "sleep mode",
            Self::Login => "login",
            Self::Heartbeat => "heartbeat",
            Self::SetFence => "set/clear fence",
            Self::SetNumber => "set number",
            Self::ClearAlarms => "clear alarms",
            Self::Lock => "lock/unlock",
            Self::SetMileage => "set mileage",
            Self::HeartbeatAck => "heartbeat confirmation",
        }
    }
}

impl FromStr for CommandCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "S1" => Ok(Self::ChangePassword),
            "S2" => Ok(Self::SetCenterNumber),
            "S3" => Ok(Self::SetAdminNumber),
            "S18" => Ok(Self::SetAlarmMode),
            "S19" => Ok(Self::AlarmTypeSetting),
            "S20" => Ok(Self::FuelControl),
            "S21" => Ok(Self::SetGeoFence),
            "S23" => Ok(Self::SetIpPort),
            "S24" => Ok(Self::SetApn),
            "S25" => Ok(Self::FactoryDefault),
            "S26" => Ok(Self::ReadDeviceState),
            "S33" => Ok(Self::OverspeedSetting),
            "S80" => Ok(Self::CheckLbs),
            "D1" => Ok(Self::SetUploadInterval),
            "D2" => Ok(Self::FastLocate),
            "R1" => Ok(Self::Restart),
            "WKMD" => Ok(Self::WorkingMode),
            "SLP" => Ok(Self::SleepMode),
            "V0" => Ok(Self::Login),
            "HTBT" => Ok(Self::Heartbeat),
            "SCF" => Ok(Self::SetFence),
            "S71" => Ok(Self::SetNumber),
            "R7" => Ok(Self::ClearAlarms),
            "LOCK" => Ok(Self::Lock),
            "MILE" => Ok(Self::SetMileage),
            "R12" => Ok(Self::HeartbeatAck),
            _ => Err(Error::UnknownCommand(s.to_owned())),
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), self.name())
    }
}
