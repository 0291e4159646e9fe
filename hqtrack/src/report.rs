//! Device-originated packets: login, heartbeat and position reports

use chrono::NaiveDateTime;

use hqtrack_core::constants::tags;
use hqtrack_core::coordinate::Precision;
use hqtrack_core::{Packet, Result};
use hqtrack_types::{wire_date, wire_time};

use crate::device::DeviceState;

/// Login packet: `*HQ,<id>,V0#`
pub fn login(device_id: &str) -> Packet {
    Packet::outbound(device_id, tags::LOGIN)
}

/// Heartbeat packet
///
/// G200-model GT06 devices append their battery level.
pub fn heartbeat(state: &DeviceState) -> Packet {
    let mut packet = Packet::outbound(state.device_id(), tags::HEARTBEAT);
    if state.is_g200() {
        packet.push(state.status.battery_percent().to_string());
    }
    packet
}

/// Position report carrying `mask` as its status bitmask
///
/// Layout: `HQ,<id>,V1,<HHMMSS>,<fix>,<lat>,<N/S>,<lon>,<E/W>,<speed>,<heading>,<DDMMYY>,<mask>`.
/// Dialect-specific trailers (cell data) are appended by the caller.
pub fn position_report(state: &DeviceState, now: NaiveDateTime, mask: &str) -> Result<Packet> {
    let mut packet = Packet::outbound(state.device_id(), tags::REPORT);
    packet
        .push(wire_time(now))
        .extend(state.position_fields(Precision::Telemetry)?)
        .push(wire_date(now))
        .push(mask);
    Ok(packet)
}
