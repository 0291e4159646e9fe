//! Command handlers of both dialects

pub mod autoseeker;
pub mod gt06;

use hqtrack_core::constants::tags;
use hqtrack_core::coordinate::Precision;
use hqtrack_core::{CommandCode, Dialect, Packet, Result};
use hqtrack_types::wire_date;

use crate::device::DeviceState;
use crate::dispatch::{CommandContext, Handler};

/// Handler table of `dialect`
pub fn table(dialect: Dialect) -> &'static [(CommandCode, Handler)] {
    match dialect {
        Dialect::Gt06 => gt06::HANDLERS,
        Dialect::Autoseeker => autoseeker::HANDLERS,
    }
}

/// Acknowledgment common to both dialects
///
/// `HQ,<id>,V4,<code>,<head...>,<original time>,<response time>,<fix>,<lat>,<N/S>,<lon>,<E/W>,<speed>,<heading>,<DDMMYY>,<mask>`
///
/// Coordinates use the one-decimal acknowledgment precision.
pub(crate) fn acknowledgment(
    ctx: &CommandContext<'_>,
    state: &DeviceState,
    head: &[&str],
    mask: &str,
) -> Result<Packet> {
    let mut packet = Packet::outbound(state.device_id(), tags::ACK);
    packet
        .push(ctx.code.as_str())
        .extend(head.iter().copied())
        .push(ctx.original_time())
        .push(ctx.response_time())
        .extend(state.position_fields(Precision::Acknowledgment)?)
        .push(wire_date(ctx.now))
        .push(mask);
    Ok(packet)
}

/// Query answer without position: `HQ,<id>,V4,<code>,<original time>,<response time>,<payload...>`
pub(crate) fn query_answer<I, S>(
    ctx: &CommandContext<'_>,
    state: &DeviceState,
    payload: I,
) -> Packet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut packet = Packet::outbound(state.device_id(), tags::ACK);
    packet
        .push(ctx.code.as_str())
        .push(ctx.original_time())
        .push(ctx.response_time())
        .extend(payload);
    packet
}

/// Whether a switch argument means "off" (`0`)
pub(crate) fn is_off(flag: Option<&str>) -> bool {
    flag.map(str::trim) == Some("0")
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};

    use hqtrack_core::{Dialect, Packet};

    use crate::device::DeviceState;
    use crate::dispatch::{Dispatcher, Reply};

    /// 2024-03-07 09:30:05
    pub fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_opt(9, 30, 5))
            .unwrap()
    }

    /// Dispatch `text` and return the reply
    pub fn run(state: &mut DeviceState, text: &str) -> Option<Reply> {
        let dispatcher = Dispatcher::new(state.dialect());
        dispatcher
            .dispatch(&Packet::parse(text).unwrap(), state, now())
            .unwrap()
    }

    /// Dispatch `text` and return the rendered reply packet
    pub fn reply(state: &mut DeviceState, text: &str) -> String {
        run(state, text).expect("command has a reply").packet.render()
    }

    pub fn gt06() -> DeviceState {
        DeviceState::new(Dialect::Gt06, "865205030330012")
    }

    pub fn autoseeker() -> DeviceState {
        DeviceState::new(Dialect::Autoseeker, "8168000005")
    }
}
