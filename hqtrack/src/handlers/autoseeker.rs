//! Autoseeker command handlers
//!
//! Acknowledgments end with a fixed per-command status mask and the serving
//! cell. `R12` (heartbeat confirmation) must not be answered.

use tracing::{debug, info};

use hqtrack_core::constants::{ack, autoseeker};
use hqtrack_core::{CommandCode, Packet, Result};

use super::{acknowledgment, is_off};
use crate::device::DeviceState;
use crate::dispatch::{CommandContext, Handler, Reply};

pub(crate) const HANDLERS: &[(CommandCode, Handler)] = &[
    (CommandCode::SetUploadInterval, set_upload_interval),
    (CommandCode::FuelControl, fuel_control),
    (CommandCode::SetFence, set_fence),
    (CommandCode::SetNumber, set_number),
    (CommandCode::ClearAlarms, clear_alarms),
    (CommandCode::Lock, lock),
    (CommandCode::SetMileage, set_mileage),
    (CommandCode::HeartbeatAck, heartbeat_ack),
];

/// Acknowledgment with the cell trailer
fn respond(
    ctx: &CommandContext<'_>,
    state: &DeviceState,
    head: &[&str],
    mask: &str,
) -> Result<Option<Reply>> {
    let mut packet: Packet = acknowledgment(ctx, state, head, mask)?;
    packet.extend(autoseeker::ACK_CELL);
    Ok(Some(packet.into()))
}

fn generic(ctx: &CommandContext<'_>, state: &DeviceState) -> Result<Option<Reply>> {
    respond(ctx, state, &[], autoseeker::GENERIC_ACK_MASK)
}

/// `D1,<interval>[,<acc>]`; ACC defaults to on
fn set_upload_interval(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let raw = ctx.arg(4)?;
    let interval: u32 = ctx.number(4)?;
    let acc: u8 = match ctx.opt(5) {
        Some(_) => ctx.number(5)?,
        None => 1,
    };

    state.status.set_upload_interval(interval)?;
    state.status.acc_status = acc;
    info!("Upload interval set to {}s (ACC={})", interval, acc);

    respond(ctx, state, &[raw, ack::INTERVAL_SUFFIX], autoseeker::INTERVAL_ACK_MASK)
}

/// `S20,<flag>[,<pattern>...]`: flag `0` restores, anything else cuts
fn fuel_control(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let token = if is_off(ctx.opt(4)) {
        state.status.fuel_cut = false;
        info!("Fuel restored");
        ack::OK
    } else {
        state.status.fuel_cut = true;
        info!("Fuel cut, pattern {:?}", ctx.rest(5));
        ack::DONE
    };

    respond(ctx, state, &[token], autoseeker::FUEL_ACK_MASK)
}

fn set_fence(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    state.status.geofence_enabled = !is_off(ctx.opt(4));
    info!(
        "Fence {}",
        if state.status.geofence_enabled { "enabled" } else { "disabled" }
    );
    respond(ctx, state, &[], autoseeker::FENCE_ACK_MASK)
}

/// `S71,<01|02>,<numbers...>`: pre-saved or SOS numbers
fn set_number(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let kind = match ctx.arg(4)? {
        "01" => "Pre-saved",
        _ => "SOS",
    };
    info!("{} numbers set: {:?}", kind, ctx.rest(5));
    generic(ctx, state)
}

fn clear_alarms(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    info!("Alarms cleared");
    generic(ctx, state)
}

fn lock(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    info!("Vehicle {}", if is_off(ctx.opt(4)) { "unlocked" } else { "locked" });
    generic(ctx, state)
}

fn set_mileage(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    if let Some(mileage) = ctx.opt(4) {
        info!("Mileage set to {}", mileage);
    }
    generic(ctx, state)
}

fn heartbeat_ack(_ctx: &CommandContext<'_>, _state: &mut DeviceState) -> Result<Option<Reply>> {
    debug!("Heartbeat confirmed by server");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{autoseeker, now, reply, run};
    use crate::dispatch::Dispatcher;
    use hqtrack_core::Packet;
    use pretty_assertions::assert_eq;

    const CELL: &str = "460,00,10342,3721";

    #[test]
    fn test_upload_interval_exact_wire() {
        let mut state = autoseeker();
        let wire = reply(&mut state, "*HQ,8168000005,D1,093000,015,1#");

        assert_eq!(
            wire,
            format!(
                "*HQ,8168000005,V4,D1,015,65535,093000,093005,A,2234.9,N,11354.4,E,00.00,000,070324,FFFFBBFF,{CELL}#"
            )
        );
        assert_eq!(state.status.upload_interval_secs(), 15);
        assert_eq!(state.status.acc_status, 1);
    }

    #[test]
    fn test_upload_interval_acc_defaults_on() {
        let mut state = autoseeker();
        state.status.acc_status = 0;

        reply(&mut state, "*HQ,8168000005,D1,093000,60#");
        assert_eq!(state.status.acc_status, 1);

        reply(&mut state, "*HQ,8168000005,D1,093000,60,0#");
        assert_eq!(state.status.acc_status, 0);
    }

    #[test]
    fn test_upload_interval_idempotent() {
        let mut once = autoseeker();
        let first = reply(&mut once, "*HQ,8168000005,D1,093000,015,1#");

        let mut twice = once.clone();
        let second = reply(&mut twice, "*HQ,8168000005,D1,093000,015,1#");

        assert_eq!(once, twice);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fuel_cut_with_pattern() {
        let mut state = autoseeker();
        let packet = run(&mut state, "*HQ,8168000005,S20,093000,1,0101#").unwrap().packet;

        assert!(state.status.fuel_cut);
        assert_eq!(packet.field(3), Some("S20"));
        assert_eq!(packet.field(4), Some("DONE"));
        assert_eq!(packet.field(15), Some("F7FFBBFF"));
    }

    #[test]
    fn test_fuel_restore() {
        let mut state = autoseeker();
        state.status.fuel_cut = true;

        let wire = reply(&mut state, "*HQ,8168000005,S20,093000,0#");

        assert!(!state.status.fuel_cut);
        assert_eq!(
            wire,
            format!(
                "*HQ,8168000005,V4,S20,OK,093000,093005,A,2234.9,N,11354.4,E,00.00,000,070324,F7FFBBFF,{CELL}#"
            )
        );
    }

    #[test]
    fn test_fence_toggle() {
        let mut state = autoseeker();

        let wire = reply(&mut state, "*HQ,8168000005,SCF,093000,1#");
        assert!(state.status.geofence_enabled);
        assert_eq!(
            wire,
            format!(
                "*HQ,8168000005,V4,SCF,093000,093005,A,2234.9,N,11354.4,E,00.00,000,070324,FFFFB9FF,{CELL}#"
            )
        );

        reply(&mut state, "*HQ,8168000005,SCF,093000,0#");
        assert!(!state.status.geofence_enabled);
    }

    #[test]
    fn test_generic_acks() {
        for code in ["R7", "LOCK", "MILE"] {
            let mut state = autoseeker();
            let before = state.clone();
            let wire = reply(&mut state, &format!("*HQ,8168000005,{code},093000,1#"));

            assert_eq!(
                wire,
                format!(
                    "*HQ,8168000005,V4,{code},093000,093005,A,2234.9,N,11354.4,E,00.00,000,070324,FFFFFBFF,{CELL}#"
                )
            );
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_set_number_requires_kind() {
        let mut state = autoseeker();
        let wire = reply(&mut state, "*HQ,8168000005,S71,093000,02,13800000000#");
        assert!(wire.contains(",V4,S71,"));

        let packet = Packet::parse("*HQ,8168000005,S71,093000#").unwrap();
        let err = Dispatcher::new(state.dialect())
            .dispatch(&packet, &mut state, now())
            .unwrap_err();
        assert!(err.is_handler_error());
    }

    #[test]
    fn test_heartbeat_confirmation_is_silent() {
        let mut state = autoseeker();
        let before = state.clone();

        assert!(run(&mut state, "*HQ,8168000005,R12,093000#").is_none());
        assert_eq!(state, before);
    }
}
