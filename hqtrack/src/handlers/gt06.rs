//! GT06-family command handlers
//!
//! Every acknowledgment carries a status token (`DONE` unless stated
//! otherwise) and the device's current status mask. `S26` and `S80` answer
//! with canned query payloads instead, `V0`/`HTBT` are echoed.

use tracing::{debug, info};

use hqtrack_core::constants::{ack, canned, tags, telemetry};
use hqtrack_core::{CommandCode, Packet, Result};
use hqtrack_types::WorkingMode;

use super::{acknowledgment, is_off, query_answer};
use crate::device::DeviceState;
use crate::dispatch::{CommandContext, Handler, Reply};
use crate::report;

pub(crate) const HANDLERS: &[(CommandCode, Handler)] = &[
    (CommandCode::ChangePassword, change_password),
    (CommandCode::SetCenterNumber, set_center_number),
    (CommandCode::SetAdminNumber, set_admin_number),
    (CommandCode::SetAlarmMode, set_alarm_mode),
    (CommandCode::AlarmTypeSetting, alarm_type_setting),
    (CommandCode::FuelControl, fuel_control),
    (CommandCode::SetGeoFence, set_geo_fence),
    (CommandCode::SetIpPort, set_ip_port),
    (CommandCode::SetApn, set_apn),
    (CommandCode::FactoryDefault, factory_default),
    (CommandCode::ReadDeviceState, read_device_state),
    (CommandCode::OverspeedSetting, overspeed_setting),
    (CommandCode::CheckLbs, check_lbs),
    (CommandCode::SetUploadInterval, set_upload_interval),
    (CommandCode::FastLocate, fast_locate),
    (CommandCode::Restart, restart),
    (CommandCode::WorkingMode, change_working_mode),
    (CommandCode::SleepMode, change_working_mode),
    (CommandCode::Login, login),
    (CommandCode::Heartbeat, heartbeat),
];

fn done(ctx: &CommandContext<'_>, state: &DeviceState) -> Result<Option<Reply>> {
    status(ctx, state, ack::DONE)
}

fn status(ctx: &CommandContext<'_>, state: &DeviceState, token: &str) -> Result<Option<Reply>> {
    let packet = acknowledgment(ctx, state, &[token], &state.status.status_mask)?;
    Ok(Some(packet.into()))
}

fn change_password(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let (old, new) = (ctx.arg(4)?, ctx.arg(5)?);
    info!("Password changed from {} to {}", old, new);
    done(ctx, state)
}

fn set_center_number(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    info!("Center number set to {}", ctx.arg(4)?);
    done(ctx, state)
}

fn set_admin_number(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    ctx.arg(4)?;
    info!("Admin numbers set: {:?}", ctx.rest(4));
    done(ctx, state)
}

fn set_alarm_mode(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let mode: u8 = ctx.number(4)?;
    let name = match mode {
        0 => "SMS and call alarms off",
        1 => "SMS alarm",
        2 => "call center number",
        _ => "unknown",
    };
    info!("Alarm mode set to {} ({})", mode, name);
    done(ctx, state)
}

fn alarm_type_setting(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let alarm: u8 = ctx.number(4)?;
    let enabled = ctx.arg(5)? == "1";
    let name = match alarm {
        0 => "power cut",
        1 => "ACC",
        2 => "low battery",
        3 => "vibration",
        4 => "removal",
        _ => "unknown",
    };
    info!("{} alarm {}", name, if enabled { "enabled" } else { "disabled" });
    done(ctx, state)
}

fn fuel_control(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    if is_off(ctx.opt(4)) {
        state.status.fuel_cut = false;
        info!("Fuel restored");
        status(ctx, state, ack::OK)
    } else {
        state.status.fuel_cut = true;
        info!("Fuel cut, pattern {:?}", ctx.rest(5));
        status(ctx, state, ack::DONE)
    }
}

fn set_geo_fence(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let radius: u32 = ctx.number(4)?;
    let mode: u8 = ctx.number(5)?;
    let name = match mode {
        1 => "out-fence alarm",
        2 => "in-fence alarm",
        3 => "in and out alarm",
        _ => "unknown",
    };
    info!("Geo-fence set: radius {}m, mode {} ({})", radius, mode, name);
    done(ctx, state)
}

fn set_ip_port(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let port: u16 = ctx.number(8)?;
    let ip = ctx.rest(4)[..4].join(".");
    info!("Server set to {}:{}", ip, port);
    done(ctx, state)
}

fn set_apn(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    info!("APN set to {}", ctx.arg(4)?);
    done(ctx, state)
}

fn factory_default(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    info!("Factory defaults restored");
    done(ctx, state)
}

fn read_device_state(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let packet = match ctx.arg(4)? {
        "0" => {
            let mut payload: Vec<String> = canned::BASIC_STATE_PREFIX
                .iter()
                .map(|s| s.to_string())
                .collect();
            payload.push(state.status.upload_interval_secs().to_string());
            payload.push(canned::BASIC_STATE_SIGNAL.to_string());
            payload.push(state.status.battery_percent().to_string());
            query_answer(ctx, state, payload)
        }
        "1" => query_answer(ctx, state, canned::FIRMWARE_VERSION),
        _ => query_answer(ctx, state, [canned::OTHER_STATE]),
    };
    Ok(Some(packet.into()))
}

fn overspeed_setting(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    match ctx.arg(4)? {
        "0" => info!("Overspeed alarm disabled"),
        limit => info!("Overspeed limit set to {} km/h", limit),
    }
    done(ctx, state)
}

fn check_lbs(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    Ok(Some(query_answer(ctx, state, canned::LBS).into()))
}

fn set_upload_interval(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let interval: u32 = ctx.number(4)?;
    state.status.set_upload_interval(interval)?;
    // ACC is optional here; a blank or garbled flag keeps the current one
    if let Some(raw) = ctx.opt(5) {
        match raw.trim().parse::<u8>() {
            Ok(acc) => state.status.acc_status = acc,
            Err(_) => debug!("Ignoring ACC flag {:?}", raw),
        }
    }
    info!("Upload interval set to {}s", interval);
    done(ctx, state)
}

fn fast_locate(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    info!("Fast locate for {}s", ctx.arg(4)?);
    done(ctx, state)
}

fn restart(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    info!("Restarting");
    let reply = acknowledgment(ctx, state, &[ack::DONE], &state.status.status_mask)?;
    Ok(Some(
        Reply::new(reply).then(telemetry::RESTART_DELAY, report::login(state.device_id())),
    ))
}

fn change_working_mode(ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    let mode: WorkingMode = ctx.arg(4)?.parse().map_err(|e| ctx.invalid(4, e))?;
    state.status.working_mode = mode;
    info!("Working mode changed to {}", mode);
    done(ctx, state)
}

fn login(_ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    Ok(Some(report::login(state.device_id()).into()))
}

fn heartbeat(_ctx: &CommandContext<'_>, state: &mut DeviceState) -> Result<Option<Reply>> {
    Ok(Some(Packet::outbound(state.device_id(), tags::HEARTBEAT).into()))
}
