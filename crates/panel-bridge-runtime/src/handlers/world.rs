//! Time, weather and world event commands

use super::{HandlerContext, data, require_player};
use crate::probe::EntryPoints;
use panel_bridge_core::command::{Helicopter, SetGameTime, Storm, WeatherOverride};
use panel_bridge_core::{Capability, Data, Position, Result};
use serde_json::json;

/// Custom weather stage id of a thunderstorm
pub const STORM_STAGE: u32 = 8;

pub fn get_game_time(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    Ok(data(serde_json::to_value(ctx.host.game_clock())?))
}

pub fn set_game_time(ctx: &mut HandlerContext<'_>, time: SetGameTime) -> Result<Data> {
    let SetGameTime { hour, minute } = time;
    let called = EntryPoints::new()
        .primary(Capability::SetTimeOfDay, |h| h.set_time_of_day(hour, minute.unwrap_or(0)))
        .fallback(Capability::SetHour, |h| h.set_hour(hour))
        .call(ctx.host, ctx.caps)?;
    // The hour-only entry point drops minutes
    let minute = match called.via {
        Capability::SetHour => 0,
        _ => minute.unwrap_or(0),
    };
    Ok(data(json!({
        "hour": hour,
        "minute": minute,
        "method": called.method(),
    })))
}

pub fn get_weather(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    Ok(data(serde_json::to_value(ctx.host.weather())?))
}

pub fn set_weather(ctx: &mut HandlerContext<'_>, weather: WeatherOverride) -> Result<Data> {
    let called = EntryPoints::new()
        .primary(Capability::ClimateOverride, |h| h.override_climate(&weather))
        .fallback(Capability::WeatherValues, |h| h.set_weather_values(&weather))
        .call(ctx.host, ctx.caps)?;
    ctx.state
        .debug
        .info("Weather overridden", json!({ "applied": weather }));
    Ok(data(json!({ "applied": weather, "method": called.method() })))
}

pub fn stop_weather(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let called = EntryPoints::new()
        .primary(Capability::StopWeather, |h| h.stop_weather())
        .fallback(Capability::ResetClimate, |h| h.reset_climate())
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({ "stopped": true, "method": called.method() })))
}

pub fn trigger_storm(ctx: &mut HandlerContext<'_>, storm: Storm) -> Result<Data> {
    let hours = storm.duration_hours;
    let called = EntryPoints::new()
        .primary(Capability::StormTrigger, |h| h.trigger_storm(hours))
        .fallback(Capability::WeatherStage, |h| h.trigger_weather_stage(STORM_STAGE, hours))
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({ "durationHours": hours, "method": called.method() })))
}

pub fn trigger_helicopter(ctx: &mut HandlerContext<'_>, heli: Helicopter) -> Result<Data> {
    if let Some(username) = &heli.username {
        require_player(&*ctx.host, username)?;
    }
    let target = heli.username.as_deref();
    let called = EntryPoints::new()
        .primary(Capability::HelicopterEvent, |h| h.helicopter_event(target))
        .fallback(Capability::HelicopterDay, |h| h.schedule_helicopter_day())
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({ "target": target, "method": called.method() })))
}

pub fn lightning_strike(ctx: &mut HandlerContext<'_>, at: Position) -> Result<Data> {
    let called = EntryPoints::new()
        .primary(Capability::LightningStrike, |h| h.lightning_strike(at))
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({ "x": at.x, "y": at.y, "z": at.z, "method": called.method() })))
}
