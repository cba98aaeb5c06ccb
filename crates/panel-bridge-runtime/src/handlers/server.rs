//! Server-wide commands

use super::{HandlerContext, data};
use crate::probe::EntryPoints;
use panel_bridge_core::command::{Message, OptionName, SetOption};
use panel_bridge_core::{BRIDGE_VERSION, BridgeError, Capability, Data, Result};
use serde_json::json;

pub fn get_server_info(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let host = &*ctx.host;
    Ok(data(json!({
        "serverName": host.server_name(),
        "gameVersion": host.game_version(),
        "maxPlayers": host.max_players(),
        "playerCount": host.online_players().len(),
        "apiGeneration": ctx.caps.generation,
        "bridgeVersion": BRIDGE_VERSION,
    })))
}

pub fn save_world(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let called = EntryPoints::new()
        .primary(Capability::SaveWorld, |h| h.save_world())
        .fallback(Capability::SaveGame, |h| h.save_game())
        .call(ctx.host, ctx.caps)?;
    ctx.state.debug.info("World saved", json!({ "method": called.method() }));
    Ok(data(json!({ "saved": true, "method": called.method() })))
}

pub fn server_message(ctx: &mut HandlerContext<'_>, msg: Message) -> Result<Data> {
    let text = msg.message.as_str();
    let called = EntryPoints::new()
        .primary(Capability::ServerMessage, |h| h.send_server_message(text))
        .fallback(Capability::ChatBroadcast, |h| h.broadcast_chat(text))
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({ "message": text, "method": called.method() })))
}

pub fn reload_options(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let called = EntryPoints::new()
        .primary(Capability::ReloadOptions, |h| h.reload_options())
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({ "reloaded": true, "method": called.method() })))
}

pub fn get_sandbox_option(ctx: &mut HandlerContext<'_>, option: OptionName) -> Result<Data> {
    let name = option.name.as_str();
    let called = EntryPoints::new()
        .primary(Capability::SandboxOptionByName, |h| h.sandbox_option(name))
        .fallback(Capability::LegacySandboxOption, |h| h.legacy_sandbox_option(name))
        .call(ctx.host, ctx.caps)?;
    let value = called
        .value
        .clone()
        .ok_or_else(|| BridgeError::NotFound(format!("sandbox option '{}'", name)))?;
    Ok(data(json!({ "name": name, "value": value, "method": called.method() })))
}

pub fn set_sandbox_option(ctx: &mut HandlerContext<'_>, option: SetOption) -> Result<Data> {
    let SetOption { name, value } = option;
    let called = EntryPoints::new()
        .primary(Capability::SandboxOptionByName, |h| h.set_sandbox_option(&name, &value))
        .fallback(Capability::LegacySandboxOption, |h| {
            h.set_legacy_sandbox_option(&name, &value)
        })
        .call(ctx.host, ctx.caps)?;
    if !called.value {
        return Err(BridgeError::NotFound(format!("sandbox option '{}'", name)));
    }
    ctx.state.debug.info(
        "Sandbox option changed",
        json!({ "name": name, "value": value }),
    );
    Ok(data(json!({ "name": name, "value": value, "method": called.method() })))
}

pub fn get_mods(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let mods = ctx.host.mods();
    Ok(data(json!({ "count": mods.len(), "mods": mods })))
}
