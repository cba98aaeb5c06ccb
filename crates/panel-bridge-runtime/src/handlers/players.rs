//! Player commands

use super::{HandlerContext, data, require_player};
use crate::host::HostFault;
use crate::probe::EntryPoints;
use panel_bridge_core::command::{
    AddXp, Kick, PlayerMessage, PlayerTarget, PlayerToggle, PlayerTrait, SetAccessLevel,
    SetPerkLevel, Teleport, TeleportToPlayer,
};
use panel_bridge_core::{BridgeError, Capability, Data, Position, Result};
use serde_json::json;

const DEFAULT_KICK_REASON: &str = "Kicked by an administrator";

pub fn get_players(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let players = ctx.host.online_players();
    Ok(data(json!({ "count": players.len(), "players": players })))
}

pub fn get_player(ctx: &mut HandlerContext<'_>, target: PlayerTarget) -> Result<Data> {
    let player = require_player(&*ctx.host, &target.username)?;
    Ok(data(json!({ "player": player })))
}

fn move_player(ctx: &mut HandlerContext<'_>, username: &str, to: Position) -> Result<Data> {
    let called = EntryPoints::new()
        .primary(Capability::TeleportTo, |h| h.teleport_to(username, to))
        .fallback(Capability::SetPosition, |h| h.set_position(username, to))
        .call(ctx.host, ctx.caps)?;
    ctx.state.debug.debug(
        "Player moved",
        json!({ "username": username, "x": to.x, "y": to.y, "z": to.z }),
    );
    Ok(data(json!({
        "username": username,
        "x": to.x,
        "y": to.y,
        "z": to.z,
        "method": called.method(),
    })))
}

pub fn teleport_player(ctx: &mut HandlerContext<'_>, teleport: Teleport) -> Result<Data> {
    require_player(&*ctx.host, &teleport.username)?;
    move_player(ctx, &teleport.username, teleport.destination)
}

pub fn teleport_to_player(ctx: &mut HandlerContext<'_>, teleport: TeleportToPlayer) -> Result<Data> {
    require_player(&*ctx.host, &teleport.username)?;
    let target = require_player(&*ctx.host, &teleport.target)?;
    let mut result = move_player(ctx, &teleport.username, target.position)?;
    result.insert("target".to_string(), json!(teleport.target));
    Ok(result)
}

pub fn kick_player(ctx: &mut HandlerContext<'_>, kick: Kick) -> Result<Data> {
    require_player(&*ctx.host, &kick.username)?;
    let username = kick.username.as_str();
    let reason = kick.reason.as_deref().unwrap_or(DEFAULT_KICK_REASON);
    let called = EntryPoints::new()
        .primary(Capability::KickPlayer, |h| h.kick_player(username, reason))
        .fallback(Capability::DisconnectPlayer, |h| h.disconnect_player(username))
        .call(ctx.host, ctx.caps)?;
    ctx.state
        .debug
        .info("Player kicked", json!({ "username": username, "reason": reason }));
    Ok(data(json!({
        "username": username,
        "reason": reason,
        "method": called.method(),
    })))
}

pub fn set_access_level(ctx: &mut HandlerContext<'_>, change: SetAccessLevel) -> Result<Data> {
    require_player(&*ctx.host, &change.username)?;
    let username = change.username.as_str();
    let level = change.level;
    let called = EntryPoints::new()
        .primary(Capability::SetRole, |h| h.set_role(username, level))
        .fallback(Capability::SetAccessLevel, |h| h.set_access_level(username, level))
        .call(ctx.host, ctx.caps)?;
    ctx.state.debug.info(
        "Access level changed",
        json!({ "username": username, "accessLevel": level.as_str() }),
    );
    Ok(data(json!({
        "username": username,
        "accessLevel": level.as_str(),
        "method": called.method(),
    })))
}

pub fn heal_player(ctx: &mut HandlerContext<'_>, target: PlayerTarget) -> Result<Data> {
    require_player(&*ctx.host, &target.username)?;
    let username = target.username.as_str();
    let called = EntryPoints::new()
        .primary(Capability::RestoreHealth, |h| h.restore_health(username))
        .fallback(Capability::SetHealth, |h| h.set_health(username, 1.0))
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({ "username": username, "method": called.method() })))
}

pub fn kill_player(ctx: &mut HandlerContext<'_>, target: PlayerTarget) -> Result<Data> {
    require_player(&*ctx.host, &target.username)?;
    let username = target.username.as_str();
    let called = EntryPoints::new()
        .primary(Capability::KillPlayer, |h| h.kill_player(username))
        .fallback(Capability::SetHealth, |h| h.set_health(username, 0.0))
        .call(ctx.host, ctx.caps)?;
    ctx.state
        .debug
        .info("Player killed", json!({ "username": username }));
    Ok(data(json!({ "username": username, "method": called.method() })))
}

fn toggle_reply(username: &str, enabled: bool, method: &str) -> Data {
    data(json!({ "username": username, "enabled": enabled, "method": method }))
}

pub fn set_god_mode(ctx: &mut HandlerContext<'_>, toggle: PlayerToggle) -> Result<Data> {
    require_player(&*ctx.host, &toggle.username)?;
    let PlayerToggle { username, enabled } = &toggle;
    let called = EntryPoints::new()
        .primary(Capability::SetGodMode, |h| h.set_god_mode(username, *enabled))
        .fallback(Capability::SetInvincible, |h| h.set_invincible(username, *enabled))
        .call(ctx.host, ctx.caps)?;
    Ok(toggle_reply(username, *enabled, called.method()))
}

pub fn set_invisible(ctx: &mut HandlerContext<'_>, toggle: PlayerToggle) -> Result<Data> {
    require_player(&*ctx.host, &toggle.username)?;
    let PlayerToggle { username, enabled } = &toggle;
    let called = EntryPoints::new()
        .primary(Capability::SetInvisible, |h| h.set_invisible(username, *enabled))
        .fallback(Capability::SetGhostMode, |h| h.set_ghost_mode(username, *enabled))
        .call(ctx.host, ctx.caps)?;
    Ok(toggle_reply(username, *enabled, called.method()))
}

pub fn set_no_clip(ctx: &mut HandlerContext<'_>, toggle: PlayerToggle) -> Result<Data> {
    require_player(&*ctx.host, &toggle.username)?;
    let PlayerToggle { username, enabled } = &toggle;
    let called = EntryPoints::new()
        .primary(Capability::SetNoClip, |h| h.set_no_clip(username, *enabled))
        .call(ctx.host, ctx.caps)?;
    Ok(toggle_reply(username, *enabled, called.method()))
}

pub fn send_player_message(ctx: &mut HandlerContext<'_>, msg: PlayerMessage) -> Result<Data> {
    require_player(&*ctx.host, &msg.username)?;
    let PlayerMessage { username, message } = &msg;
    let called = EntryPoints::new()
        .primary(Capability::PrivateMessage, |h| h.send_private_message(username, message))
        .fallback(Capability::HaloNote, |h| h.set_halo_note(username, message))
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({
        "username": username,
        "message": message,
        "method": called.method(),
    })))
}

/// Reject perk names the host does not know before touching the player
fn current_perk_level(ctx: &HandlerContext<'_>, username: &str, perk: &str) -> Result<u32> {
    ctx.host
        .perk_level(username, perk)
        .map_err(|fault| BridgeError::invalid("perk", fault.0))
}

pub fn add_xp(ctx: &mut HandlerContext<'_>, grant: AddXp) -> Result<Data> {
    require_player(&*ctx.host, &grant.username)?;
    current_perk_level(ctx, &grant.username, &grant.perk)?;
    let AddXp {
        username,
        perk,
        amount,
    } = &grant;
    let called = EntryPoints::new()
        .primary(Capability::AddXp, |h| h.add_xp(username, perk, *amount))
        .fallback(Capability::AddXpNoMultiplier, |h| {
            h.add_xp_no_multiplier(username, perk, *amount)
        })
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({
        "username": username,
        "perk": perk,
        "amount": amount,
        "method": called.method(),
    })))
}

pub fn set_perk_level(ctx: &mut HandlerContext<'_>, change: SetPerkLevel) -> Result<Data> {
    require_player(&*ctx.host, &change.username)?;
    let current = current_perk_level(ctx, &change.username, &change.perk)?;
    let SetPerkLevel {
        username,
        perk,
        level,
    } = &change;
    let target = *level;
    let called = EntryPoints::new()
        .primary(Capability::SetPerkLevel, |h| h.set_perk_level(username, perk, target))
        .fallback(Capability::LevelPerk, |h| {
            if target < current {
                return Err(HostFault::new(format!(
                    "cannot lower {} from {} to {}",
                    perk, current, target
                )));
            }
            for _ in current..target {
                h.level_perk(username, perk)?;
            }
            Ok(())
        })
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({
        "username": username,
        "perk": perk,
        "previousLevel": current,
        "level": target,
        "method": called.method(),
    })))
}

pub fn set_trait(ctx: &mut HandlerContext<'_>, change: PlayerTrait, present: bool) -> Result<Data> {
    require_player(&*ctx.host, &change.username)?;
    let PlayerTrait {
        username,
        trait_name,
    } = &change;
    let called = EntryPoints::new()
        .primary(Capability::CharacterTraits, |h| {
            h.set_character_trait(username, trait_name, present)
        })
        .fallback(Capability::LegacyTraits, |h| {
            h.set_legacy_trait(username, trait_name, present)
        })
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({
        "username": username,
        "trait": trait_name,
        "present": present,
        "changed": called.value,
        "method": called.method(),
    })))
}
