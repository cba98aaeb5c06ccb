//! Zombie commands

use super::{HandlerContext, data, resolve_location};
use crate::probe::EntryPoints;
use panel_bridge_core::command::{ClearZombies, SpawnHorde, SpawnZombies};
use panel_bridge_core::{Capability, Data, Position, Result};
use serde_json::json;

pub fn get_zombie_count(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    Ok(data(json!({ "count": ctx.host.zombie_count() })))
}

fn spawn_reply(spawned: u32, at: Position, method: &str) -> Data {
    data(json!({
        "spawned": spawned,
        "x": at.x,
        "y": at.y,
        "z": at.z,
        "method": method,
    }))
}

pub fn spawn_zombies(ctx: &mut HandlerContext<'_>, spawn: SpawnZombies) -> Result<Data> {
    let at = resolve_location(&*ctx.host, &spawn.location)?;
    let count = spawn.count;
    let called = EntryPoints::new()
        .primary(Capability::CreateZombies, |h| h.create_zombies(at, count))
        .fallback(Capability::ZombiesInOutfit, |h| h.add_zombies_in_outfit(at, count))
        .call(ctx.host, ctx.caps)?;
    Ok(spawn_reply(called.value, at, called.method()))
}

pub fn spawn_horde(ctx: &mut HandlerContext<'_>, horde: SpawnHorde) -> Result<Data> {
    let at = resolve_location(&*ctx.host, &horde.location)?;
    let count = horde.count;
    let called = EntryPoints::new()
        .primary(Capability::CreateHorde, |h| h.create_horde(at, count))
        .fallback(Capability::CreateZombies, |h| h.create_zombies(at, count))
        .fallback(Capability::ZombiesInOutfit, |h| h.add_zombies_in_outfit(at, count))
        .call(ctx.host, ctx.caps)?;
    ctx.state.debug.info(
        "Horde spawned",
        json!({ "count": called.value, "x": at.x, "y": at.y }),
    );
    Ok(spawn_reply(called.value, at, called.method()))
}

pub fn clear_zombies(ctx: &mut HandlerContext<'_>, clear: ClearZombies) -> Result<Data> {
    let area = clear.area;
    let called = EntryPoints::new()
        .primary(Capability::RemoveZombies, |h| h.remove_zombies(area))
        .fallback(Capability::KillZombies, |h| h.kill_zombies(area))
        .call(ctx.host, ctx.caps)?;
    let scope = match area {
        Some((center, radius)) => json!({ "x": center.x, "y": center.y, "radius": radius }),
        None => json!("all"),
    };
    Ok(data(json!({
        "removed": called.value,
        "area": scope,
        "method": called.method(),
    })))
}
