//! Handler registry
//!
//! One function per [`CommandKind`] variant, grouped by area. Payloads arrive
//! already validated; handlers look up the entities they touch, call the host
//! through [`EntryPoints`](crate::probe::EntryPoints) and return the result
//! data.

mod bridge;
mod inventory;
mod players;
mod server;
mod vehicles;
mod world;
mod zombies;

pub use world::STORM_STAGE;

use crate::host::{HostApi, PlayerInfo};
use crate::state::BridgeState;
use panel_bridge_core::{
    ApiCapabilitySet, BridgeError, CommandKind, Data, Location, Position, Result,
};
use serde_json::Value;

/// Everything a handler may touch during one dispatch
pub struct HandlerContext<'a> {
    pub host: &'a mut dyn HostApi,
    pub caps: &'a ApiCapabilitySet,
    pub state: &'a mut BridgeState,
    /// Unix ms at the start of the poll cycle
    pub now: u64,
}

/// Route a decoded command to its handler
pub fn dispatch(kind: CommandKind, ctx: &mut HandlerContext<'_>) -> Result<Data> {
    match kind {
        CommandKind::Ping => bridge::ping(ctx),
        CommandKind::GetStatus => bridge::get_status(ctx),
        CommandKind::GetCapabilities => bridge::get_capabilities(ctx),
        CommandKind::GetStats => bridge::get_stats(ctx),
        CommandKind::ResetStats => bridge::reset_stats(ctx),
        CommandKind::SetDebugMode(p) => bridge::set_debug_mode(ctx, p),
        CommandKind::GetDebugLog(p) => bridge::get_debug_log(ctx, p),
        CommandKind::ClearDebugLog => bridge::clear_debug_log(ctx),

        CommandKind::GetServerInfo => server::get_server_info(ctx),
        CommandKind::SaveWorld => server::save_world(ctx),
        CommandKind::ServerMessage(p) => server::server_message(ctx, p),
        CommandKind::ReloadOptions => server::reload_options(ctx),
        CommandKind::GetSandboxOption(p) => server::get_sandbox_option(ctx, p),
        CommandKind::SetSandboxOption(p) => server::set_sandbox_option(ctx, p),
        CommandKind::GetMods => server::get_mods(ctx),

        CommandKind::GetPlayers => players::get_players(ctx),
        CommandKind::GetPlayer(p) => players::get_player(ctx, p),
        CommandKind::TeleportPlayer(p) => players::teleport_player(ctx, p),
        CommandKind::TeleportToPlayer(p) => players::teleport_to_player(ctx, p),
        CommandKind::KickPlayer(p) => players::kick_player(ctx, p),
        CommandKind::SetAccessLevel(p) => players::set_access_level(ctx, p),
        CommandKind::HealPlayer(p) => players::heal_player(ctx, p),
        CommandKind::KillPlayer(p) => players::kill_player(ctx, p),
        CommandKind::SetGodMode(p) => players::set_god_mode(ctx, p),
        CommandKind::SetInvisible(p) => players::set_invisible(ctx, p),
        CommandKind::SetNoClip(p) => players::set_no_clip(ctx, p),
        CommandKind::SendPlayerMessage(p) => players::send_player_message(ctx, p),
        CommandKind::AddXp(p) => players::add_xp(ctx, p),
        CommandKind::SetPerkLevel(p) => players::set_perk_level(ctx, p),
        CommandKind::AddTrait(p) => players::set_trait(ctx, p, true),
        CommandKind::RemoveTrait(p) => players::set_trait(ctx, p, false),

        CommandKind::GiveItem(p) => inventory::give_item(ctx, p),
        CommandKind::RemoveItem(p) => inventory::remove_item(ctx, p),
        CommandKind::GetInventory(p) => inventory::get_inventory(ctx, p),
        CommandKind::ClearInventory(p) => inventory::clear_inventory(ctx, p),

        CommandKind::GetGameTime => world::get_game_time(ctx),
        CommandKind::SetGameTime(p) => world::set_game_time(ctx, p),
        CommandKind::GetWeather => world::get_weather(ctx),
        CommandKind::SetWeather(p) => world::set_weather(ctx, p),
        CommandKind::StopWeather => world::stop_weather(ctx),
        CommandKind::TriggerStorm(p) => world::trigger_storm(ctx, p),
        CommandKind::TriggerHelicopter(p) => world::trigger_helicopter(ctx, p),
        CommandKind::LightningStrike(p) => world::lightning_strike(ctx, p),

        CommandKind::GetZombieCount => zombies::get_zombie_count(ctx),
        CommandKind::SpawnZombies(p) => zombies::spawn_zombies(ctx, p),
        CommandKind::SpawnHorde(p) => zombies::spawn_horde(ctx, p),
        CommandKind::ClearZombies(p) => zombies::clear_zombies(ctx, p),

        CommandKind::SpawnVehicle(p) => vehicles::spawn_vehicle(ctx, p),
        CommandKind::RemoveVehicle(p) => vehicles::remove_vehicle(ctx, p),
        CommandKind::RepairVehicle(p) => vehicles::repair_vehicle(ctx, p),
    }
}

/// Turn a `json!` object into result data
fn data(value: Value) -> Data {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Data::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Online player by name
fn require_player(host: &dyn HostApi, username: &str) -> Result<PlayerInfo> {
    host.player(username)
        .ok_or_else(|| BridgeError::NotFound(format!("player '{}'", username)))
}

/// Concrete position of a location
fn resolve_location(host: &dyn HostApi, location: &Location) -> Result<Position> {
    match location {
        Location::Point(position) => Ok(*position),
        Location::Player(username) => require_player(host, username).map(|p| p.position),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::debug_log::DebugLog;
    use crate::probe::detect;
    use crate::sim::SimulatedServer;
    use panel_bridge_core::Args;
    use std::path::PathBuf;

    /// Decode and dispatch one action against a simulated server
    pub fn run(host: &mut SimulatedServer, action: &str, args: Args) -> Result<Data> {
        let caps = detect(&*host);
        let mut state = BridgeState::new(
            "servertest",
            PathBuf::from("/srv/Lua/panelbridge/servertest"),
            DebugLog::default(),
            0,
        );
        run_with(host, &caps, &mut state, action, args)
    }

    pub fn run_with(
        host: &mut SimulatedServer,
        caps: &ApiCapabilitySet,
        state: &mut BridgeState,
        action: &str,
        args: Args,
    ) -> Result<Data> {
        let kind = CommandKind::decode(action, &args)?;
        let mut ctx = HandlerContext {
            host,
            caps,
            state,
            now: 1_700_000_000_000,
        };
        dispatch(kind, &mut ctx)
    }
}
