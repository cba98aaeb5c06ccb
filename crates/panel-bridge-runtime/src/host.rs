//! Game-server scripting surface
//!
//! [`HostApi`] is everything the runtime may call on the embedding game
//! server. The first group of methods exists on every API generation. The
//! rest are generation-specific entry points, each guarded by a
//! [`Capability`]; the runtime only calls one after the startup probe has
//! found it available, so their default bodies just report a fault.

use panel_bridge_core::command::WeatherOverride;
use panel_bridge_core::{AccessLevel, Capability, Position};
use serde::Serialize;
use serde_json::Value;

/// Result of a host entry point
pub type HostResult<T> = std::result::Result<T, HostFault>;

/// A host entry point raised an error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct HostFault(pub String);

impl HostFault {
    pub fn new(reason: impl Into<String>) -> Self {
        HostFault(reason.into())
    }

    fn missing(capability: Capability) -> Self {
        HostFault(format!("{} is not implemented", capability.entry_point()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub username: String,
    pub access_level: AccessLevel,
    pub position: Position,
    /// 0.0 (dead) to 1.0 (full)
    pub health: f64,
    pub dead: bool,
    pub god_mode: bool,
    pub invisible: bool,
    pub no_clip: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Full item type, e.g. `Base.Axe`
    pub item_type: String,
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameClock {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub days_survived: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherState {
    pub rain: f64,
    pub fog: f64,
    pub wind: f64,
    pub snow: f64,
    pub clouds: f64,
    pub temperature: f64,
    pub storm: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub id: i64,
    pub script: String,
    pub position: Position,
    /// 0 to 100
    pub condition: f64,
}

/// Scripting API of the embedding game server
pub trait HostApi {
    // ========== Available on every generation ==========

    /// Whether an entry point exists on this host; consulted once at startup
    fn supports(&self, capability: Capability) -> bool;

    fn server_name(&self) -> String;

    fn game_version(&self) -> String;

    fn max_players(&self) -> u32;

    fn online_players(&self) -> Vec<PlayerInfo>;

    fn player(&self, username: &str) -> Option<PlayerInfo>;

    fn mods(&self) -> Vec<String>;

    fn inventory(&self, username: &str) -> HostResult<Vec<InventoryItem>>;

    /// Whether an item type is known to the script manager
    fn item_exists(&self, item_type: &str) -> bool;

    fn perk_level(&self, username: &str, perk: &str) -> HostResult<u32>;

    fn game_clock(&self) -> GameClock;

    fn weather(&self) -> WeatherState;

    fn zombie_count(&self) -> u32;

    fn vehicle(&self, id: i64) -> Option<VehicleInfo>;

    // ========== Players ==========

    fn teleport_to(&mut self, _username: &str, _to: Position) -> HostResult<()> {
        Err(HostFault::missing(Capability::TeleportTo))
    }

    fn set_position(&mut self, _username: &str, _to: Position) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetPosition))
    }

    fn kick_player(&mut self, _username: &str, _reason: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::KickPlayer))
    }

    fn disconnect_player(&mut self, _username: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::DisconnectPlayer))
    }

    fn set_role(&mut self, _username: &str, _level: AccessLevel) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetRole))
    }

    fn set_access_level(&mut self, _username: &str, _level: AccessLevel) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetAccessLevel))
    }

    fn restore_health(&mut self, _username: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::RestoreHealth))
    }

    fn set_health(&mut self, _username: &str, _health: f64) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetHealth))
    }

    fn kill_player(&mut self, _username: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::KillPlayer))
    }

    fn set_god_mode(&mut self, _username: &str, _enabled: bool) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetGodMode))
    }

    fn set_invincible(&mut self, _username: &str, _enabled: bool) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetInvincible))
    }

    fn set_invisible(&mut self, _username: &str, _enabled: bool) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetInvisible))
    }

    fn set_ghost_mode(&mut self, _username: &str, _enabled: bool) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetGhostMode))
    }

    fn set_no_clip(&mut self, _username: &str, _enabled: bool) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetNoClip))
    }

    fn send_private_message(&mut self, _username: &str, _message: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::PrivateMessage))
    }

    fn set_halo_note(&mut self, _username: &str, _message: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::HaloNote))
    }

    fn add_xp(&mut self, _username: &str, _perk: &str, _amount: f64) -> HostResult<()> {
        Err(HostFault::missing(Capability::AddXp))
    }

    fn add_xp_no_multiplier(&mut self, _username: &str, _perk: &str, _amount: f64) -> HostResult<()> {
        Err(HostFault::missing(Capability::AddXpNoMultiplier))
    }

    fn set_perk_level(&mut self, _username: &str, _perk: &str, _level: u32) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetPerkLevel))
    }

    /// Raise a perk by one level
    fn level_perk(&mut self, _username: &str, _perk: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::LevelPerk))
    }

    /// Add or remove a trait through the character trait collection
    fn set_character_trait(&mut self, _username: &str, _name: &str, _present: bool) -> HostResult<bool> {
        Err(HostFault::missing(Capability::CharacterTraits))
    }

    /// Add or remove a trait through the legacy string trait list
    fn set_legacy_trait(&mut self, _username: &str, _name: &str, _present: bool) -> HostResult<bool> {
        Err(HostFault::missing(Capability::LegacyTraits))
    }

    // ========== Inventory ==========

    fn add_items(&mut self, _username: &str, _item_type: &str, _count: u32) -> HostResult<()> {
        Err(HostFault::missing(Capability::AddItems))
    }

    fn add_item(&mut self, _username: &str, _item_type: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::AddItem))
    }

    /// Returns how many were removed
    fn remove_items(&mut self, _username: &str, _item_type: &str, _count: u32) -> HostResult<u32> {
        Err(HostFault::missing(Capability::RemoveItems))
    }

    /// Returns false when no such item was carried
    fn remove_item(&mut self, _username: &str, _item_type: &str) -> HostResult<bool> {
        Err(HostFault::missing(Capability::RemoveItem))
    }

    /// Returns how many items were removed
    fn clear_inventory(&mut self, _username: &str) -> HostResult<u32> {
        Err(HostFault::missing(Capability::ClearInventory))
    }

    // ========== Server ==========

    fn send_server_message(&mut self, _message: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::ServerMessage))
    }

    fn broadcast_chat(&mut self, _message: &str) -> HostResult<()> {
        Err(HostFault::missing(Capability::ChatBroadcast))
    }

    fn save_world(&mut self) -> HostResult<()> {
        Err(HostFault::missing(Capability::SaveWorld))
    }

    fn save_game(&mut self) -> HostResult<()> {
        Err(HostFault::missing(Capability::SaveGame))
    }

    fn reload_options(&mut self) -> HostResult<()> {
        Err(HostFault::missing(Capability::ReloadOptions))
    }

    fn sandbox_option(&self, _name: &str) -> HostResult<Option<Value>> {
        Err(HostFault::missing(Capability::SandboxOptionByName))
    }

    fn set_sandbox_option(&mut self, _name: &str, _value: &Value) -> HostResult<bool> {
        Err(HostFault::missing(Capability::SandboxOptionByName))
    }

    fn legacy_sandbox_option(&self, _name: &str) -> HostResult<Option<Value>> {
        Err(HostFault::missing(Capability::LegacySandboxOption))
    }

    fn set_legacy_sandbox_option(&mut self, _name: &str, _value: &Value) -> HostResult<bool> {
        Err(HostFault::missing(Capability::LegacySandboxOption))
    }

    // ========== World ==========

    fn set_time_of_day(&mut self, _hour: u32, _minute: u32) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetTimeOfDay))
    }

    fn set_hour(&mut self, _hour: u32) -> HostResult<()> {
        Err(HostFault::missing(Capability::SetHour))
    }

    fn override_climate(&mut self, _weather: &WeatherOverride) -> HostResult<()> {
        Err(HostFault::missing(Capability::ClimateOverride))
    }

    fn set_weather_values(&mut self, _weather: &WeatherOverride) -> HostResult<()> {
        Err(HostFault::missing(Capability::WeatherValues))
    }

    fn stop_weather(&mut self) -> HostResult<()> {
        Err(HostFault::missing(Capability::StopWeather))
    }

    fn reset_climate(&mut self) -> HostResult<()> {
        Err(HostFault::missing(Capability::ResetClimate))
    }

    fn trigger_storm(&mut self, _hours: f64) -> HostResult<()> {
        Err(HostFault::missing(Capability::StormTrigger))
    }

    /// Force a custom weather stage (the storm stage is `8`)
    fn trigger_weather_stage(&mut self, _stage: u32, _hours: f64) -> HostResult<()> {
        Err(HostFault::missing(Capability::WeatherStage))
    }

    fn helicopter_event(&mut self, _target: Option<&str>) -> HostResult<()> {
        Err(HostFault::missing(Capability::HelicopterEvent))
    }

    /// Schedule the helicopter for the current day
    fn schedule_helicopter_day(&mut self) -> HostResult<()> {
        Err(HostFault::missing(Capability::HelicopterDay))
    }

    fn lightning_strike(&mut self, _at: Position) -> HostResult<()> {
        Err(HostFault::missing(Capability::LightningStrike))
    }

    // ========== Zombies ==========

    /// Returns how many were spawned
    fn create_zombies(&mut self, _at: Position, _count: u32) -> HostResult<u32> {
        Err(HostFault::missing(Capability::CreateZombies))
    }

    fn add_zombies_in_outfit(&mut self, _at: Position, _count: u32) -> HostResult<u32> {
        Err(HostFault::missing(Capability::ZombiesInOutfit))
    }

    fn create_horde(&mut self, _at: Position, _count: u32) -> HostResult<u32> {
        Err(HostFault::missing(Capability::CreateHorde))
    }

    /// Removes zombies within `radius` of `center`, or all when `None`
    fn remove_zombies(&mut self, _area: Option<(Position, f64)>) -> HostResult<u32> {
        Err(HostFault::missing(Capability::RemoveZombies))
    }

    fn kill_zombies(&mut self, _area: Option<(Position, f64)>) -> HostResult<u32> {
        Err(HostFault::missing(Capability::KillZombies))
    }

    // ========== Vehicles ==========

    /// Returns the new vehicle id
    fn add_vehicle(&mut self, _script: &str, _at: Position) -> HostResult<i64> {
        Err(HostFault::missing(Capability::AddVehicle))
    }

    fn spawn_vehicle_debug(&mut self, _script: &str, _at: Position) -> HostResult<i64> {
        Err(HostFault::missing(Capability::SpawnVehicleDebug))
    }

    fn remove_vehicle(&mut self, _id: i64) -> HostResult<()> {
        Err(HostFault::missing(Capability::PermanentlyRemoveVehicle))
    }

    fn remove_vehicle_from_world(&mut self, _id: i64) -> HostResult<()> {
        Err(HostFault::missing(Capability::RemoveVehicleFromWorld))
    }

    fn repair_vehicle(&mut self, _id: i64) -> HostResult<()> {
        Err(HostFault::missing(Capability::RepairVehicle))
    }
}
