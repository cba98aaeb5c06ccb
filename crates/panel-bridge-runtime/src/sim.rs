//! In-memory game server
//!
//! Implements [`HostApi`] for either API generation so the runtime can be
//! exercised without a game: unit tests use it directly, and the
//! `panel-bridge-sim` binary runs a full runtime against a real exchange
//! directory with it.

use crate::handlers::STORM_STAGE;
use crate::host::{
    GameClock, HostApi, HostFault, HostResult, InventoryItem, PlayerInfo, VehicleInfo,
    WeatherState,
};
use panel_bridge_core::command::WeatherOverride;
use panel_bridge_core::{AccessLevel, Capability, Position};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};

/// Entry points present on the older API
pub const LEGACY_CAPABILITIES: &[Capability] = &[
    Capability::SetPosition,
    Capability::KickPlayer,
    Capability::SetAccessLevel,
    Capability::RestoreHealth,
    Capability::SetHealth,
    Capability::KillPlayer,
    Capability::SetGodMode,
    Capability::SetInvisible,
    Capability::SetGhostMode,
    Capability::SetNoClip,
    Capability::HaloNote,
    Capability::ServerMessage,
    Capability::AddXp,
    Capability::LevelPerk,
    Capability::LegacyTraits,
    Capability::AddItem,
    Capability::RemoveItem,
    Capability::SaveGame,
    Capability::ReloadOptions,
    Capability::LegacySandboxOption,
    Capability::SetHour,
    Capability::WeatherValues,
    Capability::ResetClimate,
    Capability::WeatherStage,
    Capability::HelicopterDay,
    Capability::CreateZombies,
    Capability::RemoveZombies,
    Capability::SpawnVehicleDebug,
    Capability::RemoveVehicleFromWorld,
    Capability::RepairVehicle,
];

/// Entry points present on the current API
pub const MODERN_CAPABILITIES: &[Capability] = &[
    Capability::TeleportTo,
    Capability::SetPosition,
    Capability::KickPlayer,
    Capability::DisconnectPlayer,
    Capability::SetRole,
    Capability::RestoreHealth,
    Capability::SetHealth,
    Capability::KillPlayer,
    Capability::SetGodMode,
    Capability::SetInvincible,
    Capability::SetInvisible,
    Capability::SetGhostMode,
    Capability::SetNoClip,
    Capability::PrivateMessage,
    Capability::HaloNote,
    Capability::ServerMessage,
    Capability::ChatBroadcast,
    Capability::AddXp,
    Capability::AddXpNoMultiplier,
    Capability::SetPerkLevel,
    Capability::LevelPerk,
    Capability::CharacterTraits,
    Capability::AddItems,
    Capability::AddItem,
    Capability::RemoveItems,
    Capability::RemoveItem,
    Capability::ClearInventory,
    Capability::SaveWorld,
    Capability::SaveGame,
    Capability::ReloadOptions,
    Capability::SandboxOptionByName,
    Capability::SetTimeOfDay,
    Capability::SetHour,
    Capability::ClimateOverride,
    Capability::StopWeather,
    Capability::ResetClimate,
    Capability::StormTrigger,
    Capability::WeatherStage,
    Capability::HelicopterEvent,
    Capability::LightningStrike,
    Capability::CreateZombies,
    Capability::ZombiesInOutfit,
    Capability::CreateHorde,
    Capability::RemoveZombies,
    Capability::KillZombies,
    Capability::AddVehicle,
    Capability::SpawnVehicleDebug,
    Capability::PermanentlyRemoveVehicle,
    Capability::RemoveVehicleFromWorld,
    Capability::RepairVehicle,
];

const PERKS: &[&str] = &[
    "Strength",
    "Fitness",
    "Sprinting",
    "Nimble",
    "Sneak",
    "Aiming",
    "Reloading",
    "Carpentry",
    "Cooking",
    "Farming",
    "FirstAid",
    "Electricity",
    "MetalWelding",
    "Mechanics",
    "Tailoring",
];

const ITEMS: &[&str] = &[
    "Base.Axe",
    "Base.Hammer",
    "Base.Nails",
    "Base.Plank",
    "Base.Bandage",
    "Base.WaterBottleFull",
    "Base.TinnedBeans",
    "Base.Shotgun",
    "Base.ShotgunShells",
];

/// Condition of a freshly spawned vehicle
const SPAWN_CONDITION: f64 = 60.0;

#[derive(Debug, Clone)]
struct SimPlayer {
    info: PlayerInfo,
    inventory: Vec<InventoryItem>,
    perks: BTreeMap<String, u32>,
    xp: BTreeMap<String, f64>,
    traits: BTreeSet<String>,
}

impl SimPlayer {
    fn new(username: &str, position: Position) -> Self {
        Self {
            info: PlayerInfo {
                username: username.to_string(),
                access_level: AccessLevel::None,
                position,
                health: 1.0,
                dead: false,
                god_mode: false,
                invisible: false,
                no_clip: false,
            },
            inventory: Vec::new(),
            perks: BTreeMap::new(),
            xp: BTreeMap::new(),
            traits: BTreeSet::new(),
        }
    }

    fn add(&mut self, item_type: &str, count: u32) {
        match self.inventory.iter_mut().find(|i| i.item_type == item_type) {
            Some(stack) => stack.count += count,
            None => self.inventory.push(InventoryItem {
                item_type: item_type.to_string(),
                name: item_type.rsplit('.').next().unwrap_or(item_type).to_string(),
                count,
            }),
        }
    }

    fn take(&mut self, item_type: &str, count: u32) -> u32 {
        let Some(index) = self.inventory.iter().position(|i| i.item_type == item_type) else {
            return 0;
        };
        let stack = &mut self.inventory[index];
        let taken = stack.count.min(count);
        stack.count -= taken;
        if stack.count == 0 {
            self.inventory.remove(index);
        }
        taken
    }

    fn set_trait(&mut self, name: &str, present: bool) -> bool {
        if present {
            self.traits.insert(name.to_string())
        } else {
            self.traits.remove(name)
        }
    }
}

/// Game server simulated in memory
#[derive(Debug, Clone)]
pub struct SimulatedServer {
    name: String,
    version: String,
    max_players: u32,
    supported: BTreeSet<Capability>,
    failing: BTreeSet<Capability>,
    roster_panics: bool,
    players: BTreeMap<String, SimPlayer>,
    clock: GameClock,
    weather: WeatherState,
    zombies: Vec<Position>,
    vehicles: BTreeMap<i64, VehicleInfo>,
    next_vehicle_id: i64,
    sandbox: BTreeMap<String, Value>,
    mods: Vec<String>,
    broadcasts: Vec<String>,
    private_messages: Vec<(String, String)>,
    kicked: Vec<String>,
    helicopter_calls: Vec<Option<String>>,
    lightning: Vec<Position>,
    saves: u32,
    reloads: u32,
}

impl SimulatedServer {
    fn with_capabilities(name: &str, version: &str, capabilities: &[Capability]) -> Self {
        let sandbox = [
            ("ZombieLore.Speed", json!(2)),
            ("ZombieLore.Strength", json!(2)),
            ("ZombieConfig.PopulationMultiplier", json!(1.0)),
            ("DayLength", json!(3)),
            ("XpMultiplier", json!(1.0)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            name: name.to_string(),
            version: version.to_string(),
            max_players: 32,
            supported: capabilities.iter().copied().collect(),
            failing: BTreeSet::new(),
            roster_panics: false,
            players: BTreeMap::new(),
            clock: GameClock {
                year: 1993,
                month: 7,
                day: 9,
                hour: 9,
                minute: 0,
                days_survived: 0,
            },
            weather: WeatherState {
                temperature: 22.0,
                ..Default::default()
            },
            zombies: Vec::new(),
            vehicles: BTreeMap::new(),
            next_vehicle_id: 1,
            sandbox,
            mods: Vec::new(),
            broadcasts: Vec::new(),
            private_messages: Vec::new(),
            kicked: Vec::new(),
            helicopter_calls: Vec::new(),
            lightning: Vec::new(),
            saves: 0,
            reloads: 0,
        }
    }

    /// Server on the older scripting API
    pub fn legacy(name: &str) -> Self {
        Self::with_capabilities(name, "41.78.16", LEGACY_CAPABILITIES)
    }

    /// Server on the current scripting API
    pub fn modern(name: &str) -> Self {
        Self::with_capabilities(name, "42.12.3", MODERN_CAPABILITIES)
    }

    /// Remove an entry point, as if the host never had it
    pub fn without(mut self, capability: Capability) -> Self {
        self.supported.remove(&capability);
        self
    }

    /// Make an entry point exist but raise when called
    pub fn failing(mut self, capability: Capability) -> Self {
        self.failing.insert(capability);
        self
    }

    /// Make the online-player query panic, as a broken host binding would
    pub fn panicking_roster(mut self) -> Self {
        self.roster_panics = true;
        self
    }

    pub fn with_player(mut self, username: &str, position: Position) -> Self {
        self.players
            .insert(username.to_string(), SimPlayer::new(username, position));
        self
    }

    pub fn with_mod(mut self, id: &str) -> Self {
        self.mods.push(id.to_string());
        self
    }

    pub fn saves(&self) -> u32 {
        self.saves
    }

    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    pub fn broadcasts(&self) -> &[String] {
        &self.broadcasts
    }

    pub fn private_messages(&self) -> &[(String, String)] {
        &self.private_messages
    }

    pub fn kicked(&self) -> &[String] {
        &self.kicked
    }

    pub fn helicopter_calls(&self) -> &[Option<String>] {
        &self.helicopter_calls
    }

    pub fn lightning_strikes(&self) -> &[Position] {
        &self.lightning
    }

    fn check(&self, capability: Capability) -> HostResult<()> {
        if !self.supported.contains(&capability) {
            return Err(HostFault::new(format!(
                "attempt to call nil ({})",
                capability.entry_point()
            )));
        }
        if self.failing.contains(&capability) {
            return Err(HostFault::new(format!(
                "simulated error in {}",
                capability.entry_point()
            )));
        }
        Ok(())
    }

    fn player_mut(&mut self, username: &str) -> HostResult<&mut SimPlayer> {
        self.players
            .get_mut(username)
            .ok_or_else(|| HostFault::new(format!("no player named {}", username)))
    }

    fn gated_player(&mut self, capability: Capability, username: &str) -> HostResult<&mut SimPlayer> {
        self.check(capability)?;
        self.player_mut(username)
    }

    fn apply_weather(&mut self, weather: &WeatherOverride) {
        let w = &mut self.weather;
        w.rain = weather.rain.unwrap_or(w.rain);
        w.fog = weather.fog.unwrap_or(w.fog);
        w.wind = weather.wind.unwrap_or(w.wind);
        w.snow = weather.snow.unwrap_or(w.snow);
        w.clouds = weather.clouds.unwrap_or(w.clouds);
        w.temperature = weather.temperature.unwrap_or(w.temperature);
    }

    fn calm_weather(&mut self) {
        self.weather = WeatherState {
            temperature: self.weather.temperature,
            ..Default::default()
        };
    }

    fn storm(&mut self) {
        self.weather.storm = true;
        self.weather.rain = 1.0;
        self.weather.wind = 0.8;
        self.weather.clouds = 1.0;
    }

    fn spawn(&mut self, at: Position, count: u32) -> u32 {
        self.zombies.extend(std::iter::repeat_n(at, count as usize));
        count
    }

    fn despawn(&mut self, area: Option<(Position, f64)>) -> u32 {
        let before = self.zombies.len();
        match area {
            None => self.zombies.clear(),
            Some((center, radius)) => self.zombies.retain(|z| {
                let (dx, dy) = (z.x - center.x, z.y - center.y);
                (dx * dx + dy * dy).sqrt() > radius
            }),
        }
        (before - self.zombies.len()) as u32
    }

    fn new_vehicle(&mut self, script: &str, at: Position) -> i64 {
        let id = self.next_vehicle_id;
        self.next_vehicle_id += 1;
        self.vehicles.insert(
            id,
            VehicleInfo {
                id,
                script: script.to_string(),
                position: at,
                condition: SPAWN_CONDITION,
            },
        );
        id
    }

    fn drop_vehicle(&mut self, id: i64) -> HostResult<()> {
        self.vehicles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| HostFault::new(format!("no vehicle with id {}", id)))
    }

    fn sandbox_get(&self, name: &str) -> Option<Value> {
        self.sandbox.get(name).cloned()
    }

    fn sandbox_set(&mut self, name: &str, value: &Value) -> bool {
        match self.sandbox.get_mut(name) {
            Some(slot) => {
                *slot = value.clone();
                true
            }
            None => false,
        }
    }
}

impl HostApi for SimulatedServer {
    fn supports(&self, capability: Capability) -> bool {
        self.supported.contains(&capability)
    }

    fn server_name(&self) -> String {
        self.name.clone()
    }

    fn game_version(&self) -> String {
        self.version.clone()
    }

    fn max_players(&self) -> u32 {
        self.max_players
    }

    fn online_players(&self) -> Vec<PlayerInfo> {
        if self.roster_panics {
            panic!("getOnlinePlayers binding is broken");
        }
        self.players.values().map(|p| p.info.clone()).collect()
    }

    fn player(&self, username: &str) -> Option<PlayerInfo> {
        self.players.get(username).map(|p| p.info.clone())
    }

    fn mods(&self) -> Vec<String> {
        self.mods.clone()
    }

    fn inventory(&self, username: &str) -> HostResult<Vec<InventoryItem>> {
        self.players
            .get(username)
            .map(|p| p.inventory.clone())
            .ok_or_else(|| HostFault::new(format!("no player named {}", username)))
    }

    fn item_exists(&self, item_type: &str) -> bool {
        ITEMS.contains(&item_type)
    }

    fn perk_level(&self, username: &str, perk: &str) -> HostResult<u32> {
        if !PERKS.contains(&perk) {
            return Err(HostFault::new(format!("unknown perk '{}'", perk)));
        }
        let player = self
            .players
            .get(username)
            .ok_or_else(|| HostFault::new(format!("no player named {}", username)))?;
        Ok(player.perks.get(perk).copied().unwrap_or(0))
    }

    fn game_clock(&self) -> GameClock {
        self.clock
    }

    fn weather(&self) -> WeatherState {
        self.weather
    }

    fn zombie_count(&self) -> u32 {
        self.zombies.len() as u32
    }

    fn vehicle(&self, id: i64) -> Option<VehicleInfo> {
        self.vehicles.get(&id).cloned()
    }

    fn teleport_to(&mut self, username: &str, to: Position) -> HostResult<()> {
        self.gated_player(Capability::TeleportTo, username)?.info.position = to;
        Ok(())
    }

    fn set_position(&mut self, username: &str, to: Position) -> HostResult<()> {
        self.gated_player(Capability::SetPosition, username)?.info.position = to;
        Ok(())
    }

    fn kick_player(&mut self, username: &str, _reason: &str) -> HostResult<()> {
        self.gated_player(Capability::KickPlayer, username)?;
        self.players.remove(username);
        self.kicked.push(username.to_string());
        Ok(())
    }

    fn disconnect_player(&mut self, username: &str) -> HostResult<()> {
        self.gated_player(Capability::DisconnectPlayer, username)?;
        self.players.remove(username);
        self.kicked.push(username.to_string());
        Ok(())
    }

    fn set_role(&mut self, username: &str, level: AccessLevel) -> HostResult<()> {
        self.gated_player(Capability::SetRole, username)?.info.access_level = level;
        Ok(())
    }

    fn set_access_level(&mut self, username: &str, level: AccessLevel) -> HostResult<()> {
        self.gated_player(Capability::SetAccessLevel, username)?.info.access_level = level;
        Ok(())
    }

    fn restore_health(&mut self, username: &str) -> HostResult<()> {
        let player = self.gated_player(Capability::RestoreHealth, username)?;
        player.info.health = 1.0;
        player.info.dead = false;
        Ok(())
    }

    fn set_health(&mut self, username: &str, health: f64) -> HostResult<()> {
        let player = self.gated_player(Capability::SetHealth, username)?;
        player.info.health = health.clamp(0.0, 1.0);
        player.info.dead = player.info.health == 0.0;
        Ok(())
    }

    fn kill_player(&mut self, username: &str) -> HostResult<()> {
        let player = self.gated_player(Capability::KillPlayer, username)?;
        player.info.health = 0.0;
        player.info.dead = true;
        Ok(())
    }

    fn set_god_mode(&mut self, username: &str, enabled: bool) -> HostResult<()> {
        self.gated_player(Capability::SetGodMode, username)?.info.god_mode = enabled;
        Ok(())
    }

    fn set_invincible(&mut self, username: &str, enabled: bool) -> HostResult<()> {
        self.gated_player(Capability::SetInvincible, username)?.info.god_mode = enabled;
        Ok(())
    }

    fn set_invisible(&mut self, username: &str, enabled: bool) -> HostResult<()> {
        self.gated_player(Capability::SetInvisible, username)?.info.invisible = enabled;
        Ok(())
    }

    fn set_ghost_mode(&mut self, username: &str, enabled: bool) -> HostResult<()> {
        self.gated_player(Capability::SetGhostMode, username)?.info.invisible = enabled;
        Ok(())
    }

    fn set_no_clip(&mut self, username: &str, enabled: bool) -> HostResult<()> {
        self.gated_player(Capability::SetNoClip, username)?.info.no_clip = enabled;
        Ok(())
    }

    fn send_private_message(&mut self, username: &str, message: &str) -> HostResult<()> {
        self.gated_player(Capability::PrivateMessage, username)?;
        self.private_messages
            .push((username.to_string(), message.to_string()));
        Ok(())
    }

    fn set_halo_note(&mut self, username: &str, message: &str) -> HostResult<()> {
        self.gated_player(Capability::HaloNote, username)?;
        self.private_messages
            .push((username.to_string(), message.to_string()));
        Ok(())
    }

    fn add_xp(&mut self, username: &str, perk: &str, amount: f64) -> HostResult<()> {
        let player = self.gated_player(Capability::AddXp, username)?;
        *player.xp.entry(perk.to_string()).or_insert(0.0) += amount;
        Ok(())
    }

    fn add_xp_no_multiplier(&mut self, username: &str, perk: &str, amount: f64) -> HostResult<()> {
        let player = self.gated_player(Capability::AddXpNoMultiplier, username)?;
        *player.xp.entry(perk.to_string()).or_insert(0.0) += amount;
        Ok(())
    }

    fn set_perk_level(&mut self, username: &str, perk: &str, level: u32) -> HostResult<()> {
        let player = self.gated_player(Capability::SetPerkLevel, username)?;
        player.perks.insert(perk.to_string(), level);
        Ok(())
    }

    fn level_perk(&mut self, username: &str, perk: &str) -> HostResult<()> {
        let player = self.gated_player(Capability::LevelPerk, username)?;
        *player.perks.entry(perk.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn set_character_trait(&mut self, username: &str, name: &str, present: bool) -> HostResult<bool> {
        Ok(self
            .gated_player(Capability::CharacterTraits, username)?
            .set_trait(name, present))
    }

    fn set_legacy_trait(&mut self, username: &str, name: &str, present: bool) -> HostResult<bool> {
        Ok(self
            .gated_player(Capability::LegacyTraits, username)?
            .set_trait(name, present))
    }

    fn add_items(&mut self, username: &str, item_type: &str, count: u32) -> HostResult<()> {
        self.gated_player(Capability::AddItems, username)?
            .add(item_type, count);
        Ok(())
    }

    fn add_item(&mut self, username: &str, item_type: &str) -> HostResult<()> {
        self.gated_player(Capability::AddItem, username)?.add(item_type, 1);
        Ok(())
    }

    fn remove_items(&mut self, username: &str, item_type: &str, count: u32) -> HostResult<u32> {
        Ok(self
            .gated_player(Capability::RemoveItems, username)?
            .take(item_type, count))
    }

    fn remove_item(&mut self, username: &str, item_type: &str) -> HostResult<bool> {
        Ok(self
            .gated_player(Capability::RemoveItem, username)?
            .take(item_type, 1)
            == 1)
    }

    fn clear_inventory(&mut self, username: &str) -> HostResult<u32> {
        let player = self.gated_player(Capability::ClearInventory, username)?;
        let removed = player.inventory.iter().map(|i| i.count).sum();
        player.inventory.clear();
        Ok(removed)
    }

    fn send_server_message(&mut self, message: &str) -> HostResult<()> {
        self.check(Capability::ServerMessage)?;
        self.broadcasts.push(message.to_string());
        Ok(())
    }

    fn broadcast_chat(&mut self, message: &str) -> HostResult<()> {
        self.check(Capability::ChatBroadcast)?;
        self.broadcasts.push(message.to_string());
        Ok(())
    }

    fn save_world(&mut self) -> HostResult<()> {
        self.check(Capability::SaveWorld)?;
        self.saves += 1;
        Ok(())
    }

    fn save_game(&mut self) -> HostResult<()> {
        self.check(Capability::SaveGame)?;
        self.saves += 1;
        Ok(())
    }

    fn reload_options(&mut self) -> HostResult<()> {
        self.check(Capability::ReloadOptions)?;
        self.reloads += 1;
        Ok(())
    }

    fn sandbox_option(&self, name: &str) -> HostResult<Option<Value>> {
        self.check(Capability::SandboxOptionByName)?;
        Ok(self.sandbox_get(name))
    }

    fn set_sandbox_option(&mut self, name: &str, value: &Value) -> HostResult<bool> {
        self.check(Capability::SandboxOptionByName)?;
        Ok(self.sandbox_set(name, value))
    }

    fn legacy_sandbox_option(&self, name: &str) -> HostResult<Option<Value>> {
        self.check(Capability::LegacySandboxOption)?;
        Ok(self.sandbox_get(name))
    }

    fn set_legacy_sandbox_option(&mut self, name: &str, value: &Value) -> HostResult<bool> {
        self.check(Capability::LegacySandboxOption)?;
        Ok(self.sandbox_set(name, value))
    }

    fn set_time_of_day(&mut self, hour: u32, minute: u32) -> HostResult<()> {
        self.check(Capability::SetTimeOfDay)?;
        self.clock.hour = hour;
        self.clock.minute = minute;
        Ok(())
    }

    fn set_hour(&mut self, hour: u32) -> HostResult<()> {
        self.check(Capability::SetHour)?;
        self.clock.hour = hour;
        self.clock.minute = 0;
        Ok(())
    }

    fn override_climate(&mut self, weather: &WeatherOverride) -> HostResult<()> {
        self.check(Capability::ClimateOverride)?;
        self.apply_weather(weather);
        Ok(())
    }

    fn set_weather_values(&mut self, weather: &WeatherOverride) -> HostResult<()> {
        self.check(Capability::WeatherValues)?;
        self.apply_weather(weather);
        Ok(())
    }

    fn stop_weather(&mut self) -> HostResult<()> {
        self.check(Capability::StopWeather)?;
        self.calm_weather();
        Ok(())
    }

    fn reset_climate(&mut self) -> HostResult<()> {
        self.check(Capability::ResetClimate)?;
        self.calm_weather();
        Ok(())
    }

    fn trigger_storm(&mut self, _hours: f64) -> HostResult<()> {
        self.check(Capability::StormTrigger)?;
        self.storm();
        Ok(())
    }

    fn trigger_weather_stage(&mut self, stage: u32, _hours: f64) -> HostResult<()> {
        self.check(Capability::WeatherStage)?;
        if stage != STORM_STAGE {
            return Err(HostFault::new(format!("unsupported weather stage {}", stage)));
        }
        self.storm();
        Ok(())
    }

    fn helicopter_event(&mut self, target: Option<&str>) -> HostResult<()> {
        self.check(Capability::HelicopterEvent)?;
        self.helicopter_calls.push(target.map(str::to_string));
        Ok(())
    }

    fn schedule_helicopter_day(&mut self) -> HostResult<()> {
        self.check(Capability::HelicopterDay)?;
        self.helicopter_calls.push(None);
        Ok(())
    }

    fn lightning_strike(&mut self, at: Position) -> HostResult<()> {
        self.check(Capability::LightningStrike)?;
        self.lightning.push(at);
        Ok(())
    }

    fn create_zombies(&mut self, at: Position, count: u32) -> HostResult<u32> {
        self.check(Capability::CreateZombies)?;
        Ok(self.spawn(at, count))
    }

    fn add_zombies_in_outfit(&mut self, at: Position, count: u32) -> HostResult<u32> {
        self.check(Capability::ZombiesInOutfit)?;
        Ok(self.spawn(at, count))
    }

    fn create_horde(&mut self, at: Position, count: u32) -> HostResult<u32> {
        self.check(Capability::CreateHorde)?;
        Ok(self.spawn(at, count))
    }

    fn remove_zombies(&mut self, area: Option<(Position, f64)>) -> HostResult<u32> {
        self.check(Capability::RemoveZombies)?;
        Ok(self.despawn(area))
    }

    fn kill_zombies(&mut self, area: Option<(Position, f64)>) -> HostResult<u32> {
        self.check(Capability::KillZombies)?;
        Ok(self.despawn(area))
    }

    fn add_vehicle(&mut self, script: &str, at: Position) -> HostResult<i64> {
        self.check(Capability::AddVehicle)?;
        Ok(self.new_vehicle(script, at))
    }

    fn spawn_vehicle_debug(&mut self, script: &str, at: Position) -> HostResult<i64> {
        self.check(Capability::SpawnVehicleDebug)?;
        Ok(self.new_vehicle(script, at))
    }

    fn remove_vehicle(&mut self, id: i64) -> HostResult<()> {
        self.check(Capability::PermanentlyRemoveVehicle)?;
        self.drop_vehicle(id)
    }

    fn remove_vehicle_from_world(&mut self, id: i64) -> HostResult<()> {
        self.check(Capability::RemoveVehicleFromWorld)?;
        self.drop_vehicle(id)
    }

    fn repair_vehicle(&mut self, id: i64) -> HostResult<()> {
        self.check(Capability::RepairVehicle)?;
        let vehicle = self
            .vehicles
            .get_mut(&id)
            .ok_or_else(|| HostFault::new(format!("no vehicle with id {}", id)))?;
        vehicle.condition = 100.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_tables_are_distinct_generations() {
        let legacy = SimulatedServer::legacy("s");
        let modern = SimulatedServer::modern("s");
        assert!(legacy.supports(Capability::SetAccessLevel));
        assert!(!legacy.supports(Capability::SetRole));
        assert!(modern.supports(Capability::SetRole));
        assert!(!modern.supports(Capability::SetAccessLevel));
    }

    #[test]
    fn test_unsupported_entry_point_raises() {
        let mut host = SimulatedServer::legacy("s");
        assert!(host.save_world().is_err());
        assert!(host.save_game().is_ok());
        assert_eq!(host.saves(), 1);
    }

    #[test]
    fn test_inventory_stacks() {
        let mut host = SimulatedServer::modern("s").with_player("Bob", Position::default());
        host.add_items("Bob", "Base.Nails", 10).unwrap();
        host.add_item("Bob", "Base.Nails").unwrap();
        let inventory = host.inventory("Bob").unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].count, 11);
        assert_eq!(inventory[0].name, "Nails");
        assert_eq!(host.remove_items("Bob", "Base.Nails", 20).unwrap(), 11);
        assert!(host.inventory("Bob").unwrap().is_empty());
    }
}
