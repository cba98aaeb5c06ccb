//! Host-API capabilities
//!
//! The game server exposes two divergent scripting API generations. Each
//! [`Capability`] names one entry point a handler may call. The set of
//! available entry points is detected once at startup and never changes.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Host scripting API generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiGeneration {
    /// Older API (build 41 style surfaces)
    Legacy,
    /// Current API (build 42 style surfaces)
    Modern,
}

impl fmt::Display for ApiGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiGeneration::Legacy => f.write_str("legacy"),
            ApiGeneration::Modern => f.write_str("modern"),
        }
    }
}

/// A single host entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    TeleportTo,
    SetPosition,
    KickPlayer,
    DisconnectPlayer,
    SetRole,
    SetAccessLevel,
    RestoreHealth,
    SetHealth,
    KillPlayer,
    SetGodMode,
    SetInvincible,
    SetInvisible,
    SetNoClip,
    SetGhostMode,
    PrivateMessage,
    HaloNote,
    ServerMessage,
    ChatBroadcast,
    AddXp,
    AddXpNoMultiplier,
    SetPerkLevel,
    LevelPerk,
    CharacterTraits,
    LegacyTraits,
    AddItems,
    AddItem,
    RemoveItems,
    RemoveItem,
    ClearInventory,
    SaveWorld,
    SaveGame,
    ReloadOptions,
    SandboxOptionByName,
    LegacySandboxOption,
    SetTimeOfDay,
    SetHour,
    ClimateOverride,
    WeatherValues,
    StopWeather,
    ResetClimate,
    WeatherStage,
    StormTrigger,
    HelicopterEvent,
    HelicopterDay,
    LightningStrike,
    CreateZombies,
    ZombiesInOutfit,
    CreateHorde,
    RemoveZombies,
    KillZombies,
    AddVehicle,
    SpawnVehicleDebug,
    PermanentlyRemoveVehicle,
    RemoveVehicleFromWorld,
    RepairVehicle,
}

impl Capability {
    /// Every known entry point
    pub const ALL: &'static [Capability] = &[
        Capability::TeleportTo,
        Capability::SetPosition,
        Capability::KickPlayer,
        Capability::DisconnectPlayer,
        Capability::SetRole,
        Capability::SetAccessLevel,
        Capability::RestoreHealth,
        Capability::SetHealth,
        Capability::KillPlayer,
        Capability::SetGodMode,
        Capability::SetInvincible,
        Capability::SetInvisible,
        Capability::SetNoClip,
        Capability::SetGhostMode,
        Capability::PrivateMessage,
        Capability::HaloNote,
        Capability::ServerMessage,
        Capability::ChatBroadcast,
        Capability::AddXp,
        Capability::AddXpNoMultiplier,
        Capability::SetPerkLevel,
        Capability::LevelPerk,
        Capability::CharacterTraits,
        Capability::LegacyTraits,
        Capability::AddItems,
        Capability::AddItem,
        Capability::RemoveItems,
        Capability::RemoveItem,
        Capability::ClearInventory,
        Capability::SaveWorld,
        Capability::SaveGame,
        Capability::ReloadOptions,
        Capability::SandboxOptionByName,
        Capability::LegacySandboxOption,
        Capability::SetTimeOfDay,
        Capability::SetHour,
        Capability::ClimateOverride,
        Capability::WeatherValues,
        Capability::StopWeather,
        Capability::ResetClimate,
        Capability::WeatherStage,
        Capability::StormTrigger,
        Capability::HelicopterEvent,
        Capability::HelicopterDay,
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

    /// Name of the host member this capability stands for
    pub fn entry_point(self) -> &'static str {
        match self {
            Capability::TeleportTo => "player.teleportTo",
            Capability::SetPosition => "player.setX/setY/setZ",
            Capability::KickPlayer => "server.kickPlayer",
            Capability::DisconnectPlayer => "connection.forceDisconnect",
            Capability::SetRole => "player.setRole",
            Capability::SetAccessLevel => "player.setAccessLevel",
            Capability::RestoreHealth => "bodyDamage.RestoreToFullHealth",
            Capability::SetHealth => "player.setHealth",
            Capability::KillPlayer => "player.Kill",
            Capability::SetGodMode => "player.setGodMod",
            Capability::SetInvincible => "player.setInvincible",
            Capability::SetInvisible => "player.setInvisible",
            Capability::SetNoClip => "player.setNoClip",
            Capability::SetGhostMode => "player.setGhostMode",
            Capability::PrivateMessage => "server.sendPrivateMessage",
            Capability::HaloNote => "player.setHaloNote",
            Capability::ServerMessage => "server.sendServerMessage",
            Capability::ChatBroadcast => "chat.sendBroadcast",
            Capability::AddXp => "xp.AddXP",
            Capability::AddXpNoMultiplier => "xp.AddXPNoMultiplier",
            Capability::SetPerkLevel => "player.setPerkLevelDebug",
            Capability::LevelPerk => "player.LevelPerk",
            Capability::CharacterTraits => "player.getCharacterTraits",
            Capability::LegacyTraits => "player.getTraits",
            Capability::AddItems => "inventory.AddItems",
            Capability::AddItem => "inventory.AddItem",
            Capability::RemoveItems => "inventory.RemoveItems",
            Capability::RemoveItem => "inventory.Remove",
            Capability::ClearInventory => "inventory.clear",
            Capability::SaveWorld => "world.save",
            Capability::SaveGame => "server.saveGame",
            Capability::ReloadOptions => "ServerOptions.reload",
            Capability::SandboxOptionByName => "SandboxOptions.getOptionByName",
            Capability::LegacySandboxOption => "SandboxOptions.getOption",
            Capability::SetTimeOfDay => "GameTime.setTimeOfDay",
            Capability::SetHour => "GameTime.setHour",
            Capability::ClimateOverride => "ClimateManager.floatOverride",
            Capability::WeatherValues => "ClimateManager.setWeatherValues",
            Capability::StopWeather => "ClimateManager.stopWeatherAndThunder",
            Capability::ResetClimate => "ClimateManager.resetOverrides",
            Capability::WeatherStage => "ClimateManager.triggerCustomWeatherStage",
            Capability::StormTrigger => "ClimateManager.triggerStorm",
            Capability::HelicopterEvent => "world.helicopterEvent",
            Capability::HelicopterDay => "world.helicopterDay",
            Capability::LightningStrike => "ClimateManager.lightningStrike",
            Capability::CreateZombies => "VirtualZombieManager.createRealZombies",
            Capability::ZombiesInOutfit => "world.addZombiesInOutfit",
            Capability::CreateHorde => "VirtualZombieManager.createHorde",
            Capability::RemoveZombies => "zombie.removeFromWorld",
            Capability::KillZombies => "zombie.Kill",
            Capability::AddVehicle => "world.addVehicle",
            Capability::SpawnVehicleDebug => "world.addVehicleDebug",
            Capability::PermanentlyRemoveVehicle => "vehicle.permanentlyRemove",
            Capability::RemoveVehicleFromWorld => "vehicle.removeFromWorld",
            Capability::RepairVehicle => "vehicle.repair",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry_point())
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.entry_point())
    }
}

/// Detected host-API generation and available entry points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiCapabilitySet {
    pub generation: ApiGeneration,
    available: BTreeSet<Capability>,
}

impl ApiCapabilitySet {
    pub fn new(generation: ApiGeneration, available: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            generation,
            available: available.into_iter().collect(),
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.available.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.available.iter().copied()
    }

    /// Entry point names, sorted
    pub fn names(&self) -> Vec<String> {
        self.available.iter().map(|c| c.entry_point().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}
