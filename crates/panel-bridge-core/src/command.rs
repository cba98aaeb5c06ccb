//! Commands and their typed payloads
//!
//! A [`Command`] is what the host writes into `commands.json`. Before dispatch
//! it is decoded into a [`CommandKind`], a closed enum whose variants carry
//! validated payloads. Unknown actions and bad arguments are rejected here,
//! at the decode boundary, and never reach a handler.

use crate::args::Args;
use crate::debug::LogLevel;
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// Opaque command identifier chosen by the host
pub type CommandId = String;

/// Command as written by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub action: String,
    #[serde(default)]
    pub args: Args,
}

impl Command {
    pub fn new(id: impl Into<CommandId>, action: impl Into<String>, args: Args) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            args,
        }
    }

    /// Validate the action name and arguments
    pub fn decode(&self) -> Result<CommandKind> {
        CommandKind::decode(&self.action, &self.args)
    }
}

/// World position in tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Where something should happen: next to a player or at a fixed point
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Player(String),
    Point(Position),
}

/// Account access levels understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    None,
    Observer,
    Gm,
    Overseer,
    Moderator,
    Admin,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::Observer => "observer",
            AccessLevel::Gm => "gm",
            AccessLevel::Overseer => "overseer",
            AccessLevel::Moderator => "moderator",
            AccessLevel::Admin => "admin",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "user" => Some(AccessLevel::None),
            "observer" => Some(AccessLevel::Observer),
            "gm" => Some(AccessLevel::Gm),
            "overseer" => Some(AccessLevel::Overseer),
            "moderator" => Some(AccessLevel::Moderator),
            "admin" => Some(AccessLevel::Admin),
            _ => None,
        }
    }
}

/// Build a typed payload from an argument map
pub trait FromArgs: Sized {
    fn from_args(args: &Args) -> Result<Self>;
}

impl FromArgs for Position {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Position {
            x: args.number("x")?,
            y: args.number("y")?,
            z: args.opt_number("z")?.unwrap_or(0.0),
        })
    }
}

impl FromArgs for Location {
    fn from_args(args: &Args) -> Result<Self> {
        match args.opt_string("username")? {
            Some(username) => Ok(Location::Player(username)),
            None => Position::from_args(args).map(Location::Point),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugLogQuery {
    pub limit: Option<usize>,
    pub level: Option<LogLevel>,
}

impl FromArgs for DebugLogQuery {
    fn from_args(args: &Args) -> Result<Self> {
        let limit = match args.opt_integer("limit")? {
            Some(n) if n < 1 => return Err(BridgeError::invalid("limit", "must be at least 1")),
            Some(n) => Some(n as usize),
            None => None,
        };
        let level = match args.opt_string("level")? {
            Some(raw) => Some(
                raw.parse::<LogLevel>()
                    .map_err(|_| BridgeError::invalid("level", format!("unknown level '{}'", raw)))?,
            ),
            None => None,
        };
        Ok(Self { limit, level })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toggle {
    pub enabled: bool,
}

impl FromArgs for Toggle {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            enabled: args.flag("enabled")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub message: String,
}

impl FromArgs for Message {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            message: args.string("message")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionName {
    pub name: String,
}

impl FromArgs for OptionName {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            name: args.string("name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOption {
    pub name: String,
    pub value: serde_json::Value,
}

impl FromArgs for SetOption {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            name: args.string("name")?,
            value: args.value("value")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTarget {
    pub username: String,
}

impl FromArgs for PlayerTarget {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            username: args.string("username")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Teleport {
    pub username: String,
    pub destination: Position,
}

impl FromArgs for Teleport {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            username: args.string("username")?,
            destination: Position::from_args(args)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeleportToPlayer {
    pub username: String,
    pub target: String,
}

impl FromArgs for TeleportToPlayer {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            username: args.string("username")?,
            target: args.string("target")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kick {
    pub username: String,
    pub reason: Option<String>,
}

impl FromArgs for Kick {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            username: args.string("username")?,
            reason: args.opt_string("reason")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetAccessLevel {
    pub username: String,
    pub level: AccessLevel,
}

impl FromArgs for SetAccessLevel {
    fn from_args(args: &Args) -> Result<Self> {
        let raw = args.string("level")?;
        let level = AccessLevel::parse(&raw)
            .ok_or_else(|| BridgeError::invalid("level", format!("unknown access level '{}'", raw)))?;
        Ok(Self {
            username: args.string("username")?,
            level,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerToggle {
    pub username: String,
    pub enabled: bool,
}

impl FromArgs for PlayerToggle {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            username: args.string("username")?,
            enabled: args.flag("enabled")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMessage {
    pub username: String,
    pub message: String,
}

impl FromArgs for PlayerMessage {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            username: args.string("username")?,
            message: args.string("message")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddXp {
    pub username: String,
    pub perk: String,
    pub amount: f64,
}

impl FromArgs for AddXp {
    fn from_args(args: &Args) -> Result<Self> {
        let amount = args.number("amount")?;
        if amount <= 0.0 {
            return Err(BridgeError::invalid("amount", "must be positive"));
        }
        Ok(Self {
            username: args.string("username")?,
            perk: args.string("perk")?,
            amount,
        })
    }
}

/// Highest skill level a perk can reach
pub const MAX_PERK_LEVEL: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SetPerkLevel {
    pub username: String,
    pub perk: String,
    pub level: u32,
}

impl FromArgs for SetPerkLevel {
    fn from_args(args: &Args) -> Result<Self> {
        let level = args.integer("level")?;
        if !(0..=MAX_PERK_LEVEL as i64).contains(&level) {
            return Err(BridgeError::invalid(
                "level",
                format!("must be between 0 and {}", MAX_PERK_LEVEL),
            ));
        }
        Ok(Self {
            username: args.string("username")?,
            perk: args.string("perk")?,
            level: level as u32,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTrait {
    pub username: String,
    pub trait_name: String,
}

impl FromArgs for PlayerTrait {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            username: args.string("username")?,
            trait_name: args.string("trait")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemGrant {
    pub username: String,
    pub item: String,
    pub count: u32,
}

impl FromArgs for ItemGrant {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            username: args.string("username")?,
            item: args.string("item")?,
            count: args.count("count", 1, 1000)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetGameTime {
    pub hour: u32,
    pub minute: Option<u32>,
}

impl FromArgs for SetGameTime {
    fn from_args(args: &Args) -> Result<Self> {
        let hour = args.integer("hour")?;
        if !(0..24).contains(&hour) {
            return Err(BridgeError::invalid("hour", "must be between 0 and 23"));
        }
        let minute = match args.opt_integer("minute")? {
            Some(m) if !(0..60).contains(&m) => {
                return Err(BridgeError::invalid("minute", "must be between 0 and 59"));
            }
            Some(m) => Some(m as u32),
            None => None,
        };
        Ok(Self {
            hour: hour as u32,
            minute,
        })
    }
}

/// Weather values to override; every intensity is in `0.0..=1.0`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clouds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl FromArgs for WeatherOverride {
    fn from_args(args: &Args) -> Result<Self> {
        let intensity = |key: &str| -> Result<Option<f64>> {
            match args.opt_number(key)? {
                Some(v) if !(0.0..=1.0).contains(&v) => {
                    Err(BridgeError::invalid(key, "must be between 0 and 1"))
                }
                other => Ok(other),
            }
        };
        let weather = Self {
            rain: intensity("rain")?,
            fog: intensity("fog")?,
            wind: intensity("wind")?,
            snow: intensity("snow")?,
            clouds: intensity("clouds")?,
            temperature: args.opt_number("temperature")?,
        };
        if weather == Self::default() {
            return Err(BridgeError::MissingArgument(
                "rain|fog|wind|snow|clouds|temperature".into(),
            ));
        }
        Ok(weather)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Storm {
    pub duration_hours: f64,
}

impl FromArgs for Storm {
    fn from_args(args: &Args) -> Result<Self> {
        let duration_hours = args.opt_number("duration")?.unwrap_or(4.0);
        if duration_hours <= 0.0 || duration_hours > 72.0 {
            return Err(BridgeError::invalid("duration", "must be between 0 and 72 hours"));
        }
        Ok(Self { duration_hours })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Helicopter {
    pub username: Option<String>,
}

impl FromArgs for Helicopter {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            username: args.opt_string("username")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnZombies {
    pub location: Location,
    pub count: u32,
}

impl FromArgs for SpawnZombies {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            location: Location::from_args(args)?,
            count: args.count("count", 1, 100)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnHorde {
    pub location: Location,
    pub count: u32,
}

impl FromArgs for SpawnHorde {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            location: Location::from_args(args)?,
            count: args.count("count", 20, 500)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClearZombies {
    /// `None` clears every loaded zombie
    pub area: Option<(Position, f64)>,
}

impl FromArgs for ClearZombies {
    fn from_args(args: &Args) -> Result<Self> {
        if !args.contains("x") && !args.contains("y") {
            return Ok(Self { area: None });
        }
        let center = Position::from_args(args)?;
        let radius = args.opt_number("radius")?.unwrap_or(50.0);
        if radius <= 0.0 {
            return Err(BridgeError::invalid("radius", "must be positive"));
        }
        Ok(Self {
            area: Some((center, radius)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnVehicle {
    pub vehicle: String,
    pub location: Location,
}

impl FromArgs for SpawnVehicle {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            vehicle: args.string("vehicle")?,
            location: Location::from_args(args)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleTarget {
    pub vehicle_id: i64,
}

impl FromArgs for VehicleTarget {
    fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            vehicle_id: args.integer("vehicleId")?,
        })
    }
}

/// Every command the runtime understands
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    // Bridge
    Ping,
    GetStatus,
    GetCapabilities,
    GetStats,
    ResetStats,
    SetDebugMode(Toggle),
    GetDebugLog(DebugLogQuery),
    ClearDebugLog,

    // Server
    GetServerInfo,
    SaveWorld,
    ServerMessage(Message),
    ReloadOptions,
    GetSandboxOption(OptionName),
    SetSandboxOption(SetOption),
    GetMods,

    // Players
    GetPlayers,
    GetPlayer(PlayerTarget),
    TeleportPlayer(Teleport),
    TeleportToPlayer(TeleportToPlayer),
    KickPlayer(Kick),
    SetAccessLevel(SetAccessLevel),
    HealPlayer(PlayerTarget),
    KillPlayer(PlayerTarget),
    SetGodMode(PlayerToggle),
    SetInvisible(PlayerToggle),
    SetNoClip(PlayerToggle),
    SendPlayerMessage(PlayerMessage),
    AddXp(AddXp),
    SetPerkLevel(SetPerkLevel),
    AddTrait(PlayerTrait),
    RemoveTrait(PlayerTrait),

    // Inventory
    GiveItem(ItemGrant),
    RemoveItem(ItemGrant),
    GetInventory(PlayerTarget),
    ClearInventory(PlayerTarget),

    // World
    GetGameTime,
    SetGameTime(SetGameTime),
    GetWeather,
    SetWeather(WeatherOverride),
    StopWeather,
    TriggerStorm(Storm),
    TriggerHelicopter(Helicopter),
    LightningStrike(Position),

    // Zombies
    GetZombieCount,
    SpawnZombies(SpawnZombies),
    SpawnHorde(SpawnHorde),
    ClearZombies(ClearZombies),

    // Vehicles
    SpawnVehicle(SpawnVehicle),
    RemoveVehicle(VehicleTarget),
    RepairVehicle(VehicleTarget),
}

impl CommandKind {
    /// All action names, in catalog order
    pub const ACTIONS: &'static [&'static str] = &[
        "ping",
        "getStatus",
        "getCapabilities",
        "getStats",
        "resetStats",
        "setDebugMode",
        "getDebugLog",
        "clearDebugLog",
        "getServerInfo",
        "saveWorld",
        "serverMessage",
        "reloadOptions",
        "getSandboxOption",
        "setSandboxOption",
        "getMods",
        "getPlayers",
        "getPlayer",
        "teleportPlayer",
        "teleportToPlayer",
        "kickPlayer",
        "setAccessLevel",
        "healPlayer",
        "killPlayer",
        "setGodMode",
        "setInvisible",
        "setNoClip",
        "sendPlayerMessage",
        "addXp",
        "setPerkLevel",
        "addTrait",
        "removeTrait",
        "giveItem",
        "removeItem",
        "getInventory",
        "clearInventory",
        "getGameTime",
        "setGameTime",
        "getWeather",
        "setWeather",
        "stopWeather",
        "triggerStorm",
        "triggerHelicopter",
        "lightningStrike",
        "getZombieCount",
        "spawnZombies",
        "spawnHorde",
        "clearZombies",
        "spawnVehicle",
        "removeVehicle",
        "repairVehicle",
    ];

    /// Decode an action name plus arguments into a typed command
    pub fn decode(action: &str, args: &Args) -> Result<Self> {
        let kind = match action {
            "ping" => Self::Ping,
            "getStatus" => Self::GetStatus,
            "getCapabilities" => Self::GetCapabilities,
            "getStats" => Self::GetStats,
            "resetStats" => Self::ResetStats,
            "setDebugMode" => Self::SetDebugMode(FromArgs::from_args(args)?),
            "getDebugLog" => Self::GetDebugLog(FromArgs::from_args(args)?),
            "clearDebugLog" => Self::ClearDebugLog,

            "getServerInfo" => Self::GetServerInfo,
            "saveWorld" => Self::SaveWorld,
            "serverMessage" => Self::ServerMessage(FromArgs::from_args(args)?),
            "reloadOptions" => Self::ReloadOptions,
            "getSandboxOption" => Self::GetSandboxOption(FromArgs::from_args(args)?),
            "setSandboxOption" => Self::SetSandboxOption(FromArgs::from_args(args)?),
            "getMods" => Self::GetMods,

            "getPlayers" => Self::GetPlayers,
            "getPlayer" => Self::GetPlayer(FromArgs::from_args(args)?),
            "teleportPlayer" => Self::TeleportPlayer(FromArgs::from_args(args)?),
            "teleportToPlayer" => Self::TeleportToPlayer(FromArgs::from_args(args)?),
            "kickPlayer" => Self::KickPlayer(FromArgs::from_args(args)?),
            "setAccessLevel" => Self::SetAccessLevel(FromArgs::from_args(args)?),
            "healPlayer" => Self::HealPlayer(FromArgs::from_args(args)?),
            "killPlayer" => Self::KillPlayer(FromArgs::from_args(args)?),
            "setGodMode" => Self::SetGodMode(FromArgs::from_args(args)?),
            "setInvisible" => Self::SetInvisible(FromArgs::from_args(args)?),
            "setNoClip" => Self::SetNoClip(FromArgs::from_args(args)?),
            "sendPlayerMessage" => Self::SendPlayerMessage(FromArgs::from_args(args)?),
            "addXp" => Self::AddXp(FromArgs::from_args(args)?),
            "setPerkLevel" => Self::SetPerkLevel(FromArgs::from_args(args)?),
            "addTrait" => Self::AddTrait(FromArgs::from_args(args)?),
            "removeTrait" => Self::RemoveTrait(FromArgs::from_args(args)?),

            "giveItem" => Self::GiveItem(FromArgs::from_args(args)?),
            "removeItem" => Self::RemoveItem(FromArgs::from_args(args)?),
            "getInventory" => Self::GetInventory(FromArgs::from_args(args)?),
            "clearInventory" => Self::ClearInventory(FromArgs::from_args(args)?),

            "getGameTime" => Self::GetGameTime,
            "setGameTime" => Self::SetGameTime(FromArgs::from_args(args)?),
            "getWeather" => Self::GetWeather,
            "setWeather" => Self::SetWeather(FromArgs::from_args(args)?),
            "stopWeather" => Self::StopWeather,
            "triggerStorm" => Self::TriggerStorm(FromArgs::from_args(args)?),
            "triggerHelicopter" => Self::TriggerHelicopter(FromArgs::from_args(args)?),
            "lightningStrike" => Self::LightningStrike(FromArgs::from_args(args)?),

            "getZombieCount" => Self::GetZombieCount,
            "spawnZombies" => Self::SpawnZombies(FromArgs::from_args(args)?),
            "spawnHorde" => Self::SpawnHorde(FromArgs::from_args(args)?),
            "clearZombies" => Self::ClearZombies(FromArgs::from_args(args)?),

            "spawnVehicle" => Self::SpawnVehicle(FromArgs::from_args(args)?),
            "removeVehicle" => Self::RemoveVehicle(FromArgs::from_args(args)?),
            "repairVehicle" => Self::RepairVehicle(FromArgs::from_args(args)?),

            other => return Err(BridgeError::UnknownAction(other.to_string())),
        };
        Ok(kind)
    }

    /// Wire name of this command
    pub fn action(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::GetStatus => "getStatus",
            Self::GetCapabilities => "getCapabilities",
            Self::GetStats => "getStats",
            Self::ResetStats => "resetStats",
            Self::SetDebugMode(_) => "setDebugMode",
            Self::GetDebugLog(_) => "getDebugLog",
            Self::ClearDebugLog => "clearDebugLog",
            Self::GetServerInfo => "getServerInfo",
            Self::SaveWorld => "saveWorld",
            Self::ServerMessage(_) => "serverMessage",
            Self::ReloadOptions => "reloadOptions",
            Self::GetSandboxOption(_) => "getSandboxOption",
            Self::SetSandboxOption(_) => "setSandboxOption",
            Self::GetMods => "getMods",
            Self::GetPlayers => "getPlayers",
            Self::GetPlayer(_) => "getPlayer",
            Self::TeleportPlayer(_) => "teleportPlayer",
            Self::TeleportToPlayer(_) => "teleportToPlayer",
            Self::KickPlayer(_) => "kickPlayer",
            Self::SetAccessLevel(_) => "setAccessLevel",
            Self::HealPlayer(_) => "healPlayer",
            Self::KillPlayer(_) => "killPlayer",
            Self::SetGodMode(_) => "setGodMode",
            Self::SetInvisible(_) => "setInvisible",
            Self::SetNoClip(_) => "setNoClip",
            Self::SendPlayerMessage(_) => "sendPlayerMessage",
            Self::AddXp(_) => "addXp",
            Self::SetPerkLevel(_) => "setPerkLevel",
            Self::AddTrait(_) => "addTrait",
            Self::RemoveTrait(_) => "removeTrait",
            Self::GiveItem(_) => "giveItem",
            Self::RemoveItem(_) => "removeItem",
            Self::GetInventory(_) => "getInventory",
            Self::ClearInventory(_) => "clearInventory",
            Self::GetGameTime => "getGameTime",
            Self::SetGameTime(_) => "setGameTime",
            Self::GetWeather => "getWeather",
            Self::SetWeather(_) => "setWeather",
            Self::StopWeather => "stopWeather",
            Self::TriggerStorm(_) => "triggerStorm",
            Self::TriggerHelicopter(_) => "triggerHelicopter",
            Self::LightningStrike(_) => "lightningStrike",
            Self::GetZombieCount => "getZombieCount",
            Self::SpawnZombies(_) => "spawnZombies",
            Self::SpawnHorde(_) => "spawnHorde",
            Self::ClearZombies(_) => "clearZombies",
            Self::SpawnVehicle(_) => "spawnVehicle",
            Self::RemoveVehicle(_) => "removeVehicle",
            Self::RepairVehicle(_) => "repairVehicle",
        }
    }
}
