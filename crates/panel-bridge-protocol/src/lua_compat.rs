//! Lua compatibility tests
//!
//! These run the JSON module shipped with the server-side mod, checking that
//! the codec accepts what Lua writes and that Lua can read what the codec writes.

#[cfg(test)]
mod tests {
    use crate::codec::{
        decode_commands, decode_results, decode_status, encode_commands, encode_results,
        EMPTY_BATCH,
    };
    use mlua::{Lua, Result as LuaResult};
    use panel_bridge_core::{Args, Command, CommandResult, Data};

    /// Load json.lua into a Lua state and register it for require()
    fn create_lua_with_json() -> LuaResult<Lua> {
        let lua = Lua::new();

        let json_lua = include_str!("../lua/json.lua");
        let json_module: mlua::Value = lua.load(json_lua).eval()?;

        let package: mlua::Table = lua.globals().get("package")?;
        let loaded: mlua::Table = package.get("loaded")?;
        loaded.set("JSON", json_module)?;

        Ok(lua)
    }

    // ========== Lua → Rust ==========

    #[test]
    fn test_lua_result_with_empty_data() -> LuaResult<()> {
        let lua = create_lua_with_json()?;

        let json: String = lua
            .load(
                r#"
            local JSON = require("JSON")
            return JSON.encode({
                results = {
                    { id = "c1", success = true, data = {}, timestamp = 1700000000000 }
                }
            })
        "#,
            )
            .eval()?;

        println!("Lua produced: {}", json);

        let results = decode_results(json.as_bytes()).expect("Rust should decode Lua results");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "c1");
        assert!(results[0].success);
        assert_eq!(results[0].data, Some(Data::new()));
        assert_eq!(results[0].timestamp, 1_700_000_000_000);

        Ok(())
    }

    #[test]
    fn test_lua_cleared_commands_table() -> LuaResult<()> {
        let lua = create_lua_with_json()?;

        // An emptied Lua list has no way to encode as []
        let json: String = lua
            .load(
                r#"
            local JSON = require("JSON")
            return JSON.encode({ commands = {} })
        "#,
            )
            .eval()?;

        assert_eq!(json, r#"{"commands":{}}"#);
        assert!(decode_commands(json.as_bytes()).unwrap().is_empty());

        Ok(())
    }

    #[test]
    fn test_lua_status_with_no_players() -> LuaResult<()> {
        let lua = create_lua_with_json()?;

        let json: String = lua
            .load(
                r#"
            local JSON = require("JSON")
            return JSON.encode({
                alive = true,
                version = "0.3.0",
                timestamp = 1700000000000,
                serverName = "servertest",
                playerCount = 0,
                players = {},
                path = "/srv/Lua/panelbridge/servertest",
                debugMode = false,
                stats = { processed = 4, succeeded = 3, failed = 1 }
            })
        "#,
            )
            .eval()?;

        println!("Lua produced: {}", json);

        let status = decode_status(json.as_bytes())
            .expect("Rust should decode Lua status")
            .expect("status should not be empty");
        assert!(status.alive);
        assert!(status.players.is_empty());
        assert_eq!(status.server_name, "servertest");
        assert_eq!(status.stats.failed, 1);

        Ok(())
    }

    #[test]
    fn test_lua_numeric_command_id() -> LuaResult<()> {
        let lua = create_lua_with_json()?;

        let json: String = lua
            .load(
                r#"
            local JSON = require("JSON")
            return JSON.encode({
                commands = { { id = 17, action = "getPlayers", args = {} } }
            })
        "#,
            )
            .eval()?;

        let commands = decode_commands(json.as_bytes()).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].id, "17");
        assert!(commands[0].args.is_empty());

        Ok(())
    }

    // ========== Rust → Lua ==========

    #[test]
    fn test_rust_commands_to_lua() -> LuaResult<()> {
        let lua = create_lua_with_json()?;

        let batch = vec![
            Command::new("c1", "ping", Args::new()),
            Command::new(
                "c2",
                "teleportPlayer",
                Args::new()
                    .with("username", "Bob")
                    .with("x", 10846)
                    .with("y", 9412.5),
            ),
        ];
        let json = String::from_utf8(encode_commands(&batch).unwrap()).unwrap();
        lua.globals().set("input", json)?;

        let decoded: mlua::Table = lua
            .load(
                r#"
            local JSON = require("JSON")
            return JSON.decode(input)
        "#,
            )
            .eval()?;

        let commands: mlua::Table = decoded.get("commands")?;
        assert_eq!(commands.raw_len(), 2);

        let second: mlua::Table = commands.get(2)?;
        assert_eq!(second.get::<String>("id")?, "c2");
        assert_eq!(second.get::<String>("action")?, "teleportPlayer");

        let args: mlua::Table = second.get("args")?;
        assert_eq!(args.get::<String>("username")?, "Bob");
        assert_eq!(args.get::<f64>("x")?, 10846.0);
        assert_eq!(args.get::<f64>("y")?, 9412.5);

        Ok(())
    }

    #[test]
    fn test_empty_batch_is_empty_lua_list() -> LuaResult<()> {
        let lua = create_lua_with_json()?;

        lua.globals()
            .set("input", std::str::from_utf8(EMPTY_BATCH).unwrap())?;

        let count: i64 = lua
            .load(
                r#"
            local JSON = require("JSON")
            local batch = JSON.decode(input)
            return #batch.commands
        "#,
            )
            .eval()?;

        assert_eq!(count, 0);

        Ok(())
    }

    // ========== Round trip ==========

    #[test]
    fn test_results_survive_lua_rewrite() -> LuaResult<()> {
        let lua = create_lua_with_json()?;

        // The runtime seeds its log from the existing file and writes it back
        let mut data = Data::new();
        data.insert("message".into(), "pong".into());
        let results = vec![
            CommandResult::success("c1", data, 1_700_000_000_000),
            CommandResult::failure("c2", "Unknown command: fly", 1_700_000_000_500),
        ];
        let json = String::from_utf8(encode_results(&results).unwrap()).unwrap();
        lua.globals().set("input", json)?;

        let rewritten: String = lua
            .load(
                r#"
            local JSON = require("JSON")
            return JSON.encode(JSON.decode(input))
        "#,
            )
            .eval()?;

        println!("Lua rewrote: {}", rewritten);

        let decoded = decode_results(rewritten.as_bytes()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].field("message"), Some(&serde_json::Value::from("pong")));
        assert!(!decoded[1].success);
        assert_eq!(decoded[1].error.as_deref(), Some("Unknown command: fly"));
        assert_eq!(decoded[1].timestamp, 1_700_000_000_500);

        Ok(())
    }
}
