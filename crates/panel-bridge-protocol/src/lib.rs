//! Exchange protocol for the panel file bridge
//!
//! This crate provides:
//! - Codec for the shared JSON files (tolerant of Lua-encoded tables)
//! - Shared directory layout
//! - Defensive reads and temp-file-then-rename writes, sync and async

pub mod codec;
pub mod exchange;
mod lua_compat;

pub use codec::{
    DecodedBatch, decode_command_batch, decode_commands, decode_results, decode_startup,
    decode_status, decode_value, encode_commands, encode_results, encode_startup, encode_status, EMPTY_BATCH,
};
pub use exchange::{ExchangeDir, read_file, read_file_async, write_atomic, write_atomic_async};
