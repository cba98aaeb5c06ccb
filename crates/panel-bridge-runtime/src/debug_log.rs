//! In-memory debug log
//!
//! A ring buffer the host can read back through `getDebugLog`. Every entry is
//! also forwarded to `tracing`. Debug-level entries are dropped unless debug
//! mode is on.

use panel_bridge_core::{DebugLogEntry, LogLevel, now_millis};
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

pub const DEFAULT_DEBUG_LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone)]
pub struct DebugLog {
    entries: VecDeque<DebugLogEntry>,
    capacity: usize,
    debug_mode: bool,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new(DEFAULT_DEBUG_LOG_CAPACITY, false)
    }
}

impl DebugLog {
    pub fn new(capacity: usize, debug_mode: bool) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            debug_mode,
        }
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.debug_mode = enabled;
    }

    pub fn record(&mut self, level: LogLevel, message: impl Into<String>, context: Value) {
        let message = message.into();
        match level {
            LogLevel::Debug => debug!(%context, "{}", message),
            LogLevel::Info => info!(%context, "{}", message),
            LogLevel::Warn => warn!(%context, "{}", message),
            LogLevel::Error => error!(%context, "{}", message),
        }

        if level == LogLevel::Debug && !self.debug_mode {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(DebugLogEntry {
            timestamp: now_millis(),
            level,
            message,
            context,
        });
    }

    pub fn debug(&mut self, message: impl Into<String>, context: Value) {
        self.record(LogLevel::Debug, message, context);
    }

    pub fn info(&mut self, message: impl Into<String>, context: Value) {
        self.record(LogLevel::Info, message, context);
    }

    pub fn warn(&mut self, message: impl Into<String>, context: Value) {
        self.record(LogLevel::Warn, message, context);
    }

    pub fn error(&mut self, message: impl Into<String>, context: Value) {
        self.record(LogLevel::Error, message, context);
    }

    /// Most recent entries at or above `min_level`, oldest first
    pub fn entries(&self, limit: Option<usize>, min_level: Option<LogLevel>) -> Vec<DebugLogEntry> {
        let matching: Vec<&DebugLogEntry> = self
            .entries
            .iter()
            .filter(|e| min_level.is_none_or(|min| e.level >= min))
            .collect();
        let skip = limit.map_or(0, |n| matching.len().saturating_sub(n));
        matching.into_iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_debug_entries_need_debug_mode() {
        let mut log = DebugLog::new(10, false);
        log.debug("hidden", Value::Null);
        log.info("shown", Value::Null);
        assert_eq!(log.len(), 1);

        log.set_debug_mode(true);
        log.debug("now shown", json!({"id": "c1"}));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_ring_drops_oldest() {
        let mut log = DebugLog::new(3, false);
        for i in 0..5 {
            log.info(format!("entry {}", i), Value::Null);
        }
        let messages: Vec<_> = log.entries(None, None).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["entry 2", "entry 3", "entry 4"]);
    }

    #[test]
    fn test_filter_and_limit() {
        let mut log = DebugLog::default();
        log.info("a", Value::Null);
        log.warn("b", Value::Null);
        log.error("c", Value::Null);
        log.warn("d", Value::Null);

        let warnings = log.entries(None, Some(LogLevel::Warn));
        assert_eq!(warnings.len(), 3);

        let last = log.entries(Some(2), None);
        assert_eq!(last[0].message, "c");
        assert_eq!(last[1].message, "d");

        assert_eq!(log.clear(), 4);
        assert!(log.is_empty());
    }
}
