//! Session flags — the oath flag and the ejection record.
//!
//! Persistence is best-effort: a failed write is logged and otherwise ignored,
//! so nothing the stage does ever waits on or fails because of storage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Local-storage key set when the visitor swears the oath.
pub const OATH_KEY: &str = "oath_ok";
/// Session-storage key holding the last [`EjectionRecord`].
pub const KICK_KEY: &str = "kicked_by_scrolls";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageArea {
    /// Survives the browser session.
    Local,
    /// Cleared when the tab closes.
    Session,
}

/// Key/value persistence the host provides.
pub trait SessionStore {
    fn set_item(&mut self, area: StorageArea, key: &str, value: &str) -> Result<(), StorageError>;
    fn get_item(&self, area: StorageArea, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EjectionRecord {
    /// Wall-clock epoch milliseconds.
    pub t: u64,
    pub reason: String,
}

pub struct SessionFlags {
    store: Box<dyn SessionStore>,
}

impl SessionFlags {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Persist the oath. Returns false if the write failed.
    pub fn accept_oath(&mut self) -> bool {
        match self.store.set_item(StorageArea::Local, OATH_KEY, "1") {
            Ok(()) => true,
            Err(e) => {
                log::warn!("session: could not record oath: {}", e);
                false
            }
        }
    }

    pub fn oath_accepted(&self) -> bool {
        self.store.get_item(StorageArea::Local, OATH_KEY).as_deref() == Some("1")
    }

    /// Persist why the visitor was ejected. Returns false if the write failed.
    pub fn record_ejection(&mut self, reason: &str, epoch_ms: u64) -> bool {
        let record = EjectionRecord {
            t: epoch_ms,
            reason: reason.to_owned(),
        };
        let written = serde_json::to_string(&record)
            .map_err(|source| StorageError::Encode {
                key: KICK_KEY.to_owned(),
                source,
            })
            .and_then(|json| self.store.set_item(StorageArea::Session, KICK_KEY, &json));
        match written {
            Ok(()) => true,
            Err(e) => {
                log::warn!("session: could not record ejection: {}", e);
                false
            }
        }
    }

    pub fn last_ejection(&self) -> Option<EjectionRecord> {
        let raw = self.store.get_item(StorageArea::Session, KICK_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("session: ignoring malformed `{}`: {}", KICK_KEY, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for SessionFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFlags").finish_non_exhaustive()
    }
}

/// In-memory store for headless hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<(StorageArea, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn set_item(&mut self, area: StorageArea, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert((area, key.to_owned()), value.to_owned());
        Ok(())
    }

    fn get_item(&self, area: StorageArea, key: &str) -> Option<String> {
        self.items.get(&(area, key.to_owned())).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl SessionStore for FailingStore {
        fn set_item(&mut self, _: StorageArea, key: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Rejected {
                key: key.to_owned(),
                message: "QuotaExceededError".into(),
            })
        }

        fn get_item(&self, _: StorageArea, _: &str) -> Option<String> {
            None
        }
    }

    #[test]
    fn oath_lands_in_local_storage() {
        let mut flags = SessionFlags::new(Box::new(MemoryStore::new()));
        assert!(!flags.oath_accepted());
        assert!(flags.accept_oath());
        assert!(flags.oath_accepted());
    }

    #[test]
    fn ejection_record_round_trip() {
        let mut flags = SessionFlags::new(Box::new(MemoryStore::new()));
        assert!(flags.record_ejection("forbidden scrolls", 1_700_000_000_000));
        let record = flags.last_ejection().unwrap();
        assert_eq!(record.t, 1_700_000_000_000);
        assert_eq!(record.reason, "forbidden scrolls");
    }

    #[test]
    fn ejection_record_json_shape() {
        let json = serde_json::to_string(&EjectionRecord { t: 5, reason: "x".into() }).unwrap();
        assert_eq!(json, r#"{"t":5,"reason":"x"}"#);
    }

    #[test]
    fn failures_are_swallowed() {
        let mut flags = SessionFlags::new(Box::new(FailingStore));
        assert!(!flags.accept_oath());
        assert!(!flags.record_ejection("x", 1));
        assert!(!flags.oath_accepted());
        assert_eq!(flags.last_ejection(), None);
    }

    #[test]
    fn areas_are_separate() {
        let mut store = MemoryStore::new();
        store.set_item(StorageArea::Session, OATH_KEY, "1").unwrap();
        let flags = SessionFlags::new(Box::new(store));
        assert!(!flags.oath_accepted());
    }
}
