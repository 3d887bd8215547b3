//! Ban record storage.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::external_api::Expiration;

/// Seconds since the Unix epoch.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Revocation of a ban.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revocation {
    pub author: String,
    pub reason: String,
    pub revoked_at: u64,
}

/// A stored ban.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanRecord {
    pub action_id: String,
    pub identifiers: Vec<String>,
    pub hwids: Vec<String>,
    pub player_name: Option<String>,
    pub reason: String,
    pub author: String,
    pub banned_at: u64,
    pub expiration: Expiration,
    pub revocation: Option<Revocation>,
}

impl BanRecord {
    /// Not revoked and not expired at `now`.
    pub fn is_active(&self, now: u64) -> bool {
        self.revocation.is_none() && !self.expiration.has_passed(now)
    }

    /// Whether this ban applies to a player presenting `identifiers` and
    /// `hwids`. Hwid matching is skipped when `required_hwid_matches` is zero.
    pub fn matches(&self, identifiers: &[String], hwids: &[String], required_hwid_matches: u8) -> bool {
        if self.identifiers.iter().any(|id| identifiers.contains(id)) {
            return true;
        }
        if required_hwid_matches == 0 {
            return false;
        }
        let own: HashSet<&str> = self.hwids.iter().map(String::as_str).collect();
        let shared = hwids
            .iter()
            .map(String::as_str)
            .collect::<HashSet<_>>()
            .intersection(&own)
            .count();
        shared >= usize::from(required_hwid_matches)
    }
}

/// Thread-safe ban storage keyed by action id.
#[derive(Clone, Default)]
pub struct BanRecords {
    inner: Arc<DashMap<String, BanRecord>>,
}

impl BanRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` unless its action id is already taken. The record is
    /// handed back on conflict.
    pub fn try_insert(&self, record: BanRecord) -> Result<(), BanRecord> {
        match self.inner.entry(record.action_id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
            Entry::Occupied(_) => Err(record),
        }
    }

    pub fn get(&self, action_id: &str) -> Option<BanRecord> {
        self.inner.get(action_id).map(|r| r.value().clone())
    }

    /// Apply `f` to the record in place. Returns `None` if it does not exist.
    pub fn update<T>(&self, action_id: &str, f: impl FnOnce(&mut BanRecord) -> T) -> Option<T> {
        self.inner.get_mut(action_id).map(|mut r| f(r.value_mut()))
    }

    pub fn contains(&self, action_id: &str) -> bool {
        self.inner.contains_key(action_id)
    }

    /// First active record matching the player, if any.
    pub fn find_active_match(
        &self,
        identifiers: &[String],
        hwids: &[String],
        required_hwid_matches: u8,
        now: u64,
    ) -> Option<BanRecord> {
        self.inner
            .iter()
            .find(|r| r.is_active(now) && r.matches(identifiers, hwids, required_hwid_matches))
            .map(|r| r.value().clone())
    }

    pub fn count(&self) -> usize {
        self.inner.len()
    }
}
