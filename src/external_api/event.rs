//! Administrative action events and their wire payload.

use serde::Serialize;
use std::fmt;

/// Kind of administrative action being relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Ban,
    Unban,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Ban => "ban",
            ActionType::Unban => "unban",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When an action stops applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiration {
    Permanent,
    /// Seconds since the Unix epoch.
    At(u64),
}

impl Expiration {
    pub fn as_epoch_secs(&self) -> Option<u64> {
        match self {
            Expiration::Permanent => None,
            Expiration::At(ts) => Some(*ts),
        }
    }

    pub fn has_passed(&self, now: u64) -> bool {
        match self {
            Expiration::Permanent => false,
            Expiration::At(ts) => *ts <= now,
        }
    }
}

/// One administrative action to relay. Owned by a single notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub action: ActionType,
    pub action_id: Option<String>,
    pub identifiers: Vec<String>,
    /// `None` when the player name is unknown.
    pub player_name: Option<String>,
    pub expiration: Expiration,
    /// Duration as typed by the admin, e.g. `"2 days"`.
    pub duration_input: Option<String>,
    pub banned_at: Option<u64>,
    pub reason: String,
    pub author: String,
}

/// JSON body posted to the external admin system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload<'a> {
    #[serde(rename = "type")]
    pub action: ActionType,
    pub action_id: Option<&'a str>,
    pub identifiers: &'a [String],
    pub player_name: &'a str,
    pub reason: &'a str,
    pub author: &'a str,
    pub expiration: Option<u64>,
    pub duration: Option<&'a str>,
    pub banned_at: Option<u64>,
}

impl NotificationEvent {
    pub fn payload(&self) -> NotificationPayload<'_> {
        NotificationPayload {
            action: self.action,
            action_id: self.action_id.as_deref(),
            identifiers: &self.identifiers,
            player_name: self.player_name.as_deref().unwrap_or(""),
            reason: &self.reason,
            author: &self.author,
            expiration: self.expiration.as_epoch_secs(),
            duration: self.duration_input.as_deref(),
            banned_at: self.banned_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let event = NotificationEvent {
            action: ActionType::Ban,
            action_id: Some("BABCD1234".into()),
            identifiers: vec!["license:abc".into(), "discord:42".into()],
            player_name: None,
            expiration: Expiration::Permanent,
            duration_input: None,
            banned_at: Some(1_700_000_000),
            reason: "cheating".into(),
            author: "admin".into(),
        };
        let body = serde_json::to_value(event.payload()).unwrap();
        assert_eq!(
            body,
            json!({
                "type": "ban",
                "actionId": "BABCD1234",
                "identifiers": ["license:abc", "discord:42"],
                "playerName": "",
                "reason": "cheating",
                "author": "admin",
                "expiration": null,
                "duration": null,
                "bannedAt": 1_700_000_000u64,
            })
        );
    }

    #[test]
    fn test_expiration() {
        assert!(!Expiration::Permanent.has_passed(u64::MAX));
        assert!(Expiration::At(10).has_passed(10));
        assert!(!Expiration::At(10).has_passed(9));
        assert_eq!(Expiration::At(10).as_epoch_secs(), Some(10));
    }
}
