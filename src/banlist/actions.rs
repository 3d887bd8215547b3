//! Ban and unban actions.
//!
//! # Responsibilities
//! - Record and revoke bans
//! - Decide whether a joining player is banned, per the banlist settings
//! - Relay every action to the external admin system
//!
//! # Design Decisions
//! - The configuration store is injected; settings are read per call from
//!   the current snapshot
//! - An action succeeds or fails on local criteria only; the notification is
//!   spawned and its handle is returned for callers that care

use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::banlist::records::{now_secs, BanRecord, BanRecords, Revocation};
use crate::config::ConfigStore;
use crate::external_api::{
    ActionType, Expiration, ExternalApiCredentials, ExternalApiGateway, NotificationEvent,
    NotifyOutcome,
};
use crate::observability::metrics;

/// Message used when the configured rejection message is blank.
pub const DEFAULT_REJECTION_MESSAGE: &str = "You have been banned from this server.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("at least one player identifier is required")]
    NoIdentifiers,

    #[error("ban `{0}` not found")]
    NotFound(String),

    #[error("ban `{0}` was already revoked")]
    AlreadyRevoked(String),
}

#[derive(Debug, Clone, Default)]
pub struct BanRequest {
    pub identifiers: Vec<String>,
    pub hwids: Vec<String>,
    pub player_name: Option<String>,
    pub reason: String,
    pub author: String,
    pub expiration: Option<Expiration>,
    /// Duration as typed by the admin, relayed verbatim.
    pub duration_input: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UnbanRequest {
    pub action_id: String,
    pub reason: String,
    pub author: String,
}

/// Completed action plus the handle of its notification, if one was sent.
#[derive(Debug)]
pub struct ActionReceipt {
    pub record: BanRecord,
    pub notification: Option<JoinHandle<NotifyOutcome>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinDecision {
    Allowed,
    Rejected { action_id: String, message: String },
}

/// `B` followed by 8 uppercase hex characters.
fn new_action_id() -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string();
    format!("B{}", raw[..8].to_ascii_uppercase())
}

/// Trim, drop blanks, and dedup while keeping order.
fn normalize(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

pub struct AdminActions {
    config: Arc<ConfigStore>,
    records: BanRecords,
    gateway: ExternalApiGateway,
}

impl AdminActions {
    pub fn new(config: Arc<ConfigStore>, gateway: ExternalApiGateway) -> Self {
        Self {
            config,
            records: BanRecords::new(),
            gateway,
        }
    }

    pub fn records(&self) -> &BanRecords {
        &self.records
    }


    fn credentials(&self) -> Option<ExternalApiCredentials> {
        ExternalApiCredentials::from_config(&self.config.load().config.general)
    }

    /// Record a ban and relay it.
    pub fn ban(&self, request: BanRequest) -> Result<ActionReceipt, ActionError> {
        let identifiers = normalize(&request.identifiers);
        if identifiers.is_empty() {
            return Err(ActionError::NoIdentifiers);
        }

        let mut record = BanRecord {
            action_id: new_action_id(),
            identifiers,
            hwids: normalize(&request.hwids),
            player_name: request.player_name.filter(|n| !n.trim().is_empty()),
            reason: request.reason,
            author: request.author,
            banned_at: now_secs(),
            expiration: request.expiration.unwrap_or(Expiration::Permanent),
            revocation: None,
        };
        // Claim the id atomically; regenerate on collision
        while let Err(taken) = self.records.try_insert(record.clone()) {
            record = taken;
            record.action_id = new_action_id();
        }
        metrics::record_admin_action(ActionType::Ban.as_str());
        tracing::info!(
            action_id = %record.action_id,
            author = %record.author,
            identifiers = record.identifiers.len(),
            "Player banned"
        );

        let event = NotificationEvent {
            action: ActionType::Ban,
            action_id: Some(record.action_id.clone()),
            identifiers: record.identifiers.clone(),
            player_name: record.player_name.clone(),
            expiration: record.expiration,
            duration_input: request.duration_input,
            banned_at: Some(record.banned_at),
            reason: record.reason.clone(),
            author: record.author.clone(),
        };
        let notification = self.gateway.dispatch(self.credentials(), event);

        Ok(ActionReceipt { record, notification })
    }

    /// Revoke a ban and relay it.
    pub fn unban(&self, request: UnbanRequest) -> Result<ActionReceipt, ActionError> {
        let revocation = Revocation {
            author: request.author.clone(),
            reason: request.reason.clone(),
            revoked_at: now_secs(),
        };
        let record = self
            .records
            .update(&request.action_id, |record| {
                if record.revocation.is_some() {
                    return Err(ActionError::AlreadyRevoked(record.action_id.clone()));
                }
                record.revocation = Some(revocation);
                Ok(record.clone())
            })
            .ok_or_else(|| ActionError::NotFound(request.action_id.clone()))??;
        metrics::record_admin_action(ActionType::Unban.as_str());
        tracing::info!(action_id = %record.action_id, author = %request.author, "Ban revoked");

        let event = NotificationEvent {
            action: ActionType::Unban,
            action_id: Some(record.action_id.clone()),
            identifiers: record.identifiers.clone(),
            player_name: record.player_name.clone(),
            expiration: Expiration::Permanent,
            duration_input: None,
            banned_at: Some(record.banned_at),
            reason: request.reason,
            author: request.author,
        };
        let notification = self.gateway.dispatch(self.credentials(), event);

        Ok(ActionReceipt { record, notification })
    }

    /// Decide whether a joining player is allowed in.
    pub fn check_join(&self, identifiers: &[String], hwids: &[String]) -> JoinDecision {
        let state = self.config.load();
        let banlist = &state.config.banlist;
        if !banlist.enabled {
            return JoinDecision::Allowed;
        }

        let identifiers = normalize(identifiers);
        let hwids = normalize(hwids);
        match self
            .records
            .find_active_match(&identifiers, &hwids, banlist.required_hwid_matches, now_secs())
        {
            None => JoinDecision::Allowed,
            Some(record) => {
                let message = match banlist.rejection_message.trim() {
                    "" => DEFAULT_REJECTION_MESSAGE,
                    custom => custom,
                };
                tracing::debug!(action_id = %record.action_id, "Join rejected by ban");
                JoinDecision::Rejected {
                    message: format!("{}\nBan ID: {}", message, record.action_id),
                    action_id: record.action_id,
                }
            }
        }
    }
}

impl std::fmt::Debug for AdminActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminActions")
            .field("bans", &self.records.count())
            .field("gateway", &self.gateway)
            .finish()
    }
}
