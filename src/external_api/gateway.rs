//! Best-effort notifications to an external admin system.
//!
//! # Responsibilities
//! - Derive credentials from the resolved configuration
//! - POST one action event with a bounded timeout
//! - Swallow and log every failure
//!
//! # Design Decisions
//! - Blank endpoint or key disables notifications without a call
//! - One attempt, no retry, no queue
//! - `dispatch` spawns the attempt; callers never join it

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::GeneralConfig;
use crate::external_api::event::NotificationEvent;
use crate::observability::metrics;

/// Path appended to the configured endpoint.
pub const ACTION_PATH: &str = "/api/adm-cms/txadmin-action";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Admin-Key";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Trimmed, non-empty endpoint and key.
#[derive(Clone, PartialEq, Eq)]
pub struct ExternalApiCredentials {
    endpoint: String,
    key: String,
}

impl ExternalApiCredentials {
    /// Returns `None` when either value is blank after trimming.
    pub fn new(endpoint: &str, key: &str) -> Option<Self> {
        let endpoint = endpoint.trim();
        let key = key.trim();
        if endpoint.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self {
            endpoint: endpoint.to_string(),
            key: key.to_string(),
        })
    }

    pub fn from_config(general: &GeneralConfig) -> Option<Self> {
        Self::new(&general.api_endpoint, &general.api_key)
    }

    pub fn action_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), ACTION_PATH)
    }
}

impl std::fmt::Debug for ExternalApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalApiCredentials")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Result of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Notifications are disabled; no request was made.
    Skipped,
    Delivered,
    /// The attempt failed. The error was already logged.
    Failed(String),
}

impl NotifyOutcome {
    fn label(&self) -> &'static str {
        match self {
            NotifyOutcome::Skipped => "skipped",
            NotifyOutcome::Delivered => "delivered",
            NotifyOutcome::Failed(_) => "failed",
        }
    }
}

/// HTTP client for the external admin system.
#[derive(Clone)]
pub struct ExternalApiGateway {
    client: reqwest::Client,
    timeout: Duration,
}

impl ExternalApiGateway {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Send `event` once. Never returns an error; failures are logged and
    /// reported through the outcome.
    pub async fn notify(
        &self,
        credentials: Option<&ExternalApiCredentials>,
        event: &NotificationEvent,
    ) -> NotifyOutcome {
        let outcome = match credentials {
            None => NotifyOutcome::Skipped,
            Some(credentials) => match self.send(credentials, event).await {
                Ok(()) => {
                    tracing::debug!(action = %event.action, "External API notified");
                    NotifyOutcome::Delivered
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(
                        action = %event.action,
                        error = %message,
                        "Failed to notify external API ({})",
                        event.action
                    );
                    NotifyOutcome::Failed(message)
                }
            },
        };
        metrics::record_notification(event.action.as_str(), outcome.label());
        outcome
    }

    async fn send(
        &self,
        credentials: &ExternalApiCredentials,
        event: &NotificationEvent,
    ) -> Result<(), reqwest::Error> {
        self.client
            .post(credentials.action_url())
            .header(API_KEY_HEADER, &credentials.key)
            .json(&event.payload())
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Fire-and-forget variant of [`notify`](Self::notify).
    ///
    /// Returns `None` without spawning when notifications are disabled or no
    /// Tokio runtime is available on the calling thread.
    pub fn dispatch(
        &self,
        credentials: Option<ExternalApiCredentials>,
        event: NotificationEvent,
    ) -> Option<JoinHandle<NotifyOutcome>> {
        let Some(credentials) = credentials else {
            metrics::record_notification(event.action.as_str(), NotifyOutcome::Skipped.label());
            return None;
        };
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(
                    action = %event.action,
                    error = %e,
                    "Failed to notify external API ({}): no async runtime",
                    event.action
                );
                metrics::record_notification(event.action.as_str(), "failed");
                return None;
            }
        };
        let gateway = self.clone();
        Some(runtime.spawn(async move {
            gateway.notify(Some(&credentials), &event).await
        }))
    }
}

impl Default for ExternalApiGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExternalApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalApiGateway")
            .field("timeout_ms", &self.timeout.as_millis())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external_api::event::{ActionType, Expiration};

    #[test]
    fn test_blank_credentials_disable() {
        assert!(ExternalApiCredentials::new("", "secret").is_none());
        assert!(ExternalApiCredentials::new("https://cms.example.com", "   ").is_none());
        assert!(ExternalApiCredentials::new("  ", "  ").is_none());
    }

    #[test]
    fn test_action_url_is_trimmed() {
        let creds = ExternalApiCredentials::new(" https://cms.example.com/ ", " k ").unwrap();
        assert_eq!(creds.action_url(), "https://cms.example.com/api/adm-cms/txadmin-action");
        assert_eq!(creds.key, "k");
    }

    #[test]
    fn test_dispatch_without_runtime_is_dropped() {
        let creds = ExternalApiCredentials::new("http://127.0.0.1:9", "k");
        let event = NotificationEvent {
            action: ActionType::Unban,
            action_id: None,
            identifiers: vec!["license:abc".into()],
            player_name: None,
            expiration: Expiration::Permanent,
            duration_input: None,
            banned_at: None,
            reason: String::new(),
            author: "admin".into(),
        };
        assert!(ExternalApiGateway::new().dispatch(creds, event).is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let creds = ExternalApiCredentials::new("https://cms.example.com", "hunter2").unwrap();
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
