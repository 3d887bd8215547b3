//! Configuration schema definitions.
//!
//! Declares every built-in field once and defines the typed read model the
//! rest of the application consumes. Field keys keep the camelCase spelling
//! used by the persisted document.

use serde::Serialize;

use crate::config::field::{FieldSpec, FixerPolicy};
use crate::config::registry::{SchemaError, SchemaRegistry};
use crate::config::snapshot::{ConfigSnapshot, SnapshotError};
use crate::config::validators;

pub const GENERAL: &str = "general";
pub const BANLIST: &str = "banlist";

/// Build the registry holding every built-in field.
pub fn builtin_registry() -> Result<SchemaRegistry, SchemaError> {
    let registry = SchemaRegistry::builder()
        .register(
            GENERAL,
            "serverName",
            FieldSpec::new("Server Name", "change-me", validators::server_name, FixerPolicy::UseDefault),
        )?
        .register(
            GENERAL,
            "language",
            FieldSpec::new("Language", "en", validators::language, FixerPolicy::UseDefault),
        )?
        .register(
            GENERAL,
            "apiEndpoint",
            FieldSpec::new("API Endpoint", "", validators::url_or_empty, FixerPolicy::UseDefault),
        )?
        .register(
            GENERAL,
            "apiKey",
            FieldSpec::new("API Key", "", validators::any_string, FixerPolicy::UseDefault),
        )?
        .register(
            BANLIST,
            "enabled",
            FieldSpec::new(
                "Ban Checking Enabled",
                true,
                validators::boolean,
                FixerPolicy::Coerce(validators::loose_boolean),
            ),
        )?
        .register(
            BANLIST,
            "rejectionMessage",
            FieldSpec::new(
                "Ban Rejection Message",
                "",
                validators::rejection_message,
                FixerPolicy::Coerce(validators::trim_string),
            ),
        )?
        .register(
            BANLIST,
            "requiredHwidMatches",
            FieldSpec::new(
                "Required HWID Matches",
                1_i64,
                validators::hwid_matches,
                FixerPolicy::Coerce(validators::numeric_string),
            ),
        )?
        .build();
    Ok(registry)
}

/// Root typed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminConfig {
    pub general: GeneralConfig,
    pub banlist: BanlistConfig,
}

/// General server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralConfig {
    pub server_name: String,

    /// Locale code or `custom`.
    pub language: String,

    /// Base URL of the external admin system. Empty disables notifications.
    pub api_endpoint: String,

    /// Key sent with every notification. Empty disables notifications.
    pub api_key: String,
}

/// Ban checking settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanlistConfig {
    pub enabled: bool,

    /// Message shown to rejected players. Empty selects the built-in message.
    pub rejection_message: String,

    /// Shared hardware ids needed to match a ban. Zero disables hwid matching.
    pub required_hwid_matches: u8,
}

impl AdminConfig {
    /// Extract the typed model from a snapshot resolved against
    /// [`builtin_registry`].
    pub fn from_snapshot(snapshot: &ConfigSnapshot) -> Result<Self, SnapshotError> {
        let required_hwid_matches = snapshot.integer(BANLIST, "requiredHwidMatches")?;
        Ok(Self {
            general: GeneralConfig {
                server_name: snapshot.string(GENERAL, "serverName")?.to_string(),
                language: snapshot.string(GENERAL, "language")?.to_string(),
                api_endpoint: snapshot.string(GENERAL, "apiEndpoint")?.to_string(),
                api_key: snapshot.string(GENERAL, "apiKey")?.to_string(),
            },
            banlist: BanlistConfig {
                enabled: snapshot.boolean(BANLIST, "enabled")?,
                rejection_message: snapshot.string(BANLIST, "rejectionMessage")?.to_string(),
                required_hwid_matches: u8::try_from(required_hwid_matches).map_err(|_| {
                    SnapshotError::OutOfRange {
                        namespace: BANLIST.to_string(),
                        key: "requiredHwidMatches".to_string(),
                        value: required_hwid_matches,
                    }
                })?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolver::resolve;
    use serde_json::json;

    #[test]
    fn test_builtin_registry_builds() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.field_count(), 7);
        assert_eq!(registry.all_namespaces().collect::<Vec<_>>(), [GENERAL, BANLIST]);
    }

    #[test]
    fn test_every_default_is_valid() {
        let registry = builtin_registry().unwrap();
        for (ns, key, spec) in registry.iter() {
            assert!(spec.default_is_valid(), "{}.{} default is invalid", ns, key);
        }
    }

    #[test]
    fn test_typed_model_from_defaults() {
        let registry = builtin_registry().unwrap();
        let resolution = resolve(&json!({}), &registry);
        let config = AdminConfig::from_snapshot(&resolution.snapshot).unwrap();
        assert_eq!(config.general.server_name, "change-me");
        assert_eq!(config.general.language, "en");
        assert_eq!(config.general.api_endpoint, "");
        assert!(config.banlist.enabled);
        assert_eq!(config.banlist.required_hwid_matches, 1);
    }
}
