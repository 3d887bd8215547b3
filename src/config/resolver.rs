//! Resolution of a raw document against the schema registry.
//!
//! # Responsibilities
//! - Look up every declared field in the raw document
//! - Validate present values, repair invalid ones per field policy
//! - Produce a total snapshot plus the list of deviations
//!
//! # Design Decisions
//! - Resolution is a pure function; reporting is a separate step
//! - Absent fields resolve to their default without an issue
//! - Rejected fields still resolve to their default, the pass is degraded

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::config::field::{FieldSpec, FixOutcome, Validation};
use crate::config::registry::SchemaRegistry;
use crate::config::snapshot::{ConfigSnapshot, Provenance, ResolvedField};
use crate::observability::metrics;

/// What the resolver did with an invalid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueAction {
    Fixed,
    Defaulted,
    Rejected,
}

impl IssueAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueAction::Fixed => "fixed",
            IssueAction::Defaulted => "defaulted",
            IssueAction::Rejected => "rejected",
        }
    }
}

impl fmt::Display for IssueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field that deviated from the provided input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionIssue {
    pub namespace: String,
    pub key: String,
    pub reason: String,
    pub action: IssueAction,
}

/// Output of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub snapshot: ConfigSnapshot,
    pub issues: Vec<ResolutionIssue>,
}

impl Resolution {
    /// True when at least one field was rejected.
    pub fn is_degraded(&self) -> bool {
        self.issues.iter().any(|i| i.action == IssueAction::Rejected)
    }

    /// Log every issue and count it. Rejections log at error level.
    pub fn report(&self) {
        for issue in &self.issues {
            match issue.action {
                IssueAction::Rejected => tracing::error!(
                    namespace = %issue.namespace,
                    key = %issue.key,
                    reason = %issue.reason,
                    "Configuration value rejected, using default"
                ),
                action => tracing::warn!(
                    namespace = %issue.namespace,
                    key = %issue.key,
                    reason = %issue.reason,
                    action = %action,
                    "Invalid configuration value repaired"
                ),
            }
            metrics::record_resolution_issue(issue.action.as_str());
        }
    }
}

/// Look up `document[namespace][key]`. A missing or non-object namespace is
/// treated like a missing key.
fn lookup<'a>(document: &'a Value, namespace: &str, key: &str) -> Option<&'a Value> {
    document.get(namespace)?.as_object()?.get(key)
}

fn resolve_field(
    namespace: &str,
    key: &str,
    spec: &FieldSpec,
    raw: Option<&Value>,
    issues: &mut Vec<ResolutionIssue>,
) -> ResolvedField {
    let raw = match raw {
        Some(raw) => raw,
        None => {
            return ResolvedField {
                value: spec.default.clone(),
                provenance: Provenance::Defaulted,
            }
        }
    };

    let reason = match spec.validate(raw) {
        Validation::Valid(value) => {
            return ResolvedField {
                value,
                provenance: Provenance::AsProvided,
            }
        }
        Validation::Invalid(reason) => reason,
    };

    let (value, provenance, action) = match spec.fix(raw) {
        FixOutcome::Fixed(value) => (value, Provenance::Fixed, IssueAction::Fixed),
        FixOutcome::Defaulted(value) => (value, Provenance::Defaulted, IssueAction::Defaulted),
        FixOutcome::Unfixable => (spec.default.clone(), Provenance::Defaulted, IssueAction::Rejected),
    };
    issues.push(ResolutionIssue {
        namespace: namespace.to_string(),
        key: key.to_string(),
        reason,
        action,
    });
    ResolvedField { value, provenance }
}

/// Resolve a raw document into a snapshot covering every registered field.
///
/// Never fails: any input, including a non-object root, yields a total
/// snapshot.
pub fn resolve(document: &Value, registry: &SchemaRegistry) -> Resolution {
    let mut issues = Vec::new();
    let mut namespaces = IndexMap::new();

    for namespace in registry.all_namespaces() {
        let mut fields = IndexMap::new();
        for (key, spec) in registry.get(namespace).into_iter().flatten() {
            let raw = lookup(document, namespace, key);
            let field = resolve_field(namespace, key, spec, raw, &mut issues);
            fields.insert(key.to_string(), field);
        }
        namespaces.insert(namespace.to_string(), fields);
    }

    Resolution {
        snapshot: ConfigSnapshot::from_namespaces(namespaces),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::field::FixerPolicy;
    use crate::config::schema::builtin_registry;
    use crate::config::validators;
    use crate::config::value::ConfigValue;
    use serde_json::json;
    use tracing_test::traced_test;

    fn strict_registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .register(
                "general",
                "serverName",
                FieldSpec::new("Server Name", "change-me", validators::server_name, FixerPolicy::Reject),
            )
            .unwrap()
            .build()
    }

    fn provenance(resolution: &Resolution, ns: &str, key: &str) -> Provenance {
        resolution.snapshot.get(ns, key).unwrap().provenance
    }

    #[test]
    #[traced_test]
    fn test_report_logs_rejection_above_repair() {
        let document = json!({"general": {"serverName": ""}});
        resolve(&document, &strict_registry()).report();
        resolve(&document, &builtin_registry().unwrap()).report();

        assert!(logs_contain("Configuration value rejected"));
        assert!(logs_contain("Invalid configuration value repaired"));
        logs_assert(|lines: &[&str]| {
            let line = |message: &str| {
                lines
                    .iter()
                    .find(|l| l.contains(message))
                    .map(|l| l.to_string())
                    .ok_or_else(|| format!("no line containing `{}`", message))
            };
            let rejected = line("Configuration value rejected")?;
            let repaired = line("Invalid configuration value repaired")?;
            if !rejected.contains("ERROR") {
                return Err(format!("rejection not logged at ERROR: {}", rejected));
            }
            if !repaired.contains("WARN") || repaired.contains("ERROR") {
                return Err(format!("repair not logged at WARN: {}", repaired));
            }
            Ok(())
        });
    }

    #[test]
    fn test_empty_document_defaults_everything() {
        let registry = builtin_registry().unwrap();
        let resolution = resolve(&json!({}), &registry);
        assert!(resolution.issues.is_empty());
        assert_eq!(resolution.snapshot.len(), registry.field_count());
        assert_eq!(resolution.snapshot.string("general", "serverName").unwrap(), "change-me");
        for (_, _, field) in resolution.snapshot.iter() {
            assert_eq!(field.provenance, Provenance::Defaulted);
        }
    }

    #[test]
    fn test_non_object_root_is_total() {
        let registry = builtin_registry().unwrap();
        for doc in [json!(null), json!([1, 2]), json!("x"), json!({"general": 5})] {
            let resolution = resolve(&doc, &registry);
            assert_eq!(resolution.snapshot.len(), registry.field_count());
            assert!(resolution.issues.is_empty());
        }
    }

    #[test]
    fn test_empty_server_name_defaulted() {
        let registry = builtin_registry().unwrap();
        let resolution = resolve(&json!({"general": {"serverName": ""}}), &registry);
        assert_eq!(resolution.snapshot.string("general", "serverName").unwrap(), "change-me");
        assert_eq!(resolution.issues.len(), 1);
        assert_eq!(resolution.issues[0].action, IssueAction::Defaulted);
        assert_eq!(resolution.issues[0].key, "serverName");
    }

    #[test]
    fn test_bad_endpoint_defaulted() {
        let registry = builtin_registry().unwrap();
        let resolution = resolve(&json!({"general": {"apiEndpoint": "not-a-url"}}), &registry);
        assert_eq!(resolution.snapshot.string("general", "apiEndpoint").unwrap(), "");
        assert_eq!(resolution.issues.len(), 1);
        assert_eq!(resolution.issues[0].action, IssueAction::Defaulted);
    }

    #[test]
    fn test_unknown_language_defaulted() {
        let registry = builtin_registry().unwrap();
        let resolution = resolve(&json!({"general": {"language": "xx"}}), &registry);
        assert_eq!(resolution.snapshot.string("general", "language").unwrap(), "en");
        assert!(resolution.issues[0].reason.contains("xx"));
    }

    #[test]
    fn test_coerced_fields_are_fixed() {
        let registry = builtin_registry().unwrap();
        let resolution = resolve(
            &json!({"banlist": {"enabled": "false", "requiredHwidMatches": "3", "rejectionMessage": 9}}),
            &registry,
        );
        assert!(!resolution.snapshot.boolean("banlist", "enabled").unwrap());
        assert_eq!(resolution.snapshot.integer("banlist", "requiredHwidMatches").unwrap(), 3);
        assert_eq!(provenance(&resolution, "banlist", "enabled"), Provenance::Fixed);
        // No coercion from a number to a message
        assert_eq!(provenance(&resolution, "banlist", "rejectionMessage"), Provenance::Defaulted);
        let actions: Vec<_> = resolution.issues.iter().map(|i| i.action).collect();
        assert_eq!(actions, [IssueAction::Fixed, IssueAction::Defaulted, IssueAction::Fixed]);
    }

    #[test]
    fn test_valid_input_is_idempotent() {
        let registry = builtin_registry().unwrap();
        let doc = json!({
            "general": {"serverName": "srv", "language": "de", "apiEndpoint": "https://a.b", "apiKey": "k"},
            "banlist": {"enabled": false, "rejectionMessage": "bye", "requiredHwidMatches": 2}
        });
        let first = resolve(&doc, &registry);
        let second = resolve(&doc, &registry);
        assert_eq!(first, second);
        assert!(first.issues.is_empty());
        assert!(first.snapshot.iter().all(|(_, _, f)| f.provenance == Provenance::AsProvided));
        // Exporting and resolving again keeps the same values
        let again = resolve(&first.snapshot.to_document(), &registry);
        assert_eq!(again.snapshot, first.snapshot);
    }

    #[test]
    fn test_extra_keys_ignored() {
        let registry = builtin_registry().unwrap();
        let resolution = resolve(&json!({"general": {"bogus": 1}, "other": {"x": 2}}), &registry);
        assert!(resolution.snapshot.get("general", "bogus").is_none());
        assert!(resolution.snapshot.namespace("other").is_none());
        assert_eq!(resolution.snapshot.len(), registry.field_count());
    }

    #[test]
    fn test_reject_substitutes_default_and_degrades() {
        let registry = strict_registry();
        let resolution = resolve(&json!({"general": {"serverName": "x".repeat(40)}}), &registry);
        assert_eq!(
            resolution.snapshot.get("general", "serverName").unwrap().value,
            ConfigValue::from("change-me")
        );
        assert_eq!(resolution.issues[0].action, IssueAction::Rejected);
        assert!(resolution.is_degraded());
    }

    #[test]
    fn test_reject_accepts_valid_value() {
        let registry = strict_registry();
        let resolution = resolve(&json!({"general": {"serverName": "ok"}}), &registry);
        assert!(!resolution.is_degraded());
        assert_eq!(provenance(&resolution, "general", "serverName"), Provenance::AsProvided);
    }
}
