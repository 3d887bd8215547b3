//! Field declarations and repair policies.
//!
//! # Responsibilities
//! - Describe one configuration field (label, default, validator, policy)
//! - Keep judgment (validator) apart from repair (fixer policy)
//!
//! # Design Decisions
//! - Validators and coercions are plain `fn` pointers, testable on their own
//! - The repair policy is an exhaustive enum, never a sentinel value

use serde_json::Value;
use std::fmt;

use crate::config::value::ConfigValue;

/// Outcome of running a validator on a raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid(ConfigValue),
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }
}

/// Pure judgment over an arbitrary raw value. Must never panic.
pub type Validator = fn(&Value) -> Validation;

/// Shape coercion attempted before falling back to the default.
///
/// Returns `None` when the raw value has no sensible coercion.
pub type Coercion = fn(&Value) -> Option<Value>;

/// How an invalid raw value is repaired.
#[derive(Clone, Copy)]
pub enum FixerPolicy {
    /// Replace the value with the field default.
    UseDefault,
    /// Try the coercion, revalidate, otherwise behave as `UseDefault`.
    Coerce(Coercion),
    /// Never repair; the field is reported as rejected.
    Reject,
}

impl FixerPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            FixerPolicy::UseDefault => "use-default",
            FixerPolicy::Coerce(_) => "coerce",
            FixerPolicy::Reject => "reject",
        }
    }
}

impl fmt::Debug for FixerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of applying a field's fixer policy to an invalid value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Fixed(ConfigValue),
    Defaulted(ConfigValue),
    Unfixable,
}

/// Declarative description of a single configuration field.
#[derive(Clone)]
pub struct FieldSpec {
    /// Human-readable label.
    pub name: &'static str,
    /// Value used when the field is absent or repaired by default.
    pub default: ConfigValue,
    pub validator: Validator,
    pub fixer: FixerPolicy,
}

impl FieldSpec {
    pub fn new(
        name: &'static str,
        default: impl Into<ConfigValue>,
        validator: Validator,
        fixer: FixerPolicy,
    ) -> Self {
        Self {
            name,
            default: default.into(),
            validator,
            fixer,
        }
    }

    pub fn validate(&self, raw: &Value) -> Validation {
        (self.validator)(raw)
    }

    /// Whether the declared default passes the field's own validator.
    pub fn default_is_valid(&self) -> bool {
        match self.validate(&self.default.to_json()) {
            Validation::Valid(v) => v == self.default,
            Validation::Invalid(_) => false,
        }
    }

    /// Apply the fixer policy to a raw value that failed validation.
    pub fn fix(&self, raw: &Value) -> FixOutcome {
        match self.fixer {
            FixerPolicy::UseDefault => FixOutcome::Defaulted(self.default.clone()),
            FixerPolicy::Coerce(coerce) => match coerce(raw).map(|c| self.validate(&c)) {
                Some(Validation::Valid(value)) => FixOutcome::Fixed(value),
                _ => FixOutcome::Defaulted(self.default.clone()),
            },
            FixerPolicy::Reject => FixOutcome::Unfixable,
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("fixer", &self.fixer)
            .finish()
    }
}
