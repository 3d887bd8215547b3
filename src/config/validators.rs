//! Field validators and coercions.
//!
//! Each validator is a pure `fn(&Value) -> Validation`. Malformed input of any
//! JSON type is reported as `Invalid`, never as a panic.

use serde_json::Value;

use crate::config::field::Validation;
use crate::config::value::{json_type_name, ConfigValue};

/// Locale codes the panel ships translations for.
pub const KNOWN_LOCALES: &[&str] = &[
    "ar", "bg", "bs", "cs", "da", "de", "el", "en", "es", "et", "fa", "fi", "fr", "he", "hr",
    "hu", "hy", "id", "it", "ja", "lt", "lv", "mn", "ne", "nl", "no", "pl", "pt", "ro", "ru",
    "sl", "sv", "th", "tr", "uk", "vi", "zh",
];

/// Language value that selects a user-provided locale file.
pub const CUSTOM_LOCALE: &str = "custom";

pub const SERVER_NAME_MAX_CHARS: usize = 18;
pub const REJECTION_MESSAGE_MAX_CHARS: usize = 512;
pub const MAX_HWID_MATCHES: i64 = 6;

fn expect_string(raw: &Value) -> Result<&str, String> {
    raw.as_str()
        .ok_or_else(|| format!("expected string, got {}", json_type_name(raw)))
}

fn bounded_string(raw: &Value, min: usize, max: Option<usize>) -> Validation {
    let s = match expect_string(raw) {
        Ok(s) => s,
        Err(reason) => return Validation::Invalid(reason),
    };
    let len = s.chars().count();
    if len < min {
        return Validation::Invalid(format!("must contain at least {} character(s)", min));
    }
    if let Some(max) = max {
        if len > max {
            return Validation::Invalid(format!("must contain at most {} character(s)", max));
        }
    }
    Validation::Valid(ConfigValue::String(s.to_string()))
}

/// Short identifying string, 1 to 18 characters.
pub fn server_name(raw: &Value) -> Validation {
    bounded_string(raw, 1, Some(SERVER_NAME_MAX_CHARS))
}

/// Known locale code or the `custom` escape value.
pub fn language(raw: &Value) -> Validation {
    match bounded_string(raw, 2, None) {
        Validation::Valid(ConfigValue::String(code)) => {
            if code == CUSTOM_LOCALE || KNOWN_LOCALES.contains(&code.as_str()) {
                Validation::Valid(ConfigValue::String(code))
            } else {
                Validation::Invalid(format!("Invalid language code `{}`.", code))
            }
        }
        other => other,
    }
}

/// Either empty or a syntactically valid absolute URL.
pub fn url_or_empty(raw: &Value) -> Validation {
    let s = match expect_string(raw) {
        Ok(s) => s,
        Err(reason) => return Validation::Invalid(reason),
    };
    if s.is_empty() || url::Url::parse(s).is_ok() {
        Validation::Valid(ConfigValue::String(s.to_string()))
    } else {
        Validation::Invalid("API Endpoint must be a valid URL or empty.".to_string())
    }
}

/// Any string, passed through untouched.
pub fn any_string(raw: &Value) -> Validation {
    bounded_string(raw, 0, None)
}

pub fn rejection_message(raw: &Value) -> Validation {
    bounded_string(raw, 0, Some(REJECTION_MESSAGE_MAX_CHARS))
}

pub fn boolean(raw: &Value) -> Validation {
    match raw {
        Value::Bool(b) => Validation::Valid(ConfigValue::Bool(*b)),
        other => Validation::Invalid(format!("expected boolean, got {}", json_type_name(other))),
    }
}

/// Integer within `0..=6`.
pub fn hwid_matches(raw: &Value) -> Validation {
    match raw.as_i64() {
        Some(n) if (0..=MAX_HWID_MATCHES).contains(&n) => Validation::Valid(ConfigValue::Integer(n)),
        Some(n) => Validation::Invalid(format!(
            "must be between 0 and {}, got {}",
            MAX_HWID_MATCHES, n
        )),
        None => Validation::Invalid(format!("expected integer, got {}", json_type_name(raw))),
    }
}

// Coercions

/// Strip surrounding whitespace from a string.
pub fn trim_string(raw: &Value) -> Option<Value> {
    raw.as_str().map(|s| Value::String(s.trim().to_string()))
}

/// Accept `"true"`/`"false"`/`"yes"`/`"no"` strings and `0`/`1` numbers.
pub fn loose_boolean(raw: &Value) -> Option<Value> {
    match raw {
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        _ => None,
    }
}

/// Parse numeric strings and accept integral floats.
pub fn numeric_string(raw: &Value) -> Option<Value> {
    match raw {
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| Value::from(f as i64)),
        _ => None,
    }
}
