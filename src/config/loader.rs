//! Raw configuration document loading from disk.

use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// Error type for raw document loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("configuration document root must be an object, got {0}")]
    NotAnObject(&'static str),
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Parse a raw document. TOML when `toml` is set, JSON otherwise.
pub fn parse_document(content: &str, toml: bool) -> Result<Value, ConfigError> {
    let document: Value = if toml {
        toml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    if !document.is_object() {
        return Err(ConfigError::NotAnObject(crate::config::value::json_type_name(&document)));
    }
    Ok(document)
}

/// Load the raw document at `path`.
///
/// A missing file yields an empty document so a fresh install resolves to
/// defaults. The document is not validated here.
pub fn load_document(path: &Path) -> Result<Value, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "Configuration file not found, using defaults");
            return Ok(Value::Object(Default::default()));
        }
        Err(e) => return Err(e.into()),
    };
    parse_document(&content, is_toml(path))
}
