//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! raw document (JSON/TOML, possibly partial or malformed)
//!     → loader.rs (parse, no validation)
//!     → resolver.rs (per field: validator → pass, or fixer policy)
//!     → ConfigSnapshot + ResolutionIssue list
//!     → AdminConfig (typed read model)
//!     → store.rs (ArcSwap, shared with all subsystems)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new document
//!     → store.rs resolves and swaps the whole state
//! ```
//!
//! # Design Decisions
//! - Every field is declared once in schema.rs; nothing else lists fields
//! - Validators judge, fixer policies repair; the resolver has no per-field code
//! - Resolution never fails: every field has a valid default
//! - A snapshot is immutable; a reload replaces it wholesale

pub mod field;
pub mod loader;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod validators;
pub mod value;
pub mod watcher;

pub use field::{FieldSpec, FixOutcome, FixerPolicy, Validation};
pub use loader::ConfigError;
pub use registry::{SchemaError, SchemaRegistry};
pub use resolver::{resolve, IssueAction, Resolution, ResolutionIssue};
pub use schema::{builtin_registry, AdminConfig, BanlistConfig, GeneralConfig};
pub use snapshot::{ConfigSnapshot, Provenance, SnapshotError};
pub use store::{ConfigStore, ResolvedState};
pub use value::ConfigValue;
