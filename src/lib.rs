//! Administrative configuration store.
//!
//! Declares typed configuration fields once, resolves persisted documents
//! against them with per-field repair policies, and relays ban/unban actions
//! to an external admin system.

pub mod banlist;
pub mod config;
pub mod external_api;
pub mod lifecycle;
pub mod observability;

pub use banlist::AdminActions;
pub use config::{AdminConfig, ConfigStore, SchemaRegistry};
pub use external_api::ExternalApiGateway;
pub use lifecycle::Shutdown;
