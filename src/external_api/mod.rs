//! Relay of administrative actions to a third-party admin system.
//!
//! # Data Flow
//! ```text
//! ban/unban action (banlist)
//!     → NotificationEvent (event.rs)
//!     → credentials from the current AdminConfig
//!     → gateway.rs (spawned POST, 5s timeout)
//!     → outcome logged, never returned to the action
//! ```

pub mod event;
pub mod gateway;

pub use event::{ActionType, Expiration, NotificationEvent};
pub use gateway::{ExternalApiCredentials, ExternalApiGateway, NotifyOutcome};
