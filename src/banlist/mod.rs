//! Ban registry and administrative actions.
//!
//! # Data Flow
//! ```text
//! ban/unban request
//!     → actions.rs (validate, record locally)
//!     → records.rs (DashMap keyed by action id)
//!     → external_api (spawned notification, outcome only logged)
//!
//! player join
//!     → actions.rs check_join (banlist settings from current snapshot)
//!     → records.rs (active record matching identifiers or hwids)
//! ```

pub mod actions;
pub mod records;

pub use actions::{
    ActionError, ActionReceipt, AdminActions, BanRequest, JoinDecision, UnbanRequest,
};
pub use records::{BanRecord, BanRecords, Revocation};
