//! Value types for the tabkeeper tab manager.
//!
//! This crate contains the serde-serializable shapes shared between the
//! manager core and the shell that hosts it: tab identities, per-tab events,
//! outward shell notifications and the small configuration enums.
//!
//! Types in this crate are plain data. Behavior lives in `tabkeeper`.

pub mod event;
pub mod types;

pub use event::*;
pub use types::*;
