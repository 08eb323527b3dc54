//! State management module.
//!
//! This module provides persistent state storage for tracking managed
//! resources: remote identifiers, last observed attributes and the
//! configuration hash each was applied with.

mod local;
mod lock;
mod store;
mod types;

pub use local::{LocalStateStore, STATE_DIR};
pub use lock::{LockInfo, generate_holder_id};
pub use store::StateStore;
pub use types::{ProviderState, ResourceRecord, STATE_VERSION};
