//! Remote state vocabulary and wait budgets per resource type.

use std::time::Duration;

pub use crate::poller::DELETED;

/// States of a database product that is still being worked on.
pub const DATABASE_PROCESSING_STATES: &[&str] = &[
    "CREATING",
    "EDITING",
    "STARTING",
    "STOPPING",
    "RESTARTING",
    "TERMINATING",
    "UPGRADING",
    "RESTORING",
    "BACKING_UP",
    "INSTALLING",
    "DELETING",
];

/// Running database product.
pub const RUNNING: &str = "RUNNING";
/// Active network product.
pub const ACTIVE: &str = "ACTIVE";
/// Network product being created.
pub const CREATING: &str = "CREATING";
/// Network product being deleted.
pub const DELETING: &str = "DELETING";
/// Peering waiting for the approver.
pub const REQUESTING: &str = "REQUESTING";

/// Create target of database products.
pub const RUNNING_TARGET: &[&str] = &[RUNNING];
/// Create target of network products.
pub const ACTIVE_TARGET: &[&str] = &[ACTIVE];
/// Delete target of most products.
pub const DELETED_TARGET: &[&str] = &[DELETED];
/// Delete target of certificates.
pub const CERTIFICATE_DELETED_TARGET: &[&str] = &[DELETED, "FREE"];

/// Pending while creating a network product.
pub const CREATING_PENDING: &[&str] = &[CREATING];
/// Pending while deleting a network product.
pub const DELETING_PENDING: &[&str] = &[DELETING];
/// Certificates have no pending state.
pub const NO_PENDING: &[&str] = &[];

/// Delay before a freshly requested Kafka cluster shows up in the list.
pub const KAFKA_SETTLE: Duration = Duration::from_secs(50);
/// Delay after config inspection create and terminate.
pub const CONFIG_INSPECTION_SETTLE: Duration = Duration::from_secs(10);
