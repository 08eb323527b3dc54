// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![warn(missing_docs)]                // All public items must be documented
#![warn(dead_code)]                   // Unused code is flagged
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![warn(unused_imports)]              // Unused imports are flagged
#![warn(unused_variables)]            // Unused variables are flagged
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # SCP Provider
//!
//! A declarative provider for the Samsung Cloud Platform (SCP) REST API.
//!
//! ## Overview
//!
//! Resources are declared in a YAML manifest and converged by per-type
//! handlers that create, read, update and delete them through the SCP
//! OpenAPI gateway:
//!
//! - Certificate Manager certificates (imported and self-signed)
//! - Config Inspection diagnosis objects and their reports
//! - Event Streams (Kafka) clusters
//! - Transit gateways and transit gateway peerings
//! - Kubernetes Engine kubeconfigs
//!
//! ## Architecture
//!
//! 1. **Manifest**: `scp.yaml`, with provider settings and blocks
//! 2. **Handlers**: typed configuration plus CRUD calls per resource type
//! 3. **Poller**: waits for asynchronous operations to reach a target state
//! 4. **Engine**: decides, per block, which handler verb to call from the
//!    recorded state
//!
//! ## Modules
//!
//! - [`config`]: Manifest parsing, validation and hashing
//! - [`api`]: SCP OpenAPI client and product-line facades
//! - [`poller`]: State polling for asynchronous operations
//! - [`resources`]: Resource and datasource handlers
//! - [`registry`]: Type name to handler table
//! - [`engine`]: Apply, refresh and destroy runs
//! - [`state`]: Local state storage
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! provider:
//!   project_id: PROJECT-xxxxxxxx
//!
//! resources:
//!   - type: scp_transit_gateway
//!     name: hub
//!     config:
//!       name: corehub
//!       service_zone_id: ZONE-xxxxxxxx
//!       bandwidth_gbps: 1
//!
//! data:
//!   - type: scp_certificates
//!     name: all
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod poller;
pub mod registry;
pub mod resources;
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use api::ScpClient;
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigHasher, ConfigParser, ConfigValidator, Manifest, ProviderConfig};
pub use engine::{Engine, RunReport};
pub use error::{Result, ScpError};
pub use registry::Registry;
pub use resources::{ProviderContext, ResourceData};
pub use state::{LocalStateStore, ProviderState, StateStore};
