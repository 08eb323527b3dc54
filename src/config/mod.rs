//! Configuration module for the SCP provider.
//!
//! This module handles all configuration-related functionality:
//! - Parsing the `scp.yaml` manifest with `.env` and `SCP_*` overrides
//! - Validation of provider settings and blocks
//! - Computing block hashes for change detection

mod hash;
mod parser;
mod spec;
mod validator;

pub use hash::ConfigHasher;
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
pub use spec::{BlockConfig, DEFAULT_ENDPOINT, Manifest, PollSettings, ProviderConfig};
pub use validator::{ConfigValidator, ValidationResult};
