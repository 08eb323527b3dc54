//! Manifest validation.
//!
//! Checks provider settings and every block before anything talks to the
//! API: addresses must be unique per kind and every type must be served by
//! the registry. Per-type attribute checks happen later, when a handler
//! decodes its configuration.

use crate::error::{ConfigError, Result, ScpError};
use crate::registry::Registry;
use std::collections::HashSet;
use tracing::debug;
use validator::Validate;

use super::spec::{BlockConfig, Manifest, ProviderConfig};

/// Validator for manifests.
#[derive(Debug)]
pub struct ConfigValidator<'a> {
    registry: &'a Registry,
}

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

#[derive(Clone, Copy)]
enum BlockKind {
    Resource,
    Data,
}

impl BlockKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Data => "data",
        }
    }

    const fn section(self) -> &'static str {
        match self {
            Self::Resource => "resources",
            Self::Data => "data",
        }
    }
}

impl<'a> ConfigValidator<'a> {
    /// Creates a validator checking types against `registry`.
    #[must_use]
    pub const fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Validates a manifest, collecting every problem.
    ///
    /// # Errors
    ///
    /// Returns the first problem found as a [`ConfigError`]. Duplicate
    /// addresses and unknown types keep their dedicated variants.
    pub fn validate(&self, manifest: &Manifest) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();
        let mut first_error: Option<ConfigError> = None;

        Self::validate_provider(&manifest.provider, &mut result);

        for (kind, blocks) in [
            (BlockKind::Resource, &manifest.resources),
            (BlockKind::Data, &manifest.data),
        ] {
            if let Err(e) = self.validate_blocks(kind, blocks, &mut result) {
                first_error.get_or_insert(e);
            }
        }

        if manifest.resources.is_empty() && manifest.data.is_empty() {
            result
                .warnings
                .push(String::from("No resources or datasources defined in manifest"));
        }

        if let Some(error) = first_error {
            return Err(ScpError::Config(error));
        }

        if let Some(error) = result.errors.first() {
            return Err(ScpError::Config(ConfigError::validation(
                error.message.clone(),
                error.field.clone(),
            )));
        }

        debug!("Manifest validation passed");
        Ok(result)
    }

    fn validate_provider(provider: &ProviderConfig, result: &mut ValidationResult) {
        if let Err(errors) = provider.validate() {
            for (field, messages) in errors.field_errors() {
                for message in messages {
                    result.errors.push(ValidationError {
                        field: format!("provider.{field}"),
                        message: message
                            .message
                            .as_ref()
                            .map_or_else(|| format!("invalid value ({})", message.code), ToString::to_string),
                    });
                }
            }
            // Nested poll settings surface as a single entry.
            if errors.errors().contains_key("poll") {
                result.errors.push(ValidationError {
                    field: String::from("provider.poll"),
                    message: String::from("Invalid poll settings"),
                });
            }
        }

        if provider.access_key.is_none() && provider.auth_token.is_none() {
            result.warnings.push(String::from(
                "provider: neither access_key nor auth_token is set, requests will be unauthenticated",
            ));
        }
    }

    fn validate_blocks(
        &self,
        kind: BlockKind,
        blocks: &[BlockConfig],
        result: &mut ValidationResult,
    ) -> std::result::Result<(), ConfigError> {
        let mut seen = HashSet::new();
        let mut first: Option<ConfigError> = None;

        for (i, block) in blocks.iter().enumerate() {
            let prefix = format!("{}[{i}]", kind.section());
            let address = block.address();

            if !seen.insert(address.clone()) {
                first.get_or_insert(ConfigError::DuplicateAddress {
                    kind: kind.as_str().to_string(),
                    address,
                });
            }

            let known = match kind {
                BlockKind::Resource => self.registry.resource(&block.type_name).is_some(),
                BlockKind::Data => self.registry.data_source(&block.type_name).is_some(),
            };
            if !known {
                first.get_or_insert(ConfigError::UnknownType {
                    kind: kind.as_str().to_string(),
                    type_name: block.type_name.clone(),
                });
            }

            if !is_valid_name(&block.name) {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.name"),
                    message: format!(
                        "Block name '{}' is invalid. Must start with a letter and contain only letters, digits, '_' or '-'.",
                        block.name
                    ),
                });
            }

            if !block.config.is_object() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.config"),
                    message: format!("config of {} must be a mapping", block.address()),
                });
            }
        }

        first.map_or(Ok(()), Err)
    }
}

/// Checks if a block name is valid.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
