//! Manifest parser for loading and merging configuration sources.
//!
//! Precedence, lowest to highest: manifest file, `.env` file, process
//! environment (`SCP_*`).

use crate::error::{ConfigError, Result, ScpError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::Manifest;

/// Environment variables that override provider settings.
pub const ENV_ENDPOINT: &str = "SCP_ENDPOINT";
/// Project override.
pub const ENV_PROJECT_ID: &str = "SCP_PROJECT_ID";
/// Access key override.
pub const ENV_ACCESS_KEY: &str = "SCP_ACCESS_KEY";
/// Bearer token override.
pub const ENV_AUTH_TOKEN: &str = "SCP_AUTH_TOKEN";

/// Loads manifests from disk or strings.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving the `.env` file.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the directory the `.env` file is looked up in.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads a manifest from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Manifest> {
        let path = path.as_ref();
        info!("Loading manifest from: {}", path.display());

        if !path.exists() {
            return Err(ScpError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ScpError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses a manifest from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<Manifest> {
        let manifest: Manifest = serde_yaml::from_str(content).map_err(|e| {
            ScpError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            })
        })?;

        debug!(
            "Parsed manifest with {} resource(s) and {} datasource(s)",
            manifest.resources.len(),
            manifest.data.len()
        );
        Ok(manifest)
    }

    /// Loads `.env`, then the manifest, then applies `SCP_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the `.env` file or the manifest cannot be loaded.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<Manifest> {
        self.load_dotenv()?;
        let mut manifest = self.load_file(path)?;
        Self::apply_env_overrides(&mut manifest, |key| std::env::var(key).ok());
        Ok(manifest)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env_overrides(manifest: &mut Manifest, lookup: impl Fn(&str) -> Option<String>) {
        let provider = &mut manifest.provider;

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            debug!("Overriding provider.endpoint from environment");
            provider.endpoint = endpoint;
        }
        if let Some(project_id) = lookup(ENV_PROJECT_ID) {
            debug!("Overriding provider.project_id from environment");
            provider.project_id = project_id;
        }
        if let Some(access_key) = lookup(ENV_ACCESS_KEY) {
            debug!("Overriding provider.access_key from environment");
            provider.access_key = Some(access_key);
        }
        if let Some(token) = lookup(ENV_AUTH_TOKEN) {
            debug!("Overriding provider.auth_token from environment");
            provider.auth_token = Some(token);
        }
    }

    /// Loads the `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the `.env` file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                ScpError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Manifest file names searched for, in order.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["scp.yaml", "scp.yml"];

/// Finds the manifest in `start_dir` or one of its parents.
///
/// # Errors
///
/// Returns an error if no manifest is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found manifest: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(ScpError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MANIFEST: &str = r#"
provider:
  project_id: PROJECT-abc
  access_key: ak-123
  poll:
    interval_secs: 10

resources:
  - type: scp_transit_gateway
    name: hub
    config:
      name: corehub
      service_zone_id: ZONE-1
      bandwidth_gbps: 1

data:
  - type: scp_certificates
    name: all
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = ConfigParser::new().parse_yaml(MANIFEST, None).unwrap();

        assert_eq!(manifest.provider.project_id, "PROJECT-abc");
        assert_eq!(manifest.provider.poll.interval_secs, 10);
        assert_eq!(manifest.provider.poll.transient_attempts, 10);
        assert_eq!(manifest.resources[0].address(), "scp_transit_gateway.hub");
        assert_eq!(manifest.resources[0].config["bandwidth_gbps"], 1);
        assert!(manifest.data[0].config.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_has_location() {
        let err = ConfigParser::new()
            .parse_yaml("resources: {", Some(Path::new("scp.yaml")))
            .unwrap_err();
        assert!(err.to_string().contains("scp.yaml"));
    }

    #[test]
    fn test_env_overrides() {
        let mut manifest = ConfigParser::new().parse_yaml(MANIFEST, None).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_PROJECT_ID, "PROJECT-env"),
            (ENV_AUTH_TOKEN, "token"),
        ]);

        ConfigParser::apply_env_overrides(&mut manifest, |k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(manifest.provider.project_id, "PROJECT-env");
        assert_eq!(manifest.provider.access_key.as_deref(), Some("ak-123"));
        assert_eq!(manifest.provider.auth_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_find_config_walks_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("scp.yml"), MANIFEST).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join("scp.yml"));
    }

    #[test]
    fn test_load_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigParser::new()
            .load_file(dir.path().join("scp.yaml"))
            .unwrap_err();
        assert!(matches!(err, ScpError::Config(ConfigError::FileNotFound { .. })));
    }
}
