//! Attribute bag exchanged between the engine and the handlers.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{ResourceError, Result, ScpError};

/// Identifier plus attributes of one resource or datasource instance.
///
/// Handlers decode the desired configuration once with [`decode`], call the
/// API, and write the observed state back with [`set`]. `prior` holds the
/// last recorded attributes so updates can tell which fields changed.
///
/// [`decode`]: ResourceData::decode
/// [`set`]: ResourceData::set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    attributes: Map<String, Value>,
    prior: Option<Map<String, Value>>,
}

impl ResourceData {
    /// Creates data for a new instance from its configuration block.
    #[must_use]
    pub fn new(config: &Value) -> Self {
        Self {
            id: None,
            attributes: object_of(config),
            prior: None,
        }
    }

    /// Creates data for a recorded instance.
    ///
    /// The configuration is laid over the recorded attributes, and the
    /// recorded attributes become the prior snapshot.
    #[must_use]
    pub fn from_state(id: impl Into<String>, recorded: &Map<String, Value>, config: &Value) -> Self {
        let mut attributes = recorded.clone();
        attributes.extend(object_of(config));
        Self {
            id: Some(id.into()),
            attributes,
            prior: Some(recorded.clone()),
        }
    }

    /// Returns the identifier, if the instance exists remotely.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Returns the identifier or fails with [`ResourceError::MissingId`].
    ///
    /// # Errors
    ///
    /// Returns an error if no identifier is set.
    pub fn require_id(&self, resource_type: &str) -> Result<String> {
        self.id().map(str::to_string).ok_or_else(|| {
            ResourceError::MissingId {
                resource_type: resource_type.to_string(),
            }
            .into()
        })
    }

    /// Sets the identifier.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Clears the identifier, marking the instance as gone.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Returns an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns a string attribute, empty strings excluded.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// Sets an attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| ScpError::internal(format!("Failed to set {key}: {e}")))?;
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    /// Copies every field of a serialized snapshot into the attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot does not serialize to an object.
    pub fn set_all(&mut self, snapshot: impl Serialize) -> Result<()> {
        match serde_json::to_value(snapshot) {
            Ok(Value::Object(fields)) => {
                self.attributes.extend(fields);
                Ok(())
            }
            Ok(other) => Err(ScpError::internal(format!(
                "Snapshot is not an object: {other}"
            ))),
            Err(e) => Err(ScpError::internal(format!("Failed to serialize snapshot: {e}"))),
        }
    }

    /// Whether an attribute differs from the prior snapshot.
    ///
    /// Without a prior snapshot every present attribute counts as changed.
    #[must_use]
    pub fn has_change(&self, key: &str) -> bool {
        let current = self.attributes.get(key);
        match &self.prior {
            Some(prior) => prior.get(key) != current,
            None => current.is_some(),
        }
    }

    /// Decodes and validates the attributes into a typed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidConfig`] on decode or validation
    /// failure.
    pub fn decode<T>(&self, resource_type: &str) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let invalid = |message: String| ResourceError::InvalidConfig {
            resource_type: resource_type.to_string(),
            message,
        };

        let config: T = serde_json::from_value(Value::Object(self.attributes.clone()))
            .map_err(|e| invalid(e.to_string()))?;
        config.validate().map_err(|e| invalid(e.to_string()))?;
        Ok(config)
    }

    /// Returns all attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

fn object_of(config: &Value) -> Map<String, Value> {
    config.as_object().cloned().unwrap_or_default()
}
