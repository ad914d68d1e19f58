//! Model type configuration
//!
//! Controls which attribute identifies a persisted model and how that
//! attribute is exposed when the model is serialized.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ModelError, ModelResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Attribute whose presence marks a model as created
    pub identity_attribute: String,
    /// Field name the identity is renamed to by `Model::to_json`
    pub public_identity: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            identity_attribute: "_id".to_string(),
            public_identity: "id".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn from_yaml_str(content: &str) -> ModelResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> ModelResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(ModelError::Configuration(format!(
                "unsupported config file extension: {:?}",
                other
            ))),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.identity_attribute.trim().is_empty() {
            return Err(ModelError::Configuration(
                "identity_attribute must not be empty".to_string(),
            ));
        }
        if self.public_identity.trim().is_empty() {
            return Err(ModelError::Configuration(
                "public_identity must not be empty".to_string(),
            ));
        }
        if self.identity_attribute == self.public_identity {
            return Err(ModelError::Configuration(format!(
                "public_identity must differ from identity_attribute ('{}')",
                self.identity_attribute
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.identity_attribute, "_id");
        assert_eq!(config.public_identity, "id");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let config = ModelConfig::from_yaml_str("identity_attribute: uuid\n").unwrap();
        assert_eq!(config.identity_attribute, "uuid");
        assert_eq!(config.public_identity, "id");
    }

    #[test]
    fn test_json_config() {
        let config =
            ModelConfig::from_json_str(r#"{"identity_attribute":"pk","public_identity":"key"}"#)
                .unwrap();
        assert_eq!(config.identity_attribute, "pk");
        assert_eq!(config.public_identity, "key");
    }

    #[test]
    fn test_malformed_config_is_a_configuration_error() {
        assert!(matches!(
            ModelConfig::from_json_str(r#"{"identity_attribute": "#),
            Err(ModelError::Configuration(_))
        ));
        assert!(matches!(
            ModelConfig::from_yaml_str("identity_attribute: [unclosed"),
            Err(ModelError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_clashing_names() {
        let result = ModelConfig::from_yaml_str("identity_attribute: id\npublic_identity: id\n");
        assert!(matches!(result, Err(ModelError::Configuration(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "public_identity: key").unwrap();

        let config = ModelConfig::load(file.path()).unwrap();
        assert_eq!(config.identity_attribute, "_id");
        assert_eq!(config.public_identity, "key");
    }

    #[test]
    fn test_load_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            ModelConfig::load(file.path()),
            Err(ModelError::Configuration(_))
        ));
    }
}
