//! Export configuration file.
//!
//! Every key is optional; command-line flags override file values.
//!
//! ```yaml
//! page_size: 1000
//! seed: 42
//! email_domain: example.com
//! foreign_key_suffixes: [Id, _id]
//! demo:
//!   contacts: 400
//!   callouts: 20
//! treatments:
//!   Project: foreign-keys-only
//!   Notice: as-is
//! ```

use crate::export::PAGE_SIZE;
use crate::profiles::{ProfileOptions, Treatment};
use anon_core::ForeignKeyConvention;
use anon_generator::{Synthesizer, FAKE_EMAIL_DOMAIN};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Sample sizes for the demo profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Contacts to sample
    pub contacts: usize,
    /// Callouts to sample
    pub callouts: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let options = ProfileOptions::default();
        Self {
            contacts: options.demo_contacts,
            callouts: options.demo_callouts,
        }
    }
}

/// Settings for an export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Records per page
    pub page_size: usize,
    /// RNG seed; unset means a fresh random run
    pub seed: Option<u64>,
    /// Domain of every generated email address
    pub email_domain: String,
    /// Column-name suffixes marking foreign keys
    pub foreign_key_suffixes: Vec<String>,
    /// Demo profile sample sizes
    pub demo: DemoConfig,
    /// Per-entity treatment overrides
    pub treatments: HashMap<String, Treatment>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            seed: None,
            email_domain: FAKE_EMAIL_DOMAIN.to_string(),
            foreign_key_suffixes: ForeignKeyConvention::default().suffixes().to_vec(),
            demo: DemoConfig::default(),
            treatments: HashMap::new(),
        }
    }
}

impl ExportConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.email_domain.trim().is_empty() {
            return Err(ConfigError::Invalid("email_domain must not be empty".into()));
        }
        if self.foreign_key_suffixes.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid(
                "foreign_key_suffixes must not contain empty suffixes".into(),
            ));
        }
        Ok(())
    }

    /// Profile options derived from this config.
    pub fn profile_options(&self) -> ProfileOptions {
        ProfileOptions {
            treatments: self.treatments.clone(),
            foreign_keys: ForeignKeyConvention::new(self.foreign_key_suffixes.iter().cloned()),
            demo_contacts: self.demo.contacts,
            demo_callouts: self.demo.callouts,
        }
    }

    /// Synthesizer for schema-driven payloads.
    pub fn synthesizer(&self) -> Synthesizer {
        Synthesizer::new(self.email_domain.clone())
    }
}
