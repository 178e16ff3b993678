//! TOML configuration file support for the convert command.
//!
//! Field annotations that would be unwieldy as CLI flags live in a config
//! file:
//!
//! ```toml
//! # unitpack.toml
//! [convert]
//! device = "eclab"
//!
//! [[convert.fields]]
//! name = "Ewe/V"
//! unit = "V"
//! reference = "RHE"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use unitpack::schema::Field;

/// Root configuration structure for unitpack.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Conversion-specific settings.
    #[serde(default)]
    pub convert: ConvertConfig,
}

/// Configuration for the convert command.
#[derive(Debug, Default, Deserialize)]
pub struct ConvertConfig {
    /// Instrument format of the input (generic, eclab, gamry).
    pub device: Option<String>,

    /// Basename of the written package.
    pub basename: Option<String>,

    /// Field annotations applied to the converted columns.
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// One field annotation from the config file.
#[derive(Debug, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub unit: Option<String>,
    pub reference: Option<String>,
    pub description: Option<String>,
}

impl From<&FieldConfig> for Field {
    fn from(config: &FieldConfig) -> Self {
        let mut field = Field::new(&config.name);
        if let Some(unit) = &config.unit {
            field = field.with_unit(unit);
        }
        if let Some(reference) = &config.reference {
            field = field.with_reference(reference);
        }
        if let Some(description) = &config.description {
            field = field.with_description(description);
        }
        field
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
