//! # Data Package Descriptors
//!
//! Serialization model for the JSON descriptor that pairs a CSV resource with
//! its schema and metadata. A minimal descriptor looks like:
//!
//! ```json
//! {
//!     "resources": [
//!         {
//!             "name": "demo_entry",
//!             "type": "table",
//!             "path": "demo_entry.csv",
//!             "scheme": "file",
//!             "format": "csv",
//!             "schema": {
//!                 "fields": [
//!                     {"name": "t", "type": "number", "unit": "s"},
//!                     {"name": "E", "type": "number", "unit": "V", "reference": "RHE"}
//!                 ]
//!             },
//!             "metadata": {"curation": {}}
//!         }
//!     ]
//! }
//! ```
//!
//! Unknown keys on packages and resources are round-tripped through flattened
//! maps so descriptors written by other tools survive a load/save cycle.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::frame::FrameError;
use crate::schema::Schema;
use crate::units::UnitError;

/// Errors raised while loading, transforming, or saving Data Packages
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// I/O error reading or writing package files
    #[error("Failed to read or write package file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed descriptor JSON
    #[error("Invalid package descriptor: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed metadata YAML
    #[error("Invalid metadata YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Error in the tabular resource
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Unit parsing or conversion error
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// Reference to a field that does not exist
    #[error("No field named '{0}'")]
    FieldNotFound(String),

    /// Operation requiring a unit on an untagged field
    #[error("Field '{0}' has no unit")]
    MissingUnit(String),

    /// Added field whose name is already taken
    #[error("A field named '{0}' already exists")]
    DuplicateField(String),

    /// Descriptor whose schema does not match the CSV columns
    #[error("Schema of resource '{resource}' names fields [{schema_fields}] but the data has columns [{data_columns}]")]
    SchemaMismatch {
        resource: String,
        schema_fields: String,
        data_columns: String,
    },

    /// Descriptor without any resources
    #[error("Data Package '{0}' has no resources")]
    NoResources(String),
}

/// The top-level Data Package descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub resources: Vec<ResourceDescriptor>,

    /// Creation timestamp, written on save
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// One tabular resource within a Data Package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Path of the CSV file, relative to the descriptor
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mediatype: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    #[serde(default)]
    pub schema: Schema,

    /// Arbitrary metadata attached to the resource
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ResourceDescriptor {
    /// A CSV resource descriptor with the conventional scheme/format keys
    pub fn for_csv(name: &str, schema: Schema, metadata: Value) -> Self {
        ResourceDescriptor {
            name: name.to_string(),
            resource_type: Some("table".to_string()),
            path: format!("{name}.csv"),
            scheme: Some("file".to_string()),
            format: Some("csv".to_string()),
            mediatype: Some("text/csv".to_string()),
            encoding: Some("utf-8".to_string()),
            schema,
            metadata,
            extra: HashMap::new(),
        }
    }
}

impl PackageDescriptor {
    /// Read a descriptor from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PackageError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// The first resource, which carries the tabular data
    pub fn primary_resource(&self, origin: &str) -> Result<&ResourceDescriptor, PackageError> {
        self.resources
            .first()
            .ok_or_else(|| PackageError::NoResources(origin.to_string()))
    }

    /// Write the descriptor as indented JSON with a trailing newline
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), PackageError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        // A final newline keeps the output diff-friendly.
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
