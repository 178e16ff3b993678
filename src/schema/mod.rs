//! # Field Metadata
//!
//! The schema of a tabular resource: an ordered list of fields, each with a
//! type, an optional physical unit, and an optional reference annotation
//! (e.g. a potential axis recorded against `RHE`).
//!
//! This is the subset of the frictionless Table Schema that annotated Data
//! Packages actually use, with unknown descriptor keys round-tripped through
//! a flattened map.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

#[cfg(test)]
mod tests;

/// Value type of a field, as stored in the descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    #[default]
    Number,
    String,
    Boolean,
    Date,
    Datetime,
    Any,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Any => "any",
        };
        f.write_str(name)
    }
}

/// A single column descriptor with its unit annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Column name
    pub name: String,

    /// Value type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Physical unit of the values, e.g. `"A / m2"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Reference the values are recorded against, e.g. `"RHE"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Any further descriptor keys (`originalName`, `dimension`, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Field {
    /// Create a number field with the given name
    pub fn new(name: &str) -> Self {
        Field {
            name: name.to_string(),
            field_type: FieldType::Number,
            unit: None,
            reference: None,
            description: None,
            extra: HashMap::new(),
        }
    }

    /// Set the value type
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Attach a unit expression
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    /// Attach a reference annotation
    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    /// Attach a description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Ordered field list of a tabular resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a schema from a list of fields
    pub fn new(fields: Vec<Field>) -> Self {
        Schema { fields }
    }

    /// Field names in column order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Look up a field by name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Mutable lookup by name
    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Whether a field with this name exists
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Replace the unit annotation of a field, returning whether it existed
    pub fn update_unit(&mut self, name: &str, unit: &str) -> bool {
        match self.get_field_mut(name) {
            Some(field) => {
                field.unit = Some(unit.to_string());
                true
            }
            None => false,
        }
    }

    /// Merge unit, reference, and description hints into matching fields.
    ///
    /// Hints whose name does not match any field are returned so callers can
    /// report them.
    pub fn merge_hints(&mut self, hints: &[Field]) -> Vec<String> {
        let mut unused = Vec::new();

        for hint in hints {
            match self.get_field_mut(&hint.name) {
                Some(field) => {
                    if field.unit.is_none() {
                        field.unit.clone_from(&hint.unit);
                    }
                    if field.reference.is_none() {
                        field.reference.clone_from(&hint.reference);
                    }
                    if field.description.is_none() {
                        field.description.clone_from(&hint.description);
                    }
                    for (key, value) in &hint.extra {
                        field
                            .extra
                            .entry(key.clone())
                            .or_insert_with(|| value.clone());
                    }
                }
                None => unused.push(hint.name.clone()),
            }
        }

        unused
    }

    /// Rename fields according to `names` (old name to new name), optionally
    /// recording the previous name under the custom key `keep_original_as`.
    ///
    /// Names absent from the schema are returned unused.
    pub fn rename_fields(
        &mut self,
        names: &HashMap<String, String>,
        keep_original_as: Option<&str>,
    ) -> Vec<String> {
        let mut unused: Vec<String> = names
            .keys()
            .filter(|name| !self.has_field(name))
            .cloned()
            .collect();
        unused.sort();

        for field in &mut self.fields {
            if let Some(new_name) = names.get(&field.name) {
                if let Some(key) = keep_original_as {
                    field
                        .extra
                        .entry(key.to_string())
                        .or_insert_with(|| Value::String(field.name.clone()));
                }
                field.name.clone_from(new_name);
            }
        }

        unused
    }
}
