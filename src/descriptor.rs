//! # Metadata Descriptors
//!
//! Read-only convenience view over the JSON metadata attached to a resource.
//! Nested keys are addressed with dotted paths, and objects carrying exactly
//! a `value` and a `unit` key are recognized as physical quantities:
//!
//! ```rust
//! use serde_json::json;
//! use unitpack::descriptor::Descriptor;
//!
//! let metadata = json!({"system": {"electrolyte": {"temperature": {"value": 298.15, "unit": "K"}}}});
//! let descriptor = Descriptor::new(&metadata);
//!
//! let temperature = descriptor
//!     .path("system.electrolyte.temperature")
//!     .unwrap()
//!     .as_quantity()
//!     .unwrap();
//! assert_eq!(format!("{}", temperature), "298.15 K");
//! ```

use std::fmt;

use serde_json::Value;

use crate::units::{Quantity, UnitError};

/// Borrowed view over a JSON metadata tree
#[derive(Debug, Clone, Copy)]
pub struct Descriptor<'a> {
    value: &'a Value,
}

impl<'a> Descriptor<'a> {
    /// Wrap a JSON value
    pub fn new(value: &'a Value) -> Self {
        Descriptor { value }
    }

    /// The underlying JSON value
    pub fn raw(&self) -> &'a Value {
        self.value
    }

    /// Child of an object by key
    pub fn get(&self, key: &str) -> Option<Descriptor<'a>> {
        self.value.get(key).map(Descriptor::new)
    }

    /// Element of an array by index
    pub fn index(&self, index: usize) -> Option<Descriptor<'a>> {
        self.value.get(index).map(Descriptor::new)
    }

    /// Descend a dotted path; numeric segments index into arrays.
    ///
    /// `descriptor.path("system.electrodes.0.name")`
    pub fn path(&self, path: &str) -> Option<Descriptor<'a>> {
        let mut current = self.value;

        for segment in path.split('.') {
            current = match current {
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => current.get(segment)?,
            };
        }

        Some(Descriptor::new(current))
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_i64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    /// Interpret an object with exactly `value` and `unit` keys as a quantity
    pub fn as_quantity(&self) -> Result<Quantity, UnitError> {
        let object = self.value.as_object().ok_or(UnitError::NotAQuantity)?;

        if object.len() != 2 {
            return Err(UnitError::NotAQuantity);
        }

        let unit = object
            .get("unit")
            .and_then(Value::as_str)
            .ok_or(UnitError::NotAQuantity)?;
        let value = object
            .get("value")
            .and_then(|v| {
                v.as_f64()
                    .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
            })
            .ok_or(UnitError::NotAQuantity)?;

        Quantity::new(value, unit)
    }

    /// Dump this descriptor as YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self.value)
    }
}

impl fmt::Display for Descriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> Value {
        json!({
            "source": {"citation key": "alves_2011", "url": "https://doi.org/10.1039/C0CP01001D"},
            "system": {
                "electrolyte": {"temperature": {"value": 298.15, "unit": "K"}},
                "electrodes": [{"name": "WE"}, {"name": "CE"}],
            },
        })
    }

    #[test]
    fn test_path_access() {
        let metadata = metadata();
        let descriptor = Descriptor::new(&metadata);

        assert_eq!(
            descriptor.path("source.url").unwrap().as_str(),
            Some("https://doi.org/10.1039/C0CP01001D")
        );
        assert_eq!(
            descriptor.path("system.electrodes.1.name").unwrap().as_str(),
            Some("CE")
        );
        assert!(descriptor.path("system.missing.deep").is_none());
    }

    #[test]
    fn test_keys_with_spaces() {
        let metadata = metadata();
        let descriptor = Descriptor::new(&metadata);

        assert_eq!(
            descriptor
                .get("source")
                .and_then(|s| s.get("citation key"))
                .and_then(|k| k.as_str()),
            Some("alves_2011")
        );
    }

    #[test]
    fn test_quantity_detection() {
        let metadata = metadata();
        let descriptor = Descriptor::new(&metadata);

        let temperature = descriptor
            .path("system.electrolyte.temperature")
            .unwrap()
            .as_quantity()
            .unwrap();
        assert_eq!(temperature.value(), 298.15);
        assert_eq!(temperature.unit(), "K");

        // Conversion through the units registry.
        let in_millikelvin = temperature.to("mK").unwrap();
        assert!((in_millikelvin.value() - 298_150.0).abs() < 1e-6);

        // A plain object is not a quantity.
        assert!(matches!(
            descriptor.get("source").unwrap().as_quantity(),
            Err(UnitError::NotAQuantity)
        ));
    }

    #[test]
    fn test_yaml_dump() {
        let metadata = json!({"a": 0});
        let descriptor = Descriptor::new(&metadata);
        assert_eq!(descriptor.to_yaml().unwrap(), "a: 0\n");
    }
}
