//! # Entries
//!
//! An [`Entry`] is one annotated tabular resource: its data, the schema
//! tagging every column with a physical unit, and the free-form metadata of
//! the underlying Data Package. Entries are immutable; transformations such
//! as [`Entry::rescale`] return a new entry.
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::io::Cursor;
//! use unitpack::entry::Entry;
//! use unitpack::schema::Field;
//!
//! let csv = "t,E,j\n0,-0.103158,-0.998277\n";
//! let hints = vec![
//!     Field::new("t").with_unit("s"),
//!     Field::new("E").with_unit("V").with_reference("RHE"),
//!     Field::new("j").with_unit("A / m2"),
//! ];
//! let entry = Entry::from_csv_reader(Cursor::new(csv), "demo", None, &hints)?;
//!
//! let units = HashMap::from([("j".to_string(), "uA / cm2".to_string())]);
//! let rescaled = entry.rescale(&units)?;
//! assert_eq!(rescaled.field_unit("j")?, "uA / cm2");
//! # Ok::<(), unitpack::package::PackageError>(())
//! ```

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use chrono::Utc;
use log::warn;
use serde_json::Value;

use crate::descriptor::Descriptor;
use crate::frame::DataFrame;
use crate::package::{PackageDescriptor, PackageError, ResourceDescriptor};
use crate::schema::{Field, Schema};
use crate::units::conversion_factor;

#[cfg(test)]
mod tests;

/// One tabular resource with unit-tagged schema and metadata
#[derive(Debug, Clone)]
pub struct Entry {
    identifier: String,
    schema: Schema,
    metadata: Value,
    frame: DataFrame,
}

impl Entry {
    /// Assemble an entry, verifying that schema fields and data columns agree
    /// in name and order
    pub fn new(
        identifier: &str,
        schema: Schema,
        metadata: Value,
        frame: DataFrame,
    ) -> Result<Self, PackageError> {
        let schema_names = schema.field_names();
        let data_names = frame.column_names();

        if schema_names != data_names.iter().map(String::as_str).collect::<Vec<_>>() {
            return Err(PackageError::SchemaMismatch {
                resource: identifier.to_string(),
                schema_fields: schema_names.join(", "),
                data_columns: data_names.join(", "),
            });
        }

        Ok(Entry {
            identifier: identifier.to_string(),
            schema,
            metadata,
            frame,
        })
    }

    /// Unique identifier, the basename of the resource
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Raw resource metadata
    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    /// Metadata as a navigable [`Descriptor`]
    pub fn descriptor(&self) -> Descriptor<'_> {
        Descriptor::new(&self.metadata)
    }

    /// The unit expression of a field
    pub fn field_unit(&self, name: &str) -> Result<&str, PackageError> {
        let field = self
            .schema
            .get_field(name)
            .ok_or_else(|| PackageError::FieldNotFound(name.to_string()))?;

        field
            .unit
            .as_deref()
            .ok_or_else(|| PackageError::MissingUnit(name.to_string()))
    }

    /// The citation key from the source metadata, if any
    ///
    /// Both the `citation key` and `citationKey` spellings found in published
    /// packages are accepted.
    pub fn citation_key(&self) -> Option<&str> {
        let source = self.descriptor().get("source")?;
        source
            .get("citation key")
            .or_else(|| source.get("citationKey"))?
            .as_str()
    }

    /// The raw BibTeX blob from the source metadata, if any
    ///
    /// Rendering references is out of scope; the blob is preserved verbatim.
    pub fn bibdata(&self) -> Option<&str> {
        let bibdata = self
            .descriptor()
            .path("source.bibdata")
            .and_then(|d| d.as_str())
            .filter(|b| !b.is_empty());

        if bibdata.is_none() {
            warn!("Entry '{}' has no bibliography.", self.identifier);
        }

        bibdata
    }

    /// A new entry with the named columns converted to different units
    ///
    /// `units` maps field names to target unit expressions, e.g.
    /// `{"j": "uA / cm2", "t": "h"}`. Column values are multiplied by the
    /// conversion factor and the schema's unit tags updated; `reference`
    /// annotations, all other columns, and the metadata are carried
    /// unchanged. Names not present in the schema are reported with a
    /// warning; converting to an incompatible unit is an error.
    pub fn rescale(&self, units: &HashMap<String, String>) -> Result<Entry, PackageError> {
        let mut unknown: Vec<&str> = units
            .keys()
            .filter(|name| !self.schema.has_field(name))
            .map(String::as_str)
            .collect();
        unknown.sort_unstable();
        for name in unknown {
            warn!(
                "Entry '{}' has no field '{}'; not rescaled.",
                self.identifier, name
            );
        }

        let mut schema = self.schema.clone();
        let mut frame = self.frame.clone();

        for field in &self.schema.fields {
            let Some(target) = units.get(&field.name) else {
                continue;
            };
            let current = field
                .unit
                .as_deref()
                .ok_or_else(|| PackageError::MissingUnit(field.name.clone()))?;

            let factor = conversion_factor(current, target)?;
            frame = frame.scaled(&field.name, factor)?;
            schema.update_unit(&field.name, target);
        }

        Entry::new(&self.identifier, schema, self.metadata.clone(), frame)
    }

    /// A new entry with fields (and data columns) renamed
    ///
    /// `names` maps old names to new ones. With `keep_original_as`, the
    /// previous name is recorded under that custom schema key. Names absent
    /// from the schema are ignored with a warning.
    pub fn rename_fields(
        &self,
        names: &HashMap<String, String>,
        keep_original_as: Option<&str>,
    ) -> Result<Entry, PackageError> {
        if names.is_empty() {
            warn!("No renaming pattern was provided, such as {{'t': 't_rel'}}.");
        }

        let mut schema = self.schema.clone();
        for unused in schema.rename_fields(names, keep_original_as) {
            warn!(
                "Entry '{}' has no field '{}'; not renamed.",
                self.identifier, unused
            );
        }

        let frame = self.frame.renamed(names)?;

        Entry::new(&self.identifier, schema, self.metadata.clone(), frame)
    }

    /// A new entry with a derived column appended
    ///
    /// The field carries the new column's unit and annotations; its name must
    /// not collide with an existing field.
    pub fn with_column(&self, values: Vec<f64>, field: Field) -> Result<Entry, PackageError> {
        if self.schema.has_field(&field.name) {
            return Err(PackageError::DuplicateField(field.name));
        }

        let frame = self.frame.with_column(&field.name, values)?;

        let mut schema = self.schema.clone();
        schema.fields.push(field);

        Entry::new(&self.identifier, schema, self.metadata.clone(), frame)
    }

    /// Load an entry from a Data Package descriptor (JSON) on disk
    ///
    /// The CSV resource is resolved relative to the descriptor. The
    /// descriptor's schema supplies field metadata; its field names must
    /// match the CSV columns.
    pub fn from_local<P: AsRef<Path>>(path: P) -> Result<Self, PackageError> {
        let path = path.as_ref();
        let descriptor = PackageDescriptor::from_path(path)?;
        let resource = descriptor.primary_resource(&path.display().to_string())?;

        let csv_path = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&resource.path);
        let file = File::open(&csv_path)?;
        let frame = DataFrame::from_csv_reader(BufReader::new(file))?;

        let schema = if resource.schema.fields.is_empty() {
            inferred_schema(&frame)?
        } else {
            reconciled_schema(&resource.schema, &frame)?
        };

        Entry::new(&resource.name, schema, resource.metadata.clone(), frame)
    }

    /// Build an entry from a CSV file with a single header line
    ///
    /// `fields` are unit hints merged into the inferred schema by name;
    /// hints naming absent columns produce a warning.
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        metadata: Option<Value>,
        fields: &[Field],
    ) -> Result<Self, PackageError> {
        let path = path.as_ref();
        let basename = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "entry".to_string());

        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file), &basename, metadata, fields)
    }

    /// Build an entry from CSV data in memory
    pub fn from_csv_reader<R: Read>(
        reader: R,
        basename: &str,
        metadata: Option<Value>,
        fields: &[Field],
    ) -> Result<Self, PackageError> {
        let frame = DataFrame::from_csv_reader(reader)?;
        Self::from_frame(frame, basename, metadata, fields)
    }

    /// Build an entry from an existing table
    pub fn from_frame(
        frame: DataFrame,
        basename: &str,
        metadata: Option<Value>,
        fields: &[Field],
    ) -> Result<Self, PackageError> {
        let mut schema = inferred_schema(&frame)?;

        for unused in schema.merge_hints(fields) {
            warn!(
                "Field '{}' was provided but does not appear in the columns {:?}.",
                unused,
                frame.column_names()
            );
        }

        Entry::new(
            basename,
            schema,
            metadata.unwrap_or(Value::Null),
            frame,
        )
    }

    /// Write this entry as a Data Package: `basename.csv` and `basename.json`
    /// in `outdir`
    ///
    /// Without an explicit `basename` the entry's identifier is used. The
    /// written package loads back with [`Entry::from_local`].
    pub fn save<P: AsRef<Path>>(
        &self,
        outdir: P,
        basename: Option<&str>,
    ) -> Result<(), PackageError> {
        let outdir = outdir.as_ref();
        fs::create_dir_all(outdir)?;

        let basename = basename.unwrap_or(&self.identifier);
        let csv_path = outdir.join(format!("{basename}.csv"));
        let json_path = outdir.join(format!("{basename}.json"));

        let file = File::create(&csv_path)?;
        self.frame.write_csv(BufWriter::new(file))?;

        let descriptor = PackageDescriptor {
            resources: vec![ResourceDescriptor::for_csv(
                basename,
                self.schema.clone(),
                self.metadata.clone(),
            )],
            created: Some(Utc::now()),
            extra: HashMap::new(),
        };
        descriptor.write_json(&json_path)?;

        Ok(())
    }
}

/// Schema derived from the table alone: names and types, no units
fn inferred_schema(frame: &DataFrame) -> Result<Schema, PackageError> {
    let fields = frame
        .column_names()
        .into_iter()
        .map(|name| {
            let field_type = frame.field_type(&name)?;
            Ok(Field::new(&name).with_type(field_type))
        })
        .collect::<Result<Vec<_>, PackageError>>()?;

    Ok(Schema::new(fields))
}

/// Descriptor schema validated against the CSV columns, with missing value
/// types filled in from the data
fn reconciled_schema(schema: &Schema, frame: &DataFrame) -> Result<Schema, PackageError> {
    let mut schema = schema.clone();

    for field in &mut schema.fields {
        if frame.column(&field.name).is_some() {
            field.field_type = frame.field_type(&field.name)?;
        }
    }

    Ok(schema)
}

/// Read a YAML metadata file into a JSON value, for attaching to entries
pub fn metadata_from_yaml<P: AsRef<Path>>(path: P) -> Result<Value, PackageError> {
    let file = File::open(path)?;
    Ok(serde_yaml::from_reader(BufReader::new(file))?)
}
