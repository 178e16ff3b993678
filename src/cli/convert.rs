use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use unitpack::entry::metadata_from_yaml;
use unitpack::loaders::{CsvLoader, Device};
use unitpack::schema::Field;

use crate::cli::config::Config;

/// Convert an instrument CSV file into a unit-annotated Data Package
pub fn run(
    input: PathBuf,
    outdir: Option<PathBuf>,
    device: Option<Device>,
    metadata: Option<PathBuf>,
    config: Option<PathBuf>,
    basename: Option<String>,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let config = match config {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };

    // CLI flags win over the config file.
    let device = match device {
        Some(device) => device,
        None => match &config.convert.device {
            Some(name) => name.parse()?,
            None => Device::Generic,
        },
    };

    let basename = basename
        .or_else(|| config.convert.basename.clone())
        .or_else(|| {
            input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "entry".to_string());

    let outdir = outdir.unwrap_or_else(|| {
        input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    info!("Converting {} ({:?})", input.display(), device);
    info!("Output: {}", outdir.join(&basename).display());

    let metadata = metadata
        .map(|path| {
            metadata_from_yaml(&path)
                .with_context(|| format!("Failed to read metadata file: {}", path.display()))
        })
        .transpose()?;

    // Config fields first so they win over annotations from the metadata.
    let mut fields: Vec<Field> = config.convert.fields.iter().map(Field::from).collect();
    if let Some(metadata) = &metadata {
        fields.extend(fields_from_metadata(metadata));
    }

    let file = File::open(&input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let loader = CsvLoader::with_device(BufReader::new(file), device)?;

    let entry = loader
        .into_entry(&basename, metadata, &fields)
        .context("Conversion failed")?;

    entry
        .save(&outdir, None)
        .context("Failed to write Data Package")?;

    info!("Conversion complete!");
    info!("  Rows: {}", entry.frame().num_rows());
    for field in &entry.schema().fields {
        match &field.unit {
            Some(unit) => info!("  Field {}: {}", field.name, unit),
            None => info!("  Field {}: no unit", field.name),
        }
    }

    Ok(())
}

/// Field annotations embedded in the metadata under `figure description.fields`
fn fields_from_metadata(metadata: &serde_json::Value) -> Vec<Field> {
    metadata
        .get("figure description")
        .and_then(|description| description.get("fields"))
        .and_then(|fields| serde_json::from_value(fields.clone()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_from_metadata() {
        let metadata = json!({
            "figure description": {
                "fields": [
                    {"name": "E", "type": "number", "unit": "V", "reference": "RHE"},
                    {"name": "j", "type": "number", "unit": "A / m2"}
                ]
            }
        });

        let fields = fields_from_metadata(&metadata);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].unit.as_deref(), Some("V"));
        assert_eq!(fields[1].name, "j");

        assert!(fields_from_metadata(&json!({})).is_empty());
    }
}
