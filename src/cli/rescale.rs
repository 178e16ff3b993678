use anyhow::{Context, Result};
use log::info;
use std::collections::HashMap;
use std::path::PathBuf;

/// Rewrite Data Packages with columns converted to different units
pub fn run(path: PathBuf, units: Vec<String>, outdir: PathBuf) -> Result<()> {
    let units = parse_units(&units)?;
    if units.is_empty() {
        anyhow::bail!("No target units given, expected e.g. -u 'j=uA / cm2'");
    }

    let collection = super::load_collection(&path)?;
    info!("Rescaling {} entries from {}", collection.len(), path.display());

    for entry in &collection {
        let rescaled = entry
            .rescale(&units)
            .with_context(|| format!("Failed to rescale entry '{}'", entry.identifier()))?;
        rescaled
            .save(&outdir, None)
            .with_context(|| format!("Failed to write entry '{}'", entry.identifier()))?;

        info!("  {} written", rescaled.identifier());
    }

    Ok(())
}

/// Parse repeated `name=unit` flags into a rescaling map
fn parse_units(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            let (name, unit) = pair
                .split_once('=')
                .with_context(|| format!("Malformed unit '{pair}', expected name=unit"))?;
            Ok((name.trim().to_string(), unit.trim().to_string()))
        })
        .collect()
}
