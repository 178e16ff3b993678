use anyhow::Result;
use std::path::PathBuf;

/// Display the entries of a Data Package or a directory of them
pub fn run(path: PathBuf) -> Result<()> {
    let collection = super::load_collection(&path)?;

    println!("{}", heading("Data Packages"));
    println!("{}", heading("============="));
    println!("Path: {}", path.display());
    println!("Entries: {}", collection.len());
    println!();

    for entry in &collection {
        println!("{}", heading(entry.identifier()));
        println!("  Rows: {}", entry.frame().num_rows());

        for field in &entry.schema().fields {
            let unit = field.unit.as_deref().unwrap_or("-");
            match &field.reference {
                Some(reference) => {
                    println!("  {:20} {} (vs. {})", field.name, unit, reference)
                }
                None => println!("  {:20} {}", field.name, unit),
            }
        }

        if let Some(key) = entry.citation_key() {
            println!("  Source: {key}");
        }
        println!();
    }

    Ok(())
}

#[cfg(feature = "colorized_output")]
fn heading(text: &str) -> String {
    console::style(text).bold().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn heading(text: &str) -> String {
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_over_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("demo.csv"), "t,E\n0,-0.1\n").unwrap();
        std::fs::write(
            dir.path().join("demo.json"),
            r#"{"resources": [{"name": "demo", "path": "demo.csv",
                "schema": {"fields": [
                    {"name": "t", "type": "number", "unit": "s"},
                    {"name": "E", "type": "number", "unit": "V"}]}}]}"#,
        )
        .unwrap();

        run(dir.path().to_path_buf()).unwrap();
    }

    #[test]
    fn test_info_over_missing_path() {
        assert!(run(PathBuf::from("/nonexistent/path")).is_err());
    }
}
