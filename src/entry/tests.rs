use super::*;
use crate::package::PackageError;
use crate::units::UnitError;
use serde_json::json;
use std::io::Cursor;

const SAMPLE_CSV: &str = "\
t,E,j
0,-0.103158,-0.998277
1,-0.102158,-0.981762
2,-0.101158,-0.951682
";

fn sample_fields() -> Vec<Field> {
    vec![
        Field::new("t").with_unit("s"),
        Field::new("E").with_unit("V").with_reference("RHE"),
        Field::new("j").with_unit("A / m2"),
    ]
}

fn sample_metadata() -> Value {
    json!({
        "source": {
            "citation key": "alves_2011_electrochemistry_6010",
            "url": "https://doi.org/10.1039/C0CP01001D",
            "bibdata": "@article{alves_2011_electrochemistry_6010, year = {2011}}"
        },
        "system": {
            "electrolyte": {"temperature": {"value": 298.15, "unit": "K"}}
        }
    })
}

fn sample_entry() -> Entry {
    Entry::from_csv_reader(
        Cursor::new(SAMPLE_CSV),
        "alves_2011_electrochemistry_6010_f1a_solid",
        Some(sample_metadata()),
        &sample_fields(),
    )
    .unwrap()
}

#[test]
fn test_field_units() {
    let entry = sample_entry();

    assert_eq!(entry.field_unit("E").unwrap(), "V");
    assert_eq!(entry.field_unit("j").unwrap(), "A / m2");
    assert!(matches!(
        entry.field_unit("x"),
        Err(PackageError::FieldNotFound(_))
    ));
}

#[test]
fn test_rescale_converts_values_and_units() {
    let entry = sample_entry();
    let units = HashMap::from([
        ("j".to_string(), "uA / cm2".to_string()),
        ("t".to_string(), "h".to_string()),
    ]);

    let rescaled = entry.rescale(&units).unwrap();

    assert_eq!(rescaled.field_unit("j").unwrap(), "uA / cm2");
    assert_eq!(rescaled.field_unit("t").unwrap(), "h");
    // E is untouched, including its reference annotation.
    assert_eq!(rescaled.field_unit("E").unwrap(), "V");
    assert_eq!(
        rescaled.schema().get_field("E").unwrap().reference.as_deref(),
        Some("RHE")
    );

    let current = rescaled.frame().column_f64("j").unwrap();
    assert!((current[0] - -99.8277).abs() < 1e-4);

    let time = rescaled.frame().column_f64("t").unwrap();
    assert!((time[1] - 1.0 / 3600.0).abs() < 1e-12);

    // Metadata is carried over unchanged.
    assert_eq!(rescaled.metadata(), entry.metadata());
}

#[test]
fn test_rescale_unknown_field_is_ignored() {
    let entry = sample_entry();
    let units = HashMap::from([("x".to_string(), "h".to_string())]);

    let rescaled = entry.rescale(&units).unwrap();
    assert_eq!(
        rescaled.frame().column_f64("j").unwrap(),
        entry.frame().column_f64("j").unwrap()
    );
}

#[test]
fn test_rescale_incompatible_unit() {
    let entry = sample_entry();
    let units = HashMap::from([("t".to_string(), "V".to_string())]);

    assert!(matches!(
        entry.rescale(&units),
        Err(PackageError::Unit(UnitError::Incompatible { .. }))
    ));
}

#[test]
fn test_rescale_untagged_field() {
    let entry = Entry::from_csv_reader(Cursor::new(SAMPLE_CSV), "untagged", None, &[]).unwrap();
    let units = HashMap::from([("t".to_string(), "h".to_string())]);

    assert!(matches!(
        entry.rescale(&units),
        Err(PackageError::MissingUnit(_))
    ));
}

#[test]
fn test_rename_fields() {
    let entry = sample_entry();
    let names = HashMap::from([
        ("t".to_string(), "t_rel".to_string()),
        ("x".to_string(), "y".to_string()),
    ]);

    let renamed = entry.rename_fields(&names, Some("originalName")).unwrap();

    assert_eq!(
        renamed.frame().column_names(),
        vec!["t_rel", "E", "j"]
    );
    assert_eq!(renamed.field_unit("t_rel").unwrap(), "s");
    assert_eq!(
        renamed.schema().get_field("t_rel").unwrap().extra["originalName"],
        json!("t")
    );
}

#[test]
fn test_with_column() {
    let entry = sample_entry();

    let power: Vec<f64> = entry
        .frame()
        .column_f64("E")
        .unwrap()
        .iter()
        .zip(entry.frame().column_f64("j").unwrap())
        .map(|(e, j)| e * j)
        .collect();

    let extended = entry
        .with_column(power, Field::new("P/A").with_unit("A V / m2"))
        .unwrap();

    assert_eq!(extended.field_unit("P/A").unwrap(), "A V / m2");
    assert!((extended.frame().column_f64("P/A").unwrap()[0] - 0.102981).abs() < 1e-5);

    assert!(matches!(
        extended.with_column(vec![0.0; 3], Field::new("P/A")),
        Err(PackageError::DuplicateField(_))
    ));
}

#[test]
fn test_metadata_access() {
    let entry = sample_entry();

    assert_eq!(
        entry.citation_key(),
        Some("alves_2011_electrochemistry_6010")
    );
    assert!(entry.bibdata().unwrap().starts_with("@article{"));

    let temperature = entry
        .descriptor()
        .path("system.electrolyte.temperature")
        .unwrap()
        .as_quantity()
        .unwrap();
    assert_eq!(temperature.value(), 298.15);
}

#[test]
fn test_missing_bibliography() {
    let entry = Entry::from_csv_reader(Cursor::new(SAMPLE_CSV), "no_bibliography", None, &[])
        .unwrap();
    assert_eq!(entry.bibdata(), None);
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let entry = sample_entry();

    entry.save(dir.path(), None).unwrap();

    let json_path = dir
        .path()
        .join("alves_2011_electrochemistry_6010_f1a_solid.json");
    assert!(json_path.exists());
    assert!(dir
        .path()
        .join("alves_2011_electrochemistry_6010_f1a_solid.csv")
        .exists());

    let reloaded = Entry::from_local(&json_path).unwrap();

    assert_eq!(reloaded.identifier(), entry.identifier());
    assert_eq!(reloaded.schema(), entry.schema());
    assert_eq!(reloaded.metadata(), entry.metadata());
    assert_eq!(
        reloaded.frame().column_f64("j").unwrap(),
        entry.frame().column_f64("j").unwrap()
    );
}

#[test]
fn test_save_with_basename() {
    let dir = tempfile::tempdir().unwrap();
    let entry = sample_entry();

    entry.save(dir.path(), Some("renamed_basename")).unwrap();

    let reloaded = Entry::from_local(dir.path().join("renamed_basename.json")).unwrap();
    assert_eq!(reloaded.identifier(), "renamed_basename");
}

#[test]
fn test_from_local_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.csv"), "a,b\n1,2\n").unwrap();
    std::fs::write(
        dir.path().join("broken.json"),
        r#"{"resources": [{"name": "broken", "path": "broken.csv",
            "schema": {"fields": [{"name": "x"}, {"name": "y"}]}}]}"#,
    )
    .unwrap();

    assert!(matches!(
        Entry::from_local(dir.path().join("broken.json")),
        Err(PackageError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_unused_field_hint_is_not_an_error() {
    let hints = vec![
        Field::new("E").with_unit("mV"),
        Field::new("missing").with_unit("m"),
    ];
    let entry =
        Entry::from_csv_reader(Cursor::new(SAMPLE_CSV), "hints", None, &hints).unwrap();

    assert_eq!(entry.field_unit("E").unwrap(), "mV");
    assert!(!entry.schema().has_field("missing"));
}
