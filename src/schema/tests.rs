use super::*;

fn sample_schema() -> Schema {
    Schema::new(vec![
        Field::new("t").with_unit("s"),
        Field::new("E").with_unit("V").with_reference("RHE"),
        Field::new("j").with_unit("A / m2"),
    ])
}

#[test]
fn test_field_lookup() {
    let schema = sample_schema();

    assert_eq!(schema.field_names(), vec!["t", "E", "j"]);
    assert_eq!(schema.get_field("E").unwrap().unit.as_deref(), Some("V"));
    assert_eq!(
        schema.get_field("E").unwrap().reference.as_deref(),
        Some("RHE")
    );
    assert!(schema.get_field("x").is_none());
}

#[test]
fn test_update_unit() {
    let mut schema = sample_schema();

    assert!(schema.update_unit("j", "uA / cm2"));
    assert_eq!(
        schema.get_field("j").unwrap().unit.as_deref(),
        Some("uA / cm2")
    );
    assert!(!schema.update_unit("missing", "V"));
}

#[test]
fn test_merge_hints_reports_unused() {
    let mut schema = Schema::new(vec![Field::new("E"), Field::new("I")]);
    let hints = vec![
        Field::new("E").with_unit("mV"),
        Field::new("x").with_unit("m"),
    ];

    let unused = schema.merge_hints(&hints);

    assert_eq!(unused, vec!["x".to_string()]);
    assert_eq!(schema.get_field("E").unwrap().unit.as_deref(), Some("mV"));
    assert_eq!(schema.get_field("I").unwrap().unit, None);
}

#[test]
fn test_merge_hints_keeps_existing_unit() {
    let mut schema = Schema::new(vec![Field::new("E").with_unit("V")]);
    let hints = vec![Field::new("E").with_unit("mV")];

    schema.merge_hints(&hints);

    assert_eq!(schema.get_field("E").unwrap().unit.as_deref(), Some("V"));
}

#[test]
fn test_rename_fields_keeps_original_name() {
    let mut schema = sample_schema();
    let names = HashMap::from([
        ("t".to_string(), "t_rel".to_string()),
        ("x".to_string(), "y".to_string()),
    ]);

    let unused = schema.rename_fields(&names, Some("originalName"));

    assert_eq!(unused, vec!["x".to_string()]);
    assert_eq!(schema.field_names(), vec!["t_rel", "E", "j"]);
    assert_eq!(
        schema.get_field("t_rel").unwrap().extra["originalName"],
        Value::String("t".to_string())
    );
}

#[test]
fn test_descriptor_round_trip() {
    let json = r#"{"fields": [
        {"name": "t", "type": "number", "unit": "s"},
        {"name": "E", "type": "number", "unit": "V", "reference": "RHE"},
        {"name": "cycle", "type": "integer", "dimension": "n"}
    ]}"#;

    let schema: Schema = serde_json::from_str(json).unwrap();

    assert_eq!(schema.fields.len(), 3);
    assert_eq!(schema.get_field("cycle").unwrap().field_type, FieldType::Integer);
    assert_eq!(
        schema.get_field("cycle").unwrap().extra["dimension"],
        Value::String("n".to_string())
    );

    let serialized = serde_json::to_value(&schema).unwrap();
    let restored: Schema = serde_json::from_value(serialized).unwrap();
    assert_eq!(restored, schema);
}
