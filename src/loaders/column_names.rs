//! Known instrument column names and their field annotations.
//!
//! BioLogic EC-Lab and similar potentiostats write column headers such as
//! `Ewe/V` or `<I>/mA`. When a loader recognizes one of these, the produced
//! field gets its unit, dimension, and description filled in automatically.

use serde_json::Value;

use crate::schema::Field;

struct KnownColumn {
    name: &'static str,
    unit: &'static str,
    dimension: &'static str,
    description: &'static str,
}

const KNOWN_COLUMNS: &[KnownColumn] = &[
    KnownColumn { name: "time/s", unit: "s", dimension: "t", description: "relative time" },
    KnownColumn { name: "Ewe/V", unit: "V", dimension: "E", description: "voltage of WE vs. REF" },
    KnownColumn { name: "<Ewe>/V", unit: "V", dimension: "E", description: "averaged voltage (WE vs. REF)" },
    KnownColumn { name: "Ece/V", unit: "V", dimension: "E", description: "potential of CE versus REF" },
    KnownColumn { name: "<Ece>/V", unit: "V", dimension: "E", description: "averaged potential of CE versus REF" },
    KnownColumn { name: "I/mA", unit: "mA", dimension: "I", description: "current" },
    KnownColumn { name: "<I>/mA", unit: "mA", dimension: "I", description: "average current over the potential step" },
    KnownColumn { name: "|I|/A", unit: "A", dimension: "I", description: "module of I" },
    KnownColumn { name: "control/V", unit: "V", dimension: "E", description: "control voltage" },
    KnownColumn { name: "(Q-Qo)/C", unit: "C", dimension: "Q", description: "charge from the beginning of the experiment" },
    KnownColumn { name: "(Q-Qo)/mA.h", unit: "mA h", dimension: "Q", description: "charge from the beginning of the experiment" },
    KnownColumn { name: "|Ewe|/V", unit: "V", dimension: "E", description: "module of Ewe" },
    KnownColumn { name: "|Ece|/V", unit: "V", dimension: "E", description: "module of Ece" },
    KnownColumn { name: "|Energy|/W.h", unit: "W h", dimension: "E", description: "module of Energy" },
    KnownColumn { name: "|Z|/Ohm", unit: "Ohm", dimension: "|Z|", description: "impedance magnitude" },
    KnownColumn { name: "-Im(Z)/Ohm", unit: "Ohm", dimension: "-Im(Z)", description: "-imaginary part of Z" },
    KnownColumn { name: "Re(Z)/Ohm", unit: "Ohm", dimension: "Re(Z)", description: "real part of Z" },
    KnownColumn { name: "Ri/Ohm", unit: "Ohm", dimension: "R", description: "apparent resistance" },
    KnownColumn { name: "|Y|/Ohm-1", unit: "S", dimension: "|Y|", description: "admittance magnitude" },
    KnownColumn { name: "P/W", unit: "W", dimension: "P", description: "power" },
];

/// The annotated field for a recognized instrument column name
pub fn known_field(name: &str) -> Option<Field> {
    KNOWN_COLUMNS.iter().find(|c| c.name == name).map(|column| {
        let mut field = Field::new(column.name)
            .with_unit(column.unit)
            .with_description(column.description);
        field.extra.insert(
            "dimension".to_string(),
            Value::String(column.dimension.to_string()),
        );
        field
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_field_lookup() {
        let field = known_field("<I>/mA").unwrap();
        assert_eq!(field.unit.as_deref(), Some("mA"));
        assert_eq!(field.extra["dimension"], "I");

        assert!(known_field("unknown column").is_none());
    }

    #[test]
    fn test_known_units_parse() {
        for column in KNOWN_COLUMNS {
            assert!(
                crate::units::Unit::parse(column.unit).is_ok(),
                "unit '{}' of column '{}' does not parse",
                column.unit,
                column.name
            );
        }
    }
}
