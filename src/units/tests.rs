use super::*;
use proptest::prelude::*;

fn factor(from: &str, to: &str) -> f64 {
    conversion_factor(from, to).unwrap()
}

#[test]
fn test_parse_base_units() {
    assert_eq!(Unit::parse("V").unwrap().si_factor(), 1.0);
    assert_eq!(Unit::parse("s").unwrap().si_factor(), 1.0);
    assert_eq!(Unit::parse("h").unwrap().si_factor(), 3600.0);
    assert_eq!(Unit::parse("min").unwrap().si_factor(), 60.0);
}

#[test]
fn test_parse_prefixes() {
    assert!((Unit::parse("mV").unwrap().si_factor() - 1e-3).abs() < 1e-18);
    assert!((Unit::parse("uA").unwrap().si_factor() - 1e-6).abs() < 1e-18);
    assert!((Unit::parse("µA").unwrap().si_factor() - 1e-6).abs() < 1e-18);
    assert!((Unit::parse("kg").unwrap().si_factor() - 1.0).abs() < 1e-12);
}

#[test]
fn test_exact_symbol_beats_prefix() {
    // `min` is minutes, not milli-inch; `cd` is candela, not centi-day.
    assert_eq!(Unit::parse("min").unwrap().dimension().time, 1);
    assert_eq!(Unit::parse("cd").unwrap().dimension().luminosity, 1);
    // A lone `h` is the hour, not the hecto prefix.
    assert_eq!(Unit::parse("h").unwrap().si_factor(), 3600.0);
    // `T` is the tesla, `TOhm` the tera-ohm.
    assert_eq!(Unit::parse("T").unwrap().dimension().mass, 1);
    assert!((Unit::parse("TOhm").unwrap().si_factor() - 1e12).abs() < 1.0);
}

#[test]
fn test_parse_exponents() {
    assert_eq!(Unit::parse("m2").unwrap().dimension().length, 2);
    assert_eq!(Unit::parse("m^2").unwrap().dimension().length, 2);
    assert_eq!(Unit::parse("s-1").unwrap().dimension().time, -1);
    assert_eq!(Unit::parse("s^-1").unwrap().dimension().time, -1);
    assert!((Unit::parse("cm2").unwrap().si_factor() - 1e-4).abs() < 1e-18);
}

#[test]
fn test_parse_products_and_quotients() {
    let charge = Unit::parse("mA h").unwrap();
    assert!((charge.si_factor() - 3.6).abs() < 1e-12);
    assert!(charge.is_compatible(&Unit::parse("C").unwrap()));

    let density = Unit::parse("A / m2").unwrap();
    assert_eq!(density.dimension().current, 1);
    assert_eq!(density.dimension().length, -2);

    assert!(Unit::parse("1 / s")
        .unwrap()
        .is_compatible(&Unit::parse("Hz").unwrap()));
    assert!(Unit::parse("W h")
        .unwrap()
        .is_compatible(&Unit::parse("J").unwrap()));
}

#[test]
fn test_current_density_rescaling_factor() {
    // The canonical rescale in published entries: A/m2 -> uA/cm2.
    assert!((factor("A / m2", "uA / cm2") - 100.0).abs() < 1e-9);
    assert!((factor("uA / cm2", "A / m2") - 0.01).abs() < 1e-12);
    assert!((factor("s", "h") - 1.0 / 3600.0).abs() < 1e-15);
    assert!((factor("mA h", "C") - 3.6).abs() < 1e-12);
}

#[test]
fn test_incompatible_dimensions() {
    let err = conversion_factor("V", "s").unwrap_err();
    assert!(matches!(err, UnitError::Incompatible { .. }));
    assert!(err.to_string().contains("'V'"));
}

#[test]
fn test_unknown_unit() {
    assert!(matches!(
        Unit::parse("furlong").unwrap_err(),
        UnitError::UnknownUnit(_)
    ));
    assert!(matches!(
        Unit::parse("A //"),
        Err(UnitError::Malformed(_))
    ));
}

#[test]
fn test_dimensionless() {
    assert_eq!(
        Unit::parse("").unwrap().dimension(),
        Dimension::DIMENSIONLESS
    );
    assert!((factor("%", "1") - 0.01).abs() < 1e-15);
}

#[test]
fn test_quantity_conversion() {
    let volume = Quantity::new(1.0, "L").unwrap();
    let converted = volume.to("m^3").unwrap();
    assert!((converted.value() - 0.001).abs() < 1e-15);
    assert_eq!(converted.unit(), "m^3");
    assert_eq!(format!("{}", volume), "1 L");
}

#[test]
fn test_quantity_display() {
    let temperature = Quantity::new(298.15, "K").unwrap();
    assert_eq!(format!("{}", temperature), "298.15 K");
}

proptest! {
    #[test]
    fn prop_prefix_scaling_is_consistent(
        prefix in prop::sample::select(vec!["k", "m", "u", "n", "c", "M", "G"]),
        symbol in prop::sample::select(vec!["V", "A", "W", "J", "Pa", "mol"]),
    ) {
        let scale = PREFIXES
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, s)| *s)
            .unwrap();

        let factor = conversion_factor(&format!("{prefix}{symbol}"), symbol).unwrap();
        prop_assert!((factor - scale).abs() <= scale * 1e-12);
    }

    #[test]
    fn prop_conversion_round_trips(
        from in prop::sample::select(vec!["s", "min", "h", "mA h", "uA / cm2", "mV", "bar"]),
        to in prop::sample::select(vec!["s", "min", "h", "mA h", "uA / cm2", "mV", "bar"]),
    ) {
        let source = Unit::parse(from).unwrap();
        let target = Unit::parse(to).unwrap();

        prop_assume!(source.is_compatible(&target));

        let forward = conversion_factor(from, to).unwrap();
        let back = conversion_factor(to, from).unwrap();
        prop_assert!((forward * back - 1.0).abs() < 1e-12);
    }
}
