/// URL-style parameter queries (`?height=300&twist=45&rings=off`)
use nom::{
    bytes::complete::{tag, take_till, take_while1},
    combinator::{all_consuming, opt},
    multi::separated_list0,
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::{Error, Result};
use crate::params::{Partition, TowerSpec, WaistMode};

/// A tower parameter addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Height,
    BaseRadius,
    TopRadius,
    Sections,
    Struts,
    Rings,
    StrutRadius,
    ShowRings,
    Twist,
    Partition,
    AutoWaist,
    WaistRadius,
    WaistPosition,
}

impl Parameter {
    pub const ALL: [Parameter; 13] = [
        Parameter::Height,
        Parameter::BaseRadius,
        Parameter::TopRadius,
        Parameter::Sections,
        Parameter::Struts,
        Parameter::Rings,
        Parameter::StrutRadius,
        Parameter::ShowRings,
        Parameter::Twist,
        Parameter::Partition,
        Parameter::AutoWaist,
        Parameter::WaistRadius,
        Parameter::WaistPosition,
    ];

    /// Canonical query key.
    pub fn key(&self) -> &'static str {
        match self {
            Parameter::Height => "height",
            Parameter::BaseRadius => "baseRadius",
            Parameter::TopRadius => "topRadius",
            Parameter::Sections => "sections",
            Parameter::Struts => "struts",
            Parameter::Rings => "rings",
            Parameter::StrutRadius => "strutRadius",
            Parameter::ShowRings => "showRings",
            Parameter::Twist => "twist",
            Parameter::Partition => "partition",
            Parameter::AutoWaist => "autoWaist",
            Parameter::WaistRadius => "waistRadius",
            Parameter::WaistPosition => "waistPosition",
        }
    }

    /// Resolve a key, ignoring case, `_` and `-`, and accepting short aliases.
    pub fn lookup(key: &str) -> Option<Parameter> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let parameter = match normalized.as_str() {
            "height" | "h" => Parameter::Height,
            "baseradius" | "base" => Parameter::BaseRadius,
            "topradius" | "top" => Parameter::TopRadius,
            "sections" | "sectioncount" => Parameter::Sections,
            "struts" | "strutcount" => Parameter::Struts,
            "rings" | "ringcount" => Parameter::Rings,
            "strutradius" | "thickness" => Parameter::StrutRadius,
            "showrings" => Parameter::ShowRings,
            "twist" | "twistangle" => Parameter::Twist,
            "partition" | "weighted" => Parameter::Partition,
            "autowaist" => Parameter::AutoWaist,
            "waistradius" => Parameter::WaistRadius,
            "waistposition" => Parameter::WaistPosition,
            _ => return None,
        };
        Some(parameter)
    }
}

type Pair<'a> = (&'a str, Option<&'a str>);

fn key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

fn pair(input: &str) -> IResult<&str, Pair<'_>> {
    let (input, key) = key(input)?;
    let (input, value) = opt(preceded(tag("="), take_till(|c: char| c == '&')))(input)?;
    Ok((input, (key, value)))
}

fn pairs(input: &str) -> IResult<&str, Vec<Pair<'_>>> {
    preceded(
        opt(tag("?")),
        terminated(separated_list0(tag("&"), pair), opt(tag("&"))),
    )(input)
}

/// Tokenize a query into key/value pairs without interpreting them.
///
/// A key without `=` is a flag and yields `None` as its value.
pub fn parse_pairs(query: &str) -> Result<Vec<Pair<'_>>> {
    let query = query.trim();
    match all_consuming(pairs)(query) {
        Ok((_, pairs)) => Ok(pairs),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(Error::Query {
            position: query.len() - e.input.len(),
            message: format!("unexpected input `{}`", e.input),
        }),
        Err(nom::Err::Incomplete(_)) => Err(Error::Query {
            position: query.len(),
            message: "incomplete input".to_string(),
        }),
    }
}

fn invalid(key: &str, value: &str, expected: &'static str) -> Error {
    Error::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(invalid(key, value, "a boolean")),
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(key, value, "a number"))
}

fn parse_count(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid(key, value, "a non-negative integer"))
}

/// Set one parameter from its textual value.
pub fn apply_parameter(spec: &mut TowerSpec, parameter: Parameter, key: &str, value: &str) -> Result<()> {
    match parameter {
        Parameter::Height => spec.height = parse_number(key, value)?,
        Parameter::BaseRadius => spec.base_radius = parse_number(key, value)?,
        Parameter::TopRadius => spec.top_radius = parse_number(key, value)?,
        Parameter::Sections => spec.section_count = parse_count(key, value)?,
        Parameter::Struts => spec.strut_count = parse_count(key, value)?,
        Parameter::Rings => match parse_count(key, value) {
            Ok(count) => spec.ring_count = count,
            Err(_) => {
                spec.show_rings = parse_bool(key, value)
                    .map_err(|_| invalid(key, value, "a ring count or on/off"))?
            }
        },
        Parameter::StrutRadius => spec.strut_radius = parse_number(key, value)?,
        Parameter::ShowRings => spec.show_rings = parse_bool(key, value)?,
        Parameter::Twist => spec.twist_degrees = parse_number(key, value)?,
        Parameter::Partition => {
            spec.partition = match value.to_ascii_lowercase().as_str() {
                "uniform" | "false" | "0" => Partition::Uniform,
                "weighted" | "true" | "1" => Partition::Weighted,
                _ => return Err(invalid(key, value, "`uniform` or `weighted`")),
            }
        }
        Parameter::AutoWaist => {
            if parse_bool(key, value)? {
                spec.waist = WaistMode::Auto;
            } else {
                let (position, radius) = spec.manual_waist();
                spec.waist = WaistMode::Manual { position, radius };
            }
        }
        Parameter::WaistRadius => {
            let radius = parse_number(key, value)?;
            let (position, _) = spec.manual_waist();
            spec.waist = WaistMode::Manual { position, radius };
        }
        Parameter::WaistPosition => {
            let position = parse_number(key, value)?;
            let (_, radius) = spec.manual_waist();
            spec.waist = WaistMode::Manual { position, radius };
        }
    }
    Ok(())
}

fn apply(base: &TowerSpec, query: &str, strict: bool) -> Result<TowerSpec> {
    let mut spec = *base;

    for (key, value) in parse_pairs(query)? {
        let value = value.unwrap_or("true");
        let outcome = match Parameter::lookup(key) {
            Some(parameter) => apply_parameter(&mut spec, parameter, key, value),
            None => Err(Error::UnknownParameter(key.to_string())),
        };
        match outcome {
            Ok(()) => {}
            Err(e) if strict => return Err(e),
            Err(e) => tracing::warn!(%e, "ignoring query parameter"),
        }
    }

    let sanitized = spec.sanitized();
    if sanitized != spec {
        tracing::warn!("query parameters clamped into the valid range");
    }
    Ok(sanitized)
}

/// Overlay a query on `base`, rejecting unknown keys and bad values.
pub fn apply_query(base: &TowerSpec, query: &str) -> Result<TowerSpec> {
    apply(base, query, true)
}

/// Overlay a query on `base`, skipping unknown keys and bad values with a warning.
///
/// Malformed syntax is still an error.
pub fn apply_query_lenient(base: &TowerSpec, query: &str) -> Result<TowerSpec> {
    apply(base, query, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs("?height=300&showRings&twist=-12.5").unwrap();
        assert_eq!(
            pairs,
            vec![("height", Some("300")), ("showRings", None), ("twist", Some("-12.5"))]
        );
    }

    #[test]
    fn test_parse_empty_and_trailing() {
        assert!(parse_pairs("").unwrap().is_empty());
        assert!(parse_pairs("?").unwrap().is_empty());
        assert_eq!(parse_pairs("struts=12&").unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_query_reports_position() {
        let err = parse_pairs("height=3&&twist=4").unwrap_err();
        match err {
            Error::Query { position, .. } => assert_eq!(position, 9),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_apply_query() {
        let spec = apply_query(
            &TowerSpec::default(),
            "height=120&base=40&top_radius=8&sections=3&struts=16&rings=off&twist=30&partition=uniform",
        )
        .unwrap();
        assert_eq!(spec.height, 120.0);
        assert_eq!(spec.base_radius, 40.0);
        assert_eq!(spec.top_radius, 8.0);
        assert_eq!(spec.section_count, 3);
        assert_eq!(spec.strut_count, 16);
        assert!(!spec.show_rings);
        assert_eq!(spec.twist_degrees, 30.0);
        assert_eq!(spec.partition, Partition::Uniform);
    }

    #[test]
    fn test_rings_accepts_count() {
        let spec = apply_query(&TowerSpec::default(), "rings=12").unwrap();
        assert_eq!(spec.ring_count, 12);
        assert!(spec.show_rings);
    }

    #[test]
    fn test_waist_keys_switch_to_manual() {
        let spec = apply_query(&TowerSpec::default(), "waistRadius=9&waistPosition=0.4").unwrap();
        assert_eq!(
            spec.waist,
            WaistMode::Manual {
                position: 0.4,
                radius: 9.0
            }
        );

        let spec = apply_query(&spec, "autoWaist=true").unwrap();
        assert!(spec.waist.is_auto());
    }

    #[test]
    fn test_auto_waist_off_keeps_taper() {
        let base = TowerSpec::default();
        let spec = apply_query(&base, "autoWaist=false").unwrap();
        let (position, radius) = base.manual_waist();
        assert_eq!(spec.waist, WaistMode::Manual { position, radius });
    }

    #[test]
    fn test_huge_counts_are_capped() {
        let spec = apply_query(&TowerSpec::default(), "sections=4000000000&struts=99999").unwrap();
        assert_eq!(spec.section_count, crate::params::MAX_COUNT);
        assert_eq!(spec.strut_count, crate::params::MAX_COUNT);
    }

    #[test]
    fn test_strict_rejects_unknown_key() {
        let err = apply_query(&TowerSpec::default(), "colour=red").unwrap_err();
        assert!(matches!(err, Error::UnknownParameter(key) if key == "colour"));
    }

    #[test]
    fn test_strict_rejects_bad_value() {
        let err = apply_query(&TowerSpec::default(), "sections=many").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_lenient_skips_bad_entries() {
        let spec = apply_query_lenient(&TowerSpec::default(), "colour=red&sections=many&struts=8").unwrap();
        assert_eq!(spec.section_count, 6);
        assert_eq!(spec.strut_count, 8);
    }

    #[test]
    fn test_query_is_sanitized() {
        let spec = apply_query(&TowerSpec::default(), "sections=0&height=-1").unwrap();
        assert_eq!(spec.section_count, 1);
        assert!(spec.height > 0.0);
    }

    #[test]
    fn test_every_parameter_key_round_trips() {
        for parameter in Parameter::ALL {
            assert_eq!(Parameter::lookup(parameter.key()), Some(parameter));
        }
    }
}
