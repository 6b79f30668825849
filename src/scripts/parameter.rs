//! Material parameter assignment directives.

use std::collections::HashMap;

use crate::energy::{ParamValue, Parameter};
use crate::error::{Mumax3Error, Result};

use super::fmt_num;

/// Parameters that support pairwise inter-region directives, with the
/// engine function that sets them.
const INTER_PARAMS: &[(&str, &str)] = &[
    ("Aex", "ext_InterExchange"),
    ("Dbulk", "ext_InterDbulk"),
    ("Dind", "ext_InterDind"),
];

/// Emits the assignment directives for one material parameter.
///
/// Constants become a single unconditional assignment. Subregion-keyed
/// values become one `setregion` directive per engine region the subregion
/// was decomposed into (`relator` is the name-to-labels mapping produced by
/// the region transform). A `"default"` key leads with an unconditional
/// assignment; an `"a:b"` key emits one pairwise directive per cross-region
/// pair and is only supported for a small set of parameters.
pub fn set_parameter(
    parameter: &Parameter,
    name: &str,
    relator: &HashMap<String, Vec<u8>>,
) -> Result<String> {
    let mut mx3 = String::new();
    match parameter {
        Parameter::Scalar(v) => {
            mx3 += &format!("{} = {}\n", name, fmt_num(*v));
        }
        Parameter::Vector(v) => {
            mx3 += &format!("{} = {}\n", name, vector(*v));
        }
        Parameter::PerSubregion(map) => {
            if let Some(value) = map.get("default") {
                mx3 += &match value {
                    ParamValue::Scalar(v) => format!("{} = {}\n", name, fmt_num(*v)),
                    ParamValue::Vector(v) => format!("{} = {}\n", name, vector(*v)),
                };
            }
            for (key, value) in map {
                if key == "default" {
                    continue;
                }
                if let Some((first, second)) = key.split_once(':') {
                    mx3 += &interaction(name, first, second, value, relator)?;
                } else {
                    let labels = relator.get(key).ok_or_else(|| {
                        Mumax3Error::InvalidArguments(format!(
                            "unknown subregion {key:?} for parameter {name}"
                        ))
                    })?;
                    for &label in labels {
                        mx3 += &match value {
                            ParamValue::Scalar(v) => {
                                format!("{}.setregion({}, {})\n", name, label, fmt_num(*v))
                            }
                            ParamValue::Vector(v) => {
                                format!("{}.setregion({}, {})\n", name, label, vector(*v))
                            }
                        };
                    }
                }
            }
        }
    }
    Ok(mx3)
}

fn interaction(
    name: &str,
    first: &str,
    second: &str,
    value: &ParamValue,
    relator: &HashMap<String, Vec<u8>>,
) -> Result<String> {
    let directive = INTER_PARAMS
        .iter()
        .find(|(param, _)| *param == name)
        .map(|(_, directive)| *directive)
        .ok_or_else(|| Mumax3Error::UnsupportedParameter {
            name: name.to_string(),
            reason: format!(
                "interaction key {first:?}:{second:?} is only supported for Aex, Dbulk and Dind"
            ),
        })?;
    let ParamValue::Scalar(v) = value else {
        return Err(Mumax3Error::UnsupportedParameter {
            name: name.to_string(),
            reason: "interaction values must be scalar".to_string(),
        });
    };
    let lookup = |key: &str| {
        relator.get(key).ok_or_else(|| {
            Mumax3Error::InvalidArguments(format!(
                "unknown subregion {key:?} for parameter {name}"
            ))
        })
    };
    let mut mx3 = String::new();
    for &r1 in lookup(first)? {
        for &r2 in lookup(second)? {
            mx3 += &format!("{}({}, {}, {})\n", directive, r1, r2, fmt_num(*v));
        }
    }
    Ok(mx3)
}

fn vector(v: [f64; 3]) -> String {
    format!(
        "vector({}, {}, {})",
        fmt_num(v[0]),
        fmt_num(v[1]),
        fmt_num(v[2])
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relator() -> HashMap<String, Vec<u8>> {
        let mut r = HashMap::new();
        r.insert(String::new(), vec![]);
        r.insert("r1".to_string(), vec![0, 1]);
        r.insert("r2".to_string(), vec![2]);
        r
    }

    #[test]
    fn test_scalar_and_vector() {
        let r = relator();
        assert_eq!(
            set_parameter(&Parameter::Scalar(1e-12), "Aex", &r).unwrap(),
            "Aex = 1e-12\n"
        );
        assert_eq!(
            set_parameter(&Parameter::Vector([0.0, 0.0, 0.1]), "B_ext", &r).unwrap(),
            "B_ext = vector(0, 0, 0.1)\n"
        );
    }

    #[test]
    fn test_per_subregion() {
        let r = relator();
        let p = Parameter::per_subregion([("r1", 1e-12), ("r2", 2e-12)]);
        let mx3 = set_parameter(&p, "Aex", &r).unwrap();
        assert_eq!(
            mx3,
            "Aex.setregion(0, 1e-12)\nAex.setregion(1, 1e-12)\nAex.setregion(2, 2e-12)\n"
        );
    }

    #[test]
    fn test_default_entry_leads() {
        let r = relator();
        let p = Parameter::per_subregion([("default", 1e-12), ("r2", 2e-12)]);
        let mx3 = set_parameter(&p, "Aex", &r).unwrap();
        assert_eq!(mx3, "Aex = 1e-12\nAex.setregion(2, 2e-12)\n");
    }

    #[test]
    fn test_interaction_pairs() {
        let r = relator();
        let p = Parameter::per_subregion([("r1:r2", 5e-13)]);
        let mx3 = set_parameter(&p, "Aex", &r).unwrap();
        assert_eq!(
            mx3,
            "ext_InterExchange(0, 2, 5e-13)\next_InterExchange(1, 2, 5e-13)\n"
        );
    }

    #[test]
    fn test_interaction_disallowed_parameter() {
        let r = relator();
        let p = Parameter::per_subregion([("r1:r2", 1e5)]);
        let err = set_parameter(&p, "Ku1", &r).unwrap_err();
        assert!(matches!(err, Mumax3Error::UnsupportedParameter { .. }));
    }

    #[test]
    fn test_interaction_vector_rejected() {
        let r = relator();
        let p = Parameter::per_subregion([("r1:r2", [1.0, 0.0, 0.0])]);
        assert!(matches!(
            set_parameter(&p, "Dind", &r),
            Err(Mumax3Error::UnsupportedParameter { .. })
        ));
    }

    #[test]
    fn test_unknown_subregion() {
        let r = relator();
        let p = Parameter::per_subregion([("nope", 1.0)]);
        assert!(matches!(
            set_parameter(&p, "Aex", &r),
            Err(Mumax3Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_vector_setregion() {
        let r = relator();
        let p = Parameter::per_subregion([("r2", [0.0, 1.0, 0.0])]);
        let mx3 = set_parameter(&p, "anisU", &r).unwrap();
        assert_eq!(mx3, "anisU.setregion(2, vector(0, 1, 0))\n");
    }
}
