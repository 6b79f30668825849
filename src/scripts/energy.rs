//! Energy term directives, one generator per variant.

use std::collections::HashMap;

use crate::consts::MU0;
use crate::energy::{CrystalClass, EnergyTerm, Parameter};
use crate::error::{Mumax3Error, Result};
use crate::system::System;

use super::set_parameter;

type Relator = HashMap<String, Vec<u8>>;

/// Emits the energy section of the script.
///
/// The engine allows at most one term of each kind except Zeeman, and
/// enables demagnetisation by default, so a missing Demag term is scripted
/// explicitly as `enabledemag = false`.
pub fn energy_script(system: &System, relator: &Relator) -> Result<String> {
    for term in &system.energy {
        let duplicates = system
            .energy
            .iter()
            .filter(|other| other.kind() == term.kind())
            .count();
        if duplicates > 1 && !matches!(term, EnergyTerm::Zeeman { .. }) {
            return Err(Mumax3Error::InvalidArguments(format!(
                "mumax3 does not allow more than one energy term of kind {}",
                term.kind()
            )));
        }
    }

    let mut mx3 = String::new();
    for term in &system.energy {
        match term {
            EnergyTerm::Exchange { a } => mx3 += &exchange_script(a, relator)?,
            EnergyTerm::Demag => mx3 += &demag_script(),
            EnergyTerm::Zeeman { .. } => {} // handled below
            EnergyTerm::Dmi { d, crystal_class } => {
                mx3 += &dmi_script(d, *crystal_class, system, relator)?
            }
            EnergyTerm::UniaxialAnisotropy { k, u } => {
                mx3 += &uniaxialanisotropy_script(k, u, relator)?
            }
            EnergyTerm::CubicAnisotropy { k, u1, u2 } => {
                mx3 += &cubicanisotropy_script(k, u1, u2, relator)?
            }
        }
    }

    let zeeman_terms: Vec<&Parameter> = system
        .energy
        .iter()
        .filter_map(|t| match t {
            EnergyTerm::Zeeman { h } => Some(h),
            _ => None,
        })
        .collect();
    if !zeeman_terms.is_empty() {
        for h in &zeeman_terms {
            mx3 += &zeeman_script(h, relator)?;
        }
        mx3 += "tableadd(E_Zeeman)\n";
    }

    if !system.energy.iter().any(|t| matches!(t, EnergyTerm::Demag)) {
        mx3 += "enabledemag = false\n\n";
    }
    Ok(mx3)
}

fn exchange_script(a: &Parameter, relator: &Relator) -> Result<String> {
    let mut mx3 = String::from("// Exchange energy\n");
    mx3 += &set_parameter(a, "Aex", relator)?;
    mx3 += "tableadd(E_exch)\n";
    Ok(mx3)
}

fn zeeman_script(h: &Parameter, relator: &Relator) -> Result<String> {
    // The engine takes B, not H.
    let b = h.scaled(MU0);
    let mut mx3 = String::from("// Zeeman\n");
    mx3 += &set_parameter(&b, "B_ext", relator)?;
    Ok(mx3)
}

fn demag_script() -> String {
    let mut mx3 = String::from("// Demag\n");
    mx3 += "enabledemag = true\n";
    mx3 += "tableadd(E_demag)\n";
    mx3
}

fn dmi_script(
    d: &Parameter,
    crystal_class: CrystalClass,
    system: &System,
    relator: &Relator,
) -> Result<String> {
    if !system
        .energy
        .iter()
        .any(|t| matches!(t, EnergyTerm::Exchange { .. }))
    {
        return Err(Mumax3Error::InvalidArguments(
            "in mumax3 DMI cannot be used without exchange; \
             define exchange with a negligible A value"
                .to_string(),
        ));
    }
    let (param_name, param_val) = match crystal_class {
        CrystalClass::T | CrystalClass::O => ("Dbulk", d.clone()),
        // Interfacial DMI has the opposite sign convention in the engine.
        CrystalClass::Cnv => ("Dind", d.scaled(-1.0)),
    };
    let mut mx3 = String::from("// DMI\n");
    mx3 += &set_parameter(&param_val, param_name, relator)?;
    // DMI energy is combined with exchange energy in the engine's table.
    Ok(mx3)
}

fn uniaxialanisotropy_script(k: &Parameter, u: &Parameter, relator: &Relator) -> Result<String> {
    let mut mx3 = String::from("// UniaxialAnisotropy\n");
    mx3 += &set_parameter(k, "Ku1", relator)?;
    mx3 += &set_parameter(u, "anisU", relator)?;
    mx3 += "tableadd(E_anis)\n";
    Ok(mx3)
}

fn cubicanisotropy_script(
    k: &Parameter,
    u1: &Parameter,
    u2: &Parameter,
    relator: &Relator,
) -> Result<String> {
    let mut mx3 = String::from("// CubicAnisotropy\n");
    mx3 += &set_parameter(k, "Kc1", relator)?;
    mx3 += &set_parameter(u1, "anisC1", relator)?;
    mx3 += &set_parameter(u2, "anisC2", relator)?;
    mx3 += "tableadd(E_anis)\n";
    Ok(mx3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::mesh::Mesh;

    fn system(energy: Vec<EnergyTerm>) -> System {
        let mesh = Mesh::new([0.0; 3], [1e-9, 1e-9, 1e-9], [1, 1, 1]).unwrap();
        let m = Field::uniform_vector(&mesh, [0.0, 0.0, 1.0]).set_norm(8e5);
        System::new("test", m).with_energy(energy)
    }

    fn relator() -> Relator {
        let mut r = HashMap::new();
        r.insert(String::new(), vec![0]);
        r
    }

    #[test]
    fn test_exchange_and_zeeman() {
        let s = system(vec![
            EnergyTerm::Exchange { a: 1e-12.into() },
            EnergyTerm::Zeeman {
                h: [0.0, 0.0, 1e6].into(),
            },
        ]);
        let mx3 = energy_script(&s, &relator()).unwrap();
        assert!(mx3.contains("Aex = 1e-12\n"));
        assert!(mx3.contains("tableadd(E_exch)"));
        // B = mu0 * H.
        let expected = format!("B_ext = vector(0, 0, {})\n", super::super::fmt_num(MU0 * 1e6));
        assert!(mx3.contains(&expected));
        assert!(mx3.contains("tableadd(E_Zeeman)"));
        assert!(mx3.contains("enabledemag = false"));
    }

    #[test]
    fn test_demag_enables_and_tables() {
        let s = system(vec![EnergyTerm::Demag]);
        let mx3 = energy_script(&s, &relator()).unwrap();
        assert!(mx3.contains("enabledemag = true"));
        assert!(mx3.contains("tableadd(E_demag)"));
        assert!(!mx3.contains("enabledemag = false"));
    }

    #[test]
    fn test_duplicate_terms_rejected() {
        let s = system(vec![
            EnergyTerm::Exchange { a: 1e-12.into() },
            EnergyTerm::Exchange { a: 2e-12.into() },
        ]);
        assert!(matches!(
            energy_script(&s, &relator()),
            Err(Mumax3Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_multiple_zeeman_allowed() {
        let s = system(vec![
            EnergyTerm::Zeeman {
                h: [0.0, 0.0, 1e6].into(),
            },
            EnergyTerm::Zeeman {
                h: [1e5, 0.0, 0.0].into(),
            },
        ]);
        let mx3 = energy_script(&s, &relator()).unwrap();
        assert_eq!(mx3.matches("// Zeeman").count(), 2);
        assert_eq!(mx3.matches("tableadd(E_Zeeman)").count(), 1);
    }

    #[test]
    fn test_dmi_requires_exchange() {
        let s = system(vec![EnergyTerm::Dmi {
            d: 1e-3.into(),
            crystal_class: CrystalClass::T,
        }]);
        assert!(matches!(
            energy_script(&s, &relator()),
            Err(Mumax3Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_dmi_sign_flip_for_interfacial() {
        let s = system(vec![
            EnergyTerm::Exchange { a: 1e-12.into() },
            EnergyTerm::Dmi {
                d: 1e-3.into(),
                crystal_class: CrystalClass::Cnv,
            },
        ]);
        let mx3 = energy_script(&s, &relator()).unwrap();
        assert!(mx3.contains("Dind = -0.001\n"));

        let s = system(vec![
            EnergyTerm::Exchange { a: 1e-12.into() },
            EnergyTerm::Dmi {
                d: 1e-3.into(),
                crystal_class: CrystalClass::O,
            },
        ]);
        let mx3 = energy_script(&s, &relator()).unwrap();
        assert!(mx3.contains("Dbulk = 0.001\n"));
    }

    #[test]
    fn test_anisotropy_scripts() {
        let s = system(vec![
            EnergyTerm::UniaxialAnisotropy {
                k: 1e5.into(),
                u: [0.0, 0.0, 1.0].into(),
            },
        ]);
        let mx3 = energy_script(&s, &relator()).unwrap();
        assert!(mx3.contains("Ku1 = 100000\n"));
        assert!(mx3.contains("anisU = vector(0, 0, 1)\n"));
        assert!(mx3.contains("tableadd(E_anis)"));
    }
}
