//! Driver tail of the script: table registration, evolver setup and the
//! minimize/relax/run directives.

use crate::consts::MU0;
use crate::drivers::Driver;
use crate::error::{Mumax3Error, Result};
use crate::system::System;

use super::fmt_num;

/// Filename of the current-density field loaded for Zhang-Li torque.
pub const J_FILENAME: &str = "j.ovf";

pub fn driver_script(driver: &Driver, system: &System) -> Result<String> {
    let mut mx3 = String::from("tableadd(E_total)\n");
    mx3 += "tableadd(dt)\n";
    mx3 += "tableadd(maxtorque)\n";

    match driver {
        Driver::Minimize(d) => {
            mx3 += &settings_lines(d.settings());
            mx3 += "minimize()\n\n";
            mx3 += "save(m_full)\n";
            mx3 += "tablesave()\n\n";
        }
        Driver::Relax(d) => {
            let alpha = system.damping_alpha().ok_or_else(|| {
                Mumax3Error::InvalidArguments("a damping term is needed to relax".to_string())
            })?;
            mx3 += &format!("alpha = {}\n", fmt_num(alpha));
            mx3 += &settings_lines(d.settings());
            mx3 += "relax()\n\n";
            mx3 += "save(m_full)\n";
            mx3 += "tablesave()\n\n";
        }
        Driver::TimeStep(d) => {
            // Absent dynamics terms become zero-valued directives; the
            // engine accepts a run without damping or precession.
            let alpha = system.damping_alpha().unwrap_or(0.0);
            mx3 += &format!("alpha = {}\n", fmt_num(alpha));
            let gamma0 = system.precession_gamma0().unwrap_or(0.0);
            if gamma0 == 0.0 {
                mx3 += "doprecess = false\n";
            } else {
                mx3 += &format!("gammaLL = {}\n", fmt_num(gamma0 / MU0));
                mx3 += "doprecess = true\n";
            }
            if let Some((_, beta)) = system.zhang_li() {
                // Current density and polarisation are folded into the
                // spatial J field; Pol stays 1.
                mx3 += &format!("Xi = {}\n", fmt_num(beta));
                mx3 += "Pol = 1\n";
                mx3 += &format!("J.add(\"{}\")\n", J_FILENAME);
            }
            mx3 += &settings_lines(d.settings());
            mx3 += "setsolver(5)\n";
            mx3 += "fixDt = 0\n\n";

            mx3 += &format!(
                "for snap_counter:=0; snap_counter<{}; snap_counter++{{\n",
                d.n
            );
            mx3 += &format!("    run({})\n", fmt_num(d.t / d.n as f64));
            mx3 += "    save(m_full)\n";
            mx3 += "    tablesave()\n";
            mx3 += "}\n";
        }
    }
    Ok(mx3)
}

fn settings_lines<'a>(settings: impl Iterator<Item = (&'a String, &'a f64)>) -> String {
    let mut mx3 = String::new();
    for (key, value) in settings {
        mx3 += &format!("{} = {}\n", key, fmt_num(*value));
    }
    mx3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{MinDriver, RelaxDriver, TimeDriver};
    use crate::dynamics::DynamicsTerm;
    use crate::field::Field;
    use crate::mesh::Mesh;

    fn system() -> System {
        let mesh = Mesh::new([0.0; 3], [1e-9, 1e-9, 1e-9], [1, 1, 1]).unwrap();
        let m = Field::uniform_vector(&mesh, [0.0, 0.0, 1.0]).set_norm(8e5);
        System::new("test", m)
    }

    #[test]
    fn test_minimize_tail() {
        let driver = Driver::Minimize(MinDriver::new());
        let mx3 = driver_script(&driver, &system()).unwrap();
        assert!(mx3.contains("tableadd(E_total)"));
        assert!(mx3.contains("minimize()\n"));
        assert!(mx3.contains("save(m_full)\ntablesave()"));
    }

    #[test]
    fn test_minimize_settings() {
        let driver = Driver::Minimize(
            MinDriver::new().with_setting("MinimizerStop", 1e-6).unwrap(),
        );
        let mx3 = driver_script(&driver, &system()).unwrap();
        assert!(mx3.contains("MinimizerStop = 1e-6\n"));
    }

    #[test]
    fn test_relax_needs_damping() {
        let driver = Driver::Relax(RelaxDriver::new());
        assert!(matches!(
            driver_script(&driver, &system()),
            Err(Mumax3Error::InvalidArguments(_))
        ));

        let s = system().with_dynamics(vec![DynamicsTerm::Damping { alpha: 0.5 }]);
        let mx3 = driver_script(&driver, &s).unwrap();
        assert!(mx3.contains("alpha = 0.5\n"));
        assert!(mx3.contains("relax()\n"));
    }

    #[test]
    fn test_time_without_dynamics_gets_zero_directives() {
        let driver = Driver::TimeStep(TimeDriver::new(1e-9, 10));
        let mx3 = driver_script(&driver, &system()).unwrap();
        assert!(mx3.contains("alpha = 0\n"));
        assert!(mx3.contains("doprecess = false\n"));
        assert!(mx3.contains("setsolver(5)\n"));
        assert!(mx3.contains("for snap_counter:=0; snap_counter<10; snap_counter++{\n"));
        assert!(mx3.contains("    run(1e-10)\n"));
    }

    #[test]
    fn test_time_with_zhang_li() {
        let driver = Driver::TimeStep(TimeDriver::new(1e-9, 4));
        let s = system().with_dynamics(vec![
            DynamicsTerm::Damping { alpha: 0.02 },
            DynamicsTerm::ZhangLi { u: 200.0, beta: 0.3 },
        ]);
        let mx3 = driver_script(&driver, &s).unwrap();
        assert!(mx3.contains("Xi = 0.3\n"));
        assert!(mx3.contains("Pol = 1\n"));
        assert!(mx3.contains("J.add(\"j.ovf\")\n"));

        // Without the torque term none of the directives appear.
        let mx3 = driver_script(&driver, &system()).unwrap();
        assert!(!mx3.contains("Xi = "));
        assert!(!mx3.contains("J.add"));
    }

    #[test]
    fn test_time_with_precession() {
        let driver = Driver::TimeStep(TimeDriver::new(1e-9, 4));
        let s = system().with_dynamics(vec![
            DynamicsTerm::Precession { gamma0: 2.211e5 },
            DynamicsTerm::Damping { alpha: 0.02 },
        ]);
        let mx3 = driver_script(&driver, &s).unwrap();
        assert!(mx3.contains("doprecess = true\n"));
        assert!(mx3.contains(&format!("gammaLL = {}\n", fmt_num(2.211e5 / MU0))));
        assert!(mx3.contains("alpha = 0.02\n"));
    }
}
