//! Micromagnetic system: name, magnetisation, energy and dynamics terms.

use std::path::{Path, PathBuf};

use crate::dynamics::DynamicsTerm;
use crate::energy::EnergyTerm;
use crate::error::{Mumax3Error, Result};
use crate::field::Field;

/// A micromagnetic system to be driven by the engine.
///
/// The system owns its working directory `<base>/<name>`; each successful
/// drive creates one `drive-<n>` subdirectory and increments `drive_number`.
#[derive(Debug, Clone)]
pub struct System {
    pub name: String,
    /// Magnetisation field; its per-cell norm is the saturation
    /// magnetisation.
    pub m: Field,
    pub energy: Vec<EnergyTerm>,
    pub dynamics: Vec<DynamicsTerm>,
    /// Incremented only after a successful engine invocation.
    pub drive_number: usize,
}

impl System {
    pub fn new(name: &str, m: Field) -> Self {
        Self {
            name: name.to_string(),
            m,
            energy: Vec::new(),
            dynamics: Vec::new(),
            drive_number: 0,
        }
    }

    pub fn with_energy(mut self, energy: Vec<EnergyTerm>) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_dynamics(mut self, dynamics: Vec<DynamicsTerm>) -> Self {
        self.dynamics = dynamics;
        self
    }

    /// Gilbert damping constant, if a damping term is present.
    pub fn damping_alpha(&self) -> Option<f64> {
        self.dynamics.iter().find_map(|t| match t {
            DynamicsTerm::Damping { alpha } => Some(*alpha),
            _ => None,
        })
    }

    /// Gyromagnetic ratio, if a precession term is present.
    pub fn precession_gamma0(&self) -> Option<f64> {
        self.dynamics.iter().find_map(|t| match t {
            DynamicsTerm::Precession { gamma0 } => Some(*gamma0),
            _ => None,
        })
    }

    /// Zhang-Li `(u, beta)` pair, if a spin-transfer torque term is present.
    pub fn zhang_li(&self) -> Option<(f64, f64)> {
        self.dynamics.iter().find_map(|t| match t {
            DynamicsTerm::ZhangLi { u, beta } => Some((*u, *beta)),
            _ => None,
        })
    }

    /// Directory holding all drives of this system.
    pub fn dirname(&self, base: &Path) -> PathBuf {
        base.join(&self.name)
    }
}

/// Deletes all files of a system: the whole `<base>/<name>` directory tree.
///
/// Cleanup after a failed run is the caller's responsibility; this is the
/// operation to do it with.
pub fn delete(system: &System, base: &Path) -> Result<()> {
    let dirname = system.dirname(base);
    if !dirname.exists() {
        return Err(Mumax3Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("directory {} does not exist", dirname.display()),
        )));
    }
    std::fs::remove_dir_all(&dirname)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use tempfile::tempdir;

    fn system() -> System {
        let mesh = Mesh::new([0.0; 3], [1e-9, 1e-9, 1e-9], [1, 1, 1]).unwrap();
        let m = Field::uniform_vector(&mesh, [0.0, 0.0, 1.0]).set_norm(8e5);
        System::new("test_system", m)
    }

    #[test]
    fn test_dynamics_lookup() {
        let s = system().with_dynamics(vec![
            DynamicsTerm::Precession { gamma0: 2.211e5 },
            DynamicsTerm::Damping { alpha: 0.02 },
        ]);
        assert_eq!(s.damping_alpha(), Some(0.02));
        assert_eq!(s.precession_gamma0(), Some(2.211e5));
        assert_eq!(system().damping_alpha(), None);
    }

    #[test]
    fn test_delete() {
        let base = tempdir().unwrap();
        let s = system();
        // Missing directory is an error.
        assert!(delete(&s, base.path()).is_err());

        let dir = s.dirname(base.path()).join("drive-0");
        std::fs::create_dir_all(&dir).unwrap();
        delete(&s, base.path()).unwrap();
        assert!(!s.dirname(base.path()).exists());
    }
}
