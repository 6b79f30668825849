//! Dynamics equation terms.

/// Term of the dynamics (LLG) equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DynamicsTerm {
    /// Precession with gyromagnetic ratio `gamma0` in m/(A s).
    Precession { gamma0: f64 },
    /// Gilbert damping with dimensionless `alpha`.
    Damping { alpha: f64 },
    /// Zhang-Li spin-transfer torque: electron velocity `u` in m/s (current
    /// flowing along x) and dimensionless non-adiabaticity `beta`.
    ZhangLi { u: f64, beta: f64 },
}

impl DynamicsTerm {
    pub fn kind(&self) -> &'static str {
        match self {
            DynamicsTerm::Precession { .. } => "Precession",
            DynamicsTerm::Damping { .. } => "Damping",
            DynamicsTerm::ZhangLi { .. } => "ZhangLi",
        }
    }
}
