//! Physical constants used when translating material parameters into mx3
//! directives.

/// Magnetic constant (vacuum permeability) in H/m.
pub const MU0: f64 = 4.0e-7 * std::f64::consts::PI;

/// Gyromagnetic ratio (gamma0) in m/(A s).
pub const GAMMA0: f64 = 2.2127614e5;

/// Elementary charge in C.
pub const E_CHARGE: f64 = 1.6021766208e-19;

/// Bohr magneton in J/T.
pub const MU_B: f64 = 9.2740100783e-24;
