//! Energy terms and material parameters.
//!
//! Every term the engine can express is a variant of [`EnergyTerm`], so the
//! script generators can match exhaustively instead of dispatching on names.
//! Material parameters are either spatially constant (scalar or vector) or
//! keyed by subregion name; the subregion map may also hold a `"default"`
//! entry and `"a:b"` interaction keys.

use std::collections::BTreeMap;

/// A single scalar or vector parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    Vector([f64; 3]),
}

impl ParamValue {
    fn scaled(self, factor: f64) -> Self {
        match self {
            ParamValue::Scalar(v) => ParamValue::Scalar(v * factor),
            ParamValue::Vector([x, y, z]) => {
                ParamValue::Vector([x * factor, y * factor, z * factor])
            }
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<[f64; 3]> for ParamValue {
    fn from(v: [f64; 3]) -> Self {
        ParamValue::Vector(v)
    }
}

/// A material parameter: constant or keyed by subregion.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Scalar(f64),
    Vector([f64; 3]),
    /// Values keyed by subregion name, `"default"` or `"a:b"` interaction
    /// keys. A `BTreeMap` keeps the emitted directives deterministic.
    PerSubregion(BTreeMap<String, ParamValue>),
}

impl Parameter {
    /// Builds a per-subregion parameter from `(name, value)` pairs.
    pub fn per_subregion<V: Into<ParamValue>>(
        entries: impl IntoIterator<Item = (&'static str, V)>,
    ) -> Self {
        Parameter::PerSubregion(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }

    /// Multiplies every value by `factor` (used for the H -> B conversion).
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Parameter::Scalar(v) => Parameter::Scalar(v * factor),
            Parameter::Vector([x, y, z]) => {
                Parameter::Vector([x * factor, y * factor, z * factor])
            }
            Parameter::PerSubregion(map) => Parameter::PerSubregion(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.scaled(factor)))
                    .collect(),
            ),
        }
    }
}

impl From<f64> for Parameter {
    fn from(v: f64) -> Self {
        Parameter::Scalar(v)
    }
}

impl From<[f64; 3]> for Parameter {
    fn from(v: [f64; 3]) -> Self {
        Parameter::Vector(v)
    }
}

/// DMI crystallographic class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrystalClass {
    /// Bulk DMI (classes T and O); maps onto `Dbulk`.
    T,
    O,
    /// Interfacial DMI (class Cnv); maps onto `Dind` with a sign flip.
    Cnv,
}

/// Energy term of the micromagnetic system.
#[derive(Debug, Clone, PartialEq)]
pub enum EnergyTerm {
    /// Symmetric exchange with constant `a` (J/m).
    Exchange { a: Parameter },
    /// Demagnetisation. Carries no parameters; the engine computes it.
    Demag,
    /// External field `h` (A/m); converted to B on scripting.
    Zeeman { h: Parameter },
    /// Dzyaloshinskii-Moriya interaction.
    Dmi {
        d: Parameter,
        crystal_class: CrystalClass,
    },
    /// Uniaxial anisotropy with constant `k` (J/m^3) and axis `u`.
    UniaxialAnisotropy { k: Parameter, u: Parameter },
    /// Cubic anisotropy with constant `k` and axes `u1`, `u2`.
    CubicAnisotropy {
        k: Parameter,
        u1: Parameter,
        u2: Parameter,
    },
}

impl EnergyTerm {
    /// Short name used in error messages and duplicate detection.
    pub fn kind(&self) -> &'static str {
        match self {
            EnergyTerm::Exchange { .. } => "Exchange",
            EnergyTerm::Demag => "Demag",
            EnergyTerm::Zeeman { .. } => "Zeeman",
            EnergyTerm::Dmi { .. } => "DMI",
            EnergyTerm::UniaxialAnisotropy { .. } => "UniaxialAnisotropy",
            EnergyTerm::CubicAnisotropy { .. } => "CubicAnisotropy",
        }
    }
}
