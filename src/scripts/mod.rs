//! mx3 script assembly.
//!
//! Every generator returns a plain `String` of line-oriented mx3 directives;
//! [`system_script`] concatenates mesh, magnetisation, region and energy
//! sections, and [`driver_script`] appends the driver tail. The emitted text
//! is what the engine parses, so the formatting here is deliberately stable.

mod driver;
mod energy;
mod magnetisation;
mod mesh;
mod parameter;
mod regions;
mod system;

pub use driver::{driver_script, J_FILENAME};
pub use energy::energy_script;
pub use magnetisation::{magnetisation_script, M0_FILENAME};
pub use mesh::mesh_script;
pub use parameter::set_parameter;
pub use regions::{mumax3_regions, RegionMap, REGIONS_FILENAME, VACUUM_REGION};
pub use system::{system_script, SystemScript};

/// Formats a number the way it appears in mx3 directives: plain decimal for
/// mid-range magnitudes, scientific notation otherwise.
pub(crate) fn fmt_num(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        let a = v.abs();
        if (1e-4..1e6).contains(&a) {
            format!("{}", v)
        } else {
            format!("{:e}", v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fmt_num;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(0.0), "0");
        assert_eq!(fmt_num(0.02), "0.02");
        assert_eq!(fmt_num(-1.5), "-1.5");
        assert_eq!(fmt_num(800000.0), "800000");
        assert_eq!(fmt_num(1e-12), "1e-12");
        assert_eq!(fmt_num(8e6), "8e6");
        assert_eq!(fmt_num(-2.5e-9), "-2.5e-9");
    }
}
