//! Finite-difference mesh description.
//!
//! A [`Mesh`] is a regular rectangular grid over an axis-aligned [`Region`].
//! Named subregions select cells geometrically; their declaration order is
//! significant because later-declared subregions take precedence where they
//! overlap.

use crate::error::{Mumax3Error, Result};

/// Axis-aligned box in space, defined by two corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub pmin: [f64; 3],
    pub pmax: [f64; 3],
}

impl Region {
    /// Creates a region from two corner points (in any order).
    pub fn new(p1: [f64; 3], p2: [f64; 3]) -> Self {
        let mut pmin = [0.0; 3];
        let mut pmax = [0.0; 3];
        for i in 0..3 {
            pmin[i] = p1[i].min(p2[i]);
            pmax[i] = p1[i].max(p2[i]);
        }
        Self { pmin, pmax }
    }

    /// Checks whether a point lies inside the region (boundaries included).
    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|i| p[i] >= self.pmin[i] && p[i] <= self.pmax[i])
    }

    /// Edge lengths along x, y, z.
    pub fn edges(&self) -> [f64; 3] {
        [
            self.pmax[0] - self.pmin[0],
            self.pmax[1] - self.pmin[1],
            self.pmax[2] - self.pmin[2],
        ]
    }
}

/// A named geometric selection of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Subregion {
    pub name: String,
    pub region: Region,
}

/// Regular finite-difference mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// The meshed region.
    pub region: Region,
    /// Number of cells along x, y, z.
    pub n: [usize; 3],
    /// Cell edge lengths, derived from `region` and `n`.
    pub cell: [f64; 3],
    /// Periodic boundary conditions, a subset of "xyz".
    pub bc: String,
    /// Named subregions in declaration order.
    pub subregions: Vec<Subregion>,
}

impl Mesh {
    /// Creates a mesh over the box spanned by `p1` and `p2` with `n` cells
    /// per direction.
    pub fn new(p1: [f64; 3], p2: [f64; 3], n: [usize; 3]) -> Result<Self> {
        if n.iter().any(|&ni| ni == 0) {
            return Err(Mumax3Error::InvalidArguments(format!(
                "cannot define mesh with n={n:?}"
            )));
        }
        let region = Region::new(p1, p2);
        let edges = region.edges();
        if edges.iter().any(|&e| e <= 0.0) {
            return Err(Mumax3Error::InvalidArguments(format!(
                "mesh region has zero extent: p1={p1:?}, p2={p2:?}"
            )));
        }
        let cell = [
            edges[0] / n[0] as f64,
            edges[1] / n[1] as f64,
            edges[2] / n[2] as f64,
        ];
        Ok(Self {
            region,
            n,
            cell,
            bc: String::new(),
            subregions: Vec::new(),
        })
    }

    /// Sets periodic boundary conditions, e.g. `"xy"`.
    pub fn with_bc(mut self, bc: &str) -> Result<Self> {
        if bc.chars().any(|c| !"xyz".contains(c)) {
            return Err(Mumax3Error::InvalidArguments(format!(
                "invalid boundary condition string {bc:?}; only x, y, z are allowed"
            )));
        }
        self.bc = bc.to_string();
        Ok(self)
    }

    /// Declares a named subregion. Later declarations win on overlap.
    pub fn with_subregion(mut self, name: &str, region: Region) -> Result<Self> {
        if name.is_empty() || name.contains(':') {
            return Err(Mumax3Error::InvalidArguments(format!(
                "invalid subregion name {name:?}"
            )));
        }
        if self.subregions.iter().any(|sr| sr.name == name) {
            return Err(Mumax3Error::InvalidArguments(format!(
                "subregion {name:?} is already defined"
            )));
        }
        self.subregions.push(Subregion {
            name: name.to_string(),
            region,
        });
        Ok(self)
    }

    /// Total number of cells.
    pub fn ncells(&self) -> usize {
        self.n[0] * self.n[1] * self.n[2]
    }

    /// Centre point of cell `(i, j, k)`.
    pub fn cell_centre(&self, idx: [usize; 3]) -> [f64; 3] {
        [
            self.region.pmin[0] + (idx[0] as f64 + 0.5) * self.cell[0],
            self.region.pmin[1] + (idx[1] as f64 + 0.5) * self.cell[1],
            self.region.pmin[2] + (idx[2] as f64 + 0.5) * self.cell[2],
        ]
    }

    /// Looks up a declared subregion by name.
    pub fn subregion(&self, name: &str) -> Option<&Subregion> {
        self.subregions.iter().find(|sr| sr.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_corners_any_order() {
        let r = Region::new([2.0, 0.0, 3.0], [0.0, 1.0, 1.0]);
        assert_eq!(r.pmin, [0.0, 0.0, 1.0]);
        assert_eq!(r.pmax, [2.0, 1.0, 3.0]);
        assert!(r.contains([1.0, 0.5, 2.0]));
        assert!(!r.contains([3.0, 0.5, 2.0]));
    }

    #[test]
    fn test_mesh_cell_size() {
        let mesh = Mesh::new([0.0, 0.0, 0.0], [10e-9, 10e-9, 2e-9], [10, 10, 2]).unwrap();
        assert!((mesh.cell[0] - 1e-9).abs() < 1e-24);
        assert!((mesh.cell[2] - 1e-9).abs() < 1e-24);
        assert_eq!(mesh.ncells(), 200);
    }

    #[test]
    fn test_mesh_invalid() {
        assert!(Mesh::new([0.0; 3], [1.0, 1.0, 1.0], [0, 1, 1]).is_err());
        assert!(Mesh::new([0.0; 3], [1.0, 1.0, 0.0], [1, 1, 1]).is_err());
    }

    #[test]
    fn test_cell_centre() {
        let mesh = Mesh::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0], [2, 2, 2]).unwrap();
        assert_eq!(mesh.cell_centre([0, 0, 0]), [0.5, 0.5, 0.5]);
        assert_eq!(mesh.cell_centre([1, 1, 1]), [1.5, 1.5, 1.5]);
    }

    #[test]
    fn test_subregion_names() {
        let mesh = Mesh::new([0.0; 3], [2.0, 2.0, 2.0], [2, 2, 2])
            .unwrap()
            .with_subregion("r1", Region::new([0.0; 3], [2.0, 2.0, 1.0]))
            .unwrap();
        assert!(mesh.subregion("r1").is_some());
        assert!(mesh
            .clone()
            .with_subregion("r1", Region::new([0.0; 3], [1.0; 3]))
            .is_err());
        assert!(mesh
            .clone()
            .with_subregion("a:b", Region::new([0.0; 3], [1.0; 3]))
            .is_err());
    }

    #[test]
    fn test_bc_validation() {
        let mesh = Mesh::new([0.0; 3], [1.0, 1.0, 1.0], [1, 1, 1]).unwrap();
        assert!(mesh.clone().with_bc("xy").is_ok());
        assert!(mesh.with_bc("xq").is_err());
    }
}
