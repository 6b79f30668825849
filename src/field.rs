//! Finite-difference fields.
//!
//! A [`Field`] couples a [`Mesh`] with an `ndarray` of per-cell values of
//! dimension 1 (scalar) or 3 (vector). The magnetisation of a system is a
//! vector field whose per-cell magnitude (norm) carries the saturation
//! magnetisation.

use ndarray::{Array3, Array4};

use crate::error::{Mumax3Error, Result};
use crate::mesh::Mesh;

/// Field over a mesh, shape `(nx, ny, nz, dim)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub mesh: Mesh,
    pub dim: usize,
    pub array: Array4<f64>,
}

impl Field {
    /// Creates a scalar field from a function of the cell centre.
    pub fn scalar_from_fn(mesh: &Mesh, f: impl Fn([f64; 3]) -> f64) -> Self {
        let [nx, ny, nz] = mesh.n;
        let array = Array4::from_shape_fn((nx, ny, nz, 1), |(i, j, k, _)| {
            f(mesh.cell_centre([i, j, k]))
        });
        Self {
            mesh: mesh.clone(),
            dim: 1,
            array,
        }
    }

    /// Creates a vector field from a function of the cell centre.
    pub fn vector_from_fn(mesh: &Mesh, f: impl Fn([f64; 3]) -> [f64; 3]) -> Self {
        let [nx, ny, nz] = mesh.n;
        let array = Array4::from_shape_fn((nx, ny, nz, 3), |(i, j, k, c)| {
            f(mesh.cell_centre([i, j, k]))[c]
        });
        Self {
            mesh: mesh.clone(),
            dim: 3,
            array,
        }
    }

    /// Creates a spatially constant vector field.
    pub fn uniform_vector(mesh: &Mesh, v: [f64; 3]) -> Self {
        Self::vector_from_fn(mesh, |_| v)
    }

    /// Rescales every cell vector to the magnitude returned by `f` for the
    /// cell centre. Zero vectors are left untouched.
    pub fn set_norm_fn(mut self, f: impl Fn([f64; 3]) -> f64) -> Self {
        let [nx, ny, nz] = self.mesh.n;
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let mag: f64 = (0..self.dim)
                        .map(|c| self.array[[i, j, k, c]].powi(2))
                        .sum::<f64>()
                        .sqrt();
                    if mag == 0.0 {
                        continue;
                    }
                    let target = f(self.mesh.cell_centre([i, j, k]));
                    let scale = target / mag;
                    for c in 0..self.dim {
                        self.array[[i, j, k, c]] *= scale;
                    }
                }
            }
        }
        self
    }

    /// Rescales every cell vector to a constant magnitude.
    pub fn set_norm(self, value: f64) -> Self {
        self.set_norm_fn(|_| value)
    }

    /// Per-cell magnitude.
    pub fn norm(&self) -> Array3<f64> {
        let [nx, ny, nz] = self.mesh.n;
        Array3::from_shape_fn((nx, ny, nz), |(i, j, k)| {
            (0..self.dim)
                .map(|c| self.array[[i, j, k, c]].powi(2))
                .sum::<f64>()
                .sqrt()
        })
    }

    /// Unit-vector field; cells with zero magnitude stay zero.
    pub fn orientation(&self) -> Field {
        let mut out = self.clone();
        let [nx, ny, nz] = self.mesh.n;
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let mag: f64 = (0..self.dim)
                        .map(|c| self.array[[i, j, k, c]].powi(2))
                        .sum::<f64>()
                        .sqrt();
                    if mag == 0.0 {
                        continue;
                    }
                    for c in 0..self.dim {
                        out.array[[i, j, k, c]] /= mag;
                    }
                }
            }
        }
        out
    }

    /// Replaces this field's values with those of `other`, keeping the mesh
    /// (including subregions) of `self`. Shapes must match.
    pub fn update_from(&mut self, other: &Field) -> Result<()> {
        if self.array.shape() != other.array.shape() {
            return Err(Mumax3Error::InvalidArguments(format!(
                "field shape mismatch: {:?} vs {:?}",
                self.array.shape(),
                other.array.shape()
            )));
        }
        self.array.assign(&other.array);
        Ok(())
    }
}
