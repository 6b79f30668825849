//! Conversion of subregions and spatially varying Ms values into mumax3
//! regions.
//!
//! In this module "region" refers to the engine's integer-tagged cell
//! groups (at most 256), "subregion" to the named geometric selections on
//! the mesh. Every (subregion, distinct Ms value) pair becomes one region;
//! region 255 is reserved for zero-Ms (vacuum) cells.

use std::collections::{BTreeMap, HashMap};

use ndarray::Array3;

use crate::error::{Mumax3Error, Result};
use crate::mesh::Mesh;
use crate::system::System;

use super::fmt_num;

/// Region index reserved for cells with zero saturation magnetisation.
pub const VACUUM_REGION: u8 = 255;

/// Filename of the region label field loaded by the generated script.
pub const REGIONS_FILENAME: &str = "mumax3_regions.omf";

/// Distinct-Ms rule: two values are identical iff their ratios to the global
/// maximum agree after rounding to 14 post-decimal digits. A value is zero
/// iff its rounded ratio is exactly zero.
const ACCURACY_SCALE: f64 = 1e14;

/// Output of the region-mapping transform.
#[derive(Debug, Clone)]
pub struct RegionMap {
    /// Per-cell engine region index.
    pub labels: Array3<u8>,
    /// Subregion name (empty string for cells outside every subregion) to
    /// the list of region indices it was decomposed into.
    pub relator: HashMap<String, Vec<u8>>,
    /// `Msat.setregion` directives plus the `regions.LoadFile` call.
    pub script: String,
}

/// Tags each cell with the index of the subregion it belongs to: 0 for no
/// subregion, `i + 1` for the i-th declared one. Subregions are evaluated
/// from the last declared to the first, so later declarations win where
/// they overlap.
fn subregion_tags(mesh: &Mesh) -> (Array3<usize>, Vec<String>) {
    let mut names = vec![String::new()];
    names.extend(mesh.subregions.iter().map(|sr| sr.name.clone()));

    let [nx, ny, nz] = mesh.n;
    let tags = Array3::from_shape_fn((nx, ny, nz), |(i, j, k)| {
        let centre = mesh.cell_centre([i, j, k]);
        mesh.subregions
            .iter()
            .enumerate()
            .rev()
            .find(|(_, sr)| sr.region.contains(centre))
            .map(|(idx, _)| idx + 1)
            .unwrap_or(0)
    });
    (tags, names)
}

/// Runs the region-mapping transform for a system.
///
/// Fails with [`Mumax3Error::RegionCapacity`] when more labels would be
/// needed than the engine allows, before anything is written to disk.
pub fn mumax3_regions(system: &System) -> Result<RegionMap> {
    let mesh = &system.m.mesh;
    let (tags, names) = subregion_tags(mesh);
    let ms = system.m.norm();

    if ms.iter().any(|v| v.is_nan()) {
        return Err(Mumax3Error::InvalidArguments(
            "Ms values cannot be NaN".to_string(),
        ));
    }

    let ms_max = ms.iter().cloned().fold(0.0_f64, f64::max);
    let key_of = |v: f64| -> i64 {
        if ms_max == 0.0 {
            0
        } else {
            (v / ms_max * ACCURACY_SCALE).round() as i64
        }
    };

    // Distinct Ms values per subregion tag; the representative value of a
    // bucket is the smallest actual value found in it.
    let mut buckets: Vec<BTreeMap<i64, f64>> = vec![BTreeMap::new(); names.len()];
    let mut has_vacuum = false;
    for (idx, &tag) in tags.indexed_iter() {
        let v = ms[idx];
        let key = key_of(v);
        if key == 0 {
            has_vacuum = true;
            continue;
        }
        buckets[tag]
            .entry(key)
            .and_modify(|rep| *rep = rep.min(v))
            .or_insert(v);
    }

    let available = if has_vacuum {
        VACUUM_REGION as usize
    } else {
        VACUUM_REGION as usize + 1
    };
    let required: usize = buckets.iter().map(|b| b.len()).sum();
    if required > available {
        return Err(Mumax3Error::RegionCapacity {
            required,
            subregions: mesh.subregions.len(),
            available,
        });
    }

    // Fresh labels in a stable order: subregion tags in declaration order
    // (no-subregion tag first), distinct values ascending within each tag.
    let mut script = String::new();
    if has_vacuum {
        script += &format!("Msat.setregion({}, 0.0)\n", VACUUM_REGION);
    }
    let mut label_of: HashMap<(usize, i64), u8> = HashMap::new();
    let mut relator: HashMap<String, Vec<u8>> =
        names.iter().map(|n| (n.clone(), Vec::new())).collect();
    let mut next_label: usize = 0;
    for (tag, bucket) in buckets.iter().enumerate() {
        for (&key, &value) in bucket {
            let label = next_label as u8;
            label_of.insert((tag, key), label);
            relator.get_mut(&names[tag]).expect("tag name").push(label);
            script += &format!("Msat.setregion({}, {})\n", label, fmt_num(value));
            next_label += 1;
        }
    }
    script += &format!("\nregions.LoadFile(\"{}\")\n\n", REGIONS_FILENAME);

    let labels = Array3::from_shape_fn(tags.dim(), |idx| {
        let key = key_of(ms[idx]);
        if key == 0 {
            VACUUM_REGION
        } else {
            label_of[&(tags[idx], key)]
        }
    });

    Ok(RegionMap {
        labels,
        relator,
        script,
    })
}
