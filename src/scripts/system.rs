//! Full-script assembly: mesh, magnetisation, regions and energy sections.

use crate::error::Result;
use crate::system::System;

use super::regions::{mumax3_regions, RegionMap};
use super::{energy_script, magnetisation_script, mesh_script};

/// The assembled body of a script together with the region map needed to
/// write the spatial input files it references.
#[derive(Debug, Clone)]
pub struct SystemScript {
    pub mx3: String,
    pub region_map: RegionMap,
}

/// Assembles the system section of the script. Pure in-memory: the caller
/// decides when (and whether) the referenced field files are written.
pub fn system_script(system: &System) -> Result<SystemScript> {
    let region_map = mumax3_regions(system)?;

    let mut mx3 = mesh_script(&system.m.mesh);
    mx3 += &magnetisation_script();
    mx3 += &region_map.script;
    mx3 += &energy_script(system, &region_map.relator)?;

    Ok(SystemScript { mx3, region_map })
}
