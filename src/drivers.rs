//! Drivers: the drive state machine.
//!
//! Three driver kinds exist — energy minimisation, relaxation and time
//! stepping — collected in the closed [`Driver`] enum so every consumer
//! matches exhaustively. A drive call moves through argument checking,
//! script writing, engine invocation and result parsing; any failure before
//! the engine is invoked leaves no partial output directory behind.

use std::collections::{btree_map, BTreeMap};
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use ndarray::{Array4, Axis};
use serde::Serialize;
use tracing::debug;

use crate::consts::{E_CHARGE, MU_B};
use crate::error::{Mumax3Error, Result};
use crate::field::Field;
use crate::ovf::{self, OvfFormat};
use crate::runner::Mumax3Runner;
use crate::scripts::{self, J_FILENAME, M0_FILENAME, REGIONS_FILENAME};
use crate::system::{delete, System};
use crate::table::Table;

/// Energy minimisation driver (`minimize()`).
#[derive(Debug, Clone, Default)]
pub struct MinDriver {
    settings: BTreeMap<String, f64>,
}

/// Relaxation driver (`relax()`); requires a damping term.
#[derive(Debug, Clone, Default)]
pub struct RelaxDriver {
    settings: BTreeMap<String, f64>,
}

/// Time-stepping driver: runs for `t` seconds in `n` equal steps, saving a
/// snapshot and a table row after each step.
#[derive(Debug, Clone)]
pub struct TimeDriver {
    pub t: f64,
    pub n: usize,
    settings: BTreeMap<String, f64>,
}

const MIN_SETTINGS: &[&str] = &[
    "MinimizerStop",
    "DemagAccuracy",
    "Headroom",
    "LastErr",
    "MaxErr",
    "MinimizerSamples",
    "NEval",
    "PeakErr",
];

const RELAX_SETTINGS: &[&str] = &[
    "MinimizerStop",
    "DemagAccuracy",
    "Headroom",
    "LastErr",
    "MaxErr",
    "RelaxTorqueThreshold",
    "NEval",
    "PeakErr",
];

const TIME_SETTINGS: &[&str] = &[
    "DemagAccuracy",
    "dt",
    "FixDt",
    "Headroom",
    "LastErr",
    "MaxDt",
    "MaxErr",
    "MinDt",
    "NEval",
    "PeakErr",
];

fn checked_setting(
    settings: &mut BTreeMap<String, f64>,
    allowed: &[&str],
    key: &str,
    value: f64,
) -> Result<()> {
    if !allowed.contains(&key) {
        return Err(Mumax3Error::InvalidArguments(format!(
            "unknown engine setting {key:?}; allowed: {allowed:?}"
        )));
    }
    settings.insert(key.to_string(), value);
    Ok(())
}

impl MinDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an allow-listed engine setting, e.g. `DemagAccuracy`.
    pub fn with_setting(mut self, key: &str, value: f64) -> Result<Self> {
        checked_setting(&mut self.settings, MIN_SETTINGS, key, value)?;
        Ok(self)
    }

    pub(crate) fn settings(&self) -> btree_map::Iter<'_, String, f64> {
        self.settings.iter()
    }
}

impl RelaxDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_setting(mut self, key: &str, value: f64) -> Result<Self> {
        checked_setting(&mut self.settings, RELAX_SETTINGS, key, value)?;
        Ok(self)
    }

    pub(crate) fn settings(&self) -> btree_map::Iter<'_, String, f64> {
        self.settings.iter()
    }
}

impl TimeDriver {
    pub fn new(t: f64, n: usize) -> Self {
        Self {
            t,
            n,
            settings: BTreeMap::new(),
        }
    }

    pub fn with_setting(mut self, key: &str, value: f64) -> Result<Self> {
        checked_setting(&mut self.settings, TIME_SETTINGS, key, value)?;
        Ok(self)
    }

    pub(crate) fn settings(&self) -> btree_map::Iter<'_, String, f64> {
        self.settings.iter()
    }
}

/// Options of a drive call.
#[derive(Debug, Clone)]
pub struct DriveOpts {
    /// Directory under which `<system-name>/drive-<n>` is created.
    pub base_dir: PathBuf,
    /// Replace a pre-existing drive directory instead of failing.
    pub overwrite: bool,
}

impl Default for DriveOpts {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            overwrite: false,
        }
    }
}

/// Output of a successful drive.
#[derive(Debug, Clone)]
pub struct DriveResult {
    /// Scalar table read from the engine's output directory.
    pub table: Table,
    /// The `drive-<n>` directory of this run.
    pub drive_dir: PathBuf,
}

/// A driver of one of the three supported kinds.
#[derive(Debug, Clone)]
pub enum Driver {
    Minimize(MinDriver),
    Relax(RelaxDriver),
    TimeStep(TimeDriver),
}

#[derive(Serialize)]
struct DriveInfo<'a> {
    drive_number: usize,
    timestamp_secs: u64,
    driver: &'a str,
    args: serde_json::Value,
}

impl Driver {
    /// Driver kind name recorded in `info.json`.
    pub fn kind(&self) -> &'static str {
        match self {
            Driver::Minimize(_) => "MinDriver",
            Driver::Relax(_) => "RelaxDriver",
            Driver::TimeStep(_) => "TimeDriver",
        }
    }

    fn args_json(&self) -> serde_json::Value {
        match self {
            Driver::Minimize(_) | Driver::Relax(_) => serde_json::json!({}),
            Driver::TimeStep(d) => serde_json::json!({ "t": d.t, "n": d.n }),
        }
    }

    /// Validates driver arguments against the system. Runs before any
    /// filesystem mutation.
    fn check_args(&self, system: &System) -> Result<()> {
        match self {
            Driver::Minimize(_) => Ok(()),
            Driver::Relax(_) => {
                if system.damping_alpha().is_none() {
                    return Err(Mumax3Error::InvalidArguments(
                        "a damping term is needed to relax".to_string(),
                    ));
                }
                Ok(())
            }
            Driver::TimeStep(d) => {
                if !d.t.is_finite() || d.t <= 0.0 {
                    return Err(Mumax3Error::InvalidArguments(format!(
                        "cannot drive with t={}",
                        d.t
                    )));
                }
                if d.n == 0 {
                    return Err(Mumax3Error::InvalidArguments(
                        "cannot drive with n=0".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Drives the system in phase space: writes the script and its spatial
    /// input files into `<base>/<name>/drive-<n>`, invokes the engine and
    /// parses its output back.
    ///
    /// On success the system's magnetisation is updated in place from the
    /// last snapshot and its drive counter is incremented by one. A nonzero
    /// engine exit propagates the captured output verbatim and leaves the
    /// drive directory for the caller to inspect or [`delete`].
    pub fn drive(
        &self,
        system: &mut System,
        runner: &dyn Mumax3Runner,
        opts: &DriveOpts,
    ) -> Result<DriveResult> {
        self.check_args(system)?;

        let drive_dir = system
            .dirname(&opts.base_dir)
            .join(format!("drive-{}", system.drive_number));
        if drive_dir.exists() {
            if opts.overwrite {
                delete(system, &opts.base_dir)?;
            } else {
                return Err(Mumax3Error::DirectoryExists { path: drive_dir });
            }
        }

        // Assemble the whole script in memory first: capacity and parameter
        // errors must not leave a partial output directory behind.
        let ss = scripts::system_script(system)?;
        let mut mx3 = ss.mx3;
        mx3 += &scripts::driver_script(self, system)?;

        fs::create_dir_all(&drive_dir)?;
        let mx3_name = format!("{}.mx3", system.name);
        fs::write(drive_dir.join(&mx3_name), &mx3)?;
        self.write_info(system, &drive_dir)?;
        ovf::write_ovf2(
            &drive_dir.join(M0_FILENAME),
            &system.m.orientation(),
            "m",
            OvfFormat::Text,
        )?;
        let regions_field = Field {
            mesh: system.m.mesh.clone(),
            dim: 1,
            array: ss.region_map.labels.mapv(|v| v as f64).insert_axis(Axis(3)),
        };
        ovf::write_ovf2(
            &drive_dir.join(REGIONS_FILENAME),
            &regions_field,
            "regions",
            OvfFormat::Text,
        )?;
        if let (Driver::TimeStep(_), Some((u, _))) = (self, system.zhang_li()) {
            ovf::write_ovf2(
                &drive_dir.join(J_FILENAME),
                &current_density(system, u),
                "j",
                OvfFormat::Text,
            )?;
        }

        debug!(dir = %drive_dir.display(), driver = self.kind(), "invoking engine");
        runner.call(Path::new(&mx3_name), &drive_dir)?;

        let out_dir = drive_dir.join(format!("{}.out", system.name));
        let snapshot = last_snapshot(&out_dir)?;
        let result_m = ovf::read_ovf2(&snapshot)?;
        system.m.update_from(&result_m)?;
        let table = Table::from_file(&out_dir.join("table.txt"))?;

        system.drive_number += 1;
        Ok(DriveResult { table, drive_dir })
    }

    fn write_info(&self, system: &System, drive_dir: &Path) -> Result<()> {
        let info = DriveInfo {
            drive_number: system.drive_number,
            timestamp_secs: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            driver: self.kind(),
            args: self.args_json(),
        };
        let file = File::create(drive_dir.join("info.json"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &info)?;
        Ok(())
    }
}

/// Current-density field for Zhang-Li torque: electron velocity `u` along x,
/// converted per cell to `u * e/mu_B * Ms`.
fn current_density(system: &System, u: f64) -> Field {
    let ms = system.m.norm();
    let scale = u * (E_CHARGE / MU_B);
    let [nx, ny, nz] = system.m.mesh.n;
    let array = Array4::from_shape_fn((nx, ny, nz, 3), |(i, j, k, c)| {
        if c == 0 {
            scale * ms[[i, j, k]]
        } else {
            0.0
        }
    });
    Field {
        mesh: system.m.mesh.clone(),
        dim: 3,
        array,
    }
}

/// Finds the last snapshot (sorted by filename) in the engine's output
/// directory.
fn last_snapshot(out_dir: &Path) -> Result<PathBuf> {
    let mut snapshots: Vec<PathBuf> = fs::read_dir(out_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with("m_full") && name.ends_with(".ovf"))
                .unwrap_or(false)
        })
        .collect();
    snapshots.sort();
    snapshots.pop().ok_or_else(|| Mumax3Error::Parse {
        path: out_dir.to_path_buf(),
        reason: "no m_full snapshot found".to_string(),
    })
}
