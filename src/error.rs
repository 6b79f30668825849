//! Error types shared across the crate.
//!
//! Every failure mode of a drive call maps onto exactly one variant:
//! argument validation, directory conflicts, region capacity, parameters
//! that mx3 syntax cannot express, and nonzero engine exits. None of them
//! are retried; all are surfaced synchronously to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum Mumax3Error {
    /// Raised before any filesystem mutation when driver or system
    /// arguments are invalid.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Raised when the output directory of a drive already exists and
    /// overwriting was not requested.
    #[error("directory {path} already exists; to overwrite it, pass overwrite=true to drive")]
    DirectoryExists { path: PathBuf },

    /// Raised when the number of required region labels exceeds the engine's
    /// 256-region limit.
    #[error(
        "mumax3 does not allow more than 256 separate regions to be set; \
         found {subregions} subregions and distinct Ms values resulting in \
         {required} regions ({available} available)"
    )]
    RegionCapacity {
        required: usize,
        subregions: usize,
        available: usize,
    },

    /// Raised when a material parameter cannot be expressed in mx3 syntax.
    #[error("cannot set parameter {name}: {reason}")]
    UnsupportedParameter { name: String, reason: String },

    /// Raised when the engine exits with a nonzero code. Captured output is
    /// propagated verbatim.
    #[error("error in mumax3 run\ncommand: {command}\nstdout: {stdout}\nstderr: {stderr}")]
    EngineRun {
        command: String,
        stdout: String,
        stderr: String,
    },

    /// Raised when no way to run the engine can be found on the host.
    #[error("mumax3 cannot be found")]
    EngineNotFound,

    /// Raised when engine output (OVF snapshot, data table) cannot be parsed.
    #[error("cannot parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Mumax3Error>;
