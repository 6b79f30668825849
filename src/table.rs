//! Tabular engine output.
//!
//! mumax3 writes one `table.txt` per run: a single `# name (unit)\t...`
//! header line followed by whitespace-separated float rows, one row per
//! `tablesave()` call. Column names are renamed to the short forms used
//! throughout the rest of the tooling.

use std::path::Path;

use crate::error::{Mumax3Error, Result};

/// Renaming applied to engine column names.
const MUMAX3_RENAME: &[(&str, &str)] = &[
    ("E_total", "E"),
    ("E_exch", "E_totalexchange"),
    ("E_demag", "E_demag"),
    ("E_Zeeman", "E_zeeman"),
    ("E_anis", "E_totalanisotropy"),
    ("maxTorque", "maxtorque"),
];

/// Typed scalar table read from the engine's `table.txt`.
#[derive(Debug, Clone)]
pub struct Table {
    /// Column names after renaming, in file order.
    pub columns: Vec<String>,
    /// Units per column, parentheses stripped.
    pub units: Vec<String>,
    /// Rows in file order; each row has one value per column.
    pub rows: Vec<Vec<f64>>,
}

impl Table {
    /// Reads a table from a mumax3 `table.txt` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|reason| Mumax3Error::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parses table content: header line first, then data rows.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let mut lines = content.lines();
        let header = lines.next().ok_or_else(|| "empty table".to_string())?;
        let header = header
            .strip_prefix('#')
            .ok_or_else(|| "missing header line".to_string())?
            .trim();

        let mut columns = Vec::new();
        let mut units = Vec::new();
        for entry in header.split('\t') {
            let mut parts = entry.split_whitespace();
            let name = parts
                .next()
                .ok_or_else(|| format!("empty header entry in {header:?}"))?;
            let unit = parts
                .next()
                .map(|u| u.trim_matches(|c| c == '(' || c == ')').to_string())
                .unwrap_or_default();
            columns.push(rename(name));
            units.push(unit);
        }

        let mut rows = Vec::new();
        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let row: std::result::Result<Vec<f64>, String> = trimmed
                .split_whitespace()
                .map(|tok| {
                    tok.parse()
                        .map_err(|_| format!("invalid value {tok:?} in table row"))
                })
                .collect();
            let row = row?;
            if row.len() != columns.len() {
                return Err(format!(
                    "row has {} values, expected {}",
                    row.len(),
                    columns.len()
                ));
            }
            rows.push(row);
        }
        Ok(Self {
            columns,
            units,
            rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Values of a column by (renamed) name.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Last value of a column, e.g. the final total energy.
    pub fn last(&self, name: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.rows.last().map(|r| r[idx])
    }
}

fn rename(name: &str) -> String {
    MUMAX3_RENAME
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| name.to_string())
}
