//! OVF 2.0 file format I/O.
//!
//! OVF (OOMMF Vector Field) is the spatial data format consumed and produced
//! by mumax3: initial magnetisation, region label fields and per-step
//! snapshots all travel through it. Rectangular meshes only, with either
//! text or binary-4 data blocks. Binary 4 uses little-endian f32 values and
//! starts with the OVF2 check value `1234567.0f`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array4;

use crate::error::{Mumax3Error, Result};
use crate::field::Field;
use crate::mesh::Mesh;

/// OVF data block variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvfFormat {
    /// Text data (human-readable, larger file size)
    Text,
    /// Binary 4 data (compact, faster to read/write)
    Binary4,
}

const BINARY4_CHECK: f32 = 1234567.0;

/// Writes a field to an OVF 2.0 file.
pub fn write_ovf2(path: &Path, field: &Field, title: &str, format: OvfFormat) -> Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    let mesh = &field.mesh;
    let [nx, ny, nz] = mesh.n;
    let pmin = mesh.region.pmin;
    let pmax = mesh.region.pmax;

    writeln!(w, "# OOMMF OVF 2.0")?;
    writeln!(w, "# Segment count: 1")?;
    writeln!(w, "# Begin: Segment")?;
    writeln!(w, "# Begin: Header")?;
    writeln!(w, "# Title: {}", title)?;
    writeln!(w, "# meshtype: rectangular")?;
    writeln!(w, "# meshunit: m")?;

    writeln!(w, "# xmin: {:.16e}", pmin[0])?;
    writeln!(w, "# ymin: {:.16e}", pmin[1])?;
    writeln!(w, "# zmin: {:.16e}", pmin[2])?;
    writeln!(w, "# xmax: {:.16e}", pmax[0])?;
    writeln!(w, "# ymax: {:.16e}", pmax[1])?;
    writeln!(w, "# zmax: {:.16e}", pmax[2])?;

    writeln!(w, "# valuedim: {}", field.dim)?;
    if field.dim == 3 {
        writeln!(w, "# valuelabels: {0}_x {0}_y {0}_z", title)?;
        writeln!(w, "# valueunits: 1 1 1")?;
    } else {
        writeln!(w, "# valuelabels: {}", title)?;
        writeln!(w, "# valueunits: 1")?;
    }

    writeln!(w, "# xbase: {:.16e}", pmin[0] + 0.5 * mesh.cell[0])?;
    writeln!(w, "# ybase: {:.16e}", pmin[1] + 0.5 * mesh.cell[1])?;
    writeln!(w, "# zbase: {:.16e}", pmin[2] + 0.5 * mesh.cell[2])?;
    writeln!(w, "# xnodes: {}", nx)?;
    writeln!(w, "# ynodes: {}", ny)?;
    writeln!(w, "# znodes: {}", nz)?;
    writeln!(w, "# xstepsize: {:.16e}", mesh.cell[0])?;
    writeln!(w, "# ystepsize: {:.16e}", mesh.cell[1])?;
    writeln!(w, "# zstepsize: {:.16e}", mesh.cell[2])?;
    writeln!(w, "# End: Header")?;

    match format {
        OvfFormat::Text => {
            writeln!(w, "# Begin: Data Text")?;
            // x fastest, then y, then z
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        for c in 0..field.dim {
                            if c > 0 {
                                write!(w, " ")?;
                            }
                            write!(w, "{:.10e}", field.array[[i, j, k, c]])?;
                        }
                        writeln!(w)?;
                    }
                }
            }
            writeln!(w, "# End: Data Text")?;
        }
        OvfFormat::Binary4 => {
            writeln!(w, "# Begin: Data Binary 4")?;
            w.write_all(&BINARY4_CHECK.to_le_bytes())?;
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        for c in 0..field.dim {
                            let v = field.array[[i, j, k, c]] as f32;
                            w.write_all(&v.to_le_bytes())?;
                        }
                    }
                }
            }
            writeln!(w)?;
            writeln!(w, "# End: Data Binary 4")?;
        }
    }
    writeln!(w, "# End: Segment")?;
    w.flush()?;
    Ok(())
}

/// Reads a field from an OVF 2.0 file. The data block variant is detected
/// from the `Begin: Data` line.
pub fn read_ovf2(path: &Path) -> Result<Field> {
    let data = std::fs::read(path)?;
    let mut pos = 0usize;

    let mut n: [usize; 3] = [0; 3];
    let mut step: [f64; 3] = [0.0; 3];
    let mut pmin: [f64; 3] = [0.0; 3];
    let mut valuedim: usize = 0;

    loop {
        let line = next_line(&data, &mut pos)
            .ok_or_else(|| parse_err(path, "no data block found"))?;
        let line = std::str::from_utf8(line)
            .map_err(|_| parse_err(path, "non-UTF-8 header line"))?;
        let Some(rest) = line.trim().strip_prefix('#') else {
            continue;
        };
        let Some((key, value)) = rest.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "xnodes" => n[0] = parse_num(path, value)? as usize,
            "ynodes" => n[1] = parse_num(path, value)? as usize,
            "znodes" => n[2] = parse_num(path, value)? as usize,
            "xstepsize" => step[0] = parse_num(path, value)?,
            "ystepsize" => step[1] = parse_num(path, value)?,
            "zstepsize" => step[2] = parse_num(path, value)?,
            "xmin" => pmin[0] = parse_num(path, value)?,
            "ymin" => pmin[1] = parse_num(path, value)?,
            "zmin" => pmin[2] = parse_num(path, value)?,
            "valuedim" => valuedim = parse_num(path, value)? as usize,
            "begin" => {
                let block = value.to_ascii_lowercase();
                if block == "data text" {
                    return finish(path, &data, pos, n, step, pmin, valuedim, false);
                } else if block == "data binary 4" {
                    return finish(path, &data, pos, n, step, pmin, valuedim, true);
                } else if block.starts_with("data") {
                    return Err(parse_err(path, &format!("unsupported data block {value:?}")));
                }
            }
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn finish(
    path: &Path,
    data: &[u8],
    pos: usize,
    n: [usize; 3],
    step: [f64; 3],
    pmin: [f64; 3],
    valuedim: usize,
    binary: bool,
) -> Result<Field> {
    if n.iter().any(|&ni| ni == 0) || step.iter().any(|&s| s <= 0.0) {
        return Err(parse_err(path, "incomplete header: nodes or stepsize missing"));
    }
    if valuedim != 1 && valuedim != 3 {
        return Err(parse_err(path, &format!("unsupported valuedim {valuedim}")));
    }
    let pmax = [
        pmin[0] + n[0] as f64 * step[0],
        pmin[1] + n[1] as f64 * step[1],
        pmin[2] + n[2] as f64 * step[2],
    ];
    let mesh = Mesh::new(pmin, pmax, n)?;

    let nvalues = n[0] * n[1] * n[2] * valuedim;
    let values = if binary {
        read_binary4_values(path, data, pos, nvalues)?
    } else {
        read_text_values(path, data, pos, nvalues)?
    };

    // x fastest, then y, then z
    let mut array = Array4::zeros((n[0], n[1], n[2], valuedim));
    let mut it = values.into_iter();
    for k in 0..n[2] {
        for j in 0..n[1] {
            for i in 0..n[0] {
                for c in 0..valuedim {
                    array[[i, j, k, c]] = it.next().unwrap_or(0.0);
                }
            }
        }
    }
    Ok(Field {
        mesh,
        dim: valuedim,
        array,
    })
}

fn read_binary4_values(
    path: &Path,
    data: &[u8],
    pos: usize,
    nvalues: usize,
) -> Result<Vec<f64>> {
    let needed = 4 * (nvalues + 1);
    if data.len() < pos + needed {
        return Err(parse_err(path, "binary data block is truncated"));
    }
    let check = f32::from_le_bytes(data[pos..pos + 4].try_into().unwrap());
    if check != BINARY4_CHECK {
        return Err(parse_err(
            path,
            &format!("bad binary 4 check value {check}"),
        ));
    }
    let mut values = Vec::with_capacity(nvalues);
    let mut offset = pos + 4;
    for _ in 0..nvalues {
        let v = f32::from_le_bytes(data[offset..offset + 4].try_into().unwrap());
        values.push(v as f64);
        offset += 4;
    }
    Ok(values)
}

fn read_text_values(path: &Path, data: &[u8], mut pos: usize, nvalues: usize) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(nvalues);
    while values.len() < nvalues {
        let line = next_line(data, &mut pos)
            .ok_or_else(|| parse_err(path, "text data block is truncated"))?;
        let line = std::str::from_utf8(line)
            .map_err(|_| parse_err(path, "non-UTF-8 data line"))?;
        let trimmed = line.trim();
        if trimmed.starts_with('#') || trimmed.is_empty() {
            continue;
        }
        for token in trimmed.split_whitespace() {
            let v: f64 = token
                .parse()
                .map_err(|_| parse_err(path, &format!("invalid value {token:?}")))?;
            values.push(v);
        }
    }
    if values.len() != nvalues {
        return Err(parse_err(
            path,
            &format!("expected {} values, found {}", nvalues, values.len()),
        ));
    }
    Ok(values)
}

fn next_line<'a>(data: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    if *pos >= data.len() {
        return None;
    }
    let start = *pos;
    let end = data[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| start + p)
        .unwrap_or(data.len());
    *pos = end + 1;
    Some(&data[start..end])
}

fn parse_num(path: &Path, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| parse_err(path, &format!("invalid header value {value:?}")))
}

fn parse_err(path: &Path, reason: &str) -> Mumax3Error {
    Mumax3Error::Parse {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use tempfile::tempdir;

    fn mesh() -> Mesh {
        Mesh::new([0.0; 3], [4e-9, 2e-9, 2e-9], [4, 2, 2]).unwrap()
    }

    #[test]
    fn test_text_roundtrip_vector() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.ovf");
        let field = Field::vector_from_fn(&mesh(), |p| [p[0] * 1e9, 0.0, 1.0]);

        write_ovf2(&path, &field, "m", OvfFormat::Text).unwrap();
        let loaded = read_ovf2(&path).unwrap();

        assert_eq!(loaded.dim, 3);
        assert_eq!(loaded.mesh.n, field.mesh.n);
        for (a, b) in loaded.array.iter().zip(field.array.iter()) {
            assert!((a - b).abs() < 1e-9 * b.abs().max(1.0));
        }
    }

    #[test]
    fn test_binary4_roundtrip_scalar() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.ovf");
        let field = Field::scalar_from_fn(&mesh(), |p| if p[0] > 2e-9 { 255.0 } else { 3.0 });

        write_ovf2(&path, &field, "regions", OvfFormat::Binary4).unwrap();
        let loaded = read_ovf2(&path).unwrap();

        assert_eq!(loaded.dim, 1);
        // Small integers survive the f32 narrowing exactly.
        for (a, b) in loaded.array.iter().zip(field.array.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_read_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.ovf");
        std::fs::write(&path, "# OOMMF OVF 2.0\n# xnodes: 2\n").unwrap();
        assert!(read_ovf2(&path).is_err());
    }

    #[test]
    fn test_mesh_reconstruction() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.ovf");
        let field = Field::uniform_vector(&mesh(), [0.0, 0.0, 1.0]);
        write_ovf2(&path, &field, "m", OvfFormat::Text).unwrap();

        let loaded = read_ovf2(&path).unwrap();
        for i in 0..3 {
            assert!((loaded.mesh.cell[i] - field.mesh.cell[i]).abs() < 1e-24);
            assert!((loaded.mesh.region.pmax[i] - field.mesh.region.pmax[i]).abs() < 1e-20);
        }
    }
}
