use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;

use ndarray::Array3;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use super::transform::frequency_index_at;
use crate::data::model::{CoefficientArray, FrequencyIndex, SparseCoefficientMap, SparseValue};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Dense ↔ sparse projection
// ---------------------------------------------------------------------------

/// Project a coefficient array into a sparse frequency-indexed map.
///
/// One entry per (row, col) position where at least one channel is
/// non-zero, keyed by the same centered frequency pair the transform
/// assigns to that position. A pure function of the array's contents.
pub fn from_coefficients(coeffs: &CoefficientArray) -> SparseCoefficientMap {
    let (h, w, c) = coeffs.dim();
    let data = coeffs.data();
    let zero = Complex::new(0.0, 0.0);

    let mut entries = BTreeMap::new();
    for i in 0..h {
        for j in 0..w {
            if (0..c).all(|ch| data[[i, j, ch]] == zero) {
                continue;
            }
            let value = if c == 1 {
                SparseValue::Gray(data[[i, j, 0]])
            } else {
                SparseValue::Rgb([data[[i, j, 0]], data[[i, j, 1]], data[[i, j, 2]]])
            };
            entries.insert(frequency_index_at(i, j, h, w), value);
        }
    }

    SparseCoefficientMap {
        entries,
        height: h,
        width: w,
        channels: c,
    }
}

/// Rebuild the dense coefficient array a map was projected from: retained
/// entries back at their centered positions, exact zeros everywhere else.
///
/// Entries whose frequency falls outside the recorded shape, or whose
/// channel count disagrees with it, are [`Error::Input`].
pub fn to_coefficients(map: &SparseCoefficientMap) -> Result<CoefficientArray> {
    let (h, w, c) = (map.height, map.width, map.channels);
    let mut data = Array3::from_elem((h, w, c), Complex::new(0.0, 0.0));

    for (freq, value) in &map.entries {
        if value.channels() != c {
            return Err(Error::input(format!(
                "entry {freq} has {} channel(s), map declares {c}",
                value.channels()
            )));
        }
        let i = freq.row + (h / 2) as i64;
        let j = freq.col + (w / 2) as i64;
        if !(0..h as i64).contains(&i) || !(0..w as i64).contains(&j) {
            return Err(Error::input(format!(
                "frequency {freq} is outside a {h}x{w} coefficient array"
            )));
        }
        for (ch, &v) in value.as_slice().iter().enumerate() {
            data[[i as usize, j as usize, ch]] = v;
        }
    }

    Ok(CoefficientArray::from_raw(data))
}

// ---------------------------------------------------------------------------
// On-disk export / import (dispatch by extension)
// ---------------------------------------------------------------------------

/// Serialized form of one map entry.
#[derive(Debug, Serialize, Deserialize)]
struct SparseRecord {
    row: i64,
    col: i64,
    value: SparseValue,
}

/// Serialized form of the whole map.
#[derive(Debug, Serialize, Deserialize)]
struct SparseDocument {
    height: usize,
    width: usize,
    channels: usize,
    entries: Vec<SparseRecord>,
}

/// Write a sparse map to disk. Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `{ height, width, channels, entries: [...] }`
/// * `.csv`  – header `row_freq,col_freq` + one `re`/`im` column pair per channel
pub fn save_file(path: &Path, map: &SparseCoefficientMap) -> Result<()> {
    match extension_of(path).as_str() {
        "json" => save_json(path, map),
        "csv" => save_csv(path, map),
        other => Err(Error::output(
            path,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported export extension: .{other}"),
            ),
        )),
    }
}

/// Read a sparse map back from disk. Dispatch by extension.
pub fn load_file(path: &Path) -> Result<SparseCoefficientMap> {
    match extension_of(path).as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => Err(Error::input(format!(
            "unsupported import extension: .{other}"
        ))),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// -- JSON --

fn save_json(path: &Path, map: &SparseCoefficientMap) -> Result<()> {
    let doc = SparseDocument {
        height: map.height,
        width: map.width,
        channels: map.channels,
        entries: map
            .entries
            .iter()
            .map(|(freq, value)| SparseRecord {
                row: freq.row,
                col: freq.col,
                value: *value,
            })
            .collect(),
    };
    let file = File::create(path).map_err(|e| Error::output(path, e))?;
    serde_json::to_writer_pretty(file, &doc).map_err(|e| Error::output(path, e))
}

fn load_json(path: &Path) -> Result<SparseCoefficientMap> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::input(format!("cannot read {}: {e}", path.display())))?;
    let doc: SparseDocument = serde_json::from_str(&text)
        .map_err(|e| Error::input(format!("cannot parse {}: {e}", path.display())))?;

    let mut entries = BTreeMap::new();
    for rec in doc.entries {
        entries.insert(
            FrequencyIndex {
                row: rec.row,
                col: rec.col,
            },
            rec.value,
        );
    }
    Ok(SparseCoefficientMap {
        entries,
        height: doc.height,
        width: doc.width,
        channels: doc.channels,
    })
}

// -- CSV --

/// First data line carries the shape so the file stands alone:
/// `# height,width,channels` is not valid CSV, so the shape rides in a
/// leading pseudo-row with `row_freq = "shape"` instead.
fn save_csv(path: &Path, map: &SparseCoefficientMap) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::output(path, e))?;

    let mut header = vec!["row_freq".to_string(), "col_freq".to_string()];
    for ch in 0..map.channels {
        header.push(format!("re_{ch}"));
        header.push(format!("im_{ch}"));
    }
    writer
        .write_record(&header)
        .map_err(|e| Error::output(path, e))?;

    let mut shape_row = vec![
        "shape".to_string(),
        map.height.to_string(),
        map.width.to_string(),
        map.channels.to_string(),
    ];
    shape_row.resize(header.len(), String::new());
    writer
        .write_record(&shape_row)
        .map_err(|e| Error::output(path, e))?;

    for (freq, value) in &map.entries {
        let mut row = vec![freq.row.to_string(), freq.col.to_string()];
        for v in value.as_slice() {
            row.push(format!("{:e}", v.re));
            row.push(format!("{:e}", v.im));
        }
        writer.write_record(&row).map_err(|e| Error::output(path, e))?;
    }
    writer.flush().map_err(|e| Error::output(path, e))
}

fn load_csv(path: &Path) -> Result<SparseCoefficientMap> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::input(format!("cannot open {}: {e}", path.display())))?;

    let mut rows = reader.records();
    let shape_row = rows
        .next()
        .ok_or_else(|| Error::input("CSV sparse map is missing its shape row"))?
        .map_err(|e| Error::input(format!("CSV shape row: {e}")))?;
    if shape_row.get(0) != Some("shape") {
        return Err(Error::input("CSV sparse map must start with a shape row"));
    }
    let height = parse_field(&shape_row, 1, "height")?;
    let width = parse_field(&shape_row, 2, "width")?;
    let channels: usize = parse_field(&shape_row, 3, "channels")?;
    if channels != 1 && channels != 3 {
        return Err(Error::input(format!(
            "CSV sparse map declares {channels} channels, expected 1 or 3"
        )));
    }

    let mut entries = BTreeMap::new();
    for (line, record) in rows.enumerate() {
        let record = record.map_err(|e| Error::input(format!("CSV row {line}: {e}")))?;
        let expected = 2 + 2 * channels;
        if record.len() != expected {
            return Err(Error::input(format!(
                "CSV row {line}: expected {expected} fields, got {}",
                record.len()
            )));
        }
        let freq = FrequencyIndex {
            row: parse_field(&record, 0, "row_freq")?,
            col: parse_field(&record, 1, "col_freq")?,
        };
        let mut values = [Complex::new(0.0, 0.0); 3];
        for (ch, value) in values.iter_mut().enumerate().take(channels) {
            *value = Complex::new(
                parse_field(&record, 2 + 2 * ch, "re")?,
                parse_field(&record, 3 + 2 * ch, "im")?,
            );
        }
        let value = if channels == 1 {
            SparseValue::Gray(values[0])
        } else {
            SparseValue::Rgb(values)
        };
        entries.insert(freq, value);
    }

    Ok(SparseCoefficientMap {
        entries,
        height,
        width,
        channels,
    })
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = record
        .get(index)
        .ok_or_else(|| Error::input(format!("missing CSV field '{name}'")))?;
    raw.trim()
        .parse()
        .map_err(|e| Error::input(format!("CSV field '{name}' = '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeepFraction;
    use crate::data::model::ImageArray;
    use crate::fourier::selector::{low_pass, top_k};
    use crate::fourier::transform::forward_transform;

    fn rgb_coefficients() -> CoefficientArray {
        let data = Array3::from_shape_fn((6, 8, 3), |(i, j, ch)| {
            ((i * 5 + j * 2 + ch * 3) % 13) as f64 / 13.0
        });
        forward_transform(&ImageArray::new(data).unwrap())
    }

    #[test]
    fn sparse_round_trip_is_exact() {
        let sparsified = top_k(&rgb_coefficients(), 12).unwrap();
        let map = from_coefficients(&sparsified);
        assert_eq!(map.len(), sparsified.retained_positions());
        let rebuilt = to_coefficients(&map).unwrap();
        // bit-exact: no precision loss, no extra or missing entries
        assert_eq!(rebuilt, sparsified);
    }

    #[test]
    fn only_non_zero_positions_are_recorded() {
        let coeffs = rgb_coefficients();
        let dc_only = low_pass(&coeffs, KeepFraction::Isotropic(0.0)).unwrap();
        let map = from_coefficients(&dc_only);
        assert_eq!(map.len(), 1);
        let (freq, value) = map.entries.iter().next().unwrap();
        assert_eq!(*freq, FrequencyIndex { row: 0, col: 0 });
        assert_eq!(value.channels(), 3);
    }

    #[test]
    fn grayscale_entries_hold_single_values() {
        let img = ImageArray::from_2d(ndarray::Array2::from_elem((4, 4), 0.5)).unwrap();
        let map = from_coefficients(&forward_transform(&img));
        assert!(map
            .entries
            .values()
            .all(|v| matches!(v, SparseValue::Gray(_))));
    }

    #[test]
    fn map_is_independent_of_source_traversal_order() {
        // Same contents reached through different selection paths must
        // produce identical maps.
        let coeffs = rgb_coefficients();
        let a = from_coefficients(&low_pass(&coeffs, KeepFraction::Isotropic(1.0)).unwrap());
        let b = from_coefficients(&top_k(&coeffs, 6 * 8).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn out_of_range_entries_are_rejected_on_rebuild() {
        let mut map = from_coefficients(&rgb_coefficients());
        map.entries.insert(
            FrequencyIndex { row: 100, col: 0 },
            SparseValue::Rgb([Complex::new(1.0, 0.0); 3]),
        );
        assert!(matches!(to_coefficients(&map), Err(Error::Input { .. })));
    }

    #[test]
    fn json_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coeffs.json");
        let map = from_coefficients(&top_k(&rgb_coefficients(), 7).unwrap());
        save_file(&path, &map).unwrap();
        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn csv_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coeffs.csv");
        let map = from_coefficients(&top_k(&rgb_coefficients(), 7).unwrap());
        save_file(&path, &map).unwrap();
        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let map = from_coefficients(&rgb_coefficients());
        assert!(save_file(Path::new("coeffs.parquet"), &map).is_err());
        assert!(load_file(Path::new("coeffs.parquet")).is_err());
    }
}
