//! Loader for access-point coordinate files.
//!
//! The format is one `name,x,y,z` record per line with coordinates in meters,
//! no header row, and `#` comment lines. Bad rows are dropped and reported as
//! [`RowDiagnostic`]s; they never abort the load.

use crate::error::LoadError;
use crate::transmitter::Transmitter;
use glam::DVec3;
use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// One rejected row
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostic {
    /// 1-based line number in the source file
    pub line: usize,
    pub message: String,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.line, self.message)
    }
}

/// Result of parsing a coordinate file: accepted transmitters in input order
/// plus one diagnostic per rejected row.
#[derive(Debug, Clone, Default)]
pub struct ApLoad {
    pub transmitters: Vec<Transmitter>,
    pub diagnostics: Vec<RowDiagnostic>,
    pub total_lines: usize,
}

impl ApLoad {
    /// True when every record parsed
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && !self.transmitters.is_empty()
    }
}

/// Parses coordinate records from an in-memory string.
pub fn parse_ap_str(content: &str) -> ApLoad {
    let mut load = ApLoad::default();
    let mut seen_names = HashSet::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        load.total_lines = line_number;

        let line = raw_line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_row(line) {
            Ok(tx) => {
                if !seen_names.insert(tx.name().to_string()) {
                    load.diagnostics.push(RowDiagnostic {
                        line: line_number,
                        message: format!("Duplicate AP name '{}'", tx.name()),
                    });
                    continue;
                }
                debug!(name = tx.name(), line = line_number, "parsed AP");
                load.transmitters.push(tx);
            }
            Err(message) => load.diagnostics.push(RowDiagnostic {
                line: line_number,
                message,
            }),
        }
    }

    load
}

fn parse_row(line: &str) -> Result<Transmitter, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(format!(
            "Insufficient columns (need name,x,y,z, found {})",
            fields.len()
        ));
    }

    let name = fields[0].trim_matches('"').trim();
    if name.is_empty() {
        return Err("Empty AP name".to_string());
    }

    let mut coords = [0.0; 3];
    for (slot, (axis, field)) in coords
        .iter_mut()
        .zip(["x", "y", "z"].iter().zip(&fields[1..4]))
    {
        *slot = match field.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => return Err(format!("Invalid coordinates - {}='{}'", axis, field)),
        };
    }

    Ok(Transmitter::new(
        name,
        DVec3::new(coords[0], coords[1], coords[2]),
    ))
}

/// Loads a coordinate file.
///
/// A missing or unreadable file fails once; a file with zero parseable rows
/// fails with every row diagnostic attached. Otherwise the load succeeds even
/// when some rows were rejected.
pub fn load_ap_file<P: AsRef<Path>>(path: P) -> Result<ApLoad, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let load = parse_ap_str(&content);
    for diagnostic in &load.diagnostics {
        warn!("{}: {}", path.display(), diagnostic);
    }

    if load.transmitters.is_empty() {
        return Err(LoadError::NoValidRows {
            path: path.to_path_buf(),
            diagnostics: load.diagnostics,
        });
    }

    info!(
        "Loaded {} AP positions from {} ({} rejected rows)",
        load.transmitters.len(),
        path.display(),
        load.diagnostics.len()
    );
    Ok(load)
}

/// Writes transmitters back in the same `name,x,y,z` format (no header).
pub fn write_transmitters<P: AsRef<Path>>(path: P, transmitters: &[Transmitter]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for tx in transmitters {
        let p = tx.position();
        writeln!(out, "{},{},{},{}", tx.name(), p.x, p.y, p.z)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn parses_valid_rows_in_order() {
        let load = parse_ap_str("AP_01,5.0,10.0,3.0\nAP_02,15.0,20.0,3.0\n");
        assert!(load.is_clean());
        assert_eq!(load.transmitters.len(), 2);
        assert_eq!(load.transmitters[0].name(), "AP_01");
        assert_eq!(load.transmitters[0].position(), DVec3::new(5.0, 10.0, 3.0));
        assert_eq!(load.transmitters[1].name(), "AP_02");
    }

    #[test]
    fn rejects_bad_rows_with_one_diagnostic_each() {
        let content = "AP_01,5,10,3\n\
                       AP_02,1,2\n\
                       ,1,2,3\n\
                       AP_04,1,abc,3\n\
                       AP_05,1,2,NaN\n\
                       AP_06,7,8,9,extra\n";
        let load = parse_ap_str(content);

        let names: Vec<_> = load.transmitters.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["AP_01", "AP_06"]);
        assert_eq!(load.diagnostics.len(), 4);
        assert_eq!(load.diagnostics[0].line, 2);
        assert!(load.diagnostics[0].message.contains("Insufficient columns"));
        assert_eq!(load.diagnostics[1].to_string(), "Row 3: Empty AP name");
        assert!(load.diagnostics[2].message.contains("y='abc'"));
        assert!(load.diagnostics[3].message.contains("z='NaN'"));
        assert!(load.transmitters.len() + load.diagnostics.len() <= load.total_lines);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let load = parse_ap_str("# floor 2\n\n  AP_01 , 1.5 , 2.5 , 3.0 \n   \n");
        assert!(load.is_clean());
        assert_eq!(load.transmitters[0].name(), "AP_01");
        assert_eq!(load.transmitters[0].position(), DVec3::new(1.5, 2.5, 3.0));
        assert_eq!(load.total_lines, 4);
    }

    #[test]
    fn duplicate_names_keep_first() {
        let load = parse_ap_str("AP,1,1,1\nAP,2,2,2\n");
        assert_eq!(load.transmitters.len(), 1);
        assert_eq!(load.transmitters[0].position(), DVec3::new(1.0, 1.0, 1.0));
        assert!(load.diagnostics[0].message.contains("Duplicate"));
    }

    #[test]
    fn missing_file_is_a_hard_failure() {
        let err = load_ap_file("/path/that/does/not/exist.csv").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn file_without_valid_rows_fails_with_diagnostics() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bad row").unwrap();
        writeln!(file, "AP,x,y,z").unwrap();

        match load_ap_file(file.path()) {
            Err(LoadError::NoValidRows { diagnostics, .. }) => assert_eq!(diagnostics.len(), 2),
            other => panic!("expected NoValidRows, got {:?}", other),
        }
    }

    #[test]
    fn write_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transmitters.csv");
        let txs = vec![
            Transmitter::new("B", DVec3::new(1.0, 2.0, 3.0)),
            Transmitter::new("A", DVec3::new(-4.5, 0.25, 2.0)),
        ];
        write_transmitters(&path, &txs).unwrap();

        let load = load_ap_file(&path).unwrap();
        assert_eq!(load.transmitters, txs);
    }
}
