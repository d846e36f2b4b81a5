//! Plain CSV grids: one line per grid row (ascending y), one value per column
//! (ascending x), no header. Used for the coverage data artifact and for
//! exchanging results with an external ray tracer.

use crate::grid::Grid;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

pub fn write_grid_csv<P: AsRef<Path>, T: Display>(path: P, grid: &Grid, values: &[T]) -> io::Result<()> {
    if values.len() != grid.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} values for a {}x{} grid", values.len(), grid.ny, grid.nx),
        ));
    }

    let mut out = BufWriter::new(File::create(path)?);
    for row in values.chunks(grid.nx) {
        let line = row.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

/// Reads a grid CSV, checking it has exactly `ny` rows of `nx` values.
pub fn read_grid_csv<P: AsRef<Path>, T: FromStr>(path: P, grid: &Grid) -> Result<Vec<T>, String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;

    let mut values = Vec::with_capacity(grid.len());
    let mut rows = 0;
    for (line_index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        rows += 1;
        let before = values.len();
        for field in line.split(',') {
            let value = field.trim().parse::<T>().map_err(|_| {
                format!("{} line {}: bad value '{}'", path.display(), line_index + 1, field.trim())
            })?;
            values.push(value);
        }
        if values.len() - before != grid.nx {
            return Err(format!(
                "{} line {}: expected {} columns, found {}",
                path.display(),
                line_index + 1,
                grid.nx,
                values.len() - before
            ));
        }
    }

    if rows != grid.ny {
        return Err(format!("{}: expected {} rows, found {}", path.display(), grid.ny, rows));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transmitter::Bounds;

    #[test]
    fn grid_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        let grid = Grid::new(Bounds::new(0.0, 0.0, 3.0, 2.0), 1.0);
        write_grid_csv(&path, &grid, &[1.5, 2.0, 3.0, -4.0, -5.5, 6.0]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1.5,2,3\n-4,-5.5,6\n");

        let back: Vec<f64> = read_grid_csv(&path, &grid).unwrap();
        assert_eq!(back, vec![1.5, 2.0, 3.0, -4.0, -5.5, 6.0]);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        fs::write(&path, "1,2\n3,4\n").unwrap();

        let wide = Grid::new(Bounds::new(0.0, 0.0, 3.0, 2.0), 1.0);
        let err = read_grid_csv::<_, f64>(&path, &wide).unwrap_err();
        assert!(err.contains("expected 3 columns"));

        let tall = Grid::new(Bounds::new(0.0, 0.0, 2.0, 3.0), 1.0);
        let err = read_grid_csv::<_, f64>(&path, &tall).unwrap_err();
        assert!(err.contains("expected 3 rows"));

        let grid = Grid::new(Bounds::new(0.0, 0.0, 2.0, 2.0), 1.0);
        assert!(write_grid_csv(&path, &grid, &[1.0]).is_err());
    }
}
