//! Coverage heat map PNG rendering
//!
//! Each grid cell becomes a square block of pixels. Image rows are flipped so
//! that +y points up, the same orientation as a floor plan.

use crate::config::ImageConfig;
use crate::coverage::CoverageMap;
use crate::error::SimError;
use crate::grid::Grid;
use crate::transmitter::Transmitter;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut};
use imageproc::rect::Rect;
use std::path::Path;

const MASKED: Rgb<u8> = Rgb([235, 235, 235]);
const MARKER_EDGE: Rgb<u8> = Rgb([0, 0, 0]);
const MARKER_FILL: Rgb<u8> = Rgb([30, 30, 200]);
const PANEL_GAP_PX: u32 = 8;
const PANEL_COLUMNS: usize = 3;

/// Twelve-color qualitative palette for AP zones
const ZONE_PALETTE: [[u8; 3]; 12] = [
    [141, 211, 199],
    [255, 255, 179],
    [190, 186, 218],
    [251, 128, 114],
    [128, 177, 211],
    [253, 180, 98],
    [179, 222, 105],
    [252, 205, 229],
    [217, 217, 217],
    [188, 128, 189],
    [204, 235, 197],
    [255, 237, 111],
];

/// Signal gradient stops: red, orange, yellow, light green, green
const SIGNAL_STOPS: [[u8; 3]; 5] = [
    [255, 0, 0],
    [255, 165, 0],
    [255, 255, 0],
    [144, 238, 144],
    [0, 128, 0],
];

/// Maps `dbm` within `[min_dbm, max_dbm]` onto the weak-to-strong gradient.
pub fn signal_to_color(dbm: f64, min_dbm: f64, max_dbm: f64) -> Rgb<u8> {
    let span = max_dbm - min_dbm;
    let t = if !dbm.is_finite() {
        0.0
    } else if span > 0.0 {
        ((dbm - min_dbm) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let segments = (SIGNAL_STOPS.len() - 1) as f64;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(SIGNAL_STOPS.len() - 2);
    let local = pos - i as f64;
    let (a, b) = (SIGNAL_STOPS[i], SIGNAL_STOPS[i + 1]);
    let mix = |k: usize| (a[k] as f64 + (b[k] as f64 - a[k] as f64) * local).round() as u8;
    Rgb([mix(0), mix(1), mix(2)])
}

pub fn zone_color(tx_index: usize) -> Rgb<u8> {
    Rgb(ZONE_PALETTE[tx_index % ZONE_PALETTE.len()])
}

/// Finite min/max of a set of values; `None` when nothing is finite
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

pub fn save_png(image: &RgbImage, path: &Path) -> Result<(), SimError> {
    image.save(path).map_err(|source| SimError::Image {
        path: path.to_path_buf(),
        source,
    })
}

pub struct HeatMapRenderer {
    grid: Grid,
    pixels_per_cell: u32,
}

impl HeatMapRenderer {
    pub fn new(grid: &Grid, config: &ImageConfig) -> Self {
        let longest = grid.nx.max(grid.ny).max(1) as u32;
        let fit = (config.max_dimension_px / longest).max(1);
        Self {
            grid: grid.clone(),
            pixels_per_cell: config.pixels_per_cell.min(fit).max(1),
        }
    }

    pub fn pixels_per_cell(&self) -> u32 {
        self.pixels_per_cell
    }

    /// Size of one rendered map in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (
            self.grid.nx as u32 * self.pixels_per_cell,
            self.grid.ny as u32 * self.pixels_per_cell,
        )
    }

    fn paint_cells<F>(&self, image: &mut RgbImage, origin: (i32, i32), color_of: F)
    where
        F: Fn(usize) -> Rgb<u8>,
    {
        let ppc = self.pixels_per_cell;
        for iy in 0..self.grid.ny {
            let row = (self.grid.ny - 1 - iy) as i32;
            for ix in 0..self.grid.nx {
                let color = color_of(self.grid.index(ix, iy));
                let rect = Rect::at(origin.0 + ix as i32 * ppc as i32, origin.1 + row * ppc as i32)
                    .of_size(ppc, ppc);
                draw_filled_rect_mut(image, rect, color);
            }
        }
    }

    /// Pixel of a world position inside a map drawn at `origin`
    fn world_to_pixel(&self, origin: (i32, i32), x: f64, y: f64) -> (i32, i32) {
        let ppc = self.pixels_per_cell as f64;
        let (_, height) = self.dimensions();
        let px = (x - self.grid.bounds.x_min) / self.grid.resolution_m * ppc + ppc / 2.0;
        let py = height as f64 - ((y - self.grid.bounds.y_min) / self.grid.resolution_m * ppc + ppc / 2.0);
        (origin.0 + px.round() as i32, origin.1 + py.round() as i32)
    }

    fn marker_radius(&self) -> i32 {
        (self.pixels_per_cell as i32 * 2).clamp(3, 12)
    }

    fn draw_marker(&self, image: &mut RgbImage, center: (i32, i32), fill: Rgb<u8>) {
        let r = self.marker_radius();
        draw_filled_circle_mut(image, center, r, fill);
        draw_hollow_circle_mut(image, center, r, MARKER_EDGE);
    }

    /// Best-signal map on the red-to-green gradient with a marker per AP
    pub fn render_signal(&self, coverage: &CoverageMap, transmitters: &[Transmitter]) -> RgbImage {
        let (width, height) = self.dimensions();
        let mut image = RgbImage::new(width, height);
        let (lo, hi) = finite_range(&coverage.signal_dbm).unwrap_or((-100.0, -30.0));
        self.paint_cells(&mut image, (0, 0), |cell| {
            signal_to_color(coverage.signal_dbm[cell], lo, hi)
        });
        for tx in transmitters {
            let p = tx.position();
            let center = self.world_to_pixel((0, 0), p.x, p.y);
            self.draw_marker(&mut image, center, MARKER_FILL);
        }
        image
    }

    /// Cells colored by winning AP; cells at or below `mask_dbm` are greyed out
    pub fn render_zones(&self, coverage: &CoverageMap, transmitters: &[Transmitter], mask_dbm: f64) -> RgbImage {
        let (width, height) = self.dimensions();
        let mut image = RgbImage::new(width, height);
        self.paint_cells(&mut image, (0, 0), |cell| {
            if coverage.signal_dbm[cell] > mask_dbm {
                zone_color(coverage.best_tx[cell])
            } else {
                MASKED
            }
        });
        for (i, tx) in transmitters.iter().enumerate() {
            let p = tx.position();
            let center = self.world_to_pixel((0, 0), p.x, p.y);
            self.draw_marker(&mut image, center, zone_color(i));
        }
        image
    }

    /// One panel per AP, laid out in rows of three, sharing a color scale
    pub fn render_panels(&self, panels: &[Vec<f64>], transmitters: &[Transmitter]) -> RgbImage {
        let (w, h) = self.dimensions();
        let count = panels.len().max(1);
        let cols = count.min(PANEL_COLUMNS) as u32;
        let rows = count.div_ceil(PANEL_COLUMNS) as u32;
        let width = cols * w + (cols - 1) * PANEL_GAP_PX;
        let height = rows * h + (rows - 1) * PANEL_GAP_PX;
        let mut image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

        let all: Vec<f64> = panels.iter().flatten().copied().collect();
        let (lo, hi) = finite_range(&all).unwrap_or((-100.0, -30.0));

        for (i, (values, tx)) in panels.iter().zip(transmitters).enumerate() {
            let origin = (
                ((i % PANEL_COLUMNS) as u32 * (w + PANEL_GAP_PX)) as i32,
                ((i / PANEL_COLUMNS) as u32 * (h + PANEL_GAP_PX)) as i32,
            );
            self.paint_cells(&mut image, origin, |cell| signal_to_color(values[cell], lo, hi));
            let p = tx.position();
            let center = self.world_to_pixel(origin, p.x, p.y);
            self.draw_marker(&mut image, center, MARKER_FILL);
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transmitter::Bounds;
    use glam::DVec3;

    fn grid() -> Grid {
        Grid::new(Bounds::new(0.0, 0.0, 4.0, 2.0), 1.0)
    }

    #[test]
    fn gradient_endpoints() {
        assert_eq!(signal_to_color(-90.0, -90.0, -30.0), Rgb([255, 0, 0]));
        assert_eq!(signal_to_color(-30.0, -90.0, -30.0), Rgb([0, 128, 0]));
        assert_eq!(signal_to_color(-60.0, -90.0, -30.0), Rgb([255, 255, 0]));
        assert_eq!(signal_to_color(f64::NEG_INFINITY, -90.0, -30.0), Rgb([255, 0, 0]));
        assert_eq!(signal_to_color(-50.0, -50.0, -50.0), Rgb([0, 128, 0]));
    }

    #[test]
    fn scale_respects_max_dimension() {
        let big = Grid::new(Bounds::new(0.0, 0.0, 1000.0, 10.0), 1.0);
        let renderer = HeatMapRenderer::new(
            &big,
            &ImageConfig {
                pixels_per_cell: 4,
                max_dimension_px: 2000,
            },
        );
        assert_eq!(renderer.pixels_per_cell(), 2);
        assert_eq!(renderer.dimensions(), (2000, 20));
    }

    #[test]
    fn rows_are_flipped_and_zones_masked() {
        let g = grid();
        // bottom row strong for AP 1, top row below the mask
        let coverage = CoverageMap::from_parts(
            g.clone(),
            vec![-40.0, -40.0, -40.0, -40.0, -95.0, -95.0, -95.0, -95.0],
            vec![1, 1, 1, 1, 0, 0, 0, 0],
        )
        .unwrap();
        let renderer = HeatMapRenderer::new(&g, &ImageConfig { pixels_per_cell: 10, max_dimension_px: 1000 });
        let image = renderer.render_zones(&coverage, &[], -80.0);
        assert_eq!(image.dimensions(), (40, 20));
        assert_eq!(*image.get_pixel(5, 15), zone_color(1));
        assert_eq!(*image.get_pixel(5, 5), MASKED);
    }

    #[test]
    fn panels_layout() {
        let g = grid();
        let renderer = HeatMapRenderer::new(&g, &ImageConfig { pixels_per_cell: 10, max_dimension_px: 1000 });
        let txs: Vec<Transmitter> = (0..4)
            .map(|i| Transmitter::new(format!("AP_{}", i), DVec3::new(i as f64, 1.0, 3.0)))
            .collect();
        let panels = vec![vec![-50.0; g.len()]; 4];
        let image = renderer.render_panels(&panels, &txs);
        assert_eq!(image.dimensions(), (3 * 40 + 2 * PANEL_GAP_PX, 2 * 20 + PANEL_GAP_PX));
    }

    #[test]
    fn signal_map_saves() {
        let g = grid();
        let coverage = CoverageMap::from_parts(g.clone(), vec![-60.0; g.len()], vec![0; g.len()]).unwrap();
        let renderer = HeatMapRenderer::new(&g, &ImageConfig::default());
        let tx = Transmitter::new("AP", DVec3::new(2.0, 1.0, 3.0));
        let image = renderer.render_signal(&coverage, &[tx]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        save_png(&image, &path).unwrap();
        assert!(path.exists());
    }
}
