//! Crater carving
//!
//! The crater is a radially symmetric bump `height · exp(−dist / radius)`
//! added around a center cell, with a flat hole of `hole_radius` cut into its
//! top. Only a square window around the center is touched. After carving, the
//! whole grid is shifted so its lowest cell sits at exactly zero, and the lava
//! surface is placed just below the mean height of the crater rim.

use std::ops::Range;

use log::{debug, info};

use super::grid::HeightGrid;
use crate::error::{CalderaError, Result};

/// Parameters of one crater
#[derive(Debug, Clone, PartialEq)]
pub struct CraterSpec {
    /// Forced center cell; `None` picks the highest point of the grid
    pub center: Option<(usize, usize)>,
    /// Decay length of the profile
    pub radius: f32,
    /// Profile peak height
    pub height: f32,
    /// Radius of the flat hole at the top
    pub hole_radius: f32,
    /// Carving window half-width, in multiples of `radius`
    pub window_multiplier: f32,
    /// Width of the annulus just outside the hole that samples the rim
    pub rim_width: f32,
    /// How far below the rim the lava surface sits
    pub rim_margin: f32,
}

impl CraterSpec {
    pub const DEFAULT_WINDOW_MULTIPLIER: f32 = 4.0;
    pub const DEFAULT_RIM_WIDTH: f32 = 5.0;
    pub const DEFAULT_RIM_MARGIN: f32 = 0.5;

    pub fn new(radius: f32, height: f32, hole_radius: f32) -> Self {
        Self {
            center: None,
            radius,
            height,
            hole_radius,
            window_multiplier: Self::DEFAULT_WINDOW_MULTIPLIER,
            rim_width: Self::DEFAULT_RIM_WIDTH,
            rim_margin: Self::DEFAULT_RIM_MARGIN,
        }
    }

    /// Builder pattern: force the crater center
    pub fn with_center(mut self, x: usize, z: usize) -> Self {
        self.center = Some((x, z));
        self
    }

    /// Builder pattern: set the carving window multiplier
    pub fn with_window_multiplier(mut self, multiplier: f32) -> Self {
        self.window_multiplier = multiplier;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.radius) {
            return Err(CalderaError::InvalidCrater(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !positive(self.hole_radius) {
            return Err(CalderaError::InvalidCrater(format!(
                "hole radius must be positive, got {}",
                self.hole_radius
            )));
        }
        if self.hole_radius >= self.radius {
            return Err(CalderaError::InvalidCrater(format!(
                "hole radius {} must be smaller than crater radius {}",
                self.hole_radius, self.radius
            )));
        }
        if !positive(self.window_multiplier) {
            return Err(CalderaError::InvalidCrater(format!(
                "window multiplier must be positive, got {}",
                self.window_multiplier
            )));
        }
        if !self.height.is_finite() || !self.rim_width.is_finite() || !self.rim_margin.is_finite()
        {
            return Err(CalderaError::InvalidCrater(
                "height, rim width and rim margin must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Half-width of the carving window in cells
    pub fn window_half_width(&self) -> usize {
        (self.window_multiplier * self.radius) as usize
    }
}

/// Outcome of [`carve`]
#[derive(Debug, Clone, PartialEq)]
pub struct Crater {
    /// Center after clamping
    pub center: (usize, usize),
    /// Grid rows touched by the carve
    pub window_x: Range<usize>,
    /// Grid columns touched by the carve
    pub window_z: Range<usize>,
    /// Cells inside the flat hole, in grid coordinates
    pub lava_cells: Vec<(usize, usize)>,
    /// Elevation of the lava surface
    pub lava_height: f32,
    /// Amount subtracted from every cell by the final shift
    pub shift: f32,
}

/// Moves `c` so `[c - half, c + half)` fits in `0..len`. When no position
/// fits, the axis midpoint is used.
fn clamp_center(c: usize, half: usize, len: usize) -> usize {
    if 2 * half <= len {
        c.clamp(half, len - half)
    } else {
        len / 2
    }
}

fn window(c: usize, half: usize, len: usize) -> Range<usize> {
    c.saturating_sub(half)..(c + half).min(len)
}

/// Carves a crater into `grid` in place.
///
/// Fails only on invalid parameters, before the grid is touched.
pub fn carve(grid: &mut HeightGrid, spec: &CraterSpec) -> Result<Crater> {
    spec.validate()?;

    let (width, depth) = grid.shape();
    let requested = spec.center.unwrap_or_else(|| grid.argmax());
    let half = spec.window_half_width();
    let center = (
        clamp_center(requested.0, half, width),
        clamp_center(requested.1, half, depth),
    );
    if center != requested {
        debug!("Crater center moved from {requested:?} to {center:?} to fit the window");
    }
    info!("Crater center: {center:?}");

    let window_x = window(center.0, half, width);
    let window_z = window(center.1, half, depth);
    let distance = |i: usize, j: usize| {
        let dx = i as f32 - center.0 as f32;
        let dz = j as f32 - center.1 as f32;
        (dx * dx + dz * dz).sqrt()
    };

    // Profile over the window, lowest value shifted to zero
    let window_cells = || {
        window_x
            .clone()
            .flat_map(|i| window_z.clone().map(move |j| (i, j)))
    };
    let mut profile: Vec<(usize, usize, f32, f32)> = window_cells()
        .map(|(i, j)| {
            let d = distance(i, j);
            (i, j, d, spec.height * (-d / spec.radius).exp())
        })
        .collect();
    let floor = profile
        .iter()
        .map(|&(.., h)| h)
        .fold(f32::INFINITY, f32::min);

    let mut lava_cells = Vec::new();
    for (i, j, d, h) in &mut profile {
        *h -= floor;
        if *d < spec.hole_radius {
            *h = 0.0;
            lava_cells.push((*i, *j));
        }
        grid.add(*i, *j, *h);
    }

    let shift = grid.min();
    grid.shift(-shift);

    let rim_outer = spec.hole_radius + spec.rim_width;
    let mean = |cells: &mut dyn Iterator<Item = f32>| {
        let (sum, count) = cells.fold((0.0f64, 0usize), |(s, n), h| (s + h as f64, n + 1));
        (count > 0).then(|| (sum / count as f64) as f32)
    };
    let rim = mean(
        &mut profile
            .iter()
            .filter(|&&(_, _, d, _)| d > spec.hole_radius && d < rim_outer)
            .map(|&(i, j, ..)| grid.get(i, j)),
    );
    let rim = match rim {
        Some(rim) => {
            if window_x.len() < 2 * rim_outer.ceil() as usize
                || window_z.len() < 2 * rim_outer.ceil() as usize
            {
                debug!("Rim annulus clipped by the carving window; rim height is approximate");
            }
            rim
        }
        None => {
            debug!("Rim annulus is empty; using the mean hole elevation");
            mean(&mut lava_cells.iter().map(|&(i, j)| grid.get(i, j))).unwrap_or(0.0)
        }
    };
    let lava_height = rim - spec.rim_margin;
    info!(
        "Crater carved: {} lava cells, lava height {:.3}",
        lava_cells.len(),
        lava_height
    );

    Ok(Crater {
        center,
        window_x,
        window_z,
        lava_cells,
        lava_height,
        shift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::noise::fractal2d;
    use rand::{rngs::StdRng, SeedableRng};

    fn noisy_grid(dim: usize, seed: u64) -> HeightGrid {
        let mut grid = fractal2d((dim, dim), (1, 1), 4, 0.4, &mut StdRng::seed_from_u64(seed));
        grid.scale(20.0);
        grid
    }

    #[test]
    fn test_rejects_malformed_parameters() {
        let mut grid = HeightGrid::new(50, 50);
        let before = grid.clone();
        for spec in [
            CraterSpec::new(10.0, 5.0, 10.0),
            CraterSpec::new(10.0, 5.0, 12.0),
            CraterSpec::new(0.0, 5.0, 1.0),
            CraterSpec::new(-3.0, 5.0, 1.0),
            CraterSpec::new(10.0, 5.0, 0.0),
            CraterSpec::new(10.0, 5.0, 2.0).with_window_multiplier(0.0),
        ] {
            assert!(matches!(
                carve(&mut grid, &spec),
                Err(CalderaError::InvalidCrater(_))
            ));
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn test_hole_is_flat_and_minimum_is_zero() {
        let mut grid = noisy_grid(120, 3);
        let before = grid.clone();
        let spec = CraterSpec::new(8.0, 30.0, 4.0).with_window_multiplier(3.0);

        let crater = carve(&mut grid, &spec).unwrap();

        assert_eq!(grid.min(), 0.0);
        assert!(!crater.lava_cells.is_empty());
        for &(i, j) in &crater.lava_cells {
            assert_eq!(grid.get(i, j), before.get(i, j) - crater.shift);
        }
    }

    #[test]
    fn test_auto_center_is_highest_point() {
        let mut grid = HeightGrid::new(100, 100);
        grid.set(47, 52, 10.0);
        let crater = carve(&mut grid, &CraterSpec::new(5.0, 10.0, 2.0)).unwrap();
        assert_eq!(crater.center, (47, 52));
        assert!(crater.lava_cells.contains(&(47, 52)));
    }

    #[test]
    fn test_center_clamped_toward_interior() {
        let mut grid = HeightGrid::new(100, 100);
        let spec = CraterSpec::new(5.0, 10.0, 2.0).with_center(3, 98);
        let crater = carve(&mut grid, &spec).unwrap();

        assert_eq!(crater.center, (20, 80));
        assert_eq!(crater.window_x, 0..40);
        assert_eq!(crater.window_z, 60..100);
    }

    #[test]
    fn test_oversized_window_is_clipped_to_grid() {
        let mut grid = HeightGrid::new(60, 60);
        let spec = CraterSpec::new(30.0, 40.0, 10.0).with_center(5, 5);
        let crater = carve(&mut grid, &spec).unwrap();

        assert_eq!(crater.center, (30, 30));
        assert_eq!(crater.window_x, 0..60);
        assert_eq!(crater.window_z, 0..60);
    }

    #[test]
    fn test_profile_decays_from_the_rim() {
        let mut grid = HeightGrid::new(80, 80);
        let spec = CraterSpec::new(6.0, 20.0, 3.0).with_center(40, 40);
        carve(&mut grid, &spec).unwrap();

        // Flat grid: the hole ends up at the global minimum, the rim highest
        assert_eq!(grid.get(40, 40), 0.0);
        assert!(grid.get(40, 44) > grid.get(40, 50));
        assert!(grid.get(40, 50) > grid.get(40, 60));
    }

    /// Mean height of the grid cells strictly between `inner` and `outer`
    /// from `center`
    fn annulus_mean(grid: &HeightGrid, center: (usize, usize), inner: f32, outer: f32) -> f32 {
        let (width, depth) = grid.shape();
        let rim: Vec<f32> = (0..width)
            .flat_map(|i| (0..depth).map(move |j| (i, j)))
            .filter(|&(i, j)| {
                let dx = i as f32 - center.0 as f32;
                let dz = j as f32 - center.1 as f32;
                let d = (dx * dx + dz * dz).sqrt();
                d > inner && d < outer
            })
            .map(|(i, j)| grid.get(i, j))
            .collect();
        assert!(!rim.is_empty());
        rim.iter().sum::<f32>() / rim.len() as f32
    }

    #[test]
    fn test_lava_sits_below_rim() {
        let mut grid = HeightGrid::new(80, 80);
        let spec = CraterSpec::new(6.0, 20.0, 3.0).with_center(40, 40);
        let crater = carve(&mut grid, &spec).unwrap();

        let mean = annulus_mean(&grid, (40, 40), 3.0, 8.0);
        assert!((crater.lava_height - (mean - 0.5)).abs() < 1e-3);
    }

    #[test]
    fn test_custom_rim_width_and_margin() {
        let mut grid = HeightGrid::new(80, 80);
        let mut spec = CraterSpec::new(6.0, 20.0, 3.0).with_center(40, 40);
        spec.rim_width = 2.0;
        spec.rim_margin = 1.5;
        let crater = carve(&mut grid, &spec).unwrap();

        let narrow = annulus_mean(&grid, (40, 40), 3.0, 5.0);
        let wide = annulus_mean(&grid, (40, 40), 3.0, 8.0);
        assert!((crater.lava_height - (narrow - 1.5)).abs() < 1e-3);
        // A narrow annulus hugs the rim, so it samples higher ground
        assert!(narrow > wide);
    }

    #[test]
    fn test_rim_clipped_by_window_averages_what_is_left() {
        let mut grid = HeightGrid::new(20, 20);
        let mut spec = CraterSpec::new(10.0, 30.0, 3.0);
        spec.rim_width = 15.0;
        let crater = carve(&mut grid, &spec).unwrap();

        // The annulus reaches 18 cells out but the grid ends at most 14.2 away
        assert_eq!(crater.center, (10, 10));
        assert_eq!(crater.window_x, 0..20);
        assert_eq!(crater.window_z, 0..20);
        let mean = annulus_mean(&grid, (10, 10), 3.0, 18.0);
        assert!((crater.lava_height - (mean - 0.5)).abs() < 1e-3);
    }

    #[test]
    fn test_empty_rim_falls_back_to_hole_mean() {
        // Height rises with x so the hole mean is easy to predict
        let heights = (0..400).map(|i| (i / 20) as f32).collect();
        let mut grid = HeightGrid::from_data(heights, 20, 20).unwrap();
        // Window half-width 3 keeps every window cell within 4.3 of the
        // center, inside the hole of radius 5
        let spec = CraterSpec::new(10.0, 30.0, 5.0)
            .with_center(10, 10)
            .with_window_multiplier(0.3);
        let crater = carve(&mut grid, &spec).unwrap();

        assert_eq!(crater.window_x, 7..13);
        assert_eq!(crater.lava_cells.len(), 36);
        // Rows 7..13 average 9.5; the grid minimum stays at row 0
        assert_eq!(crater.shift, 0.0);
        assert!((crater.lava_height - (9.5 - 0.5)).abs() < 1e-5);
    }
}
