//! Height grid storage
//!
//! Rows map to world X, columns to world Z. Values are stored row-major.

#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    width: usize,
    depth: usize,
    heights: Vec<f32>,
}

impl HeightGrid {
    /// A `width × depth` grid of zeros
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            heights: vec![0.0; width * depth],
        }
    }

    /// Wraps existing row-major data; `None` when the length does not match
    pub fn from_data(heights: Vec<f32>, width: usize, depth: usize) -> Option<Self> {
        (heights.len() == width * depth).then_some(Self {
            width,
            depth,
            heights,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.depth)
    }

    #[inline]
    fn index(&self, x: usize, z: usize) -> usize {
        debug_assert!(x < self.width && z < self.depth);
        x * self.depth + z
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.heights[self.index(x, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, z: usize, height: f32) {
        let i = self.index(x, z);
        self.heights[i] = height;
    }

    #[inline]
    pub fn add(&mut self, x: usize, z: usize, delta: f32) {
        let i = self.index(x, z);
        self.heights[i] += delta;
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    pub fn into_heights(self) -> Vec<f32> {
        self.heights
    }

    pub fn min(&self) -> f32 {
        self.heights.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.heights.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Coordinates of the highest cell; the first one wins on ties
    pub fn argmax(&self) -> (usize, usize) {
        let mut best = 0;
        for (i, &h) in self.heights.iter().enumerate() {
            if h > self.heights[best] {
                best = i;
            }
        }
        (best / self.depth, best % self.depth)
    }

    /// Adds `delta` to every cell
    pub fn shift(&mut self, delta: f32) {
        for h in &mut self.heights {
            *h += delta;
        }
    }

    /// Multiplies every cell by `factor`
    pub fn scale(&mut self, factor: f32) {
        for h in &mut self.heights {
            *h *= factor;
        }
    }

    /// Element-wise `self += factor * other`. Shapes must match.
    pub fn accumulate(&mut self, other: &HeightGrid, factor: f32) {
        assert_eq!(self.shape(), other.shape(), "grid shapes differ");
        for (h, o) in self.heights.iter_mut().zip(&other.heights) {
            *h += factor * o;
        }
    }

    /// Partial derivatives `(∂h/∂x, ∂h/∂z)` at a cell.
    ///
    /// Central differences in the interior, one-sided at the borders.
    pub fn gradient(&self, x: usize, z: usize) -> (f32, f32) {
        let dx = Self::axis_difference(x, self.width, |i| self.get(i, z));
        let dz = Self::axis_difference(z, self.depth, |j| self.get(x, j));
        (dx, dz)
    }

    fn axis_difference(i: usize, len: usize, sample: impl Fn(usize) -> f32) -> f32 {
        if len < 2 {
            0.0
        } else if i == 0 {
            sample(1) - sample(0)
        } else if i == len - 1 {
            sample(i) - sample(i - 1)
        } else {
            (sample(i + 1) - sample(i - 1)) * 0.5
        }
    }

    /// Value below which a fraction `q` of the cells fall (linear interpolation)
    pub fn quantile(&self, q: f32) -> f32 {
        if self.heights.is_empty() {
            return 0.0;
        }
        let mut sorted = self.heights.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let t = pos - lo as f32;
        sorted[lo] + (sorted[hi] - sorted[lo]) * t
    }
}
