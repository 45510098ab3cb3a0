//! 2D gradient (Perlin) noise and its fractal sum
//!
//! Noise is sampled on a regular grid rather than at arbitrary points: a
//! lattice of `(res_x + 1) × (res_y + 1)` random unit gradients spans the whole
//! output, and every output cell interpolates the four gradients of the
//! lattice cell that encloses it.
//!
//! Randomness is drawn from the caller's generator, so one seeded `StdRng`
//! reproduces a full terrain exactly.

use std::f64::consts::{SQRT_2, TAU};

use rand::Rng;

use super::grid::HeightGrid;

/// Fade curve `6t⁵ − 15t⁴ + 10t³`.
///
/// First and second derivatives vanish at both ends, so neighbouring lattice
/// cells join without visible creases.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Unit gradient vectors at uniformly random angles, row-major
/// `(res_x + 1) × (res_y + 1)`
fn random_gradients<R: Rng + ?Sized>(res: (usize, usize), rng: &mut R) -> Vec<[f64; 2]> {
    (0..(res.0 + 1) * (res.1 + 1))
        .map(|_| {
            let angle = TAU * rng.random::<f64>();
            [angle.cos(), angle.sin()]
        })
        .collect()
}

/// Lattice cell index and fractional offset of sample `i` out of `len`
/// samples spread over `res` lattice cells
#[inline]
fn lattice_position(i: usize, len: usize, res: usize) -> (usize, f64) {
    let pos = i as f64 * res as f64 / len as f64;
    let cell = (pos.floor() as usize).min(res - 1);
    (cell, pos - cell as f64)
}

/// Single-octave gradient noise over a `shape` grid with `res` lattice cells
/// per axis.
///
/// The noise is evaluated on a working buffer rounded up to the next power of
/// two per axis and cropped back to `shape`. Values lie in `[−√2, √2]`.
pub fn perlin2d<R: Rng + ?Sized>(
    shape: (usize, usize),
    res: (usize, usize),
    rng: &mut R,
) -> HeightGrid {
    assert!(res.0 > 0 && res.1 > 0, "noise resolution must be positive");

    let work = (shape.0.next_power_of_two(), shape.1.next_power_of_two());
    let gradients = random_gradients(res, rng);
    let gradient = |gx: usize, gy: usize| gradients[gx * (res.1 + 1) + gy];

    let mut out = HeightGrid::new(shape.0, shape.1);
    for i in 0..shape.0 {
        let (cx, fx) = lattice_position(i, work.0, res.0);
        let u = fade(fx);
        for j in 0..shape.1 {
            let (cy, fy) = lattice_position(j, work.1, res.1);
            let v = fade(fy);

            let dot = |g: [f64; 2], dx: f64, dy: f64| g[0] * dx + g[1] * dy;
            let n00 = dot(gradient(cx, cy), fx, fy);
            let n10 = dot(gradient(cx + 1, cy), fx - 1.0, fy);
            let n01 = dot(gradient(cx, cy + 1), fx, fy - 1.0);
            let n11 = dot(gradient(cx + 1, cy + 1), fx - 1.0, fy - 1.0);

            let n0 = lerp(n00, n10, u);
            let n1 = lerp(n01, n11, u);
            out.set(i, j, (SQRT_2 * lerp(n0, n1, v)) as f32);
        }
    }
    out
}

/// Sum of `octaves` noise layers, each doubling the lattice resolution and
/// scaling its amplitude by `persistence`.
///
/// The sum is not normalized; callers apply their own amplitude.
pub fn fractal2d<R: Rng + ?Sized>(
    shape: (usize, usize),
    res: (usize, usize),
    octaves: u32,
    persistence: f32,
    rng: &mut R,
) -> HeightGrid {
    let mut noise = HeightGrid::new(shape.0, shape.1);
    let mut frequency = 1;
    let mut amplitude = 1.0;
    for _ in 0..octaves {
        let layer = perlin2d(shape, (frequency * res.0, frequency * res.1), rng);
        noise.accumulate(&layer, amplitude);
        frequency *= 2;
        amplitude *= persistence;
    }
    noise
}
