//! Volcano smoke as a fixed pool of point-sprite particles.
//!
//! Dead particles are recycled: [`Smoke::respawn`] looks for the next unused
//! slot starting from the last one it handed out, so a steady emission rate
//! walks the pool round-robin instead of rescanning from the start.

use cgmath::{Matrix4, Vector3, Zero};
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::gfx::backend::{DrawCall, Primitive, RenderBackend};
use crate::gfx::scene::{Drawable, Vertex3D};
use crate::gfx::texture::Texture;
use crate::gfx::transform::translate;
use crate::gfx::uniforms::{UniformValue, Uniforms};

/// Sampler the smoke shader reads its sprite from
pub const SMOKE_SAMPLER: &str = "smoke_map";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub color: [f32; 4],
    /// Remaining life, dead at or below zero
    pub life: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            velocity: Vector3::zero(),
            color: [1.0; 4],
            life: 0.0,
        }
    }
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

pub struct Smoke {
    particles: Vec<Particle>,
    first_unused: usize,
    rng: StdRng,
    sprite: [Vertex3D; 1],
    texture: Option<Texture>,
    /// Upward speed of new particles
    pub rise_speed: f32,
    /// Life lost per second
    pub decay: f32,
}

impl Smoke {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            particles: vec![Particle::default(); capacity],
            first_unused: 0,
            rng: StdRng::seed_from_u64(seed),
            sprite: [Vertex3D::new([0.0; 3], [0.0, 1.0, 0.0])],
            texture: None,
            rise_speed: 2.0,
            decay: 0.5,
        }
    }

    /// Builder pattern: sprite texture
    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles
    pub fn alive(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// Index of a dead particle, searching from the last one found and
    /// wrapping around; `None` when every particle is alive
    pub fn find_first_unused(&mut self) -> Option<usize> {
        let len = self.particles.len();
        let found = (self.first_unused..len)
            .chain(0..self.first_unused.min(len))
            .find(|&i| !self.particles[i].is_alive())?;
        self.first_unused = found;
        Some(found)
    }

    /// Revives up to `count` dead particles around `offset`; returns how many
    /// were revived
    pub fn respawn(&mut self, offset: Vector3<f32>, count: usize) -> usize {
        let mut revived = 0;
        for _ in 0..count {
            let Some(index) = self.find_first_unused() else {
                break;
            };
            let jitter = Vector3::<f32>::new(
                self.rng.random_range(-0.5..0.5),
                self.rng.random_range(0.0..0.5),
                self.rng.random_range(-0.5..0.5),
            );
            let shade = 0.5 + self.rng.random::<f32>() / 100.0;
            let rise = self.rise_speed;

            let particle = &mut self.particles[index];
            particle.position = offset + jitter;
            particle.velocity = Vector3::new(jitter.x * 0.1, rise, jitter.z * 0.1);
            particle.color = [shade, shade, shade, 1.0];
            particle.life = 1.0;
            revived += 1;
        }
        if revived < count {
            debug!("Smoke pool full, revived {revived} of {count} particles");
        }
        revived
    }

    /// Ages every live particle by `dt` seconds and moves it along its
    /// velocity; alpha fades with the remaining life
    pub fn update(&mut self, dt: f32) {
        let decay = self.decay;
        for particle in self.particles.iter_mut().filter(|p| p.is_alive()) {
            particle.life -= dt * decay;
            if particle.is_alive() {
                particle.position += particle.velocity * dt;
                particle.color[3] = particle.life.min(1.0);
            }
        }
    }
}

impl Drawable for Smoke {
    fn draw(
        &self,
        backend: &mut dyn RenderBackend,
        transform: &Matrix4<f32>,
        uniforms: &Uniforms,
    ) {
        let mut uniforms = uniforms.clone();
        if let Some(texture) = &self.texture {
            backend.bind_texture(0, texture);
            uniforms.set(SMOKE_SAMPLER, UniformValue::Sampler(0));
        }

        for particle in self.particles.iter().filter(|p| p.is_alive()) {
            uniforms.set("color", particle.color);
            uniforms.set("life", particle.life);
            let p = particle.position;
            backend.draw(DrawCall {
                label: "smoke",
                transform: *transform * translate(p.x, p.y, p.z),
                uniforms: &uniforms,
                vertices: &self.sprite,
                indices: None,
                primitive: Primitive::Points,
                depth: Default::default(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::RecordingBackend;
    use cgmath::SquareMatrix;

    #[test]
    fn test_respawn_is_capped_by_pool() {
        let mut smoke = Smoke::new(4, 5);
        assert_eq!(smoke.alive(), 0);
        assert_eq!(smoke.respawn(Vector3::new(0.0, 10.0, 0.0), 6), 4);
        assert_eq!(smoke.alive(), 4);
        assert_eq!(smoke.find_first_unused(), None);
    }

    #[test]
    fn test_dead_particles_are_recycled_round_robin() {
        let mut smoke = Smoke::new(4, 5);
        smoke.respawn(Vector3::zero(), 4);
        smoke.particles[1].life = 0.0;
        smoke.particles[3].life = 0.0;

        // search resumes at the last handed-out slot (3) before wrapping
        assert_eq!(smoke.find_first_unused(), Some(3));
        smoke.respawn(Vector3::zero(), 1);
        assert_eq!(smoke.find_first_unused(), Some(1));
    }

    #[test]
    fn test_update_moves_and_kills() {
        let mut smoke = Smoke::new(2, 1);
        smoke.respawn(Vector3::zero(), 1);
        let start = smoke.particles()[0].position;

        smoke.update(0.5);
        let p = smoke.particles()[0];
        assert!(p.is_alive());
        assert!((p.life - 0.75).abs() < 1e-6);
        assert!(p.position.y > start.y);
        assert!((p.color[3] - 0.75).abs() < 1e-6);

        smoke.update(2.0);
        assert_eq!(smoke.alive(), 0);
    }

    #[test]
    fn test_one_point_draw_per_live_particle() {
        let mut smoke = Smoke::new(8, 2);
        smoke.respawn(Vector3::new(1.0, 2.0, 3.0), 3);

        let mut backend = RecordingBackend::new();
        smoke.draw(&mut backend, &Matrix4::identity(), &Uniforms::new());

        assert_eq!(backend.draws.len(), 3);
        assert!(backend.draws.iter().all(|d| d.primitive == Primitive::Points));
        assert!(backend.draws.iter().all(|d| d.uniforms.contains("color")));
    }

    #[test]
    fn test_respawn_is_seeded() {
        let mut a = Smoke::new(3, 9);
        let mut b = Smoke::new(3, 9);
        a.respawn(Vector3::zero(), 3);
        b.respawn(Vector3::zero(), 3);
        assert_eq!(a.particles(), b.particles());
    }
}
