//! World-generation collaborator
//!
//! The simulation asks for obstacles around the player every tick; an
//! implementation must be idempotent per chunk so repeated calls never
//! duplicate obstacles.

use std::collections::HashSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Aabb;
use super::state::Obstacle;

pub trait Terrain {
    /// Make sure obstacles exist for every chunk near `pos`
    fn ensure_chunks_near(&mut self, pos: Vec2, obstacles: &mut Vec<Obstacle>);
}

/// Endless open ground
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl Terrain for OpenField {
    fn ensure_chunks_near(&mut self, _pos: Vec2, _obstacles: &mut Vec<Obstacle>) {}
}

/// Deterministic rock scatter, generated lazily per square chunk
#[derive(Debug, Clone)]
pub struct ScatteredRocks {
    seed: u64,
    chunk_size: f32,
    /// Rocks never generate within this distance of the world origin
    clear_radius: f32,
    generated: HashSet<(i32, i32)>,
}

impl ScatteredRocks {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            chunk_size: 800.0,
            clear_radius: 200.0,
            generated: HashSet::new(),
        }
    }

    pub fn chunk_of(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.chunk_size).floor() as i32,
            (pos.y / self.chunk_size).floor() as i32,
        )
    }

    pub fn generated_chunks(&self) -> usize {
        self.generated.len()
    }

    fn generate(&self, chunk: (i32, i32), obstacles: &mut Vec<Obstacle>) {
        let key = ((chunk.0 as u32 as u64) << 32) | chunk.1 as u32 as u64;
        let mut rng = Pcg32::seed_from_u64(self.seed ^ key.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let origin = Vec2::new(chunk.0 as f32, chunk.1 as f32) * self.chunk_size;
        for _ in 0..rng.random_range(0..=3) {
            let center = origin
                + Vec2::new(
                    rng.random_range(0.0..self.chunk_size),
                    rng.random_range(0.0..self.chunk_size),
                );
            let size = Vec2::new(rng.random_range(40.0..120.0), rng.random_range(40.0..120.0));
            if center.length() < self.clear_radius + size.max_element() {
                continue;
            }
            obstacles.push(Obstacle {
                bounds: Aabb::from_center(center, size),
            });
        }
    }
}

impl Terrain for ScatteredRocks {
    fn ensure_chunks_near(&mut self, pos: Vec2, obstacles: &mut Vec<Obstacle>) {
        let (cx, cy) = self.chunk_of(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let chunk = (cx + dx, cy + dy);
                if self.generated.insert(chunk) {
                    self.generate(chunk, obstacles);
                }
            }
        }
    }
}
