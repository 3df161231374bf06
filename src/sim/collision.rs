//! Collision predicates
//!
//! Two shapes matter to the simulation: circles for every gameplay contact
//! (projectile/enemy, enemy/player, pickup/player, orb/player) and
//! axis-aligned boxes for obstacle blocking. Both tests are pure.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Anything that takes part in circle-vs-circle gameplay collisions
pub trait Collider {
    fn center(&self) -> Vec2;

    /// Collision radius: an explicit size, or half the width for boxy entities
    fn hit_radius(&self) -> f32;
}

/// A bare circle, for ad-hoc queries (blast areas, blades)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Collider for Circle {
    fn center(&self) -> Vec2 {
        self.center
    }

    fn hit_radius(&self) -> f32 {
        self.radius
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box of the given full size centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
}

/// True if the distance between centers is less than the sum of radii
#[inline]
pub fn circle_overlap(a: &impl Collider, b: &impl Collider) -> bool {
    let reach = a.hit_radius() + b.hit_radius();
    a.center().distance_squared(b.center()) < reach * reach
}

/// Standard AABB overlap (touching edges do not count)
#[inline]
pub fn rect_overlap(moving: &Aabb, obstacle: &Aabb) -> bool {
    moving.min.x < obstacle.max.x
        && moving.max.x > obstacle.min.x
        && moving.min.y < obstacle.max.y
        && moving.max.y > obstacle.min.y
}

/// Shortest distance from `point` to the segment `a`-`b`
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < 0.0001 {
        return point.distance(a); // Degenerate segment
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}
