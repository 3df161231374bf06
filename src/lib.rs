//! Horde Survival - simulation core for a top-down arcade survival game
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (entities, combat, spawning, upgrades)
//! - `settings`: Run configuration and quality presets
//! - `highscores`: Local leaderboard implementing the run recorder contract
//!
//! Rendering, audio, input capture and menus are external collaborators; they
//! read the `sim::World` after each tick and feed `sim::TickInput` into it.

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::{HighScores, RunRecorder};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
///
/// Distances are in world pixels, speeds in pixels per tick, and every
/// `*_TICKS` value counts fixed simulation steps.
pub mod consts {
    /// Fixed simulation timestep (60 Hz virtual clock)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Viewport used for spawn rings, AI culling and twin placement
    pub const VIEW_WIDTH: f32 = 1280.0;
    pub const VIEW_HEIGHT: f32 = 720.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_SPEED: f32 = 3.0;
    pub const PLAYER_PICKUP_RADIUS: f32 = 80.0;
    /// Damage immunity after any hit (1 second)
    pub const INVINCIBILITY_TICKS: u32 = 60;

    /// Dash
    pub const DASH_SPEED_MULT: f32 = 4.0;
    pub const DASH_TICKS: u32 = 12;
    pub const DASH_COOLDOWN_TICKS: u32 = 90;

    /// Weapons
    pub const BASE_SHOOT_COOLDOWN_TICKS: f32 = 30.0;
    pub const BASE_PROJECTILE_DAMAGE: f32 = 10.0;
    pub const PROJECTILE_SIZE: f32 = 5.0;
    pub const PROJECTILE_RANGE: f32 = 1200.0;
    pub const RANGED_PROJECTILE_SPEED: f32 = 9.0;
    pub const MAGIC_PROJECTILE_SPEED: f32 = 6.0;
    pub const RANGED_TARGET_CAP: u32 = 6;
    pub const MAGIC_TARGET_CAP: u32 = 4;
    pub const MELEE_BLADE_CAP: u32 = 3;
    pub const MELEE_BLADE_RADIUS: f32 = 70.0;
    pub const MELEE_BLADE_SIZE: f32 = 18.0;
    pub const MELEE_BLADE_SPIN: f32 = 0.08;
    pub const MELEE_BLADE_HIT_COOLDOWN_TICKS: u32 = 20;
    pub const MELEE_BURST_LIFETIME_TICKS: u32 = 18;
    pub const MELEE_BURST_SPEED: f32 = 7.0;

    /// Combat resolver
    pub const EXPLOSION_SPLASH_FRACTION: f32 = 0.5;
    /// Explosion radius above which global piercing is halved
    pub const EXPLOSION_PIERCE_DAMPEN_RADIUS: f32 = 60.0;
    pub const CHAIN_FRACTION: f32 = 0.3;
    pub const CHAIN_RANGE: f32 = 120.0;
    pub const CHAIN_TARGETS: usize = 2;
    pub const LIFE_STEAL_FRACTION: f32 = 0.05;
    pub const SHOCKWAVE_FRACTION: f32 = 0.25;
    pub const SHOCKWAVE_RADIUS: f32 = 60.0;
    pub const MAX_ORBS_PER_KILL: u32 = 3;

    /// Spawn director
    pub const DEFAULT_MAX_ENEMIES: usize = 150;
    pub const DEFAULT_TIME_LIMIT_SECS: f32 = 600.0;
    pub const SPAWN_BASE_INTERVAL_TICKS: f32 = 90.0;
    pub const SPAWN_MIN_INTERVAL_TICKS: f32 = 20.0;
    pub const SPAWN_INTERVAL_DECAY_PER_SEC: f32 = 0.1;
    pub const BOSS_INTERVAL_SECS: f32 = 60.0;
    pub const BOSS_MODE_MAX_SECS: f32 = 45.0;
    pub const BOSS_BASE_HEALTH: f32 = 800.0;
    pub const BOSS_HEALTH_GROWTH: f32 = 1.2;
    pub const BOSS_LATE_WAVE: u32 = 7;
    pub const BOSS_HEALTH_PER_LATE_WAVE: f32 = 250.0;
    pub const BOSS_BOMB_RING: usize = 8;

    /// Final-boss transition
    pub const CLEAR_PER_TICK: usize = 3;
    pub const CLEAR_DWELL_TICKS: u32 = 60;
    pub const PREPARE_TICKS: u32 = 300;
    pub const TWIN_DISTANCE: f32 = VIEW_WIDTH * 0.3;
    pub const TWIN_ENRAGE_SPEED: f32 = 1.6;
    pub const TWIN_ENRAGE_DAMAGE: f32 = 1.5;
    pub const TWIN_ENRAGE_REDUCTION: f32 = 0.6;

    /// Culling
    pub const ENEMY_CULL_DISTANCE: f32 = 2200.0;
    pub const AI_CULL_DISTANCE: f32 = 1400.0;

    /// Upgrades
    pub const MAX_UPGRADE_LEVEL: u8 = 5;
    pub const CATEGORY_CAP: usize = 3;
    pub const UPGRADE_CHOICES: usize = 3;
    pub const MULTI_SHOT_CAP: u32 = 6;
    pub const SHOOT_COOLDOWN_FLOOR: f32 = 0.5;

    /// Ability
    pub const ABILITY_COOLDOWN_TICKS: f32 = 600.0;

    /// Hard caps on transient collections
    pub const MAX_PLAYER_PROJECTILES: usize = 400;
    pub const MAX_ENEMY_PROJECTILES: usize = 300;
    pub const MAX_XP_ORBS: usize = 400;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
