//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only (one call to `tick` = 1/60 s)
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod ability;
pub mod autopilot;
pub mod collision;
pub mod combat;
pub mod enemy;
pub mod enemy_ai;
pub mod items;
pub mod spawn;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod upgrades;
pub mod weapons;

pub use ability::AbilityTimer;
pub use autopilot::autopilot;
pub use collision::{Aabb, Circle, Collider, circle_overlap, distance_to_segment, rect_overlap};
pub use enemy::{Enemy, EnemyKind};
pub use state::{
    EntityId, GameEvent, GamePhase, HudSnapshot, Obstacle, Owner, PickupKind, Player, Projectile,
    RunSummary, TransitionStage, WeaponKind, World,
};
pub use terrain::{OpenField, ScatteredRocks, Terrain};
pub use tick::{TickInput, tick};
pub use upgrades::{Category, UpgradeId, select_upgrade};
