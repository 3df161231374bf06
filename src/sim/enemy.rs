//! Enemy record and behavior variants
//!
//! Every enemy shares a common record; variant-specific data (shield charges,
//! cooldowns, orbit parameters, twin linkage) lives in the `EnemyKind` payload
//! and is dispatched with exhaustive matches.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Collider;
use super::state::EntityId;
use crate::consts::*;

/// Charger dash phases
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChargeState {
    Idle,
    /// Telegraph before the rush, direction locked
    Windup { ticks: u32, dir: Vec2 },
    Rushing { ticks: u32, dir: Vec2 },
}

/// Final-boss beam attack: telegraph, then a damaging line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BeamState {
    Idle,
    Charging { ticks: u32, angle: f32 },
    Firing { ticks: u32, angle: f32 },
}

/// State carried by each of the two linked final bosses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalBossState {
    /// Stable id of the sibling, resolved by lookup each tick
    pub twin: Option<EntityId>,
    pub enraged: bool,
    /// Multiplier applied to incoming damage (1.0 until enraged)
    pub damage_reduction: f32,
    pub bomb_cooldown: u32,
    pub barrage_cooldown: u32,
    pub beam_cooldown: u32,
    pub beam: BeamState,
}

impl FinalBossState {
    pub fn linked(twin: EntityId, stagger: u32) -> Self {
        Self {
            twin: Some(twin),
            enraged: false,
            damage_reduction: 1.0,
            bomb_cooldown: 240 + stagger,
            barrage_cooldown: 180 + stagger,
            beam_cooldown: 420 + stagger,
            beam: BeamState::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Runner,
    Brute,
    Shooter { cooldown: u32 },
    Shielded { charges: u32 },
    Teleporter { cooldown: u32 },
    Summoner { cooldown: u32 },
    Charger { cooldown: u32, charge: ChargeState },
    /// Detonates on death, hurting the player if close
    Exploder,
    /// Splits into two smaller copies until generation 2
    Splitter { generation: u8 },
    Orbiter { angle: f32, distance: f32 },
    /// Keeps its distance and shoots
    Skirmisher { preferred_distance: f32, cooldown: u32 },
    Zigzag { phase: f32 },
    Swarmling,
    Boss { special_cooldown: u32 },
    FinalBoss(FinalBossState),
}

/// Base numbers for a freshly spawned enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStats {
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
    pub size: f32,
    pub score: u32,
    pub xp: u32,
}

const fn stats(health: f32, speed: f32, damage: f32, size: f32, score: u32, xp: u32) -> BaseStats {
    BaseStats {
        health,
        speed,
        damage,
        size,
        score,
        xp,
    }
}

/// Spawn pool: (unlock time in seconds, fresh kind)
const SPAWN_TABLE: &[(f32, EnemyKind)] = &[
    (0.0, EnemyKind::Grunt),
    (0.0, EnemyKind::Runner),
    (0.0, EnemyKind::Swarmling),
    (30.0, EnemyKind::Zigzag { phase: 0.0 }),
    (30.0, EnemyKind::Shooter { cooldown: 90 }),
    (60.0, EnemyKind::Brute),
    (60.0, EnemyKind::Exploder),
    (120.0, EnemyKind::Shielded { charges: 3 }),
    (120.0, EnemyKind::Splitter { generation: 0 }),
    (120.0, EnemyKind::Orbiter { angle: 0.0, distance: 220.0 }),
    (180.0, EnemyKind::Teleporter { cooldown: 180 }),
    (180.0, EnemyKind::Charger { cooldown: 150, charge: ChargeState::Idle }),
    (180.0, EnemyKind::Skirmisher { preferred_distance: 300.0, cooldown: 120 }),
    (240.0, EnemyKind::Summoner { cooldown: 300 }),
];

impl EnemyKind {
    pub fn base_stats(&self) -> BaseStats {
        match self {
            Self::Grunt => stats(20.0, 1.4, 10.0, 12.0, 10, 2),
            Self::Runner => stats(12.0, 2.4, 8.0, 10.0, 12, 2),
            Self::Brute => stats(80.0, 0.9, 20.0, 20.0, 30, 6),
            Self::Shooter { .. } => stats(25.0, 1.1, 8.0, 12.0, 20, 4),
            Self::Shielded { .. } => stats(40.0, 1.1, 12.0, 14.0, 25, 5),
            Self::Teleporter { .. } => stats(30.0, 1.2, 12.0, 12.0, 25, 5),
            Self::Summoner { .. } => stats(50.0, 0.8, 10.0, 16.0, 35, 7),
            Self::Charger { .. } => stats(45.0, 1.2, 18.0, 15.0, 30, 6),
            Self::Exploder => stats(18.0, 1.8, 25.0, 12.0, 15, 3),
            Self::Splitter { generation } => {
                let g = *generation as i32;
                stats(40.0 / 2f32.powi(g), 1.3 + 0.3 * g as f32, 12.0, 16.0 * 0.7f32.powi(g), 20, 4)
            }
            Self::Orbiter { .. } => stats(30.0, 1.6, 10.0, 12.0, 20, 4),
            Self::Skirmisher { .. } => stats(25.0, 1.5, 8.0, 12.0, 20, 4),
            Self::Zigzag { .. } => stats(22.0, 2.0, 10.0, 11.0, 15, 3),
            Self::Swarmling => stats(6.0, 2.2, 5.0, 7.0, 4, 1),
            Self::Boss { .. } => stats(BOSS_BASE_HEALTH, 1.0, 30.0, 40.0, 500, 50),
            Self::FinalBoss(_) => stats(6000.0, 1.2, 35.0, 48.0, 5000, 0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Grunt => "grunt",
            Self::Runner => "runner",
            Self::Brute => "brute",
            Self::Shooter { .. } => "shooter",
            Self::Shielded { .. } => "shielded",
            Self::Teleporter { .. } => "teleporter",
            Self::Summoner { .. } => "summoner",
            Self::Charger { .. } => "charger",
            Self::Exploder => "exploder",
            Self::Splitter { .. } => "splitter",
            Self::Orbiter { .. } => "orbiter",
            Self::Skirmisher { .. } => "skirmisher",
            Self::Zigzag { .. } => "zigzag",
            Self::Swarmling => "swarmling",
            Self::Boss { .. } => "boss",
            Self::FinalBoss(_) => "final boss",
        }
    }

    /// Pick a regular enemy kind among those unlocked at `elapsed_secs`
    pub fn roll(elapsed_secs: f32, rng: &mut impl Rng) -> Self {
        let unlocked = SPAWN_TABLE
            .iter()
            .take_while(|(unlock, _)| elapsed_secs >= *unlock)
            .count()
            .max(1);
        SPAWN_TABLE[rng.random_range(0..unlocked)].1
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Base movement speed (pixels per tick) before world modifiers
    pub speed: f32,
    /// Contact damage
    pub damage: f32,
    /// Collision radius
    pub size: f32,
    pub score_value: u32,
    pub xp_value: u32,
    /// Tombstone: set exactly once when the enemy dies or is removed
    pub dead: bool,
    pub kind: EnemyKind,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, pos: Vec2) -> Self {
        let s = kind.base_stats();
        Self {
            id,
            pos,
            health: s.health,
            max_health: s.health,
            speed: s.speed,
            damage: s.damage,
            size: s.size,
            score_value: s.score,
            xp_value: s.xp,
            dead: false,
            kind,
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss { .. } | EnemyKind::FinalBoss(_))
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Multiplier applied to incoming damage
    pub fn damage_reduction(&self) -> f32 {
        match self.kind {
            EnemyKind::FinalBoss(state) if state.enraged => state.damage_reduction,
            _ => 1.0,
        }
    }
}

impl Collider for Enemy {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn hit_radius(&self) -> f32 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_new_enemy_uses_base_stats() {
        let e = Enemy::new(1, EnemyKind::Brute, Vec2::new(5.0, 5.0));
        assert!((e.health - 80.0).abs() < 1e-6);
        assert!((e.max_health - 80.0).abs() < 1e-6);
        assert_eq!(e.score_value, 30);
        assert!(e.is_alive());
        assert!(!e.is_boss());
    }

    #[test]
    fn test_splitter_generations_shrink() {
        let parent = EnemyKind::Splitter { generation: 0 }.base_stats();
        let child = EnemyKind::Splitter { generation: 1 }.base_stats();
        assert!(child.health < parent.health);
        assert!(child.size < parent.size);
        assert!(child.speed > parent.speed);
    }

    #[test]
    fn test_roll_respects_unlock_times() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let kind = EnemyKind::roll(0.0, &mut rng);
            assert!(matches!(
                kind,
                EnemyKind::Grunt | EnemyKind::Runner | EnemyKind::Swarmling
            ));
        }
        let late: Vec<_> = (0..500).map(|_| EnemyKind::roll(999.0, &mut rng)).collect();
        assert!(late.iter().any(|k| matches!(k, EnemyKind::Summoner { .. })));
        assert!(
            late.iter()
                .all(|k| !matches!(k, EnemyKind::Boss { .. } | EnemyKind::FinalBoss(_)))
        );
    }

    #[test]
    fn test_only_enraged_final_boss_reduces_damage() {
        let kind = EnemyKind::FinalBoss(FinalBossState::linked(2, 0));
        let mut boss = Enemy::new(1, kind, Vec2::ZERO);
        assert!(boss.is_boss());
        assert!((boss.damage_reduction() - 1.0).abs() < 1e-6);
        if let EnemyKind::FinalBoss(state) = &mut boss.kind {
            state.enraged = true;
            state.damage_reduction = TWIN_ENRAGE_REDUCTION;
        }
        assert!((boss.damage_reduction() - TWIN_ENRAGE_REDUCTION).abs() < 1e-6);
    }
}
