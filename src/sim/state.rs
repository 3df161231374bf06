//! World state and core simulation types
//!
//! The `World` owns every entity collection for one run. It is created at run
//! start, mutated only by `tick` and `select_upgrade`, and dropped or rebuilt
//! on retry.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ability::AbilityTimer;
use super::collision::{Aabb, Collider};
use super::enemy::{Enemy, EnemyKind};
use super::upgrades::{UpgradeId, UpgradeLedger, xp_to_next};
use crate::consts::*;
use crate::settings::Settings;

/// Stable identifier for entities referenced across ticks
pub type EntityId = u32;

/// Character weapon family; decides firing behavior, synergy and ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Melee,
    Ranged,
    Magic,
}

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Waiting for an upgrade choice; gameplay frozen
    LevelUp,
    /// Paused by the player
    Paused,
    /// Scripted lead-in to the final bosses
    FinalBossTransition(TransitionStage),
    /// Player died
    GameOver,
    /// Final bosses defeated
    Victory,
}

/// Sub-state of the final-boss transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionStage {
    /// Removing the remaining horde; `dwell` counts ticks spent with no enemies
    Clearing { dwell: u32 },
    /// Quiet countdown before the twins appear
    Preparing { remaining: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashState {
    pub cooldown: u32,
    pub active: bool,
    pub timer: u32,
    /// Velocity locked when the dash started
    pub velocity: Vec2,
}

/// The player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub base_speed: f32,
    pub speed: f32,
    pub damage_mult: f32,
    /// Shoot cooldown before any upgrade (ticks)
    pub base_shoot_cooldown: f32,
    /// Shoot cooldown after upgrades (ticks)
    pub shoot_cooldown: f32,
    /// Ticks until the next shot
    pub shoot_timer: f32,
    pub multi_shot: u32,
    pub piercing: u32,
    pub explosion_radius: f32,
    pub projectile_size: f32,
    pub pickup_radius: f32,
    pub xp_mult: f32,
    /// Health regenerated per second
    pub regen: f32,
    pub level: u32,
    pub xp: u32,
    pub ability_cooldown_mult: f32,
    /// Ticks of damage immunity remaining
    pub invincibility: u32,
    pub dash: DashState,
    /// Last non-zero movement direction
    pub facing: Vec2,
    pub weapon: WeaponKind,
}

impl Player {
    pub fn new(weapon: WeaponKind) -> Self {
        let (health, speed) = match weapon {
            WeaponKind::Melee => (PLAYER_MAX_HEALTH * 1.3, PLAYER_SPEED),
            WeaponKind::Ranged => (PLAYER_MAX_HEALTH, PLAYER_SPEED * 1.1),
            WeaponKind::Magic => (PLAYER_MAX_HEALTH * 0.85, PLAYER_SPEED),
        };
        Self {
            pos: Vec2::ZERO,
            health,
            max_health: health,
            base_speed: speed,
            speed,
            damage_mult: 1.0,
            base_shoot_cooldown: BASE_SHOOT_COOLDOWN_TICKS,
            shoot_cooldown: BASE_SHOOT_COOLDOWN_TICKS,
            shoot_timer: 0.0,
            multi_shot: 1,
            piercing: 0,
            explosion_radius: 0.0,
            projectile_size: 1.0,
            pickup_radius: PLAYER_PICKUP_RADIUS,
            xp_mult: 1.0,
            regen: 0.0,
            level: 1,
            xp: 0,
            ability_cooldown_mult: 1.0,
            invincibility: 0,
            dash: DashState::default(),
            facing: Vec2::X,
            weapon,
        }
    }

    /// Bounding box used against obstacles
    pub fn bounds_at(&self, pos: Vec2) -> Aabb {
        Aabb::from_center(pos, Vec2::splat(PLAYER_SIZE))
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

impl Collider for Player {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn hit_radius(&self) -> f32 {
        PLAYER_SIZE / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A projectile; player and enemy projectiles live in separate collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub size: f32,
    /// Enemies hit so far
    pub pierce_count: u32,
    /// Removed once `pierce_count` exceeds this
    pub max_pierce: u32,
    /// Remaining ticks for finite projectiles (melee bursts)
    pub lifetime: Option<u32>,
    pub owner: Owner,
    /// Enemies already struck by this projectile
    pub hits: Vec<EntityId>,
    pub dead: bool,
}

impl Projectile {
    pub fn new(owner: Owner, pos: Vec2, vel: Vec2, damage: f32, size: f32) -> Self {
        Self {
            pos,
            vel,
            damage,
            size,
            pierce_count: 0,
            max_pierce: 0,
            lifetime: None,
            owner,
            hits: Vec::new(),
            dead: false,
        }
    }

    pub fn with_lifetime(mut self, ticks: u32) -> Self {
        self.lifetime = Some(ticks);
        self
    }
}

impl Collider for Projectile {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn hit_radius(&self) -> f32 {
        self.size
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Pulls every XP orb to the player
    Magnet,
    /// Damages every enemy in view
    Bomb,
    /// Counts down, then blasts everything in `radius`
    BossBomb { fuse: u32, radius: f32, damage: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PickupKind,
    pub dead: bool,
}

impl Collider for Pickup {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn hit_radius(&self) -> f32 {
        10.0
    }
}

/// Experience orb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpOrb {
    pub pos: Vec2,
    pub value: u32,
    /// Set once the player came within pickup radius (or a magnet fired)
    pub homing: bool,
    pub dead: bool,
}

impl Collider for XpOrb {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn hit_radius(&self) -> f32 {
        4.0
    }
}

/// A pickup that appears after a short delay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupSpawner {
    pub pos: Vec2,
    pub kind: PickupKind,
    pub delay: u32,
}

/// Static blocking rectangle supplied by the terrain collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub bounds: Aabb,
}

/// A particle for visual effects (not gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Floating damage indicator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub value: f32,
    pub ticks: u32,
}

/// Melee damage zone orbiting the player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Blade {
    pub angle: f32,
    /// Per-target cooldowns (enemy id, ticks left)
    pub hit_cooldowns: Vec<(EntityId, u32)>,
}

/// Pending lightning strike from the magic ability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledStrike {
    pub delay: u32,
    pub damage: f32,
}

/// Particle colors
pub mod colors {
    pub const BLOOD: u32 = 0xff3030;
    pub const SPARK: u32 = 0xffd040;
    pub const FROST: u32 = 0x80d0ff;
    pub const VOID: u32 = 0x9040ff;
    pub const FIRE: u32 = 0xff8020;
    pub const XP: u32 = 0x40ff80;
}

/// Per-tick events for audio, VFX and HUD collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyKilled { id: EntityId, kind: String, pos: Vec2 },
    PlayerDamaged { amount: f32 },
    LevelUp { level: u32, choices: Vec<UpgradeId> },
    UpgradeChosen { upgrade: UpgradeId, level: u8 },
    BossSpawned { wave: u32, health: f32 },
    BossDefeated { wave: u32 },
    BossRetreated,
    FinalBossStage(TransitionStage),
    FinalBossesSpawned { ids: [EntityId; 2] },
    TwinEnraged { id: EntityId },
    AbilityUsed { weapon: WeaponKind },
    PickupCollected { kind: PickupKind },
    BombDetonated { pos: Vec2 },
    RunEnded(RunSummary),
}

/// Summary of a finished run, handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub kills: u32,
    pub level: u32,
    pub wave: u32,
    pub survival_secs: f32,
    pub character: WeaponKind,
    pub victory: bool,
}

/// Read-only HUD view, refreshed after each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub time_remaining: f32,
    pub elapsed: f32,
    pub wave: u32,
    pub score: u64,
    pub kills: u32,
    pub ability_ready_in: u32,
    pub dash_cooldown: u32,
    pub boss_mode: bool,
    pub final_boss_mode: bool,
    pub phase: GamePhase,
}

/// Drop the oldest entries so that `items.len() <= cap`
pub(crate) fn truncate_oldest<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct World {
    pub config: Settings,
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Survival time in seconds
    pub elapsed: f32,
    /// Countdown to the final-boss encounter
    pub time_remaining: f32,
    pub wave: u32,
    /// Seconds accumulated toward the next regular boss
    pub wave_timer: f32,
    pub score: u64,
    pub kills: u32,
    /// Difficulty coupling from total upgrade levels
    pub enemy_speed_modifier: f32,
    pub spawn_rate_modifier: f32,
    /// Temporary slow from the frost upgrade; composes with the modifier
    pub slow_factor: f32,
    pub slow_ticks: u32,
    pub boss_mode: bool,
    pub boss_mode_timer: f32,
    pub final_boss_mode: bool,
    pub final_boss_spawned: bool,
    pub phase: GamePhase,
    /// Ticks accumulated toward the next normal spawn group
    pub spawn_timer: f32,
    pub screen_shake: f32,
    pub upgrades: UpgradeLedger,
    /// Choices on offer while in `GamePhase::LevelUp`
    pub upgrade_choices: Vec<UpgradeId>,
    /// Set when no upgrade can be offered any more
    pub xp_drops_suppressed: bool,
    pub ability: AbilityTimer,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub orbs: Vec<XpOrb>,
    pub pickup_spawners: Vec<PickupSpawner>,
    pub obstacles: Vec<Obstacle>,
    pub particles: Vec<Particle>,
    pub damage_numbers: Vec<DamageNumber>,
    pub blades: Vec<Blade>,
    pub strikes: Vec<ScheduledStrike>,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    pub summary: Option<RunSummary>,
    next_id: EntityId,
}

impl World {
    /// Create a fresh run from settings
    pub fn new(config: Settings) -> Self {
        log::info!(
            "New run: seed={} character={:?} time_limit={}s",
            config.seed,
            config.character,
            config.time_limit_secs
        );
        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            time_ticks: 0,
            elapsed: 0.0,
            time_remaining: config.time_limit_secs,
            wave: 1,
            wave_timer: 0.0,
            score: 0,
            kills: 0,
            enemy_speed_modifier: 1.0,
            spawn_rate_modifier: 1.0,
            slow_factor: 1.0,
            slow_ticks: 0,
            boss_mode: false,
            boss_mode_timer: 0.0,
            final_boss_mode: false,
            final_boss_spawned: false,
            phase: GamePhase::Playing,
            spawn_timer: 0.0,
            screen_shake: 0.0,
            upgrades: UpgradeLedger::default(),
            upgrade_choices: Vec::new(),
            xp_drops_suppressed: false,
            ability: AbilityTimer::default(),
            player: Player::new(config.character),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            pickups: Vec::new(),
            orbs: Vec::new(),
            pickup_spawners: Vec::new(),
            obstacles: Vec::new(),
            particles: Vec::new(),
            damage_numbers: Vec::new(),
            blades: Vec::new(),
            strikes: Vec::new(),
            events: Vec::new(),
            summary: None,
            next_id: 1,
            config,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Push an enemy unconditionally; capacity checks belong to the caller
    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, kind, pos));
        id
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    /// Room left under the population cap
    pub fn enemy_capacity(&self) -> usize {
        self.config.max_enemies.saturating_sub(self.live_enemy_count())
    }

    pub fn enemy_index(&self, id: EntityId) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id && e.is_alive())
    }

    pub fn is_enemy_alive(&self, id: EntityId) -> bool {
        self.enemy_index(id).is_some()
    }

    /// Effective movement speed multiplier applied to every enemy
    pub fn enemy_speed_scale(&self) -> f32 {
        self.enemy_speed_modifier * self.slow_factor
    }

    /// Remove tombstoned enemies
    pub fn compact_enemies(&mut self) {
        self.enemies.retain(|e| e.is_alive());
    }

    /// Drop every armed boss bomb without detonating it
    pub fn defuse_boss_bombs(&mut self) {
        self.pickups.retain(|p| !matches!(p.kind, PickupKind::BossBomb { .. }));
    }

    /// Final bosses are about to appear; nothing may deal damage
    pub fn is_preparing_final(&self) -> bool {
        matches!(
            self.phase,
            GamePhase::FinalBossTransition(TransitionStage::Preparing { .. })
        )
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_shake(&mut self, amount: f32) {
        if self.config.screen_shake {
            self.screen_shake = self.screen_shake.max(amount);
        }
    }

    /// Emit a radial burst of particles
    pub fn emit_particles(&mut self, pos: Vec2, count: usize, color: u32) {
        if self.config.max_particles() == 0 {
            return;
        }
        for _ in 0..count {
            let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
            let speed = 1.0 + self.rng.random::<f32>() * 3.0;
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color,
                life: 1.0,
                size: 2.0 + self.rng.random::<f32>() * 3.0,
            });
        }
    }

    pub fn add_damage_number(&mut self, pos: Vec2, value: f32) {
        self.damage_numbers.push(DamageNumber {
            pos,
            value,
            ticks: 45,
        });
    }

    /// Finish the run once; later calls are ignored
    pub fn end_run(&mut self, victory: bool) {
        if self.summary.is_some() {
            return;
        }
        self.phase = if victory {
            GamePhase::Victory
        } else {
            GamePhase::GameOver
        };
        let summary = RunSummary {
            score: self.score,
            kills: self.kills,
            level: self.player.level,
            wave: self.wave,
            survival_secs: self.elapsed,
            character: self.player.weapon,
            victory,
        };
        log::info!(
            "Run ended ({}): score={} kills={} level={} wave={} time={:.1}s",
            if victory { "victory" } else { "defeat" },
            summary.score,
            summary.kills,
            summary.level,
            summary.wave,
            summary.survival_secs
        );
        self.events.push(GameEvent::RunEnded(summary.clone()));
        self.summary = Some(summary);
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver | GamePhase::Victory)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            health: self.player.health,
            max_health: self.player.max_health,
            level: self.player.level,
            xp: self.player.xp,
            xp_to_next: xp_to_next(self.player.level),
            time_remaining: self.time_remaining.max(0.0),
            elapsed: self.elapsed,
            wave: self.wave,
            score: self.score,
            kills: self.kills,
            ability_ready_in: self.ability.remaining(),
            dash_cooldown: self.player.dash.cooldown,
            boss_mode: self.boss_mode,
            final_boss_mode: self.final_boss_mode,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_defaults() {
        let world = World::new(Settings::default());
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.wave, 1);
        assert!(world.enemies.is_empty());
        assert!((world.time_remaining - DEFAULT_TIME_LIMIT_SECS).abs() < 1e-3);
        assert_eq!(world.player.level, 1);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut world = World::new(Settings::default());
        let a = world.spawn_enemy(EnemyKind::Grunt, Vec2::ZERO);
        let b = world.spawn_enemy(EnemyKind::Grunt, Vec2::ZERO);
        assert_ne!(a, b);
        assert!(world.is_enemy_alive(a));
        world.enemies[0].dead = true;
        assert!(!world.is_enemy_alive(a));
        world.compact_enemies();
        assert_eq!(world.enemies.len(), 1);
    }

    #[test]
    fn test_truncate_oldest_keeps_newest() {
        let mut v: Vec<u32> = (0..10).collect();
        truncate_oldest(&mut v, 4);
        assert_eq!(v, vec![6, 7, 8, 9]);
        truncate_oldest(&mut v, 10);
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_end_run_only_once() {
        let mut world = World::new(Settings::default());
        world.score = 42;
        world.end_run(false);
        world.score = 99;
        world.end_run(true);
        assert_eq!(world.phase, GamePhase::GameOver);
        let summary = world.summary.clone().unwrap();
        assert_eq!(summary.score, 42);
        assert!(!summary.victory);
        let ended = world
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::RunEnded(_)))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_hud_snapshot_reflects_player() {
        let mut world = World::new(Settings::default());
        world.player.health = 50.0;
        let hud = world.hud();
        assert!((hud.health - 50.0).abs() < 1e-6);
        assert_eq!(hud.level, 1);
        assert_eq!(hud.phase, GamePhase::Playing);
    }
}
