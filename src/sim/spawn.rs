//! Spawn director
//!
//! Paces regular enemy groups, the once-a-minute boss, and the scripted
//! lead-in to the two linked final bosses once the time limit runs out.

use glam::Vec2;
use rand::Rng;

use super::enemy::{Enemy, EnemyKind, FinalBossState};
use super::state::{EntityId, GameEvent, GamePhase, TransitionStage, World, colors};
use crate::consts::*;
use crate::polar_to_cartesian;

/// Distance past the viewport corner where new enemies appear
const SPAWN_RING_MARGIN: f32 = 60.0;

/// Ticks between spawn groups at a given survival time
pub fn spawn_interval(elapsed_secs: f32, spawn_rate_modifier: f32) -> f32 {
    let base = (SPAWN_BASE_INTERVAL_TICKS - SPAWN_INTERVAL_DECAY_PER_SEC * elapsed_secs)
        .max(SPAWN_MIN_INTERVAL_TICKS);
    base / spawn_rate_modifier.max(0.01)
}

/// Enemies per spawn group before the capacity clip
pub fn group_size(wave: u32, elapsed_secs: f32) -> usize {
    1 + (wave / 2) as usize + (elapsed_secs / 60.0) as usize
}

pub fn boss_health(elapsed_secs: f32, wave: u32) -> f32 {
    let minutes = (elapsed_secs / 60.0).floor() as i32;
    BOSS_BASE_HEALTH * BOSS_HEALTH_GROWTH.powi(minutes)
        + BOSS_HEALTH_PER_LATE_WAVE * wave.saturating_sub(BOSS_LATE_WAVE) as f32
}

/// Random point on a ring just outside the viewport around the player
pub fn ring_position(world: &mut World) -> Vec2 {
    let radius = Vec2::new(VIEW_WIDTH, VIEW_HEIGHT).length() * 0.5 + SPAWN_RING_MARGIN;
    let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
    world.player.pos + polar_to_cartesian(radius, angle)
}

/// Spawn up to `requested` regular enemies, clipped to remaining capacity.
///
/// Returns the number actually spawned.
pub fn spawn_group(world: &mut World, requested: usize) -> usize {
    let count = requested.min(world.enemy_capacity());
    for _ in 0..count {
        let kind = EnemyKind::roll(world.elapsed, &mut world.rng);
        let pos = ring_position(world);
        world.spawn_enemy(kind, pos);
    }
    if count > 0 {
        log::debug!("Spawned group of {} (requested {})", count, requested);
    }
    count
}

/// Regular spawning and the boss cycle; runs once per gameplay tick
pub fn update_spawning(world: &mut World) {
    if world.final_boss_mode || world.final_boss_spawned {
        return;
    }

    if world.boss_mode && world.boss_mode_timer >= BOSS_MODE_MAX_SECS {
        expire_boss_mode(world);
    }

    if !world.boss_mode && world.wave_timer >= BOSS_INTERVAL_SECS {
        spawn_boss(world);
    }

    if world.boss_mode {
        return;
    }

    world.spawn_timer += 1.0;
    let interval = spawn_interval(world.elapsed, world.spawn_rate_modifier);
    if world.spawn_timer >= interval {
        world.spawn_timer = 0.0;
        let requested = group_size(world.wave, world.elapsed);
        spawn_group(world, requested);
    }
}

/// Spawn the wave boss. Waits (returns None) while the population is full.
pub fn spawn_boss(world: &mut World) -> Option<EntityId> {
    if world.enemy_capacity() == 0 {
        return None;
    }
    let health = boss_health(world.elapsed, world.wave);
    let pos = ring_position(world);
    let id = world.spawn_enemy(EnemyKind::Boss { special_cooldown: 180 }, pos);
    if let Some(boss) = world.enemies.last_mut() {
        boss.health = health;
        boss.max_health = health;
    }

    world.wave += 1;
    world.wave_timer = 0.0;
    world.boss_mode = true;
    world.boss_mode_timer = 0.0;
    world.add_shake(8.0);
    log::info!("Boss spawned: wave {} health {:.0}", world.wave, health);
    world.push_event(GameEvent::BossSpawned {
        wave: world.wave,
        health,
    });
    Some(id)
}

/// The boss leaves without paying out rewards
fn expire_boss_mode(world: &mut World) {
    for i in 0..world.enemies.len() {
        if world.enemies[i].is_alive() && matches!(world.enemies[i].kind, EnemyKind::Boss { .. }) {
            world.enemies[i].dead = true;
            let pos = world.enemies[i].pos;
            world.emit_particles(pos, 16, colors::VOID);
        }
    }
    world.compact_enemies();
    world.boss_mode = false;
    world.boss_mode_timer = 0.0;
    log::info!("Boss retreated (wave {})", world.wave);
    world.push_event(GameEvent::BossRetreated);
}

/// Enter the final-boss lead-in if the clock ran out. Returns true on entry.
pub fn begin_final_transition(world: &mut World) -> bool {
    if world.phase != GamePhase::Playing
        || world.final_boss_spawned
        || world.final_boss_mode
        || world.time_remaining > 0.0
    {
        return false;
    }
    let stage = TransitionStage::Clearing { dwell: 0 };
    world.phase = GamePhase::FinalBossTransition(stage);
    world.boss_mode = false;
    world.boss_mode_timer = 0.0;
    log::info!("Time limit reached; clearing the field");
    world.push_event(GameEvent::FinalBossStage(stage));
    true
}

/// Advance the transition state machine by one tick
pub fn update_final_transition(world: &mut World) {
    let GamePhase::FinalBossTransition(stage) = world.phase else {
        return;
    };
    match stage {
        TransitionStage::Clearing { dwell } => {
            world.enemy_projectiles.clear();
            if world.live_enemy_count() > 0 {
                remove_departing(world, CLEAR_PER_TICK);
                return;
            }
            let dwell = dwell + 1;
            let next = if dwell >= CLEAR_DWELL_TICKS {
                TransitionStage::Preparing {
                    remaining: PREPARE_TICKS,
                }
            } else {
                TransitionStage::Clearing { dwell }
            };
            world.phase = GamePhase::FinalBossTransition(next);
            if let TransitionStage::Preparing { .. } = next {
                world.defuse_boss_bombs();
                log::info!("Field clear; final bosses in {} ticks", PREPARE_TICKS);
                world.push_event(GameEvent::FinalBossStage(next));
            }
        }
        TransitionStage::Preparing { remaining } => {
            let remaining = remaining.saturating_sub(1);
            if remaining > 0 {
                world.phase =
                    GamePhase::FinalBossTransition(TransitionStage::Preparing { remaining });
                return;
            }
            spawn_final_bosses(world);
        }
    }
}

/// Remove up to `max` random live enemies with a departure burst, no rewards
fn remove_departing(world: &mut World, max: usize) {
    for _ in 0..max {
        let live: Vec<usize> = world
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .map(|(i, _)| i)
            .collect();
        if live.is_empty() {
            break;
        }
        let idx = live[world.rng.random_range(0..live.len())];
        world.enemies[idx].dead = true;
        let pos = world.enemies[idx].pos;
        world.emit_particles(pos, 10, colors::VOID);
    }
    world.compact_enemies();
}

/// Place the twins opposite each other around the player and resume play
fn spawn_final_bosses(world: &mut World) -> [EntityId; 2] {
    world.final_boss_spawned = true;
    world.enemies.clear();
    world.projectiles.clear();
    world.enemy_projectiles.clear();
    world.pickup_spawners.clear();
    world.strikes.clear();
    world.defuse_boss_bombs();

    let a = world.next_entity_id();
    let b = world.next_entity_id();
    let center = world.player.pos;
    let twins = [(a, b, 0.0, 0), (b, a, std::f32::consts::PI, 90)];
    for (id, twin, angle, stagger) in twins {
        let pos = center + polar_to_cartesian(TWIN_DISTANCE, angle);
        let kind = EnemyKind::FinalBoss(FinalBossState::linked(twin, stagger));
        world.enemies.push(Enemy::new(id, kind, pos));
    }

    world.final_boss_mode = true;
    world.phase = GamePhase::Playing;
    world.add_shake(14.0);
    log::info!("Final bosses spawned: {} and {}", a, b);
    world.push_event(GameEvent::FinalBossesSpawned { ids: [a, b] });
    [a, b]
}

/// Enrage any final boss whose twin has died. One-way.
pub fn check_twin_enrage(world: &mut World) {
    for i in 0..world.enemies.len() {
        let e = &world.enemies[i];
        let EnemyKind::FinalBoss(state) = e.kind else {
            continue;
        };
        if !e.is_alive() || state.enraged {
            continue;
        }
        let twin_alive = state.twin.is_some_and(|id| world.is_enemy_alive(id));
        if twin_alive {
            continue;
        }

        let id = {
            let e = &mut world.enemies[i];
            e.health = e.max_health;
            e.speed *= TWIN_ENRAGE_SPEED;
            e.damage *= TWIN_ENRAGE_DAMAGE;
            if let EnemyKind::FinalBoss(state) = &mut e.kind {
                state.enraged = true;
                state.damage_reduction = TWIN_ENRAGE_REDUCTION;
                state.twin = None;
            }
            e.id
        };
        let pos = world.enemies[i].pos;
        world.emit_particles(pos, 30, colors::FIRE);
        world.add_shake(16.0);
        log::info!("Final boss {} enraged", id);
        world.push_event(GameEvent::TwinEnraged { id });
    }
}
