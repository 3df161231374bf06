//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world by one 1/60 s step per call.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::rect_overlap;
use super::enemy_ai::update_enemies;
use super::items::update_items;
use super::spawn::{begin_final_transition, update_final_transition, update_spawning};
use super::state::{GamePhase, World, truncate_oldest};
use super::terrain::Terrain;
use super::upgrades::check_level_up;
use super::weapons::{update_projectiles, update_weapons};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Desired movement direction; normalized internally
    pub movement: Vec2,
    /// Fire the character ability
    pub ability: bool,
    /// Start a dash along the facing direction
    pub dash: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, terrain: &mut impl Terrain) {
    // The ability cooldown tracks frames, not gameplay time
    world.ability.advance();

    if input.pause {
        match world.phase {
            GamePhase::Playing => {
                world.phase = GamePhase::Paused;
                log::debug!("Paused at tick {}", world.time_ticks);
                return;
            }
            GamePhase::Paused => world.phase = GamePhase::Playing,
            _ => {}
        }
    }

    match world.phase {
        GamePhase::Paused | GamePhase::LevelUp | GamePhase::GameOver | GamePhase::Victory => return,
        GamePhase::Playing | GamePhase::FinalBossTransition(_) => {}
    }

    // 1. Clocks
    update_timers(world);

    // 2. Passive player effects
    let p = &mut world.player;
    p.health = (p.health + p.regen * SIM_DT).min(p.max_health);
    p.invincibility = p.invincibility.saturating_sub(1);
    p.dash.cooldown = p.dash.cooldown.saturating_sub(1);

    // 3. Movement
    move_player(world, input);

    // 4. Terrain around the new position
    terrain.ensure_chunks_near(world.player.pos, &mut world.obstacles);

    // 5. Weapons and ability
    update_weapons(world, input.ability);

    // 6. Projectiles
    update_projectiles(world);
    if world.is_over() {
        return;
    }

    // 7. Enemies
    update_enemies(world);
    world.compact_enemies();
    if world.is_over() {
        return;
    }

    // 8. Orbs, pickups, level-up
    update_items(world);
    if world.is_over() {
        return;
    }
    check_level_up(world);

    // 9. Spawn director
    match world.phase {
        GamePhase::FinalBossTransition(_) => update_final_transition(world),
        GamePhase::Playing => update_spawning(world),
        _ => {}
    }

    // 10. Cleanup and end condition
    cleanup(world);
    if world.final_boss_mode && world.live_enemy_count() == 0 && world.player.is_alive() {
        world.end_run(true);
    }

    log::trace!(
        "tick {}: enemies={} projectiles={} orbs={} score={}",
        world.time_ticks,
        world.enemies.len(),
        world.projectiles.len(),
        world.orbs.len(),
        world.score
    );
}

fn update_timers(world: &mut World) {
    world.time_ticks += 1;
    world.elapsed += SIM_DT;
    if !world.final_boss_spawned {
        world.time_remaining = (world.time_remaining - SIM_DT).max(0.0);
    }

    if world.phase == GamePhase::Playing && !world.final_boss_mode {
        if world.boss_mode {
            world.boss_mode_timer += SIM_DT;
        } else {
            world.wave_timer += SIM_DT;
        }
    }

    if world.slow_ticks > 0 {
        world.slow_ticks -= 1;
        if world.slow_ticks == 0 {
            world.slow_factor = 1.0;
        }
    }

    world.screen_shake *= 0.9; // Fast decay
    if world.screen_shake < 0.01 {
        world.screen_shake = 0.0;
    }

    begin_final_transition(world);
}

/// True if the player's box at `pos` would overlap any obstacle
pub fn is_blocked(world: &World, pos: Vec2) -> bool {
    let bounds = world.player.bounds_at(pos);
    world.obstacles.iter().any(|o| rect_overlap(&bounds, &o.bounds))
}

fn move_player(world: &mut World, input: &TickInput) {
    let dir = input.movement.normalize_or_zero();
    if dir != Vec2::ZERO {
        world.player.facing = dir;
    }

    let dash = world.player.dash;
    if input.dash && !dash.active && dash.cooldown == 0 {
        let p = &mut world.player;
        p.dash.active = true;
        p.dash.timer = DASH_TICKS;
        p.dash.velocity = p.facing * p.speed * DASH_SPEED_MULT;
        p.dash.cooldown = DASH_COOLDOWN_TICKS;
    }

    if world.player.dash.active {
        let next = world.player.pos + world.player.dash.velocity;
        let blocked = is_blocked(world, next);
        let p = &mut world.player;
        if blocked {
            // Dash ends early against an obstacle
            p.dash.active = false;
            p.dash.timer = 0;
            return;
        }
        p.pos = next;
        p.dash.timer = p.dash.timer.saturating_sub(1);
        if p.dash.timer == 0 {
            p.dash.active = false;
        }
        return;
    }

    let next = world.player.pos + dir * world.player.speed;
    if !is_blocked(world, next) {
        world.player.pos = next;
    }
}

fn cleanup(world: &mut World) {
    let origin = world.player.pos;
    for e in &mut world.enemies {
        if e.is_alive() && !e.is_boss() && e.pos.distance(origin) > ENEMY_CULL_DISTANCE {
            e.dead = true; // Despawn, no rewards
        }
    }
    world.compact_enemies();

    for particle in &mut world.particles {
        particle.pos += particle.vel;
        particle.vel *= 0.92;
        particle.life -= 0.03;
    }
    world.particles.retain(|p| p.life > 0.0);
    let max_particles = world.config.max_particles();
    truncate_oldest(&mut world.particles, max_particles);

    for number in &mut world.damage_numbers {
        number.pos.y -= 0.5;
        number.ticks = number.ticks.saturating_sub(1);
    }
    world.damage_numbers.retain(|n| n.ticks > 0);
    let max_numbers = world.config.max_damage_numbers();
    truncate_oldest(&mut world.damage_numbers, max_numbers);

    truncate_oldest(&mut world.projectiles, MAX_PLAYER_PROJECTILES);
    truncate_oldest(&mut world.enemy_projectiles, MAX_ENEMY_PROJECTILES);
    truncate_oldest(&mut world.orbs, MAX_XP_ORBS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::collision::Aabb;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::state::{Obstacle, Particle, Pickup, PickupKind, TransitionStage};
    use crate::sim::terrain::OpenField;

    fn world() -> World {
        World::new(Settings::default())
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_tick_pause() {
        let mut w = world();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut w, &pause, &mut OpenField);
        assert_eq!(w.phase, GamePhase::Paused);
        let frozen = w.time_ticks;
        tick(&mut w, &idle(), &mut OpenField);
        assert_eq!(w.time_ticks, frozen);

        // Unpause resumes in the same call
        tick(&mut w, &pause, &mut OpenField);
        assert_eq!(w.phase, GamePhase::Playing);
        assert_eq!(w.time_ticks, frozen + 1);
    }

    #[test]
    fn test_pause_ignored_during_level_up() {
        let mut w = world();
        w.phase = GamePhase::LevelUp;
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut w, &pause, &mut OpenField);
        assert_eq!(w.phase, GamePhase::LevelUp);
        assert_eq!(w.time_ticks, 0);
    }

    #[test]
    fn test_ability_timer_runs_while_frozen() {
        let mut w = world();
        w.ability.start(10);
        w.phase = GamePhase::LevelUp;
        for _ in 0..10 {
            tick(&mut w, &idle(), &mut OpenField);
        }
        assert!(w.ability.is_ready());
        assert_eq!(w.time_ticks, 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = world();
        let mut b = world();
        let inputs = [
            TickInput {
                movement: Vec2::new(1.0, 0.3),
                ..Default::default()
            },
            TickInput {
                movement: Vec2::new(-0.5, 1.0),
                ability: true,
                ..Default::default()
            },
            idle(),
        ];
        for i in 0..1200 {
            let input = inputs[i % inputs.len()];
            tick(&mut a, &input, &mut OpenField);
            tick(&mut b, &input, &mut OpenField);
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.player.pos, b.player.pos);
    }

    #[test]
    fn test_movement_is_normalized() {
        let mut w = world();
        let input = TickInput {
            movement: Vec2::new(10.0, 10.0),
            ..Default::default()
        };
        tick(&mut w, &input, &mut OpenField);
        assert!((w.player.pos.length() - w.player.speed).abs() < 1e-4);
    }

    #[test]
    fn test_obstacle_blocks_movement() {
        let mut w = world();
        w.obstacles.push(Obstacle {
            bounds: Aabb::new(Vec2::new(20.0, -50.0), Vec2::new(60.0, 50.0)),
        });
        let right = TickInput {
            movement: Vec2::X,
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut w, &right, &mut OpenField);
        }
        assert!(w.player.pos.x > 0.0);
        assert!(w.player.pos.x + PLAYER_SIZE / 2.0 <= 20.0);
    }

    #[test]
    fn test_dash_moves_faster_then_cools_down() {
        let mut w = world();
        let dash = TickInput {
            movement: Vec2::X,
            dash: true,
            ..Default::default()
        };
        tick(&mut w, &dash, &mut OpenField);
        assert!(w.player.dash.active);
        let expected = w.player.speed * DASH_SPEED_MULT;
        assert!((w.player.pos.x - expected).abs() < 1e-3);
        for _ in 0..DASH_TICKS {
            tick(&mut w, &dash, &mut OpenField);
        }
        assert!(!w.player.dash.active);
        assert!(w.player.dash.cooldown > 0);
    }

    #[test]
    fn test_dash_stops_at_obstacle() {
        let mut w = world();
        w.obstacles.push(Obstacle {
            bounds: Aabb::new(Vec2::new(30.0, -50.0), Vec2::new(80.0, 50.0)),
        });
        let dash = TickInput {
            movement: Vec2::X,
            dash: true,
            ..Default::default()
        };
        for _ in 0..3 {
            tick(&mut w, &dash, &mut OpenField);
        }
        assert!(!w.player.dash.active);
        assert!(w.player.pos.x + PLAYER_SIZE / 2.0 <= 30.0);
    }

    #[test]
    fn test_far_enemies_culled_except_bosses() {
        let mut w = world();
        w.spawn_enemy(EnemyKind::Grunt, Vec2::new(ENEMY_CULL_DISTANCE + 500.0, 0.0));
        w.spawn_enemy(
            EnemyKind::Boss {
                special_cooldown: 100,
            },
            Vec2::new(ENEMY_CULL_DISTANCE + 500.0, 0.0),
        );
        tick(&mut w, &idle(), &mut OpenField);
        assert_eq!(w.enemies.len(), 1);
        assert!(w.enemies[0].is_boss());
        assert_eq!(w.kills, 0);
    }

    #[test]
    fn test_particle_cap_drops_oldest() {
        let mut w = world();
        let cap = w.config.max_particles();
        for i in 0..(cap + 50) {
            w.particles.push(Particle {
                pos: Vec2::new(i as f32, 0.0),
                vel: Vec2::ZERO,
                color: 0,
                life: 1.0,
                size: 1.0,
            });
        }
        tick(&mut w, &idle(), &mut OpenField);
        assert!(w.particles.len() <= cap);
        assert!((w.particles.last().unwrap().pos.x - (cap + 49) as f32).abs() < 1e-3);
    }

    #[test]
    fn test_time_limit_starts_transition() {
        let mut w = world();
        w.time_remaining = SIM_DT * 0.5;
        tick(&mut w, &idle(), &mut OpenField);
        assert!(matches!(
            w.phase,
            GamePhase::FinalBossTransition(TransitionStage::Clearing { .. })
        ));
    }

    #[test]
    fn test_full_transition_then_victory() {
        let mut w = world();
        w.time_remaining = 0.0;
        let mut ticks = 0;
        while !w.final_boss_mode && ticks < 1000 {
            tick(&mut w, &idle(), &mut OpenField);
            ticks += 1;
        }
        assert!(w.final_boss_mode);
        assert_eq!(w.live_enemy_count(), 2);

        for e in &mut w.enemies {
            e.dead = true;
        }
        tick(&mut w, &idle(), &mut OpenField);
        assert_eq!(w.phase, GamePhase::Victory);
        assert!(w.summary.as_ref().is_some_and(|s| s.victory));
    }

    #[test]
    fn test_no_damage_while_preparing_final() {
        let mut w = world();
        w.time_remaining = 0.0;
        w.phase = GamePhase::FinalBossTransition(TransitionStage::Preparing {
            remaining: PREPARE_TICKS,
        });
        w.pickups.push(Pickup {
            pos: w.player.pos + Vec2::new(10.0, 0.0),
            kind: PickupKind::BossBomb {
                fuse: 5,
                radius: 60.0,
                damage: 40.0,
            },
            dead: false,
        });
        let health = w.player.health;
        for _ in 0..10 {
            tick(&mut w, &idle(), &mut OpenField);
        }
        assert!(matches!(
            w.phase,
            GamePhase::FinalBossTransition(TransitionStage::Preparing { .. })
        ));
        assert!((w.player.health - health).abs() < 1e-6);
        assert!(w.pickups.is_empty());
    }

    #[test]
    fn test_spawning_starts_on_interval() {
        let mut w = world();
        for _ in 0..90 {
            tick(&mut w, &idle(), &mut OpenField);
        }
        assert_eq!(w.live_enemy_count(), 1);
    }
}
