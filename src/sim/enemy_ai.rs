//! Per-variant enemy behavior, final-boss attacks and contact damage

use glam::Vec2;
use rand::Rng;

use super::collision::{Collider, circle_overlap, distance_to_segment};
use super::combat::{damage_player, kill_enemy};
use super::enemy::{BeamState, ChargeState, EnemyKind, FinalBossState};
use super::spawn::check_twin_enrage;
use super::state::{Owner, Pickup, PickupKind, Projectile, World, colors, truncate_oldest};
use crate::consts::*;
use crate::polar_to_cartesian;

const ENEMY_SHOT_SPEED: f32 = 4.0;
const ENEMY_SHOT_SIZE: f32 = 6.0;
const SHOOTER_RANGE: f32 = 350.0;
const TELEPORT_OFFSET: f32 = 150.0;
const SUMMON_COUNT: usize = 3;
const CHARGE_WINDUP_TICKS: u32 = 30;
const CHARGE_RUSH_TICKS: u32 = 40;
const CHARGE_RUSH_MULT: f32 = 4.0;
const ORBIT_MIN_DISTANCE: f32 = 120.0;
const BEAM_LENGTH: f32 = 900.0;
const BEAM_WIDTH: f32 = 12.0;
const BEAM_CHARGE_TICKS: u32 = 60;
const BEAM_FIRE_TICKS: u32 = 30;

/// Run every live enemy for one tick, then the twin check and contact damage
pub fn update_enemies(world: &mut World) {
    let scale = world.enemy_speed_scale();
    let count = world.enemies.len();
    for i in 0..count {
        if !world.enemies[i].is_alive() {
            continue;
        }
        let step = world.enemies[i].speed * scale;
        let pos = world.enemies[i].pos;
        let to_player = world.player.pos - pos;
        let dir = to_player.normalize_or_zero();

        let vel = if to_player.length() > AI_CULL_DISTANCE {
            // Too far to matter: plain pursuit, no behavior
            dir * step
        } else {
            act(world, i, dir, to_player.length(), step)
        };
        world.enemies[i].pos += vel;
    }

    check_twin_enrage(world);
    contact_damage(world);
    truncate_oldest(&mut world.enemy_projectiles, MAX_ENEMY_PROJECTILES);
}

/// Variant behavior; returns the velocity for this tick
fn act(world: &mut World, i: usize, dir: Vec2, dist: f32, step: f32) -> Vec2 {
    let mut kind = world.enemies[i].kind;
    let pos = world.enemies[i].pos;
    let damage = world.enemies[i].damage;
    let player_pos = world.player.pos;

    let vel = match &mut kind {
        EnemyKind::Grunt
        | EnemyKind::Runner
        | EnemyKind::Brute
        | EnemyKind::Swarmling
        | EnemyKind::Exploder
        | EnemyKind::Splitter { .. }
        | EnemyKind::Shielded { .. } => dir * step,
        EnemyKind::Zigzag { phase } => {
            *phase += 0.1;
            dir * step + dir.perp() * phase.sin() * step * 0.8
        }
        EnemyKind::Shooter { cooldown } => {
            if tick_down(cooldown) {
                fire_at(world, pos, dir, damage * 0.6);
                *cooldown = 90;
            }
            if dist > SHOOTER_RANGE { dir * step } else { Vec2::ZERO }
        }
        EnemyKind::Skirmisher {
            preferred_distance,
            cooldown,
        } => {
            if tick_down(cooldown) {
                fire_at(world, pos, dir, damage * 0.6);
                *cooldown = 120;
            }
            if dist < *preferred_distance - 40.0 {
                -dir * step
            } else if dist > *preferred_distance + 40.0 {
                dir * step
            } else {
                dir.perp() * step
            }
        }
        EnemyKind::Teleporter { cooldown } => {
            if tick_down(cooldown) && dist > 200.0 {
                let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
                let target = player_pos + polar_to_cartesian(TELEPORT_OFFSET, angle);
                world.emit_particles(pos, 6, colors::VOID);
                world.emit_particles(target, 6, colors::VOID);
                world.enemies[i].pos = target;
                *cooldown = 180;
            }
            dir * step
        }
        EnemyKind::Summoner { cooldown } => {
            if tick_down(cooldown) {
                for _ in 0..SUMMON_COUNT.min(world.enemy_capacity()) {
                    let offset = Vec2::new(
                        world.rng.random_range(-30.0..30.0),
                        world.rng.random_range(-30.0..30.0),
                    );
                    world.spawn_enemy(EnemyKind::Swarmling, pos + offset);
                }
                *cooldown = 300;
            }
            if dist > 400.0 { dir * step } else { Vec2::ZERO }
        }
        EnemyKind::Charger { cooldown, charge } => match *charge {
            ChargeState::Idle => {
                if tick_down(cooldown) && dist < 450.0 {
                    *charge = ChargeState::Windup {
                        ticks: CHARGE_WINDUP_TICKS,
                        dir,
                    };
                }
                dir * step * 0.6
            }
            ChargeState::Windup { ticks, dir: locked } => {
                *charge = if ticks <= 1 {
                    ChargeState::Rushing {
                        ticks: CHARGE_RUSH_TICKS,
                        dir: locked,
                    }
                } else {
                    ChargeState::Windup {
                        ticks: ticks - 1,
                        dir: locked,
                    }
                };
                Vec2::ZERO
            }
            ChargeState::Rushing { ticks, dir: locked } => {
                if ticks <= 1 {
                    *charge = ChargeState::Idle;
                    *cooldown = 150;
                } else {
                    *charge = ChargeState::Rushing {
                        ticks: ticks - 1,
                        dir: locked,
                    };
                }
                locked * step * CHARGE_RUSH_MULT
            }
        },
        EnemyKind::Orbiter { angle, distance } => {
            *angle += 0.02;
            *distance = (*distance - 0.3).max(ORBIT_MIN_DISTANCE);
            let target = player_pos + polar_to_cartesian(*distance, *angle);
            (target - pos).clamp_length_max(step * 1.5)
        }
        EnemyKind::Boss { special_cooldown } => {
            if tick_down(special_cooldown) {
                radial_barrage(world, pos, 12, damage * 0.5);
                *special_cooldown = 180;
            }
            dir * step
        }
        EnemyKind::FinalBoss(state) => {
            final_boss_attacks(world, state, pos, dir, dist, step, damage)
        }
    };

    world.enemies[i].kind = kind;
    vel
}

/// Count a cooldown toward zero; true once it is there
fn tick_down(cooldown: &mut u32) -> bool {
    *cooldown = cooldown.saturating_sub(1);
    *cooldown == 0
}

fn fire_at(world: &mut World, pos: Vec2, dir: Vec2, damage: f32) {
    world.enemy_projectiles.push(Projectile::new(
        Owner::Enemy,
        pos,
        dir * ENEMY_SHOT_SPEED,
        damage,
        ENEMY_SHOT_SIZE,
    ));
}

fn radial_barrage(world: &mut World, pos: Vec2, count: usize, damage: f32) {
    let offset = world.rng.random::<f32>() * std::f32::consts::TAU;
    for k in 0..count {
        let angle = offset + k as f32 * std::f32::consts::TAU / count as f32;
        let vel = polar_to_cartesian(ENEMY_SHOT_SPEED, angle);
        world
            .enemy_projectiles
            .push(Projectile::new(Owner::Enemy, pos, vel, damage, ENEMY_SHOT_SIZE));
    }
}

fn final_boss_attacks(
    world: &mut World,
    state: &mut FinalBossState,
    pos: Vec2,
    dir: Vec2,
    dist: f32,
    step: f32,
    damage: f32,
) -> Vec2 {
    let faster = if state.enraged { 2 } else { 1 };

    if tick_down(&mut state.bomb_cooldown) {
        world.pickups.push(Pickup {
            pos: world.player.pos,
            kind: PickupKind::BossBomb {
                fuse: 90,
                radius: 90.0,
                damage: damage * 1.2,
            },
            dead: false,
        });
        state.bomb_cooldown = 240 / faster;
    }

    if tick_down(&mut state.barrage_cooldown) {
        radial_barrage(world, pos, 16, damage * 0.4);
        state.barrage_cooldown = 180 / faster;
    }

    match state.beam {
        BeamState::Idle => {
            if tick_down(&mut state.beam_cooldown) {
                state.beam = BeamState::Charging {
                    ticks: BEAM_CHARGE_TICKS,
                    angle: dir.y.atan2(dir.x),
                };
            }
        }
        BeamState::Charging { ticks, angle } => {
            state.beam = if ticks <= 1 {
                BeamState::Firing {
                    ticks: BEAM_FIRE_TICKS,
                    angle,
                }
            } else {
                BeamState::Charging {
                    ticks: ticks - 1,
                    angle,
                }
            };
            // Rooted while charging
            return Vec2::ZERO;
        }
        BeamState::Firing { ticks, angle } => {
            let end = pos + polar_to_cartesian(BEAM_LENGTH, angle);
            let reach = world.player.hit_radius() + BEAM_WIDTH;
            if distance_to_segment(world.player.pos, pos, end) < reach {
                damage_player(world, damage);
            }
            if ticks <= 1 {
                state.beam = BeamState::Idle;
                state.beam_cooldown = 420 / faster;
            } else {
                state.beam = BeamState::Firing {
                    ticks: ticks - 1,
                    angle,
                };
            }
            return Vec2::ZERO;
        }
    }

    if dist > 250.0 { dir * step } else { dir.perp() * step * 0.5 }
}

/// Enemies touching the player hurt it and are destroyed, without rewards.
/// Exploders go off instead; bosses stay.
fn contact_damage(world: &mut World) {
    for i in 0..world.enemies.len() {
        let e = &world.enemies[i];
        if !e.is_alive() || !circle_overlap(e, &world.player) {
            continue;
        }
        if matches!(e.kind, EnemyKind::Exploder) {
            kill_enemy(world, i);
        } else {
            let (damage, pos, boss) = (e.damage, e.pos, e.is_boss());
            damage_player(world, damage);
            if !boss {
                world.enemies[i].dead = true;
                world.emit_particles(pos, 6, colors::BLOOD);
            }
        }
        if world.is_over() {
            return;
        }
    }
}
