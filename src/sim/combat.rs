//! Damage, death and loot
//!
//! Enemy deaths are tombstoned: the `dead` flag flips exactly once inside
//! `kill_enemy`, which is also the only place rewards are paid out. Sweeps
//! skip tombstoned enemies and `World::compact_enemies` removes them
//! afterwards.

use glam::Vec2;
use rand::Rng;

use super::collision::{Circle, circle_overlap};
use super::enemy::EnemyKind;
use super::state::{
    EntityId, GameEvent, Owner, Pickup, PickupKind, PickupSpawner, Player, Projectile,
    WeaponKind, World, XpOrb, colors,
};
use crate::consts::*;
use crate::polar_to_cartesian;

/// Blast radius of an exploder's death
pub const EXPLODER_BLAST_RADIUS: f32 = 80.0;
/// Damage of the instant bomb pickup
pub const BOMB_DAMAGE: f32 = 60.0;

/// Result of applying one hit to an enemy
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitOutcome {
    /// Health actually removed (after reduction)
    pub dealt: f32,
    /// A shield charge took the hit
    pub absorbed: bool,
    /// This hit killed the enemy
    pub killed: bool,
}

/// Effective pierce for a new player projectile
pub fn effective_pierce(player: &Player, innate: u32) -> u32 {
    let global = if player.explosion_radius > EXPLOSION_PIERCE_DAMPEN_RADIUS {
        player.piercing / 2
    } else {
        player.piercing
    };
    innate.max(global)
}

/// Build a player projectile with pierce already resolved
pub fn player_projectile(
    player: &Player,
    pos: Vec2,
    vel: Vec2,
    damage: f32,
    size: f32,
    innate_pierce: u32,
) -> Projectile {
    let mut projectile = Projectile::new(Owner::Player, pos, vel, damage, size);
    projectile.max_pierce = effective_pierce(player, innate_pierce);
    projectile
}

/// Apply raw damage to one enemy: shield first, then reduced health loss.
/// Triggers death handling when the enemy drops to zero.
pub fn hit_enemy(world: &mut World, idx: usize, damage: f32) -> HitOutcome {
    let (pos, dealt, lethal) = {
        let Some(enemy) = world.enemies.get_mut(idx) else {
            return HitOutcome::default();
        };
        if enemy.dead {
            return HitOutcome::default();
        }
        if let EnemyKind::Shielded { charges } = &mut enemy.kind {
            if *charges > 0 {
                *charges -= 1;
                let pos = enemy.pos;
                world.emit_particles(pos, 3, colors::FROST);
                return HitOutcome {
                    dealt: 0.0,
                    absorbed: true,
                    killed: false,
                };
            }
        }
        let dealt = damage * enemy.damage_reduction();
        enemy.health -= dealt;
        (enemy.pos, dealt, enemy.health <= 0.0)
    };

    world.add_damage_number(pos, dealt);
    if lethal {
        kill_enemy(world, idx);
    }
    HitOutcome {
        dealt,
        absorbed: false,
        killed: lethal,
    }
}

/// A primary hit from the player's weapon: damage, then weapon synergy
pub fn strike_enemy(world: &mut World, idx: usize, damage: f32) -> HitOutcome {
    let Some((id, pos)) = world.enemies.get(idx).map(|e| (e.id, e.pos)) else {
        return HitOutcome::default();
    };
    let outcome = hit_enemy(world, idx, damage);
    if outcome.dealt > 0.0 {
        apply_synergy(world, id, pos, outcome.dealt);
    }
    outcome
}

/// Weapon-specific side effects, based on the damage actually dealt
fn apply_synergy(world: &mut World, source: EntityId, pos: Vec2, dealt: f32) {
    match world.player.weapon {
        WeaponKind::Magic => {
            let mut nearby: Vec<(usize, f32)> = world
                .enemies
                .iter()
                .enumerate()
                .filter(|(_, e)| e.is_alive() && e.id != source)
                .map(|(i, e)| (i, e.pos.distance_squared(pos)))
                .filter(|&(_, d)| d < CHAIN_RANGE * CHAIN_RANGE)
                .collect();
            nearby.sort_by(|a, b| a.1.total_cmp(&b.1));
            for (i, _) in nearby.into_iter().take(CHAIN_TARGETS) {
                hit_enemy(world, i, dealt * CHAIN_FRACTION);
            }
        }
        WeaponKind::Ranged => {
            let p = &mut world.player;
            p.health = (p.health + dealt * LIFE_STEAL_FRACTION).min(p.max_health);
        }
        WeaponKind::Melee => {
            let area = Circle::new(pos, SHOCKWAVE_RADIUS);
            for i in 0..world.enemies.len() {
                let e = &world.enemies[i];
                if e.is_alive() && e.id != source && circle_overlap(e, &area) {
                    hit_enemy(world, i, dealt * SHOCKWAVE_FRACTION);
                }
            }
        }
    }
}

/// Resolve a player projectile striking an enemy: pierce accounting,
/// primary hit and synergy, then explosion splash.
pub fn projectile_hit(world: &mut World, proj_idx: usize, enemy_idx: usize) {
    let Some(target_id) = world.enemies.get(enemy_idx).map(|e| e.id) else {
        return;
    };
    let (damage, impact) = {
        let Some(p) = world.projectiles.get_mut(proj_idx) else {
            return;
        };
        p.hits.push(target_id);
        p.pierce_count += 1;
        if p.pierce_count > p.max_pierce {
            p.dead = true;
        }
        (p.damage, p.pos)
    };

    strike_enemy(world, enemy_idx, damage);

    let radius = world.player.explosion_radius;
    if radius > 0.0 {
        explode(world, impact, radius, damage * EXPLOSION_SPLASH_FRACTION);
    }
}

/// Splash damage to every live enemy within `radius` of `center`,
/// including one that was just hit directly
pub fn explode(world: &mut World, center: Vec2, radius: f32, damage: f32) {
    let area = Circle::new(center, radius);
    for i in 0..world.enemies.len() {
        let e = &world.enemies[i];
        if e.is_alive() && circle_overlap(e, &area) {
            hit_enemy(world, i, damage);
        }
    }
    world.emit_particles(center, 6, colors::FIRE);
}

/// Boss-bomb detonation: hurts enemies and the player alike
pub fn detonate_bomb(world: &mut World, pos: Vec2, radius: f32, damage: f32) {
    explode(world, pos, radius, damage);
    if circle_overlap(&world.player, &Circle::new(pos, radius)) {
        damage_player(world, damage * 0.5);
    }
    world.add_shake(6.0);
    world.push_event(GameEvent::BombDetonated { pos });
}

/// Damage every enemy within half a screen of the player
pub fn screen_bomb(world: &mut World) {
    let center = world.player.pos;
    explode(world, center, VIEW_WIDTH / 2.0, BOMB_DAMAGE);
    world.add_shake(10.0);
}

/// Apply damage to the player unless immune; any hit opens one immunity window.
///
/// Returns true if health was reduced.
pub fn damage_player(world: &mut World, amount: f32) -> bool {
    {
        let p = &mut world.player;
        if p.invincibility > 0 || !p.is_alive() || amount <= 0.0 {
            return false;
        }
        p.health = (p.health - amount).max(0.0);
        p.invincibility = INVINCIBILITY_TICKS;
    }
    let pos = world.player.pos;
    world.emit_particles(pos, 6, colors::BLOOD);
    world.add_shake(4.0);
    world.push_event(GameEvent::PlayerDamaged { amount });
    if !world.player.is_alive() {
        world.end_run(false);
    }
    true
}

/// Scatter XP orbs whose values add up to exactly `value`
pub fn drop_xp(world: &mut World, pos: Vec2, value: u32) {
    if value == 0 || world.xp_drops_suppressed {
        return;
    }
    let count = MAX_ORBS_PER_KILL.min(value.div_ceil(3));
    let base = value / count;
    let extra = value % count;
    for i in 0..count {
        let jitter = Vec2::new(
            world.rng.random_range(-8.0..8.0),
            world.rng.random_range(-8.0..8.0),
        );
        world.orbs.push(XpOrb {
            pos: pos + jitter,
            value: base + u32::from(i < extra),
            homing: false,
            dead: false,
        });
    }
}

/// Tombstone an enemy and pay out its rewards. No-op if already dead.
pub fn kill_enemy(world: &mut World, idx: usize) {
    let (id, pos, kind, score_value, xp_value, damage) = {
        let Some(e) = world.enemies.get_mut(idx) else {
            return;
        };
        if e.dead {
            return;
        }
        e.dead = true;
        (e.id, e.pos, e.kind, e.score_value, e.xp_value, e.damage)
    };

    world.score += score_value as u64 * world.wave as u64;
    world.kills += 1;
    drop_xp(world, pos, xp_value);
    world.emit_particles(pos, 8, colors::BLOOD);
    world.push_event(GameEvent::EnemyKilled {
        id,
        kind: kind.name().to_string(),
        pos,
    });

    match kind {
        EnemyKind::Exploder => {
            world.emit_particles(pos, 12, colors::FIRE);
            world.add_shake(3.0);
            if circle_overlap(&world.player, &Circle::new(pos, EXPLODER_BLAST_RADIUS)) {
                damage_player(world, damage);
            }
        }
        EnemyKind::Splitter { generation } if generation < 2 => {
            for side in [-1.0f32, 1.0] {
                if world.enemy_capacity() == 0 {
                    break;
                }
                let offset = Vec2::new(side * 12.0, 0.0);
                world.spawn_enemy(
                    EnemyKind::Splitter {
                        generation: generation + 1,
                    },
                    pos + offset,
                );
            }
        }
        EnemyKind::Boss { .. } => {
            for i in 0..BOSS_BOMB_RING {
                let angle = i as f32 * std::f32::consts::TAU / BOSS_BOMB_RING as f32;
                world.pickups.push(Pickup {
                    pos: pos + polar_to_cartesian(90.0, angle),
                    kind: PickupKind::BossBomb {
                        fuse: 120 + i as u32 * 8,
                        radius: 110.0,
                        damage: 80.0,
                    },
                    dead: false,
                });
            }
            world.boss_mode = false;
            world.boss_mode_timer = 0.0;
            world.add_shake(12.0);
            log::info!("Boss defeated (wave {})", world.wave);
            world.push_event(GameEvent::BossDefeated { wave: world.wave });
        }
        EnemyKind::FinalBoss(_) => {
            world.emit_particles(pos, 40, colors::VOID);
            world.add_shake(15.0);
        }
        _ => {
            // Occasional delayed pickup
            if world.rng.random_bool(0.02) {
                let kind = if world.rng.random_bool(0.5) {
                    PickupKind::Magnet
                } else {
                    PickupKind::Bomb
                };
                world.pickup_spawners.push(PickupSpawner {
                    pos,
                    kind,
                    delay: 30,
                });
            }
        }
    }
}
