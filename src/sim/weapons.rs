//! Player weapons and projectile flight
//!
//! Melee characters carry orbiting blades plus a periodic short-range burst;
//! ranged and magic characters lock onto the nearest enemies and fire on
//! cooldown. Projectile movement and hit detection for both owners live here
//! too, with the damage itself handed to `combat`.

use super::ability::{try_activate, update_strikes};
use super::collision::{Circle, circle_overlap};
use super::combat::{damage_player, player_projectile, projectile_hit, strike_enemy};
use super::state::{Blade, WeaponKind, World, truncate_oldest};
use crate::consts::*;
use crate::polar_to_cartesian;

/// Directions in one melee burst
const MELEE_BURST_DIRECTIONS: usize = 8;

/// Step 5: ability, scheduled strikes, then the character's weapon
pub fn update_weapons(world: &mut World, ability_pressed: bool) {
    if ability_pressed {
        try_activate(world);
    }
    update_strikes(world);

    match world.player.weapon {
        WeaponKind::Melee => {
            update_blades(world);
            melee_burst(world);
        }
        WeaponKind::Ranged | WeaponKind::Magic => fire_at_nearest(world),
    }
}

/// Number of blades for the current multi-shot level
pub fn blade_count(multi_shot: u32) -> usize {
    multi_shot.clamp(1, MELEE_BLADE_CAP) as usize
}

fn update_blades(world: &mut World) {
    let count = blade_count(world.player.multi_shot);
    if world.blades.len() != count {
        let base = world.blades.first().map_or(0.0, |b| b.angle);
        world.blades = (0..count)
            .map(|i| Blade {
                angle: base + i as f32 * std::f32::consts::TAU / count as f32,
                hit_cooldowns: Vec::new(),
            })
            .collect();
    }

    let damage = BASE_PROJECTILE_DAMAGE * world.player.damage_mult;
    let radius = MELEE_BLADE_SIZE * world.player.projectile_size;
    let mut blades = std::mem::take(&mut world.blades);
    for blade in &mut blades {
        blade.angle += MELEE_BLADE_SPIN;
        blade.hit_cooldowns.retain_mut(|(_, ticks)| {
            *ticks = ticks.saturating_sub(1);
            *ticks > 0
        });

        let zone = Circle::new(
            world.player.pos + polar_to_cartesian(MELEE_BLADE_RADIUS, blade.angle),
            radius,
        );
        for i in 0..world.enemies.len() {
            let e = &world.enemies[i];
            if !e.is_alive()
                || blade.hit_cooldowns.iter().any(|(id, _)| *id == e.id)
                || !circle_overlap(e, &zone)
            {
                continue;
            }
            blade
                .hit_cooldowns
                .push((e.id, MELEE_BLADE_HIT_COOLDOWN_TICKS));
            strike_enemy(world, i, damage);
        }
    }
    world.blades = blades;
    world.compact_enemies();
}

fn melee_burst(world: &mut World) {
    world.player.shoot_timer -= 1.0;
    if world.player.shoot_timer > 0.0 {
        return;
    }
    world.player.shoot_timer = world.player.shoot_cooldown;

    let p = &world.player;
    let damage = BASE_PROJECTILE_DAMAGE * 0.8 * p.damage_mult;
    let size = PROJECTILE_SIZE * 1.5 * p.projectile_size;
    let offset = p.facing.y.atan2(p.facing.x);
    let bursts: Vec<_> = (0..MELEE_BURST_DIRECTIONS)
        .map(|i| {
            let angle = offset + i as f32 * std::f32::consts::TAU / MELEE_BURST_DIRECTIONS as f32;
            let vel = polar_to_cartesian(MELEE_BURST_SPEED, angle);
            player_projectile(p, p.pos, vel, damage, size, 1)
                .with_lifetime(MELEE_BURST_LIFETIME_TICKS)
        })
        .collect();
    world.projectiles.extend(bursts);
}

/// Indices of up to `n` nearest live enemies within projectile range
pub fn nearest_enemies(world: &World, n: usize) -> Vec<usize> {
    let origin = world.player.pos;
    let mut candidates: Vec<(usize, f32)> = world
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive())
        .map(|(i, e)| (i, e.pos.distance_squared(origin)))
        .filter(|&(_, d)| d < PROJECTILE_RANGE * PROJECTILE_RANGE)
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates.into_iter().take(n).map(|(i, _)| i).collect()
}

fn fire_at_nearest(world: &mut World) {
    if world.player.shoot_timer > 0.0 {
        world.player.shoot_timer -= 1.0;
        return;
    }

    let (cap, speed, damage_scale, innate_pierce) = match world.player.weapon {
        WeaponKind::Magic => (MAGIC_TARGET_CAP, MAGIC_PROJECTILE_SPEED, 1.3, 1),
        _ => (RANGED_TARGET_CAP, RANGED_PROJECTILE_SPEED, 1.0, 0),
    };
    let n = world.player.multi_shot.min(cap) as usize;
    let targets = nearest_enemies(world, n);
    if targets.is_empty() {
        return; // Hold fire until something is in range
    }

    let p = &world.player;
    let damage = BASE_PROJECTILE_DAMAGE * damage_scale * p.damage_mult;
    let size = PROJECTILE_SIZE * p.projectile_size;
    let shots: Vec<_> = targets
        .iter()
        .map(|&i| {
            let dir = (world.enemies[i].pos - p.pos).normalize_or(p.facing);
            player_projectile(p, p.pos, dir * speed, damage, size, innate_pierce)
        })
        .collect();
    world.projectiles.extend(shots);
    world.player.shoot_timer = world.player.shoot_cooldown;
}

/// Step 6: move, expire, and collide every projectile
pub fn update_projectiles(world: &mut World) {
    let origin = world.player.pos;
    for p in &mut world.projectiles {
        p.pos += p.vel;
        if let Some(ticks) = &mut p.lifetime {
            *ticks = ticks.saturating_sub(1);
            if *ticks == 0 {
                p.dead = true;
            }
        }
        if p.pos.distance(origin) > PROJECTILE_RANGE {
            p.dead = true;
        }
    }

    for pi in 0..world.projectiles.len() {
        for ei in 0..world.enemies.len() {
            let p = &world.projectiles[pi];
            if p.dead {
                break;
            }
            let e = &world.enemies[ei];
            if !e.is_alive() || p.hits.contains(&e.id) || !circle_overlap(p, e) {
                continue;
            }
            projectile_hit(world, pi, ei);
        }
    }
    world.projectiles.retain(|p| !p.dead);
    world.compact_enemies();
    truncate_oldest(&mut world.projectiles, MAX_PLAYER_PROJECTILES);

    for i in 0..world.enemy_projectiles.len() {
        let p = &mut world.enemy_projectiles[i];
        p.pos += p.vel;
        if p.pos.distance(origin) > PROJECTILE_RANGE {
            p.dead = true;
            continue;
        }
        if circle_overlap(&world.enemy_projectiles[i], &world.player) {
            world.enemy_projectiles[i].dead = true;
            let damage = world.enemy_projectiles[i].damage;
            damage_player(world, damage);
        }
    }
    world.enemy_projectiles.retain(|p| !p.dead);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::state::{Owner, Projectile};
    use glam::Vec2;
    use proptest::prelude::*;

    fn world_with(character: WeaponKind) -> World {
        World::new(Settings {
            character,
            ..Settings::default()
        })
    }

    #[test]
    fn test_blade_count_capped() {
        assert_eq!(blade_count(1), 1);
        assert_eq!(blade_count(2), 2);
        assert_eq!(blade_count(6), 3);
    }

    #[test]
    fn test_blade_hit_cooldown_per_target() {
        let mut w = world_with(WeaponKind::Melee);
        w.player.shoot_timer = 1_000.0;
        // Sits where the single blade will be after its first spin step
        let pos = polar_to_cartesian(MELEE_BLADE_RADIUS, MELEE_BLADE_SPIN);
        w.spawn_enemy(EnemyKind::Brute, pos);
        w.enemies[0].health = 1_000.0;

        update_weapons(&mut w, false);
        let after_first = w.enemies[0].health;
        assert!(after_first < 1_000.0);
        update_weapons(&mut w, false);
        assert_eq!(w.enemies[0].health, after_first);
        assert_eq!(w.blades.len(), 1);
        assert_eq!(w.blades[0].hit_cooldowns.len(), 1);
    }

    #[test]
    fn test_melee_burst_is_short_lived() {
        let mut w = world_with(WeaponKind::Melee);
        update_weapons(&mut w, false);
        assert_eq!(w.projectiles.len(), MELEE_BURST_DIRECTIONS);
        for _ in 0..MELEE_BURST_LIFETIME_TICKS {
            update_projectiles(&mut w);
        }
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_ranged_targets_nearest_up_to_multishot() {
        let mut w = world_with(WeaponKind::Ranged);
        w.player.multi_shot = 2;
        w.spawn_enemy(EnemyKind::Grunt, Vec2::new(400.0, 0.0));
        w.spawn_enemy(EnemyKind::Grunt, Vec2::new(0.0, 100.0));
        w.spawn_enemy(EnemyKind::Grunt, Vec2::new(-200.0, 0.0));
        assert_eq!(nearest_enemies(&w, 2), vec![1, 2]);

        update_weapons(&mut w, false);
        assert_eq!(w.projectiles.len(), 2);
        assert!(w.projectiles[0].vel.y > 0.0);
        assert!(w.projectiles[1].vel.x < 0.0);
        assert!((w.player.shoot_timer - w.player.shoot_cooldown).abs() < 1e-6);
    }

    #[test]
    fn test_magic_target_cap() {
        let mut w = world_with(WeaponKind::Magic);
        w.player.multi_shot = 6;
        for i in 0..8 {
            w.spawn_enemy(EnemyKind::Grunt, Vec2::new(100.0 + 50.0 * i as f32, 0.0));
        }
        update_weapons(&mut w, false);
        assert_eq!(w.projectiles.len(), MAGIC_TARGET_CAP as usize);
    }

    #[test]
    fn test_holds_fire_without_targets() {
        let mut w = world_with(WeaponKind::Ranged);
        update_weapons(&mut w, false);
        assert!(w.projectiles.is_empty());
        assert_eq!(w.player.shoot_timer, 0.0);
    }

    #[test]
    fn test_projectile_never_hits_same_enemy_twice() {
        let mut w = world_with(WeaponKind::Ranged);
        w.spawn_enemy(EnemyKind::Brute, Vec2::new(300.0, 0.0));
        let mut p = player_projectile(
            &w.player,
            Vec2::new(300.0, 0.0),
            Vec2::new(0.1, 0.0),
            5.0,
            5.0,
            3,
        );
        p.max_pierce = 3;
        w.projectiles.push(p);
        for _ in 0..5 {
            update_projectiles(&mut w);
        }
        assert!((w.enemies[0].health - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_projectiles_culled_out_of_range() {
        let mut w = world_with(WeaponKind::Ranged);
        w.projectiles.push(player_projectile(
            &w.player,
            Vec2::new(PROJECTILE_RANGE - 1.0, 0.0),
            Vec2::new(5.0, 0.0),
            1.0,
            1.0,
            0,
        ));
        update_projectiles(&mut w);
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_enemy_projectile_hits_player_once() {
        let mut w = world_with(WeaponKind::Ranged);
        for _ in 0..2 {
            w.enemy_projectiles
                .push(Projectile::new(Owner::Enemy, Vec2::new(3.0, 0.0), Vec2::ZERO, 7.0, 6.0));
        }
        let before = w.player.health;
        update_projectiles(&mut w);
        assert!(w.enemy_projectiles.is_empty());
        assert!((w.player.health - (before - 7.0)).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_projectile_hits_at_most_pierce_plus_one(
            max_pierce in 0u32..6,
            enemies in 1usize..10,
        ) {
            let mut w = world_with(WeaponKind::Ranged);
            for _ in 0..enemies {
                w.spawn_enemy(EnemyKind::Brute, Vec2::new(300.0, 0.0));
            }
            let mut p = Projectile::new(Owner::Player, Vec2::new(300.0, 0.0), Vec2::ZERO, 1.0, 5.0);
            p.max_pierce = max_pierce;
            w.projectiles.push(p);

            update_projectiles(&mut w);
            update_projectiles(&mut w);
            let hit = w.enemies.iter().filter(|e| e.health < e.max_health).count();
            prop_assert_eq!(hit, enemies.min(max_pierce as usize + 1));
            prop_assert_eq!(w.projectiles.is_empty(), enemies > max_pierce as usize);
        }
    }
}
