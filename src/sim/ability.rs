//! Character abilities
//!
//! Each weapon family has one active ability, gated by an `AbilityTimer`.
//! The timer counts frames: `tick` advances it on every call, including
//! frames where gameplay is paused for a level-up choice.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::combat::{hit_enemy, player_projectile};
use super::state::{GameEvent, ScheduledStrike, WeaponKind, World, colors};
use crate::consts::*;
use crate::polar_to_cartesian;

pub const PULSE_RADIUS: f32 = 150.0;
pub const PULSE_KNOCKBACK: f32 = 60.0;
pub const RING_PROJECTILES: usize = 24;
pub const LIGHTNING_STRIKES: u32 = 8;
pub const LIGHTNING_SPACING_TICKS: u32 = 6;
/// How far from the player a lightning strike looks for a target
pub const LIGHTNING_RANGE: f32 = 500.0;

/// Cooldown service for the active ability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityTimer {
    remaining: u32,
}

impl AbilityTimer {
    /// Ticks until the ability can fire again
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    /// Begin a cooldown; refused (false) while one is running
    pub fn start(&mut self, ticks: u32) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.remaining = ticks;
        true
    }

    pub fn advance(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Fire the player's ability if it is off cooldown.
///
/// Returns true if the ability fired.
pub fn try_activate(world: &mut World) -> bool {
    if !world.player.is_alive() {
        return false;
    }
    let cooldown = (ABILITY_COOLDOWN_TICKS * world.player.ability_cooldown_mult)
        .round()
        .max(1.0) as u32;
    if !world.ability.start(cooldown) {
        return false;
    }

    let weapon = world.player.weapon;
    match weapon {
        WeaponKind::Melee => radial_pulse(world),
        WeaponKind::Ranged => projectile_ring(world),
        WeaponKind::Magic => schedule_lightning(world),
    }
    log::debug!("Ability fired ({:?}), cooldown {} ticks", weapon, cooldown);
    world.push_event(GameEvent::AbilityUsed { weapon });
    true
}

fn radial_pulse(world: &mut World) {
    let center = world.player.pos;
    let damage = BASE_PROJECTILE_DAMAGE * 3.0 * world.player.damage_mult;
    for i in 0..world.enemies.len() {
        let e = &mut world.enemies[i];
        if !e.is_alive() {
            continue;
        }
        let offset = e.pos - center;
        if offset.length() >= PULSE_RADIUS + e.size {
            continue;
        }
        if !e.is_boss() {
            e.pos += offset.normalize_or(Vec2::X) * PULSE_KNOCKBACK;
        }
        hit_enemy(world, i, damage);
    }
    world.emit_particles(center, 24, colors::SPARK);
    world.add_shake(6.0);
}

fn projectile_ring(world: &mut World) {
    let origin = world.player.pos;
    let damage = BASE_PROJECTILE_DAMAGE * 1.5 * world.player.damage_mult;
    let size = PROJECTILE_SIZE * world.player.projectile_size;
    for i in 0..RING_PROJECTILES {
        let angle = i as f32 * std::f32::consts::TAU / RING_PROJECTILES as f32;
        let vel = polar_to_cartesian(RANGED_PROJECTILE_SPEED, angle);
        let projectile = player_projectile(&world.player, origin, vel, damage, size, 2);
        world.projectiles.push(projectile);
    }
}

fn schedule_lightning(world: &mut World) {
    let damage = BASE_PROJECTILE_DAMAGE * 2.5 * world.player.damage_mult;
    for i in 0..LIGHTNING_STRIKES {
        world.strikes.push(ScheduledStrike {
            delay: i * LIGHTNING_SPACING_TICKS,
            damage,
        });
    }
}

/// Count down pending lightning strikes and land the ones that are due
pub fn update_strikes(world: &mut World) {
    if world.strikes.is_empty() {
        return;
    }
    let mut due = Vec::new();
    world.strikes.retain_mut(|s| {
        if s.delay == 0 {
            due.push(s.damage);
            false
        } else {
            s.delay -= 1;
            true
        }
    });

    let center = world.player.pos;
    for damage in due {
        let candidates: Vec<usize> = world
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive() && e.pos.distance(center) < LIGHTNING_RANGE)
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            continue; // Fizzles
        }
        let idx = candidates[world.rng.random_range(0..candidates.len())];
        let pos = world.enemies[idx].pos;
        hit_enemy(world, idx, damage);
        world.emit_particles(pos, 6, colors::VOID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::state::Owner;

    fn world_with(character: WeaponKind) -> World {
        World::new(Settings {
            character,
            ..Settings::default()
        })
    }

    #[test]
    fn test_timer_refuses_second_start() {
        let mut t = AbilityTimer::default();
        assert!(t.is_ready());
        assert!(t.start(3));
        assert!(!t.start(10));
        assert_eq!(t.remaining(), 3);
        for _ in 0..3 {
            t.advance();
        }
        assert!(t.is_ready());
        t.advance();
        assert_eq!(t.remaining(), 0);
    }

    #[test]
    fn test_activation_during_cooldown_is_refused() {
        let mut w = world_with(WeaponKind::Ranged);
        assert!(try_activate(&mut w));
        assert_eq!(w.projectiles.len(), RING_PROJECTILES);
        assert!(!try_activate(&mut w));
        assert_eq!(w.projectiles.len(), RING_PROJECTILES);
        assert!(w.projectiles.iter().all(|p| p.owner == Owner::Player));
    }

    #[test]
    fn test_cooldown_scales_with_multiplier() {
        let mut w = world_with(WeaponKind::Ranged);
        w.player.ability_cooldown_mult = 0.5;
        try_activate(&mut w);
        assert_eq!(w.ability.remaining(), (ABILITY_COOLDOWN_TICKS * 0.5) as u32);
    }

    #[test]
    fn test_melee_pulse_damages_and_pushes() {
        let mut w = world_with(WeaponKind::Melee);
        w.spawn_enemy(EnemyKind::Brute, Vec2::new(50.0, 0.0));
        w.spawn_enemy(EnemyKind::Brute, Vec2::new(900.0, 0.0));
        try_activate(&mut w);
        assert!((w.enemies[0].health - (80.0 - BASE_PROJECTILE_DAMAGE * 3.0)).abs() < 1e-4);
        assert!((w.enemies[0].pos.x - (50.0 + PULSE_KNOCKBACK)).abs() < 1e-4);
        assert!((w.enemies[1].health - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_lightning_lands_over_time() {
        let mut w = world_with(WeaponKind::Magic);
        w.spawn_enemy(EnemyKind::Brute, Vec2::new(100.0, 0.0));
        w.enemies[0].health = 10_000.0;
        try_activate(&mut w);
        assert_eq!(w.strikes.len(), LIGHTNING_STRIKES as usize);

        update_strikes(&mut w);
        let after_first = w.enemies[0].health;
        assert!(after_first < 10_000.0);

        for _ in 0..(LIGHTNING_STRIKES * LIGHTNING_SPACING_TICKS) {
            update_strikes(&mut w);
        }
        assert!(w.strikes.is_empty());
        let expected = 10_000.0 - LIGHTNING_STRIKES as f32 * BASE_PROJECTILE_DAMAGE * 2.5;
        assert!((w.enemies[0].health - expected).abs() < 1e-2);
    }

    #[test]
    fn test_lightning_fizzles_without_targets() {
        let mut w = world_with(WeaponKind::Magic);
        try_activate(&mut w);
        for _ in 0..100 {
            update_strikes(&mut w);
        }
        assert!(w.strikes.is_empty());
        assert_eq!(w.kills, 0);
    }
}
