//! Idle/demo mode: an AI that plays the game
//!
//! Produces a `TickInput` from the current world the same way a human front
//! end would, so headless runs exercise the full input path.

use glam::Vec2;

use super::state::{GamePhase, World};
use super::tick::TickInput;

/// Enemies closer than this push the autopilot away
const THREAT_RADIUS: f32 = 260.0;
/// Dash out when something gets this close
const PANIC_RADIUS: f32 = 70.0;
/// Use the ability when this many enemies are within threat range
const ABILITY_CROWD: usize = 5;

/// Pick this tick's input: kite away from the crowd, drift toward loot when safe
pub fn autopilot(world: &World) -> TickInput {
    if world.phase != GamePhase::Playing
        && !matches!(world.phase, GamePhase::FinalBossTransition(_))
    {
        return TickInput::default();
    }

    let me = world.player.pos;
    let mut push = Vec2::ZERO;
    let mut crowd = 0;
    let mut closest = f32::MAX;
    for e in world.enemies.iter().filter(|e| e.is_alive()) {
        let offset = me - e.pos;
        let dist = offset.length() - e.size;
        closest = closest.min(dist);
        if dist < THREAT_RADIUS {
            crowd += 1;
            // Inverse-distance weighting; bosses count extra
            let weight = if e.is_boss() { 3.0 } else { 1.0 };
            push += offset.normalize_or_zero() * weight / dist.max(1.0);
        }
    }

    let movement = if push.length_squared() > 0.0 {
        // Circle-strafe a little so the player does not back into a corner
        (push.normalize() + push.perp().normalize() * 0.35).normalize_or_zero()
    } else {
        world
            .orbs
            .iter()
            .min_by(|a, b| a.pos.distance_squared(me).total_cmp(&b.pos.distance_squared(me)))
            .map(|o| (o.pos - me).normalize_or_zero())
            .unwrap_or(Vec2::ZERO)
    };

    TickInput {
        movement,
        ability: world.ability.is_ready() && crowd >= ABILITY_CROWD,
        dash: closest < PANIC_RADIUS && world.player.dash.cooldown == 0,
        pause: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::state::XpOrb;
    use crate::sim::terrain::OpenField;
    use crate::sim::tick::tick;
    use crate::sim::upgrades::select_upgrade;

    #[test]
    fn test_flees_from_nearby_enemy() {
        let mut w = World::new(Settings::default());
        w.spawn_enemy(EnemyKind::Grunt, Vec2::new(100.0, 0.0));
        let input = autopilot(&w);
        assert!(input.movement.x < 0.0);
        assert!(!input.ability);
    }

    #[test]
    fn test_collects_orbs_when_safe() {
        let mut w = World::new(Settings::default());
        w.orbs.push(XpOrb {
            pos: Vec2::new(0.0, 300.0),
            value: 1,
            homing: false,
            dead: false,
        });
        let input = autopilot(&w);
        assert!(input.movement.y > 0.9);
    }

    #[test]
    fn test_idle_outside_gameplay() {
        let mut w = World::new(Settings::default());
        w.phase = GamePhase::LevelUp;
        assert_eq!(autopilot(&w), TickInput::default());
    }

    #[test]
    fn test_autopilot_survives_a_minute() {
        let mut w = World::new(Settings::default());
        for _ in 0..3600 {
            if w.phase == GamePhase::LevelUp {
                select_upgrade(&mut w, 0);
            }
            let input = autopilot(&w);
            tick(&mut w, &input, &mut OpenField);
        }
        assert!(w.elapsed > 59.0);
        assert!(w.kills > 0);
        assert!(w.live_enemy_count() <= w.config.max_enemies);
    }
}
