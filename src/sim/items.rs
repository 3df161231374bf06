//! XP orbs, pickups and delayed pickup spawners

use super::collision::circle_overlap;
use super::combat::{detonate_bomb, screen_bomb};
use super::state::{GameEvent, Pickup, PickupKind, World, colors, truncate_oldest};
use crate::consts::*;

/// Homing speed for orbs and pickups (pixels per tick)
const ORB_HOMING_SPEED: f32 = 8.0;

/// Step 8 (before the level-up check)
pub fn update_items(world: &mut World) {
    update_orbs(world);
    update_pickups(world);
    update_spawners(world);
}

fn update_orbs(world: &mut World) {
    let player_pos = world.player.pos;
    let pickup_radius = world.player.pickup_radius;
    let mut gained = 0.0;
    for orb in &mut world.orbs {
        let offset = player_pos - orb.pos;
        if offset.length() < pickup_radius {
            orb.homing = true;
        }
        if orb.homing {
            orb.pos += offset.clamp_length_max(ORB_HOMING_SPEED);
        }
        if circle_overlap(&*orb, &world.player) {
            orb.dead = true;
            gained += orb.value as f32;
        }
    }
    world.orbs.retain(|o| !o.dead);
    truncate_oldest(&mut world.orbs, MAX_XP_ORBS);

    if gained > 0.0 {
        world.player.xp += (gained * world.player.xp_mult).round() as u32;
        world.emit_particles(player_pos, 2, colors::XP);
    }
}

fn update_pickups(world: &mut World) {
    if world.is_preparing_final() {
        world.defuse_boss_bombs();
    }
    let player_pos = world.player.pos;
    let pickup_radius = world.player.pickup_radius;
    for i in 0..world.pickups.len() {
        let pickup = &mut world.pickups[i];
        if pickup.dead {
            continue;
        }
        if let PickupKind::BossBomb {
            fuse,
            radius,
            damage,
        } = &mut pickup.kind
        {
            *fuse = fuse.saturating_sub(1);
            if *fuse == 0 {
                let (radius, damage) = (*radius, *damage);
                pickup.dead = true;
                let pos = pickup.pos;
                detonate_bomb(world, pos, radius, damage);
            }
            continue;
        }

        let offset = player_pos - pickup.pos;
        if offset.length() < pickup_radius {
            pickup.pos += offset.clamp_length_max(ORB_HOMING_SPEED);
        }
        if circle_overlap(&world.pickups[i], &world.player) {
            world.pickups[i].dead = true;
            let kind = world.pickups[i].kind;
            collect(world, kind);
        }
    }
    world.pickups.retain(|p| !p.dead);
    world.compact_enemies();
}

fn collect(world: &mut World, kind: PickupKind) {
    match kind {
        PickupKind::Magnet => {
            for orb in &mut world.orbs {
                orb.homing = true;
            }
        }
        PickupKind::Bomb => screen_bomb(world),
        PickupKind::BossBomb { .. } => {}
    }
    log::debug!("Picked up {:?}", kind);
    world.push_event(GameEvent::PickupCollected { kind });
}

fn update_spawners(world: &mut World) {
    let mut ready = Vec::new();
    world.pickup_spawners.retain_mut(|s| {
        s.delay = s.delay.saturating_sub(1);
        if s.delay == 0 {
            ready.push(Pickup {
                pos: s.pos,
                kind: s.kind,
                dead: false,
            });
            false
        } else {
            true
        }
    });
    world.pickups.extend(ready);
}
