//! Level-up offers and permanent upgrades
//!
//! A run may hold at most three distinct upgrades per category at once; each
//! upgrade goes up to level 5, where a one-time "ultimate" bonus kicks in.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, Player, World};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Combat,
    Utility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeId {
    // Combat
    Damage,
    FireRate,
    MultiShot,
    Piercing,
    Explosion,
    ProjectileSize,
    // Utility
    Swiftness,
    Vitality,
    Regeneration,
    Magnet,
    Wisdom,
    Haste,
    Frost,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 13] = [
        UpgradeId::Damage,
        UpgradeId::FireRate,
        UpgradeId::MultiShot,
        UpgradeId::Piercing,
        UpgradeId::Explosion,
        UpgradeId::ProjectileSize,
        UpgradeId::Swiftness,
        UpgradeId::Vitality,
        UpgradeId::Regeneration,
        UpgradeId::Magnet,
        UpgradeId::Wisdom,
        UpgradeId::Haste,
        UpgradeId::Frost,
    ];

    pub fn category(&self) -> Category {
        match self {
            Self::Damage
            | Self::FireRate
            | Self::MultiShot
            | Self::Piercing
            | Self::Explosion
            | Self::ProjectileSize => Category::Combat,
            Self::Swiftness
            | Self::Vitality
            | Self::Regeneration
            | Self::Magnet
            | Self::Wisdom
            | Self::Haste
            | Self::Frost => Category::Utility,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Damage => "Sharpened Edge",
            Self::FireRate => "Quick Hands",
            Self::MultiShot => "Split Shot",
            Self::Piercing => "Piercing",
            Self::Explosion => "Volatile Rounds",
            Self::ProjectileSize => "Heavy Ammo",
            Self::Swiftness => "Swiftness",
            Self::Vitality => "Vitality",
            Self::Regeneration => "Regeneration",
            Self::Magnet => "Magnetism",
            Self::Wisdom => "Wisdom",
            Self::Haste => "Haste",
            Self::Frost => "Frost Nova",
        }
    }
}

/// Upgrade levels owned this run (absent = level 0)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeLedger {
    levels: BTreeMap<UpgradeId, u8>,
}

impl UpgradeLedger {
    pub fn level(&self, id: UpgradeId) -> u8 {
        self.levels.get(&id).copied().unwrap_or(0)
    }

    /// Distinct upgrades owned in a category, regardless of level
    pub fn owned_in(&self, category: Category) -> usize {
        self.levels
            .iter()
            .filter(|(id, level)| **level > 0 && id.category() == category)
            .count()
    }

    pub fn total_levels(&self) -> u32 {
        self.levels.values().map(|&l| l as u32).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UpgradeId, u8)> + '_ {
        self.levels.iter().map(|(&id, &level)| (id, level))
    }

    /// Raise an upgrade by one level (saturating at max); returns the new level
    fn increment(&mut self, id: UpgradeId) -> u8 {
        let level = self.levels.entry(id).or_insert(0);
        *level = (*level + 1).min(MAX_UPGRADE_LEVEL);
        *level
    }
}

/// XP needed to go from `level` to `level + 1`
pub fn xp_to_next(level: u32) -> u32 {
    10 + level.saturating_sub(1) * 8
}

/// Upgrades that may be offered right now
pub fn eligible_upgrades(ledger: &UpgradeLedger) -> Vec<UpgradeId> {
    UpgradeId::ALL
        .iter()
        .copied()
        .filter(|&id| match ledger.level(id) {
            0 => ledger.owned_in(id.category()) < CATEGORY_CAP,
            level => level < MAX_UPGRADE_LEVEL,
        })
        .collect()
}

/// Start a level-up if the player has enough XP.
///
/// Returns true when gameplay was paused for an upgrade choice.
pub fn check_level_up(world: &mut World) -> bool {
    if world.phase != GamePhase::Playing || !world.player.is_alive() {
        return false;
    }
    let needed = xp_to_next(world.player.level);
    if world.player.xp < needed {
        return false;
    }

    let mut eligible = eligible_upgrades(&world.upgrades);
    if eligible.is_empty() {
        // Nothing left to offer: park XP just below the threshold and stop orb drops
        world.player.xp = needed.saturating_sub(1);
        if !world.xp_drops_suppressed {
            log::info!("All upgrade slots exhausted; XP drops suppressed");
            world.xp_drops_suppressed = true;
        }
        return false;
    }

    world.player.xp -= needed;
    world.player.level += 1;
    eligible.shuffle(&mut world.rng);
    eligible.truncate(UPGRADE_CHOICES);
    log::debug!("Level {} choices: {:?}", world.player.level, eligible);
    world.upgrade_choices = eligible.clone();
    world.phase = GamePhase::LevelUp;
    world.push_event(GameEvent::LevelUp {
        level: world.player.level,
        choices: eligible,
    });
    true
}

/// Apply the choice at `index` and resume play.
///
/// Returns `None` (and changes nothing) when no level-up is pending or the
/// index is out of range.
pub fn select_upgrade(world: &mut World, index: usize) -> Option<UpgradeId> {
    if world.phase != GamePhase::LevelUp {
        return None;
    }
    let id = *world.upgrade_choices.get(index)?;
    let level = world.upgrades.increment(id);
    apply_upgrade(world, id, level);
    if level == MAX_UPGRADE_LEVEL {
        apply_ultimate(world, id);
    }
    enforce_safeguards(&mut world.player);
    recompute_difficulty(world);

    log::info!("Upgrade {} -> level {}", id.name(), level);
    world.upgrade_choices.clear();
    world.phase = GamePhase::Playing;
    world.push_event(GameEvent::UpgradeChosen { upgrade: id, level });
    Some(id)
}

fn apply_upgrade(world: &mut World, id: UpgradeId, level: u8) {
    let p = &mut world.player;
    match id {
        UpgradeId::Damage => p.damage_mult += 0.15,
        UpgradeId::FireRate => p.shoot_cooldown *= 0.9,
        UpgradeId::MultiShot => p.multi_shot += 1,
        UpgradeId::Piercing => p.piercing += 1,
        UpgradeId::Explosion => p.explosion_radius += 25.0,
        UpgradeId::ProjectileSize => p.projectile_size += 0.2,
        UpgradeId::Swiftness => p.speed = p.base_speed * (1.0 + 0.1 * level as f32),
        UpgradeId::Vitality => {
            p.max_health += 20.0;
            p.health = (p.health + 20.0).min(p.max_health);
        }
        UpgradeId::Regeneration => p.regen += 0.5,
        UpgradeId::Magnet => p.pickup_radius += 25.0,
        UpgradeId::Wisdom => p.xp_mult += 0.15,
        UpgradeId::Haste => p.ability_cooldown_mult *= 0.9,
        UpgradeId::Frost => {
            // Temporary slow; kept apart from the difficulty speed modifier
            world.slow_factor = (1.0 - 0.1 * level as f32).max(0.5);
            world.slow_ticks = 5 * TICKS_PER_SECOND;
        }
    }
}

/// One-time tier-5 bonus
fn apply_ultimate(world: &mut World, id: UpgradeId) {
    log::info!("Ultimate unlocked: {}", id.name());
    let p = &mut world.player;
    match id {
        UpgradeId::Damage => {
            p.piercing += 2;
            p.damage_mult += 0.25;
        }
        UpgradeId::FireRate => p.shoot_cooldown *= 0.8,
        UpgradeId::MultiShot => p.multi_shot += 2,
        UpgradeId::Piercing => {
            p.piercing += 3;
            p.damage_mult += 0.1;
        }
        UpgradeId::Explosion => p.explosion_radius += 40.0,
        UpgradeId::ProjectileSize => p.projectile_size += 0.5,
        UpgradeId::Swiftness => {
            p.speed *= 1.15;
            p.ability_cooldown_mult *= 0.85;
        }
        UpgradeId::Vitality => {
            p.max_health += 50.0;
            p.health = p.max_health;
        }
        UpgradeId::Regeneration => p.regen += 2.0,
        UpgradeId::Magnet => p.pickup_radius *= 2.0,
        UpgradeId::Wisdom => p.xp_mult += 0.5,
        UpgradeId::Haste => p.ability_cooldown_mult *= 0.7,
        UpgradeId::Frost => {
            world.slow_factor = 0.4;
            world.slow_ticks = 10 * TICKS_PER_SECOND;
        }
    }
}

/// Bound worst-case projectile volume regardless of stacking
pub fn enforce_safeguards(player: &mut Player) {
    player.multi_shot = player.multi_shot.min(MULTI_SHOT_CAP);
    player.shoot_cooldown = player
        .shoot_cooldown
        .max(player.base_shoot_cooldown * SHOOT_COOLDOWN_FLOOR);
}

/// Couple spawn pressure and enemy speed to total upgrade levels
pub fn recompute_difficulty(world: &mut World) {
    let total = world.upgrades.total_levels() as f32;
    world.spawn_rate_modifier = 1.0 + total * 0.04;
    world.enemy_speed_modifier = (1.0 + total * 0.015).min(1.6);
}
