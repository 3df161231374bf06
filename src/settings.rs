//! Run settings and preferences
//!
//! Loaded from a JSON file by the host; every field has a default so partial
//! files are accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_MAX_ENEMIES, DEFAULT_TIME_LIMIT_SECS};
use crate::sim::WeaponKind;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 400,
            QualityPreset::High => 1200,
        }
    }

    /// Maximum floating damage numbers for this preset
    pub fn max_damage_numbers(&self) -> usize {
        match self {
            QualityPreset::Low => 20,
            QualityPreset::Medium => 60,
            QualityPreset::High => 150,
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for the run
    pub seed: u64,
    /// Selected character (decides weapon and ability)
    pub character: WeaponKind,
    /// Survival time budget before the final-boss encounter
    pub time_limit_secs: f32,
    /// Enemy population cap
    pub max_enemies: usize,
    /// Graphics quality preset (caps transient effects)
    pub quality: QualityPreset,
    /// Particle effects on/off
    pub particles: bool,
    /// Screen shake on impacts
    pub screen_shake: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            character: WeaponKind::Ranged,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            max_enemies: DEFAULT_MAX_ENEMIES,
            quality: QualityPreset::Medium,
            particles: true,
            screen_shake: true,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective particle cap (0 when particles are disabled)
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn max_damage_numbers(&self) -> usize {
        self.quality.max_damage_numbers()
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
