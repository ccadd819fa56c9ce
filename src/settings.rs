//! Session tuning
//!
//! Every timer, probability and grid dimension the simulation reads comes
//! from here. Hosts can ship a partial JSON document; missing fields fall
//! back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors produced while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Tunable game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub width: i32,
    pub height: i32,
    /// Safe corner around the player spawn kept free of blocks
    pub safe_zone: i32,
    pub enemy_spawns: Vec<(i32, i32)>,

    // === Timers (seconds) ===
    pub fuse_seconds: f32,
    pub explosion_lifetime: f32,
    pub move_duration: f32,
    pub enemy_move_interval: f32,
    pub enemy_move_duration: f32,
    pub restart_delay: f32,

    // === Probabilities ===
    pub block_chance: f64,
    pub power_up_chance: f64,

    // === Player capabilities ===
    pub starting_bombs: u32,
    pub starting_radius: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            safe_zone: SAFE_ZONE,
            enemy_spawns: ENEMY_SPAWNS.to_vec(),

            fuse_seconds: FUSE_SECONDS,
            explosion_lifetime: EXPLOSION_LIFETIME,
            move_duration: MOVE_DURATION,
            enemy_move_interval: ENEMY_MOVE_INTERVAL,
            enemy_move_duration: ENEMY_MOVE_DURATION,
            restart_delay: RESTART_DELAY,

            block_chance: BLOCK_CHANCE,
            power_up_chance: POWER_UP_CHANCE,

            starting_bombs: STARTING_BOMBS,
            starting_radius: STARTING_RADIUS,
        }
    }
}

impl Settings {
    /// Parse settings from JSON, filling gaps with defaults, then validate
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded settings ({}x{} arena)", settings.width, settings.height);
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the settings describe a playable arena
    pub fn validate(&self) -> Result<(), SettingsError> {
        // Border + spawn + lattice needs at least 5 cells each way
        if self.width < 5 || self.height < 5 {
            return Err(SettingsError::Invalid(format!(
                "arena must be at least 5x5, got {}x{}",
                self.width, self.height
            )));
        }
        if self.safe_zone < 1 {
            return Err(SettingsError::Invalid("safe_zone must cover the spawn cell".into()));
        }

        let timers = [
            ("fuse_seconds", self.fuse_seconds),
            ("explosion_lifetime", self.explosion_lifetime),
            ("move_duration", self.move_duration),
            ("enemy_move_interval", self.enemy_move_interval),
            ("enemy_move_duration", self.enemy_move_duration),
            ("restart_delay", self.restart_delay),
        ];
        for (name, value) in timers {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        for (name, p) in [("block_chance", self.block_chance), ("power_up_chance", self.power_up_chance)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SettingsError::Invalid(format!("{name} must be within [0, 1], got {p}")));
            }
        }

        if self.starting_bombs == 0 || self.starting_radius == 0 {
            return Err(SettingsError::Invalid(
                "starting_bombs and starting_radius must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
