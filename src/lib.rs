//! Blast Arena - a grid arena bomb game, headless
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, movement, bombs, collisions, session)
//! - `settings`: Tunable configuration with documented defaults
//!
//! Rendering, input routing and audio belong to the host. The host feeds
//! commands and elapsed time into [`sim::GameSession`] and draws its
//! [`sim::Snapshot`].

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Default arena width in cells
    pub const GRID_WIDTH: i32 = 17;
    /// Default arena height in cells
    pub const GRID_HEIGHT: i32 = 9;

    /// Seconds from placement to detonation
    pub const FUSE_SECONDS: f32 = 3.0;
    /// Seconds an explosion cell stays live (0.5 visible + 0.2 fade)
    pub const EXPLOSION_LIFETIME: f32 = 0.7;
    /// Seconds the player spends moving between two cells
    pub const MOVE_DURATION: f32 = 0.2;
    /// Seconds between enemy wander attempts
    pub const ENEMY_MOVE_INTERVAL: f32 = 1.0;
    /// Seconds an enemy spends moving between two cells
    pub const ENEMY_MOVE_DURATION: f32 = 0.5;
    /// Seconds between the player's death and the new session
    pub const RESTART_DELAY: f32 = 2.0;

    /// Chance that a free cell outside the safe zone becomes a block
    pub const BLOCK_CHANCE: f64 = 1.0 / 3.0;
    /// Chance that a destroyed block leaves a power-up behind
    pub const POWER_UP_CHANCE: f64 = 1.0 / 3.0;

    /// Player spawn cell (top-left corner inside the border)
    pub const PLAYER_SPAWN: (i32, i32) = (1, 1);
    /// Cells with x <= SAFE_ZONE and y <= SAFE_ZONE never get blocks
    pub const SAFE_ZONE: i32 = 2;
    /// Candidate enemy spawn cells, skipped when not empty
    pub const ENEMY_SPAWNS: [(i32, i32); 4] = [(15, 7), (13, 1), (3, 7), (9, 3)];

    pub const STARTING_BOMBS: u32 = 1;
    pub const STARTING_RADIUS: u32 = 1;

    /// Score for each enemy caught in a blast
    pub const ENEMY_KILL_SCORE: u64 = 100;
    /// Score for each power-up picked up
    pub const POWER_UP_SCORE: u64 = 50;
}

/// The four cardinal unit steps, in ray-cast order (down, up, right, left)
pub const CARDINALS: [IVec2; 4] = [IVec2::Y, IVec2::NEG_Y, IVec2::X, IVec2::NEG_X];

/// Returns true for a single orthogonal step
#[inline]
pub fn is_cardinal(delta: IVec2) -> bool {
    matches!((delta.x, delta.y), (0, 1) | (0, -1) | (1, 0) | (-1, 0))
}

/// Pin a probability into `[0, 1]` so `Rng::random_bool` never panics (NaN reads as 0)
#[inline]
pub fn clamp_chance(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}
