//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed-time countdowns only, no wall clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod bomb;
pub mod collision;
pub mod error;
pub mod grid;
pub mod movement;
pub mod state;
pub mod tick;

pub use error::{BombError, GridError};
pub use grid::{Cell, Grid};
pub use state::{
    Body, Bomb, Enemy, EntityId, Explosion, GameEvent, Motion, PLAYER_ID, Player, PowerUp,
    PowerUpKind, SessionPhase, SessionState, Snapshot,
};
pub use tick::{Command, GameSession};
