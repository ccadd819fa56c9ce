//! Typed failures for grid queries and bomb placement
//!
//! None of these end the session. Callers drop the command and carry on.

use glam::IVec2;
use thiserror::Error;

/// Grid access failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// Position lies outside `[0, width) x [0, height)`
    #[error("position ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
    #[error("cell ({x}, {y}) holds no block")]
    NotABlock { x: i32, y: i32 },
}

impl GridError {
    pub fn out_of_bounds(pos: IVec2) -> Self {
        GridError::OutOfBounds { x: pos.x, y: pos.y }
    }

    pub fn not_a_block(pos: IVec2) -> Self {
        GridError::NotABlock { x: pos.x, y: pos.y }
    }
}

/// Bomb placement failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BombError {
    #[error("a bomb already sits at ({}, {})", .0.x, .0.y)]
    AlreadyOccupied(IVec2),
    #[error("bomb limit of {max} reached")]
    BombLimitReached { max: u32 },
    #[error("owner cannot place bombs right now")]
    NotPlaying,
    #[error(transparent)]
    Grid(#[from] GridError),
}
