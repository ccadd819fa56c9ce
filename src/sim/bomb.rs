//! Bomb fuses and blast propagation
//!
//! A detonation lights its own cell, then casts one ray per cardinal
//! direction up to the owner's blast radius:
//! - out of bounds or wall: the ray stops, nothing lit
//! - block: the block is cleared, its cell lit, a power-up may drop, then stop
//! - empty: lit, keep going
//!
//! A ray passing over another bomb ignites it in the same pass.

use std::collections::VecDeque;

use glam::IVec2;
use rand::Rng;

use super::error::BombError;
use super::grid::Cell;
use super::state::{Bomb, EntityId, Explosion, GameEvent, PLAYER_ID, PowerUp, PowerUpKind, SessionState};
use crate::{CARDINALS, clamp_chance};
use crate::settings::Settings;

/// Light a bomb for `owner` at `pos`
pub fn place_bomb(
    state: &mut SessionState,
    owner: EntityId,
    pos: IVec2,
    settings: &Settings,
) -> Result<(), BombError> {
    // Rejects out-of-bounds callers before anything else
    state.grid.cell_at(pos)?;

    if state.bomb_at(pos).is_some() {
        return Err(BombError::AlreadyOccupied(pos));
    }
    let max = max_bombs(state, owner);
    if state.active_bombs(owner) >= max as usize {
        return Err(BombError::BombLimitReached { max });
    }

    let id = state.next_entity_id();
    state.bombs.push(Bomb {
        id,
        position: pos,
        fuse: settings.fuse_seconds,
        owner,
    });
    log::debug!("Bomb {id} placed at {pos} by {owner}");
    Ok(())
}

/// Run down every fuse and detonate the ones that reach zero
///
/// Returns the events produced, in detonation order.
pub fn advance_bombs(state: &mut SessionState, dt: f32, settings: &Settings) -> Vec<GameEvent> {
    let mut ready: VecDeque<EntityId> = VecDeque::new();
    for bomb in &mut state.bombs {
        bomb.fuse -= dt;
        if bomb.fuse <= 0.0 {
            ready.push_back(bomb.id);
        }
    }

    let mut events = Vec::new();
    while let Some(id) = ready.pop_front() {
        let lit = detonate(state, id, settings, &mut events);
        // Chain: any other bomb under fresh blast cells goes off this tick
        for bomb in &mut state.bombs {
            if lit.contains(&bomb.position) && !ready.contains(&bomb.id) {
                bomb.fuse = 0.0;
                ready.push_back(bomb.id);
            }
        }
    }
    events
}

/// Detonate bomb `id`, returning every cell it lit
///
/// The bomb leaves the active set before its rays are cast, so it can never
/// fire twice. Unknown ids light nothing.
pub fn detonate(
    state: &mut SessionState,
    id: EntityId,
    settings: &Settings,
    events: &mut Vec<GameEvent>,
) -> Vec<IVec2> {
    let Some(idx) = state.bombs.iter().position(|b| b.id == id) else {
        return Vec::new();
    };
    let bomb = state.bombs.remove(idx);
    let radius = blast_radius(state, bomb.owner);
    events.push(GameEvent::BombExploded(bomb.position));

    // Rays never outrun the grid, whatever the radius
    let reach = i32::try_from(radius)
        .unwrap_or(i32::MAX)
        .min(state.grid.width().max(state.grid.height()));

    let mut lit = vec![bomb.position];
    for dir in CARDINALS {
        for step in 1..=reach {
            let pos = bomb.position + dir * step;
            match state.grid.get(pos) {
                None | Some(Cell::Wall) => break,
                Some(Cell::Block) => {
                    // Cell is known to be a block
                    if state.grid.clear_block(pos).is_ok() {
                        events.push(GameEvent::BlockDestroyed(pos));
                        lit.push(pos);
                        maybe_drop_power_up(state, pos, settings.power_up_chance);
                    }
                    break;
                }
                Some(Cell::Empty) => lit.push(pos),
            }
        }
    }

    for &pos in &lit {
        ignite(state, pos, settings.explosion_lifetime);
    }
    log::debug!("Bomb {} exploded at {} lighting {} cells", id, bomb.position, lit.len());
    lit
}

/// Run down explosion lifetimes, dropping the expired ones
pub fn advance_explosions(state: &mut SessionState, dt: f32) {
    for explosion in &mut state.explosions {
        explosion.remaining -= dt;
    }
    state.explosions.retain(|e| e.remaining > 0.0);
}

/// Light `pos`, refreshing an existing blast cell instead of stacking
fn ignite(state: &mut SessionState, pos: IVec2, lifetime: f32) {
    match state.explosions.iter_mut().find(|e| e.position == pos) {
        Some(existing) => existing.remaining = existing.remaining.max(lifetime),
        None => state.explosions.push(Explosion {
            position: pos,
            remaining: lifetime,
        }),
    }
}

fn maybe_drop_power_up(state: &mut SessionState, pos: IVec2, chance: f64) {
    if !state.rng.random_bool(clamp_chance(chance)) || state.power_up_at(pos).is_some() {
        return;
    }
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp { id, position: pos, kind });
    log::debug!("Power-up {kind:?} dropped at {pos}");
}

fn max_bombs(state: &SessionState, owner: EntityId) -> u32 {
    if owner == PLAYER_ID { state.player.max_bombs } else { 1 }
}

fn blast_radius(state: &SessionState, owner: EntityId) -> u32 {
    if owner == PLAYER_ID { state.player.explosion_radius } else { 1 }
}
