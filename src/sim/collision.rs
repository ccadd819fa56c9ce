//! Grid collision resolution
//!
//! Collisions are exact cell coincidence, plus a player and an enemy that
//! swap cells in the same window (they walk through each other). One pass
//! checks, in order:
//! 1. Player against blast cells and live enemies (death)
//! 2. Enemies against blast cells (kills, removed on the spot)
//! 3. Player against power-ups (pickups, removed on the spot)
//!
//! Death and kills are independent: a player and an enemy caught in the same
//! blast both go down in the same pass.

use super::state::{GameEvent, SessionState};

/// What the player is touching this pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerContacts {
    pub explosion: bool,
    pub enemy: bool,
}

impl PlayerContacts {
    #[inline]
    pub fn is_lethal(&self) -> bool {
        self.explosion || self.enemy
    }
}

/// Check what the player is touching
pub fn player_contacts(state: &SessionState) -> PlayerContacts {
    let body = &state.player.body;
    PlayerContacts {
        explosion: state.explosion_at(body.position),
        enemy: state
            .enemies
            .iter()
            .filter(|e| e.alive)
            .any(|e| e.position() == body.position || body.crossed(&e.body)),
    }
}

/// Resolve every overlap in `state`, returning events in resolution order
///
/// Enemies are visited in ID order, so the result does not depend on how the
/// collections happen to be arranged.
pub fn resolve(state: &mut SessionState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    state.normalize_order();

    if state.player.alive && player_contacts(state).is_lethal() {
        state.player.alive = false;
        log::debug!("Player died at {}", state.player.position());
        events.push(GameEvent::PlayerDied);
    }

    let mut killed = Vec::new();
    for enemy in state.enemies.iter_mut().filter(|e| e.alive) {
        if state.explosions.iter().any(|x| x.position == enemy.position()) {
            enemy.alive = false;
            killed.push(enemy.id);
        }
    }
    state.enemies.retain(|e| e.alive);
    for id in killed {
        log::debug!("Enemy {id} killed");
        events.push(GameEvent::EnemyKilled(id));
    }

    if state.player.alive {
        let pos = state.player.position();
        if let Some(idx) = state.power_ups.iter().position(|p| p.position == pos) {
            let power_up = state.power_ups.remove(idx);
            log::debug!("Collected {:?} at {}", power_up.kind, pos);
            events.push(GameEvent::PowerUpCollected(power_up.kind));
        }
    }

    events
}
