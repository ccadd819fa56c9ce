//! Entity state and the session aggregate
//!
//! Everything a tick reads or writes lives in [`SessionState`]. Collections
//! are kept sorted by entity ID so iteration order, and therefore the event
//! stream, is deterministic.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid};
use crate::consts::PLAYER_SPAWN;
use crate::settings::Settings;

/// Stable identifier handed out at creation
pub type EntityId = u32;

/// ID reserved for the player; other entities count up from 1
pub const PLAYER_ID: EntityId = 0;

/// Discrete movement state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Idle,
    /// Logical position already moved; `remaining` gates the next command
    Moving { from: IVec2, remaining: f32 },
}

/// Anything that walks the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: IVec2,
    pub motion: Motion,
}

impl Body {
    pub fn at(position: IVec2) -> Self {
        Self {
            position,
            motion: Motion::Idle,
        }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        matches!(self.motion, Motion::Moving { .. })
    }

    /// Cell this body is leaving, while a transition is in flight
    #[inline]
    pub fn came_from(&self) -> Option<IVec2> {
        match self.motion {
            Motion::Moving { from, .. } => Some(from),
            Motion::Idle => None,
        }
    }

    /// True when the two bodies are swapping cells through each other
    pub fn crossed(&self, other: &Body) -> bool {
        self.came_from() == Some(other.position) && other.came_from() == Some(self.position)
    }
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub max_bombs: u32,
    pub explosion_radius: u32,
    pub alive: bool,
}

impl Player {
    pub fn new(position: IVec2, settings: &Settings) -> Self {
        Self {
            body: Body::at(position),
            max_bombs: settings.starting_bombs,
            explosion_radius: settings.starting_radius,
            alive: true,
        }
    }

    #[inline]
    pub fn position(&self) -> IVec2 {
        self.body.position
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.body.is_moving()
    }
}

/// A wandering enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub body: Body,
    /// Countdown to the next wander attempt
    pub wander_in: f32,
    pub alive: bool,
}

impl Enemy {
    #[inline]
    pub fn position(&self) -> IVec2 {
        self.body.position
    }
}

/// A lit bomb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub id: EntityId,
    pub position: IVec2,
    /// Seconds until detonation
    pub fuse: f32,
    pub owner: EntityId,
}

/// One live blast cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub position: IVec2,
    pub remaining: f32,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// +1 blast radius
    FirePower,
    /// +1 simultaneous bomb
    BombUp,
    /// Recognised but inert
    Speed,
    /// Recognised but inert
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::FirePower,
        PowerUpKind::BombUp,
        PowerUpKind::Speed,
        PowerUpKind::Shield,
    ];
}

/// A power-up lying on the floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub position: IVec2,
    pub kind: PowerUpKind,
}

/// Top-level session phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionPhase {
    Playing,
    /// Player died at `died_at`; a new session starts when `restart_in` hits zero
    GameOver { died_at: f32, restart_in: f32 },
}

/// Events emitted by a tick, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BombPlaced(IVec2),
    BombExploded(IVec2),
    BlockDestroyed(IVec2),
    EnemyKilled(EntityId),
    PowerUpCollected(PowerUpKind),
    PlayerDied,
    RestartedSession,
}

/// Complete mutable state of one session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub grid: Grid,
    pub player: Player,
    /// Live enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    /// Lit bombs (sorted by id)
    pub bombs: Vec<Bomb>,
    /// Live blast cells, at most one per position
    pub explosions: Vec<Explosion>,
    /// Uncollected power-ups (sorted by id)
    pub power_ups: Vec<PowerUp>,
    pub score: u64,
    pub phase: SessionPhase,
    /// Seconds simulated since the session started
    pub clock: f32,
    pub rng: Pcg32,
    next_id: EntityId,
}

impl SessionState {
    /// Generate a fresh layout, spawn the player and enemies
    pub fn generate(settings: &Settings, mut rng: Pcg32) -> Self {
        let grid = Grid::generate(
            settings.width,
            settings.height,
            settings.safe_zone,
            settings.block_chance,
            &mut rng,
        );
        let mut state = Self::with_grid(grid, settings, rng);
        state.spawn_enemies(settings);
        state
    }

    /// Build a session over a hand-made grid with no enemies
    pub fn with_grid(grid: Grid, settings: &Settings, rng: Pcg32) -> Self {
        let spawn = IVec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1);
        Self {
            grid,
            player: Player::new(spawn, settings),
            enemies: Vec::new(),
            bombs: Vec::new(),
            explosions: Vec::new(),
            power_ups: Vec::new(),
            score: 0,
            phase: SessionPhase::Playing,
            clock: 0.0,
            rng,
            next_id: PLAYER_ID + 1,
        }
    }

    /// Convenience for tests: hand-made grid, seeded generator
    pub fn from_rows(rows: &[&str], settings: &Settings, seed: u64) -> Self {
        Self::with_grid(Grid::from_rows(rows), settings, Pcg32::seed_from_u64(seed))
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place enemies on every candidate spawn that is in bounds and empty
    pub fn spawn_enemies(&mut self, settings: &Settings) {
        for &(x, y) in &settings.enemy_spawns {
            let pos = IVec2::new(x, y);
            if self.grid.get(pos) == Some(Cell::Empty) {
                self.spawn_enemy(pos, settings.enemy_move_interval);
            } else {
                log::debug!("Skipping enemy spawn at {pos}: cell not empty");
            }
        }
        log::info!("Spawned {} enemies", self.enemies.len());
    }

    /// Add one enemy at `pos`
    pub fn spawn_enemy(&mut self, pos: IVec2, wander_in: f32) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.push(Enemy {
            id,
            body: Body::at(pos),
            wander_in,
            alive: true,
        });
        id
    }

    /// Bombs currently owned by `owner`
    pub fn active_bombs(&self, owner: EntityId) -> usize {
        self.bombs.iter().filter(|b| b.owner == owner).count()
    }

    pub fn bomb_at(&self, pos: IVec2) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.position == pos)
    }

    pub fn explosion_at(&self, pos: IVec2) -> bool {
        self.explosions.iter().any(|e| e.position == pos)
    }

    pub fn power_up_at(&self, pos: IVec2) -> Option<&PowerUp> {
        self.power_ups.iter().find(|p| p.position == pos)
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.bombs.sort_by_key(|b| b.id);
        self.power_ups.sort_by_key(|p| p.id);
    }

    /// Owned read-only view for the host
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            grid: self.grid.to_rows(),
            player: self.player.clone(),
            enemies: self.enemies.clone(),
            bombs: self.bombs.clone(),
            explosions: self.explosions.clone(),
            power_ups: self.power_ups.clone(),
            score: self.score,
            phase: self.phase,
            clock: self.clock,
        }
    }
}

/// What the presentation layer draws
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: i32,
    pub height: i32,
    /// Text rows: `#` wall, `+` block, `.` empty
    pub grid: Vec<String>,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bombs: Vec<Bomb>,
    pub explosions: Vec<Explosion>,
    pub power_ups: Vec<PowerUp>,
    pub score: u64,
    pub phase: SessionPhase,
    pub clock: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_spawns_enemies_on_empty_candidates() {
        let settings = Settings::default();
        let state = SessionState::generate(&settings, Pcg32::seed_from_u64(5));
        assert_eq!(state.player.position(), IVec2::new(1, 1));
        assert!(state.player.alive);
        assert!(state.enemies.len() <= settings.enemy_spawns.len());
        for enemy in &state.enemies {
            assert_eq!(state.grid.get(enemy.position()), Some(Cell::Empty));
            assert!(
                settings
                    .enemy_spawns
                    .contains(&(enemy.position().x, enemy.position().y))
            );
        }
    }

    #[test]
    fn test_blocked_spawn_is_skipped() {
        let settings = Settings {
            block_chance: 1.0,
            ..Settings::default()
        };
        // Every candidate is outside the safe zone and off the lattice, so all get blocks
        let state = SessionState::generate(&settings, Pcg32::seed_from_u64(1));
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_entity_ids_are_unique_and_increasing() {
        let settings = Settings::default();
        let mut state = SessionState::from_rows(&["#####", "#...#", "#####"], &settings, 1);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, PLAYER_ID);
        assert!(b > a);
    }

    #[test]
    fn test_snapshot_serializes() {
        let settings = Settings::default();
        let state = SessionState::generate(&settings, Pcg32::seed_from_u64(3));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.grid.len(), 9);
        assert_eq!(snapshot.phase, SessionPhase::Playing);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"score\":0"));
    }
}
