//! Session state machine and the tick loop
//!
//! One call to [`GameSession::tick`] advances the whole simulation:
//! 1. Apply queued player commands
//! 2. Run down movement timers and let enemies wander
//! 3. Run down bomb fuses (detonating) and explosion lifetimes
//! 4. Resolve collisions into events
//! 5. Apply events to score, capabilities and phase
//!
//! In `GameOver` the world is frozen; only the restart countdown runs.

use std::collections::VecDeque;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::bomb::{self, advance_bombs, advance_explosions};
use super::collision;
use super::error::BombError;
use super::movement::{self, advance_motion, wander_enemies};
use super::state::{GameEvent, PLAYER_ID, PowerUpKind, SessionPhase, SessionState, Snapshot};
use crate::consts::{ENEMY_KILL_SCORE, POWER_UP_SCORE};
use crate::settings::{Settings, SettingsError};

/// A player intent, queued until the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Step by `(dx, dy)`; only single cardinal steps are honoured
    Move { dx: i32, dy: i32 },
    /// Drop a bomb on the player's cell
    PlaceBomb,
}

impl Command {
    pub const UP: Command = Command::Move { dx: 0, dy: -1 };
    pub const DOWN: Command = Command::Move { dx: 0, dy: 1 };
    pub const LEFT: Command = Command::Move { dx: -1, dy: 0 };
    pub const RIGHT: Command = Command::Move { dx: 1, dy: 0 };
}

/// Top-level game session
#[derive(Debug, Clone)]
pub struct GameSession {
    settings: Settings,
    seed: u64,
    state: SessionState,
    commands: VecDeque<Command>,
}

impl GameSession {
    /// Start a session seeded from system entropy
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        let seed = rand::rng().random::<u64>();
        Self::with_seed(settings, seed)
    }

    /// Start a reproducible session
    ///
    /// Settings are validated before anything is generated, so bad values
    /// come back as [`SettingsError::Invalid`] instead of a panic mid-run.
    pub fn with_seed(settings: Settings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        log::info!("Starting session with seed {seed}");
        let state = SessionState::generate(&settings, Pcg32::seed_from_u64(seed));
        Self::from_state(settings, seed, state)
    }

    /// Wrap an already-built state (hand-made arenas, replays)
    pub fn from_state(
        settings: Settings,
        seed: u64,
        state: SessionState,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings,
            seed,
            state,
            commands: VecDeque::new(),
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.state.phase, SessionPhase::GameOver { .. })
    }

    /// Queue a command for the next tick; dropped while the game is over
    pub fn issue_command(&mut self, command: Command) {
        if self.is_game_over() {
            log::debug!("Ignoring {command:?} during game over");
            return;
        }
        self.commands.push_back(command);
    }

    /// Step the player immediately
    ///
    /// False when the step is diagonal, blocked, out of bounds, the player is
    /// mid-move, or the session is not playing.
    pub fn try_move_player(&mut self, dx: i32, dy: i32) -> bool {
        if self.is_game_over() || !self.state.player.alive {
            return false;
        }
        movement::try_move(
            &self.state.grid,
            &mut self.state.player.body,
            IVec2::new(dx, dy),
            self.settings.move_duration,
        )
    }

    /// Drop a bomb on the player's cell immediately
    pub fn place_bomb(&mut self) -> Result<IVec2, BombError> {
        if self.is_game_over() || !self.state.player.alive {
            return Err(BombError::NotPlaying);
        }
        let pos = self.state.player.position();
        bomb::place_bomb(&mut self.state, PLAYER_ID, pos, &self.settings)?;
        Ok(pos)
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// A negative or non-finite `dt` is ignored: nothing advances and no
    /// events are returned.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Ignoring tick with dt={dt}");
            return events;
        }

        let phase = self.state.phase;
        match phase {
            SessionPhase::Playing => {
                self.state.clock += dt;
                self.apply_commands(&mut events);

                advance_motion(&mut self.state.player.body, dt);
                wander_enemies(
                    &mut self.state,
                    dt,
                    self.settings.enemy_move_interval,
                    self.settings.enemy_move_duration,
                );

                // Older blasts fade before new ones are lit
                advance_explosions(&mut self.state, dt);
                events.extend(advance_bombs(&mut self.state, dt, &self.settings));

                let collisions = collision::resolve(&mut self.state);
                for event in &collisions {
                    self.apply_event(*event);
                }
                events.extend(collisions);
            }
            SessionPhase::GameOver {
                died_at,
                restart_in,
            } => {
                let restart_in = restart_in - dt;
                if restart_in <= 0.0 {
                    self.restart();
                    events.push(GameEvent::RestartedSession);
                } else {
                    self.state.phase = SessionPhase::GameOver {
                        died_at,
                        restart_in,
                    };
                }
            }
        }

        log::trace!("tick dt={dt} events={}", events.len());
        events
    }

    /// Throw everything away and start over on a fresh layout
    ///
    /// The generator carries on from where it was, so the new arena differs
    /// from the old one while the run stays reproducible from its seed.
    pub fn restart(&mut self) {
        let rng = self.state.rng.clone();
        self.state = SessionState::generate(&self.settings, rng);
        self.commands.clear();
        log::info!("Session restarted");
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    fn apply_commands(&mut self, events: &mut Vec<GameEvent>) {
        while let Some(command) = self.commands.pop_front() {
            match command {
                Command::Move { dx, dy } => {
                    if !self.try_move_player(dx, dy) {
                        log::debug!("Move ({dx}, {dy}) rejected");
                    }
                }
                Command::PlaceBomb => match self.place_bomb() {
                    Ok(pos) => events.push(GameEvent::BombPlaced(pos)),
                    Err(e) => log::debug!("Bomb rejected: {e}"),
                },
            }
        }
    }

    fn apply_event(&mut self, event: GameEvent) {
        let state = &mut self.state;
        match event {
            GameEvent::EnemyKilled(_) => state.score = state.score.saturating_add(ENEMY_KILL_SCORE),
            GameEvent::PowerUpCollected(kind) => {
                state.score = state.score.saturating_add(POWER_UP_SCORE);
                match kind {
                    PowerUpKind::FirePower => {
                        state.player.explosion_radius = state.player.explosion_radius.saturating_add(1)
                    }
                    PowerUpKind::BombUp => state.player.max_bombs = state.player.max_bombs.saturating_add(1),
                    PowerUpKind::Speed | PowerUpKind::Shield => {}
                }
            }
            GameEvent::PlayerDied => {
                log::info!("Game over at {:.2}s with score {}", state.clock, state.score);
                state.phase = SessionPhase::GameOver {
                    died_at: state.clock,
                    restart_in: self.settings.restart_delay,
                };
                self.commands.clear();
            }
            _ => {}
        }
    }
}
