//! Discrete grid movement
//!
//! A body is either idle or moving. An accepted move commits the logical
//! position at once, so collisions see the new cell immediately, while the
//! `Moving` countdown rejects further commands until it runs out. Commands
//! arriving mid-move are dropped, not queued.

use glam::IVec2;
use rand::Rng;

use super::grid::Grid;
use super::state::{Body, Motion, SessionState};
use crate::{CARDINALS, is_cardinal};

/// Try to step `body` by `delta`
///
/// Returns false and leaves the body untouched when the step is not a single
/// cardinal step, the body is still moving, or the target is out of bounds
/// or not empty.
pub fn try_move(grid: &Grid, body: &mut Body, delta: IVec2, duration: f32) -> bool {
    if !is_cardinal(delta) || body.is_moving() {
        return false;
    }
    let target = body.position + delta;
    if !grid.is_walkable(target) {
        return false;
    }

    body.motion = Motion::Moving {
        from: body.position,
        remaining: duration,
    };
    body.position = target;
    true
}

/// Run down a body's transition timer
pub fn advance_motion(body: &mut Body, dt: f32) {
    if let Motion::Moving { ref mut remaining, .. } = body.motion {
        *remaining -= dt;
        if *remaining <= 0.0 {
            body.motion = Motion::Idle;
        }
    }
}

/// Advance every enemy's wander clock and hop the ones that are due
///
/// Each due enemy picks one of the four directions uniformly and tries it.
/// A blocked pick is simply lost for that interval. An enemy hops at most
/// once per call, however many intervals `dt` spans; the clock keeps only
/// the phase of the overshoot.
pub fn wander_enemies(state: &mut SessionState, dt: f32, interval: f32, duration: f32) {
    let SessionState {
        grid, enemies, rng, ..
    } = state;

    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        advance_motion(&mut enemy.body, dt);

        enemy.wander_in -= dt;
        if enemy.wander_in <= 0.0 {
            enemy.wander_in = next_wander_in(enemy.wander_in, interval);
            let delta = CARDINALS[rng.random_range(0..CARDINALS.len())];
            if !try_move(grid, &mut enemy.body, delta, duration) {
                log::trace!("Enemy {} stays put at {}", enemy.id, enemy.body.position);
            }
        }
    }
}

/// Time until the next hop, given an overdue (non-positive) clock
fn next_wander_in(overdue: f32, interval: f32) -> f32 {
    let overshoot = (-overdue).rem_euclid(interval);
    if overshoot.is_finite() {
        interval - overshoot
    } else {
        interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn corridor() -> Grid {
        Grid::from_rows(&[
            "#######", //
            "#...+.#", //
            "#.#.#.#", //
            "#######",
        ])
    }

    #[test]
    fn test_move_commits_position_immediately() {
        let grid = corridor();
        let mut body = Body::at(IVec2::new(1, 1));
        assert!(try_move(&grid, &mut body, IVec2::X, 0.2));
        assert_eq!(body.position, IVec2::new(2, 1));
        assert!(body.is_moving());
    }

    #[test]
    fn test_blocked_moves_are_rejected() {
        let grid = corridor();
        // Wall above
        let mut body = Body::at(IVec2::new(1, 1));
        assert!(!try_move(&grid, &mut body, IVec2::NEG_Y, 0.2));
        // Lattice wall below (2,2) from (2,1)
        let mut body = Body::at(IVec2::new(2, 1));
        assert!(!try_move(&grid, &mut body, IVec2::Y, 0.2));
        // Block at (4,1)
        let mut body = Body::at(IVec2::new(3, 1));
        assert!(!try_move(&grid, &mut body, IVec2::X, 0.2));
        assert_eq!(body.position, IVec2::new(3, 1));
        assert_eq!(body.motion, Motion::Idle);
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let grid = Grid::new_empty(3, 3);
        let mut body = Body::at(IVec2::new(0, 0));
        assert!(!try_move(&grid, &mut body, IVec2::NEG_X, 0.2));
        assert!(!try_move(&grid, &mut body, IVec2::NEG_Y, 0.2));
        assert_eq!(body.position, IVec2::ZERO);
    }

    #[test]
    fn test_diagonal_and_zero_deltas_are_rejected() {
        let grid = Grid::new_empty(5, 5);
        let mut body = Body::at(IVec2::new(2, 2));
        assert!(!try_move(&grid, &mut body, IVec2::new(1, 1), 0.2));
        assert!(!try_move(&grid, &mut body, IVec2::ZERO, 0.2));
        assert!(!try_move(&grid, &mut body, IVec2::new(2, 0), 0.2));
        assert_eq!(body.position, IVec2::new(2, 2));
    }

    #[test]
    fn test_second_move_rejected_until_transition_ends() {
        let grid = corridor();
        let mut body = Body::at(IVec2::new(1, 1));
        assert!(try_move(&grid, &mut body, IVec2::X, 0.2));

        // Still mid-transition
        assert!(!try_move(&grid, &mut body, IVec2::X, 0.2));
        assert_eq!(body.position, IVec2::new(2, 1));

        advance_motion(&mut body, 0.125);
        assert!(!try_move(&grid, &mut body, IVec2::X, 0.2));

        advance_motion(&mut body, 0.125);
        assert_eq!(body.motion, Motion::Idle);
        assert!(try_move(&grid, &mut body, IVec2::X, 0.2));
        assert_eq!(body.position, IVec2::new(3, 1));
    }

    #[test]
    fn test_enemy_wanders_once_per_interval() {
        let settings = Settings::default();
        let mut state = SessionState::from_rows(
            &[
                "#####", //
                "#...#", //
                "#...#", //
                "#...#", //
                "#####",
            ],
            &settings,
            11,
        );
        let id = state.spawn_enemy(IVec2::new(2, 2), 1.0);

        // Not due yet
        wander_enemies(&mut state, 0.5, 1.0, 0.5);
        assert_eq!(state.enemies[0].position(), IVec2::new(2, 2));

        // Due: every direction from the centre is open, so it must move
        wander_enemies(&mut state, 0.5, 1.0, 0.5);
        let enemy = &state.enemies[0];
        assert_eq!(enemy.id, id);
        assert_eq!((enemy.position() - IVec2::new(2, 2)).abs().element_sum(), 1);
    }

    #[test]
    fn test_boxed_in_enemy_never_moves() {
        let settings = Settings::default();
        let mut state = SessionState::from_rows(
            &[
                "#####", //
                "#.+.#", //
                "#+.+#", //
                "#.+.#", //
                "#####",
            ],
            &settings,
            3,
        );
        state.spawn_enemy(IVec2::new(2, 2), 1.0);
        for _ in 0..20 {
            wander_enemies(&mut state, 1.0, 1.0, 0.5);
        }
        assert_eq!(state.enemies[0].position(), IVec2::new(2, 2));
    }

    #[test]
    fn test_huge_dt_hops_at_most_once() {
        let settings = Settings::default();
        let mut state = SessionState::from_rows(
            &[
                "#######", //
                "#.....#", //
                "#.....#", //
                "#.....#", //
                "#######",
            ],
            &settings,
            5,
        );
        state.spawn_enemy(IVec2::new(3, 2), 1.0);

        wander_enemies(&mut state, 1.0e8, 1.0, 0.5);
        let enemy = &state.enemies[0];
        assert_eq!((enemy.position() - IVec2::new(3, 2)).abs().element_sum(), 1);
        assert!(enemy.wander_in > 0.0 && enemy.wander_in <= 1.0);

        let before = enemy.position();
        wander_enemies(&mut state, f32::INFINITY, 1.0, 0.5);
        let enemy = &state.enemies[0];
        assert!((enemy.position() - before).abs().element_sum() <= 1);
        assert_eq!(enemy.wander_in, 1.0);
    }

    #[test]
    fn test_overshoot_keeps_phase() {
        assert_eq!(next_wander_in(0.0, 1.0), 1.0);
        assert!((next_wander_in(-0.25, 1.0) - 0.75).abs() < 1e-6);
        assert!((next_wander_in(-2.25, 1.0) - 0.75).abs() < 1e-6);
        assert_eq!(next_wander_in(f32::NEG_INFINITY, 1.0), 1.0);
    }

    proptest! {
        #[test]
        fn prop_moves_stay_on_walkable_cells(
            seed in any::<u64>(),
            steps in proptest::collection::vec((0usize..4, 0u8..3), 1..64),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let grid = Grid::generate(17, 9, 2, 1.0 / 3.0, &mut rng);
            let mut body = Body::at(IVec2::new(1, 1));
            for (dir, waits) in steps {
                let before = body.position;
                let was_moving = body.is_moving();
                let moved = try_move(&grid, &mut body, CARDINALS[dir], 0.2);
                prop_assert!(grid.is_walkable(body.position));
                if was_moving {
                    prop_assert!(!moved);
                    prop_assert_eq!(body.position, before);
                }
                for _ in 0..waits {
                    advance_motion(&mut body, 0.1);
                }
            }
        }
    }
}
