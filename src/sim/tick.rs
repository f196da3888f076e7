//! Per-frame state transition
//!
//! One `tick` per rendered frame, driven by wall-clock deltas. Motion is
//! scaled by the elapsed milliseconds, so the game plays the same at any
//! frame rate; there is no fixed-step accumulator and no determinism
//! guarantee across runs.

use super::block::Axis;
use super::state::{GameEvent, GameState, Mode};
use crate::consts::*;

/// Edge-triggered inputs for a single tick, cleared by the driver afterwards
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Drop the sliding block (mouse press, touch start, or Space)
    pub action: bool,
    /// Start a fresh session (R key)
    pub restart: bool,
}

/// Advance the game by one frame's worth of elapsed time.
///
/// State changes that the physics world or the scene must mirror are pushed
/// onto `events` in the order they happened.
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32, events: &mut Vec<GameEvent>) {
    if input.restart {
        restart(state, events);
        return;
    }

    // Actions resolve before any movement; the layer they spawn first moves
    // on the following frame
    if input.action {
        match state.mode {
            // Any action during the attract mode hands control to the player
            Mode::Autopilot => restart(state, events),
            Mode::Manual => place(state, events),
        }
        return;
    }

    if state.ended {
        return;
    }

    let top = state.stack.len() - 1;
    let Some(axis) = state.stack[top].direction else {
        return;
    };

    let target = state.stack[top - 1].coord(axis) + state.robot_precision;
    let should_move = match state.mode {
        Mode::Manual => true,
        Mode::Autopilot => state.stack[top].coord(axis) < target,
    };

    if should_move {
        let mut coord = state.stack[top].coord(axis) + BLOCK_SPEED * dt_ms;
        // The robot halts exactly on its precision-adjusted target
        if state.mode == Mode::Autopilot && coord > target {
            coord = target;
        }
        state.stack[top].set_coord(axis, coord);

        // The block slid off the far side of the tower
        if coord > DROP_BOUND {
            miss(state, events);
        }
    } else if state.mode == Mode::Autopilot {
        place(state, events);
        state.resample_robot_precision();
    }
}

fn restart(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.restart();
    events.push(GameEvent::SessionReset);
}

/// Trim the sliding block against the layer below, or end the session if it
/// missed entirely.
fn place(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.ended {
        return;
    }

    let top = state.stack.len() - 1;
    let Some(axis) = state.stack[top].direction else {
        return;
    };

    let size = state.stack[top].size_along(axis);
    let delta = state.stack[top].coord(axis) - state.stack[top - 1].coord(axis);
    let overhang_size = delta.abs();
    let overlap = size - overhang_size;

    if overlap <= 0.0 {
        miss(state, events);
        return;
    }

    state.stack[top].trim(axis, overlap, delta);
    events.push(GameEvent::LayerTrimmed { index: top });

    // The whole cut-away remainder becomes one rigid offcut, adjacent to the
    // retained block on the side away from the tower's center
    if overhang_size > 0.0 {
        let shift = (overlap / 2.0 + overhang_size / 2.0) * delta.signum();
        let trimmed = &state.stack[top];
        let (x, z) = match axis {
            Axis::X => (trimmed.position.x + shift, trimmed.position.z),
            Axis::Z => (trimmed.position.x, trimmed.position.z + shift),
        };
        let (width, depth) = match axis {
            Axis::X => (overhang_size, trimmed.depth),
            Axis::Z => (trimmed.width, overhang_size),
        };
        state.add_overhang(x, z, width, depth);
        events.push(GameEvent::OverhangSpawned {
            index: state.overhangs.len() - 1,
        });
    }

    // Next layer: same footprint as the trimmed block, opposite slide axis,
    // keeping the coordinate on the axis that was just used
    let trimmed = &state.stack[top];
    let (x, z) = match axis {
        Axis::X => (trimmed.position.x, SPAWN_COORD),
        Axis::Z => (SPAWN_COORD, trimmed.position.z),
    };
    let (width, depth) = (trimmed.width, trimmed.depth);
    state.add_layer(x, z, width, depth, Some(axis.flip()));
    events.push(GameEvent::LayerSpawned {
        index: state.stack.len() - 1,
    });
    events.push(GameEvent::Scored {
        score: state.score(),
    });
}

/// The block missed the tower: hand it to the physics world and end the run
fn miss(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let top = state.stack.len() - 1;
    let block = &state.stack[top];
    let (x, z, width, depth) = (block.position.x, block.position.z, block.width, block.depth);

    state.add_overhang(x, z, width, depth);
    events.push(GameEvent::OverhangSpawned {
        index: state.overhangs.len() - 1,
    });

    state.stack.pop();
    events.push(GameEvent::LayerDropped { index: top });

    state.ended = true;
    events.push(GameEvent::Ended {
        show_results: state.mode == Mode::Manual,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FRAME_MS: f32 = 16.0;

    fn manual_state() -> GameState {
        let mut state = GameState::new(12345);
        state.restart();
        state
    }

    fn act(state: &mut GameState) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let input = TickInput {
            action: true,
            ..Default::default()
        };
        tick(state, &input, FRAME_MS, &mut events);
        events
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_manual_block_advances_with_elapsed_time() {
        let mut state = manual_state();
        let mut events = Vec::new();

        tick(&mut state, &TickInput::default(), 100.0, &mut events);

        let top = state.stack.last().unwrap();
        assert!(approx(top.position.x, SPAWN_COORD + BLOCK_SPEED * 100.0));
        assert!(events.is_empty());
    }

    #[test]
    fn test_trim_and_offcut_arithmetic() {
        // Supporting layer at x=0 width 3; active block dropped at x=1
        let mut state = manual_state();
        state.stack[1].position.x = 1.0;

        let events = act(&mut state);

        // Retained box: width 2 recentered over the overlap region
        let trimmed = &state.stack[1];
        assert_eq!(trimmed.width, 2.0);
        assert_eq!(trimmed.depth, 3.0);
        assert!(approx(trimmed.position.x, 0.5));

        // Offcut: width 1, adjacent to the retained box on the far side
        assert_eq!(state.overhangs.len(), 1);
        let offcut = &state.overhangs[0];
        assert_eq!(offcut.width, 1.0);
        assert_eq!(offcut.depth, 3.0);
        assert!(approx(offcut.position.x, 2.0));
        assert_eq!(offcut.position.y, BOX_HEIGHT);

        // Next layer: same footprint, flipped axis, far spawn on z
        let next = &state.stack[2];
        assert_eq!(next.direction, Some(Axis::Z));
        assert_eq!(next.width, 2.0);
        assert_eq!(next.depth, 3.0);
        assert!(approx(next.position.x, 0.5));
        assert_eq!(next.position.z, SPAWN_COORD);
        assert_eq!(next.position.y, 2.0 * BOX_HEIGHT);

        assert!(events.contains(&GameEvent::Scored { score: 1 }));
        assert!(events.contains(&GameEvent::LayerTrimmed { index: 1 }));
        assert!(events.contains(&GameEvent::OverhangSpawned { index: 0 }));
        assert!(events.contains(&GameEvent::LayerSpawned { index: 2 }));
    }

    #[test]
    fn test_complete_miss_ends_the_session() {
        // size 3 but drifted to x=4: overlap = 3 - 4 < 0
        let mut state = manual_state();
        state.stack[1].position.x = 4.0;

        let events = act(&mut state);

        assert!(state.ended);
        assert_eq!(state.stack.len(), 1);
        assert_eq!(state.overhangs.len(), 1);
        let dropped = &state.overhangs[0];
        assert_eq!(dropped.width, 3.0);
        assert_eq!(dropped.depth, 3.0);
        assert!(approx(dropped.position.x, 4.0));
        assert_eq!(state.score(), 0);
        assert!(events.contains(&GameEvent::Ended { show_results: true }));
        assert!(events.contains(&GameEvent::LayerDropped { index: 1 }));
    }

    #[test]
    fn test_action_after_end_is_a_no_op() {
        let mut state = manual_state();
        state.stack[1].position.x = 4.0;
        act(&mut state);
        assert!(state.ended);

        let events = act(&mut state);
        assert!(events.is_empty());
        assert_eq!(state.overhangs.len(), 1);
    }

    #[test]
    fn test_sliding_past_the_bound_is_a_miss() {
        let mut state = manual_state();
        let mut events = Vec::new();

        let mut frames = 0;
        while !state.ended {
            tick(&mut state, &TickInput::default(), FRAME_MS, &mut events);
            frames += 1;
            assert!(frames < 100_000, "block never crossed the drop bound");
        }

        assert_eq!(state.overhangs.len(), 1);
        assert_eq!(state.stack.len(), 1);
        assert!(state.overhangs[0].position.x > DROP_BOUND);
        assert!(events.contains(&GameEvent::Ended { show_results: true }));
    }

    #[test]
    fn test_action_during_autopilot_starts_a_manual_session() {
        let mut state = GameState::new(99);
        assert_eq!(state.mode, Mode::Autopilot);

        let events = act(&mut state);

        assert_eq!(state.mode, Mode::Manual);
        assert!(!state.ended);
        assert_eq!(state.stack.len(), 2);
        assert_eq!(events, vec![GameEvent::SessionReset]);
    }

    #[test]
    fn test_restart_input_resets_even_mid_game() {
        let mut state = manual_state();
        state.stack[1].position.x = 1.0;
        act(&mut state);

        let mut events = Vec::new();
        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_MS, &mut events);

        assert_eq!(state.stack.len(), 2);
        assert_eq!(state.overhangs.len(), 0);
        assert_eq!(state.score(), 0);
        assert_eq!(events, vec![GameEvent::SessionReset]);
    }

    #[test]
    fn test_autopilot_with_zero_precision_lands_perfectly() {
        let mut state = GameState::new(3);
        state.robot_precision = 0.0;
        let mut events = Vec::new();

        // Run until the robot has placed the first block
        let mut frames = 0;
        while state.stack.len() == 2 {
            tick(&mut state, &TickInput::default(), FRAME_MS, &mut events);
            frames += 1;
            assert!(frames < 100_000, "autopilot never placed a block");
        }

        // Halted exactly on the supporting layer, so nothing was cut away
        let placed = &state.stack[1];
        assert_eq!(placed.position.x, 0.0);
        assert_eq!(placed.width, BOX_BASE_SIZE);
        assert!(state.overhangs.is_empty());
        assert!(events.contains(&GameEvent::Scored { score: 1 }));
    }

    #[test]
    fn test_autopilot_halts_within_precision_and_keeps_playing() {
        let mut state = GameState::new(2024);
        let mut events = Vec::new();

        let mut frames = 0;
        while state.score() < 5 {
            tick(&mut state, &TickInput::default(), FRAME_MS, &mut events);
            frames += 1;
            assert!(frames < 1_000_000, "autopilot stalled");
            assert!(!state.ended, "autopilot should never miss");
        }

        // Every offcut is at most the precision bound wide
        for overhang in &state.overhangs {
            let cut = overhang.width.min(overhang.depth);
            assert!(cut <= ROBOT_PRECISION_RANGE + 1e-4);
        }
    }

    proptest! {
        #[test]
        fn trimmed_box_and_offcut_tile_the_original_extent(drift in -2.9f32..2.9) {
            prop_assume!(drift.abs() > 1e-3);

            let mut state = manual_state();
            state.stack[1].position.x = drift;
            let original_min = drift - BOX_BASE_SIZE / 2.0;
            let original_max = drift + BOX_BASE_SIZE / 2.0;

            act(&mut state);

            let trimmed = &state.stack[1];
            let offcut = &state.overhangs[0];
            let trimmed_min = trimmed.position.x - trimmed.width / 2.0;
            let trimmed_max = trimmed.position.x + trimmed.width / 2.0;
            let offcut_min = offcut.position.x - offcut.width / 2.0;
            let offcut_max = offcut.position.x + offcut.width / 2.0;

            let min = trimmed_min.min(offcut_min);
            let max = trimmed_max.max(offcut_max);
            prop_assert!((min - original_min).abs() < 1e-3);
            prop_assert!((max - original_max).abs() < 1e-3);

            // Adjacent, not overlapping
            let gap = if drift > 0.0 {
                (offcut_min - trimmed_max).abs()
            } else {
                (trimmed_min - offcut_max).abs()
            };
            prop_assert!(gap < 1e-3);
        }
    }
}
