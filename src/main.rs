//! Neon Serpent entry point
//!
//! Headless demo driver: runs the simulation with a scripted pilot on a
//! synthetic 60 fps clock and logs what happens. Useful for smoke-testing
//! balance changes without a renderer attached.

use neon_serpent::highscores::Leaderboard;
use neon_serpent::settings::Settings;
use neon_serpent::sim::{Direction, FrameInput, GameEvent, GamePhase, GameState, grid, tick};

/// Synthetic frame cadence (~60 fps)
const FRAME_MS: u64 = 16;
/// Stop a runaway demo after ten simulated minutes
const MAX_FRAMES: u64 = 10 * 60 * 1000 / FRAME_MS;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

    let settings = Settings::load();
    let mut leaderboard = Leaderboard::load();

    log::info!("neon serpent starting, seed {seed}");

    let mut state = GameState::new(seed);
    let mut raw_ms = 0u64;

    for _ in 0..MAX_FRAMES {
        raw_ms += FRAME_MS;
        let input = FrameInput { direction: pilot(&state), ..FrameInput::default() };
        tick(&mut state, &input, raw_ms);

        for event in state.take_events() {
            match event {
                GameEvent::ScoreChange { old, new } => log::debug!("score {old} -> {new}"),
                GameEvent::GameOver { reason } => log::info!("run over: {reason}"),
                other => log::trace!("{other:?}"),
            }
        }

        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    let now = state.clock.now();
    log::info!(
        "final score {} at length {} after {} ms",
        state.score,
        state.snake.len(),
        state.run_elapsed_ms(now),
    );

    if leaderboard.qualifies(state.score) {
        if let Some(rank) = leaderboard.add_score(&settings.player_name, state.score) {
            log::info!("{} entered the board at rank {rank}", settings.player_name);
        }
        leaderboard.save();
    }
}

/// Chase the nearest normal food, axis-first, never reversing.
fn pilot(state: &GameState) -> Option<Direction> {
    let head = state.head();
    let target = state
        .normal_foods
        .iter()
        .map(|f| f.pos)
        .min_by_key(|p| grid::manhattan(head, *p))?;
    let d = target - head;
    let horizontal = if d.x > 0 { Direction::Right } else { Direction::Left };
    let vertical = if d.y > 0 { Direction::Down } else { Direction::Up };
    let current = state.snake.dir;
    let pick = if d.x != 0 { horizontal } else { vertical };
    if pick != current.opposite() {
        return Some(pick);
    }
    // Peel off sideways instead of reversing
    let alt = if d.x != 0 { vertical } else { horizontal };
    (alt != current.opposite()).then_some(alt)
}
