//! Pickup effects, the magnet, and the shrink channel
//!
//! `apply_item` is the single entry point for item effects, whether the
//! item came from the grid or arrived by magnet flight. The magnet never
//! moves the snake; it lifts nearby collectibles into short flights that
//! resolve against the head's position at arrival time.

use std::collections::HashSet;

use rand::Rng;

use crate::consts::*;
use crate::sim::events::Cue;
use crate::sim::grid::{self, Cell};
use crate::sim::state::{FlightKind, GameState, ItemKind, MagnetFlight};
use crate::sim::tick;

/// Resolve one picked-up (or delivered) item at `head`.
pub fn apply_item(state: &mut GameState, kind: ItemKind, head: Cell, now: u64) {
    match kind {
        ItemKind::Magnet => {
            state.push_cue(Cue::MagnetHum);
            let duration =
                state.rng.random_range(MAGNET_DURATION_MIN_MS..=MAGNET_DURATION_MAX_MS);
            // A fresh magnet replaces the window, it does not extend it
            state.magnet_until = now + duration;
            state.next_magnet_pull = 0;
            try_magnet_pull(state, now);
        }
        ItemKind::Bomb => {
            state.push_cue(Cue::BombBlast);
            let blasted: Vec<Cell> = state
                .obstacles
                .iter()
                .copied()
                .filter(|&c| grid::chebyshev(c, head) <= BOMB_RADIUS)
                .collect();
            state
                .obstacles
                .retain(|&c| grid::chebyshev(c, head) > BOMB_RADIUS);
            for &c in &blasted {
                state.push_burst(c, OBSTACLE_BURST_COLOR, 18);
            }
            state
                .spikes
                .retain(|s| grid::chebyshev(s.pos, head) > BOMB_RADIUS);
            state
                .ghost_hunters
                .retain(|g| grid::chebyshev(g.pos, head) > BOMB_RADIUS);
            state
                .shadow_snakes
                .retain(|ss| ss.body.iter().all(|&seg| grid::chebyshev(seg, head) > BOMB_RADIUS));
            state
                .fog_zones
                .retain(|z| z.cells().iter().all(|&c| grid::chebyshev(c, head) > BOMB_RADIUS));
            if let Some(boss) = &mut state.boss {
                boss.bullets
                    .retain(|b| grid::chebyshev(b.cell(), head) > BOMB_RADIUS);
            }
            let removed = blasted.len() as u32;
            state.push_burst(head, BOMB_BURST_COLOR, 40 + removed * 4);
            log::debug!("bomb at {:?} cleared {} obstacles", head, removed);
        }
        ItemKind::Scissors => {
            state.push_cue(Cue::ScissorSnip);
            let removed = apply_shrink(state, SCISSORS_SHRINK, now);
            state.push_burst(head, SCISSORS_BURST_COLOR, 18 + removed * 4);
            if state.snake.len() <= 1 {
                state.game_over("snipped too short", now);
            }
        }
        ItemKind::RottenApple => {
            state.push_cue(Cue::Poisoned);
            state.reversed_until = now + REVERSED_CONTROLS_MS;
        }
    }
}

/// Lift every collectible within the magnet radius into a flight.
/// No-op once the magnet window has lapsed.
pub fn try_magnet_pull(state: &mut GameState, now: u64) {
    if now >= state.magnet_until {
        return;
    }
    let head = state.head();
    let in_flight: HashSet<Cell> = state.magnet_flights.iter().map(|f| f.from).collect();

    let mut i = 0;
    while i < state.normal_foods.len() {
        let f = state.normal_foods[i];
        if grid::chebyshev(f.pos, head) <= MAGNET_PULL_RADIUS && !in_flight.contains(&f.pos) {
            state.normal_foods.remove(i);
            let duration = state
                .rng
                .random_range(MAGNET_FOOD_FLIGHT_MIN_MS..=MAGNET_FOOD_FLIGHT_MAX_MS);
            state.magnet_flights.push(MagnetFlight {
                from: f.pos,
                kind: FlightKind::Normal,
                start: now,
                duration,
                counts_for_boss: f.counts_for_boss,
                color: f.color,
            });
        } else {
            i += 1;
        }
    }

    let mut i = 0;
    while i < state.energy_foods.len() {
        let f = state.energy_foods[i];
        if grid::chebyshev(f.pos, head) <= MAGNET_PULL_RADIUS && !in_flight.contains(&f.pos) {
            state.energy_foods.remove(i);
            let duration = state
                .rng
                .random_range(MAGNET_FOOD_FLIGHT_MIN_MS..=MAGNET_FOOD_FLIGHT_MAX_MS);
            state.magnet_flights.push(MagnetFlight {
                from: f.pos,
                kind: FlightKind::Energy,
                start: now,
                duration,
                counts_for_boss: f.counts_for_boss,
                color: f.color,
            });
        } else {
            i += 1;
        }
    }

    // Of the items only bombs are magnetic
    let mut i = 0;
    while i < state.items.len() {
        let it = state.items[i];
        if it.kind == ItemKind::Bomb
            && grid::chebyshev(it.pos, head) <= MAGNET_PULL_RADIUS
            && !in_flight.contains(&it.pos)
        {
            state.items.remove(i);
            let duration = state
                .rng
                .random_range(MAGNET_BOMB_FLIGHT_MIN_MS..=MAGNET_BOMB_FLIGHT_MAX_MS);
            state.magnet_flights.push(MagnetFlight {
                from: it.pos,
                kind: FlightKind::Bomb,
                start: now,
                duration,
                counts_for_boss: false,
                color: None,
            });
        } else {
            i += 1;
        }
    }
}

/// Land every flight whose travel time is up. Food feeds the head as if
/// eaten there; a bomb detonates on the head.
pub fn resolve_flight_arrivals(state: &mut GameState, now: u64) {
    if state.magnet_flights.is_empty() {
        return;
    }
    let arrived: Vec<MagnetFlight> = state
        .magnet_flights
        .iter()
        .copied()
        .filter(|f| now.saturating_sub(f.start) >= f.duration)
        .collect();
    state
        .magnet_flights
        .retain(|f| now.saturating_sub(f.start) < f.duration);

    for f in arrived {
        let head = state.head();
        match f.kind {
            FlightKind::Normal => {
                tick::on_normal_food_eaten(state, head, f.counts_for_boss, f.color, now);
                state.snake.grow_pending += 1;
            }
            FlightKind::Energy => {
                tick::on_energy_food_eaten(state, head, f.color, now);
            }
            FlightKind::Bomb => {
                apply_item(state, ItemKind::Bomb, head, now);
            }
        }
    }
}

/// Drop up to `count` tail segments, never below length one. Returns how
/// many came off. Also zeroes the timed shrink channel: an immediate
/// shrink supersedes whatever it still owed.
pub fn apply_shrink(state: &mut GameState, count: u32, now: u64) -> u32 {
    let mut removed = 0;
    while removed < count && state.snake.len() > 1 {
        if let Some(tail) = state.snake.body.pop_back() {
            state.push_cue(Cue::ShellCrack);
            state.push_burst(tail, SHRINK_BURST_COLOR, 10);
            removed += 1;
        } else {
            break;
        }
    }
    state.shrink_remaining = 0;
    state.last_shrink = now;
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::GameEvent;
    use crate::sim::state::{Boss, Bullet, Food, GhostHunter, Item, ShadowSnake, Spike};
    use glam::{IVec2, Vec2};
    use std::collections::VecDeque;

    fn bare_state() -> GameState {
        let mut state = GameState::new(3);
        state.normal_foods.clear();
        state.energy_foods.clear();
        state.items.clear();
        state.obstacles.clear();
        state.portal_pairs.clear();
        state.spikes.clear();
        state.fog_zones.clear();
        state.shadow_snakes.clear();
        state.ghost_hunters.clear();
        state.boss = None;
        state.events.clear();
        state
    }

    #[test]
    fn test_bomb_clears_the_blast_box() {
        let mut state = bare_state();
        let head = state.head();
        let near = head + IVec2::new(2, 2);
        let far = head + IVec2::new(3, 0);
        state.obstacles.push(near);
        state.obstacles.push(far);
        state.spikes.push(Spike { pos: near, visible: true, last_toggle: 0 });
        state.ghost_hunters.push(GhostHunter {
            pos: head + IVec2::new(-2, 1),
            visible: true,
            last_toggle: 0,
            visible_ms: 5000,
            invisible_ms: 5000,
        });
        let mut body = VecDeque::new();
        body.push_back(head + IVec2::new(4, 4));
        body.push_back(head + IVec2::new(2, 0));
        state.shadow_snakes.push(ShadowSnake { body, dir: IVec2::new(1, 0), target_len: 2, last_move: 0 });
        let mut boss = Boss::new(IVec2::new(2, 2), 0);
        boss.bullets.push(Bullet {
            pos: Vec2::new(head.x as f32 + 1.0, head.y as f32),
            dir: Vec2::new(1.0, 0.0),
            speed: BOSS_BULLET_SPEED,
        });
        state.boss = Some(boss);
        state.normal_foods.push(Food::plain(head + IVec2::new(1, 1)));

        apply_item(&mut state, ItemKind::Bomb, head, 1000);

        assert_eq!(state.obstacles, vec![far], "only the far obstacle survives");
        assert!(state.spikes.is_empty());
        assert!(state.ghost_hunters.is_empty());
        assert!(state.shadow_snakes.is_empty(), "one segment in the box removes the whole snake");
        assert!(state.boss.as_ref().unwrap().bullets.is_empty());
        assert!(state.boss.is_some(), "the boss itself shrugs it off");
        assert_eq!(state.normal_foods.len(), 1, "food is not bombable");
        // Per-obstacle burst plus the head blast
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Burst { cell, count: 18, .. } if *cell == near)));
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Burst { cell, count: 44, .. } if *cell == head)));
    }

    #[test]
    fn test_scissors_shrink_and_terminal_case() {
        let mut state = bare_state();
        assert_eq!(state.snake.len(), 3);
        let head = state.head();
        apply_item(&mut state, ItemKind::Scissors, head, 1000);
        assert_eq!(state.snake.len(), 1, "three requested, two available");
        assert_eq!(state.game_over_reason, Some("snipped too short"));
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_scissors_on_long_snake_is_not_terminal() {
        let mut state = bare_state();
        for i in 0..4 {
            let tail = *state.snake.body.back().unwrap();
            state.snake.body.push_back(tail - IVec2::new(i + 1, 0));
        }
        let before = state.snake.len();
        let head = state.head();
        apply_item(&mut state, ItemKind::Scissors, head, 1000);
        assert_eq!(state.snake.len(), before - SCISSORS_SHRINK as usize);
        assert!(state.game_over_reason.is_none());
    }

    #[test]
    fn test_rotten_apple_reverses_controls_for_a_window() {
        let mut state = bare_state();
        let head = state.head();
        apply_item(&mut state, ItemKind::RottenApple, head, 1000);
        assert!(state.reversed_active(1000));
        assert!(state.reversed_active(1000 + REVERSED_CONTROLS_MS - 1));
        assert!(!state.reversed_active(1000 + REVERSED_CONTROLS_MS));
    }

    #[test]
    fn test_magnet_lifts_nearby_food_immediately() {
        let mut state = bare_state();
        let head = state.head();
        state.normal_foods.push(Food::plain(head + IVec2::new(2, -1)));
        state.normal_foods.push(Food::plain(head + IVec2::new(3, 0)));
        state.energy_foods.push(Food::plain(head + IVec2::new(-2, 2)));
        state.items.push(Item { kind: ItemKind::Bomb, pos: head + IVec2::new(0, 2) });
        state.items.push(Item { kind: ItemKind::Scissors, pos: head + IVec2::new(1, 1) });

        apply_item(&mut state, ItemKind::Magnet, head, 1000);

        assert!(state.magnet_active(1000));
        assert_eq!(state.magnet_flights.len(), 3, "near food, energy, bomb lift off");
        assert_eq!(state.normal_foods.len(), 1, "out-of-radius food stays");
        assert_eq!(state.items.len(), 1, "scissors are not magnetic");
        assert!(state
            .magnet_flights
            .iter()
            .all(|f| f.duration >= MAGNET_FOOD_FLIGHT_MIN_MS && f.duration <= MAGNET_BOMB_FLIGHT_MAX_MS));
    }

    #[test]
    fn test_magnet_window_replaces_not_extends() {
        let mut state = bare_state();
        let head = state.head();
        apply_item(&mut state, ItemKind::Magnet, head, 1000);
        let first = state.magnet_until;
        apply_item(&mut state, ItemKind::Magnet, head, 2000);
        let second = state.magnet_until;
        assert!(second >= 2000 + MAGNET_DURATION_MIN_MS);
        assert!(second <= 2000 + MAGNET_DURATION_MAX_MS);
        assert!(first >= 1000 + MAGNET_DURATION_MIN_MS);
    }

    #[test]
    fn test_pull_skips_cells_already_in_flight() {
        let mut state = bare_state();
        let head = state.head();
        let cell = head + IVec2::new(1, 1);
        state.magnet_until = 10_000;
        state.magnet_flights.push(MagnetFlight {
            from: cell,
            kind: FlightKind::Normal,
            start: 500,
            duration: 200,
            counts_for_boss: true,
            color: None,
        });
        state.normal_foods.push(Food::plain(cell));
        try_magnet_pull(&mut state, 600);
        assert_eq!(state.magnet_flights.len(), 1, "same origin cell not lifted twice");
        assert_eq!(state.normal_foods.len(), 1);
    }

    #[test]
    fn test_pull_is_inert_after_window() {
        let mut state = bare_state();
        let head = state.head();
        state.normal_foods.push(Food::plain(head + IVec2::new(1, 0)));
        state.magnet_until = 1000;
        try_magnet_pull(&mut state, 1000);
        assert!(state.magnet_flights.is_empty());
        assert_eq!(state.normal_foods.len(), 1);
    }

    #[test]
    fn test_flight_arrival_feeds_the_head() {
        let mut state = bare_state();
        state.magnet_flights.push(MagnetFlight {
            from: IVec2::new(1, 1),
            kind: FlightKind::Normal,
            start: 1000,
            duration: 200,
            counts_for_boss: true,
            color: None,
        });
        resolve_flight_arrivals(&mut state, 1100);
        assert_eq!(state.magnet_flights.len(), 1, "not there yet");
        resolve_flight_arrivals(&mut state, 1200);
        assert!(state.magnet_flights.is_empty());
        assert_eq!(state.score, 1);
        assert_eq!(state.snake.grow_pending, 1);
        assert_eq!(state.normal_food_eaten, 1);
        let head = state.head();
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::Burst { cell, .. } if *cell == head)),
            "burst lands on the head, not the lift origin"
        );
    }

    #[test]
    fn test_energy_flight_arrival_grants_charge() {
        let mut state = bare_state();
        let before = state.snake.energy;
        state.magnet_flights.push(MagnetFlight {
            from: IVec2::new(1, 1),
            kind: FlightKind::Energy,
            start: 0,
            duration: 150,
            counts_for_boss: false,
            color: None,
        });
        resolve_flight_arrivals(&mut state, 150);
        assert_eq!(state.snake.energy, before + 1);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Cue(Cue::EnergyCollect))));
    }

    #[test]
    fn test_bomb_flight_detonates_at_head() {
        let mut state = bare_state();
        let head = state.head();
        state.obstacles.push(head + IVec2::new(1, 0));
        state.magnet_flights.push(MagnetFlight {
            from: head + IVec2::new(2, 2),
            kind: FlightKind::Bomb,
            start: 0,
            duration: 160,
            counts_for_boss: false,
            color: None,
        });
        resolve_flight_arrivals(&mut state, 200);
        assert!(state.obstacles.is_empty());
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Cue(Cue::BombBlast))));
    }

    #[test]
    fn test_apply_shrink_stops_at_one_segment() {
        let mut state = bare_state();
        let removed = apply_shrink(&mut state, 10, 1000);
        assert_eq!(removed, 2);
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.last_shrink, 1000);
    }

    #[test]
    fn test_apply_shrink_cancels_timed_channel() {
        let mut state = bare_state();
        state.shrink_remaining = 7;
        apply_shrink(&mut state, 1, 1000);
        assert_eq!(state.shrink_remaining, 0);
    }
}
