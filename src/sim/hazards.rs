//! Adversary updates: shadow snakes, ghost hunters, boss
//!
//! Each adversary runs on its own cadence, stretched by the active time
//! scale. They all update before the player's gated movement step, which
//! is what makes the player-into-hazard and hazard-into-player checks
//! asymmetric across a single real frame.

use glam::{IVec2, Vec2};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::consts::*;
use crate::sim::clock::scaled_interval_ms;
use crate::sim::events::{Cue, GameEvent};
use crate::sim::grid::{self, Cell};
use crate::sim::spawn;
use crate::sim::state::{Bullet, Food, GameState, ShadowSnake};

/// Step every shadow snake that is due: chase the nearest food, steal
/// whatever the new head lands on, and die on contact with the player.
pub fn update_shadow_snakes(state: &mut GameState, now: u64, time_scale: f32) {
    if state.shadow_snakes.is_empty() {
        return;
    }
    // One snapshot for the whole cadre, like the player sees it
    let targets: Vec<Cell> = state
        .normal_foods
        .iter()
        .map(|f| f.pos)
        .chain(state.energy_foods.iter().map(|f| f.pos))
        .collect();
    let interval = scaled_interval_ms(SHADOW_MOVE_INTERVAL_MS, time_scale);

    let mut died: Vec<usize> = Vec::new();
    for i in 0..state.shadow_snakes.len() {
        if (now.saturating_sub(state.shadow_snakes[i].last_move) as f32) < interval {
            continue;
        }
        state.shadow_snakes[i].last_move = now;

        let head = state.shadow_snakes[i].body[0];
        let mut target: Option<Cell> = None;
        let mut best = i32::MAX;
        for &t in &targets {
            let d = grid::manhattan(t, head);
            if d < best {
                best = d;
                target = Some(t);
            }
        }

        // Steering: one axis per step, x before y, never straight back
        if let Some(t) = target {
            let mut step = IVec2::ZERO;
            if t.x > head.x {
                step.x = 1;
            } else if t.x < head.x {
                step.x = -1;
            } else if t.y > head.y {
                step.y = 1;
            } else if t.y < head.y {
                step.y = -1;
            }
            if step == IVec2::ZERO {
                let dirs = [
                    IVec2::new(1, 0),
                    IVec2::new(-1, 0),
                    IVec2::new(0, 1),
                    IVec2::new(0, -1),
                ];
                step = *dirs.choose(&mut state.rng).unwrap_or(&IVec2::new(1, 0));
            }
            let current = state.shadow_snakes[i].dir;
            if step == -current {
                step = current;
            }
            state.shadow_snakes[i].dir = step;
        }

        let dir = state.shadow_snakes[i].dir;
        let new_head = grid::wrap(head + dir);
        let ate_target = target == Some(new_head);

        {
            let ss = &mut state.shadow_snakes[i];
            ss.body.push_front(new_head);
            if ate_target {
                ss.target_len += 1;
            }
            while ss.body.len() > ss.target_len {
                ss.body.pop_back();
            }
        }

        // Any food under the new head is stolen, target or not
        if let Some(idx) = state.normal_foods.iter().position(|f| f.pos == new_head) {
            state.normal_foods.remove(idx);
            state.events.push(GameEvent::FoodStolen { cell: new_head });
            spawn::spawn_food(state);
        }
        if let Some(idx) = state.energy_foods.iter().position(|f| f.pos == new_head) {
            state.energy_foods.remove(idx);
            state.events.push(GameEvent::EnergyStolen { cell: new_head });
            spawn::spawn_food(state);
        }

        // Its head into your body: it dies, not you
        if state.snake.contains(new_head) {
            died.push(i);
        }
    }

    for &i in died.iter().rev() {
        let ss = state.shadow_snakes.remove(i);
        shadow_snake_die(state, &ss);
    }
}

/// Death burst: replacement food scattered near the head, one burst per
/// body segment
pub fn shadow_snake_die(state: &mut GameState, ss: &ShadowSnake) {
    state.push_cue(Cue::EnemyDestroyed);
    let body: Vec<Cell> = ss.body.iter().copied().collect();
    let count = body.len().max(3);
    let center = body[0];

    for _ in 0..count {
        for _ in 0..15 {
            let cell = IVec2::new(
                (center.x + state.rng.random_range(-2..=2)).clamp(0, GRID_WIDTH - 1),
                (center.y + state.rng.random_range(-2..=2)).clamp(0, GRID_HEIGHT - 1),
            );
            let taken = state.normal_foods.iter().any(|f| f.pos == cell)
                || state.energy_foods.iter().any(|f| f.pos == cell)
                || state.obstacles.contains(&cell)
                || state.snake.contains(cell);
            if taken {
                continue;
            }
            state.normal_foods.push(Food::drop(cell, SHADOW_DROP_COLOR));
            break;
        }
    }

    for seg in &body {
        state.push_burst(*seg, SHADOW_DROP_COLOR, 10);
    }
    log::debug!("shadow snake destroyed at {:?}, {} segments", center, body.len());
}

/// Advance hunter visibility windows, then step the whole pack toward the
/// player head on the shared movement cadence.
pub fn update_ghost_hunters(state: &mut GameState, now: u64, time_scale: f32) {
    for i in 0..state.ghost_hunters.len() {
        let (visible, last_toggle, visible_ms, invisible_ms) = {
            let gh = &state.ghost_hunters[i];
            (gh.visible, gh.last_toggle, gh.visible_ms, gh.invisible_ms)
        };
        let elapsed = now.saturating_sub(last_toggle);
        if visible && elapsed >= visible_ms {
            let next = state.rng.random_range(HUNTER_INVISIBLE_MIN_MS..=HUNTER_INVISIBLE_MAX_MS);
            let gh = &mut state.ghost_hunters[i];
            gh.visible = false;
            gh.last_toggle = now;
            gh.invisible_ms = next;
        } else if !visible && elapsed >= invisible_ms {
            let next = state.rng.random_range(HUNTER_VISIBLE_MIN_MS..=HUNTER_VISIBLE_MAX_MS);
            let gh = &mut state.ghost_hunters[i];
            gh.visible = true;
            gh.last_toggle = now;
            gh.visible_ms = next;
            state.push_cue(Cue::HunterAppear);
        }
    }

    let interval = scaled_interval_ms(HUNTER_MOVE_INTERVAL_MS, time_scale);
    if (now.saturating_sub(state.last_hunter_move) as f32) >= interval {
        state.last_hunter_move = now;
        let target = state.head();
        for i in 0..state.ghost_hunters.len() {
            let pos = state.ghost_hunters[i].pos;
            let mut dx = (target.x - pos.x).signum();
            let mut dy = (target.y - pos.y).signum();
            // One axis at a time, random pick when both want to move
            if dx != 0 && dy != 0 {
                if state.rng.random_bool(0.5) {
                    dy = 0;
                } else {
                    dx = 0;
                }
            }
            state.ghost_hunters[i].pos = grid::wrap(pos + IVec2::new(dx, dy));
        }
    }
}

/// Bullet volley every second, then integration in float coordinates.
/// Bullets leaving the grid are dropped.
pub fn update_boss(state: &mut GameState, now: u64, time_scale: f32) {
    let Some(boss) = &mut state.boss else {
        return;
    };
    let dt_ms = now.saturating_sub(boss.last_update);
    boss.last_update = now;

    if now.saturating_sub(boss.last_bullet) >= BOSS_BULLET_INTERVAL_MS {
        boss.last_bullet = now;
        let origin = Vec2::new(boss.center.x as f32, boss.center.y as f32);
        let volley = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (-1, -1),
            (1, -1),
            (-1, 1),
        ];
        for (dx, dy) in volley {
            boss.bullets.push(Bullet {
                pos: origin,
                dir: Vec2::new(dx as f32, dy as f32),
                speed: BOSS_BULLET_SPEED,
            });
        }
    }

    let step = (dt_ms as f32 / 1000.0) * time_scale.max(MIN_TIME_SCALE);
    for b in &mut boss.bullets {
        b.pos += b.dir * b.speed * step;
    }
    boss.bullets.retain(|b| {
        b.pos.x >= 0.0
            && b.pos.x < GRID_WIDTH as f32
            && b.pos.y >= 0.0
            && b.pos.y < GRID_HEIGHT as f32
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Boss;
    use std::collections::VecDeque;

    fn bare_state() -> GameState {
        let mut state = GameState::new(1);
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

    fn shadow_at(pos: Cell, dir: Cell) -> ShadowSnake {
        let mut body = VecDeque::new();
        body.push_back(pos);
        ShadowSnake { body, dir, target_len: 4, last_move: 0 }
    }

    #[test]
    fn test_shadow_moves_x_axis_first() {
        let mut state = bare_state();
        state.normal_foods.push(Food::plain(IVec2::new(8, 8)));
        state.shadow_snakes.push(shadow_at(IVec2::new(5, 5), IVec2::new(0, 1)));
        update_shadow_snakes(&mut state, 1000, 1.0);
        assert_eq!(state.shadow_snakes[0].body[0], IVec2::new(6, 5));
    }

    #[test]
    fn test_shadow_moves_y_when_x_aligned() {
        let mut state = bare_state();
        state.normal_foods.push(Food::plain(IVec2::new(5, 9)));
        state.shadow_snakes.push(shadow_at(IVec2::new(5, 5), IVec2::new(1, 0)));
        update_shadow_snakes(&mut state, 1000, 1.0);
        assert_eq!(state.shadow_snakes[0].body[0], IVec2::new(5, 6));
    }

    #[test]
    fn test_shadow_never_reverses() {
        let mut state = bare_state();
        // Food straight behind: the desired step is the exact reverse, so
        // it keeps its current heading instead
        state.normal_foods.push(Food::plain(IVec2::new(3, 5)));
        state.shadow_snakes.push(shadow_at(IVec2::new(5, 5), IVec2::new(1, 0)));
        update_shadow_snakes(&mut state, 1000, 1.0);
        assert_eq!(state.shadow_snakes[0].body[0], IVec2::new(6, 5));
    }

    #[test]
    fn test_shadow_gate_respects_time_scale() {
        let mut state = bare_state();
        state.normal_foods.push(Food::plain(IVec2::new(8, 5)));
        state.shadow_snakes.push(shadow_at(IVec2::new(5, 5), IVec2::new(1, 0)));
        state.shadow_snakes[0].last_move = 1000;
        // 120ms at scale 0.5 stretches to 240ms: 1200 is too early
        update_shadow_snakes(&mut state, 1200, 0.5);
        assert_eq!(state.shadow_snakes[0].body[0], IVec2::new(5, 5));
        update_shadow_snakes(&mut state, 1240, 0.5);
        assert_eq!(state.shadow_snakes[0].body[0], IVec2::new(6, 5));
    }

    #[test]
    fn test_shadow_steals_food_and_world_restocks() {
        let mut state = bare_state();
        state.normal_foods.push(Food::plain(IVec2::new(6, 5)));
        state.shadow_snakes.push(shadow_at(IVec2::new(5, 5), IVec2::new(1, 0)));
        update_shadow_snakes(&mut state, 1000, 1.0);
        let ss = &state.shadow_snakes[0];
        assert_eq!(ss.body[0], IVec2::new(6, 5));
        assert_eq!(ss.target_len, 5, "eating its chosen target grows it");
        assert!(
            state.normal_foods.iter().all(|f| f.pos != IVec2::new(6, 5)),
            "stolen food left the world"
        );
        assert_eq!(state.normal_foods.len(), NORMAL_FOOD_TARGET, "restocked");
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::FoodStolen { cell } if *cell == IVec2::new(6, 5))));
    }

    #[test]
    fn test_shadow_dies_on_player_body() {
        let mut state = bare_state();
        let body_cell = state.snake.body[1];
        // Bait it straight into the player's body
        state.normal_foods.push(Food::plain(body_cell));
        state
            .shadow_snakes
            .push(shadow_at(body_cell - IVec2::new(1, 0), IVec2::new(1, 0)));
        update_shadow_snakes(&mut state, 1000, 1.0);
        assert!(state.shadow_snakes.is_empty(), "shadow destroyed");
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Cue(Cue::EnemyDestroyed))));
        assert!(!state.normal_foods.is_empty(), "replacement food dropped");
    }

    #[test]
    fn test_hunter_visibility_toggles_and_cues() {
        let mut state = bare_state();
        state.ghost_hunters.push(crate::sim::state::GhostHunter {
            pos: IVec2::new(2, 2),
            visible: true,
            last_toggle: 0,
            visible_ms: 4000,
            invisible_ms: 4000,
        });
        update_ghost_hunters(&mut state, 4000, 1.0);
        assert!(!state.ghost_hunters[0].visible);
        assert!(state.events.iter().all(|e| !matches!(e, GameEvent::Cue(Cue::HunterAppear))));

        let invisible_ms = state.ghost_hunters[0].invisible_ms;
        update_ghost_hunters(&mut state, 4000 + invisible_ms, 1.0);
        assert!(state.ghost_hunters[0].visible);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Cue(Cue::HunterAppear))));
    }

    #[test]
    fn test_hunters_step_one_axis_toward_head() {
        let mut state = bare_state();
        let head = state.head();
        let start = grid::wrap(head + IVec2::new(5, 5));
        state.ghost_hunters.push(crate::sim::state::GhostHunter {
            pos: start,
            visible: true,
            last_toggle: 0,
            visible_ms: 60_000,
            invisible_ms: 60_000,
        });
        state.last_hunter_move = 0;
        update_ghost_hunters(&mut state, 260, 1.0);
        let moved = state.ghost_hunters[0].pos;
        let d = moved - start;
        assert_eq!(d.x.abs() + d.y.abs(), 1, "exactly one axis per step");
    }

    #[test]
    fn test_hunter_move_cadence_is_global() {
        let mut state = bare_state();
        state.ghost_hunters.push(crate::sim::state::GhostHunter {
            pos: IVec2::new(0, 0),
            visible: true,
            last_toggle: 0,
            visible_ms: 60_000,
            invisible_ms: 60_000,
        });
        state.last_hunter_move = 0;
        update_ghost_hunters(&mut state, 100, 1.0);
        assert_eq!(state.ghost_hunters[0].pos, IVec2::new(0, 0), "too early to move");
        update_ghost_hunters(&mut state, 260, 1.0);
        assert_ne!(state.ghost_hunters[0].pos, IVec2::new(0, 0));
    }

    #[test]
    fn test_boss_fires_eight_bullets() {
        let mut state = bare_state();
        state.boss = Some(Boss::new(IVec2::new(12, 12), 0));
        update_boss(&mut state, BOSS_BULLET_INTERVAL_MS, 1.0);
        let boss = state.boss.as_ref().unwrap();
        assert_eq!(boss.bullets.len(), 8);
        // Four cardinals and four diagonals
        let diagonals = boss
            .bullets
            .iter()
            .filter(|b| b.dir.x != 0.0 && b.dir.y != 0.0)
            .count();
        assert_eq!(diagonals, 4);
    }

    #[test]
    fn test_boss_bullets_integrate_with_time_scale() {
        let mut state = bare_state();
        let mut boss = Boss::new(IVec2::new(12, 12), 0);
        boss.bullets.push(Bullet {
            pos: Vec2::new(12.0, 12.0),
            dir: Vec2::new(1.0, 0.0),
            speed: BOSS_BULLET_SPEED,
        });
        boss.last_bullet = 0;
        boss.last_update = 0;
        state.boss = Some(boss);
        // 200ms at half speed: 5 cells/s * 0.2s * 0.5 = 0.5 cells
        update_boss(&mut state, 200, 0.5);
        let b = state.boss.as_ref().unwrap().bullets.last().unwrap();
        assert!((b.pos.x - 12.5).abs() < 1e-4);
        assert_eq!(b.pos.y, 12.0);
    }

    #[test]
    fn test_boss_bullets_cull_off_grid() {
        let mut state = bare_state();
        let mut boss = Boss::new(IVec2::new(12, 12), 0);
        boss.bullets.push(Bullet {
            pos: Vec2::new(24.8, 12.0),
            dir: Vec2::new(1.0, 0.0),
            speed: BOSS_BULLET_SPEED,
        });
        state.boss = Some(boss);
        update_boss(&mut state, 100, 1.0);
        assert!(state.boss.as_ref().unwrap().bullets.is_empty());
    }
}
