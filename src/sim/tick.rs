//! Per-frame simulation step
//!
//! The host calls [`tick`] once per rendered frame with a raw millisecond
//! reading. Everything time-based keys off the pause-aware game clock, so
//! frame rate only affects granularity, never speed. Order inside a frame
//! is part of the contract: adversaries move first, then hazards are
//! checked against the head, then the gated player step resolves.

use rand::Rng;

use crate::consts::*;
use crate::sim::clock::scaled_interval_ms;
use crate::sim::events::{Cue, GameEvent, Rgb};
use crate::sim::grid::{self, Cell, Direction};
use crate::sim::hazards;
use crate::sim::items;
use crate::sim::spawn;
use crate::sim::state::{GamePhase, GameState};

/// Input commands for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Requested heading, buffered until the next movement step
    pub direction: Option<Direction>,
    /// Spend a charge to enter ghost mode, or drop it early
    pub toggle_ghost: bool,
    /// Pause toggle
    pub toggle_pause: bool,
}

/// Advance the world to `raw_ms`.
pub fn tick(state: &mut GameState, input: &FrameInput, raw_ms: u64) {
    state.clock.sample(raw_ms);

    // Pause flips before anything reads the clock
    if input.toggle_pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.clock.pause();
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.clock.resume();
            }
            GamePhase::GameOver => {}
        }
    }
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::Playing => {}
    }

    let now = state.clock.now();

    if let Some(dir) = input.direction {
        steer(state, dir, now);
    }
    if input.toggle_ghost {
        toggle_ghost(state, now);
    }

    let ts = state.time_scale(now);

    // === Timed spawners and cadences ===

    if now >= state.next_portal_refresh {
        spawn::refresh_one_portal_pair(state);
        state.next_portal_refresh =
            now + state.rng.random_range(PORTAL_REFRESH_MIN_MS..=PORTAL_REFRESH_MAX_MS);
    }

    for i in 0..state.spikes.len() {
        if now.saturating_sub(state.spikes[i].last_toggle) >= SPIKE_TOGGLE_MS {
            let s = &mut state.spikes[i];
            s.visible = !s.visible;
            s.last_toggle = now;
        }
    }
    if now >= state.next_spike_refresh {
        spawn::refresh_one_spike(state, now);
        state.next_spike_refresh =
            now + state.rng.random_range(SPIKE_REFRESH_MIN_MS..=SPIKE_REFRESH_MAX_MS);
    }

    if now >= state.next_shadow_spawn {
        spawn::spawn_shadow_snake(state, now);
        state.next_shadow_spawn =
            now + state.rng.random_range(SHADOW_SPAWN_MIN_MS..=SHADOW_SPAWN_MAX_MS);
    }
    hazards::update_shadow_snakes(state, now, ts);

    if now >= state.next_hunter_spawn {
        spawn::spawn_ghost_hunter(state, now);
        state.next_hunter_spawn =
            now + state.rng.random_range(HUNTER_INVISIBLE_MIN_MS..=HUNTER_INVISIBLE_MAX_MS);
    }
    hazards::update_ghost_hunters(state, now, ts);

    hazards::update_boss(state, now, ts);

    // === Hazards reaching the head between steps ===

    let head = state.head();
    if !state.snake.ghost {
        let bullet_hit = state
            .boss
            .as_ref()
            .is_some_and(|b| b.bullets.iter().any(|bl| bl.cell() == head));
        if bullet_hit {
            apply_damage(state, "hit by a boss bullet", head, now);
            return;
        }
        if state.ghost_hunters.iter().any(|g| g.visible && g.pos == head) {
            apply_damage(state, "caught by a ghost hunter", head, now);
            return;
        }
    }

    // === World upkeep ===

    if now >= state.next_item_spawn {
        spawn::spawn_item(state);
        state.next_item_spawn =
            now + state.rng.random_range(ITEM_SPAWN_MIN_MS..=ITEM_SPAWN_MAX_MS);
    }

    if now >= state.next_fog_refresh {
        spawn::spawn_fog_zone(state, now, true);
        state.next_fog_refresh =
            now + state.rng.random_range(FOG_ZONE_REFRESH_MIN_MS..=FOG_ZONE_REFRESH_MAX_MS);
    }

    if state.magnet_active(now) && now >= state.next_magnet_pull {
        items::try_magnet_pull(state, now);
        state.next_magnet_pull = now + MAGNET_PULL_CHECK_MS;
    }

    // Timed shrink drains one segment per interval but never below 4
    if state.shrink_remaining > 0
        && now.saturating_sub(state.last_shrink) >= SHRINK_INTERVAL_MS
    {
        if state.snake.len() > 3 {
            if let Some(tail) = state.snake.body.pop_back() {
                state.push_burst(tail, SHRINK_BURST_COLOR, 10);
                state.shrink_remaining -= 1;
            }
        } else {
            state.shrink_remaining = 0;
        }
        state.last_shrink = now;
    }

    items::resolve_flight_arrivals(state, now);

    if state.snake.ghost && now >= state.snake.ghost_until {
        state.snake.ghost = false;
    }

    // === Gated movement step ===

    let step_interval = scaled_interval_ms(STEP_INTERVAL_MS, ts);
    if (now.saturating_sub(state.last_move_time) as f32) < step_interval {
        return;
    }
    state.last_move_time = now;

    state.snake.dir = state.snake.next_dir;
    let mut new_head = state.head() + state.snake.dir.delta();

    if !grid::in_bounds(new_head) {
        if state.snake.ghost {
            new_head = grid::wrap(new_head);
        } else {
            state.push_cue(Cue::WallCrack);
            state.game_over("hit the wall", now);
            return;
        }
    }

    if now >= state.portal_cooldown_until {
        if let Some(dest) = state.portal_partner(new_head) {
            new_head = dest;
            state.portal_cooldown_until = now + PORTAL_COOLDOWN_MS;
            state.push_cue(Cue::PortalWarp);
            state.push_burst(dest, PORTAL_BURST_COLOR, 18);
        }
    }

    if !state.snake.ghost && state.obstacles.contains(&new_head) {
        apply_damage(state, "hit an obstacle", new_head, now);
        return;
    }

    if !state.snake.ghost
        && state.spikes.iter().any(|s| s.visible && s.pos == new_head)
    {
        apply_damage(state, "hit a spike", new_head, now);
        return;
    }

    let boss_contact = state.boss.as_ref().and_then(|b| {
        if b.covers(new_head) {
            Some((b.center, b.shield_active(now)))
        } else {
            None
        }
    });
    if let Some((center, shielded)) = boss_contact {
        if state.snake.ghost && !shielded {
            state.boss = None;
            state.boss_progress = 0;
            state.push_cue(Cue::BossDefeated);
            state.boss_kill_slow_until = now + BOSS_KILL_SLOW_MS;
            for c in grid::square_footprint(center, 1) {
                state.push_burst(c, BOSS_KILL_BURST_COLOR, 20);
            }
            let old = state.score;
            state.score += BOSS_KILL_SCORE;
            state.events.push(GameEvent::ScoreChange { old, new: state.score });
            spawn::boss_kill_drops(state, center);
            log::info!("boss destroyed at {:?}", center);
            // The step carries on into the wreckage
        } else {
            state.push_cue(Cue::DamageShockwave);
            state.game_over("hit the boss", now);
            return;
        }
    }

    if !state.snake.ghost && state.snake.contains(new_head) {
        apply_damage(state, "ran into yourself", new_head, now);
        return;
    }

    if !state.snake.ghost
        && state
            .shadow_snakes
            .iter()
            .any(|ss| ss.body.contains(&new_head))
    {
        apply_damage(state, "ran into a shadow snake", new_head, now);
        return;
    }

    state.snake.body.push_front(new_head);

    // === Post-move triggers ===

    if let Some(idx) = state.fog_zones.iter().position(|z| z.covers(new_head)) {
        state.fog_zones.remove(idx);
        state.fog_radius =
            state.rng.random_range(FOG_VISIBILITY_MIN..=FOG_VISIBILITY_MAX);
        let until =
            now + state.rng.random_range(FOG_DURATION_MIN_MS..=FOG_DURATION_MAX_MS);
        state.fog_until = until;
        state.next_fog_refresh =
            now + state.rng.random_range(FOG_ZONE_REFRESH_MIN_MS..=FOG_ZONE_REFRESH_MAX_MS);
        state.push_cue(Cue::FogBloom);
        state.events.push(GameEvent::FogStarted { radius: state.fog_radius, until });
    }

    let mut ate_normal = false;
    if let Some(idx) = state.normal_foods.iter().position(|f| f.pos == new_head) {
        let food = state.normal_foods.remove(idx);
        on_normal_food_eaten(state, new_head, food.counts_for_boss, food.color, now);
        ate_normal = true;
    }

    if let Some(idx) = state.energy_foods.iter().position(|f| f.pos == new_head) {
        let food = state.energy_foods.remove(idx);
        on_energy_food_eaten(state, new_head, food.color, now);
    }

    if let Some(idx) = state.items.iter().position(|it| it.pos == new_head) {
        let item = state.items.remove(idx);
        items::apply_item(state, item.kind, new_head, now);
        // Scissors on a short snake can end the run mid-step
        if state.phase == GamePhase::GameOver {
            return;
        }
    }

    if !ate_normal {
        if state.snake.grow_pending > 0 {
            state.snake.grow_pending -= 1;
        } else {
            state.snake.body.pop_back();
        }
    }

    if state.normal_foods.len() < NORMAL_FOOD_TARGET {
        spawn::spawn_food(state);
    }
}

/// Buffer a heading change. Reversed controls flip the request before the
/// no-reversal rule is applied against the committed heading.
fn steer(state: &mut GameState, dir: Direction, now: u64) {
    let desired = if state.reversed_active(now) { dir.opposite() } else { dir };
    if desired == state.snake.dir.opposite() {
        return;
    }
    state.snake.next_dir = desired;
}

/// Ghost on costs one charge; ghost off forfeits the remaining window.
fn toggle_ghost(state: &mut GameState, now: u64) {
    if state.snake.ghost {
        state.snake.ghost = false;
        state.snake.ghost_until = 0;
    } else if state.snake.energy > 0 {
        state.snake.energy -= 1;
        state.snake.ghost = true;
        state.snake.ghost_until = now + GHOST_DURATION_MS;
    }
}

/// Non-lethal hazard contact: shockwave, region refresh, score penalty,
/// shrink. Turns terminal only when the shrink bottoms out.
fn apply_damage(state: &mut GameState, reason: &'static str, center: Cell, now: u64) {
    state.push_cue(Cue::DamageShockwave);
    state.damage_slow_until = state.damage_slow_until.max(now + DAMAGE_SLOW_MS);
    state.events.push(GameEvent::Shockwave { center });
    spawn::shockwave_clear_and_refresh(state, center, now);
    let old = state.score;
    state.score = state.score.saturating_sub(DAMAGE_SCORE_PENALTY);
    if state.score != old {
        state.events.push(GameEvent::ScoreChange { old, new: state.score });
    }
    items::apply_shrink(state, DAMAGE_SHRINK_SEGMENTS, now);
    if state.snake.len() <= 1 {
        state.game_over(reason, now);
    }
}

/// Combo bookkeeping, scoring, boss progress, and the follow-up spawns
/// that hang off a normal food.
pub(crate) fn on_normal_food_eaten(
    state: &mut GameState,
    pos: Cell,
    counts_for_boss: bool,
    color: Option<Rgb>,
    now: u64,
) {
    let in_window = state
        .last_food_time
        .is_some_and(|t| now.saturating_sub(t) <= COMBO_WINDOW_MS);
    if in_window {
        state.combo_streak = (state.combo_streak + 1).min(COMBO_STREAK_CAP);
    } else {
        state.combo_streak = 0;
    }
    state.last_food_time = Some(now);

    let multiplier = state.combo_multiplier();
    if multiplier > 1 {
        state.combo_display_until = now + COMBO_DISPLAY_MS;
    }
    let old = state.score;
    state.score += multiplier;
    state.events.push(GameEvent::ScoreChange { old, new: state.score });

    state.normal_food_eaten += 1;
    if counts_for_boss && state.boss.is_none() {
        state.boss_progress += 1;
    }

    state.push_burst(pos, color.unwrap_or(FOOD_COLOR), 25);
    state.push_cue(match state.combo_streak {
        0 => Cue::FoodCollect,
        1 => Cue::FoodCombo,
        _ => Cue::FoodFrenzy,
    });

    if state.normal_food_eaten % FOOD_PER_OBSTACLE == 0 {
        spawn::spawn_obstacle(state);
    }
    if state.boss.is_none() && state.boss_progress >= BOSS_FOOD_THRESHOLD {
        state.boss_progress = 0;
        spawn::spawn_boss(state, now);
    }
}

pub(crate) fn on_energy_food_eaten(
    state: &mut GameState,
    pos: Cell,
    color: Option<Rgb>,
    now: u64,
) {
    state.snake.energy += 1;
    state.push_cue(Cue::EnergyCollect);
    state.push_burst(pos, color.unwrap_or(ENERGY_FOOD_COLOR), 30);
}
