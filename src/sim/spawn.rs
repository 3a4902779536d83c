//! Spawners and occupancy-aware placement
//!
//! Placement always samples uniformly from the cells no tracked entity
//! covers right now; occupancy is derived fresh on every call instead of
//! cached, since almost every subsystem mutates the grid. A spawner that
//! finds no candidate cell simply skips its turn and retries on the next
//! timer cycle.

use std::collections::HashSet;

use glam::IVec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::consts::*;
use crate::sim::events::Cue;
use crate::sim::grid::{self, Cell};
use crate::sim::state::{Boss, Food, FogZone, GameState, GhostHunter, Item, ItemKind, ShadowSnake, Spike};
use crate::sim::state::PortalPair;

/// Union of every cell any entity covers
fn occupied_cells(state: &GameState) -> HashSet<Cell> {
    let mut occupied: HashSet<Cell> = HashSet::new();
    occupied.extend(state.snake.body.iter().copied());
    occupied.extend(state.obstacles.iter().copied());
    for z in &state.fog_zones {
        occupied.extend(z.cells());
    }
    occupied.extend(state.normal_foods.iter().map(|f| f.pos));
    occupied.extend(state.energy_foods.iter().map(|f| f.pos));
    occupied.extend(state.items.iter().map(|it| it.pos));
    for p in &state.portal_pairs {
        occupied.insert(p.a);
        occupied.insert(p.b);
    }
    occupied.extend(state.spikes.iter().map(|s| s.pos));
    for ss in &state.shadow_snakes {
        occupied.extend(ss.body.iter().copied());
    }
    occupied.extend(state.ghost_hunters.iter().map(|g| g.pos));
    if let Some(boss) = &state.boss {
        occupied.extend(boss.cells());
    }
    occupied
}

/// Uniform random unoccupied cell, or `None` when the grid is full
pub fn random_empty_cell(state: &mut GameState) -> Option<Cell> {
    let occupied = occupied_cells(state);
    let free: Vec<Cell> = (0..GRID_WIDTH)
        .flat_map(|x| (0..GRID_HEIGHT).map(move |y| IVec2::new(x, y)))
        .filter(|c| !occupied.contains(c))
        .collect();
    free.choose(&mut state.rng).copied()
}

/// Like [`random_empty_cell`], additionally excluding the Chebyshev box of
/// `avoid_radius` around the player head
pub fn random_empty_cell_avoid_head(state: &mut GameState, avoid_radius: i32) -> Option<Cell> {
    if avoid_radius <= 0 {
        return random_empty_cell(state);
    }
    let head = state.head();
    let occupied = occupied_cells(state);
    let free: Vec<Cell> = (0..GRID_WIDTH)
        .flat_map(|x| (0..GRID_HEIGHT).map(move |y| IVec2::new(x, y)))
        .filter(|c| !occupied.contains(c) && grid::chebyshev(*c, head) > avoid_radius)
        .collect();
    free.choose(&mut state.rng).copied()
}

/// Top the normal pool back to target, plus the probabilistic energy food
pub fn spawn_food(state: &mut GameState) {
    while state.normal_foods.len() < NORMAL_FOOD_TARGET {
        let Some(cell) = random_empty_cell(state) else {
            break;
        };
        state.normal_foods.push(Food::plain(cell));
    }

    if state.energy_foods.is_empty() && state.rng.random_bool(ENERGY_FOOD_PROBABILITY) {
        if let Some(cell) = random_empty_cell(state) {
            state.energy_foods.push(Food::plain(cell));
        }
    }
}

/// Place one item, respecting the on-map cap and the scissors cap.
/// The first bomb and the first rotten apple are guaranteed so the player
/// meets both mechanics early; after that the kind is a weighted roll.
pub fn spawn_item(state: &mut GameState) {
    if state.items.len() >= ITEM_MAX_ON_MAP {
        return;
    }
    let Some(cell) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
        return;
    };

    let kind = if !state.bomb_seen {
        state.bomb_seen = true;
        ItemKind::Bomb
    } else if !state.rotten_seen {
        state.rotten_seen = true;
        ItemKind::RottenApple
    } else {
        let scissors_full = state
            .items
            .iter()
            .filter(|it| it.kind == ItemKind::Scissors)
            .count()
            >= SCISSORS_MAX_ON_MAP;
        // Weights: magnet 3, bomb 10, scissors 4 (under cap), rotten 4
        let total = if scissors_full { 17 } else { 21 };
        let roll = state.rng.random_range(0..total);
        if roll < 3 {
            ItemKind::Magnet
        } else if roll < 13 {
            ItemKind::Bomb
        } else if !scissors_full && roll < 17 {
            ItemKind::Scissors
        } else {
            ItemKind::RottenApple
        }
    };

    log::debug!("item spawn: {:?} at {:?}", kind, cell);
    state.items.push(Item { kind, pos: cell });
}

/// One permanent obstacle, kept out of the head's immediate box
pub fn spawn_obstacle(state: &mut GameState) {
    if let Some(cell) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) {
        state.obstacles.push(cell);
    }
}

/// Fresh set of 3 to 5 portal pairs
pub fn spawn_portals(state: &mut GameState) {
    state.portal_pairs.clear();
    let pair_count = state.rng.random_range(PORTAL_PAIRS_MIN..=PORTAL_PAIRS_MAX);
    for id in 0..pair_count {
        let Some(a) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
            continue;
        };
        let Some(b) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
            continue;
        };
        state.portal_pairs.push(PortalPair { id: id as u32, a, b });
    }
}

/// Relocate one randomly chosen pair; keeps the old spots when no room
pub fn refresh_one_portal_pair(state: &mut GameState) {
    if state.portal_pairs.is_empty() {
        return;
    }
    let idx = state.rng.random_range(0..state.portal_pairs.len());
    let Some(a) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
        return;
    };
    let Some(b) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
        return;
    };
    state.portal_pairs[idx].a = a;
    state.portal_pairs[idx].b = b;
}

/// Fresh set of 3 to 5 spikes, all starting visible
pub fn spawn_spikes(state: &mut GameState, now: u64) {
    state.spikes.clear();
    let count = state.rng.random_range(SPIKE_COUNT_MIN..=SPIKE_COUNT_MAX);
    for _ in 0..count {
        let Some(cell) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
            break;
        };
        state.spikes.push(Spike { pos: cell, visible: true, last_toggle: now });
    }
}

/// Relocate one randomly chosen spike, resetting its blink
pub fn refresh_one_spike(state: &mut GameState, now: u64) {
    if state.spikes.is_empty() {
        return;
    }
    let idx = state.rng.random_range(0..state.spikes.len());
    let Some(cell) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
        return;
    };
    let spike = &mut state.spikes[idx];
    spike.pos = cell;
    spike.visible = true;
    spike.last_toggle = now;
}

/// Try to place a fog zone whose 3x3 footprint overlaps nothing and stays
/// out of the head's box. `force` bypasses the on-map cap (the list is
/// still trimmed to the newest entries).
pub fn spawn_fog_zone(state: &mut GameState, now: u64, force: bool) {
    if !force && state.fog_zones.len() >= FOG_ZONE_MAX_ON_MAP {
        return;
    }
    let head = state.head();
    let occupied = occupied_cells(state);
    let existing_fog: HashSet<Cell> = state.fog_zones.iter().flat_map(|z| z.cells()).collect();

    for _ in 0..120 {
        let center = IVec2::new(
            state.rng.random_range(1..GRID_WIDTH - 1),
            state.rng.random_range(1..GRID_HEIGHT - 1),
        );
        let cells = grid::square_footprint(center, 1);
        if cells.iter().any(|c| grid::chebyshev(*c, head) <= HEAD_AVOID_RADIUS) {
            continue;
        }
        if cells.iter().any(|c| occupied.contains(c)) {
            continue;
        }
        if cells.iter().any(|c| existing_fog.contains(c)) {
            continue;
        }
        state.fog_zones.push(FogZone { center, spawned_at: now });
        if state.fog_zones.len() > FOG_ZONE_MAX_ON_MAP {
            let excess = state.fog_zones.len() - FOG_ZONE_MAX_ON_MAP;
            state.fog_zones.drain(0..excess);
        }
        return;
    }
}

/// One shadow snake seeded as a single cell that grows toward its target
pub fn spawn_shadow_snake(state: &mut GameState, now: u64) {
    let Some(start) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
        return;
    };
    let target_len = state
        .rng
        .random_range(SHADOW_START_LEN_MIN..=SHADOW_START_LEN_MAX)
        .max(2);
    let dirs = [
        IVec2::new(1, 0),
        IVec2::new(-1, 0),
        IVec2::new(0, 1),
        IVec2::new(0, -1),
    ];
    let dir = *dirs.choose(&mut state.rng).unwrap_or(&IVec2::new(1, 0));
    let mut body = std::collections::VecDeque::new();
    body.push_back(start);
    log::debug!("shadow snake spawn at {:?}, target length {}", start, target_len);
    state.shadow_snakes.push(ShadowSnake { body, dir, target_len, last_move: now });
}

/// One ghost hunter, starting visible with freshly rolled windows
pub fn spawn_ghost_hunter(state: &mut GameState, now: u64) {
    if state.ghost_hunters.len() >= HUNTER_MAX {
        return;
    }
    let Some(cell) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
        return;
    };
    let visible_ms = state.rng.random_range(HUNTER_VISIBLE_MIN_MS..=HUNTER_VISIBLE_MAX_MS);
    let invisible_ms = state.rng.random_range(HUNTER_INVISIBLE_MIN_MS..=HUNTER_INVISIBLE_MAX_MS);
    state.ghost_hunters.push(GhostHunter {
        pos: cell,
        visible: true,
        last_toggle: now,
        visible_ms,
        invisible_ms,
    });
}

/// Place the boss on an interior 3x3 footprint away from the head.
///
/// The footprint is taken by force: anything there except the player body
/// is cleared first (whole shadow snakes included). Only a footprint
/// touching the player disqualifies a candidate center.
pub fn spawn_boss(state: &mut GameState, now: u64) {
    let head = state.head();
    let mut candidates: Vec<Cell> = (1..GRID_WIDTH - 1)
        .flat_map(|x| (1..GRID_HEIGHT - 1).map(move |y| IVec2::new(x, y)))
        .filter(|c| grid::chebyshev(*c, head) > HEAD_AVOID_RADIUS)
        .collect();
    candidates.shuffle(&mut state.rng);

    for center in candidates.into_iter().take(80) {
        let cells = grid::square_footprint(center, 1);
        if cells.iter().any(|c| state.snake.contains(*c)) {
            continue;
        }

        state.obstacles.retain(|c| !cells.contains(c));
        state.normal_foods.retain(|f| !cells.contains(&f.pos));
        state.energy_foods.retain(|f| !cells.contains(&f.pos));
        state.items.retain(|it| !cells.contains(&it.pos));
        state.spikes.retain(|s| !cells.contains(&s.pos));
        state.ghost_hunters.retain(|g| !cells.contains(&g.pos));
        state.fog_zones.retain(|z| !cells.iter().any(|c| z.covers(*c)));
        state
            .shadow_snakes
            .retain(|ss| !ss.body.iter().any(|seg| cells.contains(seg)));

        log::info!("boss spawn at {:?}", center);
        state.boss = Some(Boss::new(center, now));
        state.push_cue(Cue::BossAppear);
        return;
    }
}

/// Scatter the boss-kill reward food around the dead boss's center
pub fn boss_kill_drops(state: &mut GameState, center: Cell) {
    let mut occupied: HashSet<Cell> = HashSet::new();
    occupied.extend(state.snake.body.iter().copied());
    occupied.extend(state.obstacles.iter().copied());
    occupied.extend(state.normal_foods.iter().map(|f| f.pos));
    occupied.extend(state.energy_foods.iter().map(|f| f.pos));
    occupied.extend(state.items.iter().map(|it| it.pos));
    for p in &state.portal_pairs {
        occupied.insert(p.a);
        occupied.insert(p.b);
    }
    occupied.extend(state.spikes.iter().map(|s| s.pos));

    let scatter = |state: &mut GameState, occupied: &mut HashSet<Cell>, energy: bool| {
        for _ in 0..30 {
            let cell = center
                + IVec2::new(
                    state.rng.random_range(-BOSS_DROP_RADIUS..=BOSS_DROP_RADIUS),
                    state.rng.random_range(-BOSS_DROP_RADIUS..=BOSS_DROP_RADIUS),
                );
            if !grid::in_bounds(cell) || occupied.contains(&cell) {
                continue;
            }
            let food = Food::drop(cell, BOSS_DROP_COLOR);
            if energy {
                state.energy_foods.push(food);
            } else {
                state.normal_foods.push(food);
            }
            occupied.insert(cell);
            return;
        }
    };

    for _ in 0..BOSS_DROP_NORMAL {
        scatter(state, &mut occupied, false);
    }
    for _ in 0..BOSS_DROP_ENERGY {
        scatter(state, &mut occupied, true);
    }
}

/// Sweep the five cells ahead of the head so a fresh run cannot start into
/// an instant hazard: obstacles and food go away, spikes get relocated,
/// fog zones touching the path are dropped, then food is topped back up.
pub fn clear_start_path(state: &mut GameState, now: u64) {
    let head = state.head();
    let step = state.snake.dir.delta();
    let mut path = Vec::new();
    for i in 1..=5 {
        let c = head + step * i;
        if !grid::in_bounds(c) {
            break;
        }
        path.push(c);
    }
    if path.is_empty() {
        return;
    }

    state.obstacles.retain(|c| !path.contains(c));
    state.normal_foods.retain(|f| !path.contains(&f.pos));
    state.energy_foods.retain(|f| !path.contains(&f.pos));

    let blocked: Vec<usize> = state
        .spikes
        .iter()
        .enumerate()
        .filter(|(_, s)| path.contains(&s.pos))
        .map(|(i, _)| i)
        .collect();
    for idx in blocked {
        let mut dest = None;
        for _ in 0..60 {
            match random_empty_cell(state) {
                Some(c) if !path.contains(&c) => {
                    dest = Some(c);
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }
        if let Some(c) = dest {
            let spike = &mut state.spikes[idx];
            spike.pos = c;
            spike.visible = true;
            spike.last_toggle = now;
        }
    }

    state.fog_zones.retain(|z| !path.iter().any(|c| z.covers(*c)));

    spawn_food(state);
}

/// Damage aftermath: clear the 10x10 box around the impact, relocate what
/// survives it, and restock the board.
pub fn shockwave_clear_and_refresh(state: &mut GameState, center: Cell, now: u64) {
    let half = DAMAGE_CLEAR_SIZE / 2;
    let mut zone: HashSet<Cell> = HashSet::new();
    for x in (center.x - half)..(center.x - half + DAMAGE_CLEAR_SIZE) {
        for y in (center.y - half)..(center.y - half + DAMAGE_CLEAR_SIZE) {
            let c = IVec2::new(x, y);
            if grid::in_bounds(c) {
                zone.insert(c);
            }
        }
    }

    state.obstacles.retain(|c| !zone.contains(c));
    state.normal_foods.retain(|f| !zone.contains(&f.pos));
    state.energy_foods.retain(|f| !zone.contains(&f.pos));
    state.items.retain(|it| !zone.contains(&it.pos));
    state.ghost_hunters.retain(|g| !zone.contains(&g.pos));
    state
        .shadow_snakes
        .retain(|ss| !ss.body.iter().any(|seg| zone.contains(seg)));
    state
        .fog_zones
        .retain(|z| !z.cells().iter().any(|c| zone.contains(c)));
    if let Some(boss) = &mut state.boss {
        boss.bullets.retain(|b| !zone.contains(&b.cell()));
    }

    // Spikes and portals are relocated rather than destroyed
    let blocked_spikes: Vec<usize> = state
        .spikes
        .iter()
        .enumerate()
        .filter(|(_, s)| zone.contains(&s.pos))
        .map(|(i, _)| i)
        .collect();
    for idx in blocked_spikes {
        if let Some(cell) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) {
            let spike = &mut state.spikes[idx];
            spike.pos = cell;
            spike.visible = true;
            spike.last_toggle = now;
        }
    }

    let blocked_pairs: Vec<usize> = state
        .portal_pairs
        .iter()
        .enumerate()
        .filter(|(_, p)| zone.contains(&p.a) || zone.contains(&p.b))
        .map(|(i, _)| i)
        .collect();
    for idx in blocked_pairs {
        let Some(a) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
            continue;
        };
        let Some(b) = random_empty_cell_avoid_head(state, HEAD_AVOID_RADIUS) else {
            continue;
        };
        state.portal_pairs[idx].a = a;
        state.portal_pairs[idx].b = b;
    }

    spawn_food(state);
    while state.items.len() < ITEM_MAX_ON_MAP {
        let before = state.items.len();
        spawn_item(state);
        if state.items.len() == before {
            break;
        }
    }
    if state.fog_zones.len() < FOG_ZONE_MAX_ON_MAP {
        spawn_fog_zone(state, now, true);
    }
}

/// Arm every spawn timer from its policy range, relative to `now`
pub fn arm_all_timers(state: &mut GameState, now: u64) {
    state.next_portal_refresh =
        now + state.rng.random_range(PORTAL_REFRESH_MIN_MS..=PORTAL_REFRESH_MAX_MS);
    state.next_spike_refresh =
        now + state.rng.random_range(SPIKE_REFRESH_MIN_MS..=SPIKE_REFRESH_MAX_MS);
    state.next_shadow_spawn =
        now + state.rng.random_range(SHADOW_SPAWN_MIN_MS..=SHADOW_SPAWN_MAX_MS);
    state.next_hunter_spawn =
        now + state.rng.random_range(HUNTER_INVISIBLE_MIN_MS..=HUNTER_INVISIBLE_MAX_MS);
    state.next_fog_refresh =
        now + state.rng.random_range(FOG_ZONE_REFRESH_MIN_MS..=FOG_ZONE_REFRESH_MAX_MS);
    state.next_item_spawn =
        now + state.rng.random_range(ITEM_SPAWN_MIN_MS..=ITEM_SPAWN_MAX_MS);
}
