//! Simulation state: every entity collection lives here
//!
//! `GameState` is the single owner of the world. Subsystem logic in
//! `spawn`, `hazards`, `items` and `tick` operates on `&mut GameState`;
//! nothing holds a reference into it across frames. Timers are absolute
//! game-time instants ("next fire" / "until"), produced by the injected
//! clock, so pause handling lives entirely in `GameClock`.

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::sim::clock::GameClock;
use crate::sim::events::{Cue, GameEvent, Rgb};
use crate::sim::grid::{self, Cell, Direction};
use crate::sim::spawn;

/// High-level lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    GameOver,
}

/// Player snake
#[derive(Debug, Clone)]
pub struct Snake {
    /// Body cells, head first; never empty
    pub body: VecDeque<Cell>,
    /// Committed heading
    pub dir: Direction,
    /// Buffered heading, applied at the next movement step
    pub next_dir: Direction,
    /// Ghost mode active
    pub ghost: bool,
    /// Game-time expiry of ghost mode
    pub ghost_until: u64,
    /// Growth credits owed from magnet flight arrivals
    pub grow_pending: u32,
    /// Ghost-mode charges
    pub energy: u32,
}

impl Snake {
    /// Length-3 snake at the grid center, heading right, one free charge
    fn at_center() -> Self {
        let center = IVec2::new(GRID_WIDTH / 2, GRID_HEIGHT / 2);
        let mut body = VecDeque::new();
        body.push_back(center);
        body.push_back(center - IVec2::new(1, 0));
        body.push_back(center - IVec2::new(2, 0));
        Self {
            body,
            dir: Direction::Right,
            next_dir: Direction::Right,
            ghost: false,
            ghost_until: 0,
            grow_pending: 0,
            energy: 1,
        }
    }

    #[inline]
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }
}

/// A food pellet in either pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    pub pos: Cell,
    /// Eating this advances boss progress (drops and scatters do not)
    pub counts_for_boss: bool,
    /// Display color override for drop food
    pub color: Option<Rgb>,
}

impl Food {
    /// Regular spawner food: boss-counting, default color
    pub fn plain(pos: Cell) -> Self {
        Self { pos, counts_for_boss: true, color: None }
    }

    /// Drop food: never boss-counting, tinted
    pub fn drop(pos: Cell, color: Rgb) -> Self {
        Self { pos, counts_for_boss: false, color: Some(color) }
    }
}

/// Pickup kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Magnet,
    Bomb,
    Scissors,
    RottenApple,
}

/// A pickup waiting on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Cell,
}

/// Linked pair of teleporter endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalPair {
    pub id: u32,
    pub a: Cell,
    pub b: Cell,
}

impl PortalPair {
    /// The other endpoint, if `cell` is one of the two
    pub fn partner_of(&self, cell: Cell) -> Option<Cell> {
        if cell == self.a {
            Some(self.b)
        } else if cell == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Blinking floor trap, lethal to step on only while visible
#[derive(Debug, Clone, Copy)]
pub struct Spike {
    pub pos: Cell,
    pub visible: bool,
    /// Game-time of the last visibility flip
    pub last_toggle: u64,
}

/// Rival snake that chases and steals food
#[derive(Debug, Clone)]
pub struct ShadowSnake {
    /// Body cells, head first; starts as a single cell and grows
    pub body: VecDeque<Cell>,
    /// Last committed step delta
    pub dir: Cell,
    /// Length it grows toward while moving
    pub target_len: usize,
    pub last_move: u64,
}

/// Chaser that phases in and out of visibility
#[derive(Debug, Clone, Copy)]
pub struct GhostHunter {
    pub pos: Cell,
    pub visible: bool,
    pub last_toggle: u64,
    /// Length of the current visible window
    pub visible_ms: u64,
    /// Length of the current invisible window
    pub invisible_ms: u64,
}

/// One boss projectile in continuous coordinates
#[derive(Debug, Clone, Copy)]
pub struct Bullet {
    pub pos: Vec2,
    /// Raw step components (each ±1 or 0); diagonals cover more ground
    pub dir: Vec2,
    /// Cells per second per component
    pub speed: f32,
}

impl Bullet {
    /// Grid cell this bullet currently occupies
    #[inline]
    pub fn cell(&self) -> Cell {
        IVec2::new(self.pos.x.round() as i32, self.pos.y.round() as i32)
    }
}

/// 3x3 miniboss
#[derive(Debug, Clone)]
pub struct Boss {
    pub center: Cell,
    pub spawned_at: u64,
    pub last_bullet: u64,
    /// Game-time of the last bullet integration step
    pub last_update: u64,
    pub bullets: Vec<Bullet>,
}

impl Boss {
    pub fn new(center: Cell, now: u64) -> Self {
        Self {
            center,
            spawned_at: now,
            last_bullet: now,
            last_update: now,
            bullets: Vec::new(),
        }
    }

    /// Shield covers the first five seconds of its life
    #[inline]
    pub fn shield_active(&self, now: u64) -> bool {
        now < self.spawned_at + BOSS_SHIELD_MS
    }

    /// All cells of the 3x3 footprint, clipped to the grid
    pub fn cells(&self) -> Vec<Cell> {
        grid::square_footprint(self.center, 1)
    }

    #[inline]
    pub fn covers(&self, cell: Cell) -> bool {
        grid::chebyshev(cell, self.center) <= 1
    }
}

/// Static trap region that triggers the fog effect when entered
#[derive(Debug, Clone, Copy)]
pub struct FogZone {
    pub center: Cell,
    pub spawned_at: u64,
}

impl FogZone {
    /// 3x3 footprint, clipped to the grid
    pub fn cells(&self) -> Vec<Cell> {
        grid::square_footprint(self.center, 1)
    }

    #[inline]
    pub fn covers(&self, cell: Cell) -> bool {
        grid::chebyshev(cell, self.center) <= 1
    }
}

/// Payload of a magnet flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightKind {
    Normal,
    Energy,
    Bomb,
}

/// A collectible in transit toward the player
#[derive(Debug, Clone, Copy)]
pub struct MagnetFlight {
    /// Cell it was lifted from
    pub from: Cell,
    pub kind: FlightKind,
    pub start: u64,
    pub duration: u64,
    /// Carried food metadata, applied on arrival
    pub counts_for_boss: bool,
    pub color: Option<Rgb>,
}

/// The whole world. One instance per run, owned by the host.
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    pub clock: GameClock,
    pub rng: Pcg32,

    // === Player ===
    pub snake: Snake,
    pub score: u32,
    pub last_move_time: u64,

    // === Consumables and hazards ===
    pub normal_foods: Vec<Food>,
    pub energy_foods: Vec<Food>,
    pub items: Vec<Item>,
    pub obstacles: Vec<Cell>,
    /// Total normal foods eaten by the player, drives obstacle cadence
    pub normal_food_eaten: u32,

    // === Portals ===
    pub portal_pairs: Vec<PortalPair>,
    pub next_portal_refresh: u64,
    pub portal_cooldown_until: u64,

    // === Spikes ===
    pub spikes: Vec<Spike>,
    pub next_spike_refresh: u64,

    // === Fog ===
    pub fog_zones: Vec<FogZone>,
    pub next_fog_refresh: u64,
    pub fog_until: u64,
    pub fog_radius: i32,

    // === Adversaries ===
    pub shadow_snakes: Vec<ShadowSnake>,
    pub next_shadow_spawn: u64,
    pub ghost_hunters: Vec<GhostHunter>,
    pub next_hunter_spawn: u64,
    /// Hunters step together on one global cadence
    pub last_hunter_move: u64,
    pub boss: Option<Boss>,
    /// Boss-counting foods eaten since the last boss spawn
    pub boss_progress: u32,

    // === Items and magnet ===
    pub next_item_spawn: u64,
    /// First bomb / rotten apple are guaranteed before weighted rolls
    pub bomb_seen: bool,
    pub rotten_seen: bool,
    pub magnet_until: u64,
    pub next_magnet_pull: u64,
    pub magnet_flights: Vec<MagnetFlight>,
    pub reversed_until: u64,

    // === Damage and slow motion ===
    pub damage_slow_until: u64,
    pub boss_kill_slow_until: u64,
    /// Segments still owed to the timed shrink channel
    pub shrink_remaining: u32,
    pub last_shrink: u64,

    // === Combo ===
    pub combo_streak: u32,
    /// Game-time of the last food eaten; `None` until the first one
    pub last_food_time: Option<u64>,
    pub combo_display_until: u64,

    // === Run bookkeeping ===
    pub run_start_time: u64,
    pub run_end_time: Option<u64>,
    pub game_over_reason: Option<&'static str>,

    /// Outbound events, drained by the host every frame
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh run from a seed. The world is fully populated: food, portals,
    /// spikes, one fog zone, and every spawn timer armed.
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            phase: GamePhase::Playing,
            clock: GameClock::new(),
            rng: Pcg32::seed_from_u64(seed),
            snake: Snake::at_center(),
            score: 0,
            last_move_time: 0,
            normal_foods: Vec::new(),
            energy_foods: Vec::new(),
            items: Vec::new(),
            obstacles: Vec::new(),
            normal_food_eaten: 0,
            portal_pairs: Vec::new(),
            next_portal_refresh: 0,
            portal_cooldown_until: 0,
            spikes: Vec::new(),
            next_spike_refresh: 0,
            fog_zones: Vec::new(),
            next_fog_refresh: 0,
            fog_until: 0,
            fog_radius: FOG_VISIBILITY_MAX,
            shadow_snakes: Vec::new(),
            next_shadow_spawn: 0,
            ghost_hunters: Vec::new(),
            next_hunter_spawn: 0,
            last_hunter_move: 0,
            boss: None,
            boss_progress: 0,
            next_item_spawn: 0,
            bomb_seen: false,
            rotten_seen: false,
            magnet_until: 0,
            next_magnet_pull: 0,
            magnet_flights: Vec::new(),
            reversed_until: 0,
            damage_slow_until: 0,
            boss_kill_slow_until: 0,
            shrink_remaining: 0,
            last_shrink: 0,
            combo_streak: 0,
            last_food_time: None,
            combo_display_until: 0,
            run_start_time: 0,
            run_end_time: None,
            game_over_reason: None,
            events: Vec::new(),
        };
        state.reset(0);
        state
    }

    /// Restart the run at game-time `now`, repopulating the world
    pub fn reset(&mut self, now: u64) {
        self.phase = GamePhase::Playing;
        self.snake = Snake::at_center();
        self.score = 0;
        self.last_move_time = now;
        self.normal_foods.clear();
        self.energy_foods.clear();
        self.items.clear();
        self.obstacles.clear();
        self.normal_food_eaten = 0;
        self.portal_pairs.clear();
        self.portal_cooldown_until = 0;
        self.spikes.clear();
        self.fog_zones.clear();
        self.fog_until = 0;
        self.fog_radius = FOG_VISIBILITY_MAX;
        self.shadow_snakes.clear();
        self.ghost_hunters.clear();
        self.last_hunter_move = 0;
        self.boss = None;
        self.boss_progress = 0;
        self.bomb_seen = false;
        self.rotten_seen = false;
        self.magnet_until = 0;
        self.next_magnet_pull = 0;
        self.magnet_flights.clear();
        self.reversed_until = 0;
        self.damage_slow_until = 0;
        self.boss_kill_slow_until = 0;
        self.shrink_remaining = 0;
        self.last_shrink = now;
        self.combo_streak = 0;
        self.last_food_time = None;
        self.combo_display_until = 0;
        self.run_start_time = now;
        self.run_end_time = None;
        self.game_over_reason = None;
        self.events.clear();

        spawn::spawn_food(self);
        spawn::spawn_portals(self);
        spawn::spawn_spikes(self, now);
        spawn::spawn_fog_zone(self, now, true);
        spawn::arm_all_timers(self, now);
        spawn::clear_start_path(self, now);

        log::info!(
            "run reset: {} portal pairs, {} spikes, {} foods",
            self.portal_pairs.len(),
            self.spikes.len(),
            self.normal_foods.len()
        );
    }

    #[inline]
    pub fn head(&self) -> Cell {
        self.snake.head()
    }

    /// Active slow-motion multiplier. Boss-kill slowmo wins over damage
    /// slowmo; 1.0 means full speed.
    pub fn time_scale(&self, now: u64) -> f32 {
        if now < self.boss_kill_slow_until {
            BOSS_KILL_SLOW_SCALE
        } else if now < self.damage_slow_until {
            DAMAGE_SLOW_SCALE
        } else {
            1.0
        }
    }

    /// Current score multiplier from the combo streak
    #[inline]
    pub fn combo_multiplier(&self) -> u32 {
        1 << self.combo_streak
    }

    #[inline]
    pub fn reversed_active(&self, now: u64) -> bool {
        now < self.reversed_until
    }

    #[inline]
    pub fn magnet_active(&self, now: u64) -> bool {
        now < self.magnet_until
    }

    #[inline]
    pub fn fog_active(&self, now: u64) -> bool {
        now < self.fog_until
    }

    #[inline]
    pub fn combo_display_active(&self, now: u64) -> bool {
        now < self.combo_display_until
    }

    /// Milliseconds this run has been playing, pause already excluded
    pub fn run_elapsed_ms(&self, now: u64) -> u64 {
        let end = self.run_end_time.unwrap_or(now);
        end.saturating_sub(self.run_start_time)
    }

    /// Partner endpoint when `cell` is one half of a live portal pair
    pub fn portal_partner(&self, cell: Cell) -> Option<Cell> {
        self.portal_pairs.iter().find_map(|p| p.partner_of(cell))
    }

    /// End the run. The state stays inspectable; only `reset` leaves
    /// this phase.
    pub fn game_over(&mut self, reason: &'static str, now: u64) {
        self.phase = GamePhase::GameOver;
        self.game_over_reason = Some(reason);
        self.run_end_time = Some(now);
        self.events.push(GameEvent::GameOver { reason });
        log::info!(
            "game over: {} (score {}, length {}, {} ms)",
            reason,
            self.score,
            self.snake.len(),
            self.run_elapsed_ms(now)
        );
    }

    // --- Event helpers ---

    #[inline]
    pub fn push_cue(&mut self, cue: Cue) {
        self.events.push(GameEvent::Cue(cue));
    }

    #[inline]
    pub fn push_burst(&mut self, cell: Cell, color: Rgb, count: u32) {
        self.events.push(GameEvent::Burst { cell, color, count });
    }

    /// Hand the accumulated events to the host
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
