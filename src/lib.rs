//! Neon Serpent - a grid arcade snake simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, clock, entities, per-frame step)
//! - `highscores`: JSON-backed top-10 leaderboard
//! - `settings`: Player preferences with fail-open persistence

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::Leaderboard;
pub use settings::{EffectQuality, Settings};

/// Game configuration constants
pub mod consts {
    use crate::sim::events::Rgb;

    // === Board and movement ===
    /// Board dimensions in cells
    pub const GRID_WIDTH: i32 = 25;
    pub const GRID_HEIGHT: i32 = 25;
    /// Milliseconds between movement steps at time scale 1.0
    pub const STEP_INTERVAL_MS: u64 = 120;
    /// Floor for the time scale, keeps scaled intervals finite
    pub const MIN_TIME_SCALE: f32 = 0.05;

    // === Ghost mode ===
    /// Phasing window bought by one energy charge
    pub const GHOST_DURATION_MS: u64 = 5000;

    // === Food ===
    /// Normal food count the board is topped up to
    pub const NORMAL_FOOD_TARGET: usize = 3;
    /// Chance each top-up also drops an energy food
    pub const ENERGY_FOOD_PROBABILITY: f64 = 0.3;
    /// Every this many normal foods eaten, an obstacle lands
    pub const FOOD_PER_OBSTACLE: u32 = 5;

    // === Combo ===
    /// Eating again inside this window advances the streak
    pub const COMBO_WINDOW_MS: u64 = 2000;
    /// How long the multiplier popup stays up
    pub const COMBO_DISPLAY_MS: u64 = 1200;
    /// Streak cap, multiplier saturates at 2^cap
    pub const COMBO_STREAK_CAP: u32 = 3;

    // === Items ===
    pub const ITEM_MAX_ON_MAP: usize = 5;
    pub const ITEM_SPAWN_MIN_MS: u64 = 2500;
    pub const ITEM_SPAWN_MAX_MS: u64 = 4000;
    /// Scissors get their own cap on top of the item cap
    pub const SCISSORS_MAX_ON_MAP: usize = 3;
    /// Segments cut by one scissors pickup
    pub const SCISSORS_SHRINK: u32 = 3;
    /// Rotten apple control inversion window
    pub const REVERSED_CONTROLS_MS: u64 = 5000;

    // === Magnet ===
    pub const MAGNET_DURATION_MIN_MS: u64 = 3000;
    pub const MAGNET_DURATION_MAX_MS: u64 = 5000;
    /// Chebyshev radius swept for attractable pickups
    pub const MAGNET_PULL_RADIUS: i32 = 2;
    /// Cadence of the pull sweep while the magnet is live
    pub const MAGNET_PULL_CHECK_MS: u64 = 120;
    pub const MAGNET_FOOD_FLIGHT_MIN_MS: u64 = 140;
    pub const MAGNET_FOOD_FLIGHT_MAX_MS: u64 = 240;
    pub const MAGNET_BOMB_FLIGHT_MIN_MS: u64 = 160;
    pub const MAGNET_BOMB_FLIGHT_MAX_MS: u64 = 260;

    // === Bomb ===
    /// Chebyshev blast radius
    pub const BOMB_RADIUS: i32 = 2;

    // === Portals ===
    pub const PORTAL_PAIRS_MIN: usize = 3;
    pub const PORTAL_PAIRS_MAX: usize = 5;
    /// One random pair relocates on this cadence
    pub const PORTAL_REFRESH_MIN_MS: u64 = 4000;
    pub const PORTAL_REFRESH_MAX_MS: u64 = 10000;
    /// Warp lockout, stops instant bounce-back chains
    pub const PORTAL_COOLDOWN_MS: u64 = 250;

    // === Spikes ===
    pub const SPIKE_COUNT_MIN: usize = 3;
    pub const SPIKE_COUNT_MAX: usize = 5;
    /// Visibility flips on this fixed cadence
    pub const SPIKE_TOGGLE_MS: u64 = 500;
    /// One random spike relocates on this cadence
    pub const SPIKE_REFRESH_MIN_MS: u64 = 3000;
    pub const SPIKE_REFRESH_MAX_MS: u64 = 5000;

    // === Fog ===
    pub const FOG_ZONE_MAX_ON_MAP: usize = 3;
    pub const FOG_ZONE_REFRESH_MIN_MS: u64 = 5000;
    pub const FOG_ZONE_REFRESH_MAX_MS: u64 = 8000;
    /// Visibility circle radius while fogged, in cells
    pub const FOG_VISIBILITY_MIN: i32 = 3;
    pub const FOG_VISIBILITY_MAX: i32 = 5;
    pub const FOG_DURATION_MIN_MS: u64 = 3000;
    pub const FOG_DURATION_MAX_MS: u64 = 5000;

    // === Shadow snakes ===
    pub const SHADOW_SPAWN_MIN_MS: u64 = 10000;
    pub const SHADOW_SPAWN_MAX_MS: u64 = 15000;
    /// Shadow step cadence, same base as the player
    pub const SHADOW_MOVE_INTERVAL_MS: u64 = 120;
    pub const SHADOW_START_LEN_MIN: usize = 4;
    pub const SHADOW_START_LEN_MAX: usize = 7;

    // === Ghost hunters ===
    pub const HUNTER_MAX: usize = 3;
    pub const HUNTER_VISIBLE_MIN_MS: u64 = 4000;
    pub const HUNTER_VISIBLE_MAX_MS: u64 = 7000;
    pub const HUNTER_INVISIBLE_MIN_MS: u64 = 4000;
    pub const HUNTER_INVISIBLE_MAX_MS: u64 = 8000;
    /// Hunters drift slower than the snake steps
    pub const HUNTER_MOVE_INTERVAL_MS: u64 = 260;

    // === Boss ===
    /// Boss-counting foods needed to summon the boss
    pub const BOSS_FOOD_THRESHOLD: u32 = 10;
    /// Invulnerability window after the boss appears
    pub const BOSS_SHIELD_MS: u64 = 5000;
    /// Bullet speed in cells per second
    pub const BOSS_BULLET_SPEED: f32 = 5.0;
    pub const BOSS_BULLET_INTERVAL_MS: u64 = 1000;
    pub const BOSS_KILL_SCORE: u32 = 10;
    /// Food scattered when the boss dies
    pub const BOSS_DROP_NORMAL: usize = 18;
    pub const BOSS_DROP_ENERGY: usize = 3;
    pub const BOSS_DROP_RADIUS: i32 = 5;

    // === Damage and slow motion ===
    /// Segments shed on non-lethal hazard contact
    pub const DAMAGE_SHRINK_SEGMENTS: u32 = 5;
    pub const DAMAGE_SCORE_PENALTY: u32 = 10;
    /// Side of the square swept clean around the impact
    pub const DAMAGE_CLEAR_SIZE: i32 = 10;
    pub const DAMAGE_SLOW_MS: u64 = 500;
    pub const DAMAGE_SLOW_SCALE: f32 = 0.55;
    /// Boss-kill slow motion is longer and deeper, and wins overlaps
    pub const BOSS_KILL_SLOW_MS: u64 = 2000;
    pub const BOSS_KILL_SLOW_SCALE: f32 = 0.12;
    /// Cadence of the timed shrink drain
    pub const SHRINK_INTERVAL_MS: u64 = 120;

    // === Spawning ===
    /// Spawns keep this Chebyshev distance from the head
    pub const HEAD_AVOID_RADIUS: i32 = 2;

    // === Burst colors ===
    pub const FOOD_COLOR: Rgb = (255, 0, 127);
    pub const ENERGY_FOOD_COLOR: Rgb = (255, 255, 0);
    /// Boss drops keep their own tint so the scatter reads on screen
    pub const BOSS_DROP_COLOR: Rgb = (255, 80, 0);
    pub const SHADOW_DROP_COLOR: Rgb = (180, 180, 255);
    pub const OBSTACLE_BURST_COLOR: Rgb = (80, 80, 80);
    pub const BOMB_BURST_COLOR: Rgb = (30, 30, 30);
    pub const SCISSORS_BURST_COLOR: Rgb = (0, 255, 0);
    pub const SHRINK_BURST_COLOR: Rgb = (120, 220, 255);
    pub const PORTAL_BURST_COLOR: Rgb = (0, 255, 255);
    pub const BOSS_KILL_BURST_COLOR: Rgb = (255, 120, 0);
}
