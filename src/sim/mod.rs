//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Game-time milliseconds only, derived from the pause-aware clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order within each entity list)
//! - No rendering or platform dependencies
//!
//! The host owns the loop: feed [`tick`] a raw clock reading and a
//! [`FrameInput`] each frame, then drain [`GameState::take_events`] for
//! everything the presentation layer needs to react to.

pub mod clock;
pub mod events;
pub mod grid;
pub mod hazards;
pub mod items;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::GameClock;
pub use events::{Cue, GameEvent, Rgb};
pub use grid::{Cell, Direction};
pub use state::{
    Boss, Bullet, FlightKind, Food, FogZone, GamePhase, GameState, GhostHunter, Item,
    ItemKind, MagnetFlight, PortalPair, ShadowSnake, Snake, Spike,
};
pub use tick::{FrameInput, tick};
