//! Events emitted by the simulation for external collaborators
//!
//! The core never renders or plays anything. Each tick appends events to
//! `GameState::events`; the host drains them and maps cue identifiers to
//! audio assets and burst requests to particle effects.

use crate::sim::grid::Cell;

/// RGB color forwarded with burst requests
pub type Rgb = (u8, u8, u8);

/// Audio cue identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Normal food eaten, no streak
    FoodCollect,
    /// Normal food eaten at streak 1
    FoodCombo,
    /// Normal food eaten at streak 2+
    FoodFrenzy,
    /// Energy food eaten
    EnergyCollect,
    /// One body segment removed
    ShellCrack,
    /// Fatal wall hit
    WallCrack,
    /// Portal teleport
    PortalWarp,
    /// Fog zone triggered
    FogBloom,
    /// Magnet picked up
    MagnetHum,
    /// Bomb detonated
    BombBlast,
    /// Scissors picked up
    ScissorSnip,
    /// Rotten apple picked up
    Poisoned,
    /// Damage event shockwave
    DamageShockwave,
    /// Shadow snake destroyed
    EnemyDestroyed,
    /// Ghost hunter spawned
    HunterAppear,
    /// Boss spawned
    BossAppear,
    /// Boss killed in ghost mode
    BossDefeated,
}

impl Cue {
    /// Stable identifier handed to the audio collaborator
    pub fn id(self) -> &'static str {
        match self {
            Cue::FoodCollect => "collect_food_01",
            Cue::FoodCombo => "collect_food_02",
            Cue::FoodFrenzy => "collect_food_03",
            Cue::EnergyCollect => "collect_energy_01",
            Cue::ShellCrack => "crack_01",
            Cue::WallCrack => "crack_02",
            Cue::PortalWarp => "portal_02",
            Cue::FogBloom => "fog_01",
            Cue::MagnetHum => "magnet_01",
            Cue::BombBlast => "bomb_01",
            Cue::ScissorSnip => "item_scissors",
            Cue::Poisoned => "poisoned_01",
            Cue::DamageShockwave => "energy_shockwave",
            Cue::EnemyDestroyed => "destroy_enemy_01",
            Cue::HunterAppear => "ghost_appear_02",
            Cue::BossAppear => "boss_appear_01",
            Cue::BossDefeated => "defeat_boss_03",
        }
    }
}

/// One simulation event for the host to interpret
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Play a sound
    Cue(Cue),
    /// Emit a particle burst at a cell
    Burst { cell: Cell, color: Rgb, count: u32 },
    /// Animated score transition
    ScoreChange { old: u32, new: u32 },
    /// Damage shockwave ring centered on the impact cell
    Shockwave { center: Cell },
    /// Fog effect started (radius in cells, game-time expiry)
    FogStarted { radius: i32, until: u64 },
    /// A shadow snake ate a normal food
    FoodStolen { cell: Cell },
    /// A shadow snake ate an energy food
    EnergyStolen { cell: Cell },
    /// Run ended
    GameOver { reason: &'static str },
}
