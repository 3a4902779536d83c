//! Game settings and preferences
//!
//! Persisted to a JSON file beside the binary, separately from the
//! leaderboard. Unknown or missing fields fall back to defaults so old
//! files keep working across versions.

use std::fs;

use serde::{Deserialize, Serialize};

/// Settings file name, resolved against the working directory
pub const SETTINGS_FILE: &str = "snake_settings.json";

/// Effect quality levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EffectQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl EffectQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectQuality::Low => "Low",
            EffectQuality::Medium => "Medium",
            EffectQuality::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(EffectQuality::Low),
            "medium" | "med" => Some(EffectQuality::Medium),
            "high" => Some(EffectQuality::High),
            _ => None,
        }
    }

    /// Scale applied to every burst's particle count
    pub fn burst_scale(&self) -> f32 {
        match self {
            EffectQuality::Low => 0.3,
            EffectQuality::Medium => 1.0,
            EffectQuality::High => 1.5,
        }
    }

    /// Upper bound on live particles
    pub fn max_particles(&self) -> usize {
        match self {
            EffectQuality::Low => 150,
            EffectQuality::Medium => 600,
            EffectQuality::High => 2000,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Player ===
    /// Name written to the leaderboard
    pub player_name: String,

    /// Effect quality preset
    pub quality: EffectQuality,

    // === Visual effects ===
    /// Particle bursts on pickups and impacts
    pub bursts: bool,
    /// Full-screen flash on damage
    pub damage_flash: bool,
    /// Dim the board outside the visibility circle while fog is active
    pub fog_overlay: bool,
    /// Combo multiplier popup
    pub combo_popup: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound cue volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Accessibility ===
    /// Suppress full-screen flashes and shockwave strobes
    pub reduced_flashing: bool,
    /// High contrast board colors
    pub high_contrast: bool,
    /// Floor for cinematic slow motion, 0.0 keeps the full effect and
    /// 1.0 disables slow motion entirely
    pub slowmo_floor: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "player".to_string(),

            quality: EffectQuality::Medium,

            // Visual effects - all on by default
            bursts: true,
            damage_flash: true,
            fog_overlay: true,
            combo_popup: true,

            // HUD
            show_fps: true,

            // Audio
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,

            // Accessibility
            reduced_flashing: false,
            high_contrast: false,
            slowmo_floor: 0.0,
        }
    }
}

impl Settings {
    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_quality(&mut self, quality: EffectQuality) {
        self.quality = quality;

        // Low preset drops the busier effects
        if quality == EffectQuality::Low {
            self.damage_flash = false;
            self.combo_popup = false;
        }
    }

    /// Effective damage flash (respects reduced_flashing)
    pub fn effective_damage_flash(&self) -> bool {
        self.damage_flash && !self.reduced_flashing
    }

    /// Particle count for a requested burst size
    pub fn scaled_burst(&self, count: u32) -> u32 {
        if !self.bursts {
            return 0;
        }
        (count as f32 * self.quality.burst_scale()).round() as u32
    }

    /// Volume applied to sound cues
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Time scale after the accessibility floor is applied
    pub fn effective_time_scale(&self, scale: f32) -> f32 {
        scale.max(self.slowmo_floor.clamp(0.0, 1.0))
    }

    /// Load settings from disk, falling back to defaults on any failure.
    pub fn load() -> Self {
        match fs::read_to_string(SETTINGS_FILE) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("loaded settings");
                    settings
                }
                Err(err) => {
                    log::warn!("settings file is malformed, using defaults: {err}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("no settings file, using defaults");
                Self::default()
            }
        }
    }

    /// Save settings to disk, best effort.
    pub fn save(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = fs::write(SETTINGS_FILE, json) {
                    log::warn!("failed to save settings: {err}");
                } else {
                    log::info!("settings saved");
                }
            }
            Err(err) => log::warn!("failed to serialize settings: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let s = Settings::default();
        assert!(!s.player_name.is_empty());
        assert!((0.0..=1.0).contains(&s.master_volume));
        assert!((0.0..=1.0).contains(&s.sfx_volume));
        assert_eq!(s.quality, EffectQuality::Medium);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{"player_name":"zoe"}"#).unwrap();
        assert_eq!(s.player_name, "zoe");
        assert!(s.bursts);
        assert_eq!(s.quality, EffectQuality::Medium);
    }

    #[test]
    fn test_quality_round_trips_via_str() {
        for q in [EffectQuality::Low, EffectQuality::Medium, EffectQuality::High] {
            assert_eq!(EffectQuality::from_str(q.as_str()), Some(q));
        }
        assert_eq!(EffectQuality::from_str("med"), Some(EffectQuality::Medium));
        assert_eq!(EffectQuality::from_str("ultra"), None);
    }

    #[test]
    fn test_low_quality_trims_effects() {
        let mut s = Settings::default();
        s.apply_quality(EffectQuality::Low);
        assert!(!s.damage_flash);
        assert!(!s.combo_popup);
        assert!(s.bursts, "bursts only shrink, they do not vanish");
    }

    #[test]
    fn test_reduced_flashing_overrides_damage_flash() {
        let mut s = Settings::default();
        s.reduced_flashing = true;
        assert!(s.damage_flash);
        assert!(!s.effective_damage_flash());
    }

    #[test]
    fn test_scaled_burst_tracks_quality() {
        let mut s = Settings::default();
        assert_eq!(s.scaled_burst(25), 25);
        s.apply_quality(EffectQuality::Low);
        assert_eq!(s.scaled_burst(25), 8);
        s.bursts = false;
        assert_eq!(s.scaled_burst(25), 0);
    }

    #[test]
    fn test_slowmo_floor_caps_slow_motion() {
        let mut s = Settings::default();
        assert_eq!(s.effective_time_scale(0.12), 0.12);
        s.slowmo_floor = 0.5;
        assert_eq!(s.effective_time_scale(0.12), 0.5);
        assert_eq!(s.effective_time_scale(0.8), 0.8);
    }
}
