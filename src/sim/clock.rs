//! Pause-aware game clock
//!
//! The host pushes raw monotonic milliseconds into the simulation each
//! frame; everything inside works in "game time", which freezes while
//! paused. Every timer in the state is an absolute game-time instant, so
//! resuming never fast-forwards a timer: the paused span is accumulated
//! here and subtracted in one place.

use crate::consts::MIN_TIME_SCALE;

/// Converts raw host milliseconds into pause-adjusted game time.
#[derive(Debug, Clone, Default)]
pub struct GameClock {
    /// First raw sample, so game time starts near zero for any host source
    origin_ms: Option<u64>,
    /// Latest raw sample, relative to origin
    raw_ms: u64,
    /// Total completed paused duration
    paused_accum_ms: u64,
    /// Start of the live pause span, if paused right now
    pause_started_ms: Option<u64>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw sample and return the current game time.
    ///
    /// Samples are clamped monotonic; a host handing in a stale timestamp
    /// just re-reads the current game time.
    pub fn sample(&mut self, raw_ms: u64) -> u64 {
        let origin = *self.origin_ms.get_or_insert(raw_ms);
        let rel = raw_ms.saturating_sub(origin);
        self.raw_ms = self.raw_ms.max(rel);
        self.now()
    }

    /// Current game time in milliseconds. Frozen while paused.
    pub fn now(&self) -> u64 {
        let live_pause = self
            .pause_started_ms
            .map(|start| self.raw_ms.saturating_sub(start))
            .unwrap_or(0);
        self.raw_ms
            .saturating_sub(self.paused_accum_ms)
            .saturating_sub(live_pause)
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_ms.is_some()
    }

    pub fn pause(&mut self) {
        if self.pause_started_ms.is_none() {
            self.pause_started_ms = Some(self.raw_ms);
        }
    }

    pub fn resume(&mut self) {
        if let Some(start) = self.pause_started_ms.take() {
            self.paused_accum_ms += self.raw_ms.saturating_sub(start);
        }
    }
}

/// Interval for a cadence gate under the active time scale. Slow motion
/// stretches the interval; the floor keeps a near-zero scale from stalling
/// a timer forever.
#[inline]
pub fn scaled_interval_ms(base_ms: u64, time_scale: f32) -> f32 {
    base_ms as f32 / time_scale.max(MIN_TIME_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_time_starts_at_zero_for_any_origin() {
        let mut clock = GameClock::new();
        assert_eq!(clock.sample(123_456), 0);
        assert_eq!(clock.sample(123_556), 100);
    }

    #[test]
    fn test_pause_freezes_game_time() {
        let mut clock = GameClock::new();
        clock.sample(0);
        clock.sample(1000);
        clock.pause();
        clock.sample(5000);
        assert_eq!(clock.now(), 1000);
        assert!(clock.is_paused());
    }

    #[test]
    fn test_resume_does_not_fast_forward() {
        let mut clock = GameClock::new();
        clock.sample(0);
        clock.sample(1000);
        clock.pause();
        clock.sample(4000);
        clock.resume();
        // 3000ms spent paused: game time picks up where it froze
        assert_eq!(clock.now(), 1000);
        clock.sample(4500);
        assert_eq!(clock.now(), 1500);
    }

    #[test]
    fn test_double_pause_is_idempotent() {
        let mut clock = GameClock::new();
        clock.sample(0);
        clock.pause();
        clock.sample(100);
        clock.pause();
        clock.sample(200);
        clock.resume();
        clock.resume();
        assert_eq!(clock.now(), 0);
    }

    #[test]
    fn test_samples_are_clamped_monotonic() {
        let mut clock = GameClock::new();
        clock.sample(1000);
        clock.sample(1500);
        assert_eq!(clock.sample(1200), 500);
    }

    #[test]
    fn test_scaled_interval_floor() {
        assert_eq!(scaled_interval_ms(120, 1.0), 120.0);
        assert_eq!(scaled_interval_ms(120, 0.5), 240.0);
        // Scale below the floor clamps instead of exploding
        assert_eq!(scaled_interval_ms(120, 0.0), 120.0 / MIN_TIME_SCALE);
    }
}
