//! M33T scrollytelling - scroll and time driven hero sequence
//!
//! Core modules:
//! - `scroll`: Scroll offset to active slide mapping
//! - `sim`: Deterministic sequencer (phases, exit choreography, orb, particles)
//! - `story`: Wires scroll position to sequencer activation
//! - `renderer`: WebGPU SDF rendering of the orb and particles
//! - `settings`: Timing, quality and accessibility preferences

pub mod renderer;
pub mod scroll;
pub mod settings;
pub mod sim;
pub mod story;

pub use scroll::{ScrollSlideController, ScrollUpdate};
pub use settings::{ParticleTiming, QualityPreset, SequenceTiming, Settings, SettingsError};
pub use story::{Scrollytelling, StoryEvent};

/// Sequencer configuration constants
pub mod consts {
    /// Viewport height used until the first resize arrives
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 800.0;
    /// Fraction of a viewport scrolled before the next slide counts as active
    pub const SLIDE_ACTIVATION_OFFSET: f32 = 0.4;
    /// Fraction of a viewport into the converge slide that marks convergence
    pub const CONVERGENCE_OFFSET: f32 = 0.25;
    /// Scroll depth (in viewports) past which the hero counts as finished
    pub const COMPLETION_DEPTH: f32 = 4.5;

    /// Number of slides on the landing hero
    pub const HERO_SLIDE_COUNT: usize = 6;
    /// Slide whose shapes merge as the user scrolls through it
    pub const CONVERGE_SLIDE: usize = 1;
    /// Slide that hosts the statement sequence
    pub const SEQUENCE_SLIDE: usize = 3;

    /// Number of statements in the sequence
    pub const STATEMENT_COUNT: usize = 3;
    /// Oscillation keyframes in the vibrate step
    pub const VIBRATION_KEYFRAMES: usize = 24;
    /// Base vibration amplitude (px)
    pub const VIBRATION_AMPLITUDE: f32 = 6.0;
    /// Horizontal distance each key word drifts away from its partner (px)
    pub const DRIFT_DISTANCE: f32 = 48.0;
    /// Orb shake duration (ms)
    pub const ORB_SHAKE_MS: u64 = 450;
    /// Orb scale while a statement is held
    pub const ORB_BREATHE_SCALE: f32 = 1.15;
    /// Orb scale at the moment two words snap together
    pub const ORB_SNAP_SCALE: f32 = 1.6;

    /// Particle explosion distance range (px)
    pub const PARTICLE_MIN_DISTANCE: f32 = 80.0;
    pub const PARTICLE_MAX_DISTANCE: f32 = 260.0;
    /// Lateral drift range while falling (px)
    pub const PARTICLE_MAX_DRIFT: f32 = 60.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Progress of `elapsed` through `duration`, clamped to [0, 1]
#[inline]
pub fn progress(elapsed_ms: u64, duration_ms: u64) -> f32 {
    if duration_ms == 0 {
        return 1.0;
    }
    (elapsed_ms as f32 / duration_ms as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(-10.0, 10.0, 1.0) - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(progress(0, 0), 1.0);
        assert_eq!(progress(50, 100), 0.5);
        assert_eq!(progress(500, 100), 1.0);
    }
}
