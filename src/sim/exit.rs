//! Exit choreography for a statement
//!
//! Four steps, each awaited before the next starts:
//! wave-fade the surrounding words, drift the key words apart, vibrate them,
//! then snap them together at the collapse point.

use glam::Vec2;
use rand::Rng;

use super::easing::Easing;
use super::geometry::{Geometry, Rect};
use super::statement::StatementRenderer;
use crate::consts::{DRIFT_DISTANCE, VIBRATION_AMPLITUDE, VIBRATION_KEYFRAMES};
use crate::settings::SequenceTiming;
use crate::{lerp, progress};

/// Step of the exit choreography
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStep {
    WaveFade,
    DriftApart,
    Vibrate,
    Snap,
}

impl ExitStep {
    pub const ORDER: [ExitStep; 4] = [
        ExitStep::WaveFade,
        ExitStep::DriftApart,
        ExitStep::Vibrate,
        ExitStep::Snap,
    ];

    pub fn next(self) -> Option<ExitStep> {
        match self {
            ExitStep::WaveFade => Some(ExitStep::DriftApart),
            ExitStep::DriftApart => Some(ExitStep::Vibrate),
            ExitStep::Vibrate => Some(ExitStep::Snap),
            ExitStep::Snap => None,
        }
    }

    pub fn duration_ms(self, timing: &SequenceTiming) -> u64 {
        match self {
            ExitStep::WaveFade => timing.wave_fade_ms,
            ExitStep::DriftApart => timing.drift_ms,
            ExitStep::Vibrate => timing.vibrate_ms,
            ExitStep::Snap => timing.snap_ms,
        }
    }

    pub fn easing(self) -> Easing {
        match self {
            ExitStep::WaveFade => Easing::Linear,
            ExitStep::DriftApart => Easing::SineInOut,
            ExitStep::Vibrate => Easing::Linear,
            ExitStep::Snap => Easing::MagneticSnap,
        }
    }
}

/// Measured boxes of the two key words
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitGeometry {
    pub left: Rect,
    pub right: Rect,
}

impl ExitGeometry {
    /// Both key words must be measurable
    pub fn measure(renderer: &StatementRenderer, geometry: &dyn Geometry) -> Option<Self> {
        let left = geometry.word_rect(renderer.left_word())?;
        let right = geometry.word_rect(renderer.right_word())?;
        Some(Self { left, right })
    }

    /// Midpoint between the key word centers
    pub fn collapse_point(&self) -> Vec2 {
        (self.left.center() + self.right.center()) / 2.0
    }

    /// Horizontal offsets that bring each word's center onto the collapse point
    pub fn snap_offsets(&self) -> (f32, f32) {
        let target = self.collapse_point().x;
        (target - self.left.center().x, target - self.right.center().x)
    }
}

/// Oscillating offsets around the drift position, alternating sign
pub fn vibration_keyframes<R: Rng + ?Sized>(rng: &mut R, count: usize, amplitude: f32) -> Vec<f32> {
    (0..count)
        .map(|i| {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            sign * amplitude * rng.random_range(0.75_f32..=1.25)
        })
        .collect()
}

/// Visual state of an exiting statement
#[derive(Debug, Clone, PartialEq)]
pub struct ExitFrame {
    pub step: ExitStep,
    /// Opacity per word (key words stay at 1)
    pub word_opacity: Vec<f32>,
    /// Horizontal offset of the left key word (px)
    pub left_offset: f32,
    /// Horizontal offset of the right key word (px)
    pub right_offset: f32,
}

/// A running exit choreography
#[derive(Debug, Clone)]
pub struct ExitAnimation {
    statement: usize,
    word_count: usize,
    key_words: (usize, usize),
    geometry: ExitGeometry,
    keyframes: Vec<f32>,
    timing: SequenceTiming,
    step: ExitStep,
    step_started_ms: u64,
}

impl ExitAnimation {
    /// Measure and prepare. `None` when a key word cannot be measured.
    pub fn start<R: Rng + ?Sized>(
        renderer: &StatementRenderer,
        geometry: &dyn Geometry,
        timing: SequenceTiming,
        motion_scale: f32,
        rng: &mut R,
        now_ms: u64,
    ) -> Option<Self> {
        let measured = ExitGeometry::measure(renderer, geometry)?;
        let statement = renderer.statement();
        Some(Self {
            statement: renderer.index(),
            word_count: statement.words.len(),
            key_words: (statement.left, statement.right),
            geometry: measured,
            keyframes: vibration_keyframes(rng, VIBRATION_KEYFRAMES, VIBRATION_AMPLITUDE * motion_scale),
            timing,
            step: ExitStep::WaveFade,
            step_started_ms: now_ms,
        })
    }

    pub fn statement(&self) -> usize {
        self.statement
    }

    pub fn step(&self) -> ExitStep {
        self.step
    }

    pub fn geometry(&self) -> &ExitGeometry {
        &self.geometry
    }

    pub fn keyframes(&self) -> &[f32] {
        &self.keyframes
    }

    /// Move to `step`; the previous step is considered finished
    pub fn begin_step(&mut self, step: ExitStep, now_ms: u64) {
        self.step = step;
        self.step_started_ms = now_ms;
    }

    /// Duration of the current step
    pub fn step_duration_ms(&self) -> u64 {
        self.step.duration_ms(&self.timing)
    }

    fn vibration_offset(&self, t: f32) -> f32 {
        if self.keyframes.is_empty() {
            return 0.0;
        }
        let pos = t * self.keyframes.len() as f32;
        let k = (pos.floor() as usize).min(self.keyframes.len() - 1);
        let from = self.keyframes[k];
        // Settle back onto the drift position after the last keyframe
        let to = self.keyframes.get(k + 1).copied().unwrap_or(0.0);
        lerp(from, to, pos - k as f32)
    }

    /// Sample the choreography at `now_ms`
    pub fn sample(&self, now_ms: u64) -> ExitFrame {
        let elapsed = now_ms.saturating_sub(self.step_started_ms);
        let t = self.step.easing().apply(progress(elapsed, self.step_duration_ms()));

        let fade = match self.step {
            ExitStep::WaveFade => t,
            _ => 1.0,
        };
        let n = self.word_count.max(1) as f32;
        let word_opacity = (0..self.word_count)
            .map(|i| {
                if i == self.key_words.0 || i == self.key_words.1 {
                    return 1.0;
                }
                // Each word starts fading a little after its left neighbour
                let start = i as f32 / n * 0.5;
                1.0 - ((fade - start) / 0.5).clamp(0.0, 1.0)
            })
            .collect();

        let (left_offset, right_offset) = match self.step {
            ExitStep::WaveFade => (0.0, 0.0),
            ExitStep::DriftApart => (-DRIFT_DISTANCE * t, DRIFT_DISTANCE * t),
            ExitStep::Vibrate => {
                let v = self.vibration_offset(t);
                (-DRIFT_DISTANCE + v, DRIFT_DISTANCE - v)
            }
            ExitStep::Snap => {
                let (left_target, right_target) = self.geometry.snap_offsets();
                (
                    lerp(-DRIFT_DISTANCE, left_target, t),
                    lerp(DRIFT_DISTANCE, right_target, t),
                )
            }
        };

        ExitFrame {
            step: self.step,
            word_opacity,
            left_offset,
            right_offset,
        }
    }
}
