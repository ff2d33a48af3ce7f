//! Sequence settings and preferences
//!
//! Persisted in LocalStorage on the web; defaults everywhere else.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings storage unavailable")]
    StorageUnavailable,
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particles spawned by the reveal burst
    pub fn particle_count(&self) -> usize {
        match self {
            QualityPreset::Low => 28,
            QualityPreset::Medium => 35,
            QualityPreset::High => 200,
        }
    }
}

/// Phase durations of the statement sequence (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceTiming {
    /// Delay between activation and the first statement
    pub activation_delay_ms: u64,
    /// Statement fade-in
    pub fade_in_ms: u64,
    /// Hold before the exit choreography starts
    pub hold_ms: u64,
    /// Exit step 1: surrounding words fade in a wave
    pub wave_fade_ms: u64,
    /// Exit step 2: key words drift apart
    pub drift_ms: u64,
    /// Exit step 3: key words vibrate
    pub vibrate_ms: u64,
    /// Exit step 4: key words snap together
    pub snap_ms: u64,
    /// Reveal hold before the sequence completes
    pub reveal_ms: u64,
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self {
            activation_delay_ms: 500,
            fade_in_ms: 600,
            hold_ms: 3000,
            wave_fade_ms: 600,
            drift_ms: 800,
            vibrate_ms: 1200,
            snap_ms: 400,
            reveal_ms: 2000,
        }
    }
}

impl SequenceTiming {
    /// Total duration of one exit choreography
    pub fn exit_total_ms(&self) -> u64 {
        self.wave_fade_ms + self.drift_ms + self.vibrate_ms + self.snap_ms
    }
}

/// Particle burst timing (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTiming {
    pub explode_ms: u64,
    pub linger_ms: u64,
    /// Upper bound of the per-particle fall delay
    pub max_fall_delay_ms: u64,
    pub min_fall_duration_ms: u64,
    pub max_fall_duration_ms: u64,
}

impl Default for ParticleTiming {
    fn default() -> Self {
        Self {
            explode_ms: 400,
            linger_ms: 2400,
            max_fall_delay_ms: 1500,
            min_fall_duration_ms: 1500,
            max_fall_duration_ms: 3500,
        }
    }
}

impl ParticleTiming {
    /// Length of the fall sub-phase: the slowest particle lands at its end
    pub fn fall_window_ms(&self) -> u64 {
        self.max_fall_delay_ms + self.max_fall_duration_ms
    }

    /// Total lifetime of a burst from trigger to removal
    pub fn lifetime_ms(&self) -> u64 {
        self.explode_ms + self.linger_ms + self.fall_window_ms()
    }

    /// Same timing with the fall duration bounds in order
    pub fn validated(self) -> Self {
        if self.min_fall_duration_ms <= self.max_fall_duration_ms {
            return self;
        }
        log::warn!(
            "Fall duration bounds inverted ({} > {}), swapping",
            self.min_fall_duration_ms,
            self.max_fall_duration_ms
        );
        Self {
            min_fall_duration_ms: self.max_fall_duration_ms,
            max_fall_duration_ms: self.min_fall_duration_ms,
            ..self
        }
    }
}

/// Landing page preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Reveal particle burst
    pub particles: bool,
    /// Reduced motion (no vibration, no orb shake)
    pub reduced_motion: bool,
    /// Statement sequence timing
    pub timing: SequenceTiming,
    /// Particle burst timing
    pub particle_timing: ParticleTiming,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            particles: true,
            reduced_motion: false,
            timing: SequenceTiming::default(),
            particle_timing: ParticleTiming::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective particle count (0 when the burst is disabled)
    pub fn particle_count(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.particle_count()
        }
    }

    /// Effective vibration amplitude multiplier
    pub fn motion_scale(&self) -> f32 {
        if self.reduced_motion { 0.0 } else { 1.0 }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.particle_timing = settings.particle_timing.validated();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "m33t_scrolly_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), SettingsError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(SettingsError::StorageUnavailable)?;

        let json = self.to_json()?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| SettingsError::StorageUnavailable)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<(), SettingsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing_matches_sequence() {
        let timing = SequenceTiming::default();
        assert_eq!(timing.activation_delay_ms, 500);
        assert_eq!(timing.fade_in_ms, 600);
        assert_eq!(timing.hold_ms, 3000);
        assert_eq!(timing.reveal_ms, 2000);
        assert_eq!(timing.exit_total_ms(), 3000);
    }

    #[test]
    fn test_particle_lifetime_is_bounded() {
        let timing = ParticleTiming::default();
        assert_eq!(timing.fall_window_ms(), 5000);
        assert_eq!(timing.lifetime_ms(), 7800);
    }

    #[test]
    fn test_particle_count_per_preset() {
        assert_eq!(Settings::from_preset(QualityPreset::High).particle_count(), 200);
        assert_eq!(Settings::from_preset(QualityPreset::Medium).particle_count(), 35);
        assert_eq!(Settings::from_preset(QualityPreset::Low).particle_count(), 28);

        let mut off = Settings::default();
        off.particles = false;
        assert_eq!(off.particle_count(), 0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{"quality":"Low","timing":{"hold_ms":1000}}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::Low);
        assert_eq!(settings.timing.hold_ms, 1000);
        assert_eq!(settings.timing.fade_in_ms, 600);
        assert!(settings.particles);
    }

    #[test]
    fn test_inverted_fall_bounds_are_swapped() {
        let settings = Settings::from_json(
            r#"{"particle_timing":{"min_fall_duration_ms":4000,"max_fall_duration_ms":1000}}"#,
        )
        .unwrap();
        assert_eq!(settings.particle_timing.min_fall_duration_ms, 1000);
        assert_eq!(settings.particle_timing.max_fall_duration_ms, 4000);
        assert_eq!(settings.particle_timing.fall_window_ms(), 1500 + 4000);

        let ordered = ParticleTiming::default();
        assert_eq!(ordered.validated(), ordered);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = Settings::from_json("{not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip_preserves_preset() {
        let settings = Settings::from_preset(QualityPreset::Medium);
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap().quality, QualityPreset::Medium);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }

    #[test]
    fn test_reduced_motion_zeroes_motion_scale() {
        let mut settings = Settings::default();
        assert_eq!(settings.motion_scale(), 1.0);
        settings.reduced_motion = true;
        assert_eq!(settings.motion_scale(), 0.0);
    }
}
