//! Reveal particle burst
//!
//! One-shot explosion from the orb: burst upward, linger, then fall toward
//! the content anchor. Every particle is generated at trigger time; the
//! burst's total lifetime depends only on `ParticleTiming`.

use glam::Vec2;
use rand::Rng;

use super::clock::TimerQueue;
use super::easing::Easing;
use crate::consts::{PARTICLE_MAX_DISTANCE, PARTICLE_MAX_DRIFT, PARTICLE_MIN_DISTANCE};
use crate::progress;
use crate::settings::ParticleTiming;

/// Sub-phase of the burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticlePhase {
    Idle,
    Explode,
    Linger,
    Fall,
    Complete,
}

/// A burst particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u32,
    /// Offset from the burst origin at the end of the explosion (y < 0)
    pub explosion: Vec2,
    pub fall_delay_ms: u64,
    pub fall_duration_ms: u64,
    /// Lateral drift while falling (px)
    pub drift_x: f32,
    pub size: f32,
}

/// Render-ready particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSample {
    pub id: u32,
    pub position: Vec2,
    pub alpha: f32,
    pub size: f32,
}

/// Extra outward travel while lingering, as a fraction of the explosion
const LINGER_SPREAD: f32 = 0.08;

/// Generate `count` particles. Angles stay in the upper half-plane.
pub fn generate_particles<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    timing: &ParticleTiming,
) -> Vec<Particle> {
    let timing = timing.validated();
    (0..count)
        .map(|i| {
            let angle = rng.random_range(0.0..std::f32::consts::PI);
            let distance = rng.random_range(PARTICLE_MIN_DISTANCE..PARTICLE_MAX_DISTANCE);
            // Upward in screen space; sin(0) would give zero, push it up a pixel
            let y = -(angle.sin() * distance).abs().max(1.0);
            Particle {
                id: i as u32,
                explosion: Vec2::new(angle.cos() * distance, y),
                fall_delay_ms: rng.random_range(0..=timing.max_fall_delay_ms),
                fall_duration_ms: rng
                    .random_range(timing.min_fall_duration_ms..=timing.max_fall_duration_ms),
                drift_x: rng.random_range(-PARTICLE_MAX_DRIFT..=PARTICLE_MAX_DRIFT),
                size: rng.random_range(2.0_f32..5.0),
            }
        })
        .collect()
}

/// The burst and its sub-phase timers
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    timing: ParticleTiming,
    phase: ParticlePhase,
    particles: Vec<Particle>,
    origin: Vec2,
    anchor: Vec2,
    triggered_ms: u64,
    timers: TimerQueue<ParticlePhase>,
}

impl ParticleSystem {
    pub fn new(timing: ParticleTiming) -> Self {
        Self {
            timing: timing.validated(),
            phase: ParticlePhase::Idle,
            particles: Vec::new(),
            origin: Vec2::ZERO,
            anchor: Vec2::ZERO,
            triggered_ms: 0,
            timers: TimerQueue::new(),
        }
    }

    pub fn phase(&self) -> ParticlePhase {
        self.phase
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Trigger to removal
    pub fn lifetime_ms(&self) -> u64 {
        self.timing.lifetime_ms()
    }

    /// Start a burst at `origin`, falling toward `anchor`
    pub fn trigger<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        origin: Vec2,
        anchor: Vec2,
        now_ms: u64,
        rng: &mut R,
    ) {
        self.reset();
        if count == 0 {
            self.phase = ParticlePhase::Complete;
            return;
        }

        self.particles = generate_particles(rng, count, &self.timing);
        self.origin = origin;
        self.anchor = anchor;
        self.triggered_ms = now_ms;
        self.phase = ParticlePhase::Explode;

        let linger_at = self.timing.explode_ms;
        let fall_at = linger_at + self.timing.linger_ms;
        self.timers.schedule(now_ms, linger_at, ParticlePhase::Linger);
        self.timers.schedule(now_ms, fall_at, ParticlePhase::Fall);
        self.timers.schedule(now_ms, self.timing.lifetime_ms(), ParticlePhase::Complete);
        log::debug!("Particle burst: {} particles at {:?}", count, origin);
    }

    /// Fire sub-phase timers due at or before `now_ms`
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((_, phase)) = self.timers.pop_due(now_ms) {
            self.phase = phase;
            if phase == ParticlePhase::Complete {
                self.particles.clear();
                log::debug!("Particle burst complete");
            }
        }
    }

    /// Drop the burst and any pending timers
    pub fn reset(&mut self) {
        self.timers.clear();
        self.particles.clear();
        self.phase = ParticlePhase::Idle;
    }

    fn linger_position(&self, p: &Particle, t: f32) -> Vec2 {
        self.origin + p.explosion * (1.0 + LINGER_SPREAD * Easing::CubicOut.apply(t))
    }

    /// Positions for rendering at `now_ms`
    pub fn sample(&self, now_ms: u64) -> Vec<ParticleSample> {
        let elapsed = now_ms.saturating_sub(self.triggered_ms);
        let fall_start = self.timing.explode_ms + self.timing.linger_ms;

        self.particles
            .iter()
            .map(|p| {
                let (position, alpha) = match self.phase {
                    ParticlePhase::Idle | ParticlePhase::Complete => (self.origin, 0.0),
                    ParticlePhase::Explode => {
                        let t = Easing::CubicOut.apply(progress(elapsed, self.timing.explode_ms));
                        (self.origin + p.explosion * t, 1.0)
                    }
                    ParticlePhase::Linger => {
                        let t = progress(elapsed.saturating_sub(self.timing.explode_ms), self.timing.linger_ms);
                        (self.linger_position(p, t), 1.0)
                    }
                    ParticlePhase::Fall => {
                        let from = self.linger_position(p, 1.0);
                        let local = elapsed.saturating_sub(fall_start + p.fall_delay_ms);
                        let t = progress(local, p.fall_duration_ms);
                        let target = Vec2::new(from.x + p.drift_x, self.anchor.y);
                        (from.lerp(target, Easing::CubicIn.apply(t)), 1.0 - t)
                    }
                };
                ParticleSample {
                    id: p.id,
                    position,
                    alpha,
                    size: p.size,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn burst(count: usize) -> ParticleSystem {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut system = ParticleSystem::new(ParticleTiming::default());
        system.trigger(count, Vec2::new(400.0, 300.0), Vec2::new(400.0, 1000.0), 0, &mut rng);
        system
    }

    #[test]
    fn test_generation_ranges() {
        let timing = ParticleTiming::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let particles = generate_particles(&mut rng, 200, &timing);
        assert_eq!(particles.len(), 200);
        for p in &particles {
            assert!(p.explosion.y < 0.0);
            assert!(p.explosion.length() <= PARTICLE_MAX_DISTANCE + 1.0);
            assert!(p.fall_delay_ms <= 1500);
            assert!((1500..=3500).contains(&p.fall_duration_ms));
            assert!(p.drift_x.abs() <= PARTICLE_MAX_DRIFT);
        }
    }

    #[test]
    fn test_same_seed_same_particles() {
        let timing = ParticleTiming::default();
        let a = generate_particles(&mut Pcg32::seed_from_u64(5), 35, &timing);
        let b = generate_particles(&mut Pcg32::seed_from_u64(5), 35, &timing);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sub_phase_progression() {
        let mut system = burst(28);
        assert_eq!(system.phase(), ParticlePhase::Explode);
        assert_eq!(system.pending_timers(), 3);

        system.advance_to(399);
        assert_eq!(system.phase(), ParticlePhase::Explode);
        system.advance_to(400);
        assert_eq!(system.phase(), ParticlePhase::Linger);
        system.advance_to(2800);
        assert_eq!(system.phase(), ParticlePhase::Fall);
        assert_eq!(system.particles().len(), 28);

        system.advance_to(system.lifetime_ms());
        assert_eq!(system.phase(), ParticlePhase::Complete);
        assert!(system.particles().is_empty());
        assert_eq!(system.pending_timers(), 0);
    }

    #[test]
    fn test_reset_drops_timers() {
        let mut system = burst(200);
        system.reset();
        assert_eq!(system.pending_timers(), 0);
        system.advance_to(100_000);
        assert_eq!(system.phase(), ParticlePhase::Idle);
        assert!(system.particles().is_empty());
    }

    #[test]
    fn test_zero_count_completes_immediately() {
        let system = burst(0);
        assert_eq!(system.phase(), ParticlePhase::Complete);
        assert_eq!(system.pending_timers(), 0);
    }

    #[test]
    fn test_explosion_moves_up_then_falls_to_anchor() {
        let mut system = burst(50);
        let origin_y = 300.0;

        system.advance_to(400);
        // Explosion ended on the Linger boundary
        for s in system.sample(400) {
            assert!(s.position.y < origin_y);
            assert_eq!(s.alpha, 1.0);
        }

        system.advance_to(2800);
        let landed_at = 2800 + 1500 + 3500;
        for s in system.sample(landed_at) {
            assert!((s.position.y - 1000.0).abs() < 0.01);
            assert!(s.alpha.abs() < 0.001);
        }
    }

    #[test]
    fn test_inverted_timing_does_not_panic() {
        let timing = ParticleTiming {
            min_fall_duration_ms: 4000,
            max_fall_duration_ms: 1000,
            ..ParticleTiming::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut system = ParticleSystem::new(timing);
        system.trigger(200, Vec2::ZERO, Vec2::new(0.0, 800.0), 0, &mut rng);
        assert_eq!(system.particles().len(), 200);
        assert!(system
            .particles()
            .iter()
            .all(|p| (1000..=4000).contains(&p.fall_duration_ms)));

        system.advance_to(system.lifetime_ms());
        assert_eq!(system.phase(), ParticlePhase::Complete);
    }

    proptest! {
        #[test]
        fn explosion_is_always_upward(seed in any::<u64>(), count in 0usize..300) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let particles = generate_particles(&mut rng, count, &ParticleTiming::default());
            prop_assert_eq!(particles.len(), count);
            prop_assert!(particles.iter().all(|p| p.explosion.y < 0.0));
        }
    }
}
