//! Deterministic sequencing module
//!
//! All timing logic lives here. This module must stay pure and deterministic:
//! - Virtual clock only (the caller passes elapsed time in)
//! - Seeded RNG only
//! - Layout arrives through the `Geometry` trait, never read directly

pub mod clock;
pub mod easing;
pub mod exit;
pub mod geometry;
pub mod orb;
pub mod particles;
pub mod phase;
pub mod sequencer;
pub mod statement;

pub use clock::TimerQueue;
pub use easing::Easing;
pub use exit::{ExitAnimation, ExitFrame, ExitGeometry, ExitStep};
pub use geometry::{Geometry, NoGeometry, Rect, StaticLayout, WordRef};
pub use orb::{OrbControl, OrbState};
pub use particles::{Particle, ParticlePhase, ParticleSample, ParticleSystem, generate_particles};
pub use phase::{Phase, Stage};
pub use sequencer::{PhaseSequencer, StatementView};
pub use statement::{Script, Statement, StatementRenderer};
