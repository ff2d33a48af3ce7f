//! Statement phase sequencer
//!
//! Advances through `Phase::ORDER` on a virtual clock. Every timer is tagged
//! with the activation epoch and the phase that scheduled it, and is dropped
//! on fire if either no longer matches. Deactivation clears all timers.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clock::TimerQueue;
use super::easing::Easing;
use super::exit::{ExitAnimation, ExitFrame, ExitStep};
use super::geometry::Geometry;
use super::orb::{OrbControl, OrbState};
use super::particles::{ParticleSample, ParticleSystem};
use super::phase::{Phase, Stage};
use super::statement::{Script, StatementRenderer};
use crate::progress;
use crate::settings::{SequenceTiming, Settings};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceEvent {
    /// Activation delay elapsed
    Begin,
    /// Statement fade-in finished
    FadeInDone,
    /// Statement hold finished
    HoldDone,
    /// An exit step finished
    ExitStepDone(ExitStep),
    /// Reveal hold finished
    RevealDone,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    epoch: u32,
    phase: Phase,
    event: SequenceEvent,
}

/// Render view of the statement on screen
#[derive(Debug, Clone, PartialEq)]
pub struct StatementView {
    pub index: usize,
    /// Whole-line opacity (fade-in)
    pub opacity: f32,
    pub word_opacity: Vec<f32>,
    /// Key word indices the offsets apply to
    pub left: usize,
    pub right: usize,
    pub left_offset: f32,
    pub right_offset: f32,
}

/// The statement sequence state machine
pub struct PhaseSequencer {
    timing: SequenceTiming,
    particle_count: usize,
    phase: Phase,
    phase_started_ms: u64,
    now_ms: u64,
    active: bool,
    epoch: u32,
    timers: TimerQueue<Scheduled>,
    orb: OrbControl,
    renderers: Vec<StatementRenderer>,
    reveal_text: String,
    exit: Option<ExitAnimation>,
    particles: ParticleSystem,
    rng: Pcg32,
    motion_scale: f32,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl PhaseSequencer {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self::with_script(settings, Script::default(), seed)
    }

    pub fn with_script(settings: &Settings, script: Script, seed: u64) -> Self {
        let orb = OrbControl::new();
        let motion_scale = settings.motion_scale();
        let renderers = script
            .statements
            .into_iter()
            .enumerate()
            .map(|(i, statement)| StatementRenderer::new(i, statement, orb.clone(), motion_scale))
            .collect();

        Self {
            timing: settings.timing,
            particle_count: settings.particle_count(),
            phase: Phase::Idle,
            phase_started_ms: 0,
            now_ms: 0,
            active: false,
            epoch: 0,
            timers: TimerQueue::new(),
            orb,
            renderers,
            reveal_text: script.reveal,
            exit: None,
            particles: ParticleSystem::new(settings.particle_timing),
            rng: Pcg32::seed_from_u64(seed),
            motion_scale,
            on_complete: None,
        }
    }

    /// Register the completion notification
    pub fn on_complete(&mut self, callback: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn timing(&self) -> &SequenceTiming {
        &self.timing
    }

    pub fn orb(&self) -> OrbState {
        self.orb.snapshot()
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particle_samples(&self) -> Vec<ParticleSample> {
        self.particles.sample(self.now_ms)
    }

    pub fn reveal_text(&self) -> &str {
        &self.reveal_text
    }

    /// Reveal copy is on screen from `Reveal` onward
    pub fn reveal_visible(&self) -> bool {
        self.phase.index() >= Phase::Reveal.index()
    }

    /// Timers still waiting to fire (sequence and particles)
    pub fn pending_timers(&self) -> usize {
        self.timers.len() + self.particles.pending_timers()
    }

    /// Current exit choreography frame
    pub fn exit_frame(&self) -> Option<ExitFrame> {
        self.exit.as_ref().map(|e| e.sample(self.now_ms))
    }

    /// What the active statement looks like right now
    pub fn statement_view(&self) -> Option<StatementView> {
        let index = self.phase.statement()?;
        let statement = self.renderers[index].statement();
        let (words, left, right) = (statement.words.len(), statement.left, statement.right);
        let elapsed = self.now_ms.saturating_sub(self.phase_started_ms);

        let view = match (self.phase.stage()?, self.exit_frame()) {
            (Stage::Show, _) => StatementView {
                index,
                opacity: Easing::CubicOut.apply(progress(elapsed, self.timing.fade_in_ms)),
                word_opacity: vec![1.0; words],
                left,
                right,
                left_offset: 0.0,
                right_offset: 0.0,
            },
            (Stage::Exit, Some(frame)) => StatementView {
                index,
                opacity: 1.0,
                word_opacity: frame.word_opacity,
                left,
                right,
                left_offset: frame.left_offset,
                right_offset: frame.right_offset,
            },
            _ => StatementView {
                index,
                opacity: 1.0,
                word_opacity: vec![1.0; words],
                left,
                right,
                left_offset: 0.0,
                right_offset: 0.0,
            },
        };
        Some(view)
    }

    /// Activation signal. Rising edge starts the sequence, falling edge resets it.
    pub fn set_active(&mut self, active: bool) {
        if active == self.active {
            return;
        }
        self.active = active;
        if active {
            log::info!("Sequence activated");
            self.schedule(self.timing.activation_delay_ms, SequenceEvent::Begin);
        } else {
            log::info!("Sequence deactivated at {}", self.phase.as_str());
            self.reset();
        }
    }

    /// Back to `Idle` with every timer and piece of visual state cleared
    pub fn reset(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.timers.clear();
        self.particles.reset();
        self.exit = None;
        self.orb.reset();
        self.phase = Phase::Idle;
        self.phase_started_ms = self.now_ms;
    }

    /// Move the virtual clock forward, firing every timer that comes due
    pub fn advance(&mut self, dt_ms: u64, geometry: &dyn Geometry) {
        let target = self.now_ms.saturating_add(dt_ms);

        while let Some((due, scheduled)) = self.timers.pop_due(target) {
            self.orb.tick(due - self.now_ms);
            self.now_ms = due;
            self.particles.advance_to(due);

            if scheduled.epoch != self.epoch || scheduled.phase != self.phase {
                log::trace!("Dropping stale {:?} from {:?}", scheduled.event, scheduled.phase);
                continue;
            }
            self.handle(scheduled.event, geometry);
        }

        self.orb.tick(target - self.now_ms);
        self.now_ms = target;
        self.particles.advance_to(target);
    }

    fn schedule(&mut self, delay_ms: u64, event: SequenceEvent) {
        let scheduled = Scheduled {
            epoch: self.epoch,
            phase: self.phase,
            event,
        };
        self.timers.schedule(self.now_ms, delay_ms, scheduled);
    }

    fn handle(&mut self, event: SequenceEvent, geometry: &dyn Geometry) {
        match event {
            SequenceEvent::Begin
            | SequenceEvent::FadeInDone
            | SequenceEvent::HoldDone
            | SequenceEvent::RevealDone => self.advance_phase(geometry),
            SequenceEvent::ExitStepDone(step) => self.finish_exit_step(step, geometry),
        }
    }

    /// The only forward transition: exactly one step along `Phase::ORDER`
    fn advance_phase(&mut self, geometry: &dyn Geometry) {
        let Some(next) = self.phase.next() else {
            log::warn!("Ignoring advance past {}", self.phase.as_str());
            return;
        };
        debug_assert_eq!(next.index(), self.phase.index() + 1);

        log::info!("Phase {} -> {} at {}ms", self.phase.as_str(), next.as_str(), self.now_ms);
        self.phase = next;
        self.phase_started_ms = self.now_ms;
        self.enter_phase(geometry);
    }

    fn enter_phase(&mut self, geometry: &dyn Geometry) {
        let phase = self.phase;
        match (phase.statement(), phase.stage()) {
            (Some(i), Some(Stage::Show)) => {
                self.renderers[i].on_show(geometry);
                self.schedule(self.timing.fade_in_ms, SequenceEvent::FadeInDone);
            }
            (Some(i), Some(Stage::Breathe)) => {
                self.renderers[i].on_breathe();
                self.schedule(self.timing.hold_ms, SequenceEvent::HoldDone);
            }
            (Some(i), Some(Stage::Exit)) => self.start_exit(i, geometry),
            _ => match phase {
                Phase::Reveal => self.start_reveal(geometry),
                Phase::Complete => self.complete(),
                _ => {}
            },
        }
    }

    fn start_exit(&mut self, index: usize, geometry: &dyn Geometry) {
        let renderer = &self.renderers[index];
        let started = ExitAnimation::start(
            renderer,
            geometry,
            self.timing,
            self.motion_scale,
            &mut self.rng,
            self.now_ms,
        );

        match started {
            Some(exit) => {
                renderer.on_exit_start(exit.geometry());
                let duration = exit.step_duration_ms();
                self.exit = Some(exit);
                self.schedule(duration, SequenceEvent::ExitStepDone(ExitStep::WaveFade));
            }
            None => {
                // Nothing to animate against; keep the sequence moving
                log::debug!("Statement {} not measurable, skipping exit choreography", index);
                renderer.on_exit_complete();
                self.finish_exit(index, geometry);
            }
        }
    }

    fn finish_exit_step(&mut self, step: ExitStep, geometry: &dyn Geometry) {
        let Some(index) = self.phase.statement() else {
            return;
        };

        match step.next() {
            Some(next) => {
                let renderer = &self.renderers[index];
                match next {
                    ExitStep::Vibrate => renderer.on_vibrate(),
                    ExitStep::Snap => renderer.on_snap(),
                    _ => {}
                }
                let duration = match self.exit.as_mut() {
                    Some(exit) => {
                        exit.begin_step(next, self.now_ms);
                        exit.step_duration_ms()
                    }
                    None => 0,
                };
                self.schedule(duration, SequenceEvent::ExitStepDone(next));
            }
            None => {
                self.renderers[index].on_exit_complete();
                self.finish_exit(index, geometry);
            }
        }
    }

    fn finish_exit(&mut self, index: usize, geometry: &dyn Geometry) {
        log::debug!("Statement {} exit complete", index);
        self.exit = None;
        self.advance_phase(geometry);
    }

    fn start_reveal(&mut self, geometry: &dyn Geometry) {
        let origin = self.orb.snapshot().position;
        let anchor = geometry
            .content_anchor()
            .unwrap_or(origin + Vec2::new(0.0, crate::consts::DEFAULT_VIEWPORT_HEIGHT));

        self.orb.set_visible(false);
        self.particles
            .trigger(self.particle_count, origin, anchor, self.now_ms, &mut self.rng);
        self.schedule(self.timing.reveal_ms, SequenceEvent::RevealDone);
    }

    fn complete(&mut self) {
        log::info!("Sequence complete");
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }
}
