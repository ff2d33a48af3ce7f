//! Landing hero composition
//!
//! Scroll decides which slide is on screen; the statement sequence runs
//! while its slide is active. Once started, the sequence ignores scrolling
//! within the slide. Leaving the slide resets it.

use std::cell::Cell;
use std::rc::Rc;

use crate::consts::{CONVERGE_SLIDE, HERO_SLIDE_COUNT, SEQUENCE_SLIDE};
use crate::scroll::ScrollSlideController;
use crate::settings::Settings;
use crate::sim::{Geometry, PhaseSequencer, Script};

/// Notifications for the page around the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryEvent {
    SlideChanged(usize),
    /// The converge slide crossed (true) or uncrossed (false) its threshold
    Converged(bool),
    /// The reader scrolled past the hero (once per session)
    ScrollComplete,
    /// The statement sequence reached `Complete`
    SequenceComplete,
}

pub struct Scrollytelling {
    scroll: ScrollSlideController,
    sequencer: PhaseSequencer,
    sequence_slide: usize,
    active_slide: usize,
    converged: bool,
    sequence_done: Rc<Cell<bool>>,
    content_unlocked: bool,
    events: Vec<StoryEvent>,
}

impl Scrollytelling {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self::with_script(settings, Script::default(), seed)
    }

    pub fn with_script(settings: &Settings, script: Script, seed: u64) -> Self {
        let mut sequencer = PhaseSequencer::with_script(settings, script, seed);
        let sequence_done = Rc::new(Cell::new(false));
        let flag = sequence_done.clone();
        sequencer.on_complete(move || flag.set(true));

        Self {
            scroll: ScrollSlideController::new(HERO_SLIDE_COUNT, CONVERGE_SLIDE),
            sequencer,
            sequence_slide: SEQUENCE_SLIDE,
            active_slide: 0,
            converged: false,
            sequence_done,
            content_unlocked: false,
            events: Vec::new(),
        }
    }

    pub fn scroll(&self) -> &ScrollSlideController {
        &self.scroll
    }

    pub fn sequencer(&self) -> &PhaseSequencer {
        &self.sequencer
    }

    pub fn active_slide(&self) -> usize {
        self.active_slide
    }

    pub fn sequence_slide(&self) -> usize {
        self.sequence_slide
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Page content below the hero may be shown
    pub fn content_unlocked(&self) -> bool {
        self.content_unlocked
    }

    pub fn on_resize(&mut self, height: f32) {
        self.scroll.on_resize(height);
        let y = self.scroll.scroll_y();
        self.on_scroll(y);
    }

    pub fn on_scroll(&mut self, scroll_y: f32) {
        let update = self.scroll.on_scroll(scroll_y);

        if update.active_slide != self.active_slide {
            log::debug!("Slide {} -> {}", self.active_slide, update.active_slide);
            self.active_slide = update.active_slide;
            self.events.push(StoryEvent::SlideChanged(update.active_slide));
        }
        if update.is_converged != self.converged {
            self.converged = update.is_converged;
            self.events.push(StoryEvent::Converged(update.is_converged));
        }
        if update.completed_now {
            self.events.push(StoryEvent::ScrollComplete);
        }

        self.sequencer
            .set_active(self.active_slide == self.sequence_slide);
    }

    /// Advance the sequence clock
    pub fn advance(&mut self, dt_ms: u64, geometry: &dyn Geometry) {
        self.sequencer.advance(dt_ms, geometry);
        if self.sequence_done.replace(false) {
            self.content_unlocked = true;
            self.events.push(StoryEvent::SequenceComplete);
        }
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<StoryEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Phase, StaticLayout};
    use glam::Vec2;

    fn story() -> (Scrollytelling, StaticLayout) {
        let story = Scrollytelling::new(&Settings::default(), 77);
        let layout = StaticLayout::centered(&Script::default(), Vec2::new(1280.0, 800.0));
        (story, layout)
    }

    fn sequence_scroll() -> f32 {
        SEQUENCE_SLIDE as f32 * 800.0
    }

    #[test]
    fn test_sequence_runs_only_on_its_slide() {
        let (mut story, layout) = story();
        story.on_scroll(0.0);
        story.advance(10_000, &layout);
        assert_eq!(story.sequencer().phase(), Phase::Idle);

        story.on_scroll(sequence_scroll());
        assert!(story.sequencer().is_active());
        story.advance(500, &layout);
        assert_eq!(story.sequencer().phase(), Phase::Show1);
    }

    #[test]
    fn test_scrolling_within_slide_keeps_sequence() {
        let (mut story, layout) = story();
        story.on_scroll(sequence_scroll());
        story.advance(1500, &layout);
        let phase = story.sequencer().phase();

        story.on_scroll(sequence_scroll() + 200.0);
        story.on_scroll(sequence_scroll() - 100.0);
        assert_eq!(story.sequencer().phase(), phase);
    }

    #[test]
    fn test_leaving_slide_resets_sequence() {
        let (mut story, layout) = story();
        story.on_scroll(sequence_scroll());
        story.advance(5000, &layout);
        assert_ne!(story.sequencer().phase(), Phase::Idle);

        story.on_scroll(0.0);
        assert_eq!(story.sequencer().phase(), Phase::Idle);
        assert_eq!(story.sequencer().pending_timers(), 0);
    }

    #[test]
    fn test_events() {
        let (mut story, layout) = story();
        story.on_scroll(1001.0);
        assert_eq!(
            story.drain_events(),
            vec![StoryEvent::SlideChanged(1), StoryEvent::Converged(true)]
        );

        story.on_scroll(sequence_scroll());
        story.advance(30_000, &layout);
        let events = story.drain_events();
        assert!(events.contains(&StoryEvent::SlideChanged(SEQUENCE_SLIDE)));
        assert_eq!(events.last(), Some(&StoryEvent::SequenceComplete));
        assert!(story.content_unlocked());

        story.on_scroll(4000.0);
        story.on_scroll(4100.0);
        let events = story.drain_events();
        assert_eq!(events.iter().filter(|e| **e == StoryEvent::ScrollComplete).count(), 1);
        assert!(story.drain_events().is_empty());
    }

    #[test]
    fn test_resize_recomputes_slide() {
        let (mut story, _) = story();
        story.on_scroll(1000.0);
        assert_eq!(story.active_slide(), 1);
        story.on_resize(400.0);
        assert_eq!(story.active_slide(), 2);
    }
}
