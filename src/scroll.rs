//! Scroll offset to slide mapping
//!
//! Each slide is one viewport tall. The active slide flips once the next
//! slide has scrolled 40% of a viewport into view.

use crate::consts::*;

/// Derived values for one scroll event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollUpdate {
    /// Slide currently considered on screen
    pub active_slide: usize,
    /// The converge slide's merge animation has passed its threshold
    pub is_converged: bool,
    /// True only on the event that first crosses the completion depth
    pub completed_now: bool,
}

/// Active slide for a scroll offset: `clamp(floor((s + 0.4h) / h), 0, n - 1)`
pub fn active_slide(scroll_y: f32, viewport_height: f32, slide_count: usize) -> usize {
    if slide_count == 0 {
        return 0;
    }
    let raw = ((scroll_y + viewport_height * SLIDE_ACTIVATION_OFFSET) / viewport_height).floor();
    if raw <= 0.0 || raw.is_nan() {
        0
    } else {
        (raw as usize).min(slide_count - 1)
    }
}

/// Tracks scroll position and reports slide-level state
#[derive(Debug, Clone)]
pub struct ScrollSlideController {
    slide_count: usize,
    converge_slide: usize,
    viewport_height: f32,
    scroll_y: f32,
    complete_reported: bool,
}

impl ScrollSlideController {
    pub fn new(slide_count: usize, converge_slide: usize) -> Self {
        Self {
            slide_count: slide_count.max(1),
            converge_slide,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_y: 0.0,
            complete_reported: false,
        }
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    /// Update the viewport height (unusable values fall back to the default)
    pub fn on_resize(&mut self, height: f32) {
        self.viewport_height = if height.is_finite() && height > 0.0 {
            height
        } else {
            DEFAULT_VIEWPORT_HEIGHT
        };
    }

    /// Process a scroll event
    pub fn on_scroll(&mut self, scroll_y: f32) -> ScrollUpdate {
        self.scroll_y = if scroll_y.is_finite() { scroll_y.max(0.0) } else { 0.0 };
        let vh = self.viewport_height;

        let converge_start = self.converge_slide as f32 * vh;
        let is_converged = self.scroll_y > converge_start + CONVERGENCE_OFFSET * vh;

        // Edge triggered: report once per session
        let past_end = self.scroll_y > COMPLETION_DEPTH * vh;
        let completed_now = past_end && !self.complete_reported;
        if completed_now {
            self.complete_reported = true;
            log::debug!("Scroll completion depth reached at {}", self.scroll_y);
        }

        ScrollUpdate {
            active_slide: active_slide(self.scroll_y, vh, self.slide_count),
            is_converged,
            completed_now,
        }
    }

    /// Progress through the active slide in [0, 1)
    pub fn slide_progress(&self) -> f32 {
        let shifted = self.scroll_y / self.viewport_height + SLIDE_ACTIVATION_OFFSET;
        let active = active_slide(self.scroll_y, self.viewport_height, self.slide_count) as f32;
        (shifted - active).clamp(0.0, 1.0)
    }

    /// Whether completion has already been reported this session
    pub fn completion_reported(&self) -> bool {
        self.complete_reported
    }

    /// Re-arm the completion report
    pub fn reset_session(&mut self) {
        self.complete_reported = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_active_slide_flips_at_sixty_percent() {
        assert_eq!(active_slide(0.0, 800.0, 6), 0);
        assert_eq!(active_slide(479.0, 800.0, 6), 0);
        assert_eq!(active_slide(480.0, 800.0, 6), 1);
        assert_eq!(active_slide(1280.0, 800.0, 6), 2);
    }

    #[test]
    fn test_active_slide_clamps_to_last() {
        assert_eq!(active_slide(100_000.0, 800.0, 6), 5);
        assert_eq!(active_slide(-500.0, 800.0, 6), 0);
    }

    #[test]
    fn test_resize_falls_back_to_default() {
        let mut ctrl = ScrollSlideController::new(6, 1);
        ctrl.on_resize(0.0);
        assert_eq!(ctrl.viewport_height(), DEFAULT_VIEWPORT_HEIGHT);
        ctrl.on_resize(f32::NAN);
        assert_eq!(ctrl.viewport_height(), DEFAULT_VIEWPORT_HEIGHT);
        ctrl.on_resize(1000.0);
        assert_eq!(ctrl.viewport_height(), 1000.0);
    }

    #[test]
    fn test_convergence_threshold() {
        let mut ctrl = ScrollSlideController::new(6, 1);
        // Converge slide starts at 800, threshold at 800 + 200
        assert!(!ctrl.on_scroll(1000.0).is_converged);
        assert!(ctrl.on_scroll(1001.0).is_converged);
        assert!(!ctrl.on_scroll(10.0).is_converged);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut ctrl = ScrollSlideController::new(6, 1);
        assert!(!ctrl.on_scroll(3600.0).completed_now);

        let fired: usize = [3601.0, 3700.0, 4000.0, 3650.0, 5000.0]
            .iter()
            .filter(|&&y| ctrl.on_scroll(y).completed_now)
            .count();
        assert_eq!(fired, 1);

        // Scrolling back up and down again does not re-fire
        ctrl.on_scroll(0.0);
        assert!(!ctrl.on_scroll(4000.0).completed_now);

        ctrl.reset_session();
        assert!(ctrl.on_scroll(4000.0).completed_now);
    }

    #[test]
    fn test_slide_progress() {
        let mut ctrl = ScrollSlideController::new(6, 1);
        ctrl.on_scroll(480.0);
        assert!(ctrl.slide_progress().abs() < 0.001);
        ctrl.on_scroll(880.0);
        assert!((ctrl.slide_progress() - 0.5).abs() < 0.001);
    }

    proptest! {
        #[test]
        fn active_slide_is_monotonic(
            s in 0.0f32..20_000.0,
            delta in 0.0f32..5_000.0,
            h in 1.0f32..4_000.0,
            n in 1usize..12,
        ) {
            prop_assert!(active_slide(s, h, n) <= active_slide(s + delta, h, n));
        }

        #[test]
        fn active_slide_stays_in_range(s in 0.0f32..1e7, h in 1.0f32..4_000.0, n in 1usize..12) {
            prop_assert!(active_slide(s, h, n) < n);
        }
    }
}
