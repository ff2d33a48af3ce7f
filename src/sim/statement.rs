//! Statement copy and the renderers that drive the orb for each statement

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::exit::ExitGeometry;
use super::geometry::{Geometry, WordRef};
use super::orb::OrbControl;
use crate::consts::{ORB_BREATHE_SCALE, ORB_SNAP_SCALE, STATEMENT_COUNT};

/// One line of the sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub words: Vec<String>,
    /// Word that drifts left and snaps right
    pub left: usize,
    /// Word that drifts right and snaps left
    pub right: usize,
}

impl Statement {
    pub fn new(text: &str, left: usize, right: usize) -> Self {
        let words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        let last = words.len().saturating_sub(1);
        Self {
            left: left.min(last),
            right: right.min(last),
            words,
        }
    }

    /// Whether a word takes part in the drift/snap
    pub fn is_key_word(&self, word: usize) -> bool {
        word == self.left || word == self.right
    }

    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

/// The full sequence copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub statements: [Statement; STATEMENT_COUNT],
    pub reveal: String,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            statements: [
                Statement::new("If you knew who was in the room", 1, 7),
                Statement::new("If they knew why you came", 1, 4),
                Statement::new("If the right people simply met", 3, 5),
            ],
            reveal: "M33T".to_owned(),
        }
    }
}

/// Drives the orb while one statement is on screen
#[derive(Debug, Clone)]
pub struct StatementRenderer {
    index: usize,
    statement: Statement,
    orb: OrbControl,
    motion_scale: f32,
}

impl StatementRenderer {
    pub fn new(index: usize, statement: Statement, orb: OrbControl, motion_scale: f32) -> Self {
        Self {
            index,
            statement,
            orb,
            motion_scale,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn left_word(&self) -> WordRef {
        WordRef::new(self.index, self.statement.left)
    }

    pub fn right_word(&self) -> WordRef {
        WordRef::new(self.index, self.statement.right)
    }

    /// Statement starts fading in: park the orb on the left key word
    pub fn on_show(&self, geometry: &dyn Geometry) {
        self.orb.set_visible(true);
        self.orb.set_dimmed(false);
        self.orb.set_scale(1.0);
        match geometry.word_rect(self.left_word()) {
            Some(rect) => self.orb.set_position(rect.center() - Vec2::new(0.0, rect.height)),
            None => log::debug!("Statement {} shown before layout, orb not moved", self.index),
        }
    }

    pub fn on_breathe(&self) {
        self.orb.set_scale(ORB_BREATHE_SCALE);
    }

    /// Exit choreography starts: the orb dims and waits at the collapse point
    pub fn on_exit_start(&self, geometry: &ExitGeometry) {
        self.orb.set_dimmed(true);
        self.orb.set_scale(1.0);
        self.orb.set_position(geometry.collapse_point());
    }

    pub fn on_vibrate(&self) {
        if self.motion_scale > 0.0 {
            self.orb.trigger_shake();
        }
    }

    pub fn on_snap(&self) {
        self.orb.set_dimmed(false);
        self.orb.set_scale(ORB_SNAP_SCALE);
    }

    pub fn on_exit_complete(&self) {
        self.orb.set_scale(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::{NoGeometry, Rect, StaticLayout};

    #[test]
    fn test_statement_clamps_key_words() {
        let s = Statement::new("two words", 0, 9);
        assert_eq!(s.right, 1);
        assert!(s.is_key_word(0));
        assert!(s.is_key_word(1));
        assert_eq!(s.text(), "two words");
    }

    #[test]
    fn test_default_script_key_words_are_distinct() {
        for s in Script::default().statements.iter() {
            assert!(s.left < s.right, "{}", s.text());
            assert!(s.right < s.words.len());
        }
    }

    #[test]
    fn test_on_show_positions_orb_above_left_word() {
        let orb = OrbControl::new();
        let renderer = StatementRenderer::new(0, Script::default().statements[0].clone(), orb.clone(), 1.0);

        let mut layout = StaticLayout::new();
        layout.insert(WordRef::new(0, 1), Rect::new(100.0, 200.0, 40.0, 20.0));
        renderer.on_show(&layout);

        let snap = orb.snapshot();
        assert!(snap.visible);
        assert_eq!(snap.position, Vec2::new(120.0, 190.0));
    }

    #[test]
    fn test_on_show_without_layout_keeps_position() {
        let orb = OrbControl::new();
        orb.set_position(Vec2::new(7.0, 7.0));
        let renderer = StatementRenderer::new(1, Script::default().statements[1].clone(), orb.clone(), 1.0);
        renderer.on_show(&NoGeometry);
        assert!(orb.snapshot().visible);
        assert_eq!(orb.snapshot().position, Vec2::new(7.0, 7.0));
    }

    #[test]
    fn test_reduced_motion_skips_shake() {
        let orb = OrbControl::new();
        let renderer = StatementRenderer::new(0, Script::default().statements[0].clone(), orb.clone(), 0.0);
        renderer.on_vibrate();
        assert!(!orb.snapshot().shaking);
    }
}
