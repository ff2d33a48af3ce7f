//! Layout measurements supplied by the rendering layer
//!
//! Any measurement may be missing (element not mounted yet). Callers must
//! treat `None` as "skip the dependent visual", never as an error.

use std::collections::HashMap;

use glam::Vec2;

/// Axis-aligned bounding box in CSS pixels, viewport relative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Zero-sized boxes come from detached or hidden elements
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A word inside one of the statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordRef {
    pub statement: usize,
    pub word: usize,
}

impl WordRef {
    pub const fn new(statement: usize, word: usize) -> Self {
        Self { statement, word }
    }

    /// DOM id of the span rendering this word
    pub fn element_id(&self) -> String {
        format!("stmt-{}-word-{}", self.statement, self.word)
    }
}

/// Position queries answered by the rendering layer
pub trait Geometry {
    /// Bounding box of a rendered word
    fn word_rect(&self, word: WordRef) -> Option<Rect>;

    /// Point the falling particles head toward
    fn content_anchor(&self) -> Option<Vec2> {
        None
    }
}

/// Nothing is mounted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl Geometry for NoGeometry {
    fn word_rect(&self, _word: WordRef) -> Option<Rect> {
        None
    }
}

/// Precomputed layout (headless runs and tests)
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    rects: HashMap<WordRef, Rect>,
    anchor: Option<Vec2>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay every statement out on one centered line per statement
    pub fn centered(script: &super::statement::Script, viewport: Vec2) -> Self {
        const CHAR_WIDTH: f32 = 18.0;
        const WORD_GAP: f32 = 14.0;
        const LINE_HEIGHT: f32 = 48.0;

        let mut layout = Self::new();
        for (s, statement) in script.statements.iter().enumerate() {
            let widths: Vec<f32> = statement
                .words
                .iter()
                .map(|w| w.chars().count() as f32 * CHAR_WIDTH)
                .collect();
            let gaps = widths.len().saturating_sub(1) as f32 * WORD_GAP;
            let line_width: f32 = widths.iter().sum::<f32>() + gaps;

            let mut x = (viewport.x - line_width) / 2.0;
            let y = (viewport.y - LINE_HEIGHT) / 2.0;
            for (w, width) in widths.iter().enumerate() {
                layout.insert(WordRef::new(s, w), Rect::new(x, y, *width, LINE_HEIGHT));
                x += width + WORD_GAP;
            }
        }
        layout.anchor = Some(Vec2::new(viewport.x / 2.0, viewport.y * 1.25));
        layout
    }

    pub fn insert(&mut self, word: WordRef, rect: Rect) {
        self.rects.insert(word, rect);
    }

    pub fn remove(&mut self, word: WordRef) {
        self.rects.remove(&word);
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = Some(anchor);
    }
}

impl Geometry for StaticLayout {
    fn word_rect(&self, word: WordRef) -> Option<Rect> {
        self.rects.get(&word).copied().filter(|r| !r.is_empty())
    }

    fn content_anchor(&self) -> Option<Vec2> {
        self.anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::statement::Script;

    #[test]
    fn test_rect_center() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_empty());
    }

    #[test]
    fn test_centered_layout_measures_every_word() {
        let script = Script::default();
        let layout = StaticLayout::centered(&script, Vec2::new(1280.0, 800.0));
        for (s, statement) in script.statements.iter().enumerate() {
            for w in 0..statement.words.len() {
                assert!(layout.word_rect(WordRef::new(s, w)).is_some());
            }
        }
        assert!(layout.content_anchor().is_some());
    }

    #[test]
    fn test_empty_rects_count_as_missing() {
        let mut layout = StaticLayout::new();
        layout.insert(WordRef::new(0, 0), Rect::new(5.0, 5.0, 0.0, 0.0));
        assert_eq!(layout.word_rect(WordRef::new(0, 0)), None);
        assert_eq!(NoGeometry.word_rect(WordRef::new(0, 0)), None);
    }

    #[test]
    fn test_element_id() {
        assert_eq!(WordRef::new(2, 4).element_id(), "stmt-2-word-4");
    }
}
