//! Sequence phases
//!
//! The sequence is a fixed linear list. Moving forward is always one index.

use serde::{Deserialize, Serialize};

/// Stage of a single statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Fading in
    Show,
    /// Held on screen
    Breathe,
    /// Running the exit choreography
    Exit,
}

/// Current phase of the statement sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Show1,
    Breathe1,
    Exit1,
    Show2,
    Breathe2,
    Exit2,
    Show3,
    Breathe3,
    Exit3,
    Reveal,
    Complete,
}

impl Phase {
    /// Every phase in sequence order
    pub const ORDER: [Phase; 12] = [
        Phase::Idle,
        Phase::Show1,
        Phase::Breathe1,
        Phase::Exit1,
        Phase::Show2,
        Phase::Breathe2,
        Phase::Exit2,
        Phase::Show3,
        Phase::Breathe3,
        Phase::Exit3,
        Phase::Reveal,
        Phase::Complete,
    ];

    pub fn index(self) -> usize {
        match self {
            Phase::Idle => 0,
            Phase::Show1 => 1,
            Phase::Breathe1 => 2,
            Phase::Exit1 => 3,
            Phase::Show2 => 4,
            Phase::Breathe2 => 5,
            Phase::Exit2 => 6,
            Phase::Show3 => 7,
            Phase::Breathe3 => 8,
            Phase::Exit3 => 9,
            Phase::Reveal => 10,
            Phase::Complete => 11,
        }
    }

    /// The phase after this one (`None` once complete)
    pub fn next(self) -> Option<Phase> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    /// Statement index (0-based) for statement phases
    pub fn statement(self) -> Option<usize> {
        match self {
            Phase::Show1 | Phase::Breathe1 | Phase::Exit1 => Some(0),
            Phase::Show2 | Phase::Breathe2 | Phase::Exit2 => Some(1),
            Phase::Show3 | Phase::Breathe3 | Phase::Exit3 => Some(2),
            _ => None,
        }
    }

    pub fn stage(self) -> Option<Stage> {
        match self {
            Phase::Show1 | Phase::Show2 | Phase::Show3 => Some(Stage::Show),
            Phase::Breathe1 | Phase::Breathe2 | Phase::Breathe3 => Some(Stage::Breathe),
            Phase::Exit1 | Phase::Exit2 | Phase::Exit3 => Some(Stage::Exit),
            _ => None,
        }
    }

    /// Stable name used for DOM classes and logs
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Show1 => "show1",
            Phase::Breathe1 => "breathe1",
            Phase::Exit1 => "exit1",
            Phase::Show2 => "show2",
            Phase::Breathe2 => "breathe2",
            Phase::Exit2 => "exit2",
            Phase::Show3 => "show3",
            Phase::Breathe3 => "breathe3",
            Phase::Exit3 => "exit3",
            Phase::Reveal => "reveal",
            Phase::Complete => "complete",
        }
    }
}
