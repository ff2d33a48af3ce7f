//! Shared orb presentation state
//!
//! The sequencer owns the orb. Statement renderers receive an `OrbControl`
//! clone and may only use the setters below.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::ORB_SHAKE_MS;

/// Orb visual state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbState {
    pub position: Vec2,
    pub visible: bool,
    pub scale: f32,
    pub dimmed: bool,
    pub shaking: bool,
    /// Remaining shake time (ms)
    pub shake_remaining_ms: u64,
}

impl Default for OrbState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            visible: false,
            scale: 1.0,
            dimmed: false,
            shaking: false,
            shake_remaining_ms: 0,
        }
    }
}

/// Narrow mutator handle over the orb
#[derive(Debug, Clone, Default)]
pub struct OrbControl {
    state: Rc<RefCell<OrbState>>,
}

impl OrbControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&self, position: Vec2) {
        self.state.borrow_mut().position = position;
    }

    pub fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    pub fn set_scale(&self, scale: f32) {
        self.state.borrow_mut().scale = scale.max(0.0);
    }

    pub fn set_dimmed(&self, dimmed: bool) {
        self.state.borrow_mut().dimmed = dimmed;
    }

    pub fn trigger_shake(&self) {
        let mut orb = self.state.borrow_mut();
        orb.shaking = true;
        orb.shake_remaining_ms = ORB_SHAKE_MS;
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> OrbState {
        *self.state.borrow()
    }

    /// Decay the shake (called by the owner each tick)
    pub(crate) fn tick(&self, dt_ms: u64) {
        let mut orb = self.state.borrow_mut();
        if orb.shaking {
            orb.shake_remaining_ms = orb.shake_remaining_ms.saturating_sub(dt_ms);
            if orb.shake_remaining_ms == 0 {
                orb.shaking = false;
            }
        }
    }

    /// Back to the initial hidden state (owner only)
    pub(crate) fn reset(&self) {
        *self.state.borrow_mut() = OrbState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let orb = OrbControl::new();
        let handle = orb.clone();
        handle.set_visible(true);
        handle.set_position(Vec2::new(10.0, 20.0));
        handle.set_scale(-2.0);

        let snap = orb.snapshot();
        assert!(snap.visible);
        assert_eq!(snap.position, Vec2::new(10.0, 20.0));
        assert_eq!(snap.scale, 0.0);
    }

    #[test]
    fn test_shake_decays() {
        let orb = OrbControl::new();
        orb.trigger_shake();
        assert!(orb.snapshot().shaking);

        orb.tick(ORB_SHAKE_MS - 1);
        assert!(orb.snapshot().shaking);
        orb.tick(1);
        assert!(!orb.snapshot().shaking);
    }

    #[test]
    fn test_reset_restores_default() {
        let orb = OrbControl::new();
        orb.set_visible(true);
        orb.set_dimmed(true);
        orb.trigger_shake();
        orb.reset();
        assert_eq!(orb.snapshot(), OrbState::default());
    }
}
