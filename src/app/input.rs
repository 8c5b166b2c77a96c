use std::time::Instant;

use crossterm::event::{KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};

use super::keymap::{Keymap, KeymapContext};
use crate::session::WheelGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxAction {
    Step(i32),
    Close,
    ToggleEdit,
    AddImage,
    RemoveImage,
    Zoom(i32),
    Confirm,
    Cancel,
}

/// Turns raw terminal events into lightbox actions.
pub(crate) struct InputRouter {
    wheel: WheelGate,
}

impl InputRouter {
    pub fn new(wheel: WheelGate) -> Self {
        Self { wheel }
    }

    pub fn key(
        &self,
        keymap: &Keymap,
        key: &KeyEvent,
        active: &[KeymapContext],
    ) -> Option<LightboxAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        keymap.classify(key, active)
    }

    /// Wheel down advances, wheel up goes back; one step per cooldown.
    pub fn mouse(&mut self, event: &MouseEvent, now: Instant) -> Option<LightboxAction> {
        let delta = match event.kind {
            MouseEventKind::ScrollDown => 1,
            MouseEventKind::ScrollUp => -1,
            _ => return None,
        };
        self.wheel.admit(now).then_some(LightboxAction::Step(delta))
    }

    pub fn reset_wheel(&mut self) {
        self.wheel.reset();
    }
}
