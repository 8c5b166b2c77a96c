use std::{sync::Arc, time::Duration};

use super::keymap::Keymap;
use crate::session::WHEEL_COOLDOWN;

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub tick_rate: Duration,
    pub wheel_cooldown: Duration,
    pub show_help: bool,
    pub(crate) keymap: Arc<Keymap>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
            wheel_cooldown: WHEEL_COOLDOWN,
            show_help: true,
            keymap: Keymap::shared_default(),
        }
    }
}

impl BrowserOptions {
    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_wheel_cooldown(mut self, cooldown: Duration) -> Self {
        self.wheel_cooldown = cooldown;
        self
    }

    pub fn with_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }

    /// Replaces the built-in bindings with a keymap in the same JSON layout.
    pub fn with_keymap_json(mut self, source: &str) -> anyhow::Result<Self> {
        self.keymap = Arc::new(Keymap::from_json(source)?);
        Ok(self)
    }

    pub fn keymap(&self) -> Arc<Keymap> {
        Arc::clone(&self.keymap)
    }
}
