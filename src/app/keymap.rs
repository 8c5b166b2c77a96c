use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result, anyhow, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use super::input::LightboxAction;

macro_rules! keymap_source {
    () => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/keymap/lightbox.keymap.json"
        ))
    };
}

/// Which group of bindings is live. Browsing bindings are always live outside a
/// prompt; editing bindings only while edit mode is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeymapContext {
    Browse,
    Edit,
    Confirm,
}

impl KeymapContext {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "browse" => Some(KeymapContext::Browse),
            "edit" => Some(KeymapContext::Edit),
            "confirm" => Some(KeymapContext::Confirm),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawEntry {
    id: String,
    description: String,
    contexts: Vec<String>,
    action: RawAction,
    combos: Vec<String>,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum RawAction {
    Step { delta: i32 },
    Close,
    ToggleEdit,
    AddImage,
    RemoveImage,
    Zoom { steps: i32 },
    Confirm,
    Cancel,
}

impl From<RawAction> for LightboxAction {
    fn from(raw: RawAction) -> Self {
        match raw {
            RawAction::Step { delta } => LightboxAction::Step(delta),
            RawAction::Close => LightboxAction::Close,
            RawAction::ToggleEdit => LightboxAction::ToggleEdit,
            RawAction::AddImage => LightboxAction::AddImage,
            RawAction::RemoveImage => LightboxAction::RemoveImage,
            RawAction::Zoom { steps } => LightboxAction::Zoom(steps),
            RawAction::Confirm => LightboxAction::Confirm,
            RawAction::Cancel => LightboxAction::Cancel,
        }
    }
}

#[derive(Debug)]
struct KeyBinding {
    action: LightboxAction,
    contexts: Vec<KeymapContext>,
    combos: Vec<KeyPattern>,
    snippet: String,
}

impl KeyBinding {
    fn from_raw(raw: RawEntry) -> Result<Self> {
        let contexts = raw
            .contexts
            .iter()
            .map(|ctx| {
                KeymapContext::parse(ctx)
                    .ok_or_else(|| anyhow!("keymap entry {} has unknown context '{ctx}'", raw.id))
            })
            .collect::<Result<Vec<_>>>()?;
        if contexts.is_empty() {
            bail!("keymap entry {} must declare at least one context", raw.id);
        }
        let combos = raw
            .combos
            .iter()
            .map(|combo| {
                KeyPattern::parse(combo)
                    .map_err(|err| anyhow!("failed to parse combo '{combo}' for {}: {err}", raw.id))
            })
            .collect::<Result<Vec<_>>>()?;
        if combos.is_empty() {
            bail!("keymap entry {} must declare combos", raw.id);
        }
        let keys = combos
            .iter()
            .map(|pattern| pattern.display.as_str())
            .collect::<Vec<_>>()
            .join("/");
        Ok(Self {
            action: raw.action.into(),
            contexts,
            snippet: format!("{keys} {}", raw.description),
            combos,
        })
    }

    fn is_live(&self, active: &[KeymapContext]) -> bool {
        self.contexts.iter().any(|ctx| active.contains(ctx))
    }
}

#[derive(Debug)]
struct KeyPattern {
    matcher: CodeMatcher,
    required: KeyModifiers,
    allow_shift: bool,
    display: String,
}

impl KeyPattern {
    fn parse(combo: &str) -> Result<Self, String> {
        let display = combo.trim().to_string();
        let mut tokens = display
            .split('+')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>();
        let Some(key_token) = tokens.pop() else {
            return Err("combo must contain a key".into());
        };
        let matcher = CodeMatcher::from_token(key_token)?;
        let mut required = KeyModifiers::empty();
        for token in tokens {
            match token.to_lowercase().as_str() {
                "ctrl" | "control" => required |= KeyModifiers::CONTROL,
                "shift" => required |= KeyModifiers::SHIFT,
                "alt" => required |= KeyModifiers::ALT,
                other => return Err(format!("unsupported modifier '{other}'")),
            }
        }
        let allow_shift = matcher.tolerates_shift() && !required.contains(KeyModifiers::SHIFT);
        Ok(Self {
            matcher,
            required,
            allow_shift,
            display,
        })
    }

    fn matches(&self, key: &KeyEvent) -> bool {
        if !self.matcher.matches(&key.code) || !key.modifiers.contains(self.required) {
            return false;
        }
        let mut extra = key.modifiers - self.required;
        if self.allow_shift {
            extra -= KeyModifiers::SHIFT;
        }
        extra.is_empty()
    }
}

#[derive(Debug, Clone)]
enum CodeMatcher {
    Literal(KeyCode),
    Char(char),
}

impl CodeMatcher {
    fn from_token(token: &str) -> Result<Self, String> {
        let matcher = match token.to_lowercase().as_str() {
            "enter" => CodeMatcher::Literal(KeyCode::Enter),
            "esc" | "escape" => CodeMatcher::Literal(KeyCode::Esc),
            "left" => CodeMatcher::Literal(KeyCode::Left),
            "right" => CodeMatcher::Literal(KeyCode::Right),
            "up" => CodeMatcher::Literal(KeyCode::Up),
            "down" => CodeMatcher::Literal(KeyCode::Down),
            "delete" | "del" => CodeMatcher::Literal(KeyCode::Delete),
            "space" => CodeMatcher::Char(' '),
            "plus" => CodeMatcher::Char('+'),
            "minus" => CodeMatcher::Char('-'),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => CodeMatcher::Char(ch),
                    _ => return Err(format!("unsupported key '{token}'")),
                }
            }
        };
        Ok(matcher)
    }

    fn matches(&self, code: &KeyCode) -> bool {
        match (self, code) {
            (CodeMatcher::Literal(expected), actual) => actual == expected,
            (CodeMatcher::Char(expected), KeyCode::Char(actual)) => {
                actual.to_ascii_lowercase() == *expected
            }
            _ => false,
        }
    }

    fn tolerates_shift(&self) -> bool {
        matches!(self, CodeMatcher::Char(_))
    }
}

/// Parsed key bindings for the lightbox.
#[derive(Debug)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

static DEFAULT_KEYMAP: LazyLock<Arc<Keymap>> = LazyLock::new(|| {
    Arc::new(Keymap::from_json(keymap_source!()).expect("invalid keymap/lightbox.keymap.json"))
});

impl Keymap {
    pub fn from_json(source: &str) -> Result<Self> {
        let entries: Vec<RawEntry> =
            serde_json::from_str(source).context("keymap is not a valid JSON array")?;
        let bindings = entries
            .into_iter()
            .map(KeyBinding::from_raw)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bindings })
    }

    pub fn shared_default() -> Arc<Keymap> {
        Arc::clone(&DEFAULT_KEYMAP)
    }

    pub fn classify(&self, key: &KeyEvent, active: &[KeymapContext]) -> Option<LightboxAction> {
        self.bindings
            .iter()
            .filter(|binding| binding.is_live(active))
            .find(|binding| binding.combos.iter().any(|pattern| pattern.matches(key)))
            .map(|binding| binding.action)
    }

    pub fn help_text(&self, active: &[KeymapContext]) -> String {
        self.bindings
            .iter()
            .filter(|binding| binding.is_live(active))
            .map(|binding| binding.snippet.as_str())
            .collect::<Vec<_>>()
            .join(" • ")
    }
}
