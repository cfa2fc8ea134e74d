//! Keyboard shortcuts.
//!
//! Matching rules: the key name is compared case-insensitively, `ctrl`
//! matches when either Ctrl or Meta is held, and `shift` / `alt` must match
//! exactly. Registration order decides ties.

#[cfg(test)]
#[path = "shortcuts_test.rs"]
mod shortcuts_test;

use serde::{Deserialize, Serialize};

use crate::input::{Key, Modifiers};

/// One key binding and the command it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    /// Opaque command name reported back to the host.
    pub command: String,
    #[serde(default)]
    pub description: String,
}

impl Shortcut {
    #[must_use]
    pub fn new(key: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            shift: false,
            alt: false,
            command: command.into(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn matches(&self, key: &Key, modifiers: Modifiers) -> bool {
        key.matches(&self.key)
            && self.ctrl == modifiers.command()
            && self.shift == modifiers.shift
            && self.alt == modifiers.alt
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, shortcut: Shortcut) {
        tracing::debug!(key = %shortcut.key, command = %shortcut.command, "shortcut registered");
        self.shortcuts.push(shortcut);
    }

    pub fn register_all(&mut self, shortcuts: impl IntoIterator<Item = Shortcut>) {
        for shortcut in shortcuts {
            self.register(shortcut);
        }
    }

    /// Remove every binding for `key`, whatever its modifiers. Returns how
    /// many were removed.
    pub fn unregister(&mut self, key: &str) -> usize {
        let before = self.shortcuts.len();
        self.shortcuts.retain(|s| !s.key.eq_ignore_ascii_case(key));
        before - self.shortcuts.len()
    }

    pub fn clear(&mut self) {
        self.shortcuts.clear();
    }

    /// First registered binding matching the key press.
    #[must_use]
    pub fn resolve(&self, key: &Key, modifiers: Modifiers) -> Option<&Shortcut> {
        self.shortcuts.iter().find(|s| s.matches(key, modifiers))
    }

    #[must_use]
    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }
}
