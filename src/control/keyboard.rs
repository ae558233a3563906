// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard shortcut handling.
//!
//! Digit keys `1`-`9` play the first nine buttons; only digits below the
//! configured button count are bound.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};

use super::ControlAction;

/// Highest number of buttons reachable from the digit row
pub const MAX_DIGIT_NOTES: usize = 9;

/// A keyboard shortcut definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// Key code
    pub code: KeyCode,
    /// Required modifiers
    pub modifiers: KeyModifiers,
}

impl Shortcut {
    /// Create a new shortcut
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Create a shortcut with no modifiers
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Create a shortcut with Ctrl modifier
    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    /// Character keys arrive with SHIFT when typed shifted ('+', '?');
    /// the character already carries that.
    fn normalized(code: KeyCode, modifiers: KeyModifiers) -> Self {
        match code {
            KeyCode::Char(_) => Self::new(code, modifiers.difference(KeyModifiers::SHIFT)),
            _ => Self::new(code, modifiers),
        }
    }
}

/// A keyboard binding (shortcut to action)
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// The shortcut
    pub shortcut: Shortcut,
    /// The action to perform
    pub action: ControlAction,
    /// Description for help display
    pub description: String,
    /// Category for grouping in help
    pub category: String,
}

impl KeyBinding {
    /// Create a new key binding
    pub fn new(shortcut: Shortcut, action: ControlAction, description: impl Into<String>) -> Self {
        Self {
            shortcut,
            action,
            description: description.into(),
            category: "General".to_string(),
        }
    }

    /// Set the category
    pub fn category(mut self, cat: impl Into<String>) -> Self {
        self.category = cat.into();
        self
    }
}

/// Keyboard controller with configurable bindings
pub struct KeyboardController {
    bindings: HashMap<Shortcut, KeyBinding>,
    /// Number of buttons with digit bindings
    note_keys: usize,
}

impl KeyboardController {
    /// Create an empty keyboard controller
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            note_keys: 0,
        }
    }

    /// Create a keyboard controller with default bindings for `number_of_notes` buttons
    pub fn with_defaults(number_of_notes: usize) -> Self {
        let mut controller = Self::new();
        controller.add_default_bindings();
        controller.set_note_count(number_of_notes);
        controller
    }

    /// Add default keyboard bindings
    fn add_default_bindings(&mut self) {
        // Game
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Char('s')), ControlAction::Start, "Start")
                .category("Game"),
        );
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Char(' ')), ControlAction::Start, "Start")
                .category("Game"),
        );
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Char('r')), ControlAction::Reset, "Reset")
                .category("Game"),
        );
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Esc), ControlAction::Reset, "Reset")
                .category("Game"),
        );

        // Settings
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Char('+')), ControlAction::VolumeUp, "Volume Up")
                .category("Settings"),
        );
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Char('=')), ControlAction::VolumeUp, "Volume Up")
                .category("Settings"),
        );
        self.add(
            KeyBinding::new(
                Shortcut::key(KeyCode::Char('-')),
                ControlAction::VolumeDown,
                "Volume Down",
            )
            .category("Settings"),
        );
        self.add(
            KeyBinding::new(
                Shortcut::key(KeyCode::Char('t')),
                ControlAction::CycleTimbre,
                "Cycle Timbre",
            )
            .category("Settings"),
        );
        self.add(
            KeyBinding::new(
                Shortcut::key(KeyCode::Char(']')),
                ControlAction::DifficultyUp,
                "More Buttons",
            )
            .category("Settings"),
        );
        self.add(
            KeyBinding::new(
                Shortcut::key(KeyCode::Char('[')),
                ControlAction::DifficultyDown,
                "Fewer Buttons",
            )
            .category("Settings"),
        );

        // UI
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Char('?')), ControlAction::ToggleHelp, "Toggle Help")
                .category("UI"),
        );
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Char('h')), ControlAction::ToggleHelp, "Toggle Help")
                .category("UI"),
        );
        self.add(
            KeyBinding::new(Shortcut::key(KeyCode::Char('q')), ControlAction::Quit, "Quit")
                .category("UI"),
        );
        self.add(
            KeyBinding::new(Shortcut::ctrl(KeyCode::Char('c')), ControlAction::Quit, "Quit")
                .category("UI"),
        );
    }

    /// Rebind the digit row for a new button count
    pub fn set_note_count(&mut self, number_of_notes: usize) {
        self.bindings
            .retain(|_, binding| !matches!(binding.action, ControlAction::HitNote(_)));

        self.note_keys = number_of_notes.min(MAX_DIGIT_NOTES);
        for note in 0..self.note_keys {
            let Some(c) = char::from_digit(note as u32 + 1, 10) else {
                continue;
            };
            self.add(
                KeyBinding::new(
                    Shortcut::key(KeyCode::Char(c)),
                    ControlAction::HitNote(note),
                    format!("Play Button {}", note + 1),
                )
                .category("Notes"),
            );
        }
    }

    /// Number of buttons reachable from the keyboard
    pub fn note_keys(&self) -> usize {
        self.note_keys
    }

    /// Add a key binding
    pub fn add(&mut self, binding: KeyBinding) {
        self.bindings.insert(binding.shortcut.clone(), binding);
    }

    /// Remove a key binding
    pub fn remove(&mut self, shortcut: &Shortcut) -> Option<KeyBinding> {
        self.bindings.remove(shortcut)
    }

    /// Process a key event and return the action
    pub fn process_key(&self, code: KeyCode, modifiers: KeyModifiers) -> ControlAction {
        let shortcut = Shortcut::normalized(code, modifiers);
        self.bindings
            .get(&shortcut)
            .map(|binding| binding.action)
            .unwrap_or(ControlAction::None)
    }

    /// Get all bindings for help display
    pub fn bindings(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.values()
    }

    /// Get bindings grouped by category
    pub fn bindings_by_category(&self) -> HashMap<String, Vec<&KeyBinding>> {
        let mut grouped: HashMap<String, Vec<&KeyBinding>> = HashMap::new();
        for binding in self.bindings.values() {
            grouped
                .entry(binding.category.clone())
                .or_default()
                .push(binding);
        }
        grouped
    }
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::with_defaults(4)
    }
}

/// Format a shortcut for display
pub fn format_shortcut(shortcut: &Shortcut) -> String {
    let mut parts = Vec::new();

    if shortcut.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl".to_string());
    }
    if shortcut.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt".to_string());
    }

    let key = match shortcut.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_uppercase().to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        _ => "?".to_string(),
    };
    parts.push(key);

    parts.join("+")
}
