// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Control system for keyboard input.
//!
//! Maps key presses to game actions: note hits, starting and resetting a
//! game, and volume / difficulty adjustments.

pub mod keyboard;

pub use keyboard::{format_shortcut, KeyBinding, KeyboardController, Shortcut};

/// Action that can be triggered by controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// No action
    None,

    // Game
    /// Player hit on a note
    HitNote(usize),
    /// Start a new game
    Start,
    /// Abandon the current game
    Reset,

    // Settings
    /// Raise the tone volume one step
    VolumeUp,
    /// Lower the tone volume one step
    VolumeDown,
    /// Cycle the oscillator timbre
    CycleTimbre,
    /// Add a button
    DifficultyUp,
    /// Remove a button
    DifficultyDown,

    // UI
    /// Toggle help display
    ToggleHelp,
    /// Quit application
    Quit,
}
