// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequence memory game core.
//!
//! This module provides:
//! - Game configuration with validation and derived timings
//! - The sequence engine state machine (computer turn, player turn, resolution)
//! - A logical-time scheduler for deferred playback steps
//! - Narrow collaborator traits for rendering, tone output and game events

pub mod engine;
pub mod timeline;

pub use engine::SequenceEngine;
pub use timeline::{ScheduledStep, Timeline};

use std::sync::mpsc::Sender;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::NOTE_FREQUENCIES;

/// Configuration errors rejected before a game becomes playable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Fewer than two buttons configured
    #[error("number of notes must be at least 2, got {0}")]
    TooFewNotes(usize),
    /// Zero note duration
    #[error("note duration must be positive")]
    InvalidNoteDuration,
}

/// Game configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Number of buttons (exclusive upper bound of generated notes)
    #[serde(default = "default_number_of_notes")]
    pub number_of_notes: usize,
    /// Playback duration of a single note in milliseconds
    #[serde(default = "default_note_duration_ms")]
    pub note_duration_ms: u64,
    /// Fixed RNG seed; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Button colors, passed through to the renderer
    #[serde(default)]
    pub colors: Vec<String>,
}

fn default_number_of_notes() -> usize {
    4
}
fn default_note_duration_ms() -> u64 {
    300
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            number_of_notes: default_number_of_notes(),
            note_duration_ms: default_note_duration_ms(),
            seed: None,
            colors: Vec::new(),
        }
    }
}

impl GameConfig {
    /// Create a config with the given button count and default timings
    pub fn with_notes(number_of_notes: usize) -> Self {
        Self {
            number_of_notes,
            ..Default::default()
        }
    }

    /// Set the note duration
    pub fn note_duration_ms(mut self, millis: u64) -> Self {
        self.note_duration_ms = millis;
        self
    }

    /// Set a fixed RNG seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration is playable
    pub fn validate(&self) -> Result<(), GameError> {
        if self.number_of_notes < 2 {
            return Err(GameError::TooFewNotes(self.number_of_notes));
        }
        if self.note_duration_ms == 0 {
            return Err(GameError::InvalidNoteDuration);
        }
        if self.number_of_notes > NOTE_FREQUENCIES.len() {
            tracing::warn!(
                notes = self.number_of_notes,
                pitches = NOTE_FREQUENCIES.len(),
                "more notes than pitches; notes past the table play silently"
            );
        }
        Ok(())
    }

    /// How long a note is marked (lit and sounding)
    pub fn note_duration(&self) -> Duration {
        Duration::from_millis(self.note_duration_ms)
    }

    /// Rest after a mark before its continuation runs (two-thirds of the mark)
    pub fn note_rest(&self) -> Duration {
        self.note_duration() * 2 / 3
    }

    /// Pause between a completed player turn and the next computer turn
    pub fn turn_pause(&self) -> Duration {
        self.note_duration() * 3
    }
}

/// How a turn in the `Resolving` phase ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Player reproduced the whole sequence; next computer turn is pending
    Success,
    /// Player hit a wrong note; failure is reported once the mark completes
    Failure,
}

/// Phase of the game state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// No active game
    Idle,
    /// Computer is playing back the sequence, currently at `index`
    PlayingBack { index: usize },
    /// Waiting for the player to reproduce the sequence
    AwaitingInput,
    /// Turn decided, waiting for its deferred consequence
    Resolving(Resolution),
}

/// Result of a single player hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Note index outside the configured button range; ignored entirely
    OutOfRange,
    /// No game in progress; the note was only marked
    NoGame,
    /// Game in progress but not accepting input (playback or resolution)
    NotAccepting,
    /// Note matched; `progress` notes of the sequence reproduced so far
    Correct { progress: usize },
    /// Whole sequence reproduced
    TurnComplete { length: usize },
    /// Note did not match; failure is reported after the mark completes
    Mismatch { progress: usize },
}

/// Event emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Computer turn finished playing a sequence that grew by one note
    NewNote { sequence: Vec<usize> },
    /// Player reproduced the whole sequence
    Success { user_len: usize, sequence_len: usize },
    /// Player hit a wrong note; the game has been reset
    Failure { user_len: usize, sequence_len: usize },
}

/// Observer of game lifecycle events. All methods default to no-ops.
pub trait GameObserver: Send {
    /// Computer turn finished playback
    fn on_new_note(&mut self, _sequence: &[usize]) {}

    /// Player completed the sequence
    fn on_success(&mut self, _user_len: usize, _sequence_len: usize) {}

    /// Player failed; called right before the engine resets
    fn on_failure(&mut self, _user_len: usize, _sequence_len: usize) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GameObserver for NoopObserver {}

impl GameObserver for Sender<GameEvent> {
    fn on_new_note(&mut self, sequence: &[usize]) {
        let _ = self.send(GameEvent::NewNote {
            sequence: sequence.to_vec(),
        });
    }

    fn on_success(&mut self, user_len: usize, sequence_len: usize) {
        let _ = self.send(GameEvent::Success {
            user_len,
            sequence_len,
        });
    }

    fn on_failure(&mut self, user_len: usize, sequence_len: usize) {
        let _ = self.send(GameEvent::Failure {
            user_len,
            sequence_len,
        });
    }
}

/// Rendering surface with one "active" visual state per note
pub trait NoteSurface: Send {
    /// Set or clear the active state of a note's button
    fn set_active(&mut self, note: usize, active: bool);
}

/// Surface that renders nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl NoteSurface for NullSurface {
    fn set_active(&mut self, _note: usize, _active: bool) {}
}

/// Tone output driven by the engine
pub trait TonePlayer: Send {
    /// Sound a note for `duration`
    fn play_note(&mut self, note: usize, duration: Duration);

    /// Silence the most recent tone immediately
    fn stop(&mut self);
}

/// Tone player that makes no sound
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentTones;

impl TonePlayer for SilentTones {
    fn play_note(&mut self, _note: usize, _duration: Duration) {}

    fn stop(&mut self) {}
}
