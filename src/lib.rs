// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Simon - a sequence memory game for the terminal.
//!
//! The computer plays a growing sequence of notes; the player repeats it
//! back. One wrong note ends the game.

pub mod audio;
pub mod config;
pub mod control;
pub mod game;
pub mod session;
pub mod ui;

pub use audio::{ToneGenerator, ToneHandle, ToneSettings};
pub use config::AppConfig;
pub use game::{GameConfig, GameError, GameEvent, HitOutcome, SequenceEngine, TurnPhase};
pub use session::Session;
