// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Game session: the engine wired to the board, tones and saved preferences.
//!
//! The session applies control actions, drives the engine forward in time
//! and turns engine events into the level, high score and status shown to
//! the player. It has no terminal dependency; the UI only reads it.

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crate::audio::{Timbre, ToneHandle, NOTE_FREQUENCIES};
use crate::config::storage::{Preferences, Storage};
use crate::control::ControlAction;
use crate::game::{GameConfig, GameError, GameEvent, HitOutcome, SequenceEngine};
use crate::ui::BoardState;

/// Fewest buttons a game can have
pub const MIN_DIFFICULTY: usize = 2;
/// Most buttons a game can have; one per pitch
pub const MAX_DIFFICULTY: usize = NOTE_FREQUENCIES.len();
/// Volume change per step
pub const VOLUME_STEP: f32 = 0.1;

/// Status shown after a failed turn
pub const FAILURE_STATUS: &str = "BOOM! You failed.";

/// A running game with its host-side state
pub struct Session {
    engine: SequenceEngine,
    events: Receiver<GameEvent>,
    board: BoardState,
    tone: ToneHandle,
    storage: Storage,
    prefs: Preferences,
    /// Length of the sequence currently being played
    level: usize,
    /// Pending status message for the UI
    status: Option<String>,
}

impl Session {
    /// Create a session. A saved difficulty overrides the configured button
    /// count and a saved volume overrides the tone default.
    pub fn new(
        mut config: GameConfig,
        tone: ToneHandle,
        storage: Storage,
    ) -> Result<Self, GameError> {
        let prefs = Preferences::load(&storage);

        if let Some(difficulty) = prefs.difficulty {
            if (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
                config.number_of_notes = difficulty;
            } else {
                tracing::warn!(difficulty, "ignoring saved difficulty");
            }
        }
        if let Some(volume) = prefs.volume {
            tone.set_volume(volume);
        }

        let board = BoardState::new(config.number_of_notes);
        let (tx, events) = mpsc::channel();
        let engine = SequenceEngine::new(config)?
            .with_tone(Box::new(tone.clone()))
            .with_surface(Box::new(board.clone()))
            .with_observer(Box::new(tx));

        Ok(Self {
            engine,
            events,
            board,
            tone,
            storage,
            prefs,
            level: 0,
            status: None,
        })
    }

    /// Apply a game or setting action. UI-only actions are ignored.
    pub fn handle(&mut self, action: ControlAction) {
        match action {
            ControlAction::HitNote(note) => {
                if let HitOutcome::TurnComplete { length } = self.engine.hit_note(note) {
                    tracing::debug!(length, "turn complete");
                }
            }
            ControlAction::Start => {
                self.level = 0;
                self.engine.start();
            }
            ControlAction::Reset => {
                self.level = 0;
                self.engine.reset();
            }
            ControlAction::VolumeUp => self.change_volume(VOLUME_STEP),
            ControlAction::VolumeDown => self.change_volume(-VOLUME_STEP),
            ControlAction::CycleTimbre => {
                let timbre = self.timbre().next();
                self.tone.set_timbre(timbre);
                self.set_status(format!("Timbre: {}", timbre.name()));
            }
            ControlAction::DifficultyUp => {
                let target = self.number_of_notes() + 1;
                self.set_difficulty(target);
            }
            ControlAction::DifficultyDown => {
                let target = self.number_of_notes().saturating_sub(1);
                self.set_difficulty(target);
            }
            ControlAction::ToggleHelp | ControlAction::Quit | ControlAction::None => {}
        }
        self.drain_events();
    }

    /// Move game time forward and process resulting events
    pub fn advance(&mut self, delta: Duration) {
        self.tone.elapse(delta);
        self.engine.advance(delta);
        self.drain_events();
    }

    /// Change the number of buttons. Clamped to the playable range, saved,
    /// and the game is rebuilt.
    pub fn set_difficulty(&mut self, difficulty: usize) {
        let difficulty = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        if difficulty == self.number_of_notes() {
            return;
        }

        let mut config = self.engine.config().clone();
        config.number_of_notes = difficulty;
        if let Err(e) = self.engine.configure(config) {
            tracing::warn!("difficulty change rejected: {}", e);
            return;
        }
        self.board.resize(difficulty);
        self.level = 0;
        self.prefs.save_difficulty(&mut self.storage, difficulty);
        self.set_status(format!("Buttons: {}", difficulty));
    }

    /// Apply settings chosen for this run. They take precedence over saved
    /// preferences and are saved in turn.
    pub fn apply_overrides(&mut self, notes: Option<usize>, volume: Option<f32>) {
        if let Some(notes) = notes {
            self.set_difficulty(notes);
        }
        if let Some(volume) = volume {
            self.set_volume(volume);
        }
        self.status = None;
    }

    /// Change the volume by `delta`, in steps of one tenth
    pub fn change_volume(&mut self, delta: f32) {
        let volume = ((self.volume() + delta) * 10.0).round() / 10.0;
        self.set_volume(volume);
    }

    /// Set the volume, saved and applied to the tones
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.tone.set_volume(volume);
        self.prefs.save_volume(&mut self.storage, volume);
        self.set_status(format!("Volume: {:.0}%", volume * 100.0));
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                GameEvent::NewNote { sequence } => {
                    self.level = sequence.len();
                }
                GameEvent::Success { user_len, .. } => {
                    if self.prefs.record_score(&mut self.storage, user_len) {
                        tracing::info!(score = user_len, "new high score");
                        self.set_status(format!("New high score: {}", user_len));
                    }
                }
                GameEvent::Failure {
                    user_len,
                    sequence_len,
                } => {
                    tracing::info!(user_len, sequence_len, "game over");
                    self.level = 0;
                    self.set_status(FAILURE_STATUS);
                }
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Take the pending status message
    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    /// Length of the sequence being played; 0 without a game
    pub fn level(&self) -> usize {
        self.level
    }

    /// Best sequence length reproduced
    pub fn high_score(&self) -> usize {
        self.prefs.high_score
    }

    /// Current tone volume
    pub fn volume(&self) -> f32 {
        self.tone.settings().volume
    }

    /// Current tone timbre
    pub fn timbre(&self) -> Timbre {
        self.tone.settings().timbre
    }

    /// Number of buttons
    pub fn number_of_notes(&self) -> usize {
        self.engine.config().number_of_notes
    }

    /// Configured button colors
    pub fn colors(&self) -> &[String] {
        &self.engine.config().colors
    }

    /// Lit state of the buttons
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// The underlying engine
    pub fn engine(&self) -> &SequenceEngine {
        &self.engine
    }

    /// Time until the engine has work due
    pub fn time_to_next_event(&self) -> Option<Duration> {
        self.engine.time_to_next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::storage::{DIFFICULTY_KEY, HIGH_SCORE_KEY, VOLUME_KEY};
    use crate::game::TurnPhase;

    fn session(notes: usize) -> Session {
        let config = GameConfig::with_notes(notes).seed(11);
        Session::new(config, ToneHandle::default(), Storage::in_memory()).unwrap()
    }

    fn finish_playback(session: &mut Session) {
        let step = session.engine().config().note_duration();
        for _ in 0..100 {
            if session.engine().phase() == TurnPhase::AwaitingInput {
                return;
            }
            session.advance(step);
        }
        panic!("playback never finished");
    }

    fn play_back_sequence(session: &mut Session) {
        let sequence = session.engine().sequence().to_vec();
        let step = session.engine().config().note_duration();
        for note in sequence {
            session.handle(ControlAction::HitNote(note));
            session.advance(step);
        }
    }

    #[test]
    fn test_level_follows_new_notes() {
        let mut session = session(4);
        assert_eq!(session.level(), 0);

        session.handle(ControlAction::Start);
        assert_eq!(session.level(), 0);
        finish_playback(&mut session);
        assert_eq!(session.level(), 1);
    }

    #[test]
    fn test_success_records_high_score() {
        let mut session = session(4);
        session.handle(ControlAction::Start);
        finish_playback(&mut session);

        play_back_sequence(&mut session);
        assert_eq!(session.high_score(), 1);
        assert_eq!(session.take_status().as_deref(), Some("New high score: 1"));
        assert_eq!(session.storage.get(HIGH_SCORE_KEY), Some("1"));

        finish_playback(&mut session);
        assert_eq!(session.level(), 2);
    }

    #[test]
    fn test_failure_resets_level() {
        let mut session = session(4);
        session.handle(ControlAction::Start);
        finish_playback(&mut session);

        let wrong = (session.engine().sequence()[0] + 1) % 4;
        session.handle(ControlAction::HitNote(wrong));
        let step = session.engine().config().note_duration();
        for _ in 0..4 {
            session.advance(step);
        }

        assert_eq!(session.level(), 0);
        assert_eq!(session.take_status().as_deref(), Some(FAILURE_STATUS));
        assert_eq!(session.engine().phase(), TurnPhase::Idle);
        assert_eq!(session.high_score(), 0);
    }

    #[test]
    fn test_difficulty_is_clamped_and_saved() {
        let mut session = session(4);
        session.handle(ControlAction::DifficultyUp);
        assert_eq!(session.number_of_notes(), 5);
        assert_eq!(session.board().len(), 5);
        assert_eq!(session.storage.get(DIFFICULTY_KEY), Some("5"));

        session.set_difficulty(0);
        assert_eq!(session.number_of_notes(), MIN_DIFFICULTY);
        session.set_difficulty(100);
        assert_eq!(session.number_of_notes(), MAX_DIFFICULTY);
    }

    #[test]
    fn test_difficulty_change_abandons_game() {
        let mut session = session(4);
        session.handle(ControlAction::Start);
        finish_playback(&mut session);

        session.handle(ControlAction::DifficultyDown);
        assert_eq!(session.engine().phase(), TurnPhase::Idle);
        assert!(session.engine().sequence().is_empty());
        assert_eq!(session.level(), 0);
    }

    #[test]
    fn test_volume_steps() {
        let mut session = session(4);
        assert_eq!(session.volume(), 0.5);

        session.handle(ControlAction::VolumeUp);
        assert!((session.volume() - 0.6).abs() < 1e-6);
        assert_eq!(session.storage.get_parsed::<f32>(VOLUME_KEY), Some(0.6));

        for _ in 0..10 {
            session.handle(ControlAction::VolumeUp);
        }
        assert_eq!(session.volume(), 1.0);

        for _ in 0..20 {
            session.handle(ControlAction::VolumeDown);
        }
        assert_eq!(session.volume(), 0.0);
    }

    #[test]
    fn test_saved_preferences_apply() {
        let mut storage = Storage::in_memory();
        storage.set(DIFFICULTY_KEY, 6);
        storage.set(VOLUME_KEY, 0.2);
        storage.set(HIGH_SCORE_KEY, 12);

        let session = Session::new(GameConfig::default(), ToneHandle::default(), storage).unwrap();
        assert_eq!(session.number_of_notes(), 6);
        assert!((session.volume() - 0.2).abs() < 1e-6);
        assert_eq!(session.high_score(), 12);
    }

    #[test]
    fn test_saved_difficulty_out_of_range_is_ignored() {
        let mut storage = Storage::in_memory();
        storage.set(DIFFICULTY_KEY, 1);

        let session = Session::new(GameConfig::default(), ToneHandle::default(), storage).unwrap();
        assert_eq!(session.number_of_notes(), 4);
    }

    #[test]
    fn test_overrides_beat_saved_preferences() {
        let mut storage = Storage::in_memory();
        storage.set(DIFFICULTY_KEY, 6);
        storage.set(VOLUME_KEY, 0.2);

        let mut session =
            Session::new(GameConfig::default(), ToneHandle::default(), storage).unwrap();
        session.apply_overrides(Some(8), Some(0.9));

        assert_eq!(session.number_of_notes(), 8);
        assert_eq!(session.board().len(), 8);
        assert!((session.volume() - 0.9).abs() < 1e-6);
        assert_eq!(session.storage.get(DIFFICULTY_KEY), Some("8"));
        assert_eq!(session.storage.get_parsed::<f32>(VOLUME_KEY), Some(0.9));
        assert!(session.take_status().is_none());
    }

    #[test]
    fn test_no_overrides_keep_saved_preferences() {
        let mut storage = Storage::in_memory();
        storage.set(DIFFICULTY_KEY, 6);
        storage.set(VOLUME_KEY, 0.2);

        let mut session =
            Session::new(GameConfig::default(), ToneHandle::default(), storage).unwrap();
        session.apply_overrides(None, None);

        assert_eq!(session.number_of_notes(), 6);
        assert!((session.volume() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_silent_tones_end_as_time_passes() {
        let mut session = session(4);
        session.handle(ControlAction::Start);
        for _ in 0..5 {
            finish_playback(&mut session);
            play_back_sequence(&mut session);
        }
        assert!(session.high_score() >= 5);

        session.advance(Duration::from_secs(60));
        assert_eq!(session.tone.active_tones(), 0);
    }

    #[test]
    fn test_cycle_timbre() {
        let mut session = session(4);
        let before = session.timbre();
        session.handle(ControlAction::CycleTimbre);
        assert_eq!(session.timbre(), before.next());
        assert!(session.take_status().is_some());
    }

    #[test]
    fn test_board_lights_during_playback() {
        let mut session = session(4);
        session.handle(ControlAction::Start);
        let first = session.engine().sequence()[0];
        assert!(session.board().is_lit(first));
    }
}
