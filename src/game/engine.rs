// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequence engine: the game state machine.
//!
//! A computer turn appends one random note and plays the whole sequence
//! back, one mark at a time. The player then reproduces it through
//! [`SequenceEngine::hit_note`], which is judged note by note against the
//! sequence prefix. A full match schedules the next computer turn after a
//! pause; a mismatch reports failure once the offending note's mark has
//! finished and resets the game.
//!
//! All deferred work lives on a [`Timeline`] in logical time. The host moves
//! time forward with [`SequenceEngine::advance`]; each step carries the
//! generation it was scheduled in and is dropped if the game was reset since.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::timeline::Timeline;
use super::{
    GameConfig, GameError, GameObserver, HitOutcome, NoopObserver, NoteSurface, NullSurface,
    Resolution, SilentTones, TonePlayer, TurnPhase,
};

/// Work that runs after a mark's rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    /// Mark the sequence note at `index`, or finish playback past the end
    PlayNext { index: usize },
    /// Report the failure of the hit that was just marked
    ReportFailure,
}

/// Deferred engine step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// End of a mark: clear the note's active state, then continue after a rest
    Unmark {
        note: usize,
        then: Option<Continuation>,
    },
    /// Continuation due after a rest
    Continue(Continuation),
    /// Start the next computer turn
    ComputerTurn,
}

/// The sequence memory game engine
pub struct SequenceEngine {
    config: GameConfig,
    /// Computer-generated notes, grows by one per computer turn
    sequence: Vec<usize>,
    /// Notes entered by the player during the current turn
    user_progress: Vec<usize>,
    phase: TurnPhase,
    timeline: Timeline<Step>,
    /// Current logical time
    now: Duration,
    /// Bumped on every reset; stale steps are dropped
    generation: u64,
    /// Outstanding marks per note (a note may be marked twice in a row)
    lit: Vec<u32>,
    rng: StdRng,
    tone: Box<dyn TonePlayer>,
    surface: Box<dyn NoteSurface>,
    observer: Box<dyn GameObserver>,
}

impl SequenceEngine {
    /// Create an idle engine from a validated configuration
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;

        Ok(Self {
            rng: make_rng(config.seed),
            lit: vec![0; config.number_of_notes],
            config,
            sequence: Vec::new(),
            user_progress: Vec::new(),
            phase: TurnPhase::Idle,
            timeline: Timeline::new(),
            now: Duration::ZERO,
            generation: 0,
            tone: Box::new(SilentTones),
            surface: Box::new(NullSurface),
            observer: Box::new(NoopObserver),
        })
    }

    /// Use a tone player for note playback
    pub fn with_tone(mut self, tone: Box<dyn TonePlayer>) -> Self {
        self.tone = tone;
        self
    }

    /// Use a rendering surface for note marks
    pub fn with_surface(mut self, surface: Box<dyn NoteSurface>) -> Self {
        self.surface = surface;
        self
    }

    /// Use an observer for game events
    pub fn with_observer(mut self, observer: Box<dyn GameObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Apply a new configuration. The current game is reset.
    ///
    /// An invalid configuration is rejected and leaves the engine untouched.
    pub fn configure(&mut self, config: GameConfig) -> Result<(), GameError> {
        config.validate()?;

        self.reset();
        if config.seed.is_some() {
            self.rng = make_rng(config.seed);
        }
        self.lit = vec![0; config.number_of_notes];
        self.config = config;
        tracing::debug!(
            notes = self.config.number_of_notes,
            duration_ms = self.config.note_duration_ms,
            "game configured"
        );
        Ok(())
    }

    /// Current configuration
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Clear the game: empty sequence and progress, silence the tone,
    /// drop pending steps and clear every lit note.
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.user_progress.clear();
        self.tone.stop();
        self.timeline.clear();
        self.generation += 1;
        for (note, count) in self.lit.iter_mut().enumerate() {
            if *count > 0 {
                *count = 0;
                self.surface.set_active(note, false);
            }
        }
        self.phase = TurnPhase::Idle;
    }

    /// Reset and begin the first computer turn
    pub fn start(&mut self) {
        self.reset();
        tracing::debug!("game started");
        self.computer_turn();
    }

    /// The computer-generated sequence
    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    /// Notes entered by the player in the current turn
    pub fn user_progress(&self) -> &[usize] {
        &self.user_progress
    }

    /// Current phase
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Current logical time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Current session generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of deferred steps waiting on the timeline
    pub fn pending_steps(&self) -> usize {
        self.timeline.len()
    }

    /// Time until the next deferred step is due
    pub fn time_to_next_event(&self) -> Option<Duration> {
        self.timeline
            .next_due()
            .map(|due| due.saturating_sub(self.now))
    }

    /// Whether a note is currently marked active
    pub fn is_lit(&self, note: usize) -> bool {
        self.lit.get(note).is_some_and(|count| *count > 0)
    }

    /// Register a player hit on `note`.
    ///
    /// The note is always marked for immediate feedback. It is judged only
    /// while the engine awaits input; out-of-range notes are ignored.
    pub fn hit_note(&mut self, note: usize) -> HitOutcome {
        if note >= self.config.number_of_notes {
            tracing::warn!(
                note,
                notes = self.config.number_of_notes,
                "ignoring hit outside the button range"
            );
            return HitOutcome::OutOfRange;
        }

        match self.phase {
            TurnPhase::Idle => {
                self.mark_note(note, None);
                return HitOutcome::NoGame;
            }
            TurnPhase::PlayingBack { .. } | TurnPhase::Resolving(_) => {
                self.mark_note(note, None);
                return HitOutcome::NotAccepting;
            }
            TurnPhase::AwaitingInput => {}
        }

        self.user_progress.push(note);
        let progress = self.user_progress.len();

        if !self.sequence.starts_with(&self.user_progress) {
            tracing::debug!(note, progress, "wrong note");
            self.phase = TurnPhase::Resolving(Resolution::Failure);
            self.mark_note(note, Some(Continuation::ReportFailure));
            return HitOutcome::Mismatch { progress };
        }

        self.mark_note(note, None);

        if progress == self.sequence.len() {
            self.phase = TurnPhase::Resolving(Resolution::Success);
            self.observer.on_success(progress, self.sequence.len());
            let due = self.now + self.config.turn_pause();
            self.timeline.schedule(due, self.generation, Step::ComputerTurn);
            return HitOutcome::TurnComplete { length: progress };
        }

        HitOutcome::Correct { progress }
    }

    /// Move logical time forward by `delta`, running every step that falls due
    pub fn advance(&mut self, delta: Duration) {
        self.advance_to(self.now + delta);
    }

    /// Move logical time forward to `target`, running every step that falls due.
    ///
    /// Steps run one at a time in due order. Each runs with the clock set to
    /// its own due time, so chained delays do not drift.
    pub fn advance_to(&mut self, target: Duration) {
        if target < self.now {
            return;
        }

        while let Some(entry) = self.timeline.pop_due(target) {
            if entry.generation != self.generation {
                tracing::trace!(step = ?entry.step, "dropping stale step");
                continue;
            }
            self.now = entry.due;
            self.run(entry.step);
        }

        self.now = target;
    }

    fn run(&mut self, step: Step) {
        match step {
            Step::Unmark { note, then } => {
                self.unlight(note);
                if let Some(then) = then {
                    let due = self.now + self.config.note_rest();
                    self.timeline
                        .schedule(due, self.generation, Step::Continue(then));
                }
            }
            Step::Continue(Continuation::PlayNext { index }) => self.play_from(index),
            Step::Continue(Continuation::ReportFailure) => {
                if self.phase == TurnPhase::Resolving(Resolution::Failure) {
                    let user_len = self.user_progress.len();
                    let sequence_len = self.sequence.len();
                    tracing::debug!(user_len, sequence_len, "turn failed");
                    self.observer.on_failure(user_len, sequence_len);
                    self.reset();
                }
            }
            Step::ComputerTurn => self.computer_turn(),
        }
    }

    /// Clear the player's input, grow the sequence and play it back
    fn computer_turn(&mut self) {
        self.user_progress.clear();

        let note = self.rng.gen_range(0..self.config.number_of_notes);
        self.sequence.push(note);
        tracing::debug!(note, length = self.sequence.len(), "note added");

        self.play_from(0);
    }

    fn play_from(&mut self, index: usize) {
        match self.sequence.get(index).copied() {
            Some(note) => {
                self.phase = TurnPhase::PlayingBack { index };
                self.mark_note(note, Some(Continuation::PlayNext { index: index + 1 }));
            }
            None => {
                self.phase = TurnPhase::AwaitingInput;
                self.observer.on_new_note(&self.sequence);
            }
        }
    }

    /// Light and sound a note, then unlight it after the note duration.
    /// `then` runs after a further rest.
    fn mark_note(&mut self, note: usize, then: Option<Continuation>) {
        self.light(note);
        self.tone.play_note(note, self.config.note_duration());

        let due = self.now + self.config.note_duration();
        self.timeline
            .schedule(due, self.generation, Step::Unmark { note, then });
    }

    fn light(&mut self, note: usize) {
        if let Some(count) = self.lit.get_mut(note) {
            *count += 1;
            if *count == 1 {
                self.surface.set_active(note, true);
            }
        }
    }

    fn unlight(&mut self, note: usize) {
        if let Some(count) = self.lit.get_mut(note) {
            if *count > 0 {
                *count -= 1;
                if *count == 0 {
                    self.surface.set_active(note, false);
                }
            }
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
