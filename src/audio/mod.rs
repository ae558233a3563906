// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tone generator for the game.
//!
//! This module provides:
//! - A fixed two-octave pitch table for note indices
//! - Oscillator voices with time-boxed playback and immediate stop
//! - Audio output via cpal, degrading to silence when no device is available

pub mod output;
pub mod tone;

pub use output::{default_device_name, list_devices, AudioOutput, OutputFormat};
pub use tone::{note_frequency, ToneId, ToneInfo, ToneRequest, ToneSynth, NOTE_FREQUENCIES};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::TonePlayer;

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timbre {
    Sine,
    #[default]
    Square,
    Sawtooth,
    Triangle,
}

impl Timbre {
    /// All timbres, in cycling order
    pub const ALL: [Timbre; 4] = [Timbre::Sine, Timbre::Square, Timbre::Sawtooth, Timbre::Triangle];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Timbre::Sine => "sine",
            Timbre::Square => "square",
            Timbre::Sawtooth => "sawtooth",
            Timbre::Triangle => "triangle",
        }
    }

    /// The next timbre in cycling order
    pub fn next(&self) -> Timbre {
        let index = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// Default tone parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSettings {
    /// Volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Oscillator waveform
    #[serde(default)]
    pub timbre: Timbre,
}

fn default_volume() -> f32 {
    0.5
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            timbre: Timbre::default(),
        }
    }
}

impl ToneSettings {
    /// Settings with the volume forced into range
    pub fn clamped(mut self) -> Self {
        self.volume = tone::clamp_volume(self.volume);
        self
    }
}

/// Audio error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// Failed to initialize audio
    #[error("Audio initialization failed: {0}")]
    InitFailed(String),
    /// Failed to start audio stream
    #[error("Audio stream failed: {0}")]
    StreamFailed(String),
    /// Device does not offer f32 output
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
    /// No audio device available
    #[error("No audio device available")]
    NoDevice,
    /// Note index beyond the pitch table
    #[error("No pitch defined for note {0}")]
    NoteOutOfRange(usize),
    /// Failed to acquire lock
    #[error("Failed to acquire tone lock")]
    LockFailed,
}

/// Cloneable handle onto the generator's synth; what the engine drives
#[derive(Clone, Default)]
pub struct ToneHandle {
    synth: Arc<Mutex<ToneSynth>>,
}

impl ToneHandle {
    /// Start a tone
    pub fn play(&self, request: ToneRequest) -> Result<ToneId, AudioError> {
        let mut synth = self.synth.lock().map_err(|_| AudioError::LockFailed)?;
        synth.play(request)
    }

    /// Silence the most recent tone
    pub fn stop(&self) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.stop();
        }
    }

    /// Set the default volume (0.0 - 1.0)
    pub fn set_volume(&self, volume: f32) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.set_volume(volume);
        }
    }

    /// Set the default timbre
    pub fn set_timbre(&self, timbre: Timbre) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.set_timbre(timbre);
        }
    }

    /// Current defaults
    pub fn settings(&self) -> ToneSettings {
        self.synth
            .lock()
            .map(|synth| synth.settings())
            .unwrap_or_default()
    }

    /// Let `elapsed` pass for tones no output stream is rendering
    pub fn elapse(&self, elapsed: Duration) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.elapse(elapsed);
        }
    }

    /// Number of sounding tones
    pub fn active_tones(&self) -> usize {
        self.synth.lock().map(|s| s.active_tones()).unwrap_or(0)
    }

    /// The most recent tone, if still sounding
    pub fn last_tone(&self) -> Option<ToneInfo> {
        self.synth.lock().ok().and_then(|s| s.last_tone())
    }
}

impl TonePlayer for ToneHandle {
    fn play_note(&mut self, note: usize, duration: Duration) {
        if let Err(e) = self.play(ToneRequest::note(note).duration(duration)) {
            tracing::debug!(note, "tone skipped: {}", e);
        }
    }

    fn stop(&mut self) {
        ToneHandle::stop(self);
    }
}

/// Tone generator: shared synth plus an optional device stream
pub struct ToneGenerator {
    handle: ToneHandle,
    /// Output stream, absent when running silent
    output: Option<AudioOutput>,
    /// Whether opening the device was already tried
    output_attempted: bool,
}

impl ToneGenerator {
    /// Create a generator that has not touched any audio device yet
    pub fn new(settings: ToneSettings) -> Self {
        Self {
            handle: ToneHandle {
                synth: Arc::new(Mutex::new(ToneSynth::with_settings(settings, 44100))),
            },
            output: None,
            output_attempted: false,
        }
    }

    /// Apply settings and make sure the output device is open
    pub fn configure(&mut self, settings: ToneSettings) {
        self.handle.set_volume(settings.volume);
        self.handle.set_timbre(settings.timbre);
        self.ensure_output();
    }

    /// Open the output device once. Returns whether tones are audible.
    ///
    /// A missing or unusable device leaves the generator silent; voices are
    /// still tracked and end through `ToneHandle::elapse`, so the game runs
    /// unchanged.
    pub fn ensure_output(&mut self) -> bool {
        if self.output_attempted {
            return self.output.is_some();
        }
        self.output_attempted = true;

        let prepare_synth = Arc::clone(&self.handle.synth);
        let render_synth = Arc::clone(&self.handle.synth);
        let result = AudioOutput::open(
            move |format| {
                if let Ok(mut synth) = prepare_synth.lock() {
                    synth.set_sample_rate(format.sample_rate);
                }
            },
            move |buffer, channels| {
                if let Ok(mut synth) = render_synth.lock() {
                    synth.render(buffer, channels);
                }
            },
        );

        match result {
            Ok(output) => {
                if let Ok(mut synth) = self.handle.synth.lock() {
                    synth.set_sample_rate(output.format().sample_rate);
                    synth.set_attached(true);
                }
                self.output = Some(output);
                true
            }
            Err(e) => {
                tracing::warn!("audio unavailable, continuing silently: {}", e);
                false
            }
        }
    }

    /// Whether an output device is rendering the tones
    pub fn is_audible(&self) -> bool {
        self.output.is_some()
    }

    /// Handle for driving tones from the engine or the host
    pub fn handle(&self) -> ToneHandle {
        self.handle.clone()
    }

    /// Start a tone
    pub fn play(&self, request: ToneRequest) -> Result<ToneId, AudioError> {
        self.handle.play(request)
    }

    /// Silence the most recent tone
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Set the default volume (0.0 - 1.0)
    pub fn set_volume(&self, volume: f32) {
        self.handle.set_volume(volume);
    }

    /// Set the default timbre
    pub fn set_timbre(&self, timbre: Timbre) {
        self.handle.set_timbre(timbre);
    }

    /// Current defaults
    pub fn settings(&self) -> ToneSettings {
        self.handle.settings()
    }

    /// Number of sounding tones
    pub fn active_tones(&self) -> usize {
        self.handle.active_tones()
    }

    /// The most recent tone, if still sounding
    pub fn last_tone(&self) -> Option<ToneInfo> {
        self.handle.last_tone()
    }
}

impl Default for ToneGenerator {
    fn default() -> Self {
        Self::new(ToneSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = ToneSettings::default();
        assert_eq!(settings.volume, 0.5);
        assert_eq!(settings.timbre, Timbre::Square);
    }

    #[test]
    fn test_parse_settings() {
        let settings: ToneSettings = serde_yaml::from_str("timbre: triangle\n").unwrap();
        assert_eq!(settings.timbre, Timbre::Triangle);
        assert_eq!(settings.volume, 0.5);
    }

    #[test]
    fn test_timbre_cycle() {
        assert_eq!(Timbre::Sine.next(), Timbre::Square);
        assert_eq!(Timbre::Triangle.next(), Timbre::Sine);
        assert_eq!(Timbre::Sawtooth.name(), "sawtooth");
    }

    #[test]
    fn test_detached_generator() {
        let generator = ToneGenerator::new(ToneSettings {
            volume: 0.3,
            timbre: Timbre::Sine,
        });
        assert!(!generator.is_audible());

        generator.play(ToneRequest::note(0)).unwrap();
        let tone = generator.last_tone().unwrap();
        assert_eq!(tone.volume, 0.3);
        assert_eq!(tone.timbre, Timbre::Sine);

        generator.stop();
        assert_eq!(generator.active_tones(), 0);
    }

    #[test]
    fn test_tone_player_skips_unpitched_notes() {
        let generator = ToneGenerator::default();
        let mut player = generator.handle();

        player.play_note(30, Duration::from_millis(300));
        assert_eq!(generator.active_tones(), 0);

        player.play_note(3, Duration::from_millis(300));
        let tone = generator.last_tone().unwrap();
        assert_eq!(tone.remaining_frames, Some(13230));

        TonePlayer::stop(&mut player);
        assert_eq!(generator.active_tones(), 0);
    }

    #[test]
    fn test_configure_applies_settings() {
        let mut generator = ToneGenerator::default();
        // Device already tried and unavailable
        generator.output_attempted = true;

        generator.configure(ToneSettings {
            volume: 0.3,
            timbre: Timbre::Sine,
        });
        assert_eq!(
            generator.settings(),
            ToneSettings {
                volume: 0.3,
                timbre: Timbre::Sine,
            }
        );
        assert!(!generator.is_audible());

        // Reconfiguring does not retry the device
        generator.configure(ToneSettings::default());
        assert!(!generator.ensure_output());
        assert!(!generator.is_audible());
        assert_eq!(generator.settings(), ToneSettings::default());
    }

    #[test]
    fn test_ensure_output_tries_device_once() {
        let mut generator = ToneGenerator::default();
        let audible = generator.ensure_output();
        assert!(generator.output_attempted);
        assert_eq!(generator.is_audible(), audible);

        assert_eq!(generator.ensure_output(), audible);
        assert_eq!(generator.is_audible(), audible);
    }

    #[test]
    fn test_silent_tones_end_with_elapsed_time() {
        let generator = ToneGenerator::default();
        let handle = generator.handle();
        handle
            .play(ToneRequest::note(1).duration(Duration::from_millis(300)))
            .unwrap();
        handle
            .play(ToneRequest::note(2).duration(Duration::from_millis(300)))
            .unwrap();
        assert_eq!(generator.active_tones(), 2);

        handle.elapse(Duration::from_millis(300));
        assert_eq!(generator.active_tones(), 0);
        assert!(generator.last_tone().is_none());
    }

    #[test]
    fn test_setters() {
        let generator = ToneGenerator::default();
        generator.set_volume(0.8);
        generator.set_timbre(Timbre::Sawtooth);

        let settings = generator.settings();
        assert_eq!(settings.volume, 0.8);
        assert_eq!(settings.timbre, Timbre::Sawtooth);
    }
}
