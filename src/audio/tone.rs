// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tone synthesis for game notes.
//!
//! Maps note indices to a two-octave chromatic pitch table and renders
//! simple oscillator voices. Every `play` creates its own voice, so
//! overlapping tones do not cut each other off; a voice with a duration
//! silences itself once that many frames have been rendered.

use std::f32::consts::TAU;
use std::time::Duration;

use super::{AudioError, Timbre, ToneSettings};

/// Equal-tempered pitches C4..B5 in Hz, indexed by note
pub const NOTE_FREQUENCIES: [f32; 24] = [
    261.63, 277.18, 293.66, 311.13, 329.63, 349.23, //
    369.99, 392.00, 415.30, 440.00, 466.16, 493.88, //
    523.25, 554.37, 587.33, 622.25, 659.26, 698.46, //
    739.99, 783.99, 830.61, 880.00, 932.33, 987.77,
];

/// Look up the pitch of a note, if the table defines one
pub fn note_frequency(note: usize) -> Option<f32> {
    NOTE_FREQUENCIES.get(note).copied()
}

/// Parameters for a single `play` call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToneRequest {
    /// Note index selecting the pitch; keeps the previous pitch when absent
    pub note: Option<usize>,
    /// Automatic silencing after this long; sounds until stopped when absent
    pub duration: Option<Duration>,
    /// Volume override, kept as the new default
    pub volume: Option<f32>,
}

impl ToneRequest {
    /// Request for a note
    pub fn note(note: usize) -> Self {
        Self {
            note: Some(note),
            ..Default::default()
        }
    }

    /// Set the duration
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set the volume
    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Identifier of a voice created by `play`
pub type ToneId = u64;

/// Snapshot of a voice, for display and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneInfo {
    pub id: ToneId,
    pub frequency: f32,
    pub volume: f32,
    pub timbre: Timbre,
    /// Frames left before automatic silencing, if time-boxed
    pub remaining_frames: Option<u64>,
}

#[derive(Debug, Clone)]
struct Voice {
    info: ToneInfo,
    /// Oscillator phase in cycles (0.0 - 1.0)
    phase: f32,
}

impl Voice {
    fn is_finished(&self) -> bool {
        self.info.remaining_frames == Some(0)
    }

    fn next_sample(&mut self, sample_rate: f32) -> f32 {
        if let Some(remaining) = self.info.remaining_frames.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        // No pitch selected yet
        if self.info.frequency <= 0.0 {
            return 0.0;
        }
        let value = oscillator(self.info.timbre, self.phase) * self.info.volume;
        self.phase += self.info.frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value
    }
}

/// Naive oscillator shapes, `phase` in cycles
fn oscillator(timbre: Timbre, phase: f32) -> f32 {
    match timbre {
        Timbre::Sine => (phase * TAU).sin(),
        Timbre::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Timbre::Sawtooth => 2.0 * phase - 1.0,
        Timbre::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
    }
}

/// Voice mixer holding the tone state
#[derive(Debug)]
pub struct ToneSynth {
    settings: ToneSettings,
    /// Pitch used when a request carries no note
    current_frequency: f32,
    voices: Vec<Voice>,
    next_id: ToneId,
    /// Most recently created voice, target of `stop`
    last_id: Option<ToneId>,
    sample_rate: u32,
    /// Whether an output stream renders the voices
    attached: bool,
}

impl ToneSynth {
    /// Create a synth with default settings at 44.1kHz
    pub fn new() -> Self {
        Self::with_settings(ToneSettings::default(), 44100)
    }

    /// Create a synth with explicit settings and sample rate
    pub fn with_settings(settings: ToneSettings, sample_rate: u32) -> Self {
        Self {
            settings: settings.clamped(),
            current_frequency: 0.0,
            voices: Vec::new(),
            next_id: 1,
            last_id: None,
            sample_rate: sample_rate.max(1),
            attached: false,
        }
    }

    /// Start a new voice
    pub fn play(&mut self, request: ToneRequest) -> Result<ToneId, AudioError> {
        if let Some(note) = request.note {
            self.current_frequency = note_frequency(note).ok_or(AudioError::NoteOutOfRange(note))?;
        }
        if let Some(volume) = request.volume {
            self.set_volume(volume);
        }

        let id = self.next_id;
        self.next_id += 1;

        let remaining_frames = request
            .duration
            .map(|d| (d.as_secs_f64() * self.sample_rate as f64).round() as u64);

        self.voices.push(Voice {
            info: ToneInfo {
                id,
                frequency: self.current_frequency,
                volume: self.settings.volume,
                timbre: self.settings.timbre,
                remaining_frames,
            },
            phase: 0.0,
        });
        self.last_id = Some(id);
        Ok(id)
    }

    /// Silence the most recently created voice, if it still sounds
    pub fn stop(&mut self) {
        if let Some(id) = self.last_id.take() {
            self.voices.retain(|voice| voice.info.id != id);
        }
    }

    /// Set the default volume for subsequent tones (clamped to 0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.settings.volume = clamp_volume(volume);
    }

    /// Set the default timbre for subsequent tones
    pub fn set_timbre(&mut self, timbre: Timbre) {
        self.settings.timbre = timbre;
    }

    /// Current defaults
    pub fn settings(&self) -> ToneSettings {
        self.settings
    }

    /// Change the output sample rate
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Mark whether an output stream renders the voices
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    /// Count down time-boxed voices without rendering them.
    ///
    /// Only takes effect while detached; an attached stream counts frames
    /// as it renders.
    pub fn elapse(&mut self, elapsed: Duration) {
        if self.attached {
            return;
        }
        let frames = (elapsed.as_secs_f64() * self.sample_rate as f64).round() as u64;
        for voice in self.voices.iter_mut() {
            if let Some(remaining) = voice.info.remaining_frames.as_mut() {
                *remaining = remaining.saturating_sub(frames);
            }
        }
        self.voices.retain(|voice| !voice.is_finished());
    }

    /// Number of sounding voices
    pub fn active_tones(&self) -> usize {
        self.voices.len()
    }

    /// The most recently created voice, if it still sounds
    pub fn last_tone(&self) -> Option<ToneInfo> {
        let id = self.last_id?;
        self.voices
            .iter()
            .find(|voice| voice.info.id == id)
            .map(|voice| voice.info)
    }

    /// Mix all voices into an interleaved buffer.
    ///
    /// The buffer is overwritten. Finished voices are dropped.
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let sample_rate = self.sample_rate as f32;

        for frame in buffer.chunks_mut(channels) {
            let mut mixed = 0.0;
            for voice in self.voices.iter_mut().filter(|v| !v.is_finished()) {
                mixed += voice.next_sample(sample_rate);
            }
            let mixed = mixed.clamp(-1.0, 1.0);
            for sample in frame.iter_mut() {
                *sample = mixed;
            }
        }

        self.voices.retain(|voice| !voice.is_finished());
    }
}

impl Default for ToneSynth {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        tracing::warn!("ignoring NaN volume");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&volume) {
        tracing::warn!(volume, "volume out of range, clamping");
    }
    volume.clamp(0.0, 1.0)
}
