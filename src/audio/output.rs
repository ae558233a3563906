// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Opens the default output device at its preferred configuration and
//! pulls interleaved f32 samples from a render callback.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};

use super::AudioError;

/// Format of an opened output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of output channels
    pub channels: u16,
}

/// Running audio output stream
pub struct AudioOutput {
    /// cpal stream, playing while held
    _stream: Stream,
    format: OutputFormat,
}

impl AudioOutput {
    /// Open the default output device and start rendering through `callback`.
    ///
    /// `prepare` receives the negotiated format before the stream starts.
    pub fn open<P, F>(prepare: P, mut callback: F) -> Result<Self, AudioError>
    where
        P: FnOnce(OutputFormat),
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::InitFailed(format!("Failed to get default config: {}", e)))?;

        if supported.sample_format() != SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }

        let stream_config = supported.config();
        let format = OutputFormat {
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        };
        prepare(format);

        let channels = format.channels as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data, channels);
                },
                move |err| {
                    tracing::error!("Audio stream error: {}", err);
                },
                None, // No timeout
            )
            .map_err(|e| AudioError::StreamFailed(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("Failed to start stream: {}", e)))?;

        tracing::info!(
            sample_rate = format.sample_rate,
            channels = format.channels,
            "audio output started"
        );

        Ok(Self {
            _stream: stream,
            format,
        })
    }

    /// Negotiated stream format
    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// List available audio output devices
pub fn list_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.output_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}

/// Get default device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}
