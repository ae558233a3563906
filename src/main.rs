// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use simon::audio::{default_device_name, list_devices, ToneGenerator};
use simon::config::{AppConfig, Storage};
use simon::session::Session;
use simon::ui::App;

fn print_usage() {
    println!("Simon - Sequence Memory Game");
    println!();
    println!("Usage: simon [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>     Load game settings from a YAML file");
    println!("  --notes <N>         Number of buttons, 2 to 24; overrides the saved difficulty");
    println!("  --duration <MS>     Note duration in milliseconds (default 300)");
    println!("  --volume <V>        Tone volume, 0.0 to 1.0; overrides the saved volume");
    println!("  --seed <N>          Fixed seed for the note sequence");
    println!("  --storage <PATH>    Preference and high score file");
    println!("  --log <PATH>        Write a debug log to PATH");
    println!("  --list-audio        List available audio output devices");
    println!("  --help              Show this help message");
}

fn print_audio_devices() {
    let devices = list_devices();
    if devices.is_empty() {
        println!("No audio output devices found");
        return;
    }

    let default = default_device_name();
    println!("Audio output devices:");
    for (i, name) in devices.iter().enumerate() {
        let marker = if default.as_deref() == Some(name.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!("  {}: {}{}", i, name, marker);
    }
}

/// Options given on the command line
#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    notes: Option<usize>,
    duration_ms: Option<u64>,
    volume: Option<f32>,
    seed: Option<u64>,
    storage: Option<PathBuf>,
    log: Option<PathBuf>,
}

impl Options {
    /// Build the effective configuration: file (or defaults), then overrides
    fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(notes) = self.notes {
            config.game.number_of_notes = notes;
        }
        if let Some(duration_ms) = self.duration_ms {
            config.game.note_duration_ms = duration_ms;
        }
        if let Some(volume) = self.volume {
            config.tone.volume = volume;
        }
        if let Some(seed) = self.seed {
            config.game.seed = Some(seed);
        }
        if let Some(path) = &self.storage {
            config.storage.path = Some(path.clone());
        }

        config.game.validate().context("Invalid game options")?;
        config.tone = config.tone.clamped();
        Ok(config)
    }
}

/// Value following the flag at `args[i]`
fn flag_value<'a>(args: &'a [String], i: usize) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", args[i]))
}

fn parse_flag<T: FromStr>(args: &[String], i: usize) -> Result<T> {
    let value = flag_value(args, i)?;
    value
        .parse()
        .map_err(|_| anyhow!("Invalid value for {}: {}", args[i], value))
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {:?}", path))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}

fn play(options: Options) -> Result<()> {
    if let Some(path) = &options.log {
        init_logging(path)?;
    }

    let config = options.app_config()?;
    let storage = match &config.storage.path {
        Some(path) => Storage::open(path),
        None => Storage::in_memory(),
    };

    let mut tones = ToneGenerator::default();
    tones.configure(config.tone);
    if !tones.is_audible() {
        tracing::warn!("no audio output, playing silently");
    }

    let mut session = Session::new(config.game, tones.handle(), storage)
        .context("Failed to create game")?;
    session.apply_overrides(options.notes, options.volume);
    tracing::info!(
        notes = session.number_of_notes(),
        high_score = session.high_score(),
        "Hello, and welcome to Simon!"
    );

    {
        let mut app = App::new().context("Failed to initialize terminal")?;
        app.run(&mut session)?;
    }

    println!("High score: {}", session.high_score());
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => options.config = Some(PathBuf::from(flag_value(&args, i)?)),
            "--notes" => options.notes = Some(parse_flag(&args, i)?),
            "--duration" => options.duration_ms = Some(parse_flag(&args, i)?),
            "--volume" => options.volume = Some(parse_flag(&args, i)?),
            "--seed" => options.seed = Some(parse_flag(&args, i)?),
            "--storage" => options.storage = Some(PathBuf::from(flag_value(&args, i)?)),
            "--log" => options.log = Some(PathBuf::from(flag_value(&args, i)?)),
            "--list-audio" => {
                print_audio_devices();
                return Ok(());
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                bail!("unknown option {}", other);
            }
        }
        // Every remaining option takes a value
        i += 2;
    }

    play(options)
}
