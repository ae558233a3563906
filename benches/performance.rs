// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for Simon
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Tone rendering in the audio callback
//! - Timeline scheduling throughput
//! - Engine turn processing

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use simon::audio::{Timbre, ToneRequest, ToneSettings, ToneSynth};
use simon::game::{GameConfig, SequenceEngine, Timeline, TurnPhase};

/// Benchmark mixing voices into one stereo callback buffer
fn bench_tone_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("tone_render");

    for voices in [1usize, 4, 16].iter() {
        group.bench_with_input(BenchmarkId::new("voices", voices), voices, |b, &voices| {
            let settings = ToneSettings {
                volume: 0.5,
                timbre: Timbre::Triangle,
            };
            let mut synth = ToneSynth::with_settings(settings, 44100);
            for note in 0..voices {
                let _ = synth.play(ToneRequest::note(note % 24));
            }
            let mut buffer = vec![0.0f32; 512 * 2];

            b.iter(|| {
                synth.render(black_box(&mut buffer), 2);
                black_box(buffer[0])
            })
        });
    }

    for timbre in Timbre::ALL.iter() {
        group.bench_with_input(
            BenchmarkId::new("timbre", timbre.name()),
            timbre,
            |b, &timbre| {
                let mut synth = ToneSynth::with_settings(
                    ToneSettings {
                        volume: 0.5,
                        timbre,
                    },
                    44100,
                );
                let _ = synth.play(ToneRequest::note(9));
                let mut buffer = vec![0.0f32; 512 * 2];

                b.iter(|| {
                    synth.render(black_box(&mut buffer), 2);
                    black_box(buffer[0])
                })
            },
        );
    }

    group.finish();
}

/// Benchmark scheduling and draining deferred steps
fn bench_timeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("drain", size), size, |b, &size| {
            b.iter_batched(
                || {
                    let mut timeline = Timeline::new();
                    for i in 0..size {
                        timeline.schedule(Duration::from_millis(i as u64 * 7 % 1000), 0, i);
                    }
                    timeline
                },
                |mut timeline| {
                    let mut count = 0;
                    while timeline.pop_due(Duration::from_secs(1)).is_some() {
                        count += 1;
                    }
                    black_box(count)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark full turns: playback, a correct reproduction, the pause
fn bench_engine_turns(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    for turns in [5usize, 20, 50].iter() {
        group.bench_with_input(BenchmarkId::new("turns", turns), turns, |b, &turns| {
            b.iter(|| {
                let mut engine = SequenceEngine::new(GameConfig::with_notes(4).seed(1))
                    .expect("valid config");
                let step = engine.config().note_duration();
                engine.start();

                for _ in 0..turns {
                    while engine.phase() != TurnPhase::AwaitingInput {
                        let wait = engine.time_to_next_event().unwrap_or(step);
                        engine.advance(wait);
                    }
                    for note in engine.sequence().to_vec() {
                        engine.hit_note(note);
                        engine.advance(step);
                    }
                }
                black_box(engine.sequence().len())
            })
        });
    }

    group.bench_function("start_reset", |b| {
        let mut engine =
            SequenceEngine::new(GameConfig::with_notes(4).seed(2)).expect("valid config");
        b.iter(|| {
            engine.start();
            engine.reset();
            black_box(engine.generation())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_tone_render, bench_timeline, bench_engine_turns);

criterion_main!(benches);
