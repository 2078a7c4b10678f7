//! Layout Conversion and WAV Write Benchmark
//!
//! Measures the per-block work done between decoder and file: deinterleaving
//! into a `PcmBlock` and serializing planes to WAV bytes.
//!
//! **Goal:** Conversion should be negligible next to Vorbis decoding

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oggcmp::audio::{deinterleave, PcmBlock};
use oggcmp::wav::{WavSpec, WavWriter};
use std::io::Cursor;

const BLOCK_FRAMES: usize = 1024;

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let interleaved: Vec<f32> = (0..BLOCK_FRAMES * 2).map(|i| (i as f32).sin()).collect();

    group.bench_function("pcm_block_fill_interleaved_stereo", |b| {
        let mut block = PcmBlock::new(2, BLOCK_FRAMES).unwrap();
        b.iter(|| {
            let frames = block.fill_interleaved(black_box(&interleaved)).unwrap();
            black_box(frames);
        });
    });

    group.bench_function("deinterleave_alloc_stereo", |b| {
        b.iter(|| {
            let planes = deinterleave(black_box(&interleaved), 2);
            black_box(planes);
        });
    });

    group.bench_function("pcm_block_round_trip_stereo", |b| {
        let mut block = PcmBlock::new(2, BLOCK_FRAMES).unwrap();
        let mut out = Vec::with_capacity(BLOCK_FRAMES * 2);
        b.iter(|| {
            block.fill_interleaved(black_box(&interleaved)).unwrap();
            out.clear();
            block.write_interleaved(&mut out);
            black_box(&out);
        });
    });

    group.finish();
}

fn bench_wav_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("wav_write");
    let planes = vec![vec![0.5f32; BLOCK_FRAMES]; 2];

    group.bench_function("write_block_stereo", |b| {
        let spec = WavSpec::new(44_100, 2).unwrap();
        b.iter(|| {
            let sink = Cursor::new(Vec::with_capacity(BLOCK_FRAMES * 8 + 68));
            let mut writer = WavWriter::new(sink, spec).unwrap();
            writer.write(black_box(&planes)).unwrap();
            black_box(writer.into_inner().unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_layout, bench_wav_write);
criterion_main!(benches);
