//! Band dynamics benchmarks

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gott_core::{CompressorCurve, DetectionLaw, SidechainConfig};
use gott_dsp::MonoProcessor;
use gott_dsp::dynamics::BandCompressor;
use gott_dsp::sidechain::SidechainDetector;

fn bench_detector(c: &mut Criterion) {
    let mut group = c.benchmark_group("detector");

    for law in [
        DetectionLaw::Peak,
        DetectionLaw::Rms,
        DetectionLaw::Lpf,
        DetectionLaw::Sma,
    ] {
        let config = SidechainConfig {
            law,
            ..SidechainConfig::default()
        };
        let mut detector = SidechainDetector::new(&config, 48000.0);
        let mut buffer: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.01).sin() * 0.5).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", law)),
            &law,
            |b, _| {
                b.iter(|| {
                    detector.process_block(black_box(&mut buffer));
                })
            },
        );
    }

    group.finish();
}

fn bench_band_compressor(c: &mut Criterion) {
    let mut comp = BandCompressor::new(CompressorCurve::default(), 48000.0);
    let envelope: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.01).sin().abs()).collect();
    let mut gains = vec![0.0; 1024];

    c.bench_function("band_compressor_1024", |b| {
        b.iter(|| {
            for (gain, &env) in gains.iter_mut().zip(black_box(&envelope)) {
                *gain = comp.process(env);
            }
        })
    });
}

criterion_group!(benches, bench_detector, bench_band_compressor);
criterion_main!(benches);
