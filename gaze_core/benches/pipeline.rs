use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use gaze_core::{GazeSample, RectLayout, SessionCfg, build_session, runner};

// Synthetic reading trace: left-to-right sweeps over lines with jitter and
// the odd wild sample, at ~30 Hz.
fn synth_trace(n: usize, seed: u32) -> Vec<GazeSample> {
    // tiny PRNG
    let mut state = seed.max(1);
    let mut next_f64 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    };
    let mut v = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f64 * 33.0;
        let word = (i / 8) % 12;
        let line = (i / 96) % 30;
        let mut x = 60.0 + word as f64 * 95.0 + (next_f64() - 0.5) * 12.0;
        let mut y = 40.0 + line as f64 * 24.0 + (next_f64() - 0.5) * 12.0;
        if next_f64() < 0.02 {
            x += 900.0;
            y -= 600.0;
        }
        v.push(GazeSample::new(x, y, t));
    }
    v
}

fn synth_layout() -> RectLayout {
    let mut l = RectLayout::new();
    for line in 0..30usize {
        for word in 0..12usize {
            l.push(
                format!("page-1-span-{}", line * 12 + word),
                1,
                20.0 + word as f64 * 95.0,
                30.0 + line as f64 * 24.0,
                90.0,
                22.0,
            );
        }
    }
    l
}

pub fn bench_pipeline(c: &mut Criterion) {
    let mut g = c.benchmark_group("pipeline");
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p gaze_core --bench pipeline
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(30);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    for &n in &[1_000usize, 10_000] {
        let trace = synth_trace(n, 0xC0FFEE);
        g.bench_function(format!("replay_{n}"), |b| {
            b.iter_batched(
                || build_session(synth_layout(), SessionCfg::default()).unwrap(),
                |mut s| {
                    let sum = runner::replay(&mut s, black_box(&trace));
                    black_box(sum.result.coverage_percent);
                },
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

criterion_group!(pipeline, bench_pipeline);
criterion_main!(pipeline);
