use criterion::{
    criterion_group,
    criterion_main,
    BenchmarkGroup,
    Criterion,
    SamplingMode
};
use criterion::measurement::WallTime;

use rand::SeedableRng;

use rand_chacha::ChaCha8Rng;

use sudoku_merge::{BoardPlacement, Difficulty};
use sudoku_merge::deadline::{Deadline, MonotonicClock};
use sudoku_merge::generator::{Generator, Reducer};
use sudoku_merge::merge::MergeGenerator;

use std::time::Duration;

// Explanation of benchmark classes:
//
// single board: The full pipeline (fill + hint removal) for a layout of one
//               board, the dominant cost of ordinary requests.
// block overlap: Two boards sharing one 3x3 block, exercising overlap
//                resolution and constrained filling.
// chain: Four boards in a diagonal chain, the largest layout the default
//        configuration accepts.

fn merge_generator(seed: u64) -> MergeGenerator<ChaCha8Rng> {
    MergeGenerator::new(
        Generator::new(ChaCha8Rng::seed_from_u64(seed)),
        Reducer::new(ChaCha8Rng::seed_from_u64(seed.wrapping_add(1))),
        4)
}

fn bench_layout(group: &mut BenchmarkGroup<'_, WallTime>, name: &str,
        layout: &[BoardPlacement]) {
    let mut generator = merge_generator(42);

    group.bench_function(name, |b| b.iter(|| {
        let clock = MonotonicClock::start();
        let deadline = Deadline::from_millis(&clock, 60_000);
        generator.generate(layout, Difficulty::Normal, &deadline).unwrap()
    }));
}

fn benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    bench_layout(&mut group, "single board",
        &[BoardPlacement::new("1", 0, 0)]);

    bench_layout(&mut group, "block overlap", &[
        BoardPlacement::new("1", 0, 0),
        BoardPlacement::new("2", 6, 6)
    ]);

    bench_layout(&mut group, "chain", &[
        BoardPlacement::new("1", 0, 0),
        BoardPlacement::new("2", 6, 6),
        BoardPlacement::new("3", 12, 12),
        BoardPlacement::new("4", 18, 18)
    ]);

    group.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
