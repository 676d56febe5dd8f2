use bevy_math::DVec3;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ptsearch::PointSearch;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded(n: usize) -> PointSearch {
    let mut rng = StdRng::seed_from_u64(99);
    let mut search = PointSearch::new();
    for _ in 0..n {
        let x = rng.gen_range(0.0..1000.0);
        let y = rng.gen_range(0.0..1000.0);
        search.add_point(DVec3::new(x, y, 0.0), DVec3::ZERO).unwrap();
    }
    search
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("refine");
    group.sample_size(30);

    group.bench_function("refine_times_10", |b| {
        b.iter_batched(
            || seeded(20_000),
            |mut search| {
                black_box(search.refine_times(black_box(10)).unwrap());
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("refine_until_avg_list_len_4", |b| {
        b.iter_batched(
            || seeded(20_000),
            |mut search| {
                black_box(search.refine_until(0, 0.0, black_box(4.0)).unwrap());
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
