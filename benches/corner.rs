use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mcmc_corner::corner::{self, CornerConfig};
use mcmc_corner::SampleTensor;
use ndarray::Array3;

fn samples(n_dims: usize) -> SampleTensor {
    let data = Array3::from_shape_fn((32, 1_000, n_dims), |(c, s, d)| {
        ((c * 1_000 + s) as f64 * (0.013 + 0.007 * d as f64)).sin() * (1.0 + d as f64)
    });
    SampleTensor::new(data).expect("Expected benchmark samples to be valid")
}

fn bench_corner(c: &mut Criterion) {
    let mut group = c.benchmark_group("corner_build");
    for n_dims in [2, 4, 8, 12] {
        let s = samples(n_dims);
        let config = CornerConfig::default();
        group.bench_with_input(BenchmarkId::new("parallel", n_dims), &s, |b, s| {
            b.iter(|| corner::build::<&str>(black_box(s), None, &config).unwrap())
        });
        let serial = CornerConfig::default().set_parallel_threshold(usize::MAX);
        group.bench_with_input(BenchmarkId::new("serial", n_dims), &s, |b, s| {
            b.iter(|| corner::build::<&str>(black_box(s), None, &serial).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_corner);
criterion_main!(benches);
