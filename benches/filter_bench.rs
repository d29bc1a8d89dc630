//! Filter kernel and factorization benchmarks.
//!
//! Run with:
//!
//! ```bash
//! cargo bench --bench filter_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use helix_filter::{Grid2, HelixLags, MinimumPhaseFilter};

fn test_grid(n1: usize, n2: usize) -> Grid2 {
    let v = (0..n1 * n2)
        .map(|i| (i as f32 * 0.37).sin())
        .collect::<Vec<_>>();
    Grid2::from_vec(n1, n2, v)
}

fn bench_apply2(c: &mut Criterion) {
    let lags = HelixLags::new2(&[0, 1, -1, 0, 1], &[0, 0, 1, 1, 1]).unwrap();
    let filter =
        MinimumPhaseFilter::with_coefficients(lags, &[1.0, 0.25, 0.1, 0.3, 0.15]).unwrap();

    let mut group = c.benchmark_group("apply2");
    for n in [64_usize, 256, 512] {
        let x = test_grid(n, n);
        let mut y = Grid2::zeros(n, n);
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| {
                filter.apply2(black_box(&x), &mut y);
                black_box(y.at(n / 2, n / 2))
            })
        });
    }
    group.finish();
}

fn bench_apply_inverse2(c: &mut Criterion) {
    let lags = HelixLags::new2(&[0, 1, -1, 0, 1], &[0, 0, 1, 1, 1]).unwrap();
    let filter =
        MinimumPhaseFilter::with_coefficients(lags, &[1.0, 0.25, 0.1, 0.3, 0.15]).unwrap();

    let mut group = c.benchmark_group("apply_inverse2");
    for n in [64_usize, 256, 512] {
        let x = test_grid(n, n);
        let mut y = Grid2::zeros(n, n);
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| {
                filter.apply_inverse2(black_box(&x), &mut y);
                black_box(y.at(n / 2, n / 2))
            })
        });
    }
    group.finish();
}

fn bench_factor_wilson_burg1(c: &mut Criterion) {
    // Auto-correlation of the filter (1.0, -0.9, 0.2), padded to length 11.
    let f = [1.0_f32, -0.9, 0.2];
    let mut r = vec![0.0_f32; 11];
    for k in 0..3_usize {
        let mut rk = 0.0;
        for n in 0..3 - k {
            rk += f[n] * f[n + k];
        }
        r[5 + k] = rk;
        r[5 - k] = rk;
    }

    c.bench_function("factor_wilson_burg1", |b| {
        b.iter(|| {
            let mut filter =
                MinimumPhaseFilter::new(HelixLags::new1(&[0, 1, 2, 3, 4]).unwrap());
            filter
                .factor_wilson_burg1(100, 1e-6, black_box(&r))
                .unwrap();
            black_box(filter.a0())
        })
    });
}

criterion_group!(
    benches,
    bench_apply2,
    bench_apply_inverse2,
    bench_factor_wilson_burg1
);
criterion_main!(benches);
