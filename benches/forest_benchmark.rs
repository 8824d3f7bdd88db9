//! Benchmarks for forest fitting, SMOTE resampling and batch scoring
//!
//! Run with: cargo bench --bench forest_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand::SeedableRng;

use riskscore::pipeline::{ClassWeight, ForestParams, MaxDepth, RandomForest, Smote};

/// Encoded-width matrix with a 70/30 class split and two informative columns
fn generate_matrix(n_rows: usize, n_features: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<u8>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut x = Vec::with_capacity(n_rows);
    let mut y = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let label = u8::from(rng.gen::<f64>() > 0.7);
        let shift = if label == 1 { 0.8 } else { -0.3 };
        let row: Vec<f64> = (0..n_features)
            .map(|j| {
                let noise: f64 = rng.gen::<f64>() * 2.0 - 1.0;
                if j < 2 {
                    shift + noise
                } else if j < 3 {
                    noise
                } else {
                    // one-hot style columns
                    f64::from(u8::from(rng.gen::<f64>() > 0.75))
                }
            })
            .collect();
        x.push(row);
        y.push(label);
    }
    (x, y)
}

fn params(n_estimators: usize, class_weight: ClassWeight) -> ForestParams {
    ForestParams {
        n_estimators,
        max_depth: MaxDepth::Limited(10),
        min_samples_split: 5,
        class_weight,
    }
}

fn benchmark_forest_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_fit");
    group.sample_size(10);

    for n_rows in [1_000, 5_000] {
        let (x, y) = generate_matrix(n_rows, 24, 42);
        group.throughput(Throughput::Elements(n_rows as u64));

        for class_weight in [ClassWeight::Balanced, ClassWeight::BalancedSubsample] {
            group.bench_with_input(
                BenchmarkId::new(class_weight.to_string(), n_rows),
                &(x.clone(), y.clone()),
                |b, (x, y)| {
                    b.iter(|| {
                        let _ = RandomForest::fit(
                            black_box(x),
                            black_box(y),
                            black_box(&params(100, class_weight)),
                            black_box(42),
                        );
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_smote(c: &mut Criterion) {
    let mut group = c.benchmark_group("smote_resample");

    for n_rows in [1_000, 5_000] {
        let (x, y) = generate_matrix(n_rows, 24, 7);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &(x, y), |b, (x, y)| {
            let smote = Smote::new(5, 42);
            b.iter(|| {
                let _ = smote.fit_resample(black_box(x), black_box(y));
            });
        });
    }

    group.finish();
}

fn benchmark_predict(c: &mut Criterion) {
    let (x, y) = generate_matrix(2_000, 24, 11);
    let forest = match RandomForest::fit(&x, &y, &params(100, ClassWeight::Balanced), 42) {
        Ok(forest) => forest,
        Err(e) => panic!("benchmark forest failed to fit: {}", e),
    };

    let mut group = c.benchmark_group("forest_predict");
    group.throughput(Throughput::Elements(x.len() as u64));
    group.bench_function("predict_proba_2000", |b| {
        b.iter(|| black_box(forest.predict_proba(black_box(&x))));
    });
    group.finish();
}

criterion_group!(benches, benchmark_forest_fit, benchmark_smote, benchmark_predict);
criterion_main!(benches);
