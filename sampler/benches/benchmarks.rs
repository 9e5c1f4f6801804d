use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use raster::{Grid, GridSpec, Raster};
use sampler::{extract, Layers, Site};
use std::sync::Arc;
use terrain::Slope;

/// 1000x1000 cells of 3 arc-seconds, with a gap every seventh cell so
/// that tolerance sampling has to search.
fn grid() -> Grid {
    let cs = 3.0 / 3600.0;
    let spec = GridSpec::new(33.0, -2.0, cs, 1000, 1000).unwrap();
    #[allow(clippy::cast_precision_loss)]
    let grid = Grid::from_fn(spec, |col, row| {
        ((col + row) % 7 != 0).then_some((col * row) as f64 % 1500.0)
    });
    grid
}

fn sites(n: u32) -> Vec<Site> {
    (0..n)
        .map(|i| {
            let f = f64::from(i) / f64::from(n);
            Site::new(Some(i.to_string()), 33.01 + f * 0.8, -2.01 - f * 0.8)
        })
        .collect()
}

fn extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Extract");

    let elevation: Arc<dyn Raster> = Arc::new(grid());
    let slope: Arc<dyn Raster> = Arc::new(Slope::new(Arc::clone(&elevation)));
    let layers = Layers::new(
        Arc::clone(&elevation),
        slope,
        Arc::clone(&elevation),
        elevation,
    )
    .rewrite_zeros(1e-10);

    for n in [10, 1_000, 100_000] {
        let sites = sites(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &sites, |b, sites| {
            b.iter(|| extract(sites, &layers, 5.0));
        });
    }
}

criterion_group!(benches, extraction);
criterion_main!(benches);
