//! Import and drill-down benchmarks
//!
//! - import: synthetic 10k and 40k-row exports into an in-memory database
//! - children: children-index lookup vs the edge join it replaces
//!
//! Run with: cargo bench --bench import_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use topdown::{CallGraph, ImportConfig, ProfileExport, SortKey};

/// Deterministic export of `rows` frames with a repeating depth pattern.
fn synthetic_export(rows: usize) -> String {
    let depths = [0usize, 1, 2, 3, 2, 3, 4, 1, 2, 1];
    let mut text = String::from("Function Stack;CPU Time:Total;CPU Time:Self;Function (Full)\n");
    text.push_str(&format!("Total;{}.0;0.0;\n", rows));
    for i in 0..rows {
        let depth = depths[i % depths.len()];
        text.push_str(&format!(
            "{}fn_{};{}.5;0.5;bench::module_{}::fn_{}(int, double)\n",
            " ".repeat(depth),
            i,
            rows - i,
            i % 17,
            i
        ));
    }
    text
}

fn benchmark_import(c: &mut Criterion) {
    let config = ImportConfig::default();

    let mut group = c.benchmark_group("import");
    group.sample_size(10);

    // Row counts several times apart expose any per-row cost that grows with the store.
    for rows in [10_000usize, 40_000] {
        let text = synthetic_export(rows);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_with_input(BenchmarkId::new("parse_only", rows), &text, |b, text| {
            b.iter(|| ProfileExport::from_text(black_box(text), &config))
        });

        let export = ProfileExport::from_text(&text, &config);
        group.bench_with_input(BenchmarkId::new("import_rows", rows), &export, |b, export| {
            b.iter(|| {
                let mut graph = CallGraph::open_in_memory().unwrap();
                black_box(graph.import(export, &config).unwrap())
            })
        });
    }
    group.finish();
}

fn benchmark_children(c: &mut Criterion) {
    let config = ImportConfig::default();
    let export = ProfileExport::from_text(&synthetic_export(10_000), &config);
    let mut graph = CallGraph::open_in_memory().unwrap();
    graph.import(&export, &config).unwrap();
    let parents: Vec<String> = graph
        .list_nodes(SortKey::Total, Some(200))
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();

    let mut group = c.benchmark_group("children");
    group.throughput(Throughput::Elements(parents.len() as u64));

    group.bench_function("children_index", |b| {
        b.iter(|| {
            for id in &parents {
                black_box(graph.get_children(black_box(id)).unwrap());
            }
        })
    });

    group.bench_function("edge_join", |b| {
        b.iter(|| {
            for id in &parents {
                black_box(graph.children_direct(black_box(id)).unwrap());
            }
        })
    });
    group.finish();
}

criterion_group!(benches, benchmark_import, benchmark_children);
criterion_main!(benches);
