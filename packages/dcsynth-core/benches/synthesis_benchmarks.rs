//! Performance benchmarks for synthesis
//!
//! - Composition of chain plants with growing length
//! - Communication classification
//! - Protocol enumeration, sequential vs rayon

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dcsynth_core::config::SearchConfig;
use dcsynth_core::{Automaton, ProtocolSearch, TextFormat, UStructure};

const TWO_CONTROLLER_PLANT: &str = "\
[controllers]
2
[states]
@1,F
2,F
3,F
4,F
5,F
6,F
7,F
[events]
a,TF,TF
b,FT,FT
o,TT,TF
[transitions]
1,a,2
1,b,3
2,b,4
3,a,5
4,o,6
5,o,7:BAD
";

/// Chain with alternating events hidden from one controller each
fn chain(length: usize) -> Automaton {
    let mut doc = String::from("[controllers]\n2\n[states]\n@1,F\n");
    for i in 2..=length + 1 {
        doc.push_str(&format!("{},F\n", i));
    }
    doc.push_str("[events]\nx,TF,TF\ny,FT,FT\n[transitions]\n");
    for i in 1..=length {
        let event = if i % 2 == 0 { "y" } else { "x" };
        doc.push_str(&format!("{},{},{}\n", i, event, i + 1));
    }
    TextFormat::parse_document(&doc).unwrap()
}

fn scenario() -> UStructure {
    TextFormat::parse_document(TWO_CONTROLLER_PLANT)
        .unwrap()
        .synchronized_composition()
        .unwrap()
        .add_communications()
        .unwrap()
}

// ============================================================================
// Composition
// ============================================================================

fn bench_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("composition");

    for length in [4, 8, 16] {
        let plant = chain(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &plant, |b, plant| {
            b.iter(|| black_box(plant.synchronized_composition().unwrap()));
        });
    }

    group.finish();
}

fn bench_communications(c: &mut Criterion) {
    let u = TextFormat::parse_document(TWO_CONTROLLER_PLANT)
        .unwrap()
        .synchronized_composition()
        .unwrap();
    c.bench_function("add_communications", |b| {
        b.iter(|| black_box(u.add_communications().unwrap()));
    });
}

// ============================================================================
// Protocol search
// ============================================================================

fn bench_protocol_search(c: &mut Criterion) {
    let u = scenario();
    let candidates = u.candidates();
    let mut group = c.benchmark_group("protocol_search");

    for parallel in [false, true] {
        let config = SearchConfig {
            parallel,
            parallel_threshold: 1,
            ..SearchConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(if parallel { "rayon" } else { "sequential" }),
            &config,
            |b, config| {
                b.iter(|| {
                    let search = ProtocolSearch::new(&u, config.clone());
                    black_box(search.all_feasible(&candidates, false).unwrap())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_composition,
    bench_communications,
    bench_protocol_search,
);

criterion_main!(benches);
