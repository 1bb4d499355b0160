use criterion::{black_box, criterion_group, criterion_main, Criterion};
use greenguard_core::{AvlTree, ControlConfig, ControlOrchestrator, Reading, SensorMap};

fn greenhouse() -> SensorMap {
    [
        ("TEMP", 25.0),
        ("SOIL_MOISTURE", 65.0),
        ("REL_HUMIDITY", 70.0),
        ("LIGHT", 600.0),
        ("PH", 6.5),
        ("CO2", 800.0),
        ("WATER_LEVEL", 500.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn bench_tick(c: &mut Criterion) {
    let values = greenhouse();

    for (name, config) in [
        ("tick_rule_tree", ControlConfig::default()),
        ("tick_state_graph", ControlConfig::state_graph()),
    ] {
        let mut orchestrator = match ControlOrchestrator::new(config) {
            Ok(o) => o,
            Err(e) => panic!("invalid config: {e}"),
        };
        let mut timestamp = 0u64;
        c.bench_function(name, |b| {
            b.iter(|| {
                timestamp += 1;
                black_box(orchestrator.tick(timestamp, &values).is_ok());
            });
        });
    }
}

fn bench_time_index(c: &mut Criterion) {
    let readings: Vec<Reading> = (0..10_000u64)
        .map(|ts| Reading::classified(ts, "TEMP", 20.0 + (ts % 10) as f64))
        .collect();

    c.bench_function("avl_insert_10k_ascending", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for r in &readings {
                tree.insert(r.clone());
            }
            black_box(tree.height());
        });
    });

    let tree: AvlTree<Reading> = readings.iter().cloned().collect();
    c.bench_function("avl_range_by_time", |b| {
        b.iter(|| black_box(tree.range_by_key(&4_000, &4_100, Reading::timestamp).len()));
    });
}

criterion_group!(benches, bench_tick, bench_time_index);
criterion_main!(benches);
