#![allow(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::similar_names
)]
use std::collections::HashMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use proptest::{
    prelude::{Strategy, any},
    strategy::ValueTree,
    test_runner::TestRunner,
};
use robinhood::{Fnv1a32, GrowthPolicy, RobinHoodTable, TableConfig};

const ITEMS_AMOUNT: usize = 1000;
const SAMPLE_SIZE: usize = 10;

fn hash_table_benches(c: &mut Criterion) {
    let mut runner = TestRunner::default();
    let items = any::<[(String, String); ITEMS_AMOUNT]>().new_tree(&mut runner).unwrap().current();

    let mut group = c.benchmark_group("Hash table comparison benchmark");
    group.sample_size(SAMPLE_SIZE);

    group.bench_function("robin hood insert", |b| {
        b.iter(|| {
            let mut table = RobinHoodTable::new();
            for (key, value) in items.clone() {
                table.insert(key, value);
            }
            table
        });
    });
    group.bench_function("robin hood insert fnv1a", |b| {
        b.iter(|| {
            let mut table = RobinHoodTable::with_hasher(&TableConfig::new(), Fnv1a32).unwrap();
            for (key, value) in items.clone() {
                table.insert(key, value);
            }
            table
        });
    });
    group.bench_function("rust std insert", |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            for (key, value) in items.clone() {
                map.insert(key, value);
            }
            map
        });
    });

    let robin_hood_table: RobinHoodTable<String, String> = items.iter().cloned().collect();
    let rust_map: HashMap<String, String> = items.iter().cloned().collect();
    group.bench_function("robin hood find", |b| {
        b.iter(|| {
            for (key, _) in &items {
                black_box(robin_hood_table.find(key));
            }
        });
    });
    group.bench_function("rust std get", |b| {
        b.iter(|| {
            for (key, _) in &items {
                black_box(rust_map.get(key));
            }
        });
    });

    let config = TableConfig::new().set_growth_policy(GrowthPolicy::CopyVerbatim);
    group.bench_function("robin hood insert erase copy verbatim", |b| {
        b.iter(|| {
            let mut table = RobinHoodTable::with_config(&config).unwrap();
            for (key, value) in &items {
                table.insert(key.as_str(), value.as_str());
            }
            for (key, _) in items.iter().step_by(2) {
                table.erase(key);
            }
            black_box(table.average_probe_distance())
        });
    });
    group.finish();
}

criterion_group!(benches, hash_table_benches);

criterion_main!(benches);
