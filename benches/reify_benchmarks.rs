use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reify_core::attrs::{Bounds, Whitelist};
use reify_core::{from_csv, from_json, from_yaml, record, reflect_enum, to_csv, to_json, to_yaml};

// ============================================================================
// Test Data
// ============================================================================

reflect_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum LogLevel {
        Debug => "debug",
        #[default]
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Database {
        pub host: String,
        pub port: u16 => [Whitelist::integers(&[5432, 5433, 3306])],
        pub pool_size: u32 => [Bounds::new(1.0, 500.0)],
    }
}

record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct AppConfig {
        pub name: String,
        pub level: LogLevel,
        pub database: Database,
        pub replicas: Vec<Database>,
        pub tags: Vec<String>,
    }
}

record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Item {
        pub id: u64,
        pub name: String,
        pub value: f64,
        pub active: bool,
    }
}

const SMALL_YAML: &str = r#"
name: billing
level: warn
database: {host: localhost, port: 5432, pool_size: 20}
replicas: []
tags: [a, b, c]
"#;

const BROKEN_YAML: &str = r#"
name: [billing]
level: verbose
database: {host: localhost, port: 9999, pool_size: 0, extra: 1}
replicas:
  - {host: r1, port: 5433}
  - {port: three}
tags: oops
"#;

fn generate_items_yaml(size: usize) -> String {
    let mut yaml = String::from("items:\n");
    for i in 0..size {
        yaml.push_str(&format!(
            "  - {{id: {}, name: \"Item {}\", value: {}, active: {}}}\n",
            i,
            i,
            i * 100,
            i % 2 == 0
        ));
    }
    yaml
}

record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Catalog {
        pub items: Vec<Item>,
    }
}

fn generate_items(size: usize) -> Vec<Item> {
    (0..size)
        .map(|i| Item {
            id: i as u64,
            name: format!("Item {i}"),
            value: i as f64 * 1.5,
            active: i % 3 == 0,
        })
        .collect()
}

// ============================================================================
// Deserialization Benchmarks
// ============================================================================

fn bench_from_yaml(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_yaml");
    for (name, source) in [("valid", SMALL_YAML), ("broken", BROKEN_YAML)] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| from_yaml::<AppConfig>(black_box(src)))
        });
    }
    group.finish();
}

fn bench_from_yaml_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_yaml_array_scaling");
    for size in [10, 100, 1000] {
        let source = generate_items_yaml(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, src| {
            b.iter(|| from_yaml::<Catalog>(black_box(src)))
        });
    }
    group.finish();
}

// ============================================================================
// Round-Trip Benchmarks
// ============================================================================

fn bench_round_trips(c: &mut Criterion) {
    let catalog = Catalog {
        items: generate_items(200),
    };
    let mut group = c.benchmark_group("round_trip");
    group.bench_function("yaml", |b| {
        b.iter(|| {
            let text = to_yaml(black_box(&catalog)).unwrap();
            from_yaml::<Catalog>(&text)
        })
    });
    group.bench_function("json", |b| {
        b.iter(|| {
            let text = to_json(black_box(&catalog)).unwrap();
            from_json::<Catalog>(&text)
        })
    });
    group.bench_function("csv", |b| {
        b.iter(|| {
            let text = to_csv(black_box(&catalog.items)).unwrap();
            from_csv::<Item>(&text)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_from_yaml,
    bench_from_yaml_scaling,
    bench_round_trips
);
criterion_main!(benches);
