//! Performance benchmarks for Spider Boxes core operations
//!
//! Run with: `cargo bench -p spider-boxes-core`
//!
//! These benchmarks measure the hot paths of an editing session:
//! - Config schema generation for every built-in field type
//! - Instance creation through the validating instance store
//! - Container child appends
//! - Sanitize + validate of submitted field values

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Map};
use spider_boxes_core::renderer::{sanitize, validate, FieldConfig};
use spider_boxes_core::{
    generate_config_fields, get_core_types, ChildConfig, CoreConfig, Instance, Namespace,
    SpiderBoxes,
};
use tokio::runtime::Runtime;

/// Benchmark schema generation
///
/// Every field type against empty settings, then one type against a fully
/// populated settings map.
fn bench_generate_config_fields(c: &mut Criterion) {
    let types = get_core_types(Namespace::Field);
    let mut group = c.benchmark_group("generate_config_fields");

    group.bench_function("all_field_types_empty_settings", |b| {
        let existing = Map::new();
        b.iter(|| {
            for definition in &types {
                black_box(generate_config_fields(black_box(definition), &existing));
            }
        });
    });

    group.bench_function("select_with_settings", |b| {
        let select = types
            .iter()
            .find(|t| t.id == "select")
            .cloned()
            .unwrap();
        let existing = json!({
            "label": "Size",
            "options": "s : Small\nm : Medium\nl : Large\nxl : Extra Large",
            "multiple": true,
            "context": "product",
            "required": true
        });
        let existing = existing.as_object().cloned().unwrap();
        b.iter(|| black_box(generate_config_fields(&select, &existing)));
    });

    group.finish();
}

/// Benchmark validated instance creation
///
/// Each iteration creates a fresh id so duplicate checks never short-circuit.
fn bench_instance_create(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("create_field_instance", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let app = SpiderBoxes::in_memory(CoreConfig::default());
                let fields = app.instances(Namespace::Field);

                let start = std::time::Instant::now();
                for i in 0..iters {
                    let instance = Instance::new(format!("volume_{}", i), "range", "Volume")
                        .with_context("product")
                        .with_settings(json!({"min": 0, "max": 100, "step": 5}));
                    fields.create(instance).await.unwrap();
                }
                start.elapsed()
            })
        });
    });
}

/// Benchmark appending tabs to one container
fn bench_add_child(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("container_children");
    group.sample_size(20);

    group.bench_function("add_50_tabs", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let mut total = std::time::Duration::ZERO;

                for _ in 0..iters {
                    let app = SpiderBoxes::in_memory(CoreConfig::default());
                    let components = app.instances(Namespace::Component);
                    components
                        .create(Instance::new("layout", "tabs", "Layout"))
                        .await
                        .unwrap();

                    let start = std::time::Instant::now();
                    for _ in 0..50 {
                        components
                            .add_child("layout", ChildConfig::new())
                            .await
                            .unwrap();
                    }
                    total += start.elapsed();
                }
                total
            })
        });
    });

    group.finish();
}

/// Benchmark the submit path of a form value
fn bench_sanitize_validate(c: &mut Criterion) {
    let range = FieldConfig::new("volume", "range", "Volume")
        .with_bounds(Some(0.0), Some(100.0), Some(5.0));
    let tags = FieldConfig::new("labels", "tags", "Labels");

    c.bench_function("sanitize_validate_range", |b| {
        b.iter(|| {
            let clean = sanitize(&range, black_box(&json!("42.7")));
            black_box(validate(&range, &clean))
        });
    });

    c.bench_function("sanitize_validate_tags", |b| {
        let raw = json!("red, green, blue, red, , yellow");
        b.iter(|| {
            let clean = sanitize(&tags, black_box(&raw));
            black_box(validate(&tags, &clean))
        });
    });
}

criterion_group!(
    benches,
    bench_generate_config_fields,
    bench_instance_create,
    bench_add_child,
    bench_sanitize_validate
);
criterion_main!(benches);
