use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use recflow::{compile, Context, Engine, Job, Record};

fn make_batch(rows: usize) -> Vec<Record> {
    (0..rows)
        .map(|i| {
            json!({
                "id": i,
                "fname": format!("first-{}", i % 16),
                "lname": format!("last-{}", i % 7),
                "details": {"age": 20 + (i % 50), "city": "lisbon"},
                "__$$msg_id": format!("m-{i}")
            })
            .as_object()
            .cloned()
            .unwrap()
        })
        .collect()
}

fn job(decl: Value) -> Job {
    let mut job = compile(&decl, None).unwrap();
    job.init(&Context::new()).unwrap();
    job
}

fn bench_jmespath_add_field(c: &mut Criterion) {
    let batch = make_batch(1024);
    let engine = Engine::default();
    let ctx = Context::new();
    let mut job = job(json!({"steps": [{"uses": "add_field", "with": {
        "field": "full_name", "language": "jmespath",
        "expression": "join(' ', [fname, lname])"
    }}]}));
    c.bench_function("add_field_jmespath", |b| {
        b.iter(|| engine.run(&mut job, batch.clone(), &ctx))
    });
}

fn bench_sql_map(c: &mut Criterion) {
    let batch = make_batch(1024);
    let engine = Engine::default();
    let ctx = Context::new();
    let mut job = job(json!({"steps": [{"uses": "map", "with": {
        "language": "sql",
        "expression": {"name": "fname || ' ' || lname", "age": "`details.age` + 1"}
    }}]}));
    c.bench_function("map_sql", |b| {
        b.iter(|| engine.run(&mut job, batch.clone(), &ctx))
    });
}

fn bench_mixed_pipeline(c: &mut Criterion) {
    let batch = make_batch(1024);
    let engine = Engine::default();
    let ctx = Context::new();
    let mut job = job(json!({"steps": [
        {"uses": "filter", "with": {"language": "sql", "expression": "id % 2 = 0"}},
        {"uses": "rename_field", "with": {"from_field": "details.city", "to_field": "city"}},
        {"uses": "remove_field", "with": {"field": "details"}}
    ]}));
    c.bench_function("filter_rename_remove", |b| {
        b.iter(|| engine.run(&mut job, batch.clone(), &ctx))
    });
}

criterion_group!(
    pipelines,
    bench_jmespath_add_field,
    bench_sql_map,
    bench_mixed_pipeline
);
criterion_main!(pipelines);
