//! End-to-end tests through the public API.

use recflow::{
    compile, transform, validate, BlockError, Context, Engine, JobError, Outcome, Record,
};
use serde_json::{json, Value};

fn rec(v: Value) -> Record {
    v.as_object().cloned().unwrap()
}

fn single_step(uses: &str, with: Value) -> Value {
    json!({"steps": [{"uses": uses, "with": with}]})
}

fn run_one(decl: &Value, input: Value) -> (Value, Outcome) {
    let res = transform(decl, vec![rec(input)], None, None);
    assert_eq!(res.len(), 1);
    let (mut records, mut outcomes) = res.into_parts();
    (Value::Object(records.remove(0)), outcomes.remove(0))
}

#[test]
fn add_field_jmespath_join() {
    let decl = single_step(
        "add_field",
        json!({"field": "full_name", "language": "jmespath", "expression": "join(' ', [fname, lname])"}),
    );
    let (out, outcome) = run_one(&decl, json!({"fname": "john", "lname": "doe"}));
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(
        out,
        json!({"fname": "john", "lname": "doe", "full_name": "john doe"})
    );
}

#[test]
fn add_field_escaped_dot_target() {
    let decl = single_step(
        "add_field",
        json!({"field": "name\\.full_name", "language": "jmespath", "expression": "join(' ', [fname, lname])"}),
    );
    let (out, outcome) = run_one(&decl, json!({"fname": "john", "lname": "doe"}));
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(out["name.full_name"], json!("john doe"));
    assert!(out.get("name").is_none());
}

#[test]
fn map_sql_projection_replaces_record() {
    for expression in [json!({"new_field": "fname"}), json!(r#"{"new_field": "fname"}"#)] {
        let decl = single_step("map", json!({"language": "sql", "expression": expression}));
        let (out, outcome) = run_one(&decl, json!({"fname": "john", "lname": "doe"}));
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(out, json!({"new_field": "john"}));
    }
}

#[test]
fn map_sql_nested_reference() {
    let decl = single_step(
        "map",
        json!({"language": "sql", "expression": {"name": "(`details.fname`)"}}),
    );
    let (out, outcome) = run_one(&decl, json!({"details": {"fname": "john", "lname": "doe"}}));
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(out, json!({"name": "john"}));
}

#[test]
fn remove_field_absent_path() {
    let decl = single_step("remove_field", json!({"field": "b.c"}));
    let (out, outcome) = run_one(&decl, json!({"a": 1}));
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(out, json!({"a": 1}));
}

#[test]
fn unknown_block_kind() {
    let decl = single_step("frobnicate", json!({}));
    let err = compile(&decl, None).unwrap_err();
    match err {
        JobError::Step { index, kind, source } => {
            assert_eq!(index, 0);
            assert_eq!(kind, "frobnicate");
            assert!(matches!(source, BlockError::UnknownKind { .. }));
        }
        other => panic!("unexpected: {other}"),
    }
}

#[test]
fn allow_list_rejects_before_resolution() {
    let allowed = vec!["add_field".to_string()];
    for kind in ["map", "frobnicate"] {
        let err = validate(&single_step(kind, json!({})), Some(&allowed)).unwrap_err();
        assert!(
            matches!(err, JobError::Step { source: BlockError::NotAllowed { .. }, .. }),
            "{kind}: {err}"
        );
    }
}

#[test]
fn outcomes_follow_input_order() {
    let decl = json!({"steps": [
        {"uses": "filter", "with": {"language": "sql", "expression": "n % 3 <> 0"}},
        {"uses": "add_field", "with": {"field": "inv", "language": "sql", "expression": "10 / (n - 4)"}},
        {"uses": "add_field", "with": {"field": "tag", "language": "jmespath", "expression": "concat(['r', to_string(n)])"}}
    ]});
    let batch: Vec<Record> = (0..8).map(|n| rec(json!({"n": n}))).collect();
    let res = transform(&decl, batch.clone(), None, None);

    assert_eq!(res.len(), batch.len());
    for (i, (record, outcome)) in res.records.iter().zip(&res.outcomes).enumerate() {
        assert_eq!(record["n"], json!(i), "record {i} moved");
        match i {
            0 | 3 | 6 => {
                assert_eq!(*outcome, Outcome::Filtered);
                assert_eq!(Value::Object(record.clone()), json!({"n": i}));
            }
            _ => {
                assert_eq!(*outcome, Outcome::Success, "record {i}");
                assert_eq!(record["tag"], json!(format!("r{i}")));
            }
        }
    }
}

#[test]
fn sql_null_propagates_instead_of_rejecting() {
    let decl = single_step(
        "add_field",
        json!({"field": "inv", "language": "sql", "expression": "10 / (n - 4)"}),
    );
    let (out, outcome) = run_one(&decl, json!({"n": 4}));
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(out["inv"], Value::Null);
}

#[test]
fn double_init_does_not_change_results() {
    let decl = json!({"steps": [
        {"uses": "add_field", "with": {"field": "full", "language": "sql", "expression": "fname || ' ' || lname"}},
        {"uses": "map", "with": {"language": "jmespath", "expression": "{full: full}"}}
    ]});
    let batch = vec![rec(json!({"fname": "john", "lname": "doe"}))];
    let ctx = Context::new();
    let engine = Engine::default();

    let mut once = compile(&decl, None).unwrap();
    once.init(&ctx).unwrap();
    let a = engine.run(&mut once, batch.clone(), &ctx);

    let mut twice = compile(&decl, None).unwrap();
    twice.init(&ctx).unwrap();
    twice.init(&ctx).unwrap();
    let b = engine.run(&mut twice, batch, &ctx);

    assert_eq!(a, b);
    assert_eq!(a.records[0]["full"], json!("john doe"));
}

#[test]
fn compiled_job_is_reusable_across_batches() {
    let decl = single_step(
        "add_field",
        json!({"field": "double", "language": "sql", "expression": "n * 2"}),
    );
    let mut job = compile(&decl, None).unwrap();
    let ctx = Context::new();
    let engine = Engine::default();

    for n in 0..3 {
        let res = engine.run(&mut job, vec![rec(json!({"n": n}))], &ctx);
        assert_eq!(res.records[0]["double"], json!(n * 2));
    }
}

#[test]
fn internal_fields_survive_the_pipeline() {
    let decl = json!({"steps": [
        {"uses": "map", "with": {"language": "sql", "expression": {"id": "id"}}},
        {"uses": "add_field", "with": {"field": "seen", "language": "jmespath", "expression": "`true`"}}
    ]});
    let (out, outcome) = run_one(
        &decl,
        json!({"id": 1, "secret": "x", "__$$msg_id": "m-1", "__$$opcode": "u"}),
    );
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(
        out,
        json!({"id": 1, "seen": true, "__$$msg_id": "m-1", "__$$opcode": "u"})
    );
}

#[test]
fn invalid_properties_degrade_to_rejected_batch() {
    let decl = single_step("map", json!({"language": "cobol", "expression": "x"}));
    let batch = vec![rec(json!({"a": 1})), rec(json!({"a": 2}))];
    let res = transform(&decl, batch.clone(), None, None);
    assert_eq!(res.records, batch);
    assert_eq!(res.tally(), (0, 2, 0));
}

#[test]
fn reserved_fields_cannot_be_removed_or_renamed() {
    let remove = single_step("remove_field", json!({"field": "__$$msg_id"}));
    assert!(matches!(
        validate(&remove, None),
        Err(JobError::Step { index: 0, .. })
    ));

    let decl = json!({"steps": [
        {"uses": "add_field", "with": {"field": "a", "language": "sql", "expression": "1"}},
        {"uses": "rename_field", "with": {"from_field": "__$$opcode", "to_field": "op"}}
    ]});
    assert!(matches!(
        validate(&decl, None),
        Err(JobError::Step { index: 1, .. })
    ));

    let input = json!({"__$$msg_id": "m1", "__$$opcode": "u"});
    let res = transform(&decl, vec![rec(input.clone())], None, None);
    assert_eq!(res.tally(), (0, 1, 0));
    assert_eq!(Value::Object(res.records[0].clone()), input);
}

#[test]
fn sql_filter_over_columns_validates() {
    let decl = single_step("filter", json!({"language": "sql", "expression": "a = 'b'"}));
    assert!(validate(&decl, None).is_ok());
    let (_, outcome) = run_one(&decl, json!({"a": "b"}));
    assert_eq!(outcome, Outcome::Success);
}
