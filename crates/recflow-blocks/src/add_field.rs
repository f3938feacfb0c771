//! `add_field`: write expression results into records.
//!
//! ```yaml
//! - uses: add_field
//!   with:
//!     fields:
//!       - field: full_name
//!         language: jmespath
//!         expression: join(' ', [fname, lname])
//! ```
//!
//! Fields are applied in declaration order, so a later expression sees the
//! values written by earlier ones. A record is rejected as a whole if any of
//! its fields fails; it is then handed back as it came in.

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use recflow_core::context::Context;
use recflow_core::path::FieldPath;
use recflow_core::types::{BlockOutput, Outcome, Record};
use recflow_expr::{CompiledExpression, ExpressionSource, Language};

use crate::error::{BlockError, Result};
use crate::props::{statement_cache, field_path, ExpressionProps, OneOrMany};
use crate::schema::PropertySchema;
use crate::traits::{Block, BlockKind};

static SCHEMA: Lazy<PropertySchema> = Lazy::new(|| {
    PropertySchema::new(
        AddField::KIND,
        include_str!("../schemas/add_field.schema.json"),
    )
});

#[derive(Debug, Deserialize)]
struct FieldProps {
    field: String,
    #[serde(flatten)]
    expr: ExpressionProps,
}

#[derive(Debug)]
struct FieldSpec {
    path: FieldPath,
    language: Language,
    source: ExpressionSource,
}

#[derive(Debug)]
pub struct AddField {
    fields: Vec<FieldSpec>,
    compiled: Option<Vec<CompiledExpression>>,
}

impl BlockKind for AddField {
    const KIND: &'static str = "add_field";

    fn from_properties(properties: &Value) -> Result<Self> {
        let parsed: OneOrMany<FieldProps> = SCHEMA.parse(properties)?;
        let many = matches!(parsed, OneOrMany::Many { .. });

        let fields = parsed
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, f)| {
                let pointer = if many {
                    format!("/fields/{i}/field")
                } else {
                    "/field".to_string()
                };
                Ok(FieldSpec {
                    path: field_path(Self::KIND, &pointer, &f.field)?,
                    language: f.expr.language,
                    source: f.expr.checked_source()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            fields,
            compiled: None,
        })
    }
}

impl AddField {
    fn apply(&self, compiled: &[CompiledExpression], record: Record) -> (Record, Outcome) {
        let snapshot = (compiled.len() > 1).then(|| record.clone());
        let mut record = record;

        for (field, expr) in self.fields.iter().zip(compiled) {
            let written = expr
                .search(&record)
                .map_err(|e| e.to_string())
                .and_then(|value| {
                    field.path
                        .set(&mut record, value)
                        .map_err(|e| e.to_string())
                });
            if let Err(reason) = written {
                let reason = format!("add_field '{}': {reason}", field.path);
                return (snapshot.unwrap_or(record), Outcome::Rejected(reason));
            }
        }
        (record, Outcome::Success)
    }
}

impl Block for AddField {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn init(&mut self, ctx: &Context) -> Result<()> {
        let cache = statement_cache(ctx);
        let compiled = self
            .fields
            .iter()
            .map(|f| recflow_expr::compile_with_cache(f.language, &f.source, cache))
            .collect::<recflow_expr::Result<Vec<_>>>()?;
        debug!(kind = Self::KIND, fields = compiled.len(), "block initialized");
        self.compiled = Some(compiled);
        Ok(())
    }

    fn run(&self, records: Vec<Record>) -> Result<BlockOutput> {
        let compiled = self
            .compiled
            .as_deref()
            .ok_or(BlockError::NotInitialized(Self::KIND))?;

        let mut out = BlockOutput::default();
        for record in records {
            let (record, outcome) = self.apply(compiled, record);
            out.push(record, outcome);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    fn block(props: Value) -> AddField {
        let mut b = AddField::from_properties(&props).unwrap();
        b.init(&Context::new()).unwrap();
        b
    }

    #[test]
    fn jmespath_join() {
        let b = block(json!({
            "fields": [{
                "field": "full_name",
                "language": "jmespath",
                "expression": "join(' ', [fname, lname])"
            }]
        }));
        let out = b
            .run(vec![rec(json!({"fname": "john", "lname": "doe"}))])
            .unwrap();
        assert_eq!(out.outcomes, vec![Outcome::Success]);
        assert_eq!(
            Value::Object(out.records[0].clone()),
            json!({"fname": "john", "lname": "doe", "full_name": "john doe"})
        );
    }

    #[test]
    fn escaped_dot_target_is_literal_key() {
        let b = block(json!({
            "field": "name\\.full_name",
            "language": "jmespath",
            "expression": "concat([fname, ' ', lname])"
        }));
        let out = b
            .run(vec![rec(json!({"fname": "john", "lname": "doe"}))])
            .unwrap();
        assert_eq!(out.records[0]["name.full_name"], json!("john doe"));
        assert!(out.records[0].get("name").is_none());
    }

    #[test]
    fn nested_target_creates_objects() {
        let b = block(json!({
            "field": "name.full",
            "language": "sql",
            "expression": "fname || ' ' || lname"
        }));
        let out = b
            .run(vec![rec(json!({"fname": "john", "lname": "doe"}))])
            .unwrap();
        assert_eq!(out.records[0]["name"], json!({"full": "john doe"}));
    }

    #[test]
    fn later_fields_see_earlier_ones() {
        let b = block(json!({
            "fields": [
                {"field": "a", "language": "sql", "expression": "x + 1"},
                {"field": "b", "language": "sql", "expression": "a * 10"}
            ]
        }));
        let out = b.run(vec![rec(json!({"x": 1}))]).unwrap();
        assert_eq!(
            Value::Object(out.records[0].clone()),
            json!({"x": 1, "a": 2, "b": 20})
        );
    }

    #[test]
    fn failing_record_is_rejected_alone_and_untouched() {
        let b = block(json!({
            "fields": [
                {"field": "ok", "language": "sql", "expression": "1"},
                {"field": "y", "language": "sql", "expression": "missing_col + 1"}
            ]
        }));
        let out = b
            .run(vec![
                rec(json!({"missing_col": 1})),
                rec(json!({"other": 2})),
            ])
            .unwrap();
        assert_eq!(out.outcomes[0], Outcome::Success);
        assert!(matches!(out.outcomes[1], Outcome::Rejected(_)));
        assert_eq!(Value::Object(out.records[1].clone()), json!({"other": 2}));
    }

    #[test]
    fn non_object_intermediate_rejects() {
        let b = block(json!({"field": "a.b", "language": "sql", "expression": "1"}));
        let out = b.run(vec![rec(json!({"a": 5}))]).unwrap();
        assert!(matches!(out.outcomes[0], Outcome::Rejected(_)));
        assert_eq!(out.records[0]["a"], json!(5));
    }

    #[test]
    fn property_errors() {
        let err = AddField::from_properties(&json!({"field": "a", "language": "sql"})).unwrap_err();
        assert!(matches!(err, BlockError::PropertyValidation { .. }), "{err}");

        let err = AddField::from_properties(&json!({
            "field": "__$$opcode", "language": "sql", "expression": "1"
        }))
        .unwrap_err();
        match err {
            BlockError::PropertyValidation { path, .. } => assert_eq!(path, "/field"),
            other => panic!("unexpected: {other}"),
        }

        let err = AddField::from_properties(&json!({
            "field": "a", "language": "jmespath", "expression": "[a"
        }))
        .unwrap_err();
        assert!(matches!(err, BlockError::Expression(_)), "{err}");
    }

    #[test]
    fn run_before_init_fails() {
        let b = AddField::from_properties(&json!({
            "field": "a", "language": "sql", "expression": "1"
        }))
        .unwrap();
        assert!(matches!(
            b.run(vec![]),
            Err(BlockError::NotInitialized("add_field"))
        ));
    }
}
