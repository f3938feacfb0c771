//! `map`: replace each record with the object an expression evaluates to.
//!
//! ```yaml
//! - uses: map
//!   with:
//!     language: sql
//!     expression: {"name": "fname || ' ' || lname", "age": "age + 1"}
//! ```
//!
//! Reserved `__$$` fields of the input are carried over into the new record.

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::debug;

use recflow_core::context::Context;
use recflow_core::types::{is_internal_field, BlockOutput, Outcome, Record};
use recflow_expr::{CompiledExpression, ExpressionSource};

use crate::error::{BlockError, Result};
use crate::props::{statement_cache, ExpressionProps};
use crate::schema::PropertySchema;
use crate::traits::{Block, BlockKind};

static SCHEMA: Lazy<PropertySchema> =
    Lazy::new(|| PropertySchema::new(Map::KIND, include_str!("../schemas/map.schema.json")));

#[derive(Debug)]
pub struct Map {
    props: ExpressionProps,
    source: ExpressionSource,
    compiled: Option<CompiledExpression>,
}

impl BlockKind for Map {
    const KIND: &'static str = "map";

    fn from_properties(properties: &Value) -> Result<Self> {
        let props: ExpressionProps = SCHEMA.parse(properties)?;
        let source = props.checked_source()?;
        Ok(Self {
            props,
            source,
            compiled: None,
        })
    }
}

fn project(expr: &CompiledExpression, record: Record) -> (Record, Outcome) {
    let mut projected = match expr.search(&record) {
        Ok(Value::Object(obj)) => obj,
        Ok(other) => {
            let reason = format!("map: expression returned {} instead of an object", kind_of(&other));
            return (record, Outcome::Rejected(reason));
        }
        Err(e) => return (record, Outcome::Rejected(format!("map: {e}"))),
    };
    for (k, v) in record {
        if is_internal_field(&k) {
            projected.insert(k, v);
        }
    }
    (projected, Outcome::Success)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Block for Map {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn init(&mut self, ctx: &Context) -> Result<()> {
        let compiled =
            recflow_expr::compile_with_cache(self.props.language, &self.source, statement_cache(ctx))?;
        debug!(kind = Self::KIND, expression = ?compiled, "block initialized");
        self.compiled = Some(compiled);
        Ok(())
    }

    fn run(&self, records: Vec<Record>) -> Result<BlockOutput> {
        let expr = self
            .compiled
            .as_ref()
            .ok_or(BlockError::NotInitialized(Self::KIND))?;

        let mut out = BlockOutput::default();
        for record in records {
            let (record, outcome) = project(expr, record);
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

    fn block(props: Value) -> Map {
        let mut b = Map::from_properties(&props).unwrap();
        b.init(&Context::new()).unwrap();
        b
    }

    #[test]
    fn sql_projection() {
        let b = block(json!({
            "language": "sql",
            "expression": {"name": "fname || ' ' || lname", "age": "age + 1"}
        }));
        let out = b
            .run(vec![rec(json!({"fname": "john", "lname": "doe", "age": 30}))])
            .unwrap();
        assert_eq!(out.outcomes, vec![Outcome::Success]);
        assert_eq!(
            Value::Object(out.records[0].clone()),
            json!({"name": "john doe", "age": 31})
        );
    }

    #[test]
    fn nested_sql_reference() {
        let b = block(json!({
            "language": "sql",
            "expression": {"first": "`details.fname`"}
        }));
        let out = b
            .run(vec![rec(json!({"details": {"fname": "john"}}))])
            .unwrap();
        assert_eq!(Value::Object(out.records[0].clone()), json!({"first": "john"}));
    }

    #[test]
    fn jmespath_multiselect() {
        let b = block(json!({
            "language": "jmespath",
            "expression": "{id: id, upper_name: upper(name)}"
        }));
        let out = b
            .run(vec![rec(json!({"id": 7, "name": "ann", "x": 1}))])
            .unwrap();
        assert_eq!(
            Value::Object(out.records[0].clone()),
            json!({"id": 7, "upper_name": "ANN"})
        );
    }

    #[test]
    fn carries_internal_fields() {
        let b = block(json!({"language": "jmespath", "expression": "{a: a}"}));
        let out = b
            .run(vec![rec(json!({"a": 1, "b": 2, "__$$msg_id": "m1", "__$$opcode": "u"}))])
            .unwrap();
        assert_eq!(
            Value::Object(out.records[0].clone()),
            json!({"a": 1, "__$$msg_id": "m1", "__$$opcode": "u"})
        );
    }

    #[test]
    fn non_object_result_rejects_record() {
        let b = block(json!({"language": "jmespath", "expression": "a"}));
        let input = json!({"a": 1});
        let out = b.run(vec![rec(input.clone())]).unwrap();
        match &out.outcomes[0] {
            Outcome::Rejected(reason) => assert!(reason.contains("a number"), "{reason}"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(Value::Object(out.records[0].clone()), input);
    }

    #[test]
    fn init_is_idempotent() {
        let mut b = block(json!({"language": "sql", "expression": {"v": "a * 2"}}));
        b.init(&Context::new()).unwrap();
        let out = b.run(vec![rec(json!({"a": 2}))]).unwrap();
        assert_eq!(out.records[0]["v"], json!(4));
    }
}
