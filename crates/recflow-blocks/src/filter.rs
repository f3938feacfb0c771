//! `filter`: keep records for which a predicate holds.
//!
//! Records that fail the predicate are marked `Filtered` and handed back
//! unmodified; a predicate that cannot be evaluated rejects the record.

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::debug;

use recflow_core::context::Context;
use recflow_core::types::{BlockOutput, Outcome, Record};
use recflow_expr::{CompiledExpression, ExpressionSource};

use crate::error::{BlockError, Result};
use crate::props::{statement_cache, ExpressionProps};
use crate::schema::PropertySchema;
use crate::traits::{Block, BlockKind};

static SCHEMA: Lazy<PropertySchema> = Lazy::new(|| {
    PropertySchema::new(Filter::KIND, include_str!("../schemas/filter.schema.json"))
});

#[derive(Debug)]
pub struct Filter {
    props: ExpressionProps,
    source: ExpressionSource,
    compiled: Option<CompiledExpression>,
}

impl BlockKind for Filter {
    const KIND: &'static str = "filter";

    fn from_properties(properties: &Value) -> Result<Self> {
        let props: ExpressionProps = SCHEMA.parse(properties)?;
        let source = props.checked_source()?;
        if matches!(source, ExpressionSource::Fields(_)) {
            return Err(BlockError::property(
                Self::KIND,
                "/expression",
                "a predicate must be a single expression, not a field map",
            ));
        }
        Ok(Self {
            props,
            source,
            compiled: None,
        })
    }
}

impl Block for Filter {
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
            let outcome = match expr.test(&record) {
                Ok(true) => Outcome::Success,
                Ok(false) => Outcome::Filtered,
                Err(e) => Outcome::Rejected(format!("filter: {e}")),
            };
            out.push(record, outcome);
        }
        Ok(out)
    }
}
