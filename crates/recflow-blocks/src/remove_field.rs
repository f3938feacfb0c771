//! `remove_field`: drop fields from records. Missing paths are ignored.

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use recflow_core::context::Context;
use recflow_core::path::FieldPath;
use recflow_core::types::{BlockOutput, Record};

use crate::error::Result;
use crate::props::{field_path, OneOrMany};
use crate::schema::PropertySchema;
use crate::traits::{Block, BlockKind};

static SCHEMA: Lazy<PropertySchema> = Lazy::new(|| {
    PropertySchema::new(
        RemoveField::KIND,
        include_str!("../schemas/remove_field.schema.json"),
    )
});

#[derive(Debug, Deserialize)]
struct FieldProps {
    field: String,
}

#[derive(Debug)]
pub struct RemoveField {
    paths: Vec<FieldPath>,
}

impl BlockKind for RemoveField {
    const KIND: &'static str = "remove_field";

    fn from_properties(properties: &Value) -> Result<Self> {
        let parsed: OneOrMany<FieldProps> = SCHEMA.parse(properties)?;
        let many = matches!(parsed, OneOrMany::Many { .. });
        let paths = parsed
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, f)| {
                let pointer = if many {
                    format!("/fields/{i}/field")
                } else {
                    "/field".to_string()
                };
                field_path(Self::KIND, &pointer, &f.field)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { paths })
    }
}

impl Block for RemoveField {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn init(&mut self, _ctx: &Context) -> Result<()> {
        debug!(kind = Self::KIND, fields = self.paths.len(), "block initialized");
        Ok(())
    }

    fn run(&self, mut records: Vec<Record>) -> Result<BlockOutput> {
        for record in &mut records {
            for path in &self.paths {
                path.remove(record);
            }
        }
        Ok(BlockOutput::success(records))
    }
}
