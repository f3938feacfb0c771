//! `rename_field`: move a value from one path to another.
//!
//! A missing source leaves the record as is. Renames run in declaration
//! order; if one cannot be written the record is rejected and returned
//! unchanged.

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use recflow_core::context::Context;
use recflow_core::path::FieldPath;
use recflow_core::types::{BlockOutput, Outcome, Record};

use crate::error::Result;
use crate::props::{field_path, OneOrMany};
use crate::schema::PropertySchema;
use crate::traits::{Block, BlockKind};

static SCHEMA: Lazy<PropertySchema> = Lazy::new(|| {
    PropertySchema::new(
        RenameField::KIND,
        include_str!("../schemas/rename_field.schema.json"),
    )
});

#[derive(Debug, Deserialize)]
struct RenameProps {
    from_field: String,
    to_field: String,
}

#[derive(Debug)]
struct Rename {
    from: FieldPath,
    to: FieldPath,
}

#[derive(Debug)]
pub struct RenameField {
    renames: Vec<Rename>,
}

impl BlockKind for RenameField {
    const KIND: &'static str = "rename_field";

    fn from_properties(properties: &Value) -> Result<Self> {
        let parsed: OneOrMany<RenameProps> = SCHEMA.parse(properties)?;
        let prefix = match parsed {
            OneOrMany::Many { .. } => Some("/fields"),
            OneOrMany::One(_) => None,
        };
        let renames = parsed
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let at = |name: &str| match prefix {
                    Some(p) => format!("{p}/{i}/{name}"),
                    None => format!("/{name}"),
                };
                Ok(Rename {
                    from: field_path(Self::KIND, &at("from_field"), &r.from_field)?,
                    to: field_path(Self::KIND, &at("to_field"), &r.to_field)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { renames })
    }
}

impl RenameField {
    fn apply(&self, mut record: Record) -> (Record, Outcome) {
        let snapshot = record.clone();
        for rename in &self.renames {
            let Some(value) = rename.from.remove(&mut record) else {
                continue;
            };
            if let Err(e) = rename.to.set(&mut record, value) {
                let reason = format!("rename_field '{}' -> '{}': {e}", rename.from, rename.to);
                return (snapshot, Outcome::Rejected(reason));
            }
        }
        (record, Outcome::Success)
    }
}

impl Block for RenameField {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn init(&mut self, _ctx: &Context) -> Result<()> {
        debug!(kind = Self::KIND, fields = self.renames.len(), "block initialized");
        Ok(())
    }

    fn run(&self, records: Vec<Record>) -> Result<BlockOutput> {
        let mut out = BlockOutput::default();
        for record in records {
            let (record, outcome) = self.apply(record);
            out.push(record, outcome);
        }
        Ok(out)
    }
}
