//! Record/value model shared by every crate.
//!
//! Records are plain JSON objects so connectors can hand batches straight
//! from their wire format. Outcomes travel next to the records, never inside
//! them.

use serde::{Deserialize, Serialize};

pub use serde_json::Value;

/// One in-flight record: field name → value.
pub type Record = serde_json::Map<String, Value>;

/// An ordered batch of records.
pub type Batch = Vec<Record>;

/// Prefix reserved for bookkeeping fields. User data never uses it.
pub const INTERNAL_FIELD_PREFIX: &str = "__$$";

/// Correlation id attached by connectors.
pub const MSG_ID_FIELD: &str = "__$$msg_id";

/// Synthetic change op-code (insert/update/delete) attached by connectors.
pub const OPCODE_FIELD: &str = "__$$opcode";

/// True when `name` lives in the reserved bookkeeping namespace.
pub fn is_internal_field(name: &str) -> bool {
    name.starts_with(INTERNAL_FIELD_PREFIX)
}

/// Per-record result of pushing a record through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Rejected(String),
    Filtered,
}

impl Outcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Outcome::Rejected(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Rejected and filtered records take no further part in a pipeline run.
    pub fn is_terminal(&self) -> bool {
        !self.is_success()
    }

    /// Combine an earlier outcome with a newer one. Terminal states stick:
    /// once a record is rejected or filtered nothing turns it back into a
    /// success.
    pub fn merge(self, next: Outcome) -> Outcome {
        if self.is_terminal() {
            self
        } else {
            next
        }
    }
}

/// What a block hands back for one batch: records and outcomes, position
/// for position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockOutput {
    pub records: Vec<Record>,
    pub outcomes: Vec<Outcome>,
}

impl BlockOutput {
    /// Every record succeeded.
    pub fn success(records: Vec<Record>) -> Self {
        let outcomes = vec![Outcome::Success; records.len()];
        Self { records, outcomes }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: Record, outcome: Outcome) {
        self.records.push(record);
        self.outcomes.push(outcome);
    }
}

/// Result of a whole pipeline run over one batch. `outcomes[i]` always
/// describes the record that was at position `i` of the input batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub records: Vec<Record>,
    pub outcomes: Vec<Outcome>,
}

impl BatchResult {
    /// The whole batch failed: keep the data as given, reject every record.
    pub fn rejected(records: Vec<Record>, reason: &str) -> Self {
        let outcomes = vec![Outcome::rejected(reason); records.len()];
        Self { records, outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Records whose outcome is still `Success`, in input order.
    pub fn successful(&self) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .zip(&self.outcomes)
            .filter(|(_, o)| o.is_success())
            .map(|(r, _)| r)
    }

    /// Count of (success, rejected, filtered).
    pub fn tally(&self) -> (usize, usize, usize) {
        self.outcomes
            .iter()
            .fold((0, 0, 0), |(s, r, f), o| match o {
                Outcome::Success => (s + 1, r, f),
                Outcome::Rejected(_) => (s, r + 1, f),
                Outcome::Filtered => (s, r, f + 1),
            })
    }

    pub fn into_parts(self) -> (Vec<Record>, Vec<Outcome>) {
        (self.records, self.outcomes)
    }
}

/// Build a record from a JSON value; non-objects yield `None`.
pub fn record_from_value(value: Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terminal_outcomes_are_sticky() {
        let rejected = Outcome::rejected("bad");
        assert_eq!(
            rejected.clone().merge(Outcome::Success),
            Outcome::rejected("bad")
        );
        assert_eq!(Outcome::Filtered.merge(Outcome::Success), Outcome::Filtered);
        assert_eq!(
            Outcome::Success.merge(Outcome::Filtered),
            Outcome::Filtered
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let v = serde_json::to_value(Outcome::rejected("boom")).unwrap();
        assert_eq!(v, json!({"status": "rejected", "message": "boom"}));
        let v = serde_json::to_value(Outcome::Success).unwrap();
        assert_eq!(v, json!({"status": "success"}));
    }

    #[test]
    fn internal_prefix_detection() {
        assert!(is_internal_field(MSG_ID_FIELD));
        assert!(is_internal_field(OPCODE_FIELD));
        assert!(!is_internal_field("msg_id"));
    }

    #[test]
    fn batch_result_tally_and_successful() {
        let a = record_from_value(json!({"a": 1})).unwrap();
        let b = record_from_value(json!({"b": 2})).unwrap();
        let c = record_from_value(json!({"c": 3})).unwrap();
        let res = BatchResult {
            records: vec![a.clone(), b, c],
            outcomes: vec![
                Outcome::Success,
                Outcome::Filtered,
                Outcome::rejected("x"),
            ],
        };
        assert_eq!(res.tally(), (1, 1, 1));
        assert_eq!(res.successful().collect::<Vec<_>>(), vec![&a]);
    }

    #[test]
    fn rejected_batch_keeps_records() {
        let a = record_from_value(json!({"a": 1})).unwrap();
        let res = BatchResult::rejected(vec![a.clone(), a.clone()], "down");
        assert_eq!(res.records.len(), 2);
        assert!(res
            .outcomes
            .iter()
            .all(|o| *o == Outcome::rejected("down")));
    }
}
