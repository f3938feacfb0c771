//! Kind name → block factory.
//!
//! A `BTreeMap` keeps `kinds()` deterministic for listings and manifests.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::error::{BlockError, Result};
use crate::traits::{Block, BlockKind};

/// Builds a block from its (not yet validated) property object.
pub type BlockFactory = fn(&Value) -> Result<Box<dyn Block>>;

#[derive(Clone)]
pub struct Registry {
    factories: BTreeMap<String, BlockFactory>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Registry {
    /// A registry with no kinds at all.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// The built-in kinds shipped with this crate.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register::<crate::add_field::AddField>();
        reg.register::<crate::remove_field::RemoveField>();
        reg.register::<crate::rename_field::RenameField>();
        reg.register::<crate::map::Map>();
        reg.register::<crate::filter::Filter>();
        reg
    }

    pub fn register<B: BlockKind>(&mut self) {
        fn build<B: BlockKind>(props: &Value) -> Result<Box<dyn Block>> {
            Ok(Box::new(B::from_properties(props)?))
        }
        self.factories.insert(B::KIND.to_string(), build::<B>);
    }

    /// Register a host-provided factory under `kind`. The name must follow
    /// the dotted snake_case convention (`relational.write`, `add_field`).
    pub fn register_factory(&mut self, kind: &str, factory: BlockFactory) -> Result<()> {
        if !is_valid_kind(kind) {
            return Err(BlockError::UnknownKind {
                kind: kind.to_string(),
            });
        }
        self.factories.insert(kind.to_string(), factory);
        Ok(())
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Resolve and construct one block.
    ///
    /// Order matters: the allow-list is consulted before the kind is looked
    /// up, so a disallowed kind is reported as such even if it also does not
    /// exist. `Some(&[])` allows nothing.
    pub fn create(
        &self,
        kind: &str,
        properties: &Value,
        allow_list: Option<&[String]>,
    ) -> Result<Box<dyn Block>> {
        if let Some(allowed) = allow_list {
            if !allowed.iter().any(|k| k == kind) {
                return Err(BlockError::NotAllowed {
                    kind: kind.to_string(),
                });
            }
        }

        let factory = if is_valid_kind(kind) {
            self.factories.get(kind)
        } else {
            None
        };
        let factory = factory.ok_or_else(|| BlockError::UnknownKind {
            kind: kind.to_string(),
        })?;

        debug!(kind, "constructing block");
        factory(properties)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

/// `segment(.segment)*`, each segment `[a-z][a-z0-9_]*`.
fn is_valid_kind(kind: &str) -> bool {
    !kind.is_empty()
        && kind.split('.').all(|seg| {
            let mut chars = seg.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use recflow_core::context::Context;
    use recflow_core::types::{BlockOutput, Record};

    struct Noop;

    impl Block for Noop {
        fn kind(&self) -> &'static str {
            "host.noop"
        }
        fn init(&mut self, _ctx: &Context) -> Result<()> {
            Ok(())
        }
        fn run(&self, records: Vec<Record>) -> Result<BlockOutput> {
            Ok(BlockOutput::success(records))
        }
    }

    fn noop(_: &Value) -> Result<Box<dyn Block>> {
        Ok(Box::new(Noop))
    }

    #[test]
    fn builtins_are_listed() {
        let reg = Registry::with_builtins();
        let kinds: Vec<&str> = reg.kinds().collect();
        assert_eq!(
            kinds,
            vec!["add_field", "filter", "map", "remove_field", "rename_field"]
        );
    }

    #[test]
    fn kind_name_convention() {
        for ok in ["map", "add_field", "relational.write", "a1.b_2"] {
            assert!(is_valid_kind(ok), "{ok}");
        }
        for bad in ["", "Map", "1map", "a..b", "a.", "../etc", "add-field"] {
            assert!(!is_valid_kind(bad), "{bad}");
        }
    }

    #[test]
    fn allow_list_checked_before_lookup() {
        let reg = Registry::with_builtins();
        let allowed = vec!["add_field".to_string()];

        let err = reg
            .create("no_such_block", &json!({}), Some(&allowed))
            .err()
            .unwrap();
        assert!(matches!(err, BlockError::NotAllowed { .. }), "{err}");

        let err = reg.create("map", &json!({}), Some(&[])).err().unwrap();
        assert!(matches!(err, BlockError::NotAllowed { .. }), "{err}");
    }

    #[test]
    fn unknown_kind() {
        let reg = Registry::with_builtins();
        let err = reg.create("no_such_block", &json!({}), None).err().unwrap();
        match err {
            BlockError::UnknownKind { kind } => assert_eq!(kind, "no_such_block"),
            other => panic!("unexpected: {other}"),
        }
        assert!(matches!(
            reg.create("../map", &json!({}), None),
            Err(BlockError::UnknownKind { .. })
        ));
    }

    #[test]
    fn host_kinds() {
        let mut reg = Registry::new();
        reg.register_factory("host.noop", noop).unwrap();
        assert!(reg.register_factory("Host Noop", noop).is_err());
        assert!(reg.contains("host.noop"));

        let block = reg.create("host.noop", &json!({}), None).unwrap();
        assert_eq!(block.kind(), "host.noop");
    }

    #[test]
    fn construction_errors_surface() {
        let reg = Registry::with_builtins();
        let err = reg
            .create("add_field", &json!({"field": "a"}), None)
            .err()
            .unwrap();
        assert!(matches!(err, BlockError::PropertyValidation { .. }), "{err}");
    }
}
