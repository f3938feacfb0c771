//! Host-supplied context handed to every block's `init`.
//!
//! The engine never mutates it. Hosts use it to share connections or other
//! long-lived state with blocks they register themselves.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::types::{Record, Value};

/// Property holding the SQL prepared-statement cache size.
pub const SQL_STATEMENT_CACHE: &str = "sql_statement_cache";

#[derive(Clone, Default)]
pub struct Context {
    /// Free-form settings (job name, environment, ...).
    properties: Record,
    /// Named shared resources, type-erased.
    resources: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying the engine-level settings blocks look up.
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::new().with_property(SQL_STATEMENT_CACHE, cfg.sql_statement_cache as u64)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_resource<T: Any + Send + Sync>(mut self, name: impl Into<String>, res: T) -> Self {
        self.resources.insert(name.into(), Arc::new(res));
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &Record {
        &self.properties
    }

    /// Typed lookup; `None` if absent or stored under another type.
    pub fn resource<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.resources
            .get(name)
            .cloned()
            .and_then(|r| r.downcast::<T>().ok())
    }

    pub fn sql_statement_cache(&self) -> Option<usize> {
        self.property(SQL_STATEMENT_CACHE)
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.resources.keys().collect();
        names.sort();
        f.debug_struct("Context")
            .field("properties", &self.properties)
            .field("resources", &names)
            .finish()
    }
}
