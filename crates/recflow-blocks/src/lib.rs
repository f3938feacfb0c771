#![forbid(unsafe_code)]
//! recflow-blocks: the transformation steps a job is made of.
//!
//! Design intent:
//! - Every block kind validates its property object against an embedded
//!   JSON Schema before it can be constructed.
//! - `init` compiles expressions and resolves context resources; `run` is
//!   called once per batch and reports one outcome per record it was given.
//! - Kinds are resolved through an explicit `Registry`; nothing is loaded
//!   by name at runtime beyond what was registered.

pub mod error;
pub mod props;
pub mod registry;
pub mod schema;
pub mod traits;

pub mod add_field;
pub mod filter;
pub mod map;
pub mod remove_field;
pub mod rename_field;

pub use error::{BlockError, Result};
pub use registry::{BlockFactory, Registry};
pub use traits::{Block, BlockKind};
