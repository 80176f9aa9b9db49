//! Join-result normalization and rehydration engine.
//!
//! Declared relations are fetched through SQL joins instead of follow-up
//! queries. Related columns come back namespaced in the flat result row
//! (`category_TEMP_name`); this crate either flattens them onto the base row
//! or rebuilds the tree of related model instances.
//!
//! The query layer and the schema layer are collaborators, reached through
//! the [`JoinQuery`] and [`Metadata`] traits. [`Registry`] and
//! [`MemoryQuery`] are ready-made implementations.

pub mod attributes;
pub mod error;
pub mod join;
pub mod memory;
pub mod metadata;
pub mod model;
pub mod namespace;
pub mod normalize;
pub mod planner;
pub mod profiling;
pub mod projector;
pub mod query;
mod rehydrate;
pub mod relation;
pub mod tracing;
pub mod value;
pub mod walker;

// Re-export key types and traits
pub use attributes::Attributes;
pub use error::{JoineryError, Result};
pub use join::{AggregateMethod, JoinConfig, JoinMode, ModelConfig};
pub use memory::{MemoryQuery, RecordedJoin};
pub use metadata::{Factory, Metadata, ModelDef, RegistryBuilder, Registry, RelationDef};
pub use model::{CollectionKind, Model, ModelCollection, ModelId, Related, Relations};
pub use namespace::TEMP_MARKER;
pub use normalize::JoinBuilder;
pub use query::JoinQuery;
pub use relation::{RelationDescriptor, RelationKind, RelationPath, RelationTarget, ResolvedPath};
pub use value::Value;
