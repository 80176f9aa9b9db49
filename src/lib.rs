//! # Joinery
//!
//! Eager relation loading through SQL joins, with the flat join rows turned
//! back into model graphs.
//!
//! ## Quick Start
//!
//! ```rust
//! use joinery::prelude::*;
//!
//! # fn main() -> joinery::Result<()> {
//! let registry = Registry::builder()
//!     .model(
//!         ModelDef::new("post", "posts")
//!             .relation(RelationDef::belongs_to("category", "category")),
//!     )
//!     .model(ModelDef::new("category", "categories").fields(["id", "name"]))
//!     .build()?;
//!
//! let query = MemoryQuery::new().with_rows([attributes! {
//!     "id" => 1,
//!     "name" => "x",
//!     "category_TEMP_id" => 5,
//!     "category_TEMP_name" => "cat",
//! }]);
//!
//! let posts = registry
//!     .join("post", query)?
//!     .include("category", JoinMode::Left)?
//!     .enable_rehydration()
//!     .execute(&["posts.*"])?;
//!
//! let category = posts[0].one("category").unwrap();
//! assert_eq!(category.get("name"), Some(&Value::from("cat")));
//! assert!(category.exists());
//! # Ok(())
//! # }
//! ```
//!
//! ## Normalization modes
//!
//! | Mode                 | Result                                         | Cost  |
//! |----------------------|------------------------------------------------|-------|
//! | default (flatten)    | `post.get("category_name")`                    | low   |
//! | `enable_rehydration` | `post.one("category")`, `post.many("tags")`    | higher |
//!
//! ## Features
//!
//! - `std` (default) - Standard library support in dependencies; the crate
//!   itself always requires `std`
//! - `serde` - Serialize rehydrated model graphs (`Model::to_json`)
//! - `tracing` - Emit `tracing` events for includes and normalization passes
//! - `profiling` - Puffin scopes around flattening and rehydration

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use joinery_core as core;

pub use joinery_core::{
    AggregateMethod, Attributes, CollectionKind, Factory, JoinBuilder, JoinConfig, JoinMode,
    JoinQuery, JoineryError, MemoryQuery, Metadata, Model, ModelCollection, ModelConfig, ModelDef,
    ModelId, Registry, Related, RelationDef, RelationKind, RelationPath, RelationTarget, Result,
    TEMP_MARKER, Value, attributes,
};

/// Commonly used types for declaring models and running joined queries.
pub mod prelude {
    pub use joinery_core::{
        AggregateMethod, Attributes, CollectionKind, JoinBuilder, JoinConfig, JoinMode,
        JoinQuery, JoineryError, MemoryQuery, Metadata, Model, ModelCollection, ModelDef, ModelId,
        Registry, Related, RelationDef, RelationKind, Value, attributes,
    };
}
