//! Model metadata: the registry the engine resolves relations against.
//!
//! Models are declared once with [`ModelDef`] and frozen into a [`Registry`].
//! The engine only talks to the [`Metadata`] trait, so callers with their own
//! schema layer can implement it directly.

use compact_str::CompactString;
use hashbrown::HashMap;

use crate::attributes::Attributes;
use crate::error::{JoineryError, Result};
use crate::join::{JoinConfig, ModelConfig};
use crate::model::{CollectionKind, Model, ModelCollection, ModelId};
use crate::namespace::ensure_unreserved;
use crate::normalize::JoinBuilder;
use crate::query::JoinQuery;
use crate::relation::{RelationKind, RelationTarget};

/// Builds a typed instance from a bag of attributes.
pub type Factory = fn(ModelId, Attributes) -> Model;

/// Schema capabilities consumed by the join engine.
pub trait Metadata {
    /// Lower-case name of the model, used to name its own pseudo segment.
    fn model_name(&self, model: ModelId) -> &str;

    /// Table joined for `model`; qualifies projected columns.
    fn table_name(&self, model: ModelId) -> &str;

    /// Resolves `relation` on `owner` to its kind and related model.
    ///
    /// Fails with [`JoineryError::UnknownRelation`] if `owner` declares no
    /// such relation.
    fn resolve_relation(&self, owner: ModelId, relation: &str) -> Result<RelationTarget>;

    /// Explicit field list declared on `model`; empty if none was declared,
    /// in which case only the primary key is projected.
    fn declared_fields(&self, model: ModelId) -> &[CompactString];

    fn primary_key_name(&self, model: ModelId) -> &str;

    /// An empty collection of the kind `model` declares for "many" slots.
    fn new_collection_for(&self, model: ModelId) -> ModelCollection;

    /// Constructs an instance of `model` through its registered factory.
    fn instantiate(&self, model: ModelId, attributes: Attributes) -> Model;

    /// Declarative builder configuration of `model`.
    fn config(&self, model: ModelId) -> &ModelConfig;
}

// =============================================================================
// Declarations
// =============================================================================

/// Declaration of one relation on a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub name: CompactString,
    pub kind: RelationKind,
    /// Name of the related model.
    pub target: CompactString,
}

impl RelationDef {
    pub fn new(
        name: impl Into<CompactString>,
        kind: RelationKind,
        target: impl Into<CompactString>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
        }
    }

    pub fn belongs_to(name: impl Into<CompactString>, target: impl Into<CompactString>) -> Self {
        Self::new(name, RelationKind::BelongsToOne, target)
    }

    pub fn has_one(name: impl Into<CompactString>, target: impl Into<CompactString>) -> Self {
        Self::new(name, RelationKind::HasOne, target)
    }

    pub fn has_many(name: impl Into<CompactString>, target: impl Into<CompactString>) -> Self {
        Self::new(name, RelationKind::HasMany, target)
    }

    pub fn belongs_to_many(
        name: impl Into<CompactString>,
        target: impl Into<CompactString>,
    ) -> Self {
        Self::new(name, RelationKind::BelongsToMany, target)
    }
}

/// Declaration of a model type.
#[derive(Debug, Clone)]
pub struct ModelDef {
    name: CompactString,
    table: CompactString,
    primary_key: CompactString,
    fields: Vec<CompactString>,
    relations: Vec<RelationDef>,
    collection: CollectionKind,
    config: ModelConfig,
    factory: Option<Factory>,
}

impl ModelDef {
    /// Declares a model named `name`, stored in table `table`, keyed by `id`.
    pub fn new(name: impl Into<CompactString>, table: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: CompactString::const_new("id"),
            fields: Vec::new(),
            relations: Vec::new(),
            collection: CollectionKind::Default,
            config: ModelConfig::default(),
            factory: None,
        }
    }

    pub fn primary_key(mut self, column: impl Into<CompactString>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Fields projected when this model is joined as a relation.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn collection(mut self, kind: CollectionKind) -> Self {
        self.collection = kind;
        self
    }

    /// Relation paths joined by default on every query of this model.
    pub fn include<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.config.includes = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn join_config(mut self, config: JoinConfig) -> Self {
        self.config.join = config;
        self
    }

    pub fn factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug)]
struct ModelEntry {
    def: ModelDef,
    relations: Vec<(RelationDef, ModelId)>,
}

/// Collects model declarations and validates them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    models: Vec<ModelDef>,
}

impl RegistryBuilder {
    pub fn model(mut self, def: ModelDef) -> Self {
        self.models.push(def);
        self
    }

    /// Freezes the declarations.
    ///
    /// Fails on duplicate model names, on relations targeting an undeclared
    /// model, and on any model, field or relation name containing the
    /// reserved column marker.
    pub fn build(self) -> Result<Registry> {
        let mut by_name: HashMap<CompactString, ModelId> = HashMap::with_capacity(self.models.len());
        for (index, def) in self.models.iter().enumerate() {
            ensure_unreserved(&def.name)?;
            ensure_unreserved(&def.primary_key)?;
            for field in &def.fields {
                ensure_unreserved(field)?;
            }
            for relation in &def.relations {
                ensure_unreserved(&relation.name)?;
            }
            if by_name.insert(def.name.clone(), ModelId(index as u32)).is_some() {
                return Err(JoineryError::DuplicateModel(def.name.clone()));
            }
        }

        let models = self
            .models
            .into_iter()
            .map(|def| {
                let relations = def
                    .relations
                    .iter()
                    .map(|relation| {
                        by_name
                            .get(&relation.target)
                            .map(|&id| (relation.clone(), id))
                            .ok_or_else(|| JoineryError::UnknownModel(relation.target.clone()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ModelEntry { def, relations })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Registry { models, by_name })
    }
}

/// Frozen set of model declarations implementing [`Metadata`].
#[derive(Debug)]
pub struct Registry {
    models: Vec<ModelEntry>,
    by_name: HashMap<CompactString, ModelId>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up a model by name.
    pub fn id(&self, name: &str) -> Option<ModelId> {
        self.by_name.get(name).copied()
    }

    /// Opens a join builder for the model named `model` over `query`.
    pub fn join<Q: JoinQuery>(&self, model: &str, query: Q) -> Result<JoinBuilder<'_, Self, Q>> {
        let id = self
            .id(model)
            .ok_or_else(|| JoineryError::UnknownModel(model.into()))?;
        Ok(JoinBuilder::new(self, id, query))
    }

    fn entry(&self, model: ModelId) -> &ModelEntry {
        // ids are only issued by this registry
        &self.models[model.index()]
    }
}

impl Metadata for Registry {
    fn model_name(&self, model: ModelId) -> &str {
        &self.entry(model).def.name
    }

    fn table_name(&self, model: ModelId) -> &str {
        &self.entry(model).def.table
    }

    fn resolve_relation(&self, owner: ModelId, relation: &str) -> Result<RelationTarget> {
        let entry = self.entry(owner);
        let (def, related) = entry
            .relations
            .iter()
            .find(|(def, _)| def.name == relation)
            .ok_or_else(|| JoineryError::UnknownRelation {
                model: entry.def.name.clone(),
                relation: relation.into(),
            })?;
        Ok(RelationTarget {
            kind: def.kind,
            related: *related,
        })
    }

    fn declared_fields(&self, model: ModelId) -> &[CompactString] {
        &self.entry(model).def.fields
    }

    fn primary_key_name(&self, model: ModelId) -> &str {
        &self.entry(model).def.primary_key
    }

    fn new_collection_for(&self, model: ModelId) -> ModelCollection {
        ModelCollection::new(self.entry(model).def.collection)
    }

    fn instantiate(&self, model: ModelId, attributes: Attributes) -> Model {
        match self.entry(model).def.factory {
            Some(factory) => factory(model, attributes),
            None => Model::new(model, attributes),
        }
    }

    fn config(&self, model: ModelId) -> &ModelConfig {
        &self.entry(model).def.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn registry() -> Registry {
        Registry::builder()
            .model(
                ModelDef::new("post", "posts")
                    .fields(["id", "title"])
                    .relation(RelationDef::belongs_to("category", "category"))
                    .relation(RelationDef::belongs_to_many("tags", "tag")),
            )
            .model(ModelDef::new("category", "categories").fields(["id", "name"]))
            .model(
                ModelDef::new("tag", "tags")
                    .primary_key("tag_id")
                    .collection(CollectionKind::Named("TagCollection")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_relation() {
        let registry = registry();
        let post = registry.id("post").unwrap();
        let category = registry.resolve_relation(post, "category").unwrap();
        assert_eq!(category.kind, RelationKind::BelongsToOne);
        assert_eq!(category.related, registry.id("category").unwrap());
        assert_eq!(registry.table_name(category.related), "categories");
        assert_eq!(registry.declared_fields(category.related), ["id", "name"]);

        let tags = registry.resolve_relation(post, "tags").unwrap();
        assert_eq!(tags.kind, RelationKind::BelongsToMany);
        assert_eq!(registry.primary_key_name(tags.related), "tag_id");
        assert!(registry.declared_fields(tags.related).is_empty());
    }

    #[test]
    fn test_unknown_relation() {
        let registry = registry();
        let post = registry.id("post").unwrap();
        assert_eq!(
            registry.resolve_relation(post, "author"),
            Err(JoineryError::UnknownRelation {
                model: "post".into(),
                relation: "author".into(),
            })
        );
    }

    #[test]
    fn test_build_rejects_unknown_target() {
        let result = Registry::builder()
            .model(ModelDef::new("post", "posts").relation(RelationDef::has_many("comments", "comment")))
            .build();
        assert!(matches!(result, Err(JoineryError::UnknownModel(name)) if name == "comment"));
    }

    #[test]
    fn test_build_rejects_duplicates_and_reserved_names() {
        let duplicate = Registry::builder()
            .model(ModelDef::new("post", "posts"))
            .model(ModelDef::new("post", "articles"))
            .build();
        assert!(matches!(duplicate, Err(JoineryError::DuplicateModel(_))));

        let reserved = Registry::builder()
            .model(ModelDef::new("post", "posts").fields(["id", "x_TEMP_y"]))
            .build();
        assert!(matches!(reserved, Err(JoineryError::ReservedMarker(name)) if name == "x_TEMP_y"));
    }

    #[test]
    fn test_collection_and_factory() {
        fn stamped(model: ModelId, mut attributes: Attributes) -> Model {
            attributes.insert("source", "factory");
            Model::new(model, attributes)
        }

        let registry = Registry::builder()
            .model(ModelDef::new("tag", "tags").collection(CollectionKind::Named("TagCollection")))
            .model(ModelDef::new("user", "users").factory(stamped))
            .build()
            .unwrap();

        let tag = registry.id("tag").unwrap();
        assert_eq!(
            registry.new_collection_for(tag).kind(),
            CollectionKind::Named("TagCollection")
        );

        let user = registry.id("user").unwrap();
        let model = registry.instantiate(user, Attributes::new());
        assert_eq!(model.get("source"), Some(&Value::from("factory")));
        assert!(!model.exists());
    }
}
