//! Model instances and the relation slots that make up a rehydrated object graph.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::attributes::Attributes;
use crate::value::Value;

/// Opaque identity of a registered model type.
///
/// Issued by a [`Registry`](crate::Registry); factories and metadata are
/// looked up by id, never by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) u32);

impl ModelId {
    /// Id for a model kept at `index` by a custom [`Metadata`](crate::Metadata).
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Collection flavour declared by a related model for its "many" slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CollectionKind {
    #[default]
    Default,
    /// A caller-declared collection type, identified by name.
    Named(&'static str),
}

/// The value of a "many" relation slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelCollection {
    kind: CollectionKind,
    items: Vec<Model>,
}

impl ModelCollection {
    pub const fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub const fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, model: Model) {
        self.items.push(model);
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Model> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Model] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Model> {
        self.items
    }

    /// Collects the given column of every item.
    pub fn pluck<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.items.iter().filter_map(move |model| model.get(column))
    }
}

impl Extend<Model> for ModelCollection {
    fn extend<I: IntoIterator<Item = Model>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ModelCollection {
    type Item = &'a Model;
    type IntoIter = core::slice::Iter<'a, Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Contents of a relation slot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Related {
    One(Box<Model>),
    Many(ModelCollection),
}

impl Related {
    pub fn as_one(&self) -> Option<&Model> {
        match self {
            Related::One(model) => Some(model),
            Related::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&ModelCollection> {
        match self {
            Related::Many(collection) => Some(collection),
            Related::One(_) => None,
        }
    }
}

/// Ordered relation slots of one model instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relations {
    slots: SmallVec<[(CompactString, Related); 2]>,
}

impl Relations {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Related> {
        self.slots
            .iter()
            .find(|(slot, _)| slot == name)
            .map(|(_, related)| related)
    }

    pub fn set(&mut self, name: impl Into<CompactString>, related: Related) {
        let name = name.into();
        match self.slots.iter_mut().find(|(slot, _)| *slot == name) {
            Some((_, existing)) => *existing = related,
            None => self.slots.push((name, related)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Related)> {
        self.slots.iter().map(|(name, related)| (name.as_str(), related))
    }

    /// Unions `earlier` into `self`.
    ///
    /// Slots only present in `earlier` are appended. On a name conflict the
    /// slot in `self` wins; when both hold a single instance, an instance built
    /// from no attributes inherits the earlier one's attributes and existence,
    /// and their nested relations are merged with the same rule.
    pub fn absorb(&mut self, earlier: Relations) {
        for (name, previous) in earlier.slots {
            match self.slots.iter_mut().find(|(slot, _)| *slot == name) {
                Some((_, Related::One(current))) => {
                    if let Related::One(previous) = previous {
                        current.absorb(*previous);
                    }
                }
                Some(_) => {}
                None => self.slots.push((name, previous)),
            }
        }
    }
}

/// A hydrated model instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    model: ModelId,
    attributes: Attributes,
    relations: Relations,
    exists: bool,
}

impl Model {
    /// Creates a new, not yet persisted instance.
    pub fn new(model: ModelId, attributes: Attributes) -> Self {
        Self {
            model,
            attributes,
            relations: Relations::default(),
            exists: false,
        }
    }

    pub const fn model_id(&self) -> ModelId {
        self.model
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column)
    }

    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    pub(crate) fn take_attributes(&mut self) -> Attributes {
        core::mem::take(&mut self.attributes)
    }

    pub(crate) fn take_relations(&mut self) -> Relations {
        core::mem::take(&mut self.relations)
    }

    pub const fn relations(&self) -> &Relations {
        &self.relations
    }

    pub fn relation(&self, name: &str) -> Option<&Related> {
        self.relations.get(name)
    }

    /// The single instance attached under `name`, if any.
    pub fn one(&self, name: &str) -> Option<&Model> {
        self.relations.get(name).and_then(Related::as_one)
    }

    /// The collection attached under `name`, if any.
    pub fn many(&self, name: &str) -> Option<&ModelCollection> {
        self.relations.get(name).and_then(Related::as_many)
    }

    pub fn set_relation(&mut self, name: impl Into<CompactString>, related: Related) {
        self.relations.set(name, related);
    }

    /// Whether this instance corresponds to an already persisted row.
    pub const fn exists(&self) -> bool {
        self.exists
    }

    pub fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }

    pub(crate) fn absorb_relations(&mut self, earlier: Relations) {
        self.relations.absorb(earlier);
    }

    pub(crate) fn absorb(&mut self, earlier: Model) {
        if self.attributes.is_empty() {
            self.attributes = earlier.attributes;
            self.exists = earlier.exists;
        }
        self.relations.absorb(earlier.relations);
    }

    /// Renders the instance and its relations as a JSON object.
    ///
    /// Relations are nested under their names next to the attributes; a
    /// relation slot shadows an attribute of the same name.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (column, value) in self.attributes.iter() {
            let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
            object.insert(column.into(), value);
        }
        for (name, related) in self.relations.iter() {
            let value = match related {
                Related::One(model) => model.to_json(),
                Related::Many(collection) => {
                    serde_json::Value::Array(collection.iter().map(Model::to_json).collect())
                }
            };
            object.insert(name.into(), value);
        }
        serde_json::Value::Object(object)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Model {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ModelCollection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}
