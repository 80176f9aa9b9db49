//! Rebuilding object graphs from namespaced join columns.
//!
//! Both rehydrators start by splitting a row's attributes into the base
//! model's own columns and one group per segment of the path being processed.
//! Columns namespaced for other paths stay with the base columns untouched,
//! so a later pass can still find them.

mod many;
mod one;

pub(crate) use many::rehydrate_many;
pub(crate) use one::rehydrate_one;

use smallvec::SmallVec;

use crate::attributes::Attributes;
use crate::metadata::Metadata;
use crate::model::{Model, ModelId, Related};
use crate::namespace;
use crate::relation::RelationDescriptor;

/// A row's attributes split by relation segment.
#[derive(Debug, Default)]
pub(crate) struct Grouped {
    /// Columns of the base model, plus columns namespaced for other paths.
    pub base: Attributes,
    /// One group per path segment, keyed by the bare field name.
    pub segments: SmallVec<[Attributes; 4]>,
}

impl Grouped {
    pub fn split(attributes: Attributes, segments: &[RelationDescriptor]) -> Self {
        let mut grouped = Grouped {
            base: Attributes::with_capacity(attributes.len()),
            segments: segments.iter().map(|_| Attributes::new()).collect(),
        };
        for (column, value) in attributes {
            let slot = namespace::split(&column).and_then(|(prefix, field)| {
                segments
                    .iter()
                    .position(|segment| segment.name == prefix)
                    .map(|index| (index, field))
            });
            match slot {
                Some((index, field)) => {
                    grouped.segments[index].insert(field, value);
                }
                None => {
                    grouped.base.insert(column, value);
                }
            }
        }
        grouped
    }
}

/// Instantiates `model` and marks it persisted when its primary key is present.
pub(crate) fn hydrate<M: Metadata + ?Sized>(
    metadata: &M,
    model: ModelId,
    attributes: Attributes,
) -> Model {
    let exists = attributes
        .get(metadata.primary_key_name(model))
        .is_some_and(|key| key.is_present());
    let mut instance = metadata.instantiate(model, attributes);
    instance.set_exists(exists);
    instance
}

/// Builds the chain of nested singular instances for `segments`, bottom-up.
///
/// Returns the instance of the first segment with every later segment
/// attached as the relation of its predecessor, or `None` for an empty path.
pub(crate) fn build_chain<M: Metadata + ?Sized>(
    metadata: &M,
    segments: &[RelationDescriptor],
    groups: SmallVec<[Attributes; 4]>,
) -> Option<Model> {
    let mut child: Option<Model> = None;
    for (index, attributes) in groups.into_iter().enumerate().rev() {
        let descriptor = &segments[index];
        let mut instance = hydrate(metadata, descriptor.related, attributes);
        if let Some(model) = child.take() {
            let nested = &segments[index + 1];
            instance.set_relation(nested.name.clone(), Related::One(Box::new(model)));
        }
        child = Some(instance);
    }
    child
}
