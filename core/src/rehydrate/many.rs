use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::attributes::Attributes;
use crate::metadata::Metadata;
use crate::model::{Model, ModelId, Related};
use crate::relation::{RelationDescriptor, ResolvedPath};
use crate::value::Value;

use super::{Grouped, build_chain, hydrate};

/// Collapses the fanned-out rows of the "many" paths sharing one leading
/// segment into one instance per base primary key, each carrying its related
/// instances as a collection.
///
/// `paths` holds every registered path starting with that segment; each
/// related instance carries the singular tails of all of them. One related
/// instance is built per distinct related primary key, and each collection
/// lists its instances in the order they first appear for that base row.
/// Rows without a related key contribute nothing; rows without a base
/// primary key are never merged. Namespaced columns of `paths` are stripped
/// from every row. Must run at most once per leading segment.
pub(crate) fn rehydrate_many<M: Metadata + ?Sized>(
    metadata: &M,
    base: ModelId,
    paths: &[&ResolvedPath],
    rows: Vec<Model>,
) -> Vec<Model> {
    crate::joinery_profile_function!();
    let Some(first) = paths.first() else {
        return rows;
    };
    let leading = first.leading();
    let segments = union_segments(paths);
    let related_key = leading.related_primary_key.as_str();
    let base_key = metadata.primary_key_name(base);

    let mut related: HashMap<Value, Model> = HashMap::new();
    let mut deduped: Vec<Model> = Vec::with_capacity(rows.len());
    let mut keys: Vec<Vec<Value>> = Vec::with_capacity(rows.len());
    let mut attached: HashSet<(usize, Value)> = HashSet::new();
    let mut by_base: HashMap<Value, usize> = HashMap::with_capacity(rows.len());

    for mut row in rows {
        let grouped = Grouped::split(row.take_attributes(), &segments);
        row.set_attributes(grouped.base);

        let related_id = grouped
            .segments
            .first()
            .and_then(|group| group.get(related_key))
            .filter(|id| id.is_present())
            .cloned();
        if let Some(id) = &related_id
            && let Entry::Vacant(entry) = related.entry(id.clone())
        {
            entry.insert(build_item(metadata, paths, &segments, grouped.segments));
        }

        let base_id = row.get(base_key).filter(|id| id.is_present()).cloned();
        let slot = match base_id.map(|id| by_base.entry(id)) {
            Some(Entry::Occupied(entry)) => *entry.get(),
            Some(Entry::Vacant(entry)) => {
                entry.insert(deduped.len());
                deduped.push(row);
                keys.push(Vec::new());
                deduped.len() - 1
            }
            None => {
                deduped.push(row);
                keys.push(Vec::new());
                deduped.len() - 1
            }
        };
        if let Some(id) = related_id
            && attached.insert((slot, id.clone()))
        {
            keys[slot].push(id);
        }
    }

    for (row, ids) in deduped.iter_mut().zip(keys) {
        let mut collection = metadata.new_collection_for(leading.related);
        collection.extend(ids.iter().filter_map(|id| related.get(id)).cloned());
        row.set_relation(leading.name.clone(), Related::Many(collection));
    }

    deduped
}

/// Segments of all `paths`, each name once, leading segment first.
fn union_segments(paths: &[&ResolvedPath]) -> SmallVec<[RelationDescriptor; 4]> {
    let mut segments: SmallVec<[RelationDescriptor; 4]> = SmallVec::new();
    for descriptor in paths.iter().flat_map(|path| path.segments.iter()) {
        if !segments.iter().any(|seen| seen.name == descriptor.name) {
            segments.push(descriptor.clone());
        }
    }
    segments
}

/// Builds one collection item and attaches the singular tail of every path.
fn build_item<M: Metadata + ?Sized>(
    metadata: &M,
    paths: &[&ResolvedPath],
    segments: &[RelationDescriptor],
    mut groups: SmallVec<[Attributes; 4]>,
) -> Model {
    let mut item = hydrate(metadata, segments[0].related, core::mem::take(&mut groups[0]));
    for path in paths {
        let tail = &path.segments[1..];
        let tail_groups = tail
            .iter()
            .map(|descriptor| {
                segments
                    .iter()
                    .position(|segment| segment.name == descriptor.name)
                    .map(|index| groups[index].clone())
                    .unwrap_or_default()
            })
            .collect();
        if let Some(chain) = build_chain(metadata, tail, tail_groups) {
            let earlier = item.take_relations();
            item.set_relation(tail[0].name.clone(), Related::One(Box::new(chain)));
            item.absorb_relations(earlier);
        }
    }
    item
}
