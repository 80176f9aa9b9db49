use crate::metadata::Metadata;
use crate::model::{Model, ModelId, Related};
use crate::relation::ResolvedPath;

use super::{Grouped, build_chain, hydrate};

/// Rebuilds every row as a base instance with the singular chain of `path`
/// attached under the path's first segment.
///
/// Relations attached to a row by earlier paths are kept; see
/// [`Relations::absorb`](crate::Relations::absorb) for conflicts. Rows keep
/// their position.
pub(crate) fn rehydrate_one<M: Metadata + ?Sized>(
    metadata: &M,
    base: ModelId,
    path: &ResolvedPath,
    rows: &mut [Model],
) {
    crate::joinery_profile_function!();
    let leading = path.leading();
    for row in rows.iter_mut() {
        let earlier = row.take_relations();
        let grouped = Grouped::split(row.take_attributes(), &path.segments);

        let mut rebuilt = hydrate(metadata, base, grouped.base);
        if let Some(chain) = build_chain(metadata, &path.segments, grouped.segments) {
            rebuilt.set_relation(leading.name.clone(), Related::One(Box::new(chain)));
        }
        rebuilt.absorb_relations(earlier);
        *row = rebuilt;
    }
}
