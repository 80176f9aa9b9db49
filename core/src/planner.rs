//! Grouping for fanned-out "many" joins.

use compact_str::{CompactString, format_compact};
use hashbrown::HashSet;

use crate::query::JoinQuery;
use crate::relation::{RelationDescriptor, ResolvedPath};

/// Requests a GROUP BY on `<relation>.<related primary key>` for every
/// one-to-many/many-to-many segment.
#[derive(Debug, Default)]
pub struct GroupingPlanner {
    registered: HashSet<CompactString>,
}

impl GroupingPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grouping column for `descriptor`; `None` for singular relations.
    pub fn grouping_for(descriptor: &RelationDescriptor) -> Option<CompactString> {
        descriptor.kind.is_many().then(|| {
            format_compact!("{}.{}", descriptor.name, descriptor.related_primary_key)
        })
    }

    pub fn register<Q: JoinQuery + ?Sized>(&mut self, query: &mut Q, path: &ResolvedPath) {
        for column in path.segments.iter().filter_map(Self::grouping_for) {
            if self.registered.insert(column.clone()) {
                query.add_group_by(&column);
            }
        }
    }
}
