//! Column projection for joined relations.

use compact_str::{CompactString, format_compact};
use hashbrown::HashSet;

use crate::namespace;
use crate::query::JoinQuery;
use crate::relation::{RelationDescriptor, ResolvedPath};

/// One projected-column directive: select `qualified` as `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectedColumn {
    pub qualified: CompactString,
    pub alias: CompactString,
}

/// Emits namespaced column directives, never the same pair twice.
#[derive(Debug, Default)]
pub struct ColumnProjector {
    use_table_alias: bool,
    registered: HashSet<ProjectedColumn>,
}

impl ColumnProjector {
    /// With `use_table_alias`, columns are qualified by relation name rather
    /// than by table name.
    pub fn new(use_table_alias: bool) -> Self {
        Self {
            use_table_alias,
            registered: HashSet::new(),
        }
    }

    /// Directives for one resolved segment.
    pub fn directives(&self, descriptor: &RelationDescriptor) -> Vec<ProjectedColumn> {
        let qualifier = if self.use_table_alias {
            &descriptor.name
        } else {
            &descriptor.related_table
        };
        descriptor
            .fields
            .iter()
            .map(|field| ProjectedColumn {
                qualified: format_compact!("{qualifier}.{field}"),
                alias: namespace::alias(&descriptor.name, field),
            })
            .collect()
    }

    /// Registers the columns of every segment of `path` with `query`.
    pub fn register<Q: JoinQuery + ?Sized>(&mut self, query: &mut Q, path: &ResolvedPath) {
        for descriptor in &path.segments {
            for column in self.directives(descriptor) {
                if self.registered.contains(&column) {
                    continue;
                }
                query.add_projected_column(&column.qualified, &column.alias);
                self.registered.insert(column);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryQuery;
    use crate::metadata::{ModelDef, RelationDef, Registry};
    use crate::relation::RelationPath;
    use crate::walker::{RelationCache, walk};

    fn resolved(path: &str) -> ResolvedPath {
        let registry = Registry::builder()
            .model(
                ModelDef::new("post", "posts")
                    .relation(RelationDef::belongs_to("category", "category"))
                    .relation(RelationDef::belongs_to_many("tags", "tag")),
            )
            .model(ModelDef::new("category", "categories").fields(["id", "name"]))
            .model(ModelDef::new("tag", "tags"))
            .build()
            .unwrap();
        let post = registry.id("post").unwrap();
        walk(
            &registry,
            &mut RelationCache::new(),
            post,
            &RelationPath::parse(path).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_declared_fields_are_namespaced() {
        let projector = ColumnProjector::new(false);
        let columns = projector.directives(resolved("category").leading());
        assert_eq!(
            columns,
            [
                ProjectedColumn {
                    qualified: "categories.id".into(),
                    alias: "category_TEMP_id".into(),
                },
                ProjectedColumn {
                    qualified: "categories.name".into(),
                    alias: "category_TEMP_name".into(),
                },
            ]
        );
    }

    #[test]
    fn test_primary_key_only_without_declared_fields() {
        let projector = ColumnProjector::new(true);
        let columns = projector.directives(resolved("tags").leading());
        assert_eq!(
            columns,
            [ProjectedColumn {
                qualified: "tags.id".into(),
                alias: "tags_TEMP_id".into(),
            }]
        );
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut projector = ColumnProjector::new(false);
        let mut query = MemoryQuery::new();
        let path = resolved("category");

        projector.register(&mut query, &path);
        projector.register(&mut query, &path);
        assert_eq!(query.projections().len(), 2);
        assert_eq!(projector.len(), 2);
    }
}
