//! Relation graph walking: resolving a dotted path one segment at a time.

use compact_str::CompactString;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::{JoineryError, Result};
use crate::metadata::Metadata;
use crate::model::ModelId;
use crate::namespace::ensure_unreserved;
use crate::relation::{RelationDescriptor, RelationPath, ResolvedPath};

/// Descriptors already resolved by one builder, keyed by owner and relation name.
///
/// Repeated path prefixes (`category`, then `category.creator`) hit the
/// metadata collaborator once.
#[derive(Debug, Default)]
pub struct RelationCache {
    resolved: HashMap<(ModelId, CompactString), RelationDescriptor>,
}

impl RelationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Concrete model a relation of `owner` resolved to, if already seen.
    pub fn related(&self, owner: ModelId, relation: &str) -> Option<ModelId> {
        self.resolved
            .get(&(owner, CompactString::from(relation)))
            .map(|descriptor| descriptor.related)
    }

    fn resolve<M: Metadata + ?Sized>(
        &mut self,
        metadata: &M,
        owner: ModelId,
        relation: &str,
    ) -> Result<RelationDescriptor> {
        let key = (owner, CompactString::from(relation));
        if let Some(descriptor) = self.resolved.get(&key) {
            return Ok(descriptor.clone());
        }
        let target = metadata.resolve_relation(owner, relation)?;
        let descriptor = RelationDescriptor::describe(metadata, relation, target);
        self.resolved.insert(key, descriptor.clone());
        Ok(descriptor)
    }
}

/// Resolves every segment of `path`, starting from `base`.
///
/// Segment 0 resolves against `base`; every later segment resolves against
/// the model the previous segment points at. Fails with
/// [`JoineryError::UnsupportedJoinShape`] if a segment past the first is a
/// one-to-many/many-to-many relation, and propagates
/// [`JoineryError::UnknownRelation`] from the metadata collaborator.
pub fn walk<M: Metadata + ?Sized>(
    metadata: &M,
    cache: &mut RelationCache,
    base: ModelId,
    path: &RelationPath,
) -> Result<ResolvedPath> {
    let (_, segments) = path.segments().iter().enumerate().try_fold(
        (base, SmallVec::<[RelationDescriptor; 4]>::new()),
        |(owner, mut resolved), (index, segment)| {
            ensure_unreserved(segment)?;
            let descriptor = cache.resolve(metadata, owner, segment)?;
            if index > 0 && descriptor.kind.is_many() {
                return Err(JoineryError::UnsupportedJoinShape {
                    path: path.to_string().into(),
                    relation: descriptor.name,
                });
            }
            let next = descriptor.related;
            resolved.push(descriptor);
            Ok((next, resolved))
        },
    )?;

    Ok(ResolvedPath {
        path: path.clone(),
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ModelDef, RelationDef, Registry};
    use crate::relation::RelationKind;

    fn registry() -> Registry {
        Registry::builder()
            .model(
                ModelDef::new("comment", "comments")
                    .relation(RelationDef::belongs_to("post", "post")),
            )
            .model(
                ModelDef::new("post", "posts")
                    .relation(RelationDef::belongs_to("category", "category"))
                    .relation(RelationDef::has_many("comments", "comment")),
            )
            .model(
                ModelDef::new("category", "categories")
                    .relation(RelationDef::belongs_to("creator", "user")),
            )
            .model(ModelDef::new("user", "users"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_walk_nested_singular_path() {
        let registry = registry();
        let comment = registry.id("comment").unwrap();
        let mut cache = RelationCache::new();
        let path = RelationPath::parse("post.category.creator").unwrap();

        let resolved = walk(&registry, &mut cache, comment, &path).unwrap();
        let names: Vec<_> = resolved.names().collect();
        assert_eq!(names, ["post", "category", "creator"]);
        assert_eq!(resolved.segments[2].related, registry.id("user").unwrap());
        assert_eq!(resolved.segments[2].related_table, "users");
        assert_eq!(cache.len(), 3);
        assert_eq!(
            cache.related(registry.id("category").unwrap(), "creator"),
            registry.id("user")
        );
    }

    #[test]
    fn test_walk_rejects_nested_many() {
        let registry = registry();
        let comment = registry.id("comment").unwrap();
        let mut cache = RelationCache::new();
        let path = RelationPath::parse("post.comments").unwrap();

        assert_eq!(
            walk(&registry, &mut cache, comment, &path),
            Err(JoineryError::UnsupportedJoinShape {
                path: "post.comments".into(),
                relation: "comments".into(),
            })
        );
    }

    #[test]
    fn test_walk_allows_leading_many() {
        let registry = registry();
        let post = registry.id("post").unwrap();
        let mut cache = RelationCache::new();
        let path = RelationPath::parse("comments.post").unwrap();

        let resolved = walk(&registry, &mut cache, post, &path).unwrap();
        assert!(resolved.is_many());
        assert_eq!(resolved.segments[1].kind, RelationKind::BelongsToOne);
    }

    #[test]
    fn test_walk_unknown_relation() {
        let registry = registry();
        let post = registry.id("post").unwrap();
        let mut cache = RelationCache::new();
        let path = RelationPath::parse("category.owner").unwrap();

        assert_eq!(
            walk(&registry, &mut cache, post, &path),
            Err(JoineryError::UnknownRelation {
                model: "category".into(),
                relation: "owner".into(),
            })
        );
    }
}
