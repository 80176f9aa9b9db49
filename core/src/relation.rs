//! Relation kinds, resolved relation descriptors and dotted relation paths.

use core::fmt;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::error::{JoineryError, Result};
use crate::metadata::Metadata;
use crate::model::ModelId;

/// Kind of a declared relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Many-to-one: a post belongs to one category.
    BelongsToOne,
    /// One-to-one: a user has one profile.
    HasOne,
    /// One-to-many: a post has many comments.
    HasMany,
    /// Many-to-many through a link table: a post belongs to many tags.
    BelongsToMany,
}

impl RelationKind {
    /// At most one related row per base row.
    pub const fn is_singular(self) -> bool {
        matches!(self, RelationKind::BelongsToOne | RelationKind::HasOne)
    }

    /// Zero or more related rows per base row; the join fans rows out.
    pub const fn is_many(self) -> bool {
        !self.is_singular()
    }
}

/// A declared relation as reported by the metadata collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationTarget {
    pub kind: RelationKind,
    pub related: ModelId,
}

/// Everything the engine needs to know about one resolved path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub name: CompactString,
    pub kind: RelationKind,
    pub related: ModelId,
    pub related_table: CompactString,
    pub related_primary_key: CompactString,
    /// Fields projected for this relation: the related model's declared
    /// fields, or only its primary key when it declares none.
    pub fields: SmallVec<[CompactString; 8]>,
}

impl RelationDescriptor {
    /// Completes `target` with the related model's table, key and fields.
    pub fn describe<M: Metadata + ?Sized>(
        metadata: &M,
        name: impl Into<CompactString>,
        target: RelationTarget,
    ) -> Self {
        let related_primary_key = CompactString::from(metadata.primary_key_name(target.related));
        let declared = metadata.declared_fields(target.related);
        let fields = if declared.is_empty() {
            smallvec::smallvec![related_primary_key.clone()]
        } else {
            declared.iter().cloned().collect()
        };
        Self {
            name: name.into(),
            kind: target.kind,
            related: target.related,
            related_table: metadata.table_name(target.related).into(),
            related_primary_key,
            fields,
        }
    }
}

/// A dotted sequence of relation names, e.g. `post.category.creator`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationPath {
    segments: SmallVec<[CompactString; 4]>,
}

impl RelationPath {
    /// Parses a dotted path, rejecting empty paths and empty segments.
    pub fn parse(path: &str) -> Result<Self> {
        let segments: SmallVec<[CompactString; 4]> =
            path.split('.').map(|s| CompactString::from(s.trim())).collect();
        if segments.iter().any(CompactString::is_empty) {
            return Err(JoineryError::EmptyPath);
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[CompactString] {
        &self.segments
    }

    pub fn first(&self) -> &str {
        // parse guarantees at least one segment
        &self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for RelationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// A relation path with every segment resolved to its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: RelationPath,
    pub segments: SmallVec<[RelationDescriptor; 4]>,
}

impl ResolvedPath {
    /// Descriptor of the first segment.
    pub fn leading(&self) -> &RelationDescriptor {
        &self.segments[0]
    }

    /// Whether the path starts with a one-to-many/many-to-many relation.
    pub fn is_many(&self) -> bool {
        self.leading().kind.is_many()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|d| d.name.as_str())
    }
}
