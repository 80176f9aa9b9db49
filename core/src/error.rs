use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoineryError {
    /// A relation path names a one-to-many/many-to-many relation past its first segment
    #[error("Cannot join nested one-to-many or many-to-many relation `{relation}` in `{path}`")]
    UnsupportedJoinShape {
        path: CompactString,
        relation: CompactString,
    },

    /// A row limit was combined with a one-to-many/many-to-many join
    #[error(
        "Cannot limit query when joining a one-or-many-to-many relationship ({model}.{relation})"
    )]
    ConflictingLimit {
        model: CompactString,
        relation: CompactString,
    },

    /// The owner model declares no relation with this name
    #[error("Model `{model}` has no relation named `{relation}`")]
    UnknownRelation {
        model: CompactString,
        relation: CompactString,
    },

    /// No model is registered under this name
    #[error("Unknown model `{0}`")]
    UnknownModel(CompactString),

    /// A model name was registered twice
    #[error("Model `{0}` is already registered")]
    DuplicateModel(CompactString),

    /// A model, field or relation name contains the column namespace marker
    #[error("Name `{0}` contains the reserved column marker `_TEMP_`")]
    ReservedMarker(CompactString),

    /// A relation path with no segments
    #[error("Relation path is empty")]
    EmptyPath,

    /// Error reported by the query collaborator
    #[error("Query error: {0}")]
    Query(String),
}

/// Result type for join building and normalization
pub type Result<T> = std::result::Result<T, JoineryError>;
