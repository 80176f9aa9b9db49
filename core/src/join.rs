//! Join modes and the builder configuration a model declares for its queries.
//!
//! This replaces mixing a join-aware builder into every model: a model hands
//! the engine a [`JoinConfig`] and the engine forwards it to the query layer.

use core::fmt;

use compact_str::CompactString;

// =============================================================================
// Join Mode
// =============================================================================

/// How a related table is joined onto the base query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum JoinMode {
    #[default]
    Inner,
    Left,
}

impl JoinMode {
    /// SQL keyword for this join.
    pub const fn keyword(self) -> &'static str {
        match self {
            JoinMode::Inner => "INNER JOIN",
            JoinMode::Left => "LEFT JOIN",
        }
    }
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// =============================================================================
// Aggregate Method
// =============================================================================

/// Aggregate the query layer applies when ordering or filtering on a joined
/// "many" relation's column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AggregateMethod {
    #[default]
    Max,
    Min,
    Sum,
    Avg,
    Count,
}

impl AggregateMethod {
    pub const fn function(self) -> &'static str {
        match self {
            AggregateMethod::Max => "MAX",
            AggregateMethod::Min => "MIN",
            AggregateMethod::Sum => "SUM",
            AggregateMethod::Avg => "AVG",
            AggregateMethod::Count => "COUNT",
        }
    }
}

impl fmt::Display for AggregateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function())
    }
}

// =============================================================================
// Builder Configuration
// =============================================================================

/// Query-construction settings a model declares for its join builders.
///
/// Uses const fn methods so a model can declare its configuration in a
/// `const` item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct JoinConfig {
    /// Qualify projected columns with the relation name instead of the table name.
    pub use_table_alias: bool,
    /// Join mode used for the model's default includes.
    pub join_mode: JoinMode,
    /// Aggregate forwarded to the query layer.
    pub aggregate_method: AggregateMethod,
    /// Ask the query layer to append a related-row count per "many" join.
    pub append_relations_count: bool,
}

impl JoinConfig {
    pub const fn new() -> Self {
        Self {
            use_table_alias: false,
            join_mode: JoinMode::Inner,
            aggregate_method: AggregateMethod::Max,
            append_relations_count: false,
        }
    }

    pub const fn table_alias(mut self, use_table_alias: bool) -> Self {
        self.use_table_alias = use_table_alias;
        self
    }

    pub const fn left(mut self) -> Self {
        self.join_mode = JoinMode::Left;
        self
    }

    pub const fn join_mode(mut self, join_mode: JoinMode) -> Self {
        self.join_mode = join_mode;
        self
    }

    pub const fn aggregate(mut self, method: AggregateMethod) -> Self {
        self.aggregate_method = method;
        self
    }

    pub const fn relations_count(mut self, append: bool) -> Self {
        self.append_relations_count = append;
        self
    }
}

/// Declarative per-model configuration read when a builder is created.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ModelConfig {
    /// Relation paths joined on every query unless excluded.
    pub includes: Vec<CompactString>,
    pub join: JoinConfig,
}
