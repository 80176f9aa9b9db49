//! In-memory query collaborator.
//!
//! Records every directive the engine issues and returns rows it was seeded
//! with. Useful for normalizing rows fetched through another channel, and for
//! asserting on the directives in tests.

use compact_str::CompactString;

use crate::attributes::Attributes;
use crate::error::Result;
use crate::join::{JoinConfig, JoinMode};
use crate::query::JoinQuery;
use crate::relation::ResolvedPath;

/// A join the engine asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedJoin {
    pub path: CompactString,
    pub tables: Vec<CompactString>,
    pub mode: JoinMode,
}

/// Recording [`JoinQuery`] over a fixed set of rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    rows: Vec<Attributes>,
    limit: Option<u64>,
    config: Option<JoinConfig>,
    joins: Vec<RecordedJoin>,
    projections: Vec<(CompactString, CompactString)>,
    group_by: Vec<CompactString>,
    selected: Vec<CompactString>,
}

impl MemoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the rows `run` will return.
    pub fn with_rows<I: IntoIterator<Item = Attributes>>(mut self, rows: I) -> Self {
        self.rows = rows.into_iter().collect();
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn config(&self) -> Option<&JoinConfig> {
        self.config.as_ref()
    }

    pub fn joins(&self) -> &[RecordedJoin] {
        &self.joins
    }

    /// `(qualified, alias)` pairs in the order they were requested.
    pub fn projections(&self) -> &[(CompactString, CompactString)] {
        &self.projections
    }

    pub fn group_by(&self) -> &[CompactString] {
        &self.group_by
    }

    /// Columns passed to the last `run`.
    pub fn selected(&self) -> &[CompactString] {
        &self.selected
    }
}

impl JoinQuery for MemoryQuery {
    fn configure(&mut self, config: &JoinConfig) {
        self.config = Some(*config);
    }

    fn add_join(&mut self, path: &ResolvedPath, mode: JoinMode) {
        self.joins.push(RecordedJoin {
            path: path.path.to_string().into(),
            tables: path
                .segments
                .iter()
                .map(|segment| segment.related_table.clone())
                .collect(),
            mode,
        });
    }

    fn add_projected_column(&mut self, qualified: &str, alias: &str) {
        self.projections.push((qualified.into(), alias.into()));
    }

    fn add_group_by(&mut self, qualified: &str) {
        self.group_by.push(qualified.into());
    }

    fn row_limit(&self) -> Option<u64> {
        self.limit
    }

    fn run(&mut self, columns: &[&str]) -> Result<Vec<Attributes>> {
        self.selected = columns.iter().map(|&c| c.into()).collect();
        Ok(self.rows.clone())
    }
}
