//! The join builder: registers relation paths before the query runs and
//! normalizes the flat rows it returns.
//!
//! ```text
//! include(path)  → walk (validate + resolve) → join, project, group
//! execute(cols)  → default includes − excluded → limit check → run
//!                → no paths:        rows as returned
//!                → flatten mode:    `category_TEMP_name` → `category_name`
//!                → rehydrate mode:  per path, one-to-one or many rehydration
//! ```

use compact_str::CompactString;
use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::error::{JoineryError, Result};
use crate::join::JoinMode;
use crate::metadata::Metadata;
use crate::model::{Model, ModelId};
use crate::namespace;
use crate::planner::GroupingPlanner;
use crate::projector::ColumnProjector;
use crate::query::JoinQuery;
use crate::rehydrate::{rehydrate_many, rehydrate_one};
use crate::relation::{RelationPath, ResolvedPath};
use crate::walker::{RelationCache, walk};
use crate::{joinery_profile_scope, joinery_trace_execute, joinery_trace_include, joinery_trace_normalize};

/// Single-use builder for one query over base model `base`.
///
/// Create a fresh builder per query; caches and registered paths live as
/// long as the builder does.
pub struct JoinBuilder<'m, M: Metadata + ?Sized, Q: JoinQuery> {
    metadata: &'m M,
    base: ModelId,
    query: Q,
    paths: Vec<ResolvedPath>,
    excluded: HashSet<CompactString>,
    cache: RelationCache,
    projector: ColumnProjector,
    planner: GroupingPlanner,
    rehydrate: bool,
}

impl<'m, M: Metadata + ?Sized, Q: JoinQuery> JoinBuilder<'m, M, Q> {
    /// Creates a builder and hands the base model's configuration to `query`.
    pub fn new(metadata: &'m M, base: ModelId, mut query: Q) -> Self {
        let config = &metadata.config(base).join;
        query.configure(config);
        Self {
            metadata,
            base,
            query,
            paths: Vec::new(),
            excluded: HashSet::new(),
            cache: RelationCache::new(),
            projector: ColumnProjector::new(config.use_table_alias),
            planner: GroupingPlanner::new(),
            rehydrate: false,
        }
    }

    /// Joins the dotted relation `path` onto the query.
    ///
    /// The path is fully validated before anything is registered: on error
    /// no join, column or grouping has been added. Including a path twice is
    /// a no-op.
    pub fn include(mut self, path: &str, mode: JoinMode) -> Result<Self> {
        self.register(path, mode)?;
        Ok(self)
    }

    /// Skips `relation` when loading the base model's default includes.
    pub fn exclude(mut self, relation: impl Into<CompactString>) -> Self {
        self.excluded.insert(relation.into());
        self
    }

    /// Rebuilds related instances instead of flattening namespaced columns.
    pub fn enable_rehydration(mut self) -> Self {
        self.rehydrate = true;
        self
    }

    pub fn is_rehydrating(&self) -> bool {
        self.rehydrate
    }

    /// Paths registered so far, in registration order.
    pub fn registered_paths(&self) -> impl Iterator<Item = &RelationPath> {
        self.paths.iter().map(|resolved| &resolved.path)
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Runs the query and returns the normalized rows.
    ///
    /// Loads the base model's default includes (minus excluded ones), then
    /// fails with [`JoineryError::ConflictingLimit`] if a row limit is set
    /// while a one-to-many/many-to-many path is joined.
    pub fn execute(mut self, columns: &[&str]) -> Result<Vec<Model>> {
        self.load_default_includes()?;
        self.check_limit()?;

        joinery_trace_execute!(
            self.metadata.model_name(self.base),
            self.paths.len(),
            self.rehydrate
        );
        let rows: Vec<Model> = self
            .query
            .run(columns)?
            .into_iter()
            .map(|attributes| {
                let mut row = self.metadata.instantiate(self.base, attributes);
                row.set_exists(true);
                row
            })
            .collect();

        if self.paths.is_empty() {
            return Ok(rows);
        }
        if !self.rehydrate {
            return Ok(flatten(rows));
        }
        Ok(self.rehydrate_rows(rows))
    }

    fn register(&mut self, path: &str, mode: JoinMode) -> Result<()> {
        let path = RelationPath::parse(path)?;
        if self.paths.iter().any(|resolved| resolved.path == path) {
            return Ok(());
        }
        let resolved = walk(self.metadata, &mut self.cache, self.base, &path)?;

        joinery_trace_include!(resolved.path, mode);
        self.query.add_join(&resolved, mode);
        self.projector.register(&mut self.query, &resolved);
        self.planner.register(&mut self.query, &resolved);
        self.paths.push(resolved);
        Ok(())
    }

    fn load_default_includes(&mut self) -> Result<()> {
        let metadata = self.metadata;
        let config = metadata.config(self.base);
        for path in &config.includes {
            if !self.excluded.contains(path) {
                self.register(path, config.join.join_mode)?;
            }
        }
        Ok(())
    }

    fn check_limit(&self) -> Result<()> {
        if !self.query.row_limit().is_some_and(|limit| limit > 0) {
            return Ok(());
        }
        match self.paths.iter().find(|resolved| resolved.is_many()) {
            Some(resolved) => Err(JoineryError::ConflictingLimit {
                model: self.metadata.model_name(self.base).into(),
                relation: resolved.leading().name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Dispatches every path in registration order. "Many" paths sharing a
    /// leading segment are rehydrated together, at the position of the first
    /// of them.
    fn rehydrate_rows(&self, mut rows: Vec<Model>) -> Vec<Model> {
        joinery_profile_scope!("normalize", "rehydrate");
        let mut dispatched: HashSet<&str> = HashSet::new();
        for resolved in &self.paths {
            if !resolved.is_many() {
                joinery_trace_normalize!("one", resolved.path, rows.len());
                rehydrate_one(self.metadata, self.base, resolved, &mut rows);
                continue;
            }
            let leading = resolved.leading().name.as_str();
            if !dispatched.insert(leading) {
                continue;
            }
            let group: SmallVec<[&ResolvedPath; 2]> = self
                .paths
                .iter()
                .filter(|other| other.is_many() && other.leading().name == leading)
                .collect();
            joinery_trace_normalize!("many", resolved.path, rows.len());
            rows = rehydrate_many(self.metadata, self.base, &group, rows);
        }
        rows
    }
}

/// Renames every namespaced column of every row in place.
///
/// `category_TEMP_name` becomes `category_name`; a renamed column overwrites
/// a base column of the same name.
pub fn flatten(mut rows: Vec<Model>) -> Vec<Model> {
    joinery_profile_scope!("normalize", "flatten");
    for row in &mut rows {
        let attributes = row
            .take_attributes()
            .into_iter()
            .map(|(column, value)| (namespace::flatten(&column), value))
            .collect();
        row.set_attributes(attributes);
    }
    rows
}
