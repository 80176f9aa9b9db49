//! The query-execution collaborator the engine drives.
//!
//! The engine never renders SQL itself. It asks the query layer to join a
//! resolved path, project namespaced columns and group fanned-out rows, then
//! runs the query and normalizes the flat rows it gets back.

use crate::attributes::Attributes;
use crate::error::Result;
use crate::join::{JoinConfig, JoinMode};
use crate::relation::ResolvedPath;

/// Query-building and execution capabilities consumed by [`JoinBuilder`](crate::JoinBuilder).
pub trait JoinQuery {
    /// Receives the base model's builder configuration once, when the join
    /// builder is created.
    fn configure(&mut self, _config: &JoinConfig) {}

    /// Joins every table along `path`.
    fn add_join(&mut self, path: &ResolvedPath, mode: JoinMode);

    /// Selects `qualified` as `alias`. Called at most once per pair.
    fn add_projected_column(&mut self, qualified: &str, alias: &str);

    /// Adds `qualified` to the GROUP BY list.
    fn add_group_by(&mut self, qualified: &str);

    /// Row limit currently set on the query, if any.
    fn row_limit(&self) -> Option<u64>;

    /// Executes the query, returning one attribute bag per result row.
    fn run(&mut self, columns: &[&str]) -> Result<Vec<Attributes>>;
}

impl<Q: JoinQuery + ?Sized> JoinQuery for &mut Q {
    fn configure(&mut self, config: &JoinConfig) {
        (**self).configure(config);
    }

    fn add_join(&mut self, path: &ResolvedPath, mode: JoinMode) {
        (**self).add_join(path, mode);
    }

    fn add_projected_column(&mut self, qualified: &str, alias: &str) {
        (**self).add_projected_column(qualified, alias);
    }

    fn add_group_by(&mut self, qualified: &str) {
        (**self).add_group_by(qualified);
    }

    fn row_limit(&self) -> Option<u64> {
        (**self).row_limit()
    }

    fn run(&mut self, columns: &[&str]) -> Result<Vec<Attributes>> {
        (**self).run(columns)
    }
}
