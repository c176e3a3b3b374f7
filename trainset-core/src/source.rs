//! Source loading trait for raw (non-transformation) sources

use crate::catalog::{ColumnRoles, SourceVariant};
use crate::error::Result;
use crate::table::Table;

/// Loads the rows of a raw source variant
pub trait SourceLoader: Send + Sync {
    /// Load the full table behind a raw source
    fn load(&self, source: &SourceVariant) -> Result<Table>;

    /// Load a raw source and check that the role columns exist.
    ///
    /// When `roles` declares a timestamp column its values are parsed as
    /// timestamps.
    fn load_with_roles(&self, source: &SourceVariant, roles: &ColumnRoles) -> Result<Table>;
}
