//! In-memory source loader

use std::collections::HashMap;

use trainset_core::{ColumnRoles, Error, Result, SourceLoader, SourceVariant, Table, VariantRef};

use crate::common::apply_roles;

/// Serves raw sources from tables held in memory, keyed by source reference
#[derive(Debug, Clone, Default)]
pub struct MemorySourceLoader {
    tables: HashMap<VariantRef, Table>,
}

impl MemorySourceLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the table served for `reference`
    pub fn insert(&mut self, reference: VariantRef, table: Table) {
        self.tables.insert(reference, table);
    }

    /// Builder-style [`MemorySourceLoader::insert`]
    #[must_use]
    pub fn with_table(mut self, reference: VariantRef, table: Table) -> Self {
        self.insert(reference, table);
        self
    }
}

impl SourceLoader for MemorySourceLoader {
    fn load(&self, source: &SourceVariant) -> Result<Table> {
        let reference = source.reference();
        self.tables
            .get(&reference)
            .cloned()
            .ok_or_else(|| Error::not_found("source table", reference))
    }

    fn load_with_roles(&self, source: &SourceVariant, roles: &ColumnRoles) -> Result<Table> {
        apply_roles(self.load(source)?, roles)
    }
}
