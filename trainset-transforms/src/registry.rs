//! Registry of in-process transformation logic
//!
//! Transformation sources name their logic by a stable key. The key is
//! resolved here to a callable supplied by the embedding application.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use trainset_core::{Column, Result, Table, Value};

/// What a transformation produces
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutput {
    /// A full table
    Table(Table),

    /// A single column, promoted to a table keyed by row position
    Column(Column),
}

/// Name of the implicit row key added when a single column is promoted
pub const INDEX_COLUMN: &str = "index";

impl TransformOutput {
    /// Convert the output into a table.
    ///
    /// A single column becomes a two-column table: an `index` column holding
    /// the row positions, followed by the column itself.
    pub fn into_table(self) -> Result<Table> {
        match self {
            TransformOutput::Table(table) => Ok(table),
            TransformOutput::Column(column) => {
                let index = (0..column.len())
                    .map(|i| Value::Int(i64::try_from(i).unwrap_or(i64::MAX)))
                    .collect();
                let index = Column::from_values(INDEX_COLUMN, index)?;
                Table::new(vec![index, column])
            }
        }
    }
}

impl From<Table> for TransformOutput {
    fn from(table: Table) -> Self {
        TransformOutput::Table(table)
    }
}

impl From<Column> for TransformOutput {
    fn from(column: Column) -> Self {
        TransformOutput::Column(column)
    }
}

/// Transformation logic invoked with resolved input tables in declared order
pub trait Transformation: Send + Sync {
    /// Produce the output from the inputs
    fn apply(&self, inputs: &[Table]) -> anyhow::Result<TransformOutput>;
}

impl<F> Transformation for F
where
    F: Fn(&[Table]) -> anyhow::Result<TransformOutput> + Send + Sync,
{
    fn apply(&self, inputs: &[Table]) -> anyhow::Result<TransformOutput> {
        self(inputs)
    }
}

/// Maps logic keys to transformation callables
#[derive(Clone, Default)]
pub struct TransformationRegistry {
    transformations: HashMap<String, Arc<dyn Transformation>>,
}

impl TransformationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register logic under `key`, replacing any previous entry
    pub fn register(&mut self, key: &str, transformation: impl Transformation + 'static) {
        self.transformations
            .insert(key.to_string(), Arc::new(transformation));
    }

    /// Register a closure under `key`
    pub fn register_fn<F>(&mut self, key: &str, f: F)
    where
        F: Fn(&[Table]) -> anyhow::Result<TransformOutput> + Send + Sync + 'static,
    {
        self.register(key, f);
    }

    /// Builder-style [`TransformationRegistry::register_fn`]
    #[must_use]
    pub fn with_fn<F>(mut self, key: &str, f: F) -> Self
    where
        F: Fn(&[Table]) -> anyhow::Result<TransformOutput> + Send + Sync + 'static,
    {
        self.register_fn(key, f);
        self
    }

    /// Look up logic by key
    pub fn get(&self, key: &str) -> Option<Arc<dyn Transformation>> {
        self.transformations.get(key).cloned()
    }

    /// Number of registered transformations
    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }
}

impl fmt::Debug for TransformationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.transformations.keys().collect();
        keys.sort();
        f.debug_struct("TransformationRegistry")
            .field("keys", &keys)
            .finish()
    }
}
