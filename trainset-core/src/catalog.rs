//! Metadata catalog records and read accessors
//!
//! The catalog holds feature, label, source and training-set definitions.
//! Assembly only reads it. Implementations must serialize statement
//! execution behind a single lock per instance.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `(name, variant)` reference to a catalog resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantRef {
    /// Resource name
    pub name: String,

    /// Variant of the resource
    pub variant: String,
}

impl VariantRef {
    /// Create a new reference
    pub fn new(name: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variant: variant.into(),
        }
    }
}

impl fmt::Display for VariantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.variant)
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for VariantRef {
    fn from((name, variant): (N, V)) -> Self {
        Self::new(name, variant)
    }
}

/// How a source variant produces its rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDefinition {
    /// Backed by a concrete table location (a delimited file)
    Raw {
        /// Location of the table
        location: PathBuf,
    },

    /// Derived from other sources by registered logic
    Transformation {
        /// Declared inputs, in the order the logic receives them
        inputs: Vec<VariantRef>,

        /// Registry key of the transformation logic
        logic: String,
    },
}

/// A named, versioned tabular definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceVariant {
    /// Name of the source
    pub name: String,

    /// Variant of the source
    pub variant: String,

    /// Raw location or transformation recipe
    pub definition: SourceDefinition,
}

impl SourceVariant {
    /// A source backed by a file
    pub fn raw(name: &str, variant: &str, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            variant: variant.to_string(),
            definition: SourceDefinition::Raw {
                location: location.into(),
            },
        }
    }

    /// A source derived by registered logic from `inputs`
    pub fn transformation(name: &str, variant: &str, inputs: Vec<VariantRef>, logic: &str) -> Self {
        Self {
            name: name.to_string(),
            variant: variant.to_string(),
            definition: SourceDefinition::Transformation {
                inputs,
                logic: logic.to_string(),
            },
        }
    }

    /// The `(name, variant)` identity of this source
    pub fn reference(&self) -> VariantRef {
        VariantRef::new(&self.name, &self.variant)
    }

    /// Whether this source is derived by a transformation
    pub fn is_transformation(&self) -> bool {
        matches!(self.definition, SourceDefinition::Transformation { .. })
    }
}

/// Column roles of a feature or label within its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    /// Entity (join key) column
    pub entity: String,

    /// Value column
    pub value: String,

    /// Optional timestamp column
    pub timestamp: Option<String>,
}

impl ColumnRoles {
    /// Roles without a timestamp
    pub fn new(entity: &str, value: &str) -> Self {
        Self {
            entity: entity.to_string(),
            value: value.to_string(),
            timestamp: None,
        }
    }

    /// Add a timestamp column
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    /// Role columns in `[entity, value, timestamp?]` order
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = vec![self.entity.as_str(), self.value.as_str()];
        if let Some(ts) = &self.timestamp {
            columns.push(ts.as_str());
        }
        columns
    }
}

/// A named, versioned feature definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVariant {
    /// Name of the feature
    pub name: String,

    /// Variant of the feature
    pub variant: String,

    /// Source the feature reads from
    pub source: VariantRef,

    /// Column roles within the source
    pub columns: ColumnRoles,
}

impl FeatureVariant {
    /// Create a feature definition
    pub fn new(name: &str, variant: &str, source: VariantRef, columns: ColumnRoles) -> Self {
        Self {
            name: name.to_string(),
            variant: variant.to_string(),
            source,
            columns,
        }
    }

    /// The `(name, variant)` identity of this feature
    pub fn reference(&self) -> VariantRef {
        VariantRef::new(&self.name, &self.variant)
    }

    /// Output column name, `<name>.<variant>`
    pub fn column_name(&self) -> String {
        self.reference().to_string()
    }
}

/// A named, versioned label definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelVariant {
    /// Name of the label
    pub name: String,

    /// Variant of the label
    pub variant: String,

    /// Source the label reads from
    pub source: VariantRef,

    /// Column roles within the source
    pub columns: ColumnRoles,
}

impl LabelVariant {
    /// Create a label definition
    pub fn new(name: &str, variant: &str, source: VariantRef, columns: ColumnRoles) -> Self {
        Self {
            name: name.to_string(),
            variant: variant.to_string(),
            source,
            columns,
        }
    }

    /// The `(name, variant)` identity of this label
    pub fn reference(&self) -> VariantRef {
        VariantRef::new(&self.name, &self.variant)
    }
}

/// A label plus an ordered list of features
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSetVariant {
    /// Name of the training set
    pub name: String,

    /// Variant of the training set
    pub variant: String,

    /// The label
    pub label: VariantRef,

    /// Features, in output column order
    pub features: Vec<VariantRef>,
}

impl TrainingSetVariant {
    /// The `(name, variant)` identity of this training set
    pub fn reference(&self) -> VariantRef {
        VariantRef::new(&self.name, &self.variant)
    }
}

/// Read accessors over the metadata catalog
pub trait MetadataCatalog: Send + Sync {
    /// Look up a feature variant
    fn get_feature_variant(&self, name: &str, variant: &str) -> Result<FeatureVariant>;

    /// Look up a label variant
    fn get_label_variant(&self, name: &str, variant: &str) -> Result<LabelVariant>;

    /// Look up a source variant
    fn get_source_variant(&self, name: &str, variant: &str) -> Result<SourceVariant>;

    /// Look up a training set variant
    fn get_training_set_variant(&self, name: &str, variant: &str) -> Result<TrainingSetVariant>;

    /// Ordered features of a training set
    fn get_training_set_features(&self, name: &str, variant: &str) -> Result<Vec<VariantRef>> {
        Ok(self.get_training_set_variant(name, variant)?.features)
    }

    /// Whether a source is derived by a transformation
    fn is_transformation(&self, name: &str, variant: &str) -> Result<bool> {
        Ok(self.get_source_variant(name, variant)?.is_transformation())
    }
}

#[derive(Debug, Default)]
struct CatalogTables {
    sources: HashMap<VariantRef, SourceVariant>,
    features: HashMap<VariantRef, FeatureVariant>,
    labels: HashMap<VariantRef, LabelVariant>,
    training_sets: HashMap<VariantRef, TrainingSetVariant>,
}

/// An in-process catalog guarded by a single lock
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: Mutex<CatalogTables>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut CatalogTables) -> T) -> Result<T> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| Error::Catalog("catalog lock poisoned".into()))?;
        Ok(f(&mut tables))
    }

    /// Register or replace a source variant
    pub fn insert_source(&self, source: SourceVariant) -> Result<()> {
        self.with_tables(|t| {
            t.sources.insert(source.reference(), source);
        })
    }

    /// Register or replace a feature variant
    pub fn insert_feature(&self, feature: FeatureVariant) -> Result<()> {
        self.with_tables(|t| {
            t.features.insert(feature.reference(), feature);
        })
    }

    /// Register or replace a label variant
    pub fn insert_label(&self, label: LabelVariant) -> Result<()> {
        self.with_tables(|t| {
            t.labels.insert(label.reference(), label);
        })
    }

    /// Register or replace a training set variant
    pub fn insert_training_set(&self, training_set: TrainingSetVariant) -> Result<()> {
        self.with_tables(|t| {
            t.training_sets.insert(training_set.reference(), training_set);
        })
    }
}

impl MetadataCatalog for MemoryCatalog {
    fn get_feature_variant(&self, name: &str, variant: &str) -> Result<FeatureVariant> {
        let key = VariantRef::new(name, variant);
        self.with_tables(|t| t.features.get(&key).cloned())?
            .ok_or_else(|| Error::not_found("feature", key))
    }

    fn get_label_variant(&self, name: &str, variant: &str) -> Result<LabelVariant> {
        let key = VariantRef::new(name, variant);
        self.with_tables(|t| t.labels.get(&key).cloned())?
            .ok_or_else(|| Error::not_found("label", key))
    }

    fn get_source_variant(&self, name: &str, variant: &str) -> Result<SourceVariant> {
        let key = VariantRef::new(name, variant);
        self.with_tables(|t| t.sources.get(&key).cloned())?
            .ok_or_else(|| Error::not_found("source", key))
    }

    fn get_training_set_variant(&self, name: &str, variant: &str) -> Result<TrainingSetVariant> {
        let key = VariantRef::new(name, variant);
        self.with_tables(|t| t.training_sets.get(&key).cloned())?
            .ok_or_else(|| Error::not_found("training set", key))
    }
}
