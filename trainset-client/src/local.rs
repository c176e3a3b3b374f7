//! Local client: assembly in process from a metadata catalog

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use trainset_catalog::SqliteCatalog;
use trainset_core::{FeatureVariant, MetadataCatalog, Result, SourceLoader, Table, Value, VariantRef};
use trainset_join::PointInTimeJoinEngine;
use trainset_readers::{CsvReaderOptions, CsvSourceLoader};
use trainset_stream::{BoxedRowStream, Dataset, MemoryStream};
use trainset_transforms::{TransformationRegistry, TransformationResolver};

/// Assembles training sets and serves features without a remote endpoint
pub struct LocalClient {
    catalog: Arc<dyn MetadataCatalog>,
    loader: Arc<dyn SourceLoader>,
    registry: TransformationRegistry,
}

impl LocalClient {
    /// A client over explicit collaborators
    pub fn new(
        catalog: Arc<dyn MetadataCatalog>,
        loader: Arc<dyn SourceLoader>,
        registry: TransformationRegistry,
    ) -> Self {
        Self {
            catalog,
            loader,
            registry,
        }
    }

    /// Open the SQLite catalog at `metadata_path` and read raw sources as CSV
    pub fn open(
        metadata_path: &Path,
        csv: CsvReaderOptions,
        registry: TransformationRegistry,
    ) -> crate::Result<Self> {
        let catalog = SqliteCatalog::open(metadata_path)?;
        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(CsvSourceLoader::new(csv)),
            registry,
        ))
    }

    /// The catalog definitions are read from
    pub fn catalog(&self) -> &Arc<dyn MetadataCatalog> {
        &self.catalog
    }

    fn with_engine<T>(&self, f: impl FnOnce(&PointInTimeJoinEngine<'_>) -> Result<T>) -> Result<T> {
        let resolver = TransformationResolver::new(self.catalog.as_ref(), self.loader.as_ref(), &self.registry);
        f(&PointInTimeJoinEngine::new(resolver))
    }

    /// Assemble a registered training set into a table
    pub fn training_table(&self, name: &str, variant: &str) -> Result<Table> {
        self.with_engine(|engine| engine.assemble_training_set(name, variant))
    }

    /// Assemble a registered training set and stream its rows
    pub fn training_set(&self, name: &str, variant: &str) -> Result<Dataset<BoxedRowStream>> {
        let table = self.training_table(name, variant)?;
        info!(
            training_set = %VariantRef::new(name, variant),
            rows = table.row_count(),
            "training set ready"
        );

        let stream: BoxedRowStream = Box::new(MemoryStream::from_table(&table)?);
        Ok(Dataset::new(stream))
    }

    /// Latest values of `features` for one entity, in request order
    pub fn features(&self, features: &[VariantRef], entity_name: &str, entity_value: &Value) -> Result<Vec<Value>> {
        let definitions = features
            .iter()
            .map(|f| self.catalog.get_feature_variant(&f.name, &f.variant))
            .collect::<Result<Vec<FeatureVariant>>>()?;

        self.with_engine(|engine| engine.serve_features(&definitions, entity_name, entity_value))
    }
}
