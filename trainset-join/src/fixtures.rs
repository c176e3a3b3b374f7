//! In-memory catalogs for join tests

use trainset_core::{
    ColumnRoles, FeatureVariant, LabelVariant, MemoryCatalog, SourceVariant, Table, TrainingSetVariant, Value,
    VariantRef,
};
use trainset_readers::MemorySourceLoader;
use trainset_transforms::{TransformOutput, TransformationRegistry, TransformationResolver};

use crate::engine::PointInTimeJoinEngine;

pub(crate) struct Fixture {
    catalog: MemoryCatalog,
    loader: MemorySourceLoader,
    registry: TransformationRegistry,
}

fn times_ten(inputs: &[Table]) -> anyhow::Result<TransformOutput> {
    let table = inputs[0].clone();
    let scaled = table
        .column_by_name("amount")?
        .values()
        .iter()
        .map(|v| match v {
            Value::Int(i) => Value::Int(i * 10),
            other => other.clone(),
        })
        .collect();
    let scaled = trainset_core::Column::from_values("amount", scaled)?;
    let table = table.drop_column("amount")?.with_column(scaled)?;
    Ok(table.into())
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            catalog: MemoryCatalog::new(),
            loader: MemorySourceLoader::new(),
            registry: TransformationRegistry::new().with_fn("times_ten", times_ten),
        }
    }

    pub fn raw_source(&mut self, name: &str, table: Table) -> VariantRef {
        self.catalog
            .insert_source(SourceVariant::raw(name, "v1", format!("{name}.csv")))
            .unwrap();
        let reference = VariantRef::new(name, "v1");
        self.loader.insert(reference.clone(), table);
        reference
    }

    pub fn transformation(&mut self, name: &str, inputs: Vec<VariantRef>, logic: &str) -> VariantRef {
        self.catalog
            .insert_source(SourceVariant::transformation(name, "v1", inputs, logic))
            .unwrap();
        VariantRef::new(name, "v1")
    }

    pub fn label(&mut self, name: &str, table: Table, roles: ColumnRoles) -> LabelVariant {
        let source = self.raw_source(&format!("{name}_labels"), table);
        let label = LabelVariant::new(name, "v1", source, roles);
        self.catalog.insert_label(label.clone()).unwrap();
        label
    }

    pub fn feature(&mut self, name: &str, table: Table, roles: ColumnRoles) -> FeatureVariant {
        let source = self.raw_source(&format!("{name}_source"), table);
        self.feature_on(name, source, roles)
    }

    pub fn feature_on(&mut self, name: &str, source: VariantRef, roles: ColumnRoles) -> FeatureVariant {
        let feature = FeatureVariant::new(name, "v1", source, roles);
        self.catalog.insert_feature(feature.clone()).unwrap();
        feature
    }

    pub fn training_set(&mut self, name: &str, label: &LabelVariant, features: &[&FeatureVariant]) {
        self.catalog
            .insert_training_set(TrainingSetVariant {
                name: name.to_string(),
                variant: "v1".to_string(),
                label: label.reference(),
                features: features.iter().map(|f| f.reference()).collect(),
            })
            .unwrap();
    }

    pub fn engine<T>(&self, f: impl FnOnce(&PointInTimeJoinEngine<'_>) -> T) -> T {
        let resolver = TransformationResolver::new(&self.catalog, &self.loader, &self.registry);
        f(&PointInTimeJoinEngine::new(resolver))
    }
}
