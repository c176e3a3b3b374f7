//! Recursive resolution of sources into concrete tables
//!
//! A transformation source is materialized by resolving each declared input
//! (recursing into further transformations, loading raw sources), then
//! invoking its registered logic with the input tables in declared order.
//! Nothing is cached: every reference to a source recomputes it.

use tracing::{debug, info_span, trace};
use trainset_core::{
    ColumnRoles, Error, MetadataCatalog, Result, SourceDefinition, SourceLoader, Table, VariantRef,
};
use trainset_readers::apply_roles;

use crate::registry::TransformationRegistry;

/// Materializes source variants, raw or derived
pub struct TransformationResolver<'a> {
    catalog: &'a dyn MetadataCatalog,
    loader: &'a dyn SourceLoader,
    registry: &'a TransformationRegistry,
}

impl<'a> TransformationResolver<'a> {
    /// Create a resolver over a catalog, a raw-source loader and a logic registry
    pub fn new(
        catalog: &'a dyn MetadataCatalog,
        loader: &'a dyn SourceLoader,
        registry: &'a TransformationRegistry,
    ) -> Self {
        Self {
            catalog,
            loader,
            registry,
        }
    }

    /// The catalog this resolver reads from
    pub fn catalog(&self) -> &'a dyn MetadataCatalog {
        self.catalog
    }

    /// Resolve a source variant into a table
    pub fn resolve(&self, name: &str, variant: &str) -> Result<Table> {
        let reference = VariantRef::new(name, variant);
        let _span = info_span!("resolve", source = %reference).entered();

        let mut in_progress = Vec::new();
        self.resolve_inner(&reference, &mut in_progress)
    }

    /// Resolve a source and check the role columns a feature or label declares.
    ///
    /// A declared timestamp column is parsed into timestamps.
    pub fn resolve_with_roles(&self, source: &VariantRef, roles: &ColumnRoles) -> Result<Table> {
        let record = self.catalog.get_source_variant(&source.name, &source.variant)?;

        if record.is_transformation() {
            let table = self.resolve(&source.name, &source.variant)?;
            apply_roles(table, roles)
        } else {
            self.loader.load_with_roles(&record, roles)
        }
    }

    fn resolve_inner(&self, reference: &VariantRef, in_progress: &mut Vec<VariantRef>) -> Result<Table> {
        // Revisiting a source before it completes means the chain loops back
        if let Some(start) = in_progress.iter().position(|r| r == reference) {
            let mut chain = in_progress[start..].to_vec();
            chain.push(reference.clone());
            return Err(Error::CycleDetected(chain));
        }

        let source = self
            .catalog
            .get_source_variant(&reference.name, &reference.variant)?;

        let SourceDefinition::Transformation { inputs, logic } = &source.definition else {
            trace!(source = %reference, "loading raw input");
            return self.loader.load(&source);
        };

        in_progress.push(reference.clone());
        let result = self.apply(reference, inputs, logic, in_progress);
        in_progress.pop();

        result
    }

    fn apply(
        &self,
        reference: &VariantRef,
        inputs: &[VariantRef],
        logic: &str,
        in_progress: &mut Vec<VariantRef>,
    ) -> Result<Table> {
        let mut tables = Vec::with_capacity(inputs.len());
        for input in inputs {
            tables.push(self.resolve_inner(input, in_progress)?);
        }

        let transformation = self.registry.get(logic).ok_or_else(|| Error::Transformation {
            reference: reference.clone(),
            message: format!("no transformation registered under key '{logic}'"),
        })?;

        debug!(source = %reference, logic, inputs = tables.len(), "applying transformation");

        let output = transformation
            .apply(&tables)
            .map_err(|e| Error::Transformation {
                reference: reference.clone(),
                message: format!("{e:#}"),
            })?;

        output.into_table().map_err(|e| Error::Transformation {
            reference: reference.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use trainset_core::{MemoryCatalog, SourceVariant, Value};
    use trainset_readers::MemorySourceLoader;

    use crate::registry::TransformOutput;

    fn transactions() -> Table {
        Table::from_rows(
            &["user", "amount"],
            vec![
                vec![Value::from("a"), Value::Int(10)],
                vec![Value::from("b"), Value::Int(20)],
                vec![Value::from("a"), Value::Int(30)],
            ],
        )
        .unwrap()
    }

    fn setup() -> (MemoryCatalog, MemorySourceLoader) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let catalog = MemoryCatalog::new();
        catalog
            .insert_source(SourceVariant::raw("transactions", "v1", "transactions.csv"))
            .unwrap();

        let loader = MemorySourceLoader::new().with_table(VariantRef::new("transactions", "v1"), transactions());
        (catalog, loader)
    }

    fn double_amount(inputs: &[Table]) -> anyhow::Result<TransformOutput> {
        let table = &inputs[0];
        let amounts = table
            .column_by_name("amount")?
            .values()
            .iter()
            .map(|v| match v {
                Value::Int(i) => Value::Int(i * 2),
                other => other.clone(),
            })
            .collect();
        let doubled = trainset_core::Column::from_values("amount", amounts)?;
        let user = table.column_by_name("user")?.clone();
        Ok(Table::new(vec![user, doubled])?.into())
    }

    #[test]
    fn test_resolve_raw_source() {
        let (catalog, loader) = setup();
        let registry = TransformationRegistry::new();
        let resolver = TransformationResolver::new(&catalog, &loader, &registry);

        let table = resolver.resolve("transactions", "v1").unwrap();
        assert_eq!(table, transactions());
    }

    #[test]
    fn test_resolve_nested_transformations() {
        let (catalog, loader) = setup();
        catalog
            .insert_source(SourceVariant::transformation(
                "doubled",
                "v1",
                vec![VariantRef::new("transactions", "v1")],
                "double",
            ))
            .unwrap();
        catalog
            .insert_source(SourceVariant::transformation(
                "quadrupled",
                "v1",
                vec![VariantRef::new("doubled", "v1")],
                "double",
            ))
            .unwrap();

        let registry = TransformationRegistry::new().with_fn("double", double_amount);
        let resolver = TransformationResolver::new(&catalog, &loader, &registry);

        let table = resolver.resolve("quadrupled", "v1").unwrap();
        assert_eq!(
            table.column_by_name("amount").unwrap().values(),
            &[Value::Int(40), Value::Int(80), Value::Int(120)]
        );
    }

    #[test]
    fn test_inputs_passed_in_declared_order() {
        let (catalog, mut loader) = setup();
        catalog
            .insert_source(SourceVariant::raw("users", "v1", "users.csv"))
            .unwrap();
        loader.insert(
            VariantRef::new("users", "v1"),
            Table::from_rows(&["user"], vec![vec![Value::from("a")]]).unwrap(),
        );
        catalog
            .insert_source(SourceVariant::transformation(
                "joined",
                "v1",
                vec![VariantRef::new("users", "v1"), VariantRef::new("transactions", "v1")],
                "column_counts",
            ))
            .unwrap();

        let registry = TransformationRegistry::new().with_fn("column_counts", |inputs| {
            let widths = inputs
                .iter()
                .map(|t| Value::Int(i64::try_from(t.column_count()).unwrap_or_default()))
                .collect();
            Ok(trainset_core::Column::from_values("width", widths)?.into())
        });
        let resolver = TransformationResolver::new(&catalog, &loader, &registry);

        let table = resolver.resolve("joined", "v1").unwrap();
        assert_eq!(
            table.column_by_name("width").unwrap().values(),
            &[Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn test_shared_dependency_is_not_a_cycle_and_recomputes() {
        let (catalog, loader) = setup();
        catalog
            .insert_source(SourceVariant::transformation(
                "left",
                "v1",
                vec![VariantRef::new("transactions", "v1")],
                "count",
            ))
            .unwrap();
        catalog
            .insert_source(SourceVariant::transformation(
                "diamond",
                "v1",
                vec![VariantRef::new("left", "v1"), VariantRef::new("left", "v1")],
                "first",
            ))
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = TransformationRegistry::new()
            .with_fn("count", move |inputs| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(inputs[0].clone().into())
            })
            .with_fn("first", |inputs| Ok(inputs[0].clone().into()));
        let resolver = TransformationResolver::new(&catalog, &loader, &registry);

        resolver.resolve("diamond", "v1").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cycle_detected() {
        let (catalog, loader) = setup();
        catalog
            .insert_source(SourceVariant::transformation(
                "a",
                "v1",
                vec![VariantRef::new("b", "v1")],
                "first",
            ))
            .unwrap();
        catalog
            .insert_source(SourceVariant::transformation(
                "b",
                "v1",
                vec![VariantRef::new("a", "v1")],
                "first",
            ))
            .unwrap();

        let registry = TransformationRegistry::new().with_fn("first", |inputs| Ok(inputs[0].clone().into()));
        let resolver = TransformationResolver::new(&catalog, &loader, &registry);

        match resolver.resolve("a", "v1") {
            Err(Error::CycleDetected(chain)) => {
                let names: Vec<&str> = chain.iter().map(|r| r.name.as_str()).collect();
                assert_eq!(names, vec!["a", "b", "a"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_failing_logic_is_wrapped() {
        let (catalog, loader) = setup();
        catalog
            .insert_source(SourceVariant::transformation(
                "broken",
                "v2",
                vec![VariantRef::new("transactions", "v1")],
                "explode",
            ))
            .unwrap();

        let registry =
            TransformationRegistry::new().with_fn("explode", |_| Err(anyhow::anyhow!("division by zero")));
        let resolver = TransformationResolver::new(&catalog, &loader, &registry);

        match resolver.resolve("broken", "v2") {
            Err(Error::Transformation { reference, message }) => {
                assert_eq!(reference, VariantRef::new("broken", "v2"));
                assert!(message.contains("division by zero"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_colliding_index_column_is_wrapped() {
        let (catalog, loader) = setup();
        catalog
            .insert_source(SourceVariant::transformation(
                "positions",
                "v1",
                vec![VariantRef::new("transactions", "v1")],
                "positions",
            ))
            .unwrap();

        let registry = TransformationRegistry::new().with_fn("positions", |inputs| {
            let width = i64::try_from(inputs[0].row_count()).unwrap_or_default();
            Ok(trainset_core::Column::from_values(crate::registry::INDEX_COLUMN, vec![Value::Int(width)])?.into())
        });
        let resolver = TransformationResolver::new(&catalog, &loader, &registry);

        match resolver.resolve("positions", "v1") {
            Err(Error::Transformation { reference, message }) => {
                assert_eq!(reference, VariantRef::new("positions", "v1"));
                assert!(message.contains("Duplicate column name"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_source_not_found() {
        let (catalog, loader) = setup();
        let registry = TransformationRegistry::new();
        let resolver = TransformationResolver::new(&catalog, &loader, &registry);

        assert!(matches!(
            resolver.resolve("nope", "v1"),
            Err(Error::NotFound { kind: "source", .. })
        ));
    }

    #[test]
    fn test_unregistered_logic_key() {
        let (catalog, loader) = setup();
        catalog
            .insert_source(SourceVariant::transformation(
                "orphan",
                "v1",
                vec![VariantRef::new("transactions", "v1")],
                "missing_key",
            ))
            .unwrap();

        let registry = TransformationRegistry::new();
        let resolver = TransformationResolver::new(&catalog, &loader, &registry);

        assert!(matches!(
            resolver.resolve("orphan", "v1"),
            Err(Error::Transformation { .. })
        ));
    }
}
