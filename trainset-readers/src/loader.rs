//! File-backed source loader

use tracing::{debug, info};
use trainset_core::{ColumnRoles, Error, Result, SourceDefinition, SourceLoader, SourceVariant, Table};

use crate::common::apply_roles;
use crate::csv::{CsvReader, CsvReaderOptions};

/// Loads raw sources from delimited files
#[derive(Debug, Clone, Default)]
pub struct CsvSourceLoader {
    options: CsvReaderOptions,
}

impl CsvSourceLoader {
    /// Create a loader with the given CSV options
    pub fn new(options: CsvReaderOptions) -> Self {
        Self { options }
    }

    /// The CSV options in use
    pub fn options(&self) -> &CsvReaderOptions {
        &self.options
    }
}

impl SourceLoader for CsvSourceLoader {
    fn load(&self, source: &SourceVariant) -> Result<Table> {
        let SourceDefinition::Raw { location } = &source.definition else {
            return Err(Error::InvalidArgument(format!(
                "source {} is a transformation, not a raw table",
                source.reference()
            )));
        };

        info!(source = %source.reference(), path = %location.display(), "loading raw source");

        let mut reader = CsvReader::from_path(location, self.options.clone())?;
        let table = reader.read_table()?;

        debug!(source = %source.reference(), rows = table.row_count(), "loaded raw source");
        Ok(table)
    }

    fn load_with_roles(&self, source: &SourceVariant, roles: &ColumnRoles) -> Result<Table> {
        let table = self.load(source)?;
        apply_roles(table, roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use trainset_core::{DataType, Value};

    fn write_csv(contents: &str) -> NamedTempFile {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_with_timestamp_role() {
        let file = write_csv("user,amount,ts\nC1,10,2022-01-01T00:00:00Z\nC2,5,2022-01-02\n");
        let source = SourceVariant::raw("transactions", "v1", file.path());
        let roles = ColumnRoles::new("user", "amount").with_timestamp("ts");

        let table = CsvSourceLoader::default().load_with_roles(&source, &roles).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_by_name("ts").unwrap().data_type(), &DataType::Timestamp);
        assert_eq!(table.column_by_name("amount").unwrap().get(0).unwrap(), &Value::Int(10));
    }

    #[test]
    fn test_missing_entity_column() {
        let file = write_csv("customer,amount\nC1,10\n");
        let source = SourceVariant::raw("transactions", "v1", file.path());
        let roles = ColumnRoles::new("user", "amount");

        match CsvSourceLoader::default().load_with_roles(&source, &roles) {
            Err(Error::ColumnNotFound(c)) => assert_eq!(c, "user"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_timestamp_is_parse_error() {
        let file = write_csv("user,amount,ts\nC1,10,not-a-date\n");
        let source = SourceVariant::raw("transactions", "v1", file.path());
        let roles = ColumnRoles::new("user", "amount").with_timestamp("ts");

        let result = CsvSourceLoader::default().load_with_roles(&source, &roles);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_transformation_source_rejected() {
        let source = SourceVariant::transformation("avg", "v1", Vec::new(), "avg");
        let result = CsvSourceLoader::default().load(&source);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = SourceVariant::raw("transactions", "v1", "/nonexistent/transactions.csv");
        let result = CsvSourceLoader::default().load(&source);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
