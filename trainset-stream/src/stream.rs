//! The stream capability and the in-memory base stream

use std::sync::Arc;

use trainset_core::{Result, Row, Table};

/// A restartable, pull-based cursor.
///
/// `next_item` returns `Ok(None)` once the stream is exhausted and keeps
/// returning it until `restart` rewinds the stream. Errors from an inner
/// stream are returned unchanged.
pub trait RowStream {
    /// What the stream yields
    type Item;

    /// Pull the next item, or `None` at end of sequence
    fn next_item(&mut self) -> Result<Option<Self::Item>>;

    /// Rewind to the beginning of the sequence
    fn restart(&mut self) -> Result<()>;
}

impl<S: RowStream + ?Sized> RowStream for Box<S> {
    type Item = S::Item;

    fn next_item(&mut self) -> Result<Option<Self::Item>> {
        (**self).next_item()
    }

    fn restart(&mut self) -> Result<()> {
        (**self).restart()
    }
}

/// A type-erased row stream, as returned by clients
pub type BoxedRowStream = Box<dyn RowStream<Item = Row> + Send>;

/// Base stream over fully materialized rows
#[derive(Debug, Clone)]
pub struct MemoryStream {
    rows: Arc<Vec<Row>>,
    position: usize,
}

impl MemoryStream {
    /// Create a stream over `rows`
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: Arc::new(rows),
            position: 0,
        }
    }

    /// Create a stream over the rows of an assembled table
    pub fn from_table(table: &Table) -> Result<Self> {
        Ok(Self::new(table.rows()?))
    }

    /// Total number of rows in one pass
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the stream has no rows at all
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowStream for MemoryStream {
    type Item = Row;

    fn next_item(&mut self) -> Result<Option<Row>> {
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    fn restart(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use trainset_core::{Error, Value};

    /// Rows `[i, i * 10]` for `i` in `0..n`
    pub fn numbered_rows(n: i64) -> Vec<Row> {
        (0..n)
            .map(|i| Row::from_parts(vec![Value::Int(i)], Value::Int(i * 10)))
            .collect()
    }

    pub fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter()
            .map(|r| match r.features()[0] {
                Value::Int(i) => i,
                _ => panic!("expected integer id"),
            })
            .collect()
    }

    /// Yields `ok` rows then fails on every pull
    pub struct FailingStream {
        pub ok: usize,
        pub pulled: usize,
    }

    impl RowStream for FailingStream {
        type Item = Row;

        fn next_item(&mut self) -> Result<Option<Row>> {
            self.pulled += 1;
            if self.pulled > self.ok {
                return Err(Error::Transport("connection reset".into()));
            }
            Ok(Some(Row::from_parts(vec![Value::Int(0)], Value::Int(0))))
        }

        fn restart(&mut self) -> Result<()> {
            self.pulled = 0;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use trainset_core::Value;

    fn drain<S: RowStream>(stream: &mut S) -> Vec<S::Item> {
        let mut items = Vec::new();
        while let Some(item) = stream.next_item().unwrap() {
            items.push(item);
        }
        items
    }

    #[test]
    fn test_memory_stream_exhausts_and_restarts() {
        let mut stream = MemoryStream::new(numbered_rows(3));

        assert_eq!(ids(&drain(&mut stream)), vec![0, 1, 2]);
        assert!(stream.next_item().unwrap().is_none());
        assert!(stream.next_item().unwrap().is_none());

        stream.restart().unwrap();
        assert_eq!(ids(&drain(&mut stream)), vec![0, 1, 2]);
    }

    #[test]
    fn test_from_table_splits_features_and_label() {
        let table = Table::from_rows(
            &["a.v1", "b.v1", "label"],
            vec![vec![Value::Int(1), Value::from("x"), Value::Bool(true)]],
        )
        .unwrap();

        let mut stream = MemoryStream::from_table(&table).unwrap();
        let row = stream.next_item().unwrap().unwrap();

        assert_eq!(row.features(), &[Value::Int(1), Value::from("x")]);
        assert_eq!(row.label(), &Value::Bool(true));
    }

    #[test]
    fn test_boxed_stream_delegates() {
        let mut stream: BoxedRowStream = Box::new(MemoryStream::new(numbered_rows(2)));
        assert_eq!(drain(&mut stream).len(), 2);
        stream.restart().unwrap();
        assert_eq!(drain(&mut stream).len(), 2);
    }
}
