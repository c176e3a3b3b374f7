//! Grouping consecutive rows into batches

use trainset_core::{BatchRow, Error, Result, Row};

use crate::stream::RowStream;

/// Groups up to `size` consecutive rows; the last batch may be partial.
///
/// If the inner stream fails partway through a batch, the error is returned
/// and the rows already gathered for that batch are discarded. A caller that
/// keeps pulling after the error resumes with the next row of the inner stream.
#[derive(Debug)]
pub struct Batch<S> {
    inner: S,
    size: usize,
}

impl<S: RowStream<Item = Row>> Batch<S> {
    /// Wrap `inner`; `size` must be at least one
    pub fn new(inner: S, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::empty_input("batch size must be at least 1"));
        }
        Ok(Self { inner, size })
    }

    /// Maximum rows per batch
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<S: RowStream<Item = Row>> RowStream for Batch<S> {
    type Item = BatchRow;

    fn next_item(&mut self) -> Result<Option<BatchRow>> {
        let mut batch = BatchRow::new();

        while batch.len() < self.size {
            match self.inner.next_item()? {
                Some(row) => batch.push(row),
                None => break,
            }
        }

        Ok((!batch.is_empty()).then_some(batch))
    }

    fn restart(&mut self) -> Result<()> {
        self.inner.restart()
    }
}
