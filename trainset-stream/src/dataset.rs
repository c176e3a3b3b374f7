//! Builder that composes stream stages
//!
//! Each stage takes ownership of the stream it wraps, so a pipeline is a
//! chain of owned stages:
//!
//! ```ignore
//! let batches = Dataset::from_table(&table)?.repeat(2)?.shuffle(64)?.batch(32)?;
//! for batch in batches {
//!     let batch = batch?;
//! }
//! ```

use trainset_core::{BatchRow, Result, Row, Table};

use crate::batch::Batch;
use crate::repeat::Repeat;
use crate::shuffle::Shuffle;
use crate::stream::{MemoryStream, RowStream};

/// A consumable pipeline over a stream
pub struct Dataset<S> {
    stream: S,
}

impl Dataset<MemoryStream> {
    /// A dataset over the rows of an assembled table
    pub fn from_table(table: &Table) -> Result<Self> {
        Ok(Self::new(MemoryStream::from_table(table)?))
    }

    /// A dataset over materialized rows
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(MemoryStream::new(rows))
    }
}

impl<S: RowStream> Dataset<S> {
    /// Wrap an existing stream
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Replay the stream `times` extra passes
    pub fn repeat(self, times: usize) -> Result<Dataset<Repeat<S>>> {
        Ok(Dataset::new(Repeat::new(self.stream, times)?))
    }

    /// Shuffle within a window of `buffer_size` items
    pub fn shuffle(self, buffer_size: usize) -> Result<Dataset<Shuffle<S>>> {
        Ok(Dataset::new(Shuffle::new(self.stream, buffer_size)?))
    }

    /// Shuffle within a window, in an order fixed by `seed`
    pub fn shuffle_seeded(self, buffer_size: usize, seed: u64) -> Result<Dataset<Shuffle<S>>> {
        Ok(Dataset::new(Shuffle::seeded(self.stream, buffer_size, seed)?))
    }

    /// Rewind the whole pipeline
    pub fn restart(&mut self) -> Result<()> {
        self.stream.restart()
    }

    /// Pull the next item
    pub fn next_item(&mut self) -> Result<Option<S::Item>> {
        self.stream.next_item()
    }

    /// Borrow the outermost stage
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Unwrap the outermost stage
    pub fn into_stream(self) -> S {
        self.stream
    }
}

impl<S: RowStream<Item = Row>> Dataset<S> {
    /// Group rows into batches of up to `size`
    pub fn batch(self, size: usize) -> Result<Dataset<Batch<S>>> {
        Ok(Dataset::new(Batch::new(self.stream, size)?))
    }
}

impl<S: RowStream> Iterator for Dataset<S> {
    type Item = Result<S::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.next_item().transpose()
    }
}

/// Shorthand for a batched dataset
pub type BatchedDataset<S> = Dataset<Batch<S>>;

impl<S: RowStream<Item = Row>> BatchedDataset<S> {
    /// Collect all remaining batches
    pub fn collect_batches(&mut self) -> Result<Vec<BatchRow>> {
        self.by_ref().collect()
    }
}
