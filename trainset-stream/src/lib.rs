//! Restartable row streams for training loops
//!
//! A [`Dataset`] wraps a base stream (materialized rows or a remote
//! cursor) and composes [`Repeat`], [`Shuffle`] and [`Batch`] stages on
//! top of it. Every stage supports `next_item` and `restart`; restart
//! propagates down to the base stream.

pub mod batch;
pub mod dataset;
pub mod repeat;
pub mod shuffle;
pub mod stream;

pub use batch::Batch;
pub use dataset::{BatchedDataset, Dataset};
pub use repeat::Repeat;
pub use shuffle::Shuffle;
pub use stream::{BoxedRowStream, MemoryStream, RowStream};

pub use trainset_core::{BatchRow, Row};
