//! Point-in-time correct training set assembly
//!
//! [`PointInTimeJoinEngine::assemble`] aligns feature values to label
//! observations without leaking values from the future.
//! [`PointInTimeJoinEngine::serve_features`] answers the online question:
//! the latest value of each feature for one entity.

mod prepared;

pub mod engine;
pub mod lookup;

#[cfg(test)]
mod fixtures;

pub use engine::{PointInTimeJoinEngine, LABEL_COLUMN};
