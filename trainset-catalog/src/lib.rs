//! Persistent metadata catalog
//!
//! [`SqliteCatalog`] stores source, feature, label and training set
//! definitions and serves them through [`trainset_core::MetadataCatalog`].

mod error;
pub mod sqlite;

pub use error::{Error, Result};
pub use sqlite::SqliteCatalog;
