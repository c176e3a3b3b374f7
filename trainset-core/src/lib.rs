//! Core data model for point-in-time training set assembly
//!
//! This crate provides the foundational types the other crates build upon:
//! the error taxonomy, scalar values, columns and tables, training rows,
//! catalog records with their read accessors, and the source loading trait.

#![warn(missing_docs)]

pub mod catalog;
pub mod column;
pub mod error;
pub mod row;
pub mod schema;
pub mod source;
pub mod table;
pub mod value;

// Re-export key types for convenience
pub use catalog::{
    ColumnRoles, FeatureVariant, LabelVariant, MemoryCatalog, MetadataCatalog, SourceDefinition,
    SourceVariant, TrainingSetVariant, VariantRef,
};
pub use column::Column;
pub use error::{Error, Result};
pub use row::{BatchRow, Row};
pub use schema::{DataType, Field, Schema};
pub use source::SourceLoader;
pub use table::Table;
pub use value::Value;
