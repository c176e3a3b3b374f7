//! Transformation registry and recursive source resolution
//!
//! Transformation sources declare their inputs and name their logic by a
//! registry key. [`TransformationResolver`] walks the input chain, loads raw
//! sources through a [`trainset_core::SourceLoader`], and applies the logic
//! found in a [`TransformationRegistry`].

pub mod registry;
pub mod resolver;

pub use registry::{TransformOutput, Transformation, TransformationRegistry, INDEX_COLUMN};
pub use resolver::TransformationResolver;
