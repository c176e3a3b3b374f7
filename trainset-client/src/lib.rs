//! Training set retrieval and feature serving
//!
//! [`Client`] is the entry point. In local mode it reads definitions from
//! a SQLite metadata catalog, assembles training sets in process with a
//! point-in-time join, and serves features from the same sources. In
//! hosted mode it talks to a serving endpoint over a [`ServingTransport`].
//!
//! ```ignore
//! let config = ClientConfig::from_env()?;
//! let client = Client::from_config(&config, TransformationRegistry::new())?;
//! for batch in client.training_set("fraud_training", "v1")?.repeat(1)?.batch(32)? {
//!     let batch = batch?;
//! }
//! ```

mod error;

pub mod client;
pub mod config;
pub mod local;
pub mod logging;
pub mod remote;
pub mod transport;
pub mod wire;

pub use client::Client;
pub use config::{ClientConfig, ClientMode};
pub use error::{Error, Result};
pub use local::LocalClient;
pub use remote::{HostedClient, RemoteStream};
pub use transport::{RowCursor, ServingTransport, VecCursor};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

pub use trainset_stream::{BatchRow, Dataset, Row};
pub use trainset_transforms::{TransformOutput, TransformationRegistry};
