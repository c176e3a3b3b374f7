//! Transports for the remote serving protocol

use trainset_core::Result;

use crate::wire::{FeatureServeRequest, FeatureServeResponse, TrainingDataRequest, WireRow};

/// A live cursor over the rows of one training data request
pub trait RowCursor: Send {
    /// Next row, or `None` when the response is complete. May block.
    fn next_row(&mut self) -> Result<Option<WireRow>>;
}

/// The two requests of the serving protocol
#[cfg_attr(test, mockall::automock)]
pub trait ServingTransport: Send + Sync {
    /// Current values of features for entities
    fn feature_serve(&self, request: &FeatureServeRequest) -> Result<FeatureServeResponse>;

    /// Open a row stream for a training set
    fn training_data(&self, request: &TrainingDataRequest) -> Result<Box<dyn RowCursor>>;
}

/// A cursor over rows already in memory
#[derive(Debug, Default)]
pub struct VecCursor {
    rows: std::vec::IntoIter<WireRow>,
}

impl VecCursor {
    /// A cursor yielding `rows` in order
    pub fn new(rows: Vec<WireRow>) -> Self {
        Self { rows: rows.into_iter() }
    }
}

impl RowCursor for VecCursor {
    fn next_row(&mut self) -> Result<Option<WireRow>> {
        Ok(self.rows.next())
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use std::fs;
    use std::io::{BufRead, BufReader, Lines};
    use std::path::Path;
    use std::time::Duration;

    use reqwest::blocking::{Client, Response};
    use reqwest::Certificate;
    use tracing::{debug, info};
    use trainset_core::{Error, Result};

    use super::{RowCursor, ServingTransport};
    use crate::wire::{FeatureServeRequest, FeatureServeResponse, TrainingDataRequest, WireRow};

    fn transport_error(err: impl std::fmt::Display) -> Error {
        Error::Transport(err.to_string())
    }

    /// JSON over HTTP: feature serving is a single POST, training data is a
    /// newline-delimited JSON body read incrementally.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
        base_url: String,
    }

    impl HttpTransport {
        /// Connect to `host`; `insecure` selects plain HTTP
        pub fn new(host: &str, insecure: bool, cert_path: Option<&Path>) -> Result<Self> {
            // No overall timeout: a training data response lasts as long as the set
            let mut builder = Client::builder().timeout(None::<Duration>);

            if let Some(path) = cert_path.filter(|_| !insecure) {
                let pem = fs::read(path)?;
                builder = builder.add_root_certificate(Certificate::from_pem(&pem).map_err(transport_error)?);
            }

            let scheme = if insecure { "http" } else { "https" };
            let base_url = format!("{scheme}://{}", host.trim_end_matches('/'));
            info!(%base_url, "connecting to serving endpoint");

            Ok(Self {
                client: builder.build().map_err(transport_error)?,
                base_url,
            })
        }

        fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<Response> {
            let url = format!("{}/{path}", self.base_url);
            debug!(%url, "POST");
            self.client
                .post(&url)
                .json(body)
                .send()
                .and_then(Response::error_for_status)
                .map_err(transport_error)
        }
    }

    impl ServingTransport for HttpTransport {
        fn feature_serve(&self, request: &FeatureServeRequest) -> Result<FeatureServeResponse> {
            self.post("feature_serve", request)?.json().map_err(transport_error)
        }

        fn training_data(&self, request: &TrainingDataRequest) -> Result<Box<dyn RowCursor>> {
            let response = self.post("training_data", request)?;
            Ok(Box::new(NdjsonCursor {
                lines: BufReader::new(response).lines(),
            }))
        }
    }

    struct NdjsonCursor {
        lines: Lines<BufReader<Response>>,
    }

    impl RowCursor for NdjsonCursor {
        fn next_row(&mut self) -> Result<Option<WireRow>> {
            for line in self.lines.by_ref() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                return serde_json::from_str(&line)
                    .map(Some)
                    .map_err(|e| Error::Transport(format!("malformed row: {e}")));
            }
            Ok(None)
        }
    }

}
