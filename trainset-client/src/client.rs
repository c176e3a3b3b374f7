//! The client façade over local and hosted operation

use tracing::info;
use trainset_core::{Value, VariantRef};
use trainset_stream::{BoxedRowStream, Dataset, RowStream, Shuffle};
use trainset_transforms::TransformationRegistry;

use crate::config::{ClientConfig, ClientMode};
use crate::error::{Error, Result};
use crate::local::LocalClient;
use crate::remote::HostedClient;

/// Training data and feature values, locally or from a serving endpoint
pub struct Client {
    inner: Inner,
    shuffle_seed: Option<u64>,
}

enum Inner {
    Local(LocalClient),
    Hosted(HostedClient),
}

impl Client {
    /// A local client; `config` must be in local mode
    pub fn local(config: &ClientConfig, registry: TransformationRegistry) -> Result<Self> {
        config.validate()?;
        let ClientMode::Local { metadata_path } = &config.mode else {
            return Err(Error::Config("configuration is not in local mode".into()));
        };

        info!(path = %metadata_path.display(), "starting local client");
        let local = LocalClient::open(metadata_path, config.csv.clone(), registry)?;
        Ok(Self::from_local(local, config.shuffle_seed))
    }

    /// A hosted client over HTTP; `config` must be in hosted mode
    #[cfg(feature = "http")]
    pub fn hosted(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let ClientMode::Hosted {
            host,
            insecure,
            cert_path,
        } = &config.mode
        else {
            return Err(Error::Config("configuration is not in hosted mode".into()));
        };

        info!(host = %host, insecure, "starting hosted client");
        let hosted = HostedClient::connect(host, *insecure, cert_path.as_deref())?;
        Ok(Self::from_hosted(hosted, config.shuffle_seed))
    }

    /// Build whichever client `config` selects.
    ///
    /// `registry` is only used in local mode.
    #[cfg(feature = "http")]
    pub fn from_config(config: &ClientConfig, registry: TransformationRegistry) -> Result<Self> {
        match config.mode {
            ClientMode::Local { .. } => Self::local(config, registry),
            ClientMode::Hosted { .. } => Self::hosted(config),
        }
    }

    /// Wrap an existing local client
    pub fn from_local(local: LocalClient, shuffle_seed: Option<u64>) -> Self {
        Self {
            inner: Inner::Local(local),
            shuffle_seed,
        }
    }

    /// Wrap an existing hosted client
    pub fn from_hosted(hosted: HostedClient, shuffle_seed: Option<u64>) -> Self {
        Self {
            inner: Inner::Hosted(hosted),
            shuffle_seed,
        }
    }

    /// Whether training sets are assembled in process
    pub fn is_local(&self) -> bool {
        matches!(self.inner, Inner::Local(_))
    }

    /// Rows of a training set
    pub fn training_set(&self, name: &str, variant: &str) -> Result<Dataset<BoxedRowStream>> {
        let dataset = match &self.inner {
            Inner::Local(local) => local.training_set(name, variant)?,
            Inner::Hosted(hosted) => hosted.training_set(name, variant)?,
        };
        Ok(dataset)
    }

    /// Current values of `features` for one entity, in request order
    pub fn features(&self, features: &[VariantRef], entity_name: &str, entity_value: &Value) -> Result<Vec<Value>> {
        let values = match &self.inner {
            Inner::Local(local) => local.features(features, entity_name, entity_value)?,
            Inner::Hosted(hosted) => hosted.features(features, entity_name, entity_value)?,
        };
        Ok(values)
    }

    /// Shuffle `dataset`, reproducibly when a seed is configured
    pub fn shuffle<S: RowStream>(&self, dataset: Dataset<S>, buffer_size: usize) -> Result<Dataset<Shuffle<S>>> {
        let shuffled = match self.shuffle_seed {
            Some(seed) => dataset.shuffle_seeded(buffer_size, seed)?,
            None => dataset.shuffle(buffer_size)?,
        };
        Ok(shuffled)
    }
}
