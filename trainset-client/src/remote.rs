//! Hosted client: training data and feature values from a serving endpoint

use std::sync::Arc;

use tracing::{debug, info};
use trainset_core::{Error, Result, Row, Value, VariantRef};
use trainset_stream::{BoxedRowStream, Dataset, RowStream};

use crate::transport::{RowCursor, ServingTransport};
use crate::wire::{EntityValue, FeatureServeRequest, ResourceId, TrainingDataRequest};

/// Base stream over a live training data response.
///
/// Restarting reissues the original request; whether the new response
/// repeats the old one is up to the endpoint.
pub struct RemoteStream {
    transport: Arc<dyn ServingTransport>,
    request: TrainingDataRequest,
    cursor: Box<dyn RowCursor>,
}

impl RemoteStream {
    /// Issue a training data request for `reference`
    pub fn open(transport: Arc<dyn ServingTransport>, reference: &VariantRef) -> Result<Self> {
        let request = TrainingDataRequest {
            id: ResourceId::from(reference),
        };
        let cursor = transport.training_data(&request)?;
        Ok(Self {
            transport,
            request,
            cursor,
        })
    }
}

impl RowStream for RemoteStream {
    type Item = Row;

    fn next_item(&mut self) -> Result<Option<Row>> {
        Ok(self.cursor.next_row()?.map(Row::from))
    }

    fn restart(&mut self) -> Result<()> {
        debug!(name = %self.request.id.name, version = %self.request.id.version, "reissuing training data request");
        self.cursor = self.transport.training_data(&self.request)?;
        Ok(())
    }
}

/// Client for a hosted serving endpoint
#[derive(Clone)]
pub struct HostedClient {
    transport: Arc<dyn ServingTransport>,
}

impl HostedClient {
    /// A client over an existing transport
    pub fn new(transport: Arc<dyn ServingTransport>) -> Self {
        Self { transport }
    }

    /// Connect over HTTP
    #[cfg(feature = "http")]
    pub fn connect(host: &str, insecure: bool, cert_path: Option<&std::path::Path>) -> Result<Self> {
        let transport = crate::transport::HttpTransport::new(host, insecure, cert_path)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Stream the rows of a training set
    pub fn training_set(&self, name: &str, variant: &str) -> Result<Dataset<BoxedRowStream>> {
        let reference = VariantRef::new(name, variant);
        info!(training_set = %reference, "streaming training set");
        let stream: BoxedRowStream = Box::new(RemoteStream::open(Arc::clone(&self.transport), &reference)?);
        Ok(Dataset::new(stream))
    }

    /// Current values of `features` for one entity, in request order
    pub fn features(&self, features: &[VariantRef], entity_name: &str, entity_value: &Value) -> Result<Vec<Value>> {
        if features.is_empty() {
            return Err(Error::empty_input("no features requested"));
        }
        let key = entity_value
            .entity_key()
            .ok_or_else(|| Error::JoinMismatch(format!("{entity_name} is null")))?;

        let request = FeatureServeRequest {
            entities: vec![EntityValue {
                name: entity_name.to_string(),
                value: key,
            }],
            features: features.iter().map(ResourceId::from).collect(),
        };

        let response = self.transport.feature_serve(&request)?;
        if response.values.len() != features.len() {
            return Err(Error::Transport(format!(
                "expected {} feature values, received {}",
                features.len(),
                response.values.len()
            )));
        }
        Ok(response.values.into_iter().map(Value::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mockall::predicate::eq;

    use crate::transport::{MockServingTransport, VecCursor};
    use crate::wire::{FeatureServeResponse, WireRow, WireValue};

    fn wire_rows(n: i64) -> Vec<WireRow> {
        (0..n)
            .map(|i| WireRow {
                features: vec![WireValue::IntValue(i)],
                label: WireValue::BoolValue(i % 2 == 0),
            })
            .collect()
    }

    fn feature_ids(rows: &[Row]) -> Vec<Value> {
        rows.iter().map(|r| r.features()[0].clone()).collect()
    }

    #[test]
    fn test_training_set_streams_rows() {
        let mut transport = MockServingTransport::new();
        transport
            .expect_training_data()
            .with(eq(TrainingDataRequest {
                id: ResourceId {
                    name: "fraud_training".into(),
                    version: "v1".into(),
                },
            }))
            .times(1)
            .returning(|_| Ok(Box::new(VecCursor::new(wire_rows(3)))));

        let client = HostedClient::new(Arc::new(transport));
        let rows: Vec<Row> = client
            .training_set("fraud_training", "v1")
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(feature_ids(&rows), vec![Value::Int(0), Value::Int(1), Value::Int(2)]);
        assert_eq!(rows[1].label(), &Value::Bool(false));
    }

    #[test]
    fn test_repeat_reissues_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut transport = MockServingTransport::new();
        transport.expect_training_data().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(VecCursor::new(wire_rows(2))))
        });

        let client = HostedClient::new(Arc::new(transport));
        let dataset = client.training_set("fraud_training", "v1").unwrap().repeat(2).unwrap();
        let rows: Vec<Row> = dataset.collect::<Result<_>>().unwrap();

        assert_eq!(rows.len(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_open_failure_propagates() {
        let mut transport = MockServingTransport::new();
        transport
            .expect_training_data()
            .returning(|_| Err(Error::Transport("unavailable".into())));

        let client = HostedClient::new(Arc::new(transport));
        assert!(matches!(client.training_set("t", "v1"), Err(Error::Transport(_))));
    }

    #[test]
    fn test_features_builds_request_and_reads_values() {
        let mut transport = MockServingTransport::new();
        transport
            .expect_feature_serve()
            .withf(|request| {
                request.entities
                    == vec![EntityValue {
                        name: "user".into(),
                        value: "42".into(),
                    }]
                    && request.features.len() == 2
                    && request.features[1].name == "country"
            })
            .returning(|_| {
                Ok(FeatureServeResponse {
                    values: vec![WireValue::DoubleValue(3.5), WireValue::StrValue("NZ".into())],
                })
            });

        let client = HostedClient::new(Arc::new(transport));
        let values = client
            .features(
                &[VariantRef::new("avg_spend", "v1"), VariantRef::new("country", "v1")],
                "user",
                &Value::Int(42),
            )
            .unwrap();

        assert_eq!(values, vec![Value::Float(3.5), Value::from("NZ")]);
    }

    #[test]
    fn test_short_response_is_a_transport_error() {
        let mut transport = MockServingTransport::new();
        transport
            .expect_feature_serve()
            .returning(|_| Ok(FeatureServeResponse { values: Vec::new() }));

        let client = HostedClient::new(Arc::new(transport));
        let result = client.features(&[VariantRef::new("a", "v1")], "user", &Value::from("u1"));
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[test]
    fn test_empty_feature_list_rejected() {
        let client = HostedClient::new(Arc::new(MockServingTransport::new()));
        let result = client.features(&[], "user", &Value::Int(1));
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }
}
