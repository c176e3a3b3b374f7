//! Point lookups of the latest feature values for a single entity

use tracing::debug;
use trainset_core::{Error, FeatureVariant, Result, Value};

use crate::engine::PointInTimeJoinEngine;
use crate::prepared::Prepared;

impl PointInTimeJoinEngine<'_> {
    /// Latest value of each feature for one entity, in request order.
    ///
    /// `entity_name` names the entity in error messages. Matching uses the
    /// canonical entity key, so `Value::Int(42)` finds rows keyed `"42"`.
    pub fn serve_features(
        &self,
        features: &[FeatureVariant],
        entity_name: &str,
        entity_value: &Value,
    ) -> Result<Vec<Value>> {
        if features.is_empty() {
            return Err(Error::empty_input("no features requested"));
        }

        let key = entity_value
            .entity_key()
            .ok_or_else(|| Error::JoinMismatch(format!("{entity_name} is null")))?;

        features
            .iter()
            .map(|feature| {
                let prepared = Prepared::resolve(
                    self.resolver(),
                    &feature.source,
                    &feature.columns,
                    &feature.column_name(),
                )?;

                let row = prepared.latest_by_entity().get(key.as_str()).copied().ok_or_else(|| {
                    Error::JoinMismatch(format!(
                        "no value of {} for {entity_name} '{key}'",
                        feature.reference()
                    ))
                })?;

                debug!(feature = %feature.reference(), entity = %key, row, "served feature");
                Ok(prepared.values.get(row)?.clone())
            })
            .collect()
    }
}
