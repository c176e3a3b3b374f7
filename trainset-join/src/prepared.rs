//! Projection of resolved sources onto their role columns

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use trainset_core::{Column, ColumnRoles, Result, Value, VariantRef};
use trainset_readers::parse_timestamp_value;
use trainset_transforms::TransformationResolver;

/// A source reduced to `[entity, value, timestamp?]`
#[derive(Debug, Clone)]
pub(crate) struct Prepared {
    /// Canonical entity keys, one per row
    pub keys: Vec<Option<String>>,

    /// Event times, when the source is timestamped
    pub times: Option<Vec<DateTime<Utc>>>,

    /// Value column, renamed for output
    pub values: Column,
}

impl Prepared {
    /// Resolve `source` and project it onto `roles`, naming the value column `output_name`
    pub fn resolve(
        resolver: &TransformationResolver<'_>,
        source: &VariantRef,
        roles: &ColumnRoles,
        output_name: &str,
    ) -> Result<Self> {
        let table = resolver.resolve_with_roles(source, roles)?;

        let keys = table
            .column_by_name(&roles.entity)?
            .values()
            .iter()
            .map(Value::entity_key)
            .collect();

        let times = match &roles.timestamp {
            Some(ts) => Some(
                table
                    .column_by_name(ts)?
                    .values()
                    .iter()
                    .map(parse_timestamp_value)
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };

        let values = table.column_by_name(&roles.value)?.clone().with_name(output_name);

        Ok(Self { keys, times, values })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Row indices ordered by event time; input order when untimed or tied
    pub fn time_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        if let Some(times) = &self.times {
            order.sort_by_key(|&i| times[i]);
        }
        order
    }

    /// Row index of the latest value per entity.
    ///
    /// Timestamped sources keep the row with the greatest event time; ties
    /// and untimed sources keep the last occurrence in input order.
    pub fn latest_by_entity(&self) -> HashMap<&str, usize> {
        let mut latest = HashMap::new();
        for i in self.time_order() {
            if let Some(key) = &self.keys[i] {
                latest.insert(key.as_str(), i);
            }
        }
        latest
    }

    /// Per-entity row indices sorted by event time, for as-of lookups
    pub fn timeline_by_entity(&self) -> HashMap<&str, Vec<(DateTime<Utc>, usize)>> {
        let mut timelines: HashMap<&str, Vec<(DateTime<Utc>, usize)>> = HashMap::new();
        let Some(times) = &self.times else {
            return timelines;
        };

        for i in self.time_order() {
            if let Some(key) = &self.keys[i] {
                timelines.entry(key.as_str()).or_default().push((times[i], i));
            }
        }
        timelines
    }
}
