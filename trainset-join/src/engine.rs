//! Point-in-time join of a label table against ordered feature tables
//!
//! The label table defines the output rows. Each feature is joined onto the
//! growing result in declared order:
//! - timestamped features use an as-of backward join keyed by entity, so a
//!   label observed at time `T` only ever sees feature values stamped `<= T`;
//! - untimed features use the last value per entity.
//!
//! Joins are left joins. Label rows are never dropped; a missing feature
//! value becomes null.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span};
use trainset_core::{Column, Error, FeatureVariant, LabelVariant, Result, Table};
use trainset_transforms::TransformationResolver;

use crate::prepared::Prepared;

/// Name of the label column in assembled tables
pub const LABEL_COLUMN: &str = "label";

/// Label rows that drive the join
struct LabelFrame {
    keys: Vec<Option<String>>,
    times: Option<Vec<DateTime<Utc>>>,
    values: Column,
}

/// Builds training tables from a label and an ordered list of features
pub struct PointInTimeJoinEngine<'a> {
    resolver: TransformationResolver<'a>,
}

impl<'a> PointInTimeJoinEngine<'a> {
    /// Create an engine that resolves sources through `resolver`
    pub fn new(resolver: TransformationResolver<'a>) -> Self {
        Self { resolver }
    }

    /// The resolver used for sources
    pub fn resolver(&self) -> &TransformationResolver<'a> {
        &self.resolver
    }

    /// Assemble a training set registered in the catalog
    pub fn assemble_training_set(&self, name: &str, variant: &str) -> Result<Table> {
        let catalog = self.resolver.catalog();
        let training_set = catalog.get_training_set_variant(name, variant)?;
        let label = catalog.get_label_variant(&training_set.label.name, &training_set.label.variant)?;

        let features = catalog
            .get_training_set_features(name, variant)?
            .iter()
            .map(|f| catalog.get_feature_variant(&f.name, &f.variant))
            .collect::<Result<Vec<_>>>()?;

        self.assemble(&label, &features)
    }

    /// Join `features`, in order, onto the rows of `label`.
    ///
    /// The result holds one column per feature named `<name>.<variant>`
    /// followed by the `label` column.
    pub fn assemble(&self, label: &LabelVariant, features: &[FeatureVariant]) -> Result<Table> {
        let _span = info_span!("assemble", label = %label.reference(), features = features.len()).entered();

        let frame = self.label_frame(label)?;
        let mut columns = Vec::with_capacity(features.len() + 1);

        for feature in features {
            let prepared = Prepared::resolve(
                &self.resolver,
                &feature.source,
                &feature.columns,
                &feature.column_name(),
            )?;

            let indices = if prepared.times.is_some() {
                as_of_indices(&frame, &prepared)
            } else {
                latest_indices(&frame, &prepared)
            };

            let column = prepared.values.take(&indices)?;
            debug!(
                feature = %feature.reference(),
                nulls = column.null_count(),
                "joined feature"
            );
            columns.push(column);
        }

        columns.push(frame.values);
        let table = Table::new(columns)?;

        info!(rows = table.row_count(), columns = table.column_count(), "assembled training set");
        Ok(table)
    }

    /// Resolve the label, sort by time and drop repeated `(entity, time)` events
    fn label_frame(&self, label: &LabelVariant) -> Result<LabelFrame> {
        let prepared = Prepared::resolve(&self.resolver, &label.source, &label.columns, LABEL_COLUMN)?;

        if prepared.keys.is_empty() {
            return Err(Error::empty_input(format!("label {} has no rows", label.reference())));
        }

        let rows = match &prepared.times {
            Some(times) => {
                // Walk backwards so the last occurrence of each event wins
                let mut seen = HashSet::new();
                let mut kept: Vec<usize> = prepared
                    .time_order()
                    .into_iter()
                    .rev()
                    .filter(|&i| seen.insert((prepared.keys[i].clone(), times[i])))
                    .collect();
                kept.reverse();
                kept
            }
            None => (0..prepared.len()).collect(),
        };

        if rows.len() < prepared.len() {
            debug!(dropped = prepared.len() - rows.len(), "dropped duplicate label events");
        }

        let indices: Vec<Option<usize>> = rows.iter().copied().map(Some).collect();

        Ok(LabelFrame {
            keys: rows.iter().map(|&i| prepared.keys[i].clone()).collect(),
            times: prepared
                .times
                .as_ref()
                .map(|times| rows.iter().map(|&i| times[i]).collect()),
            values: prepared.values.take(&indices)?,
        })
    }
}

/// For each label row, the feature row with the greatest time `<=` the label time
fn as_of_indices(frame: &LabelFrame, feature: &Prepared) -> Vec<Option<usize>> {
    let timelines = feature.timeline_by_entity();

    let Some(label_times) = &frame.times else {
        // Untimed labels have no observation time to bound the lookup
        return latest_indices(frame, feature);
    };

    frame
        .keys
        .iter()
        .zip(label_times)
        .map(|(key, label_time)| {
            let timeline = timelines.get(key.as_deref()?)?;
            let upto = timeline.partition_point(|(t, _)| t <= label_time);
            upto.checked_sub(1).map(|last| timeline[last].1)
        })
        .collect()
}

/// For each label row, the latest feature row for its entity
fn latest_indices(frame: &LabelFrame, feature: &Prepared) -> Vec<Option<usize>> {
    let latest = feature.latest_by_entity();

    frame
        .keys
        .iter()
        .map(|key| latest.get(key.as_deref()?).copied())
        .collect()
}
