//! Metadata catalog stored in a single SQLite database
//!
//! All statements run under one lock per catalog instance. Writes are
//! individual autocommit statements; there are no explicit transactions.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row as SqlRow};
use tracing::{debug, info};
use trainset_core::{
    ColumnRoles, FeatureVariant, LabelVariant, MetadataCatalog, SourceDefinition, SourceVariant,
    TrainingSetVariant, VariantRef,
};

use crate::error::{Error, Result};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS source_variant(
    name      TEXT NOT NULL,
    variant   TEXT NOT NULL,
    kind      TEXT NOT NULL,
    location  TEXT,
    inputs    TEXT,
    logic     TEXT,
    PRIMARY KEY(name, variant)
);
CREATE TABLE IF NOT EXISTS feature_variant(
    name             TEXT NOT NULL,
    variant          TEXT NOT NULL,
    source_name      TEXT NOT NULL,
    source_variant   TEXT NOT NULL,
    entity_column    TEXT NOT NULL,
    value_column     TEXT NOT NULL,
    timestamp_column TEXT,
    PRIMARY KEY(name, variant)
);
CREATE TABLE IF NOT EXISTS labels_variant(
    name             TEXT NOT NULL,
    variant          TEXT NOT NULL,
    source_name      TEXT NOT NULL,
    source_variant   TEXT NOT NULL,
    entity_column    TEXT NOT NULL,
    value_column     TEXT NOT NULL,
    timestamp_column TEXT,
    PRIMARY KEY(name, variant)
);
CREATE TABLE IF NOT EXISTS training_set_variant(
    name          TEXT NOT NULL,
    variant       TEXT NOT NULL,
    label_name    TEXT NOT NULL,
    label_variant TEXT NOT NULL,
    PRIMARY KEY(name, variant)
);
CREATE TABLE IF NOT EXISTS training_set_features(
    training_set_name    TEXT NOT NULL,
    training_set_variant TEXT NOT NULL,
    position             INTEGER NOT NULL,
    feature_name         TEXT NOT NULL,
    feature_variant      TEXT NOT NULL,
    PRIMARY KEY(training_set_name, training_set_variant, position)
);
";

const RAW: &str = "raw";
const TRANSFORMATION: &str = "transformation";

/// A [`MetadataCatalog`] persisted in SQLite
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open (or create) the catalog database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(trainset_core::Error::from)?;
        }

        let catalog = Self::from_connection(Connection::open(path)?)?;
        info!(path = %path.display(), "opened metadata catalog");
        Ok(catalog)
    }

    /// A catalog that lives only as long as this instance
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::Poisoned)
    }

    /// Register a source variant, replacing an existing one with the same identity
    pub fn insert_source(&self, source: &SourceVariant) -> Result<()> {
        let (kind, location, inputs, logic) = match &source.definition {
            SourceDefinition::Raw { location } => (RAW, Some(location.to_string_lossy().into_owned()), None, None),
            SourceDefinition::Transformation { inputs, logic } => {
                let pairs: Vec<[&str; 2]> = inputs
                    .iter()
                    .map(|i| [i.name.as_str(), i.variant.as_str()])
                    .collect();
                (
                    TRANSFORMATION,
                    None,
                    Some(serde_json::to_string(&pairs)?),
                    Some(logic.clone()),
                )
            }
        };

        self.lock()?.execute(
            "INSERT OR REPLACE INTO source_variant(name, variant, kind, location, inputs, logic)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![source.name, source.variant, kind, location, inputs, logic],
        )?;
        debug!(source = %source.reference(), kind, "registered source");
        Ok(())
    }

    /// Register a feature variant
    pub fn insert_feature(&self, feature: &FeatureVariant) -> Result<()> {
        self.insert_roles("feature_variant", &feature.name, &feature.variant, &feature.source, &feature.columns)?;
        debug!(feature = %feature.reference(), "registered feature");
        Ok(())
    }

    /// Register a label variant
    pub fn insert_label(&self, label: &LabelVariant) -> Result<()> {
        self.insert_roles("labels_variant", &label.name, &label.variant, &label.source, &label.columns)?;
        debug!(label = %label.reference(), "registered label");
        Ok(())
    }

    fn insert_roles(
        &self,
        table: &str,
        name: &str,
        variant: &str,
        source: &VariantRef,
        roles: &ColumnRoles,
    ) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO {table}(name, variant, source_name, source_variant,
                entity_column, value_column, timestamp_column)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        );
        self.lock()?.execute(
            &sql,
            params![
                name,
                variant,
                source.name,
                source.variant,
                roles.entity,
                roles.value,
                roles.timestamp
            ],
        )?;
        Ok(())
    }

    /// Register a training set and its ordered features
    pub fn insert_training_set(&self, training_set: &TrainingSetVariant) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO training_set_variant(name, variant, label_name, label_variant)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                training_set.name,
                training_set.variant,
                training_set.label.name,
                training_set.label.variant
            ],
        )?;
        conn.execute(
            "DELETE FROM training_set_features WHERE training_set_name = ?1 AND training_set_variant = ?2",
            params![training_set.name, training_set.variant],
        )?;

        for (position, feature) in training_set.features.iter().enumerate() {
            let position = i64::try_from(position).map_err(|_| {
                trainset_core::Error::InvalidArgument("too many features in training set".into())
            })?;
            conn.execute(
                "INSERT INTO training_set_features(training_set_name, training_set_variant, position,
                    feature_name, feature_variant)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![training_set.name, training_set.variant, position, feature.name, feature.variant],
            )?;
        }

        debug!(
            training_set = %training_set.reference(),
            features = training_set.features.len(),
            "registered training set"
        );
        Ok(())
    }

    fn query_one<T>(
        &self,
        kind: &'static str,
        sql: &str,
        name: &str,
        variant: &str,
        map: impl FnOnce(&SqlRow<'_>) -> rusqlite::Result<T>,
    ) -> Result<T> {
        self.lock()?
            .query_row(sql, params![name, variant], map)
            .optional()?
            .ok_or_else(|| trainset_core::Error::not_found(kind, VariantRef::new(name, variant)).into())
    }

    fn roles_from_row(row: &SqlRow<'_>) -> rusqlite::Result<(VariantRef, ColumnRoles)> {
        let source = VariantRef::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?);
        let entity: String = row.get(2)?;
        let value: String = row.get(3)?;
        let timestamp: Option<String> = row.get(4)?;

        let mut roles = ColumnRoles::new(&entity, &value);
        if let Some(ts) = timestamp.filter(|ts| !ts.is_empty()) {
            roles = roles.with_timestamp(&ts);
        }
        Ok((source, roles))
    }

    fn source(&self, name: &str, variant: &str) -> Result<SourceVariant> {
        let (kind, location, inputs, logic) = self.query_one(
            "source",
            "SELECT kind, location, inputs, logic FROM source_variant WHERE name = ?1 AND variant = ?2",
            name,
            variant,
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )?;

        if kind == TRANSFORMATION {
            let pairs: Vec<(String, String)> = serde_json::from_str(inputs.as_deref().unwrap_or("[]"))?;
            let inputs = pairs.into_iter().map(VariantRef::from).collect();
            Ok(SourceVariant::transformation(name, variant, inputs, logic.as_deref().unwrap_or_default()))
        } else {
            Ok(SourceVariant::raw(name, variant, location.unwrap_or_default()))
        }
    }

    fn feature(&self, name: &str, variant: &str) -> Result<FeatureVariant> {
        let (source, roles) = self.query_one(
            "feature",
            "SELECT source_name, source_variant, entity_column, value_column, timestamp_column
             FROM feature_variant WHERE name = ?1 AND variant = ?2",
            name,
            variant,
            Self::roles_from_row,
        )?;
        Ok(FeatureVariant::new(name, variant, source, roles))
    }

    fn label(&self, name: &str, variant: &str) -> Result<LabelVariant> {
        let (source, roles) = self.query_one(
            "label",
            "SELECT source_name, source_variant, entity_column, value_column, timestamp_column
             FROM labels_variant WHERE name = ?1 AND variant = ?2",
            name,
            variant,
            Self::roles_from_row,
        )?;
        Ok(LabelVariant::new(name, variant, source, roles))
    }

    fn training_set(&self, name: &str, variant: &str) -> Result<TrainingSetVariant> {
        let label = self.query_one(
            "training set",
            "SELECT label_name, label_variant FROM training_set_variant WHERE name = ?1 AND variant = ?2",
            name,
            variant,
            |row| Ok(VariantRef::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )?;

        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT feature_name, feature_variant FROM training_set_features
             WHERE training_set_name = ?1 AND training_set_variant = ?2
             ORDER BY position",
        )?;
        let features = stmt
            .query_map(params![name, variant], |row| {
                Ok(VariantRef::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(TrainingSetVariant {
            name: name.to_string(),
            variant: variant.to_string(),
            label,
            features,
        })
    }
}

impl MetadataCatalog for SqliteCatalog {
    fn get_feature_variant(&self, name: &str, variant: &str) -> trainset_core::Result<FeatureVariant> {
        Ok(self.feature(name, variant)?)
    }

    fn get_label_variant(&self, name: &str, variant: &str) -> trainset_core::Result<LabelVariant> {
        Ok(self.label(name, variant)?)
    }

    fn get_source_variant(&self, name: &str, variant: &str) -> trainset_core::Result<SourceVariant> {
        Ok(self.source(name, variant)?)
    }

    fn get_training_set_variant(&self, name: &str, variant: &str) -> trainset_core::Result<TrainingSetVariant> {
        Ok(self.training_set(name, variant)?)
    }
}
