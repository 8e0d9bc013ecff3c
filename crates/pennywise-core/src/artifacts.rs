//! Model artifact registry
//!
//! Each trained model is stored as one JSON file in the models directory,
//! wrapped in an envelope carrying a content hash and training metadata.
//! Writes go through a temp file in the same directory and are renamed into
//! place, so a reader never sees a half-written artifact.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::regression::{LinearRegression, RandomForest};

/// The five persisted models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    NextMonth,
    Category,
    Savings,
    AnomalyStats,
    TrendSlopes,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NextMonth => "next_month",
            Self::Category => "category",
            Self::Savings => "savings",
            Self::AnomalyStats => "anomaly_stats",
            Self::TrendSlopes => "trend_slopes",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::NextMonth => "linear_next_month.json",
            Self::Category => "decision_tree_category.json",
            Self::Savings => "decision_tree_saving.json",
            Self::AnomalyStats => "anomaly_stats.json",
            Self::TrendSlopes => "spending_pattern_slopes.json",
        }
    }

    pub fn all() -> &'static [ArtifactKind] {
        &[
            Self::NextMonth,
            Self::Category,
            Self::Savings,
            Self::AnomalyStats,
            Self::TrendSlopes,
        ]
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mean and sample standard deviation of one user's expense amounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub mean: f64,
    pub std: f64,
}

/// Per-user expense statistics for anomaly scoring
pub type AnomalyStats = BTreeMap<i64, UserStats>;

/// Per-user spending trend slope
pub type TrendSlopes = BTreeMap<i64, f64>;

/// A persisted model with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact<M> {
    pub kind: ArtifactKind,
    /// SHA-256 of the serialized model
    pub version: String,
    pub trained_at: DateTime<Utc>,
    /// Number of training rows
    pub rows: usize,
    pub model: M,
}

/// Directory of model artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Atomically replace the artifact for `kind`, returning its version
    pub fn save<M: Serialize>(&self, kind: ArtifactKind, rows: usize, model: &M) -> Result<String> {
        let model_json = serde_json::to_value(model)?;
        let version = hex::encode(Sha256::digest(serde_json::to_vec(&model_json)?));

        let artifact = Artifact {
            kind,
            version: version.clone(),
            trained_at: Utc::now(),
            rows,
            model: model_json,
        };

        fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut tmp, &artifact)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(kind)).map_err(|e| Error::Io(e.error))?;

        Ok(version)
    }

    /// Read the artifact for `kind`. A missing file is `Ok(None)`.
    pub fn load<M: DeserializeOwned>(&self, kind: ArtifactKind) -> Result<Option<Artifact<M>>> {
        let path = self.path_for(kind);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let artifact: Artifact<M> = serde_json::from_slice(&bytes).map_err(|e| {
            Error::Artifact(format!("{} is unreadable: {}", path.display(), e))
        })?;
        if artifact.kind != kind {
            return Err(Error::Artifact(format!(
                "{} holds a {} model, expected {}",
                path.display(),
                artifact.kind,
                kind
            )));
        }

        Ok(Some(artifact))
    }

    /// Version of the current artifact, if any
    pub fn version(&self, kind: ArtifactKind) -> Result<Option<String>> {
        Ok(self
            .load::<serde_json::Value>(kind)?
            .map(|artifact| artifact.version))
    }
}

/// Every model as read at one instant
///
/// A request loads one snapshot and uses it throughout, so a retrain that
/// lands mid-request cannot mix model versions within a response.
#[derive(Debug, Clone, Default)]
pub struct ModelSnapshot {
    pub next_month: Option<Artifact<LinearRegression>>,
    pub category: Option<Artifact<RandomForest>>,
    pub savings: Option<Artifact<RandomForest>>,
    pub anomaly_stats: Option<Artifact<AnomalyStats>>,
    pub trend_slopes: Option<Artifact<TrendSlopes>>,
}

impl ModelSnapshot {
    /// Load every artifact. Unreadable artifacts are logged and treated as absent.
    pub fn load(store: &ArtifactStore) -> Self {
        Self {
            next_month: load_or_none(store, ArtifactKind::NextMonth),
            category: load_or_none(store, ArtifactKind::Category),
            savings: load_or_none(store, ArtifactKind::Savings),
            anomaly_stats: load_or_none(store, ArtifactKind::AnomalyStats),
            trend_slopes: load_or_none(store, ArtifactKind::TrendSlopes),
        }
    }

    /// Snapshot with no models (for testing)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn next_month_model(&self) -> Option<&LinearRegression> {
        self.next_month.as_ref().map(|a| &a.model)
    }

    pub fn category_model(&self) -> Option<&RandomForest> {
        self.category.as_ref().map(|a| &a.model)
    }

    pub fn savings_model(&self) -> Option<&RandomForest> {
        self.savings.as_ref().map(|a| &a.model)
    }

    pub fn anomaly_stats(&self) -> Option<&AnomalyStats> {
        self.anomaly_stats.as_ref().map(|a| &a.model)
    }

    pub fn trend_slopes(&self) -> Option<&TrendSlopes> {
        self.trend_slopes.as_ref().map(|a| &a.model)
    }

    /// Versions of the loaded artifacts
    pub fn versions(&self) -> BTreeMap<ArtifactKind, String> {
        let mut out = BTreeMap::new();
        let entries = [
            (ArtifactKind::NextMonth, self.next_month.as_ref().map(|a| &a.version)),
            (ArtifactKind::Category, self.category.as_ref().map(|a| &a.version)),
            (ArtifactKind::Savings, self.savings.as_ref().map(|a| &a.version)),
            (ArtifactKind::AnomalyStats, self.anomaly_stats.as_ref().map(|a| &a.version)),
            (ArtifactKind::TrendSlopes, self.trend_slopes.as_ref().map(|a| &a.version)),
        ];
        for (kind, version) in entries {
            if let Some(v) = version {
                out.insert(kind, v.clone());
            }
        }
        out
    }
}

fn load_or_none<M: DeserializeOwned>(store: &ArtifactStore, kind: ArtifactKind) -> Option<Artifact<M>> {
    match store.load(kind) {
        Ok(Some(artifact)) => Some(artifact),
        Ok(None) => {
            debug!(artifact = %kind, "No trained artifact");
            None
        }
        Err(e) => {
            warn!(artifact = %kind, error = %e, "Ignoring unreadable artifact");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::Regressor;

    fn fitted_linear() -> LinearRegression {
        let mut model = LinearRegression::new();
        model
            .fit(&[vec![1.0], vec![2.0], vec![3.0]], &[10.0, 20.0, 30.0])
            .unwrap();
        model
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let version = store.save(ArtifactKind::NextMonth, 3, &fitted_linear()).unwrap();
        assert_eq!(version.len(), 64);
        assert!(dir.path().join("linear_next_month.json").exists());

        let loaded: Artifact<LinearRegression> =
            store.load(ArtifactKind::NextMonth).unwrap().unwrap();
        assert_eq!(loaded.kind, ArtifactKind::NextMonth);
        assert_eq!(loaded.version, version);
        assert_eq!(loaded.rows, 3);
        assert!((loaded.model.predict(&[4.0]).unwrap() - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_version_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let mut slopes = TrendSlopes::new();
        slopes.insert(1, 2.5);
        let a = store.save(ArtifactKind::TrendSlopes, 6, &slopes).unwrap();
        let b = store.save(ArtifactKind::TrendSlopes, 6, &slopes).unwrap();
        assert_eq!(a, b);

        slopes.insert(2, -1.0);
        let c = store.save(ArtifactKind::TrendSlopes, 12, &slopes).unwrap();
        assert_ne!(a, c);
        assert_eq!(store.version(ArtifactKind::TrendSlopes).unwrap(), Some(c));
    }

    #[test]
    fn test_missing_artifact_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("not-created-yet"));
        assert!(store
            .load::<LinearRegression>(ArtifactKind::NextMonth)
            .unwrap()
            .is_none());
        assert!(store.version(ArtifactKind::Savings).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_artifact_is_error_but_snapshot_skips_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        fs::write(store.path_for(ArtifactKind::Category), b"{ not json").unwrap();

        let mut stats = AnomalyStats::new();
        stats.insert(4, UserStats { mean: 1000.0, std: 200.0 });
        store.save(ArtifactKind::AnomalyStats, 10, &stats).unwrap();

        assert!(store.load::<RandomForest>(ArtifactKind::Category).is_err());

        let snapshot = ModelSnapshot::load(&store);
        assert!(snapshot.category_model().is_none());
        assert_eq!(snapshot.anomaly_stats().unwrap()[&4].std, 200.0);
        assert_eq!(snapshot.versions().len(), 1);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(ArtifactKind::TrendSlopes, 1, &TrendSlopes::new()).unwrap();
        fs::copy(
            store.path_for(ArtifactKind::TrendSlopes),
            store.path_for(ArtifactKind::NextMonth),
        )
        .unwrap();

        assert!(store.load::<serde_json::Value>(ArtifactKind::NextMonth).is_err());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(ArtifactKind::NextMonth, 3, &fitted_linear()).unwrap();
        store.save(ArtifactKind::NextMonth, 3, &fitted_linear()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("linear_next_month.json")]);
    }

    #[test]
    fn test_file_names() {
        let names: Vec<_> = ArtifactKind::all().iter().map(|k| k.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "linear_next_month.json",
                "decision_tree_category.json",
                "decision_tree_saving.json",
                "anomaly_stats.json",
                "spending_pattern_slopes.json",
            ]
        );
    }
}
