//! In-memory registry of loaded datasets.
//!
//! Each load (built-in file or upload) produces its own [`LoadedDataset`] keyed
//! by id, so concurrent dashboard sessions never see each other's data.

use crate::{ingest, kpi};
use chrono::{DateTime, Utc};
use cltv_core::{DashboardError, DashboardResult, DatasetAnalysis};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Where a dataset came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSource {
    Builtin { path: String },
    Upload,
}

impl DatasetSource {
    /// Prefix used in status lines.
    pub fn status_prefix(&self) -> &'static str {
        match self {
            Self::Builtin { .. } => "Built-in dataset loaded",
            Self::Upload => "Uploaded CSV loaded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedDataset {
    pub id: Uuid,
    pub source: DatasetSource,
    pub analysis: DatasetAnalysis,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedDataset {
    pub fn new(source: DatasetSource, analysis: DatasetAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            analysis,
            loaded_at: Utc::now(),
        }
    }

    /// `"<prefix> • rows: N • channels: M"`
    pub fn status_line(&self) -> String {
        format!(
            "{} • rows: {} • channels: {}",
            self.source.status_prefix(),
            self.analysis.meta.rows,
            self.analysis.meta.channels
        )
    }
}

/// Concurrent dataset registry with oldest-first eviction.
pub struct DatasetStore {
    datasets: DashMap<Uuid, Arc<LoadedDataset>>,
    order: Mutex<VecDeque<Uuid>>,
    capacity: usize,
}

impl DatasetStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            datasets: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Parse, analyze and register the CSV at `path`.
    pub fn load_builtin(&self, path: impl AsRef<Path>) -> DashboardResult<Arc<LoadedDataset>> {
        let path = path.as_ref();
        let result = ingest::load_path(path).and_then(|records| kpi::compute(&records));
        let analysis = self.track_load(result)?;
        Ok(self.insert(LoadedDataset::new(
            DatasetSource::Builtin {
                path: path.display().to_string(),
            },
            analysis,
        )))
    }

    /// Parse, analyze and register an uploaded CSV body.
    pub fn load_upload(&self, bytes: &[u8]) -> DashboardResult<Arc<LoadedDataset>> {
        let result = ingest::load_bytes(bytes).and_then(|records| kpi::compute(&records));
        let analysis = self.track_load(result)?;
        Ok(self.insert(LoadedDataset::new(DatasetSource::Upload, analysis)))
    }

    fn track_load(&self, result: DashboardResult<DatasetAnalysis>) -> DashboardResult<DatasetAnalysis> {
        match result {
            Ok(analysis) => {
                metrics::counter!("datasets.loaded").increment(1);
                Ok(analysis)
            }
            Err(e) => {
                metrics::counter!("datasets.load_errors", "code" => e.code()).increment(1);
                warn!(error = %e, "Dataset load failed");
                Err(e)
            }
        }
    }

    /// Register an already-analyzed dataset, evicting the oldest when full.
    pub fn insert(&self, dataset: LoadedDataset) -> Arc<LoadedDataset> {
        let dataset = Arc::new(dataset);
        let mut order = self.order.lock();
        while order.len() >= self.capacity {
            if let Some(oldest) = order.pop_front() {
                self.datasets.remove(&oldest);
                info!(dataset_id = %oldest, "Evicted oldest dataset");
            }
        }
        order.push_back(dataset.id);
        self.datasets.insert(dataset.id, dataset.clone());
        metrics::gauge!("datasets.resident").set(order.len() as f64);

        info!(dataset_id = %dataset.id, status = %dataset.status_line(), "Dataset registered");
        dataset
    }

    pub fn get(&self, id: &Uuid) -> DashboardResult<Arc<LoadedDataset>> {
        self.datasets
            .get(id)
            .map(|d| d.value().clone())
            .ok_or_else(|| DashboardError::UnknownDataset(id.to_string()))
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        let mut order = self.order.lock();
        order.retain(|d| d != id);
        metrics::gauge!("datasets.resident").set(order.len() as f64);
        self.datasets.remove(id).is_some()
    }

    /// Loaded datasets, oldest first.
    pub fn list(&self) -> Vec<Arc<LoadedDataset>> {
        self.order
            .lock()
            .iter()
            .filter_map(|id| self.datasets.get(id).map(|d| d.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new(64)
    }
}
