use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use artifacts::{ArtifactClient, ArtifactKey, ArtifactKind};
use log::{info, warn};
use model::{LinearRegression, ModelArtifact};
use parking_lot::RwLock;
use serde_json::Value;

use crate::{
    error::{Result, ServeErr},
    request::{ModelSummary, PredictionRequest, PredictionResponse},
};

/// An immutable, decoded model ready for inference.
#[derive(Debug)]
pub struct LoadedModel {
    key: ArtifactKey,
    generation: u64,
    artifact: ModelArtifact,
    model: LinearRegression,
}

impl LoadedModel {
    /// Reads and decodes the model stored under `key`.
    ///
    /// Performs exactly one read against the store.
    ///
    /// # Arguments
    /// * `client` - The artifact store client.
    /// * `key` - The model's key.
    /// * `generation` - The generation to tag the loaded model with.
    ///
    /// # Returns
    /// `ServeErr::ModelLoad` if the artifact is absent, unreachable or corrupt.
    pub(crate) async fn load(client: &ArtifactClient, key: &ArtifactKey, generation: u64) -> Result<Self> {
        let artifact: ModelArtifact =
            client
                .get_artifact(key)
                .await
                .map_err(|e| ServeErr::ModelLoad {
                    key: key.path(),
                    reason: e.to_string(),
                })?;

        Ok(Self::new(key.clone(), generation, artifact))
    }

    pub fn new(key: ArtifactKey, generation: u64, artifact: ModelArtifact) -> Self {
        let model = artifact.model();
        Self {
            key,
            generation,
            artifact,
            model,
        }
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Builds the feature vector of `request` in the model's column order.
    ///
    /// # Returns
    /// `ServeErr::InvalidInput` naming every missing, unexpected or non-numeric key.
    pub fn feature_vector(&self, request: &PredictionRequest) -> Result<Vec<f64>> {
        let columns = &self.artifact.feature_columns;

        let missing: Vec<String> = columns
            .iter()
            .filter(|name| !request.contains(name))
            .cloned()
            .collect();

        let unexpected: Vec<String> = request
            .names()
            .filter(|name| !columns.iter().any(|c| c == name))
            .map(str::to_string)
            .collect();

        let mut invalid = Vec::new();
        let mut features = Vec::with_capacity(columns.len());
        for name in columns {
            match request.get(name).map(numeric) {
                Some(Some(value)) => features.push(value),
                Some(None) => invalid.push(name.clone()),
                None => {}
            }
        }

        if !missing.is_empty() || !unexpected.is_empty() || !invalid.is_empty() {
            let sorted = |mut keys: Vec<String>| {
                keys.sort();
                keys
            };
            return Err(ServeErr::InvalidInput {
                missing: sorted(missing),
                unexpected: sorted(unexpected),
                invalid: sorted(invalid),
            });
        }

        Ok(features)
    }

    /// Validates `request` and runs inference on it.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        let features = self.feature_vector(request)?;
        let prediction = self
            .model
            .predict_one(&features)
            .map_err(|e| ServeErr::BadRequest(e.to_string()))?;

        if !prediction.is_finite() {
            return Err(ServeErr::BadRequest("features produce a non-finite prediction".into()));
        }

        Ok(PredictionResponse { prediction })
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            key: self.key.path(),
            generation: self.generation,
            algorithm: self.artifact.algorithm.clone(),
            feature_columns: self.artifact.feature_columns.clone(),
            target_column: self.artifact.target_column.clone(),
            held_out_r2: self.artifact.metadata.held_out_r2,
            trained_at: self.artifact.metadata.trained_at,
        }
    }
}

/// Finite JSON numbers only; strings, booleans and nulls are rejected.
fn numeric(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// A server in the `Ready` state.
///
/// Requests share the current `LoadedModel` through an `Arc`, the lock is only
/// held to clone or swap the pointer.
#[derive(Debug)]
pub struct ModelServer {
    client: ArtifactClient,
    key: ArtifactKey,
    current: RwLock<Arc<LoadedModel>>,
    generation: AtomicU64,
}

impl ModelServer {
    pub(crate) fn new(client: ArtifactClient, loaded: LoadedModel) -> Self {
        let generation = AtomicU64::new(loaded.generation());
        Self {
            client,
            key: loaded.key().clone(),
            current: RwLock::new(Arc::new(loaded)),
            generation,
        }
    }

    /// Returns the model currently served.
    ///
    /// A request keeps using the returned model even if a reload swaps it.
    pub fn current(&self) -> Arc<LoadedModel> {
        self.current.read().clone()
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        self.current().predict(request)
    }

    /// Loads the stored model again and swaps it in.
    ///
    /// The new model is fully decoded before the swap, on failure the current
    /// model keeps serving.
    ///
    /// # Returns
    /// The summary of the newly served model.
    pub async fn reload(&self) -> Result<ModelSummary> {
        let generation = self.generation.load(Ordering::Acquire) + 1;
        let loaded = match LoadedModel::load(&self.client, &self.key, generation).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(key:% = self.key, code = e.code(); "reload failed, keeping generation {}", generation - 1);
                return Err(e);
            }
        };

        let summary = {
            let mut current = self.current.write();
            // Concurrent reloads race here, keep the counter monotonic.
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            let loaded = LoadedModel { generation, ..loaded };
            let summary = loaded.summary();
            *current = Arc::new(loaded);
            summary
        };

        info!(key:% = self.key, generation = summary.generation; "model reloaded");
        Ok(summary)
    }

    /// Lists every model key present in the store.
    pub async fn available(&self) -> Result<Vec<String>> {
        let keys = self
            .client
            .list(ArtifactKind::Model)
            .await
            .map_err(|e| ServeErr::ModelLoad {
                key: ArtifactKind::Model.prefix().to_string(),
                reason: e.to_string(),
            })?;

        Ok(keys.iter().map(ArtifactKey::path).collect())
    }
}
