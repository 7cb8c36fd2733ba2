use std::sync::Arc;

use artifacts::{ArtifactClient, ArtifactKey, MemoryStore};
use chrono::{TimeZone, Utc};
use model::{LinearRegression, ModelArtifact, ModelMetadata};

pub const NAME: &str = "housing";

/// value = 100 * rooms + 5000 * income + 20000
pub fn artifact() -> ModelArtifact {
    let metadata = ModelMetadata {
        trained_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        held_out_r2: 0.9,
        test_fraction: 0.2,
        seed: 42,
        train_rows: 80,
        test_rows: 20,
    };
    let model = LinearRegression::new(vec![100.0, 5000.0], 20_000.0);
    ModelArtifact::new(
        &model,
        vec!["total_rooms".into(), "median_income".into()],
        "median_house_value",
        metadata,
    )
    .unwrap()
}

/// A memory store holding `artifact()` under `models/housing`.
pub async fn seeded_store() -> (Arc<MemoryStore>, ArtifactClient) {
    let store = Arc::new(MemoryStore::new());
    let client = ArtifactClient::new(store.clone());
    client
        .put_artifact(&ArtifactKey::model(NAME), &artifact())
        .await
        .unwrap();
    (store, client)
}
