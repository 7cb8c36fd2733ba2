mod common;

use artifacts::{ArtifactKey, MemoryStore};
use async_trait::async_trait;
use model::ModelArtifact;
use pipeline::{
    DataSource, FetchStage, PipelineErr, PreprocessConfig, PreprocessStage, StaticSource, Table,
    TrainConfig, TrainStage,
};

use common::{StoreExt, housing_csv, memory_client};

const NAME: &str = "housing";

struct OfflineSource;

#[async_trait]
impl DataSource for OfflineSource {
    fn origin(&self) -> String {
        "offline".into()
    }

    async fn fetch(&self) -> pipeline::Result<Vec<u8>> {
        Err(PipelineErr::SourceUnavailable {
            origin: self.origin(),
            reason: "connection refused".into(),
        })
    }
}

async fn seed_processed(client: &artifacts::ArtifactClient, rows: usize) {
    FetchStage::new(client.clone(), StaticSource::new("housing", housing_csv(rows, 25)))
        .run(NAME)
        .await
        .unwrap();
    PreprocessStage::new(client.clone(), PreprocessConfig::default())
        .run(NAME)
        .await
        .unwrap();
}

#[tokio::test]
async fn full_pipeline_produces_servable_model() {
    let (_store, client) = memory_client();

    let fetched = FetchStage::new(client.clone(), StaticSource::new("housing", housing_csv(500, 25)))
        .run(NAME)
        .await
        .unwrap();
    assert_eq!(fetched.key, ArtifactKey::raw(NAME));
    assert_eq!(fetched.rows, 500);
    assert_eq!(fetched.incomplete_rows, 20);

    let preprocessed = PreprocessStage::new(client.clone(), PreprocessConfig::default())
        .run(NAME)
        .await
        .unwrap();
    assert_eq!(preprocessed.rows_out, 480);
    assert_eq!(preprocessed.dropped, ["ocean_proximity"]);

    let processed: Table = client.get_artifact(&ArtifactKey::processed(NAME)).await.unwrap();
    assert!(processed.column_index("ocean_proximity").is_none());
    assert_eq!(processed.incomplete_rows(), 0);

    let trained = TrainStage::new(client.clone(), TrainConfig::default())
        .run(NAME)
        .await
        .unwrap();
    assert_eq!(trained.test_rows, 96);
    assert!(trained.held_out_r2 > 0.8, "r2 = {}", trained.held_out_r2);

    let artifact: ModelArtifact = client.get_artifact(&ArtifactKey::model(NAME)).await.unwrap();
    assert_eq!(artifact.feature_columns, trained.feature_columns);
    assert_eq!(artifact.feature_columns.len(), 8);
    assert!(!artifact.feature_columns.iter().any(|c| c == "median_house_value" || c == "ocean_proximity"));

    let features = vec![-122.23, 37.88, 41.0, 880.0, 129.0, 322.0, 126.0, 8.3252];
    let prediction = artifact.model().predict_one(&features).unwrap();
    assert!(prediction.is_finite());
}

#[tokio::test]
async fn preprocessing_is_idempotent() {
    let (_store, client) = memory_client();
    seed_processed(&client, 200).await;
    let key = ArtifactKey::processed(NAME);
    let first = client.get_bytes(&key).await.unwrap();

    PreprocessStage::new(client.clone(), PreprocessConfig::default())
        .run(NAME)
        .await
        .unwrap();

    assert_eq!(client.get_bytes(&key).await.unwrap(), first);
}

#[tokio::test]
async fn training_is_deterministic_for_a_seed() {
    let (_store, client) = memory_client();
    seed_processed(&client, 300).await;
    let stage = TrainStage::new(client.clone(), TrainConfig::default());
    let key = ArtifactKey::model(NAME);

    stage.run(NAME).await.unwrap();
    let first: ModelArtifact = client.get_artifact(&key).await.unwrap();
    stage.run(NAME).await.unwrap();
    let second: ModelArtifact = client.get_artifact(&key).await.unwrap();

    assert_eq!(first.feature_columns, second.feature_columns);
    assert_eq!(first.coefficients, second.coefficients);
    assert_eq!(first.intercept, second.intercept);
    assert!((first.metadata.held_out_r2 - second.metadata.held_out_r2).abs() < 1e-12);
}

#[tokio::test]
async fn different_seed_changes_the_split() {
    let (_store, client) = memory_client();
    seed_processed(&client, 300).await;

    let a = TrainStage::new(client.clone(), TrainConfig::new("median_house_value", 0.2, 1).unwrap())
        .run(NAME)
        .await
        .unwrap();
    let b = TrainStage::new(client.clone(), TrainConfig::new("median_house_value", 0.2, 2).unwrap())
        .run(NAME)
        .await
        .unwrap();

    assert_ne!(a.held_out_r2, b.held_out_r2);
}

#[tokio::test]
async fn failed_model_upload_leaves_no_model() {
    let (store, client) = memory_client();
    seed_processed(&client, 200).await;

    store.set_writable(false);
    let err = TrainStage::new(client.clone(), TrainConfig::default())
        .run(NAME)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BackendUnavailable");

    store.set_writable(true);
    assert!(!client.exists(&ArtifactKey::model(NAME)).await.unwrap());
}

#[tokio::test]
async fn insufficient_data_writes_no_model() {
    let (_store, client) = memory_client();
    seed_processed(&client, 6).await;

    let err = TrainStage::new(client.clone(), TrainConfig::default())
        .run(NAME)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "InsufficientData");
    assert!(!client.exists(&ArtifactKey::model(NAME)).await.unwrap());
}

#[tokio::test]
async fn training_never_reads_the_raw_dataset() {
    let (_store, client) = memory_client();
    FetchStage::new(client.clone(), StaticSource::new("housing", housing_csv(50, 0)))
        .run(NAME)
        .await
        .unwrap();

    let err = TrainStage::new(client.clone(), TrainConfig::default())
        .run(NAME)
        .await
        .unwrap_err();

    match err {
        PipelineErr::ArtifactMissing { key } => assert_eq!(key, "processed/housing"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn preprocessing_without_raw_is_artifact_missing() {
    let store = MemoryStore::new();
    let client = artifacts::ArtifactClient::new(std::sync::Arc::new(store));

    let err = PreprocessStage::new(client.clone(), PreprocessConfig::default())
        .run(NAME)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ArtifactMissing");
}

#[tokio::test]
async fn preprocessing_schema_mismatch_writes_nothing() {
    let (_store, client) = memory_client();
    FetchStage::new(client.clone(), StaticSource::new("plain", "a,b\n1,2\n3,4\n"))
        .run(NAME)
        .await
        .unwrap();

    let err = PreprocessStage::new(client.clone(), PreprocessConfig::default())
        .run(NAME)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SchemaMismatch");
    assert!(!client.exists(&ArtifactKey::processed(NAME)).await.unwrap());
}

#[tokio::test]
async fn unavailable_source_writes_nothing() {
    let (store, client) = memory_client();

    let err = FetchStage::new(client.clone(), OfflineSource)
        .run(NAME)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SourceUnavailable");
    assert!(store.is_empty());
}

#[tokio::test]
async fn malformed_source_writes_nothing() {
    let (store, client) = memory_client();

    let err = FetchStage::new(client.clone(), StaticSource::new("ragged", "a,b\n1,2,3\n"))
        .run(NAME)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "MalformedData");
    assert!(store.is_empty());
}

#[tokio::test]
async fn offline_store_is_backend_unavailable() {
    let (store, client) = memory_client();
    store.set_available(false);

    let err = FetchStage::new(client.clone(), StaticSource::new("housing", housing_csv(10, 0)))
        .run(NAME)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BackendUnavailable");
}
