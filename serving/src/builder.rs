use artifacts::{ArtifactClient, ArtifactKey};
use log::{error, info};

use crate::{
    error::Result,
    server::{LoadedModel, ModelServer},
};

/// A server in the `Uninitialized` state.
#[derive(Debug, Clone)]
pub struct ServerBuilder {
    client: ArtifactClient,
    key: ArtifactKey,
}

impl ServerBuilder {
    /// Creates a new `ServerBuilder`.
    ///
    /// # Arguments
    /// * `client` - The artifact store client.
    /// * `name` - The logical name of the model to serve, read from `models/<name>`.
    pub fn new(client: ArtifactClient, name: impl Into<String>) -> Self {
        Self {
            client,
            key: ArtifactKey::model(name),
        }
    }

    /// Loads the model and moves the server to the `Ready` state.
    ///
    /// # Returns
    /// A `ModelServer` serving generation 1, or `ServeErr::ModelLoad` if the
    /// model can't be read or decoded.
    pub async fn start(self) -> Result<ModelServer> {
        let loaded = match LoadedModel::load(&self.client, &self.key, 1).await {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(key:% = self.key, code = e.code(); "{e}");
                return Err(e);
            }
        };

        info!(
            key:% = self.key,
            features = loaded.artifact().feature_columns.len();
            "model loaded"
        );

        Ok(ModelServer::new(self.client, loaded))
    }
}
