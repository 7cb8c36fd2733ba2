use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, timeout::TimeoutConfig};
use aws_sdk_s3::{
    Client,
    config::{Credentials, RequestChecksumCalculation, ResponseChecksumValidation},
    error::{DisplayErrorContext, SdkError},
    primitives::ByteStream,
};
use log::debug;

use crate::{ArtifactStore, Result, StoreErr};

const BACKEND: &str = "s3";
const REGION: &str = "us-east-1";

/// An S3-compatible artifact store using path-style addressing.
///
/// Requests carry a fixed `test` key pair, which LocalStack and similar
/// local object stores accept without further setup.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Creates a new `S3Store`.
    ///
    /// # Arguments
    /// * `endpoint` - The base URL of the object store.
    /// * `bucket` - The bucket holding every artifact.
    /// * `timeout` - Per operation timeout, exceeding it is reported as `BackendUnavailable`.
    pub async fn new(endpoint: &str, bucket: impl Into<String>, timeout: Duration) -> Self {
        let timeouts = TimeoutConfig::builder()
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .operation_timeout(timeout)
            .build();

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(REGION))
            .endpoint_url(endpoint)
            .credentials_provider(Credentials::new("test", "test", None, None, "artifacts"))
            .timeout_config(timeouts)
            .load()
            .await;

        let config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        Self {
            client: Client::from_conf(config),
            bucket: bucket.into(),
        }
    }

    fn sdk_err<E, R>(key: &str, e: SdkError<E, R>) -> StoreErr
    where
        E: std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        StoreErr::unavailable(BACKEND, format!("{key}: {}", DisplayErrorContext(&e)))
    }

    fn not_found(key: &str) -> StoreErr {
        StoreErr::NotFound {
            key: key.to_string(),
        }
    }
}

/// Whether the store answered with a plain 404, which some S3 clones send
/// without a `NoSuchKey` code.
fn is_http_not_found<E>(e: &SdkError<E, aws_sdk_s3::config::http::HttpResponse>) -> bool {
    e.raw_response().is_some_and(|resp| resp.status().as_u16() == 404)
}

#[async_trait]
impl ArtifactStore for S3Store {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let len = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| Self::sdk_err(key, e))?;

        debug!(key = key, bytes = len; "object uploaded");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if is_http_not_found(&e) => return Err(Self::not_found(key)),
            Err(e) if e.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Err(Self::not_found(key));
            }
            Err(e) => return Err(Self::sdk_err(key, e)),
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreErr::unavailable(BACKEND, format!("{key}: {e}")))?;

        Ok(body.into_bytes().to_vec())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_http_not_found(&e) => Ok(false),
            Err(e) if e.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(e) => Err(Self::sdk_err(key, e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| Self::sdk_err(prefix, e))?;

            keys.extend(page.contents().iter().filter_map(|object| object.key()).map(String::from));
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        http::{Method, StatusCode, Uri},
        response::IntoResponse,
    };
    use tokio::net::TcpListener;

    use super::*;

    const BUCKET: &str = "house-price-data";

    fn list_page(keys: &[&str], next: Option<&str>) -> String {
        let contents: String = keys
            .iter()
            .map(|key| format!("<Contents><Key>{key}</Key><Size>1</Size></Contents>"))
            .collect();
        let tail = match next {
            Some(token) => format!("<IsTruncated>true</IsTruncated><NextContinuationToken>{token}</NextContinuationToken>"),
            None => "<IsTruncated>false</IsTruncated>".to_string(),
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>{BUCKET}</Name><KeyCount>{}</KeyCount><MaxKeys>1000</MaxKeys>{contents}{tail}</ListBucketResult>"#,
            keys.len()
        )
    }

    fn s3_error(status: StatusCode, code: &str) -> axum::response::Response {
        let body = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Error><Code>{code}</Code><Message>{code}</Message></Error>"#
        );
        (status, [("content-type", "application/xml")], body).into_response()
    }

    /// A minimal path-style object store: one object, a two page listing and
    /// uploads that always fail.
    async fn fake_s3(method: Method, uri: Uri) -> axum::response::Response {
        let bucket_path = format!("/{BUCKET}");
        let query = uri.query().unwrap_or_default();

        match (method.as_str(), uri.path()) {
            ("GET", path) if path.trim_end_matches('/') == bucket_path => {
                let body = if query.contains("continuation-token=page-2") {
                    list_page(&["models/housing-v2"], None)
                } else {
                    list_page(&["models/housing"], Some("page-2"))
                };
                ([("content-type", "application/xml")], body).into_response()
            }
            ("GET", "/house-price-data/models/housing") => b"weights".to_vec().into_response(),
            ("HEAD", "/house-price-data/models/housing") => StatusCode::OK.into_response(),
            ("HEAD", _) => StatusCode::NOT_FOUND.into_response(),
            ("GET", _) => s3_error(StatusCode::NOT_FOUND, "NoSuchKey"),
            ("PUT", _) => s3_error(StatusCode::FORBIDDEN, "AccessDenied"),
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    }

    async fn store_against_fake() -> S3Store {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().fallback(fake_s3)).await.unwrap();
        });

        S3Store::new(&format!("http://{addr}"), BUCKET, Duration::from_secs(5)).await
    }

    #[tokio::test]
    async fn get_reads_objects_by_path_style_url() {
        let store = store_against_fake().await;

        assert_eq!(store.get("models/housing").await.unwrap(), b"weights");
        assert!(store.exists("models/housing").await.unwrap());
    }

    #[tokio::test]
    async fn missing_objects_are_not_found() {
        let store = store_against_fake().await;

        assert!(store.get("models/missing").await.unwrap_err().is_not_found());
        assert!(!store.exists("models/missing").await.unwrap());
    }

    #[tokio::test]
    async fn rejected_upload_is_backend_unavailable() {
        let store = store_against_fake().await;

        let err = store.put("models/housing", b"weights".to_vec()).await.unwrap_err();
        assert_eq!(err.code(), "BackendUnavailable");
    }

    #[tokio::test]
    async fn list_follows_continuation_tokens() {
        let store = store_against_fake().await;

        assert_eq!(
            store.list("models/").await.unwrap(),
            ["models/housing", "models/housing-v2"]
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_backend_unavailable() {
        let store = S3Store::new("http://127.0.0.1:9", BUCKET, Duration::from_secs(1)).await;

        let err = store.get("models/housing").await.unwrap_err();
        assert_eq!(err.code(), "BackendUnavailable");
    }
}
