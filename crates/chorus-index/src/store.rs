//! Remote vector index adapter.
//!
//! Wraps a Pinecone-style REST API: a control plane for index lifecycle
//! (describe / create) and a data plane for upsert, query, and delete.
//! Responses are validated into typed records at this boundary so a
//! missing metadata field surfaces as a typed `Option`, not a runtime
//! surprise downstream. The adapter never retries; transport errors
//! surface as [`ChorusError::Store`].

use chorus_core::{ChorusError, ChunkMatch, IndexConfig};
use serde::{Deserialize, Serialize};

const DEFAULT_CONTROL_URL: &str = "https://api.pinecone.io";

/// Adapter for a remote similarity-search index.
///
/// Construct once from [`IndexConfig`], call
/// [`ensure_index`](Self::ensure_index) to resolve the data-plane host,
/// then upsert and query by record id.
///
/// # Examples
///
/// ```
/// use chorus_core::IndexConfig;
/// use chorus_index::store::VectorStore;
///
/// let config = IndexConfig {
///     api_key: Some("test-key".into()),
///     ..IndexConfig::default()
/// };
/// let store = VectorStore::with_config(&config, 1536).unwrap();
/// assert_eq!(store.index_name(), "code-embeddings");
/// ```
pub struct VectorStore {
    client: reqwest::Client,
    api_key: String,
    control_url: String,
    host: Option<String>,
    dimensions: usize,
    config: IndexConfig,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("index", &self.config.name)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct CreateIndexRequest {
    name: String,
    dimension: usize,
    metric: String,
    spec: IndexSpec,
}

#[derive(Serialize)]
struct IndexSpec {
    serverless: ServerlessSpec,
}

#[derive(Serialize)]
struct ServerlessSpec {
    cloud: String,
    region: String,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<UpsertVector>,
}

#[derive(Serialize, Deserialize)]
struct UpsertVector {
    id: String,
    values: Vec<f32>,
    metadata: RecordMetadata,
}

/// Metadata stored with each record. `code` carries the (possibly
/// truncated) chunk text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Stored chunk text, absent on malformed records.
    pub code: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<MatchItem>,
}

#[derive(Deserialize)]
struct MatchItem {
    id: String,
    score: f64,
    metadata: Option<RecordMetadata>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    delete_all: bool,
}

impl VectorStore {
    /// Create a store adapter from an [`IndexConfig`].
    ///
    /// Falls back to the `PINECONE_API_KEY` env var if no key in config.
    /// A configured `host` skips the control-plane lookup entirely.
    /// `dimensions` is the system-wide vector dimension; every vector
    /// crossing this boundary is validated against it.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Config`] if no API key is available.
    pub fn with_config(config: &IndexConfig, dimensions: usize) -> Result<Self, ChorusError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("PINECONE_API_KEY").ok())
            .ok_or_else(|| {
                ChorusError::Config(
                    "index API key not found: set index.api_key in .chorus.toml or PINECONE_API_KEY env var".into(),
                )
            })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            control_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTROL_URL.to_string()),
            host: config.host.clone(),
            dimensions,
            config: config.clone(),
        })
    }

    /// Get the configured index name.
    pub fn index_name(&self) -> &str {
        &self.config.name
    }

    /// Ensure the named index exists and resolve its data-plane host.
    ///
    /// Describes the index first; a 404 triggers creation with the
    /// configured dimension, metric, cloud, and region. Idempotent: an
    /// existing index is left untouched. A pre-configured `host` makes
    /// this a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Store`] if the control plane call fails.
    pub async fn ensure_index(&mut self) -> Result<(), ChorusError> {
        if self.host.is_some() {
            return Ok(());
        }

        let describe_url = format!("{}/indexes/{}", self.control_url, self.config.name);
        let response = self
            .client
            .get(&describe_url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| ChorusError::Store(format!("describe index failed: {e}")))?;

        if response.status().is_success() {
            let described: DescribeIndexResponse = response
                .json()
                .await
                .map_err(|e| ChorusError::Store(format!("failed to parse index description: {e}")))?;
            self.host = Some(described.host);
            return Ok(());
        }

        if response.status() != reqwest::StatusCode::NOT_FOUND {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChorusError::Store(format!(
                "describe index returned {status}: {body}"
            )));
        }

        let request = CreateIndexRequest {
            name: self.config.name.clone(),
            dimension: self.dimensions,
            metric: self.config.metric.clone(),
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: self.config.cloud.clone(),
                    region: self.config.region.clone(),
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/indexes", self.control_url))
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChorusError::Store(format!("create index failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChorusError::Store(format!(
                "create index returned {status}: {body}"
            )));
        }

        let created: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| ChorusError::Store(format!("failed to parse created index: {e}")))?;
        self.host = Some(created.host);
        Ok(())
    }

    /// Insert or overwrite the record at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Store`] if the vector's dimension differs
    /// from the configured one, if the host has not been resolved, or if
    /// the upsert call fails.
    pub async fn upsert(
        &self,
        id: &str,
        values: Vec<f32>,
        code: Option<String>,
    ) -> Result<(), ChorusError> {
        self.check_dimensions(values.len())?;
        let url = self.data_url("/vectors/upsert")?;

        let request = UpsertRequest {
            vectors: vec![UpsertVector {
                id: id.to_string(),
                values,
                metadata: RecordMetadata { code },
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChorusError::Store(format!("upsert failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChorusError::Store(format!(
                "upsert returned {status}: {body}"
            )));
        }

        Ok(())
    }

    /// Query the index for the `top_k` nearest records.
    ///
    /// An empty index yields an empty vec, never an error. Matches
    /// without `code` metadata are reported with `code: None`.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Store`] on dimension mismatch, unresolved
    /// host, or a failed query call.
    pub async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<ChunkMatch>, ChorusError> {
        self.check_dimensions(vector.len())?;
        let url = self.data_url("/query")?;

        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChorusError::Store(format!("query failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChorusError::Store(format!(
                "query returned {status}: {body}"
            )));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| ChorusError::Store(format!("failed to parse query response: {e}")))?;

        Ok(query_response
            .matches
            .into_iter()
            .map(|m| ChunkMatch {
                id: m.id,
                score: m.score,
                code: m.metadata.and_then(|meta| meta.code),
            })
            .collect())
    }

    /// Delete every record in the index.
    ///
    /// Used before a fresh ingestion so positional ids from a previous
    /// run can never survive alongside new ones.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Store`] on unresolved host or a failed
    /// delete call.
    pub async fn clear(&self) -> Result<(), ChorusError> {
        let url = self.data_url("/vectors/delete")?;

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&DeleteRequest { delete_all: true })
            .send()
            .await
            .map_err(|e| ChorusError::Store(format!("delete failed: {e}")))?;

        // Serverless indexes answer 404 when the namespace holds nothing
        // yet; an already-empty index is a successful clear.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChorusError::Store(format!(
                "delete returned {status}: {body}"
            )));
        }

        Ok(())
    }

    fn host(&self) -> Result<&str, ChorusError> {
        self.host.as_deref().ok_or_else(|| {
            ChorusError::Store("index host not resolved: call ensure_index first".into())
        })
    }

    /// Build a data-plane URL. The control plane reports a bare host
    /// (`my-index.svc.pinecone.io`); a host carrying an explicit scheme
    /// is used verbatim.
    fn data_url(&self, path: &str) -> Result<String, ChorusError> {
        let host = self.host()?;
        if host.contains("://") {
            Ok(format!("{host}{path}"))
        } else {
            Ok(format!("https://{host}{path}"))
        }
    }

    fn check_dimensions(&self, len: usize) -> Result<(), ChorusError> {
        if len != self.dimensions {
            return Err(ChorusError::Store(format!(
                "vector has {len} dimensions, index expects {}",
                self.dimensions
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> IndexConfig {
        IndexConfig {
            api_key: Some("test-key".into()),
            ..IndexConfig::default()
        }
    }

    #[test]
    fn create_index_request_shape() {
        let request = CreateIndexRequest {
            name: "code-embeddings".into(),
            dimension: 1536,
            metric: "euclidean".into(),
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: "aws".into(),
                    region: "us-east-1".into(),
                },
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["name"], "code-embeddings");
        assert_eq!(json["dimension"], 1536);
        assert_eq!(json["metric"], "euclidean");
        assert_eq!(json["spec"]["serverless"]["cloud"], "aws");
        assert_eq!(json["spec"]["serverless"]["region"], "us-east-1");
    }

    #[test]
    fn upsert_request_carries_metadata() {
        let request = UpsertRequest {
            vectors: vec![UpsertVector {
                id: "0".into(),
                values: vec![0.1, 0.2],
                metadata: RecordMetadata {
                    code: Some("fn main() {}".into()),
                },
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["vectors"][0]["id"], "0");
        assert_eq!(json["vectors"][0]["metadata"]["code"], "fn main() {}");
    }

    #[test]
    fn query_request_uses_camel_case_keys() {
        let request = QueryRequest {
            vector: vec![0.0; 3],
            top_k: 5,
            include_metadata: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topK"], 5);
        assert_eq!(json["includeMetadata"], true);
    }

    #[test]
    fn delete_request_is_delete_all() {
        let json = serde_json::to_value(DeleteRequest { delete_all: true }).unwrap();
        assert_eq!(json["deleteAll"], true);
    }

    #[test]
    fn query_response_parses_matches() {
        let json = r#"{
            "matches": [
                {"id": "0", "score": 0.95, "metadata": {"code": "fn a() {}"}},
                {"id": "1", "score": 0.40, "metadata": {}}
            ]
        }"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.matches.len(), 2);
        assert_eq!(response.matches[0].id, "0");
        assert_eq!(
            response.matches[0].metadata.as_ref().unwrap().code.as_deref(),
            Some("fn a() {}")
        );
        // Missing code field becomes a typed None, not a panic
        assert!(response.matches[1].metadata.as_ref().unwrap().code.is_none());
    }

    #[test]
    fn empty_query_response_parses_to_no_matches() {
        let response: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(response.matches.is_empty());
    }

    #[test]
    fn dimension_mismatch_fails_at_the_boundary() {
        let store = VectorStore::with_config(&test_config(), 1536).unwrap();
        let result = store.check_dimensions(3);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("1536"), "error should name expected dims: {err}");
    }

    #[test]
    fn unresolved_host_is_an_error() {
        let store = VectorStore::with_config(&test_config(), 1536).unwrap();
        let err = store.host().unwrap_err().to_string();
        assert!(err.contains("ensure_index"));
    }

    #[test]
    fn configured_host_skips_resolution() {
        let config = IndexConfig {
            host: Some("my-index.svc.pinecone.io".into()),
            ..test_config()
        };
        let store = VectorStore::with_config(&config, 1536).unwrap();
        assert_eq!(store.host().unwrap(), "my-index.svc.pinecone.io");
    }

    #[test]
    fn bare_host_gets_https_scheme() {
        let config = IndexConfig {
            host: Some("my-index.svc.pinecone.io".into()),
            ..test_config()
        };
        let store = VectorStore::with_config(&config, 1536).unwrap();
        assert_eq!(
            store.data_url("/query").unwrap(),
            "https://my-index.svc.pinecone.io/query"
        );
    }

    #[tokio::test]
    async fn ensure_index_creates_when_missing() {
        let stub = crate::test_util::spawn_stub(vec![
            // Describe answers 404, creation answers with the new host.
            (404, r#"{"error": "not found"}"#.into()),
            (201, r#"{"host": "created.example"}"#.into()),
        ])
        .await;
        let config = IndexConfig {
            base_url: Some(stub),
            ..test_config()
        };
        let mut store = VectorStore::with_config(&config, 4).unwrap();

        store.ensure_index().await.unwrap();
        assert_eq!(store.host().unwrap(), "created.example");
    }

    #[tokio::test]
    async fn ensure_index_reuses_existing_index() {
        let stub = crate::test_util::spawn_stub(vec![(
            200,
            r#"{"host": "existing.example"}"#.into(),
        )])
        .await;
        let config = IndexConfig {
            base_url: Some(stub),
            ..test_config()
        };
        let mut store = VectorStore::with_config(&config, 4).unwrap();

        store.ensure_index().await.unwrap();
        assert_eq!(store.host().unwrap(), "existing.example");
    }

    #[tokio::test]
    async fn query_of_empty_index_yields_no_matches() {
        let stub = crate::test_util::spawn_stub(vec![(200, r#"{"matches": []}"#.into())]).await;
        let config = IndexConfig {
            host: Some(stub),
            ..test_config()
        };
        let store = VectorStore::with_config(&config, 4).unwrap();

        let matches = store.query(vec![0.0; 4], 5).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn clear_treats_empty_namespace_404_as_success() {
        let stub =
            crate::test_util::spawn_stub(vec![(404, r#"{"error": "namespace not found"}"#.into())])
                .await;
        let config = IndexConfig {
            host: Some(stub),
            ..test_config()
        };
        let store = VectorStore::with_config(&config, 4).unwrap();

        store.clear().await.unwrap();
    }
}
