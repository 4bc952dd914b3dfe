//! Qdrant-backed vector store implementation
//!
//! Each memory collection maps to one Qdrant collection. Records are stored
//! as points: the embedding is the vector, the metadata lives in the payload.

use crate::embedding::hash::fnv1a;
use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_output::VectorsOptions;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, GetPointsBuilder, PointId, PointStruct, PointsIdsList,
    QueryPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder, VectorsOutput,
};
use std::collections::HashMap;
use uuid::Uuid;
use weft_kernel::error::{KernelError, Result};
use weft_kernel::memory::{Embedding, MemoryRecord, MemoryRecordMetadata, SimilarityMetric, VectorStore};

/// Reserved payload keys.
const PAYLOAD_KEY: &str = "_key";
const PAYLOAD_ID: &str = "_id";
const PAYLOAD_TEXT: &str = "_text";
const PAYLOAD_DESCRIPTION: &str = "_description";
const PAYLOAD_EXTERNAL_SOURCE: &str = "_external_source_name";
const PAYLOAD_ADDITIONAL_METADATA: &str = "_additional_metadata";
const PAYLOAD_IS_REFERENCE: &str = "_is_reference";

/// Configuration for connecting to a Qdrant instance.
pub struct QdrantConfig {
    /// Qdrant server URL (e.g., "http://localhost:6334")
    pub url: String,
    /// Optional API key for Qdrant Cloud or authenticated instances
    pub api_key: Option<String>,
    /// Dimensionality of embedding vectors in every collection
    pub vector_dimensions: u64,
    /// Similarity metric for collections created by this store
    pub metric: SimilarityMetric,
}

/// Qdrant-backed vector store.
///
/// String keys are mapped to u64 point ids with a stable hash; the key itself
/// is kept in the payload so lookups stay lossless.
pub struct QdrantMemoryStore {
    client: Qdrant,
    vector_dimensions: u64,
    metric: SimilarityMetric,
}

/// Convert a string key to a u64 point id.
fn key_to_point_id(key: &str) -> u64 {
    fnv1a(key.as_bytes())
}

fn extract_string(val: &Value) -> Option<&str> {
    match &val.kind {
        Some(Kind::StringValue(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn extract_bool(val: &Value) -> Option<bool> {
    match &val.kind {
        Some(Kind::BoolValue(b)) => Some(*b),
        _ => None,
    }
}

#[allow(deprecated)]
fn extract_vector(vectors: Option<&VectorsOutput>) -> Embedding {
    match vectors.and_then(|v| v.vectors_options.as_ref()) {
        Some(VectorsOptions::Vector(vector)) => vector.data.clone(),
        _ => Vec::new(),
    }
}

impl QdrantMemoryStore {
    /// Connect to the Qdrant instance described by `config`.
    pub fn new(config: QdrantConfig) -> Result<Self> {
        let mut builder = Qdrant::from_url(&config.url);
        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }
        let client = builder
            .build()
            .map_err(|e| KernelError::storage(format!("Qdrant connection failed: {e}")))?;

        tracing::debug!(url = %config.url, dims = config.vector_dimensions, "Connected to Qdrant");

        Ok(Self {
            client,
            vector_dimensions: config.vector_dimensions,
            metric: config.metric,
        })
    }

    fn to_qdrant_distance(metric: SimilarityMetric) -> Distance {
        match metric {
            SimilarityMetric::Cosine => Distance::Cosine,
            SimilarityMetric::Euclidean => Distance::Euclid,
            SimilarityMetric::DotProduct => Distance::Dot,
        }
    }

    /// Qdrant reports Euclid as a distance; map it so higher is more similar.
    fn relevance(metric: SimilarityMetric, score: f32) -> f64 {
        match metric {
            SimilarityMetric::Euclidean => 1.0 / (1.0 + f64::from(score)),
            _ => f64::from(score),
        }
    }

    fn record_key(record: &MemoryRecord) -> String {
        match &record.key {
            Some(key) if !key.is_empty() => key.clone(),
            _ if !record.metadata.id().is_empty() => record.metadata.id().to_string(),
            _ => Uuid::new_v4().to_string(),
        }
    }

    fn record_to_point(key: &str, record: &MemoryRecord) -> PointStruct {
        let metadata = &record.metadata;
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert(PAYLOAD_KEY.to_string(), key.to_string().into());
        payload.insert(PAYLOAD_ID.to_string(), metadata.id().to_string().into());
        payload.insert(PAYLOAD_TEXT.to_string(), metadata.text().to_string().into());
        payload.insert(
            PAYLOAD_EXTERNAL_SOURCE.to_string(),
            metadata.external_source_name().to_string().into(),
        );
        payload.insert(PAYLOAD_IS_REFERENCE.to_string(), metadata.is_reference().into());
        if let Some(description) = metadata.description() {
            payload.insert(PAYLOAD_DESCRIPTION.to_string(), description.to_string().into());
        }
        if let Some(additional) = metadata.additional_metadata() {
            payload.insert(PAYLOAD_ADDITIONAL_METADATA.to_string(), additional.to_string().into());
        }

        PointStruct::new(key_to_point_id(key), record.embedding.clone(), payload)
    }

    fn payload_to_record(collection: &str, payload: &HashMap<String, Value>, embedding: Embedding) -> MemoryRecord {
        let string = |name: &str| payload.get(name).and_then(extract_string).map(str::to_string);

        let metadata = MemoryRecordMetadata::new(
            payload.get(PAYLOAD_IS_REFERENCE).and_then(extract_bool).unwrap_or_default(),
            string(PAYLOAD_ID).unwrap_or_default(),
            string(PAYLOAD_TEXT).unwrap_or_default(),
            string(PAYLOAD_DESCRIPTION),
            string(PAYLOAD_EXTERNAL_SOURCE).unwrap_or_default(),
            string(PAYLOAD_ADDITIONAL_METADATA),
        );
        MemoryRecord::new(metadata, embedding, collection, string(PAYLOAD_KEY))
    }
}

#[async_trait]
impl VectorStore for QdrantMemoryStore {
    async fn create_collection(&self, collection: &str) -> Result<()> {
        if self.does_collection_exist(collection).await? {
            return Ok(());
        }

        let distance = Self::to_qdrant_distance(self.metric);
        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(self.vector_dimensions, distance)),
            )
            .await
            .map_err(|e| KernelError::storage(format!("Failed to create Qdrant collection '{collection}': {e}")))?;

        tracing::debug!(collection, "Created Qdrant collection");
        Ok(())
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool> {
        self.client
            .collection_exists(collection)
            .await
            .map_err(|e| KernelError::storage(format!("Qdrant collection check failed: {e}")))
    }

    async fn get_collections(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .list_collections()
            .await
            .map_err(|e| KernelError::storage(format!("Qdrant list collections failed: {e}")))?;

        let mut names: Vec<String> = response.collections.into_iter().map(|c| c.name).collect();
        names.sort();
        Ok(names)
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        if !self.does_collection_exist(collection).await? {
            return Ok(());
        }
        self.client
            .delete_collection(collection)
            .await
            .map_err(|e| KernelError::storage(format!("Qdrant delete collection failed: {e}")))?;
        Ok(())
    }

    async fn upsert(&self, collection: &str, record: MemoryRecord) -> Result<String> {
        if record.dimensions() as u64 != self.vector_dimensions {
            return Err(KernelError::storage(format!(
                "embedding dimension mismatch in collection '{collection}': expected {}, got {}",
                self.vector_dimensions,
                record.dimensions()
            )));
        }

        self.create_collection(collection).await?;

        let key = Self::record_key(&record);
        let point = Self::record_to_point(&key, &record);
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, vec![point]).wait(true))
            .await
            .map_err(|e| KernelError::storage(format!("Qdrant upsert failed: {e}")))?;
        Ok(key)
    }

    async fn upsert_batch(&self, collection: &str, records: Vec<MemoryRecord>) -> Result<Vec<String>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(bad) = records
            .iter()
            .find(|r| r.dimensions() as u64 != self.vector_dimensions)
        {
            return Err(KernelError::storage(format!(
                "embedding dimension mismatch in collection '{collection}': expected {}, got {}",
                self.vector_dimensions,
                bad.dimensions()
            )));
        }

        self.create_collection(collection).await?;

        let keys: Vec<String> = records.iter().map(Self::record_key).collect();
        let points: Vec<PointStruct> = keys
            .iter()
            .zip(records.iter())
            .map(|(key, record)| Self::record_to_point(key, record))
            .collect();
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| KernelError::storage(format!("Qdrant batch upsert failed: {e}")))?;
        Ok(keys)
    }

    async fn get(&self, collection: &str, key: &str, with_embedding: bool) -> Result<Option<MemoryRecord>> {
        if !self.does_collection_exist(collection).await? {
            return Ok(None);
        }

        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(collection, vec![PointId::from(key_to_point_id(key))])
                    .with_payload(true)
                    .with_vectors(with_embedding),
            )
            .await
            .map_err(|e| KernelError::storage(format!("Qdrant get failed: {e}")))?;

        Ok(response.result.first().map(|point| {
            let embedding = if with_embedding {
                extract_vector(point.vectors.as_ref())
            } else {
                Vec::new()
            };
            Self::payload_to_record(collection, &point.payload, embedding)
        }))
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<()> {
        if !self.does_collection_exist(collection).await? {
            return Ok(());
        }

        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(PointsIdsList {
                        ids: vec![key_to_point_id(key).into()],
                    })
                    .wait(true),
            )
            .await
            .map_err(|e| KernelError::storage(format!("Qdrant delete failed: {e}")))?;
        Ok(())
    }

    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance_score: f64,
        with_embeddings: bool,
    ) -> Result<Vec<(MemoryRecord, f64)>> {
        if limit == 0 || !self.does_collection_exist(collection).await? {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .query(
                QueryPointsBuilder::new(collection)
                    .query(embedding.to_vec())
                    .limit(limit as u64)
                    .with_payload(true)
                    .with_vectors(with_embeddings),
            )
            .await
            .map_err(|e| KernelError::storage(format!("Qdrant search failed: {e}")))?;

        let mut matches: Vec<(MemoryRecord, f64)> = response
            .result
            .iter()
            .map(|point| {
                let vector = if with_embeddings {
                    extract_vector(point.vectors.as_ref())
                } else {
                    Vec::new()
                };
                (
                    Self::payload_to_record(collection, &point.payload, vector),
                    Self::relevance(self.metric, point.score),
                )
            })
            .filter(|(_, score)| *score >= min_relevance_score)
            .collect();

        matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(limit);
        Ok(matches)
    }
}
