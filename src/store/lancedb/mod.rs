
use super::{ChunkMetadata, KnowledgeChunk, MetadataFilter, ScoredPassage, VectorStore};
use crate::config::SearchConfig;
use crate::{QaError, Result};
use arrow::array::{Array, Float32Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use tracing::{debug, info};

const TABLE_NAME: &str = "chunks";

/// LanceDB-backed knowledge base. The serving path is read-only: the table
/// is created and populated by the ingestion tooling, never here.
pub struct LanceVectorStore {
    connection: Connection,
    vector_dimension: usize,
}

impl LanceVectorStore {
    /// Open the knowledge base and verify that the stored vector dimension
    /// matches the configured embedding mode. Dimensionality is a
    /// pipeline-wide constant; a mismatch here would make every similarity
    /// score meaningless, so it is a startup error rather than a warning.
    #[inline]
    pub async fn new(config: &SearchConfig) -> Result<Self> {
        let db_path = config.vector_database_path();
        debug!("Opening LanceDB at path: {:?}", db_path);

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| QaError::VectorStore(format!("Failed to connect to LanceDB: {}", e)))?;

        let table_names = connection
            .table_names()
            .execute()
            .await
            .map_err(|e| QaError::VectorStore(format!("Failed to list tables: {}", e)))?;

        if !table_names.contains(&TABLE_NAME.to_string()) {
            return Err(QaError::VectorStore(format!(
                "Knowledge base table '{}' not found at {}; run the ingestion tooling first",
                TABLE_NAME,
                db_path.display()
            )));
        }

        let detected = detect_vector_dimension(&connection).await?;

        let configured = config.search.embedding_mode.dimension() as usize;
        if detected != configured {
            return Err(QaError::Config(format!(
                "Embedding mode expects {} dimensions but stored vectors have {}",
                configured, detected
            )));
        }

        info!(
            "Vector store opened with {} dimension embeddings",
            detected
        );
        Ok(Self {
            connection,
            vector_dimension: detected,
        })
    }

    async fn parse_results_stream(
        &self,
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<ScoredPassage>> {
        let mut passages = Vec::new();

        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| QaError::VectorStore(format!("Failed to read result stream: {}", e)))?
        {
            passages.extend(parse_search_batch(&batch)?);
        }

        debug!("Parsed {} passages from result stream", passages.len());
        Ok(passages)
    }
}

#[async_trait]
impl VectorStore for LanceVectorStore {
    #[inline]
    async fn similarity_search(
        &self,
        vector: &[f32],
        threshold: f32,
        top_k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<ScoredPassage>> {
        debug!("Searching for similar vectors with limit: {}", top_k);

        if vector.len() != self.vector_dimension {
            return Err(QaError::VectorStore(format!(
                "Query vector has {} dimensions, store has {}",
                vector.len(),
                self.vector_dimension
            )));
        }

        let table = self
            .connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| QaError::VectorStore(format!("Failed to open table: {}", e)))?;

        let mut query = table
            .vector_search(vector)
            .map_err(|e| QaError::VectorStore(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(top_k);

        if let Some(predicate) = build_filter_predicate(filter) {
            query = query.only_if(predicate);
        }

        let results = query
            .execute()
            .await
            .map_err(|e| QaError::VectorStore(format!("Failed to execute search: {}", e)))?;

        let mut passages = self.parse_results_stream(results).await?;
        passages.retain(|p| p.similarity >= threshold);
        Ok(passages)
    }
}

/// Read the fixed vector dimension out of the stored table schema.
async fn detect_vector_dimension(connection: &Connection) -> Result<usize> {
    let table = connection
        .open_table(TABLE_NAME)
        .execute()
        .await
        .map_err(|e| QaError::VectorStore(format!("Failed to open table: {}", e)))?;

    let schema = table
        .schema()
        .await
        .map_err(|e| QaError::VectorStore(format!("Failed to get table schema: {}", e)))?;

    for field in schema.fields() {
        if field.name() == "vector" {
            if let DataType::FixedSizeList(_, size) = field.data_type() {
                return Ok(*size as usize);
            }
        }
    }

    Err(QaError::VectorStore(
        "Could not find vector column or determine dimension".to_string(),
    ))
}

/// Build an SQL-style predicate for the metadata filter. Returns `None` for
/// the empty filter so an unfiltered search stays unrestricted.
fn build_filter_predicate(filter: &MetadataFilter) -> Option<String> {
    if filter.is_empty() {
        return None;
    }

    let mut clauses = Vec::new();
    if let Some(source_kind) = &filter.source_kind {
        clauses.push(format!("source_kind = '{}'", escape_literal(source_kind)));
    }
    if let Some(version) = &filter.version {
        clauses.push(format!("version = '{}'", escape_literal(version)));
    }
    Some(clauses.join(" AND "))
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| QaError::VectorStore(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| QaError::VectorStore(format!("Invalid {} column type", name)))
}

fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<ScoredPassage>> {
    let num_rows = batch.num_rows();
    let mut passages = Vec::with_capacity(num_rows);

    let ids = string_column(batch, "id")?;
    let texts = string_column(batch, "text")?;
    let titles = string_column(batch, "title")?;
    let urls = string_column(batch, "url")?;
    let categories = string_column(batch, "category")?;
    let versions = string_column(batch, "version")?;
    let source_kinds = string_column(batch, "source_kind")?;

    let quality_scores = batch
        .column_by_name("quality_score")
        .ok_or_else(|| QaError::VectorStore("Missing quality_score column".to_string()))?
        .as_any()
        .downcast_ref::<Float32Array>()
        .ok_or_else(|| QaError::VectorStore("Invalid quality_score column type".to_string()))?;

    // LanceDB appends the cosine distance of each hit as _distance
    let distances = batch
        .column_by_name("_distance")
        .map(|col| col.as_any().downcast_ref::<Float32Array>());

    let optional = |array: &StringArray, row: usize| -> Option<String> {
        if array.is_null(row) {
            None
        } else {
            Some(array.value(row).to_string())
        }
    };

    for row in 0..num_rows {
        let metadata = ChunkMetadata {
            title: titles.value(row).to_string(),
            url: optional(urls, row),
            category: optional(categories, row),
            version: optional(versions, row),
            source_kind: source_kinds.value(row).to_string(),
            quality_score: if quality_scores.is_null(row) {
                None
            } else {
                Some(quality_scores.value(row))
            },
        };

        let distance = distances
            .flatten()
            .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

        passages.push(ScoredPassage {
            chunk: KnowledgeChunk {
                id: ids.value(row).to_string(),
                text: texts.value(row).to_string(),
                metadata,
            },
            similarity: 1.0 - distance,
        });
    }

    debug!("Parsed {} search results", passages.len());
    Ok(passages)
}
