// Artifact memory
// Semantic recall over past campaign artifacts backed by a persisted flat L2
// index, plus keyed lookup of the full records

pub mod index;


use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::artifacts::{
    Artifact, ArtifactCatalog, ArtifactKind, ArtifactStore, CampaignBrief, Feedback, GeneratedAd,
    Metadata, Recommendation,
};
use crate::config::Config;
use crate::embeddings::{EmbeddingError, EmbeddingProvider, truncate_for_embedding};

pub use index::{Neighbor, TEXT_PREFIX_CHARS, VectorIndex};

pub const DEFAULT_SEARCH_RESULTS: usize = 5;
pub const DEFAULT_SIMILAR_CAMPAIGNS: usize = 3;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("Memory index is corrupt: {0}")]
    IndexCorruption(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metadata of a similar artifact, with its distance to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(skip)]
    pub item_id: String,
    #[serde(flatten)]
    pub metadata: Metadata,
    /// Squared L2 distance; lower is more similar
    pub similarity_score: f32,
}

impl SearchResult {
    #[inline]
    pub fn kind(&self) -> Option<ArtifactKind> {
        self.metadata
            .get("type")
            .and_then(Value::as_str)
            .and_then(ArtifactKind::from_type_tag)
    }

    /// Metadata with `similarity_score` merged in
    #[inline]
    pub fn into_metadata(self) -> Metadata {
        let mut metadata = self.metadata;
        metadata.insert(
            "similarity_score".to_string(),
            Value::from(f64::from(self.similarity_score)),
        );
        metadata
    }
}

/// Vector index plus the artifact records it describes.
///
/// Every mutation is flushed to disk before returning, so a crash never loses
/// an acknowledged `add`.
pub struct ArtifactMemory<E> {
    embedder: E,
    index: VectorIndex,
    index_path: PathBuf,
    max_input_chars: usize,
    store: ArtifactStore,
    catalog: ArtifactCatalog,
}

impl<E: EmbeddingProvider> ArtifactMemory<E> {
    /// Load the persisted index (or start empty) and rescan the artifact store
    #[inline]
    pub fn open(config: &Config, embedder: E) -> Result<Self, MemoryError> {
        let index_path = config.memory_index_path();
        let index = VectorIndex::open(&index_path, config.embedding.dimension as usize)?;

        let store = ArtifactStore::new(config);
        let catalog = store.load_catalog()?;

        info!(
            "Artifact memory ready: {} index entries, {} artifacts, provider {}",
            index.len(),
            catalog.len(),
            embedder.name()
        );

        Ok(Self {
            embedder,
            index,
            index_path,
            max_input_chars: config.embedding.max_input_chars,
            store,
            catalog,
        })
    }

    /// Embed `text` and append it to the index under `item_id`
    #[inline]
    pub fn add(
        &mut self,
        text: &str,
        metadata: Metadata,
        item_id: &str,
    ) -> Result<usize, MemoryError> {
        let embedding = self.embed(text)?;
        let ordinal = self.index.insert_and_save(
            &embedding,
            text,
            item_id,
            metadata,
            &self.index_path,
        )?;

        debug!("Indexed {} at ordinal {}", item_id, ordinal);
        Ok(ordinal)
    }

    /// Up to `k` indexed artifacts closest to `query`
    #[inline]
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>, MemoryError> {
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embed(query)?;

        let results: Vec<SearchResult> = self
            .index
            .nearest(&embedding, k)
            .into_iter()
            .filter_map(|neighbor| {
                let item_id = self.index.item_id(neighbor.ordinal)?;
                Some(SearchResult {
                    item_id: item_id.to_string(),
                    metadata: self.index.metadata(item_id).cloned().unwrap_or_default(),
                    similarity_score: neighbor.distance,
                })
            })
            .collect();

        debug!("Search returned {} of {} requested results", results.len(), k);
        Ok(results)
    }

    /// Campaign briefs among the `k` nearest matches for `description`
    #[inline]
    pub fn get_similar_campaigns(
        &self,
        description: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, MemoryError> {
        Ok(self
            .search(description, k)?
            .into_iter()
            .filter(|result| result.kind() == Some(ArtifactKind::Brief))
            .collect())
    }

    #[inline]
    pub fn add_campaign_brief(&mut self, brief: CampaignBrief) -> Result<(), MemoryError> {
        self.index_artifact(&brief)?;
        self.catalog
            .campaign_briefs
            .insert(brief.brief_id.clone(), brief);
        Ok(())
    }

    #[inline]
    pub fn add_generated_ad(&mut self, ad: GeneratedAd) -> Result<(), MemoryError> {
        self.index_artifact(&ad)?;
        self.catalog.generated_ads.insert(ad.ad_id.clone(), ad);
        Ok(())
    }

    #[inline]
    pub fn add_feedback(&mut self, feedback: Feedback) -> Result<(), MemoryError> {
        self.index_artifact(&feedback)?;
        self.catalog
            .feedback
            .insert(feedback.feedback_id.clone(), feedback);
        Ok(())
    }

    #[inline]
    pub fn add_recommendation(&mut self, recommendation: Recommendation) -> Result<(), MemoryError> {
        self.index_artifact(&recommendation)?;
        self.catalog
            .recommendations
            .insert(recommendation.recommendation_id.clone(), recommendation);
        Ok(())
    }

    fn index_artifact<A: Artifact>(&mut self, artifact: &A) -> Result<usize, MemoryError> {
        let text = artifact.text_representation();
        self.add(&text, artifact.metadata(), &artifact.item_id())
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let input = truncate_for_embedding(text, self.max_input_chars);
        let embedding = self.embedder.embed(input)?;

        if embedding.len() != self.index.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: embedding.len(),
            }
            .into());
        }

        Ok(embedding)
    }

    /// Write the index to disk
    #[inline]
    pub fn flush(&self) -> Result<(), MemoryError> {
        self.index.save(&self.index_path)
    }

    /// Flush and release the memory
    #[inline]
    pub fn close(self) -> Result<(), MemoryError> {
        self.flush()?;
        info!("Closed artifact memory at {}", self.index_path.display());
        Ok(())
    }
}

impl<E> ArtifactMemory<E> {
    #[inline]
    pub fn get_campaign_brief(&self, brief_id: &str) -> Option<&CampaignBrief> {
        self.catalog.campaign_briefs.get(brief_id)
    }

    #[inline]
    pub fn get_generated_ad(&self, ad_id: &str) -> Option<&GeneratedAd> {
        self.catalog.generated_ads.get(ad_id)
    }

    #[inline]
    pub fn get_feedback(&self, feedback_id: &str) -> Option<&Feedback> {
        self.catalog.feedback.get(feedback_id)
    }

    #[inline]
    pub fn get_recommendation(&self, recommendation_id: &str) -> Option<&Recommendation> {
        self.catalog.recommendations.get(recommendation_id)
    }

    /// Every generated ad that belongs to `brief_id`, oldest first
    #[inline]
    pub fn ads_for_brief(&self, brief_id: &str) -> Vec<&GeneratedAd> {
        let mut ads: Vec<&GeneratedAd> = self
            .catalog
            .generated_ads
            .values()
            .filter(|ad| ad.brief_id == brief_id)
            .collect();
        ads.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.ad_id.cmp(&b.ad_id)));
        ads
    }

    /// Every feedback record left on `ad_id`, oldest first
    #[inline]
    pub fn feedback_for_ad(&self, ad_id: &str) -> Vec<&Feedback> {
        let mut feedback: Vec<&Feedback> = self
            .catalog
            .feedback
            .values()
            .filter(|fb| fb.ad_id == ad_id)
            .collect();
        feedback.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.feedback_id.cmp(&b.feedback_id))
        });
        feedback
    }

    #[inline]
    pub fn catalog(&self) -> &ArtifactCatalog {
        &self.catalog
    }

    #[inline]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    #[inline]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[inline]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    #[inline]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}
