// Flat L2 vector index
// Exhaustive nearest-neighbour search over every stored vector, plus the
// ordinal -> item id and item id -> metadata tables that give results meaning


use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::MemoryError;
use crate::artifacts::Metadata;
use crate::embeddings::{EmbeddingError, truncate_for_embedding};

const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Number of leading characters of an entry's text used as its lookup key
pub const TEXT_PREFIX_CHARS: usize = 100;

/// One search hit, before metadata resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub ordinal: usize,
    /// Squared Euclidean distance to the query
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    /// Row-major, `ordinal_ids.len() * dimension` values
    vectors: Vec<f32>,
    ordinal_ids: Vec<String>,
    prefix_to_id: HashMap<String, String>,
    id_to_metadata: HashMap<String, Metadata>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    dimension: usize,
    vectors: Vec<&'a [f32]>,
    ordinal_ids: &'a [String],
    prefix_to_id: &'a HashMap<String, String>,
    id_to_metadata: &'a HashMap<String, Metadata>,
}

#[derive(Deserialize)]
struct Snapshot {
    format_version: u32,
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    ordinal_ids: Vec<String>,
    prefix_to_id: HashMap<String, String>,
    id_to_metadata: HashMap<String, Metadata>,
}

impl VectorIndex {
    #[inline]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
            ordinal_ids: Vec::new(),
            prefix_to_id: HashMap::new(),
            id_to_metadata: HashMap::new(),
        }
    }

    /// Load the snapshot at `path`, or start empty when there is none
    #[inline]
    pub fn open(path: &Path, dimension: usize) -> Result<Self, MemoryError> {
        if !path.exists() {
            info!(
                "No memory index at {}, starting empty ({} dimensions)",
                path.display(),
                dimension
            );
            return Ok(Self::new(dimension));
        }

        let content = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            MemoryError::IndexCorruption(format!(
                "Failed to parse memory index {}: {}",
                path.display(),
                e
            ))
        })?;

        let index = Self::from_snapshot(snapshot, dimension)?;
        info!(
            "Loaded memory index from {} with {} entries",
            path.display(),
            index.len()
        );
        Ok(index)
    }

    fn from_snapshot(snapshot: Snapshot, dimension: usize) -> Result<Self, MemoryError> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(MemoryError::IndexCorruption(format!(
                "Unsupported snapshot format version {}",
                snapshot.format_version
            )));
        }

        if snapshot.dimension != dimension {
            return Err(MemoryError::IndexCorruption(format!(
                "Index was built with {} dimensions but {} are configured",
                snapshot.dimension, dimension
            )));
        }

        if snapshot.vectors.len() != snapshot.ordinal_ids.len() {
            return Err(MemoryError::IndexCorruption(format!(
                "{} vectors but {} ordinal ids",
                snapshot.vectors.len(),
                snapshot.ordinal_ids.len()
            )));
        }

        if let Some((ordinal, vector)) = snapshot
            .vectors
            .iter()
            .find_position(|vector| vector.len() != dimension)
        {
            return Err(MemoryError::IndexCorruption(format!(
                "Vector {} has {} dimensions, expected {}",
                ordinal,
                vector.len(),
                dimension
            )));
        }

        if let Some(item_id) = snapshot
            .ordinal_ids
            .iter()
            .find(|item_id| !snapshot.id_to_metadata.contains_key(*item_id))
        {
            return Err(MemoryError::IndexCorruption(format!(
                "Item {} has no metadata",
                item_id
            )));
        }

        Ok(Self {
            dimension,
            vectors: snapshot.vectors.into_iter().flatten().collect(),
            ordinal_ids: snapshot.ordinal_ids,
            prefix_to_id: snapshot.prefix_to_id,
            id_to_metadata: snapshot.id_to_metadata,
        })
    }

    /// Write the whole index to `path`, replacing the previous snapshot atomically
    #[inline]
    pub fn save(&self, path: &Path) -> Result<(), MemoryError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let snapshot = SnapshotRef {
            format_version: SNAPSHOT_FORMAT_VERSION,
            dimension: self.dimension,
            vectors: self.vectors.chunks(self.dimension.max(1)).collect(),
            ordinal_ids: &self.ordinal_ids,
            prefix_to_id: &self.prefix_to_id,
            id_to_metadata: &self.id_to_metadata,
        };

        let mut temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| {
            MemoryError::Storage(format!(
                "Failed to replace memory index {}: {}",
                path.display(),
                e.error
            ))
        })?;

        debug!("Saved memory index with {} entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Append `vector` and its mappings, returning the new ordinal
    #[inline]
    pub fn insert(
        &mut self,
        vector: &[f32],
        text: &str,
        item_id: &str,
        metadata: Metadata,
    ) -> Result<usize, MemoryError> {
        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            }
            .into());
        }

        if let Some(position) = vector.iter().position(|x| !x.is_finite()) {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Embedding component {} is not a finite number",
                position
            ))
            .into());
        }

        let ordinal = self.ordinal_ids.len();
        self.vectors.extend_from_slice(vector);
        self.ordinal_ids.push(item_id.to_string());
        self.prefix_to_id
            .insert(text_prefix(text).to_string(), item_id.to_string());
        self.id_to_metadata.insert(item_id.to_string(), metadata);

        Ok(ordinal)
    }

    /// Insert and write the snapshot to `path`.
    ///
    /// If the write fails the entry is removed again, leaving the index as it
    /// was before the call.
    #[inline]
    pub fn insert_and_save(
        &mut self,
        vector: &[f32],
        text: &str,
        item_id: &str,
        metadata: Metadata,
        path: &Path,
    ) -> Result<usize, MemoryError> {
        let prefix = text_prefix(text);
        let previous_prefix_owner = self.prefix_to_id.get(prefix).cloned();
        let previous_metadata = self.id_to_metadata.get(item_id).cloned();

        let ordinal = self.insert(vector, text, item_id, metadata)?;

        if let Err(e) = self.save(path) {
            self.vectors.truncate(ordinal * self.dimension);
            self.ordinal_ids.truncate(ordinal);
            match previous_prefix_owner {
                Some(owner) => self.prefix_to_id.insert(prefix.to_string(), owner),
                None => self.prefix_to_id.remove(prefix),
            };
            match previous_metadata {
                Some(previous) => self.id_to_metadata.insert(item_id.to_string(), previous),
                None => self.id_to_metadata.remove(item_id),
            };
            warn!("Discarded {} after failing to save the index", item_id);
            return Err(e);
        }

        Ok(ordinal)
    }

    /// The `k` closest entries to `query`, nearest first
    #[inline]
    pub fn nearest(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        if query.len() != self.dimension || k == 0 {
            return Vec::new();
        }

        self.vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(ordinal, vector)| Neighbor {
                ordinal,
                distance: squared_l2(query, vector),
            })
            .k_smallest_by(k, |a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then(a.ordinal.cmp(&b.ordinal))
            })
            .collect()
    }

    /// Item id stored at `ordinal`
    #[inline]
    pub fn item_id(&self, ordinal: usize) -> Option<&str> {
        self.ordinal_ids.get(ordinal).map(String::as_str)
    }

    #[inline]
    pub fn metadata(&self, item_id: &str) -> Option<&Metadata> {
        self.id_to_metadata.get(item_id)
    }

    /// Item id last recorded for text sharing the first 100 characters of `text`
    #[inline]
    pub fn item_for_text(&self, text: &str) -> Option<&str> {
        self.prefix_to_id.get(text_prefix(text)).map(String::as_str)
    }

    #[inline]
    pub fn vector(&self, ordinal: usize) -> Option<&[f32]> {
        let start = ordinal.checked_mul(self.dimension)?;
        self.vectors.get(start..start + self.dimension)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ordinal_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ordinal_ids.is_empty()
    }

    /// Number of distinct item ids with metadata
    #[inline]
    pub fn item_count(&self) -> usize {
        self.id_to_metadata.len()
    }
}

fn text_prefix(text: &str) -> &str {
    truncate_for_embedding(text, TEXT_PREFIX_CHARS)
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}
