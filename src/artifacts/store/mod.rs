
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Artifact, ArtifactKind, CampaignBrief, Feedback, GeneratedAd, Recommendation};
use crate::config::Config;
use crate::memory::MemoryError;

/// In-memory lookup tables for every artifact kind, keyed by artifact id
#[derive(Debug, Clone, Default)]
pub struct ArtifactCatalog {
    pub campaign_briefs: HashMap<String, CampaignBrief>,
    pub generated_ads: HashMap<String, GeneratedAd>,
    pub feedback: HashMap<String, Feedback>,
    pub recommendations: HashMap<String, Recommendation>,
}

impl ArtifactCatalog {
    #[inline]
    pub fn len(&self) -> usize {
        self.campaign_briefs.len()
            + self.generated_ads.len()
            + self.feedback.len()
            + self.recommendations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn count(&self, kind: ArtifactKind) -> usize {
        match kind {
            ArtifactKind::Brief => self.campaign_briefs.len(),
            ArtifactKind::Ad => self.generated_ads.len(),
            ArtifactKind::Feedback => self.feedback.len(),
            ArtifactKind::Recommendation => self.recommendations.len(),
        }
    }
}

/// JSON-file-per-record storage, one directory per artifact kind
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    campaign_briefs_dir: PathBuf,
    generated_ads_dir: PathBuf,
    feedback_dir: PathBuf,
    recommendations_dir: PathBuf,
}

impl ArtifactStore {
    #[inline]
    pub fn new(config: &Config) -> Self {
        Self {
            campaign_briefs_dir: config.campaign_briefs_dir(),
            generated_ads_dir: config.generated_ads_dir(),
            feedback_dir: config.feedback_dir(),
            recommendations_dir: config.recommendations_dir(),
        }
    }

    #[inline]
    pub fn dir_for(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Brief => &self.campaign_briefs_dir,
            ArtifactKind::Ad => &self.generated_ads_dir,
            ArtifactKind::Feedback => &self.feedback_dir,
            ArtifactKind::Recommendation => &self.recommendations_dir,
        }
    }

    /// Re-read every record on disk
    #[inline]
    pub fn load_catalog(&self) -> Result<ArtifactCatalog, MemoryError> {
        let catalog = ArtifactCatalog {
            campaign_briefs: self.load_kind()?,
            generated_ads: self.load_kind()?,
            feedback: self.load_kind()?,
            recommendations: self.load_kind()?,
        };

        info!(
            "Loaded {} artifacts ({} briefs, {} ads, {} feedback, {} recommendations)",
            catalog.len(),
            catalog.campaign_briefs.len(),
            catalog.generated_ads.len(),
            catalog.feedback.len(),
            catalog.recommendations.len()
        );

        Ok(catalog)
    }

    /// Write `artifact` to `{dir}/{id}.json`, returning the file path
    #[inline]
    pub fn save<A: Artifact>(&self, artifact: &A) -> Result<PathBuf, MemoryError> {
        let id = artifact.id();
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(MemoryError::Storage(format!(
                "Refusing to store {} with unsafe id {:?}",
                A::KIND,
                id
            )));
        }

        let dir = self.dir_for(A::KIND);
        fs::create_dir_all(dir).map_err(|e| {
            MemoryError::Storage(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let path = dir.join(format!("{}.json", id));
        let content = serde_json::to_string_pretty(artifact)?;
        fs::write(&path, content).map_err(|e| {
            MemoryError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!("Stored {} record at {}", A::KIND, path.display());
        Ok(path)
    }

    fn load_kind<A: Artifact>(&self) -> Result<HashMap<String, A>, MemoryError> {
        let dir = self.dir_for(A::KIND);
        let mut records = HashMap::new();

        if !dir.exists() {
            debug!("No {} directory at {}", A::KIND, dir.display());
            return Ok(records);
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            MemoryError::Storage(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            })
            .collect();
        paths.sort();

        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };

            match serde_json::from_str::<A>(&content) {
                Ok(record) => {
                    records.insert(record.id().to_string(), record);
                }
                Err(e) => {
                    warn!("Skipping malformed {} record {}: {}", A::KIND, path.display(), e);
                }
            }
        }

        Ok(records)
    }
}
