// Campaign artifacts
// Typed records for briefs, ads, feedback and recommendations, plus the
// prose flattening used for embedding them

pub mod store;

#[cfg(test)]
mod tests;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::variations::parse_variations;

pub use store::{ArtifactCatalog, ArtifactStore};

/// Small JSON object stored next to each index entry
pub type Metadata = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    #[serde(rename = "campaign_brief")]
    Brief,
    #[serde(rename = "generated_ad")]
    Ad,
    #[serde(rename = "feedback")]
    Feedback,
    #[serde(rename = "recommendation")]
    Recommendation,
}

impl ArtifactKind {
    pub const ALL: [Self; 4] = [Self::Brief, Self::Ad, Self::Feedback, Self::Recommendation];

    /// Value of the `type` field in index metadata
    #[inline]
    pub fn type_tag(self) -> &'static str {
        match self {
            Self::Brief => "campaign_brief",
            Self::Ad => "generated_ad",
            Self::Feedback => "feedback",
            Self::Recommendation => "recommendation",
        }
    }

    /// Prefix applied to artifact ids to form index item ids
    #[inline]
    pub fn item_prefix(self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Ad => "ad",
            Self::Feedback => "feedback",
            Self::Recommendation => "rec",
        }
    }

    /// Name of the JSON field holding the artifact's own id
    #[inline]
    pub fn id_field(self) -> &'static str {
        match self {
            Self::Brief => "brief_id",
            Self::Ad => "ad_id",
            Self::Feedback => "feedback_id",
            Self::Recommendation => "recommendation_id",
        }
    }

    #[inline]
    pub fn item_id(self, id: &str) -> String {
        format!("{}_{}", self.item_prefix(), id)
    }

    #[inline]
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_tag() == tag)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brief" | "campaign_brief" => Ok(Self::Brief),
            "ad" | "generated_ad" => Ok(Self::Ad),
            "feedback" => Ok(Self::Feedback),
            "rec" | "recommendation" => Ok(Self::Recommendation),
            other => Err(format!("unknown artifact kind: {}", other)),
        }
    }
}

/// Common behaviour of every stored artifact
pub trait Artifact: Serialize + DeserializeOwned {
    const KIND: ArtifactKind;

    fn id(&self) -> &str;

    fn created_at(&self) -> &str;

    /// Deterministic prose rendering of the payload, only used for embedding
    fn text_representation(&self) -> String;

    /// Snapshot stored alongside the embedding and returned by searches
    fn metadata(&self) -> Metadata;

    #[inline]
    fn item_id(&self) -> String {
        Self::KIND.item_id(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignBrief {
    pub brief_id: String,
    pub created_at: String,
    pub product_name: String,
    pub description: String,
    pub target_audience: String,
    pub campaign_goals: String,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub key_selling_points: Vec<String>,
    /// Fields this crate does not interpret, kept as written
    #[serde(flatten)]
    pub extra: Metadata,
}

impl CampaignBrief {
    #[inline]
    pub fn new(
        product_name: impl Into<String>,
        description: impl Into<String>,
        target_audience: impl Into<String>,
        campaign_goals: impl Into<String>,
    ) -> Self {
        Self {
            brief_id: new_id(),
            created_at: now(),
            product_name: product_name.into(),
            description: description.into(),
            target_audience: target_audience.into(),
            campaign_goals: campaign_goals.into(),
            tone: None,
            key_selling_points: Vec::new(),
            extra: Metadata::new(),
        }
    }

    #[inline]
    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    #[inline]
    pub fn with_key_selling_points(mut self, points: Vec<String>) -> Self {
        self.key_selling_points = points;
        self
    }
}

impl Artifact for CampaignBrief {
    const KIND: ArtifactKind = ArtifactKind::Brief;

    fn id(&self) -> &str {
        &self.brief_id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }

    fn text_representation(&self) -> String {
        format!(
            "Campaign Brief: {}\nDescription: {}\nTarget Audience: {}\nCampaign Goals: {}\nTone: {}\nKey Selling Points: {}",
            self.product_name,
            self.description,
            self.target_audience,
            self.campaign_goals,
            self.tone.as_deref().unwrap_or("Not specified"),
            self.key_selling_points.join(", ")
        )
    }

    fn metadata(&self) -> Metadata {
        object(json!({
            "type": Self::KIND.type_tag(),
            "brief_id": self.brief_id,
            "product_name": self.product_name,
            "created_at": self.created_at,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAd {
    pub ad_id: String,
    pub brief_id: String,
    pub created_at: String,
    pub ad_type: String,
    pub variations: Vec<String>,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl GeneratedAd {
    #[inline]
    pub fn new(
        brief_id: impl Into<String>,
        ad_type: impl Into<String>,
        variations: Vec<String>,
    ) -> Self {
        Self {
            ad_id: new_id(),
            brief_id: brief_id.into(),
            created_at: now(),
            ad_type: ad_type.into(),
            variations,
            extra: Metadata::new(),
        }
    }

    /// Build an ad from raw model output, extracting exactly `count` variations
    #[inline]
    pub fn from_generation(
        brief_id: impl Into<String>,
        ad_type: impl Into<String>,
        generated_text: &str,
        count: usize,
    ) -> Self {
        Self::new(brief_id, ad_type, parse_variations(generated_text, count))
    }
}

impl Artifact for GeneratedAd {
    const KIND: ArtifactKind = ArtifactKind::Ad;

    fn id(&self) -> &str {
        &self.ad_id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }

    fn text_representation(&self) -> String {
        format!(
            "Ad Type: {}\nVariations:\n{}",
            self.ad_type,
            self.variations.join(" ")
        )
    }

    fn metadata(&self) -> Metadata {
        object(json!({
            "type": Self::KIND.type_tag(),
            "ad_id": self.ad_id,
            "brief_id": self.brief_id,
            "ad_type": self.ad_type,
            "created_at": self.created_at,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub feedback_id: String,
    pub ad_id: String,
    pub brief_id: String,
    pub created_at: String,
    pub feedback: String,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub processed_feedback: Option<Value>,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl Feedback {
    #[inline]
    pub fn new(
        ad_id: impl Into<String>,
        brief_id: impl Into<String>,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            feedback_id: new_id(),
            ad_id: ad_id.into(),
            brief_id: brief_id.into(),
            created_at: now(),
            feedback: feedback.into(),
            score: None,
            processed_feedback: None,
            extra: Metadata::new(),
        }
    }

    #[inline]
    pub fn with_score(mut self, score: impl Into<Value>) -> Self {
        self.score = Some(score.into());
        self
    }

    #[inline]
    pub fn with_processed_feedback(mut self, processed: Value) -> Self {
        self.processed_feedback = Some(processed);
        self
    }
}

impl Artifact for Feedback {
    const KIND: ArtifactKind = ArtifactKind::Feedback;

    fn id(&self) -> &str {
        &self.feedback_id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }

    fn text_representation(&self) -> String {
        format!(
            "Feedback: {}\nScore: {}\nProcessed Feedback: {}",
            self.feedback,
            self.score
                .as_ref()
                .map_or_else(|| "Not provided".to_string(), display_value),
            self.processed_feedback
                .as_ref()
                .map_or_else(|| "{}".to_string(), display_value)
        )
    }

    fn metadata(&self) -> Metadata {
        object(json!({
            "type": Self::KIND.type_tag(),
            "feedback_id": self.feedback_id,
            "ad_id": self.ad_id,
            "brief_id": self.brief_id,
            "created_at": self.created_at,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommendation_id: String,
    pub brief_id: String,
    pub created_at: String,
    pub recommendations: Value,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl Recommendation {
    #[inline]
    pub fn new(brief_id: impl Into<String>, recommendations: Value) -> Self {
        Self {
            recommendation_id: new_id(),
            brief_id: brief_id.into(),
            created_at: now(),
            recommendations,
            extra: Metadata::new(),
        }
    }
}

impl Artifact for Recommendation {
    const KIND: ArtifactKind = ArtifactKind::Recommendation;

    fn id(&self) -> &str {
        &self.recommendation_id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }

    fn text_representation(&self) -> String {
        format!("Recommendations: {}", display_value(&self.recommendations))
    }

    fn metadata(&self) -> Metadata {
        object(json!({
            "type": Self::KIND.type_tag(),
            "recommendation_id": self.recommendation_id,
            "brief_id": self.brief_id,
            "created_at": self.created_at,
        }))
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Strings render bare, everything else as compact JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn object(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}
