use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown wherever the subject's name is absent or blank.
pub const UNKNOWN_NAME: &str = "unknown";

// ────────────────────────────────────────────────────────────────────────────
// Tag category
// ────────────────────────────────────────────────────────────────────────────

/// Category of an extracted attribute. The wire form is the upper-case
/// variant name; anything else is kept verbatim in `Other` so a dump
/// reproduces exactly what the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TagCategory {
    Skill,
    Interest,
    Position,
    Field,
    Motto,
    Other(String),
}

impl TagCategory {
    /// Bucket order used by both the terminal view and the document export.
    pub const DISPLAY_ORDER: [TagCategory; 5] = [
        TagCategory::Motto,
        TagCategory::Position,
        TagCategory::Field,
        TagCategory::Skill,
        TagCategory::Interest,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TagCategory::Skill => "SKILL",
            TagCategory::Interest => "INTEREST",
            TagCategory::Position => "POSITION",
            TagCategory::Field => "FIELD",
            TagCategory::Motto => "MOTTO",
            TagCategory::Other(raw) => raw,
        }
    }
}

impl From<String> for TagCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "SKILL" => TagCategory::Skill,
            "INTEREST" => TagCategory::Interest,
            "POSITION" => TagCategory::Position,
            "FIELD" => TagCategory::Field,
            "MOTTO" => TagCategory::Motto,
            _ => TagCategory::Other(raw),
        }
    }
}

impl From<TagCategory> for String {
    fn from(category: TagCategory) -> Self {
        match category {
            TagCategory::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire structures
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: TagCategory,
    #[serde(default)]
    pub confidence: f64,
    /// Nominally 0 to 10. Kept exactly as sent; see `display_score`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Tag {
    pub const MAX_SCORE: f64 = 10.0;

    /// The score clamped to `0..=10` and rounded to one decimal, for display.
    pub fn display_score(&self) -> Option<f64> {
        self.score
            .filter(|s| s.is_finite())
            .map(|s| (s.clamp(0.0, Self::MAX_SCORE) * 10.0).round() / 10.0)
    }
}

/// Opaque display strings; nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl PersonalInfo {
    /// The subject's name if it holds anything besides whitespace.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNKNOWN_NAME)
    }
}

/// An analysis as it arrives on the wire, before the well-formedness check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("analysis result is missing {}", .missing.join(" and "))]
pub struct IncompleteAnalysis {
    pub missing: Vec<&'static str>,
}

impl RawAnalysis {
    /// Both halves must be present; an empty tag list still counts as present.
    pub fn into_result(self) -> Result<AnalysisResult, IncompleteAnalysis> {
        match (self.personal_info, self.tags) {
            (Some(personal_info), Some(tags)) => Ok(AnalysisResult {
                personal_info,
                tags,
                raw_content: self.raw_content,
            }),
            (personal_info, tags) => {
                let mut missing = Vec::new();
                if personal_info.is_none() {
                    missing.push("personalInfo");
                }
                if tags.is_none() {
                    missing.push("tags");
                }
                Err(IncompleteAnalysis { missing })
            }
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.personal_info.is_some() && self.tags.is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validated result
// ────────────────────────────────────────────────────────────────────────────

/// A well-formed analysis. Fields are read-only once constructed; a session
/// drops the whole value on reset rather than editing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAnalysis", into = "RawAnalysis")]
pub struct AnalysisResult {
    personal_info: PersonalInfo,
    tags: Vec<Tag>,
    raw_content: Option<String>,
}

impl AnalysisResult {
    pub fn new(personal_info: PersonalInfo, tags: Vec<Tag>, raw_content: Option<String>) -> Self {
        Self {
            personal_info,
            tags,
            raw_content,
        }
    }

    pub fn personal_info(&self) -> &PersonalInfo {
        &self.personal_info
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn raw_content(&self) -> Option<&str> {
        self.raw_content.as_deref()
    }

    /// Keeps the submitted text alongside the result when the server did not echo it.
    pub fn with_raw_content_if_absent(mut self, text: &str) -> Self {
        if self.raw_content.is_none() {
            self.raw_content = Some(text.to_string());
        }
        self
    }
}

impl TryFrom<RawAnalysis> for AnalysisResult {
    type Error = IncompleteAnalysis;

    fn try_from(raw: RawAnalysis) -> Result<Self, Self::Error> {
        raw.into_result()
    }
}

impl From<AnalysisResult> for RawAnalysis {
    fn from(result: AnalysisResult) -> Self {
        RawAnalysis {
            personal_info: Some(result.personal_info),
            tags: Some(result.tags),
            raw_content: result.raw_content,
        }
    }
}

/// Response envelope shared by every analysis endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}
