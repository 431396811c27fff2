use serde::{Deserialize, Serialize};

use super::{
    job::{JobPosting, RankedJob},
    profile::Profile,
};

/// Which path produced a result. Anything other than `Gemini` means the
/// deterministic fallback ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    Gemini,
    FallbackKeyword,
    ResumeAnalyzer,
    Template,
    Heuristic,
    Empty,
    #[serde(other)]
    Unknown,
}

impl Engine {
    pub fn is_model(self) -> bool {
        matches!(self, Engine::Gemini)
    }
}

// ===== Service Response Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    #[serde(flatten)]
    pub profile: Profile,
    pub engine: Engine,
    #[serde(default)]
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResponse {
    pub engine: Engine,
    #[serde(default)]
    pub degraded: bool,
    #[serde(default)]
    pub ranked_jobs: Vec<RankedJob>,
    #[serde(default)]
    pub suggested_titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub engine: Engine,
    #[serde(default)]
    pub degraded: bool,
    #[serde(default)]
    pub jobs: Vec<JobPosting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLetterResponse {
    pub cover_letter_text: String,
    #[serde(default, alias = "docx_path")]
    pub file_path: Option<String>,
    pub used_engine: Engine,
    #[serde(default)]
    pub degraded: bool,
}
