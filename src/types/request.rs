// src/types/request.rs
//! Request bodies accepted by the services

use serde::{Deserialize, Serialize};

use super::{job::JobPosting, lenient, profile::Profile};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseRequest {
    pub raw_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankRequest {
    #[serde(default, deserialize_with = "lenient::embedded")]
    pub resume: Profile,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub jobs: Vec<JobPosting>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "lenient::embedded")]
    pub resume: Profile,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub suggested_titles: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterLength {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetterRequest {
    #[serde(default, deserialize_with = "lenient::embedded")]
    pub resume: Profile,
    #[serde(default)]
    pub job: JobPosting,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub length: LetterLength,
    #[serde(default = "enabled")]
    pub include_contact_header: bool,
    #[serde(default = "enabled")]
    pub include_links: bool,
}

impl CoverLetterRequest {
    pub fn new(resume: Profile, job: JobPosting) -> Self {
        Self {
            resume,
            job,
            tone: default_tone(),
            length: LetterLength::default(),
            include_contact_header: true,
            include_links: true,
        }
    }
}

/// Body of `/process_resume`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub raw_text: String,
    /// Caller-supplied postings to rank; when absent the pipeline ranks
    /// whatever its configured order provides.
    #[serde(default)]
    pub jobs: Option<Vec<JobPosting>>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub length: Option<LetterLength>,
}

fn default_tone() -> String {
    "professional".to_string()
}

fn enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cover_letter_defaults() {
        let request: CoverLetterRequest = serde_json::from_value(json!({
            "resume": {"name": "Grace"},
            "job": {"title": "Compiler Engineer"}
        }))
        .unwrap();

        assert_eq!(request.tone, "professional");
        assert_eq!(request.length, LetterLength::Medium);
        assert!(request.include_contact_header);
        assert!(request.include_links);
        assert_eq!(request.job.title, "Compiler Engineer");
    }

    #[test]
    fn test_rank_request_accepts_stringified_resume() {
        let request: RankRequest = serde_json::from_value(json!({
            "resume": "{\"skills\": [\"Go\"]}",
            "jobs": [{"title": "Go Developer"}]
        }))
        .unwrap();

        assert_eq!(request.resume.skills, vec!["Go"]);
        assert_eq!(request.jobs.len(), 1);
    }

    #[test]
    fn test_rank_request_without_jobs() {
        let request: RankRequest = serde_json::from_value(json!({"resume": {}})).unwrap();
        assert!(request.jobs.is_empty());
    }
}
