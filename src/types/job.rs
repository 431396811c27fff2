// src/types/job.rs
//! Job postings and their ranked form

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient::value_to_string;

/// A single job listing. Deserialization accepts the key spellings seen across
/// job boards and LLM output, and plain strings (either embedded JSON or free
/// text used as both title and description).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct JobPosting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_link: Option<String>,
}

impl From<Value> for JobPosting {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_object(&map),
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => Self::from_object(&map),
                _ => Self {
                    title: text.clone(),
                    description: text,
                    ..Self::default()
                },
            },
            _ => Self::default(),
        }
    }
}

impl JobPosting {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let pick = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|key| map.get(*key))
                .map(value_to_string)
                .find(|text| !text.trim().is_empty())
        };

        Self {
            id: pick(&["id", "job_id", "slug"]),
            title: pick(&["title", "role", "job_title"]).unwrap_or_default(),
            company: pick(&["company", "employer", "employer_name"]),
            location: pick(&["location"]),
            description: pick(&["description", "summary", "job_description"]).unwrap_or_default(),
            requirements: pick(&["requirements", "responsibilities", "skills"]),
            apply_link: pick(&["apply_link", "url", "job_apply_link"]),
        }
    }

    /// Title, description and requirements as one string, the text the scorer reads.
    pub fn searchable_text(&self) -> String {
        [
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            self.requirements.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A posting annotated with the score it received and its 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedJob {
    #[serde(flatten)]
    pub job: JobPosting,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub rank: usize,
    #[serde(default)]
    pub fit_summary: String,
    #[serde(default)]
    pub skill_alignment: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
}
