// src/services/job_search.rs
//! Query building and job board access for the search service

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::JSearchConfig;
use crate::llm::{self, prompts, LanguageModel};
use crate::ranking::titles;
use crate::types::{Engine, JobPosting, Profile, SearchRequest, SearchResponse};

pub const FALLBACK_QUERY: &str = "developer jobs";
const DESCRIPTION_LIMIT: usize = 300;
const QUERY_SKILLS: usize = 3;

#[derive(Debug, Error)]
pub enum JobBoardError {
    #[error("job board unreachable: {0}")]
    Unavailable(#[source] reqwest::Error),

    #[error("job board returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid job board response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait JobBoard: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<JobPosting>, JobBoardError>;
}

/// JSearch (RapidAPI) client.
pub struct JSearchClient {
    client: reqwest::Client,
    config: JSearchConfig,
    host: String,
}

#[derive(Debug, Deserialize)]
struct JSearchPage {
    #[serde(default)]
    data: Vec<JSearchJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JSearchJob {
    job_id: Option<String>,
    job_title: Option<String>,
    employer_name: Option<String>,
    job_city: Option<String>,
    job_country: Option<String>,
    job_description: Option<String>,
    job_apply_link: Option<String>,
}

impl From<JSearchJob> for JobPosting {
    fn from(job: JSearchJob) -> Self {
        JobPosting {
            id: job.job_id,
            title: job.job_title.unwrap_or_default(),
            company: job.employer_name,
            location: job.job_city.or(job.job_country),
            description: truncate_chars(&job.job_description.unwrap_or_default(), DESCRIPTION_LIMIT),
            requirements: None,
            apply_link: job.job_apply_link,
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

impl JSearchClient {
    pub fn new(config: JSearchConfig, timeout: Duration) -> anyhow::Result<Self> {
        let host = reqwest::Url::parse(&config.url)
            .with_context(|| format!("Invalid JSEARCH_URL: {}", config.url))?
            .host_str()
            .context("JSEARCH_URL has no host")?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config,
            host,
        })
    }
}

#[async_trait]
impl JobBoard for JSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<JobPosting>, JobBoardError> {
        info!("Querying job board {} for: {}", self.host, query);

        let response = self
            .client
            .get(&self.config.url)
            .header("x-rapidapi-host", &self.host)
            .header("x-rapidapi-key", &self.config.api_key)
            .query(&[
                ("query", query),
                ("page", "1"),
                ("num_pages", "1"),
                ("country", self.config.country.as_str()),
                ("date_posted", "all"),
            ])
            .send()
            .await
            .map_err(JobBoardError::Unavailable)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(JobBoardError::Unavailable)?;

        if !status.is_success() {
            return Err(JobBoardError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_listings(&body)
    }
}

fn parse_listings(body: &str) -> Result<Vec<JobPosting>, JobBoardError> {
    let page: JSearchPage =
        serde_json::from_str(body).map_err(|e| JobBoardError::Decode(e.to_string()))?;
    Ok(page.data.into_iter().map(JobPosting::from).collect())
}

/// Deterministic query: first suggested title plus the leading skills.
pub fn heuristic_query(profile: &Profile, suggested_titles: &[String]) -> String {
    let mut words: Vec<String> = suggested_titles.iter().take(1).cloned().collect();
    words.extend(
        profile
            .skills
            .iter()
            .map(|skill| skill.trim())
            .filter(|skill| !skill.is_empty())
            .take(QUERY_SKILLS)
            .map(str::to_string),
    );

    if words.is_empty() {
        FALLBACK_QUERY.to_string()
    } else {
        words.join(" ")
    }
}

#[derive(Debug, Deserialize)]
struct ModelQuery {
    #[serde(default)]
    query: String,
}

#[derive(Clone)]
pub struct JobSearchService {
    model: Option<Arc<dyn LanguageModel>>,
    board: Option<Arc<dyn JobBoard>>,
}

impl JobSearchService {
    pub fn new(model: Option<Arc<dyn LanguageModel>>, board: Option<Arc<dyn JobBoard>>) -> Self {
        Self { model, board }
    }

    /// Returns the query and the engine that produced it.
    pub async fn build_query(&self, profile: &Profile, suggested_titles: &[String]) -> (String, Engine) {
        let Some(model) = &self.model else {
            return (heuristic_query(profile, suggested_titles), Engine::Heuristic);
        };

        let parts = prompts::search_query(profile, suggested_titles);
        match llm::generate_json::<ModelQuery>(model.as_ref(), &parts).await {
            Ok(reply) if !reply.query.trim().is_empty() => (reply.query.trim().to_string(), Engine::Gemini),
            Ok(_) => {
                warn!("Model returned an empty search query");
                (heuristic_query(profile, suggested_titles), Engine::Heuristic)
            }
            Err(e) => {
                warn!("Search query generation failed: {}", e);
                (heuristic_query(profile, suggested_titles), Engine::Heuristic)
            }
        }
    }

    /// Job board failures are errors; a missing board key is a degraded,
    /// empty result.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, JobBoardError> {
        let suggested_titles = if request.suggested_titles.is_empty() {
            titles::titles_for(&request.resume)
        } else {
            request.suggested_titles.clone()
        };

        let (query, engine) = self.build_query(&request.resume, &suggested_titles).await;

        let Some(board) = &self.board else {
            warn!("JSEARCH_API_KEY not configured; skipping job board query");
            return Ok(SearchResponse {
                query,
                engine,
                degraded: true,
                jobs: Vec::new(),
                warning: Some("JSEARCH_API_KEY not configured; no listings fetched".to_string()),
            });
        };

        let jobs = board.search(&query).await?;
        info!("Job board returned {} listings", jobs.len());

        Ok(SearchResponse {
            query,
            engine,
            degraded: !engine.is_model(),
            jobs,
            warning: None,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// In-memory board that records queries.
    pub struct StaticBoard {
        pub jobs: Vec<JobPosting>,
        pub fail_with: Option<u16>,
        pub queries: Mutex<Vec<String>>,
    }

    impl StaticBoard {
        pub fn with_jobs(jobs: Vec<JobPosting>) -> Self {
            Self {
                jobs,
                fail_with: None,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                jobs: Vec::new(),
                fail_with: Some(status),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JobBoard for StaticBoard {
        async fn search(&self, query: &str) -> Result<Vec<JobPosting>, JobBoardError> {
            self.queries.lock().unwrap().push(query.to_string());
            match self.fail_with {
                Some(status) => Err(JobBoardError::Status {
                    status,
                    body: "quota exceeded".to_string(),
                }),
                None => Ok(self.jobs.clone()),
            }
        }
    }
}
