// src/orchestrator/mod.rs
//! Sequential parse → rank → search → draft pipeline over the services.
//!
//! Each stage either succeeds or stops the run. A failed run reports the
//! stage that failed, the upstream error as received, and every output that
//! was completed before it.

pub mod error;
pub mod stage_client;

pub use error::{Stage, StageError};
pub use stage_client::{HttpStages, StageClient};

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::PipelineOrder;
use crate::ranking::titles;
use crate::types::{
    CoverLetterRequest, CoverLetterResponse, JobPosting, ParsedResume, ProcessRequest,
    RankRequest, RankResponse, SearchRequest, SearchResponse,
};

#[async_trait]
pub trait PipelineStages: Send + Sync {
    async fn parse(&self, raw_text: &str) -> Result<ParsedResume, StageError>;
    async fn rank(&self, request: &RankRequest) -> Result<RankResponse, StageError>;
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, StageError>;
    async fn draft(
        &self,
        request: &CoverLetterRequest,
        save_file: bool,
    ) -> Result<CoverLetterResponse, StageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Completed,
    Failed,
}

/// Stage outputs gathered so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_resume: Option<ParsedResume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranked_jobs: Option<RankResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_search: Option<SearchResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<CoverLetterResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowResult {
    pub workflow_id: Uuid,
    pub status: WorkflowStatus,
    pub parsed_resume: ParsedResume,
    pub ranked_jobs: RankResponse,
    pub job_search: SearchResponse,
    pub cover_letter: CoverLetterResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowFailure {
    pub workflow_id: Uuid,
    pub status: WorkflowStatus,
    pub failed_stage: Stage,
    pub error: StageError,
    #[serde(flatten)]
    pub completed: PartialResults,
}

#[derive(Clone)]
pub struct Orchestrator {
    stages: Arc<dyn PipelineStages>,
    order: PipelineOrder,
    save_cover_letter: bool,
}

impl Orchestrator {
    pub fn new(stages: Arc<dyn PipelineStages>, order: PipelineOrder, save_cover_letter: bool) -> Self {
        Self {
            stages,
            order,
            save_cover_letter,
        }
    }

    pub async fn run(&self, request: ProcessRequest) -> Result<WorkflowResult, WorkflowFailure> {
        let workflow_id = Uuid::new_v4();
        let span = info_span!("workflow", workflow_id = %workflow_id);

        async move {
            info!("Starting workflow ({:?})", self.order);
            let result = self.run_stages(workflow_id, request).await;
            match &result {
                Ok(_) => info!("Workflow completed"),
                Err(failure) => warn!("Workflow failed at {}: {}", failure.failed_stage, failure.error),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        workflow_id: Uuid,
        request: ProcessRequest,
    ) -> Result<WorkflowResult, WorkflowFailure> {
        let mut done = PartialResults::default();
        let fail = |stage: Stage, error: StageError, completed: PartialResults| WorkflowFailure {
            workflow_id,
            status: WorkflowStatus::Failed,
            failed_stage: stage,
            error,
            completed,
        };

        let parsed = match self.stages.parse(&request.raw_text).await {
            Ok(parsed) => parsed,
            Err(e) => return Err(fail(Stage::Parse, e, done)),
        };
        done.parsed_resume = Some(parsed.clone());
        let profile = parsed.profile.clone();

        let search_first = request.jobs.is_none() && self.order == PipelineOrder::SearchFirst;

        let (ranked, search) = if search_first {
            let search_request = SearchRequest {
                resume: profile.clone(),
                suggested_titles: titles::titles_for(&profile),
            };
            let search = match self.stages.search(&search_request).await {
                Ok(search) => search,
                Err(e) => return Err(fail(Stage::Search, e, done)),
            };
            done.job_search = Some(search.clone());

            let rank_request = RankRequest {
                resume: profile.clone(),
                jobs: search.jobs.clone(),
            };
            let ranked = match self.stages.rank(&rank_request).await {
                Ok(ranked) => ranked,
                Err(e) => return Err(fail(Stage::Rank, e, done)),
            };
            done.ranked_jobs = Some(ranked.clone());
            (ranked, search)
        } else {
            let rank_request = RankRequest {
                resume: profile.clone(),
                jobs: request.jobs.clone().unwrap_or_default(),
            };
            let ranked = match self.stages.rank(&rank_request).await {
                Ok(ranked) => ranked,
                Err(e) => return Err(fail(Stage::Rank, e, done)),
            };
            done.ranked_jobs = Some(ranked.clone());

            let suggested_titles = if ranked.suggested_titles.is_empty() {
                titles::titles_for(&profile)
            } else {
                ranked.suggested_titles.clone()
            };
            let search_request = SearchRequest {
                resume: profile.clone(),
                suggested_titles,
            };
            let search = match self.stages.search(&search_request).await {
                Ok(search) => search,
                Err(e) => return Err(fail(Stage::Search, e, done)),
            };
            done.job_search = Some(search.clone());
            (ranked, search)
        };

        let mut letter_request = CoverLetterRequest::new(profile, select_job(&ranked, &search));
        if let Some(tone) = request.tone {
            letter_request.tone = tone;
        }
        if let Some(length) = request.length {
            letter_request.length = length;
        }

        let cover_letter = match self.stages.draft(&letter_request, self.save_cover_letter).await {
            Ok(letter) => letter,
            Err(e) => return Err(fail(Stage::Draft, e, done)),
        };

        Ok(WorkflowResult {
            workflow_id,
            status: WorkflowStatus::Completed,
            parsed_resume: parsed,
            ranked_jobs: ranked,
            job_search: search,
            cover_letter,
        })
    }
}

/// The top ranked job, else the first search result, else an empty posting.
fn select_job(ranked: &RankResponse, search: &SearchResponse) -> JobPosting {
    ranked
        .ranked_jobs
        .first()
        .map(|top| top.job.clone())
        .or_else(|| search.jobs.first().cloned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::Ranker;
    use crate::types::{Engine, LetterLength, Profile};
    use serde_json::json;
    use std::sync::Mutex;

    /// In-process stages: real keyword ranking, canned everything else.
    struct FakeStages {
        profile: Profile,
        listings: Vec<JobPosting>,
        fail_at: Option<Stage>,
        calls: Mutex<Vec<Stage>>,
        letters: Mutex<Vec<(CoverLetterRequest, bool)>>,
    }

    impl FakeStages {
        fn new(skills: &[&str], listings: Vec<JobPosting>) -> Self {
            Self {
                profile: Profile {
                    name: Some("Jane Doe".to_string()),
                    skills: skills.iter().map(|s| s.to_string()).collect(),
                    ..Profile::default()
                },
                listings,
                fail_at: None,
                calls: Mutex::new(Vec::new()),
                letters: Mutex::new(Vec::new()),
            }
        }

        fn failing_at(mut self, stage: Stage) -> Self {
            self.fail_at = Some(stage);
            self
        }

        fn record(&self, stage: Stage) -> Result<(), StageError> {
            self.calls.lock().unwrap().push(stage);
            if self.fail_at == Some(stage) {
                return Err(StageError::UpstreamError {
                    service: stage.to_string().to_lowercase(),
                    url: "http://127.0.0.1:9100".to_string(),
                    status: 503,
                    body: json!({"detail": "upstream down"}),
                    detail: None,
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<Stage> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PipelineStages for FakeStages {
        async fn parse(&self, _raw_text: &str) -> Result<ParsedResume, StageError> {
            self.record(Stage::Parse)?;
            Ok(ParsedResume {
                profile: self.profile.clone(),
                engine: Engine::Gemini,
                degraded: false,
            })
        }

        async fn rank(&self, request: &RankRequest) -> Result<RankResponse, StageError> {
            self.record(Stage::Rank)?;
            Ok(Ranker::select(None).rank(&request.resume, &request.jobs).await)
        }

        async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, StageError> {
            self.record(Stage::Search)?;
            Ok(SearchResponse {
                query: request.suggested_titles.join(" "),
                engine: Engine::Heuristic,
                degraded: true,
                jobs: self.listings.clone(),
                warning: None,
            })
        }

        async fn draft(
            &self,
            request: &CoverLetterRequest,
            save_file: bool,
        ) -> Result<CoverLetterResponse, StageError> {
            self.record(Stage::Draft)?;
            self.letters.lock().unwrap().push((request.clone(), save_file));
            Ok(CoverLetterResponse {
                cover_letter_text: format!("Dear {}", request.job.title),
                file_path: None,
                used_engine: Engine::Template,
                degraded: true,
            })
        }
    }

    fn caller_jobs() -> Vec<JobPosting> {
        vec![
            JobPosting::new("Frontend Dev", "React and CSS"),
            JobPosting::new("Cloud Dev", "Python services on AWS"),
        ]
    }

    fn request(jobs: Option<Vec<JobPosting>>) -> ProcessRequest {
        ProcessRequest {
            raw_text: "Jane Doe. Python, AWS.".to_string(),
            jobs,
            tone: None,
            length: None,
        }
    }

    #[tokio::test]
    async fn test_completed_workflow_drafts_for_top_job() {
        let stages = Arc::new(FakeStages::new(&["python", "aws"], Vec::new()));
        let orchestrator = Orchestrator::new(stages.clone(), PipelineOrder::RankFirst, false);

        let result = orchestrator.run(request(Some(caller_jobs()))).await.unwrap();

        assert_eq!(result.status, WorkflowStatus::Completed);
        assert_eq!(
            stages.calls(),
            vec![Stage::Parse, Stage::Rank, Stage::Search, Stage::Draft]
        );
        assert_eq!(result.ranked_jobs.ranked_jobs[0].job.title, "Cloud Dev");
        assert_eq!(result.ranked_jobs.ranked_jobs[0].score, 2.0);
        assert_eq!(result.cover_letter.cover_letter_text, "Dear Cloud Dev");

        let letters = stages.letters.lock().unwrap();
        assert_eq!(letters[0].0.resume.display_name(), "Jane Doe");
        assert!(!letters[0].1);
    }

    #[tokio::test]
    async fn test_search_failure_keeps_earlier_outputs() {
        let stages = Arc::new(FakeStages::new(&["python"], Vec::new()).failing_at(Stage::Search));
        let orchestrator = Orchestrator::new(stages.clone(), PipelineOrder::RankFirst, false);

        let failure = orchestrator.run(request(Some(caller_jobs()))).await.unwrap_err();

        assert_eq!(failure.failed_stage, Stage::Search);
        assert_eq!(stages.calls(), vec![Stage::Parse, Stage::Rank, Stage::Search]);

        let body = serde_json::to_value(&failure).unwrap();
        assert_eq!(body["status"], "failed");
        assert_eq!(body["failed_stage"], "SEARCH");
        assert_eq!(body["error"]["status"], 503);
        assert_eq!(body["error"]["body"], json!({"detail": "upstream down"}));
        assert!(body.get("parsed_resume").is_some());
        assert!(body.get("ranked_jobs").is_some());
        assert!(body.get("job_search").is_none());
        assert!(body.get("cover_letter").is_none());
    }

    #[tokio::test]
    async fn test_parse_failure_has_no_outputs() {
        let stages = Arc::new(FakeStages::new(&[], Vec::new()).failing_at(Stage::Parse));
        let orchestrator = Orchestrator::new(stages.clone(), PipelineOrder::RankFirst, false);

        let failure = orchestrator.run(request(None)).await.unwrap_err();

        assert_eq!(failure.failed_stage, Stage::Parse);
        assert_eq!(failure.completed, PartialResults::default());
        assert_eq!(stages.calls(), vec![Stage::Parse]);
    }

    #[tokio::test]
    async fn test_search_first_ranks_search_results() {
        let listings = vec![
            JobPosting::new("Data Analyst", "Excel reporting"),
            JobPosting::new("Platform Engineer", "Terraform on AWS"),
        ];
        let stages = Arc::new(FakeStages::new(&["aws", "terraform"], listings));
        let orchestrator = Orchestrator::new(stages.clone(), PipelineOrder::SearchFirst, true);

        let result = orchestrator.run(request(None)).await.unwrap();

        assert_eq!(
            stages.calls(),
            vec![Stage::Parse, Stage::Search, Stage::Rank, Stage::Draft]
        );
        assert_eq!(result.job_search.query, "Cloud Engineer");
        assert_eq!(result.ranked_jobs.ranked_jobs[0].job.title, "Platform Engineer");
        assert!(stages.letters.lock().unwrap()[0].1);
    }

    #[tokio::test]
    async fn test_caller_jobs_override_search_first() {
        let stages = Arc::new(FakeStages::new(&["python"], Vec::new()));
        let orchestrator = Orchestrator::new(stages.clone(), PipelineOrder::SearchFirst, false);

        orchestrator.run(request(Some(caller_jobs()))).await.unwrap();

        assert_eq!(
            stages.calls(),
            vec![Stage::Parse, Stage::Rank, Stage::Search, Stage::Draft]
        );
    }

    #[tokio::test]
    async fn test_draft_falls_back_to_search_results_and_overrides() {
        let listings = vec![JobPosting::new("Listed Role", "")];
        let stages = Arc::new(FakeStages::new(&["go"], listings));
        let orchestrator = Orchestrator::new(stages.clone(), PipelineOrder::RankFirst, false);

        let mut process = request(None);
        process.tone = Some("enthusiastic".to_string());
        process.length = Some(LetterLength::Short);
        let result = orchestrator.run(process).await.unwrap();

        assert!(result.ranked_jobs.ranked_jobs.is_empty());
        let letters = stages.letters.lock().unwrap();
        assert_eq!(letters[0].0.job.title, "Listed Role");
        assert_eq!(letters[0].0.tone, "enthusiastic");
        assert_eq!(letters[0].0.length, LetterLength::Short);
    }

    #[test]
    fn test_select_job_defaults_to_empty_posting() {
        let ranked = RankResponse {
            engine: Engine::ResumeAnalyzer,
            degraded: false,
            ranked_jobs: Vec::new(),
            suggested_titles: Vec::new(),
        };
        let search = SearchResponse {
            query: String::new(),
            engine: Engine::Heuristic,
            degraded: true,
            jobs: Vec::new(),
            warning: None,
        };
        assert_eq!(select_job(&ranked, &search), JobPosting::default());
    }
}
