// src/ranking/ranker.rs
//! Orders postings by score using one scoring strategy per batch.
//!
//! The strategy is chosen once, from whether a model is configured. If the
//! model path fails for a batch, the whole batch is re-scored with the keyword
//! heuristic: model and keyword scores never share a ranking.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::{self, prompts, LanguageModel, LlmError};
use crate::types::{Engine, JobPosting, Profile, RankResponse, RankedJob};

use super::{scorer, titles};

const KEYWORD_FIT_SUMMARY: &str = "Keyword overlap heuristic";

/// Score and explanation for the job at the same index of the input batch.
#[derive(Debug, Clone, PartialEq)]
pub struct JobScore {
    pub score: f64,
    pub fit_summary: String,
    pub skill_alignment: Vec<String>,
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchScores {
    /// One entry per input job, in input order.
    pub scores: Vec<JobScore>,
    pub suggested_titles: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error("model scored {scored} of {expected} jobs")]
    Incomplete { scored: usize, expected: usize },
}

#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    fn engine(&self) -> Engine;

    async fn score_batch(
        &self,
        profile: &Profile,
        jobs: &[JobPosting],
    ) -> Result<BatchScores, ScoringError>;
}

/// Keyword overlap via [`scorer::keyword_match`]. Never fails.
pub struct HeuristicFallback;

impl HeuristicFallback {
    pub fn scores(profile: &Profile, jobs: &[JobPosting]) -> Vec<JobScore> {
        jobs.iter()
            .map(|job| {
                let found = scorer::keyword_match(profile, job);
                JobScore {
                    score: found.score as f64,
                    fit_summary: KEYWORD_FIT_SUMMARY.to_string(),
                    skill_alignment: found.matched,
                    gaps: Vec::new(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl ScoringStrategy for HeuristicFallback {
    fn engine(&self) -> Engine {
        Engine::FallbackKeyword
    }

    async fn score_batch(
        &self,
        profile: &Profile,
        jobs: &[JobPosting],
    ) -> Result<BatchScores, ScoringError> {
        Ok(BatchScores {
            scores: Self::scores(profile, jobs),
            suggested_titles: Vec::new(),
        })
    }
}

/// One model call scores the whole batch.
pub struct ModelBacked {
    model: Arc<dyn LanguageModel>,
}

#[derive(Debug, Deserialize)]
struct ModelRanking {
    #[serde(default)]
    scores: Vec<ModelScore>,
    #[serde(default)]
    suggested_titles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ModelScore {
    index: usize,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    fit_summary: String,
    #[serde(default)]
    skill_alignment: Vec<String>,
    #[serde(default)]
    gaps: Vec<String>,
}

impl ModelBacked {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ScoringStrategy for ModelBacked {
    fn engine(&self) -> Engine {
        Engine::Gemini
    }

    async fn score_batch(
        &self,
        profile: &Profile,
        jobs: &[JobPosting],
    ) -> Result<BatchScores, ScoringError> {
        let parts = prompts::rank_jobs(profile, jobs);
        let ranking: ModelRanking = llm::generate_json(self.model.as_ref(), &parts).await?;

        let mut slots: Vec<Option<JobScore>> = vec![None; jobs.len()];
        for entry in ranking.scores {
            match slots.get_mut(entry.index) {
                Some(slot) if slot.is_none() => {
                    *slot = Some(JobScore {
                        score: clamp_unit(entry.score),
                        fit_summary: entry.fit_summary,
                        skill_alignment: entry.skill_alignment,
                        gaps: entry.gaps,
                    });
                }
                Some(_) => warn!("Model scored job {} twice; keeping the first", entry.index),
                None => warn!("Model returned unknown job index {}", entry.index),
            }
        }

        let scored = slots.iter().filter(|slot| slot.is_some()).count();
        let scores: Option<Vec<JobScore>> = slots.into_iter().collect();
        match scores {
            Some(scores) => Ok(BatchScores {
                scores,
                suggested_titles: ranking.suggested_titles,
            }),
            None => Err(ScoringError::Incomplete {
                scored,
                expected: jobs.len(),
            }),
        }
    }
}

fn clamp_unit(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Stable descending sort by score; ranks are the 1-based positions.
/// `scores[i]` belongs to `jobs[i]`.
pub fn rank_scored(jobs: &[JobPosting], scores: Vec<JobScore>) -> Vec<RankedJob> {
    let mut ranked: Vec<RankedJob> = jobs
        .iter()
        .cloned()
        .zip(scores)
        .map(|(job, scored)| RankedJob {
            job,
            score: scored.score,
            rank: 0,
            fit_summary: scored.fit_summary,
            skill_alignment: scored.skill_alignment,
            gaps: scored.gaps,
        })
        .collect();

    // sort_by is stable: equal scores keep their input order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    for (position, job) in ranked.iter_mut().enumerate() {
        job.rank = position + 1;
    }
    ranked
}

/// Keyword-only ranking. Pure and synchronous.
pub fn rank(profile: &Profile, jobs: &[JobPosting]) -> Vec<RankedJob> {
    rank_scored(jobs, HeuristicFallback::scores(profile, jobs))
}

/// Ranking entry point for the rank service.
#[derive(Clone)]
pub struct Ranker {
    strategy: Arc<dyn ScoringStrategy>,
}

impl Ranker {
    /// Capability check: a configured model selects the model-backed strategy.
    pub fn select(model: Option<Arc<dyn LanguageModel>>) -> Self {
        match model {
            Some(model) => Self::with_strategy(Arc::new(ModelBacked::new(model))),
            None => {
                info!("Gemini unavailable: ranking with keyword overlap");
                Self::with_strategy(Arc::new(HeuristicFallback))
            }
        }
    }

    pub fn with_strategy(strategy: Arc<dyn ScoringStrategy>) -> Self {
        Self { strategy }
    }

    pub fn engine(&self) -> Engine {
        self.strategy.engine()
    }

    pub async fn rank(&self, profile: &Profile, jobs: &[JobPosting]) -> RankResponse {
        if jobs.is_empty() {
            return RankResponse {
                engine: Engine::ResumeAnalyzer,
                degraded: false,
                ranked_jobs: Vec::new(),
                suggested_titles: titles::titles_for(profile),
            };
        }

        let (engine, batch) = match self.strategy.score_batch(profile, jobs).await {
            Ok(batch) => (self.strategy.engine(), batch),
            Err(e) => {
                warn!("{:?} scoring failed, re-scoring batch with keywords: {}", self.strategy.engine(), e);
                (
                    Engine::FallbackKeyword,
                    BatchScores {
                        scores: HeuristicFallback::scores(profile, jobs),
                        suggested_titles: Vec::new(),
                    },
                )
            }
        };

        let suggested_titles = if batch.suggested_titles.is_empty() {
            titles::titles_for(profile)
        } else {
            batch.suggested_titles
        };

        info!("Ranked {} jobs with engine {:?}", jobs.len(), engine);

        RankResponse {
            engine,
            degraded: !engine.is_model(),
            ranked_jobs: rank_scored(jobs, batch.scores),
            suggested_titles,
        }
    }
}
