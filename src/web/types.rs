// src/web/types.rs
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::{GeminiClient, LanguageModel};
use crate::orchestrator::{HttpStages, Orchestrator};
use crate::ranking::Ranker;
use crate::services::{CoverLetterWriter, JSearchClient, JobBoard, JobSearchService, ResumeParser};

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Error,
}

/// Body of every locally produced error.
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: &str, suggestions: &[&str]) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code: error_code.to_string(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_status(self, status: Status) -> ApiError {
        Custom(status, Json(self))
    }
}

pub type ApiError = Custom<Json<StandardErrorResponse>>;

/// Everything the routes need, built once at startup.
pub struct ServerState {
    pub parser: ResumeParser,
    pub ranker: Ranker,
    pub search: JobSearchService,
    pub cover_letter: CoverLetterWriter,
    pub orchestrator: Orchestrator,
}

impl ServerState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let model: Option<Arc<dyn LanguageModel>> = match &config.gemini {
            Some(gemini) => Some(Arc::new(GeminiClient::new(gemini, config.timeout())?)),
            None => None,
        };
        let board: Option<Arc<dyn JobBoard>> = match &config.jsearch {
            Some(jsearch) => Some(Arc::new(JSearchClient::new(jsearch.clone(), config.timeout())?)),
            None => None,
        };
        let stages = HttpStages::new(&config.services, config.timeout())?;

        Ok(Self {
            parser: ResumeParser::new(model.clone()),
            ranker: Ranker::select(model.clone()),
            search: JobSearchService::new(model.clone(), board),
            cover_letter: CoverLetterWriter::new(model, config.output_dir.clone()),
            orchestrator: Orchestrator::new(
                Arc::new(stages),
                config.pipeline_order,
                config.save_cover_letter,
            ),
        })
    }
}
