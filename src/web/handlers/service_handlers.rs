// src/web/handlers/service_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use crate::services::JobBoardError;
use crate::types::{
    CoverLetterRequest, CoverLetterResponse, ParseRequest, ParsedResume, RankRequest,
    RankResponse, SearchRequest, SearchResponse,
};
use crate::web::types::*;

pub async fn parse_resume_handler(
    request: Json<ParseRequest>,
    state: &State<ServerState>,
) -> Json<ParsedResume> {
    info!("Parsing resume ({} chars)", request.raw_text.len());
    Json(state.parser.parse(&request.raw_text).await)
}

pub async fn rank_jobs_handler(
    request: Json<RankRequest>,
    state: &State<ServerState>,
) -> Json<RankResponse> {
    let request = request.into_inner();
    info!("Ranking {} jobs", request.jobs.len());
    Json(state.ranker.rank(&request.resume, &request.jobs).await)
}

pub async fn job_search_handler(
    request: Json<SearchRequest>,
    state: &State<ServerState>,
) -> Result<Json<SearchResponse>, ApiError> {
    match state.search.search(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Job search failed: {}", e);
            let suggestions: &[&str] = match e {
                JobBoardError::Unavailable(_) => &["Check network access to the job board"],
                JobBoardError::Status { .. } => &[
                    "Verify JSEARCH_API_KEY and its quota",
                    "Try again in a few moments",
                ],
                JobBoardError::Decode(_) => &["Check JSEARCH_URL points at the search endpoint"],
            };
            Err(StandardErrorResponse::new(e.to_string(), "JOB_BOARD_ERROR", suggestions)
                .with_status(Status::BadGateway))
        }
    }
}

pub async fn generate_cover_letter_handler(
    request: Json<CoverLetterRequest>,
    as_file: bool,
    state: &State<ServerState>,
) -> Result<Json<CoverLetterResponse>, ApiError> {
    match state.cover_letter.generate(&request, as_file).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Cover letter generation failed: {:#}", e);
            Err(StandardErrorResponse::new(
                format!("{:#}", e),
                "DOCUMENT_WRITE_FAILED",
                &["Check that OUTPUT_DIR is writable", "Retry without as_file"],
            )
            .with_status(Status::InternalServerError))
        }
    }
}
