// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use anyhow::Result;
use clap::ValueEnum;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::{Header, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, Route, State};
use tracing::info;

use crate::config::AppConfig;
use crate::orchestrator::{WorkflowFailure, WorkflowResult};
use crate::types::{
    CoverLetterRequest, CoverLetterResponse, ParseRequest, ParsedResume, ProcessRequest,
    RankRequest, RankResponse, SearchRequest, SearchResponse,
};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

/// Which service a process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceKind {
    Parser,
    Ranker,
    Search,
    CoverLetter,
    Orchestrator,
    /// Every service in one process.
    All,
}

impl ServiceKind {
    pub fn default_port(self) -> u16 {
        match self {
            ServiceKind::Parser => 9000,
            ServiceKind::Ranker => 9090,
            ServiceKind::Search => 9100,
            ServiceKind::CoverLetter => 9200,
            ServiceKind::Orchestrator | ServiceKind::All => 8000,
        }
    }

    pub fn routes(self) -> Vec<Route> {
        let mut mounted = match self {
            ServiceKind::Parser => routes![parse_resume],
            ServiceKind::Ranker => routes![rank_jobs],
            ServiceKind::Search => routes![job_search, match_jobs],
            ServiceKind::CoverLetter => routes![generate_cover_letter],
            ServiceKind::Orchestrator => routes![process_resume],
            ServiceKind::All => routes![
                parse_resume,
                rank_jobs,
                job_search,
                match_jobs,
                generate_cover_letter,
                process_resume
            ],
        };
        mounted.extend(routes![health, options]);
        mounted
    }
}

#[post("/parse_resume", data = "<request>")]
pub async fn parse_resume(request: Json<ParseRequest>, state: &State<ServerState>) -> Json<ParsedResume> {
    handlers::parse_resume_handler(request, state).await
}

#[post("/rank_jobs", data = "<request>")]
pub async fn rank_jobs(request: Json<RankRequest>, state: &State<ServerState>) -> Json<RankResponse> {
    handlers::rank_jobs_handler(request, state).await
}

#[post("/job_search", data = "<request>")]
pub async fn job_search(
    request: Json<SearchRequest>,
    state: &State<ServerState>,
) -> Result<Json<SearchResponse>, ApiError> {
    handlers::job_search_handler(request, state).await
}

#[post("/match_jobs", data = "<request>")]
pub async fn match_jobs(
    request: Json<SearchRequest>,
    state: &State<ServerState>,
) -> Result<Json<SearchResponse>, ApiError> {
    handlers::job_search_handler(request, state).await
}

/// `as_docx` is the older name of `as_file`.
#[post("/generate_cover_letter?<as_file>&<as_docx>", data = "<request>")]
pub async fn generate_cover_letter(
    request: Json<CoverLetterRequest>,
    as_file: Option<bool>,
    as_docx: Option<bool>,
    state: &State<ServerState>,
) -> Result<Json<CoverLetterResponse>, ApiError> {
    let as_file = as_file.or(as_docx).unwrap_or(false);
    handlers::generate_cover_letter_handler(request, as_file, state).await
}

#[post("/process_resume", data = "<request>")]
pub async fn process_resume(
    request: Json<ProcessRequest>,
    state: &State<ServerState>,
) -> Result<Json<WorkflowResult>, Custom<Json<WorkflowFailure>>> {
    handlers::process_resume_handler(request, state).await
}

#[get("/health")]
pub async fn health() -> Json<&'static str> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST",
        &["Check your request JSON format"],
    ))
}

#[rocket::catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {} {}", request.method(), request.uri()),
        "NOT_FOUND",
        &["Check the endpoint path and method", "GET /health confirms the service is up"],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected shape".to_string(),
        "UNPROCESSABLE_ENTITY",
        &[
            "Verify all required fields are present",
            "Check field types in the request body",
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR",
        &["Try again in a few moments"],
    ))
}

pub fn build_rocket(figment: Figment, kind: ServiceKind, state: ServerState) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .register("/", catchers![bad_request, not_found, unprocessable, internal_error])
        .mount("/", kind.routes())
}

// Main server start function
pub async fn start_web_server(config: AppConfig, kind: ServiceKind, port: u16) -> Result<()> {
    let state = ServerState::from_config(&config)?;

    info!("Starting {:?} service on {}:{}", kind, config.bind_address, port);
    info!(
        "Gemini: {}, job board: {}",
        if config.gemini.is_some() { "configured" } else { "not configured" },
        if config.jsearch.is_some() { "configured" } else { "not configured" }
    );
    if matches!(kind, ServiceKind::Orchestrator | ServiceKind::All) {
        info!("Pipeline stages: {:?}", config.services);
    }

    let figment = rocket::Config::figment()
        .merge(("address", config.bind_address.clone()))
        .merge(("port", port));

    build_rocket(figment, kind, state)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket server failed: {}", e))?;

    Ok(())
}
