// src/web/handlers/pipeline_handlers.rs
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;

use crate::orchestrator::{WorkflowFailure, WorkflowResult};
use crate::types::ProcessRequest;
use crate::web::types::ServerState;

/// Upstream failures surface as 502 with the partial results attached.
pub async fn process_resume_handler(
    request: Json<ProcessRequest>,
    state: &State<ServerState>,
) -> Result<Json<WorkflowResult>, Custom<Json<WorkflowFailure>>> {
    state
        .orchestrator
        .run(request.into_inner())
        .await
        .map(Json)
        .map_err(|failure| Custom(Status::BadGateway, Json(failure)))
}
