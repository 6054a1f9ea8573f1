use axum::{
    extract::{Path, State},
    Json,
};
use jobs::JobStatus;
use serde_json::{json, Value};

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses((status = 200, description = "Job status", body = jobs::JobStatus))
)]
pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    Json(match state.jobs.get(&id) {
        None => json!({"status": "not_found"}),
        Some(status) => serde_json::to_value(status).expect("JobStatus always serializes"),
    })
}

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}/result",
    params(("id" = String, Path, description = "Job ID")),
    responses((status = 200, description = "Generated schedule, once the job is done"))
)]
pub async fn result(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    Json(match state.jobs.get(&id) {
        Some(JobStatus::Done { entries }) => {
            serde_json::to_value(entries).expect("Vec<ScheduleEntry> always serializes")
        }
        Some(JobStatus::Failed { message }) => json!({"status": "failed", "error": message}),
        Some(_) => json!({"status": "not_ready"}),
        None => json!({"status": "not_found"}),
    })
}
