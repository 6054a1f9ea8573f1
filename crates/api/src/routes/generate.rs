use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use types::{GenerateParams, World};
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct GenerateIn {
    pub world: World,
    #[serde(default)]
    pub params: Option<GenerateParams>,
}

#[derive(Serialize, ToSchema)]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

#[utoipa::path(
    post,
    path = "/v1/generate",
    request_body = GenerateIn,
    responses((status = 200, description = "Job enqueued", body = JobCreated))
)]
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateIn>,
) -> Json<JobCreated> {
    let params = match input.params {
        Some(p) => p,
        None => GenerateParams {
            time_limit_sec: state.default_time_limit_sec,
            ..GenerateParams::default()
        },
    };
    let id = state.jobs.enqueue(input.world, params);
    Json(JobCreated {
        job_id: id.0,
        status: "queued",
    })
}
