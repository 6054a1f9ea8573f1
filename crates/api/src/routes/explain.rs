use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sched_core::scoring::compute_penalties;
use types::{ScheduleEntry, World};

#[derive(Deserialize, ToSchema)]
pub struct ExplainIn {
    pub world: World,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct ExplainOut {
    pub total: i64,
    pub by_assignment: std::collections::HashMap<String, i64>,
}

#[utoipa::path(
    post,
    path = "/v1/explain",
    request_body = ExplainIn,
    responses(
        (status = 200, description = "Soft-penalty breakdown for a decoded schedule", body = ExplainOut)
    )
)]
pub async fn explain(Json(input): Json<ExplainIn>) -> Json<ExplainOut> {
    let breakdown = compute_penalties(&input.world, &input.entries);
    Json(ExplainOut {
        total: breakdown.total,
        by_assignment: breakdown.by_assignment,
    })
}
