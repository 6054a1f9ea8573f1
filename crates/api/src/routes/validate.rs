use axum::Json;
use sched_core::validate;
use serde::Serialize;
use types::World;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = World,
    responses((status = 200, description = "Validation result", body = ValidationReport))
)]
pub async fn validate_handler(Json(world): Json<World>) -> Json<ValidationReport> {
    match validate(&world) {
        Ok(()) => Json(ValidationReport {
            ok: true,
            error: None,
        }),
        Err(e) => Json(ValidationReport {
            ok: false,
            error: Some(e.to_string()),
        }),
    }
}
