// handlers/protected/analytics/psychological_impact.rs - POST /api/analytics/psychological-impact

use axum::{extract::State, Extension};

use super::load_rows;
use crate::analytics::patterns::{psychological_impact, PsychologicalImpact, Report};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

pub async fn psychological_impact_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Report<PsychologicalImpact>> {
    let rows = load_rows(&state, user.user_id).await?;
    Ok(ApiResponse::success(Report::from_rows(&rows, psychological_impact)))
}
