use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::family::FamilyMember;
use crate::api::dtos::requests::CreateBlockedPeriodRequest;
use crate::domain::models::{blocked_period::BlockedPeriod, calendar_date::CalendarDate};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_blocked_periods(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, .. }: FamilyMember,
) -> Result<impl IntoResponse, AppError> {
    let periods = state.blocked_period_repo.list_by_family(&family.id).await?;
    Ok(Json(periods))
}

/// Blocks the caller's own time. The role stored with the period is the
/// caller's resolved slot in this family.
pub async fn create_blocked_period(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, user_id }: FamilyMember,
    Json(payload): Json<CreateBlockedPeriodRequest>,
) -> Result<impl IntoResponse, AppError> {
    let start_date = CalendarDate::parse(&payload.start_date)?;
    let end_date = CalendarDate::parse(&payload.end_date)?;

    let roles = state.family_repo.resolve_parent_roles(&family.member_ids).await?;
    let role = roles.role_of(&user_id)
        .ok_or(AppError::Validation("Set your parent role before blocking dates".into()))?;

    let period = BlockedPeriod::new(family.id.clone(), user_id, role, start_date, end_date, payload.note)?;
    let created = state.blocked_period_repo.create(&period).await?;

    info!(
        family_id = %family.id,
        period_id = %created.id,
        "Blocked {} to {} for {}", created.start_date, created.end_date, created.parent_role
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_blocked_period(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, user_id }: FamilyMember,
    Path((_, period_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let period = state.blocked_period_repo.find_by_id(&family.id, &period_id).await?
        .ok_or(AppError::NotFound("Blocked period not found".into()))?;

    if period.user_id != user_id {
        return Err(AppError::Forbidden("Only the parent who created a blocked period can remove it".into()));
    }

    state.blocked_period_repo.delete(&family.id, &period_id).await?;
    info!(family_id = %family.id, period_id = %period_id, "Deleted blocked period");
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
