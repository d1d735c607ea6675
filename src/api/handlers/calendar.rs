use axum::{extract::State, http::header, response::IntoResponse};
use crate::state::AppState;
use crate::api::extractors::family::FamilyMember;
use crate::domain::services::calendar::generate_family_ics;
use crate::error::AppError;
use std::sync::Arc;

pub async fn export_calendar(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, .. }: FamilyMember,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list_by_family(&family.id).await?;
    let ics = generate_family_ics(&family, &events)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"custody.ics\""),
        ],
        ics,
    ))
}
