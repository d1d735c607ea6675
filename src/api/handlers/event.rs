use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::family::FamilyMember;
use crate::api::dtos::requests::{CreateEventRequest, EventRangeQuery, UpdateEventRequest};
use crate::domain::models::{
    calendar_date::CalendarDate,
    family::ParentRole,
    schedule_event::{Location, NewScheduleEvent, Party},
};
use crate::domain::services::event_service::ScheduleEventChanges;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, .. }: FamilyMember,
    Query(query): Query<EventRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let events = match (query.start, query.end) {
        (Some(start), Some(end)) => {
            let start = CalendarDate::parse(&start)?;
            let end = CalendarDate::parse(&end)?;
            if start > end {
                return Err(AppError::Validation("start must not be after end".into()));
            }
            state.event_repo.list_by_range(&family.id, &start, &end).await?
        }
        (None, None) => state.event_repo.list_by_family(&family.id).await?,
        _ => return Err(AppError::Validation("start and end must be given together".into())),
    };
    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, user_id }: FamilyMember,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = CalendarDate::parse(&payload.date)?;
    let location = payload.location.unwrap_or(match payload.party {
        Party::ParentB => Location::default_for(ParentRole::ParentB),
        _ => Location::default_for(ParentRole::ParentA),
    });

    let params = NewScheduleEvent {
        date,
        party: payload.party,
        location,
        location_label: payload.location_label,
        title: payload.title,
        notes: payload.notes,
        start_time: payload.start_time,
        end_time: payload.end_time,
    };

    let created = state.event_service.create(&family, &user_id, params).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, user_id }: FamilyMember,
    Path((_, event_id)): Path<(String, String)>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let changes = ScheduleEventChanges {
        date: payload.date.as_deref().map(CalendarDate::parse).transpose()?,
        party: payload.party,
        location: payload.location,
        location_label: payload.location_label,
        title: payload.title,
        notes: payload.notes,
        start_time: payload.start_time,
        end_time: payload.end_time,
    };

    let updated = state.event_service.update(&family, &user_id, &event_id, changes).await?;
    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, .. }: FamilyMember,
    Path((_, event_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.event_repo.delete(&family.id, &event_id).await?;
    info!(family_id = %family.id, event_id = %event_id, "Deleted schedule event");
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
