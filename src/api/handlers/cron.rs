use axum::{extract::{State, Query}, response::IntoResponse, Json};
use chrono::Utc;
use crate::state::AppState;
use crate::api::extractors::cron::CronAuth;
use crate::api::dtos::requests::WeeklyTriggerQuery;
use crate::domain::models::calendar_date::{next_week_start, CalendarDate};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

/// Scheduled trigger: one proposal per eligible family for the coming week.
pub async fn run_weekly_proposals(
    State(state): State<Arc<AppState>>,
    _auth: CronAuth,
    Query(query): Query<WeeklyTriggerQuery>,
) -> Result<impl IntoResponse, AppError> {
    let week_start = match query.week_start {
        Some(value) => CalendarDate::parse(&value)?,
        None => next_week_start(Utc::now().date_naive())?,
    };

    info!(week_start = %week_start, "Weekly proposal trigger fired");
    let summary = state.proposal_service.run_weekly_cycle(&week_start).await?;
    Ok(Json(summary))
}

pub async fn run_daily_reminders(
    State(state): State<Arc<AppState>>,
    _auth: CronAuth,
) -> Result<impl IntoResponse, AppError> {
    info!("Daily reminder trigger fired");
    let summary = state.reminder_service.run_daily_reminders(Utc::now()).await?;
    Ok(Json(summary))
}
