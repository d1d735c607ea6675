use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, family, blocked_period, event, calendar, proposal, cron};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Family
        .route("/api/v1/families/{family_id}", get(family::get_family))

        // Availability
        .route("/api/v1/families/{family_id}/blocked-periods", get(blocked_period::list_blocked_periods).post(blocked_period::create_blocked_period))
        .route("/api/v1/families/{family_id}/blocked-periods/{period_id}", delete(blocked_period::delete_blocked_period))

        // Calendar
        .route("/api/v1/families/{family_id}/events", get(event::list_events).post(event::create_event))
        .route("/api/v1/families/{family_id}/events/{event_id}", put(event::update_event).delete(event::delete_event))
        .route("/api/v1/families/{family_id}/calendar.ics", get(calendar::export_calendar))

        // Proposals
        .route("/api/v1/families/{family_id}/proposals", get(proposal::list_proposals))
        .route("/api/v1/families/{family_id}/proposals/preview", get(proposal::preview_proposal))
        .route("/api/v1/families/{family_id}/proposals/{proposal_id}", get(proposal::get_proposal))
        .route("/api/v1/families/{family_id}/proposals/{proposal_id}/approve", post(proposal::approve_proposal))

        // Scheduled triggers
        .route("/api/v1/cron/weekly-proposals", get(cron::run_weekly_proposals).post(cron::run_weekly_proposals))
        .route("/api/v1/cron/daily-reminders", get(cron::run_daily_reminders).post(cron::run_daily_reminders))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        family_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
