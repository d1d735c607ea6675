use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::family::FamilyMember;
use crate::api::dtos::requests::{PreviewQuery, ProposalListQuery};
use crate::api::dtos::responses::{ApprovalResponse, PreviewResponse};
use crate::domain::models::{calendar_date::CalendarDate, proposal::ProposalStatus};
use crate::domain::services::proposal_service::ApprovalOutcome;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_proposals(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, .. }: FamilyMember,
    Query(query): Query<ProposalListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status.as_deref().map(str::parse::<ProposalStatus>).transpose()?;
    let proposals = state.proposal_repo.list_by_family(&family.id, status).await?;
    Ok(Json(proposals))
}

pub async fn get_proposal(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, .. }: FamilyMember,
    Path((_, proposal_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let proposal = state.proposal_repo.find_by_id(&family.id, &proposal_id).await?
        .ok_or(AppError::NotFound("Proposal not found".into()))?;
    Ok(Json(proposal))
}

pub async fn preview_proposal(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, .. }: FamilyMember,
    Query(query): Query<PreviewQuery>,
) -> Result<impl IntoResponse, AppError> {
    let week_start = CalendarDate::parse(&query.week_start)?;
    let days = state.proposal_service.preview(&family, &week_start).await?;
    Ok(Json(PreviewResponse { week_start: week_start.to_string(), days }))
}

pub async fn approve_proposal(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, user_id }: FamilyMember,
    Path((_, proposal_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let response = match state.proposal_service.approve(&family, &proposal_id, &user_id).await? {
        ApprovalOutcome::Recorded(proposal) => ApprovalResponse { outcome: "recorded", proposal },
        ApprovalOutcome::Committed(proposal) => ApprovalResponse { outcome: "committed", proposal },
        ApprovalOutcome::AlreadyApproved(proposal) => ApprovalResponse { outcome: "already_approved", proposal },
    };
    Ok(Json(response))
}
