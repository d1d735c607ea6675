use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::family::FamilyMember;
use crate::api::dtos::responses::{FamilyResponse, MemberResponse};
use crate::error::AppError;
use std::sync::Arc;

pub async fn get_family(
    State(state): State<Arc<AppState>>,
    FamilyMember { family, .. }: FamilyMember,
) -> Result<impl IntoResponse, AppError> {
    let roles = state.family_repo.resolve_parent_roles(&family.member_ids).await?;

    let mut members = Vec::with_capacity(family.member_ids.len());
    for member_id in &family.member_ids {
        if let Some(profile) = state.user_repo.find_by_id(member_id).await? {
            members.push(MemberResponse {
                id: profile.id,
                display_name: profile.display_name,
                parent_role: roles.role_of(member_id).map(|r| r.as_str().to_string()),
            });
        }
    }

    Ok(Json(FamilyResponse {
        family,
        members,
        parent_a: roles.parent_a,
        parent_b: roles.parent_b,
    }))
}
