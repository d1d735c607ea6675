use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
};
use std::collections::HashMap;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::family::Family;
use crate::state::AppState;
use std::sync::Arc;
use tracing::{error, Span};

/// The family named by the `{family_id}` path segment, loaded for an
/// authenticated caller who belongs to it.
pub struct FamilyMember {
    pub family: Family,
    pub user_id: String,
}

impl FromRequestParts<Arc<AppState>> for FamilyMember {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let AuthUser { user_id } = AuthUser::from_request_parts(parts, state).await?;

        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        let family_id = params.get("family_id").ok_or(StatusCode::BAD_REQUEST)?;
        Span::current().record("family_id", family_id.as_str());

        let family = match state.family_repo.find_by_id(family_id).await {
            Ok(Some(family)) => family,
            Ok(None) => return Err(StatusCode::NOT_FOUND),
            Err(e) => {
                error!("Failed to load family {}: {}", family_id, e);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        if !family.is_member(&user_id) {
            return Err(StatusCode::FORBIDDEN);
        }

        Ok(FamilyMember { family, user_id })
    }
}
