use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, StatusCode},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use crate::api::extractors::auth::bearer_token;
use crate::state::AppState;
use std::sync::Arc;
use tracing::warn;

/// Proof that the caller holds the scheduler's shared secret, given either
/// as a bearer token or as the `secret` query parameter.
pub struct CronAuth;

#[derive(Deserialize)]
struct SecretQuery {
    secret: Option<String>,
}

impl FromRequestParts<Arc<AppState>> for CronAuth {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let query_secret = Query::<SecretQuery>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Query(q)| q.secret);

        let presented = bearer_token(parts)
            .map(str::to_string)
            .or(query_secret)
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if digest(&presented) != digest(&state.config.cron_secret) {
            warn!("Rejected scheduled trigger call with a wrong secret");
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(CronAuth)
    }
}

fn digest(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}
