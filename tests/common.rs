#![allow(dead_code)]

use custody_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::factory::sqlite_repositories,
    domain::models::{
        auth::Claims,
        family::{Family, ParentRole, Plan},
        notification::{Notification, NotificationKind},
        user::UserProfile,
    },
    domain::ports::NotificationService,
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tower::ServiceExt;
use serde_json::Value;

pub const CRON_SECRET: &str = "test-cron-secret";
pub const AUDIENCE: &str = "custody-frontend";

/// Keeps every notification handed to the sink so tests can assert on it.
/// A failing notifier still records the attempt, then reports an error.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Vec<String>, Notification)>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self { failing: true, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<(Vec<String>, Notification)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<(Vec<String>, Notification)> {
        self.sent().into_iter().filter(|(_, n)| n.kind == kind).collect()
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn notify(&self, recipients: &[String], notification: &Notification) -> Result<(), AppError> {
        self.sent.lock().unwrap().push((recipients.to_vec(), notification.clone()));
        if self.failing {
            return Err(AppError::InternalWithMsg("push gateway unavailable".into()));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub notifier: Arc<RecordingNotifier>,
}

pub struct Couple {
    pub family: Family,
    pub parent_a: UserProfile,
    pub parent_b: UserProfile,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default()).await
    }

    /// Every delivery attempt fails.
    pub async fn with_failing_notifier() -> Self {
        Self::with_notifier(RecordingNotifier::failing()).await
    }

    async fn with_notifier(notifier: RecordingNotifier) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            notify_service_url: "http://localhost".to_string(),
            notify_service_token: "token".to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_audience: AUDIENCE.to_string(),
            cron_secret: CRON_SECRET.to_string(),
        };

        let notifier = Arc::new(notifier);
        let state = Arc::new(
            AppState::new(config, sqlite_repositories(pool.clone()), notifier.clone())
                .expect("Failed to build test state"),
        );

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            notifier,
        }
    }

    pub fn token_for(&self, user_id: &str) -> String {
        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            aud: AUDIENCE.to_string(),
            exp: now + 3600,
            iat: now,
            iss: Some("test-issuer".to_string()),
        };
        let key = EncodingKey::from_ed_pem(priv_key_pem.as_bytes()).unwrap();
        encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    pub async fn seed_user(&self, name: &str, role: Option<ParentRole>) -> UserProfile {
        self.state.user_repo.create(&UserProfile::new(name.to_string(), role)).await.unwrap()
    }

    pub async fn seed_family(&self, plan: Plan, members: &[&UserProfile]) -> Family {
        let family = self.state.family_repo.create(&Family::new("The Smiths".to_string(), plan)).await.unwrap();
        for member in members {
            self.state.family_repo.add_member(&family.id, &member.id).await.unwrap();
        }
        self.state.family_repo.find_by_id(&family.id).await.unwrap().unwrap()
    }

    /// A premium family with one member in each parent slot, A joined first.
    pub async fn seed_couple(&self) -> Couple {
        let parent_a = self.seed_user("Alice", Some(ParentRole::ParentA)).await;
        let parent_b = self.seed_user("Bob", Some(ParentRole::ParentB)).await;
        let family = self.seed_family(Plan::Premium, &[&parent_a, &parent_b]).await;
        Couple { family, parent_a, parent_b }
    }

    /// Sends a request and returns status plus the body parsed as JSON
    /// (`Value::Null` for an empty or non-JSON body).
    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(method, uri, token, body).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn send_raw(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    pub async fn trigger_weekly(&self, week_start: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/api/v1/cron/weekly-proposals?week_start={}", week_start),
            Some(CRON_SECRET),
            None,
        ).await
    }

    pub async fn add_block(&self, family_id: &str, user: &UserProfile, start: &str, end: &str) -> Value {
        let token = self.token_for(&user.id);
        let (status, body) = self.send(
            "POST",
            &format!("/api/v1/families/{}/blocked-periods", family_id),
            Some(&token),
            Some(serde_json::json!({ "start_date": start, "end_date": end })),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "block creation failed: {}", body);
        body
    }

    /// Installs a trigger that aborts any insert into `table` matching `condition`.
    pub async fn fail_inserts(&self, table: &str, condition: &str) {
        let sql = format!(
            "CREATE TRIGGER fail_{table}_insert BEFORE INSERT ON {table} WHEN {condition} \
             BEGIN SELECT RAISE(ABORT, 'insert rejected'); END"
        );
        sqlx::query(&sql).execute(&self.pool).await.unwrap();
    }

    pub async fn clear_failing_inserts(&self, table: &str) {
        sqlx::query(&format!("DROP TRIGGER IF EXISTS fail_{table}_insert"))
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn count_events(&self, family_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM schedule_events WHERE family_id = ?")
            .bind(family_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
