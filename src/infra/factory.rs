use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::{AppState, Repositories};
use crate::infra::notify::queued_notifier::{OutboundNotification, QueuedNotifier};
use crate::infra::repositories::{
    postgres_blocked_period_repo::PostgresBlockedPeriodRepo, postgres_family_repo::PostgresFamilyRepo,
    postgres_proposal_repo::PostgresProposalRepo, postgres_schedule_event_repo::PostgresScheduleEventRepo,
    postgres_user_repo::PostgresUserRepo,
    sqlite_blocked_period_repo::SqliteBlockedPeriodRepo, sqlite_family_repo::SqliteFamilyRepo,
    sqlite_proposal_repo::SqliteProposalRepo, sqlite_schedule_event_repo::SqliteScheduleEventRepo,
    sqlite_user_repo::SqliteUserRepo,
};

/// Connects the configured database, runs migrations, and wires the state.
/// The returned receiver feeds the notification delivery worker.
pub async fn bootstrap_state(config: &Config) -> (AppState, UnboundedReceiver<OutboundNotification>) {
    let database_url = &config.database_url;

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_repositories(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_repositories(pool)
    };

    let (notifier, receiver) = QueuedNotifier::new();
    let state = AppState::new(config.clone(), repos, Arc::new(notifier))
        .expect("Failed to build application state");

    (state, receiver)
}

pub fn sqlite_repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        family_repo: Arc::new(SqliteFamilyRepo::new(pool.clone())),
        user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
        blocked_period_repo: Arc::new(SqliteBlockedPeriodRepo::new(pool.clone())),
        event_repo: Arc::new(SqliteScheduleEventRepo::new(pool.clone())),
        proposal_repo: Arc::new(SqliteProposalRepo::new(pool)),
    }
}

pub fn postgres_repositories(pool: PgPool) -> Repositories {
    Repositories {
        family_repo: Arc::new(PostgresFamilyRepo::new(pool.clone())),
        user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
        blocked_period_repo: Arc::new(PostgresBlockedPeriodRepo::new(pool.clone())),
        event_repo: Arc::new(PostgresScheduleEventRepo::new(pool.clone())),
        proposal_repo: Arc::new(PostgresProposalRepo::new(pool)),
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
