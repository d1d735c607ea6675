use crate::domain::models::{
    calendar_date::CalendarDate,
    proposal::{ProposalStatus, WeekProposal},
    schedule_event::ScheduleEvent,
};
use crate::domain::ports::ProposalRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresProposalRepo {
    pool: PgPool,
}

impl PostgresProposalRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl ProposalRepository for PostgresProposalRepo {
    async fn insert_if_absent(&self, proposal: &WeekProposal) -> Result<Option<WeekProposal>, AppError> {
        sqlx::query_as::<_, WeekProposal>(
            r#"INSERT INTO week_proposals (id, family_id, week_start, days, approvals, status, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               ON CONFLICT DO NOTHING
               RETURNING *"#
        )
            .bind(&proposal.id)
            .bind(&proposal.family_id)
            .bind(proposal.week_start.as_str())
            .bind(&proposal.days)
            .bind(&proposal.approvals)
            .bind(proposal.status.as_str())
            .bind(proposal.created_at)
            .bind(proposal.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_pending(&self, family_id: &str, week_start: &CalendarDate) -> Result<Option<WeekProposal>, AppError> {
        sqlx::query_as::<_, WeekProposal>(
            "SELECT * FROM week_proposals WHERE family_id = $1 AND week_start = $2 AND status = 'pending'"
        )
            .bind(family_id)
            .bind(week_start.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, family_id: &str, id: &str) -> Result<Option<WeekProposal>, AppError> {
        sqlx::query_as::<_, WeekProposal>(
            "SELECT * FROM week_proposals WHERE family_id = $1 AND id = $2"
        )
            .bind(family_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_family(&self, family_id: &str, status: Option<ProposalStatus>) -> Result<Vec<WeekProposal>, AppError> {
        sqlx::query_as::<_, WeekProposal>(
            "SELECT * FROM week_proposals WHERE family_id = $1 AND ($2::text IS NULL OR status = $2) ORDER BY week_start DESC"
        )
            .bind(family_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn record_approval(&self, proposal_id: &str, user_id: &str, approved_at: DateTime<Utc>) -> Result<Option<WeekProposal>, AppError> {
        sqlx::query_as::<_, WeekProposal>(
            r#"UPDATE week_proposals
               SET approvals = approvals || jsonb_build_object($1::text, $2::text), updated_at = $3
               WHERE id = $4 AND status = 'pending'
               RETURNING *"#
        )
            .bind(user_id)
            .bind(approved_at.to_rfc3339())
            .bind(approved_at)
            .bind(proposal_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn commit_approved(&self, proposal: &WeekProposal, events: &[ScheduleEvent]) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "UPDATE week_proposals SET status = 'approved', approvals = $1, updated_at = $2 WHERE id = $3 AND status = 'pending'"
        )
            .bind(&proposal.approvals)
            .bind(Utc::now())
            .bind(&proposal.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(AppError::Database)?;
            return Ok(false);
        }

        for event in events {
            sqlx::query("DELETE FROM schedule_events WHERE family_id = $1 AND date = $2")
                .bind(&event.family_id)
                .bind(event.date.as_str())
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            sqlx::query(
                r#"INSERT INTO schedule_events (
                    id, family_id, date, party, location, location_label,
                    title, notes, start_time, end_time, created_by, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#
            )
                .bind(&event.id)
                .bind(&event.family_id)
                .bind(event.date.as_str())
                .bind(event.party.as_str())
                .bind(event.location.as_str())
                .bind(&event.location_label)
                .bind(&event.title)
                .bind(&event.notes)
                .bind(&event.start_time)
                .bind(&event.end_time)
                .bind(&event.created_by)
                .bind(event.created_at)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(true)
    }
}
