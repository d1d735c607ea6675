use crate::domain::{models::blocked_period::BlockedPeriod, ports::BlockedPeriodRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteBlockedPeriodRepo {
    pool: SqlitePool,
}

impl SqliteBlockedPeriodRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl BlockedPeriodRepository for SqliteBlockedPeriodRepo {
    async fn create(&self, period: &BlockedPeriod) -> Result<BlockedPeriod, AppError> {
        sqlx::query_as::<_, BlockedPeriod>(
            r#"INSERT INTO blocked_periods (id, family_id, user_id, parent_role, start_date, end_date, note, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"#
        )
            .bind(&period.id)
            .bind(&period.family_id)
            .bind(&period.user_id)
            .bind(period.parent_role.as_str())
            .bind(period.start_date.as_str())
            .bind(period.end_date.as_str())
            .bind(&period.note)
            .bind(period.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, family_id: &str, id: &str) -> Result<Option<BlockedPeriod>, AppError> {
        sqlx::query_as::<_, BlockedPeriod>(
            "SELECT * FROM blocked_periods WHERE family_id = ? AND id = ?"
        )
            .bind(family_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_family(&self, family_id: &str) -> Result<Vec<BlockedPeriod>, AppError> {
        sqlx::query_as::<_, BlockedPeriod>(
            "SELECT * FROM blocked_periods WHERE family_id = ? ORDER BY start_date ASC, created_at ASC"
        )
            .bind(family_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, family_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM blocked_periods WHERE id = ? AND family_id = ?")
            .bind(id)
            .bind(family_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Blocked period not found".into()));
        }
        Ok(())
    }
}
