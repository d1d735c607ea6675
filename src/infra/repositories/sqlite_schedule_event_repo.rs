use crate::domain::models::{calendar_date::CalendarDate, schedule_event::ScheduleEvent};
use crate::domain::ports::ScheduleEventRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteScheduleEventRepo {
    pool: SqlitePool,
}

impl SqliteScheduleEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleEventRepository for SqliteScheduleEventRepo {
    async fn create(&self, event: &ScheduleEvent) -> Result<ScheduleEvent, AppError> {
        sqlx::query_as::<_, ScheduleEvent>(
            r#"INSERT INTO schedule_events (
                id, family_id, date, party, location, location_label,
                title, notes, start_time, end_time, created_by, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#
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
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, family_id: &str, id: &str) -> Result<Option<ScheduleEvent>, AppError> {
        sqlx::query_as::<_, ScheduleEvent>(
            "SELECT * FROM schedule_events WHERE family_id = ? AND id = ?",
        )
            .bind(family_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_family(&self, family_id: &str) -> Result<Vec<ScheduleEvent>, AppError> {
        sqlx::query_as::<_, ScheduleEvent>(
            "SELECT * FROM schedule_events WHERE family_id = ? ORDER BY date ASC, start_time ASC",
        )
            .bind(family_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, family_id: &str, start: &CalendarDate, end: &CalendarDate) -> Result<Vec<ScheduleEvent>, AppError> {
        sqlx::query_as::<_, ScheduleEvent>(
            "SELECT * FROM schedule_events WHERE family_id = ? AND date >= ? AND date <= ? ORDER BY date ASC, start_time ASC",
        )
            .bind(family_id)
            .bind(start.as_str())
            .bind(end.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, event: &ScheduleEvent) -> Result<ScheduleEvent, AppError> {
        sqlx::query_as::<_, ScheduleEvent>(
            r#"UPDATE schedule_events SET
                date=?, party=?, location=?, location_label=?,
                title=?, notes=?, start_time=?, end_time=?
               WHERE id=? AND family_id=? RETURNING *"#
        )
            .bind(event.date.as_str())
            .bind(event.party.as_str())
            .bind(event.location.as_str())
            .bind(&event.location_label)
            .bind(&event.title)
            .bind(&event.notes)
            .bind(&event.start_time)
            .bind(&event.end_time)
            .bind(&event.id)
            .bind(&event.family_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Event not found".into()))
    }

    async fn delete(&self, family_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM schedule_events WHERE id = ? AND family_id = ?")
            .bind(id)
            .bind(family_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }
}
