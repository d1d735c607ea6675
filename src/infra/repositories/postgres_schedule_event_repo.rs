use crate::domain::models::{calendar_date::CalendarDate, schedule_event::ScheduleEvent};
use crate::domain::ports::ScheduleEventRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresScheduleEventRepo {
    pool: PgPool,
}

impl PostgresScheduleEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleEventRepository for PostgresScheduleEventRepo {
    async fn create(&self, event: &ScheduleEvent) -> Result<ScheduleEvent, AppError> {
        sqlx::query_as::<_, ScheduleEvent>(
            r#"INSERT INTO schedule_events (
                id, family_id, date, party, location, location_label,
                title, notes, start_time, end_time, created_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
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
            "SELECT * FROM schedule_events WHERE family_id = $1 AND id = $2",
        )
            .bind(family_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_family(&self, family_id: &str) -> Result<Vec<ScheduleEvent>, AppError> {
        sqlx::query_as::<_, ScheduleEvent>(
            "SELECT * FROM schedule_events WHERE family_id = $1 ORDER BY date ASC, start_time ASC",
        )
            .bind(family_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, family_id: &str, start: &CalendarDate, end: &CalendarDate) -> Result<Vec<ScheduleEvent>, AppError> {
        sqlx::query_as::<_, ScheduleEvent>(
            "SELECT * FROM schedule_events WHERE family_id = $1 AND date >= $2 AND date <= $3 ORDER BY date ASC, start_time ASC",
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
                date=$1, party=$2, location=$3, location_label=$4,
                title=$5, notes=$6, start_time=$7, end_time=$8
               WHERE id=$9 AND family_id=$10 RETURNING *"#
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
        let result = sqlx::query("DELETE FROM schedule_events WHERE id = $1 AND family_id = $2")
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
