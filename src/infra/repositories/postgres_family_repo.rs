use crate::domain::models::family::{Family, ParentRole, ParentRoles};
use crate::domain::ports::FamilyRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

pub struct PostgresFamilyRepo {
    pool: PgPool,
}

impl PostgresFamilyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_members(&self, family: &mut Family) -> Result<(), AppError> {
        family.member_ids = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM family_members WHERE family_id = $1 ORDER BY position ASC",
        )
            .bind(&family.id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}

#[async_trait]
impl FamilyRepository for PostgresFamilyRepo {
    async fn create(&self, family: &Family) -> Result<Family, AppError> {
        let mut created = sqlx::query_as::<_, Family>(
            "INSERT INTO families (id, name, plan, active, timezone, created_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *"
        )
            .bind(&family.id)
            .bind(&family.name)
            .bind(family.plan.as_str())
            .bind(family.active)
            .bind(&family.timezone)
            .bind(family.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        self.load_members(&mut created).await?;
        Ok(created)
    }

    async fn add_member(&self, family_id: &str, user_id: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO family_members (family_id, user_id, position, joined_at)
               VALUES ($1, $2, (SELECT COALESCE(MAX(position) + 1, 0) FROM family_members WHERE family_id = $1), $3)"#
        )
            .bind(family_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Family>, AppError> {
        let family = sqlx::query_as::<_, Family>("SELECT * FROM families WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        match family {
            Some(mut family) => {
                self.load_members(&mut family).await?;
                Ok(Some(family))
            }
            None => Ok(None),
        }
    }

    async fn list_active(&self) -> Result<Vec<Family>, AppError> {
        let mut families = sqlx::query_as::<_, Family>(
            "SELECT * FROM families WHERE active = TRUE ORDER BY created_at ASC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        for family in &mut families {
            self.load_members(family).await?;
        }
        Ok(families)
    }

    async fn resolve_parent_roles(&self, member_ids: &[String]) -> Result<ParentRoles, AppError> {
        if member_ids.is_empty() {
            return Ok(ParentRoles::default());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT id, parent_role FROM users WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in member_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(String, Option<String>)> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let profiles: Vec<(String, Option<ParentRole>)> = rows
            .into_iter()
            .map(|(id, role)| (id, role.and_then(|r| r.parse().ok())))
            .collect();

        Ok(ParentRoles::resolve(member_ids, &profiles))
    }
}
