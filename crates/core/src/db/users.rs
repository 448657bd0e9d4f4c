//! User profiles and admin role markers.

use sqlx::PgPool;

use super::corrupt;
use crate::store::{StoreError, UserStore};
use crate::{Email, Role, User, UserId};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::parse(&row.email).map_err(|e| corrupt("email", e))?,
            role: row.role.parse::<Role>().map_err(|e| corrupt("role", e))?,
            id: UserId::new(row.id),
            name: row.name,
        })
    }
}

/// Postgres [`UserStore`].
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserStore for PgUserStore {
    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, email, role FROM users WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, role FROM users WHERE lower(email) = lower($1) LIMIT 1",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (id, name, email, role) VALUES ($1, $2, $3, $4)")
            .bind(user.id.as_str())
            .bind(&user.name)
            .bind(user.email.as_str())
            .bind(user.role.to_string())
            .execute(&mut *tx)
            .await?;

        if user.is_admin() {
            sqlx::query("INSERT INTO roles_admin (user_id, active) VALUES ($1, TRUE)")
                .bind(user.id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO users (id, name, email, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                role = EXCLUDED.role,
                updated_at = now()
            ",
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(user.role.to_string())
        .execute(&mut *tx)
        .await?;

        if user.is_admin() {
            sqlx::query(
                r"
                INSERT INTO roles_admin (user_id, active) VALUES ($1, TRUE)
                ON CONFLICT (user_id) DO UPDATE SET active = TRUE
                ",
            )
            .bind(user.id.as_str())
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query("DELETE FROM roles_admin WHERE user_id = $1")
                .bind(user.id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        u64::try_from(count).map_err(|e| corrupt("count", e))
    }
}
