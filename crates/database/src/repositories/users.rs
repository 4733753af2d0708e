use crate::error::{DatabaseError, Result};
use ecclesia_models::user::{Role, User, UserProfile};
use sqlx::{PgPool, Postgres, QueryBuilder};

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an account. Hashing happens upstream; this layer only ever
    /// sees the finished hash.
    pub async fn create(&self, username: &str, password_hash: &str, role: Role) -> Result<UserProfile> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(DatabaseError::duplicate("user", "username"));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserProfile::from(user))
    }

    /// `Option` rather than an error: login must not distinguish an
    /// unknown username from a wrong password.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("user", id))?;

        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<UserProfile>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// Partial account update; the username-uniqueness check excludes the
    /// account being edited.
    pub async fn update(
        &self,
        id: i64,
        username: Option<&str>,
        role: Option<Role>,
        password_hash: Option<&str>,
    ) -> Result<UserProfile> {
        if let Some(username) = username {
            let existing: Option<(i64,)> =
                sqlx::query_as("SELECT id FROM users WHERE username = $1 AND id != $2")
                    .bind(username)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
            if existing.is_some() {
                return Err(DatabaseError::duplicate("user", "username"));
            }
        }

        if username.is_none() && role.is_none() && password_hash.is_none() {
            return Ok(UserProfile::from(self.find_by_id(id).await?));
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(username) = username {
                fields.push("username = ").push_bind_unseparated(username);
            }
            if let Some(role) = role {
                fields.push("role = ").push_bind_unseparated(role);
            }
            if let Some(password_hash) = password_hash {
                fields
                    .push("password_hash = ")
                    .push_bind_unseparated(password_hash);
            }
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING *");

        let user = builder
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("user", id))?;

        Ok(UserProfile::from(user))
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("user", id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("user", id));
        }

        Ok(())
    }
}
