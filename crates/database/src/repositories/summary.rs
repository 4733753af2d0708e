use crate::error::Result;
use serde::Serialize;
use sqlx::PgPool;

/// Dashboard totals.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_members: i64,
    pub total_departments: i64,
    pub total_cells: i64,
    pub total_users: i64,
}

pub struct SummaryRepository {
    pool: PgPool,
}

impl SummaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The four counts run concurrently, each on its own pooled
    /// connection.
    pub async fn totals(&self) -> Result<Summary> {
        let members = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool);
        let departments = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments")
            .fetch_one(&self.pool);
        let cells = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cells")
            .fetch_one(&self.pool);
        let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool);

        let (total_members, total_departments, total_cells, total_users) =
            tokio::try_join!(members, departments, cells, users)?;

        Ok(Summary {
            total_members,
            total_departments,
            total_cells,
            total_users,
        })
    }
}
