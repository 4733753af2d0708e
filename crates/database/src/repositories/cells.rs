use crate::error::{DatabaseError, Result};
use ecclesia_models::cell::{Cell, CellOverview, NewCell, UpdateCell};
use sqlx::{PgPool, Postgres, QueryBuilder};

pub struct CellRepository {
    pool: PgPool,
}

impl CellRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All cells with leader name and member count, name ascending.
    pub async fn list_overview(&self) -> Result<Vec<CellOverview>> {
        let cells = sqlx::query_as::<_, CellOverview>(
            r#"
            SELECT c.id, c.name, c.neighborhood, c.street, c.leader_id,
                   l.full_name AS leader_name,
                   COUNT(DISTINCT m.id) AS member_count
            FROM cells c
            LEFT JOIN members l ON c.leader_id = l.id
            LEFT JOIN members m ON m.cell_id = c.id
            GROUP BY c.id, l.full_name
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(cells)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Cell> {
        let cell = sqlx::query_as::<_, Cell>("SELECT * FROM cells WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("cell", id))?;

        Ok(cell)
    }

    // A member leads at most one cell. Not a DB constraint, so every write
    // that sets a leader runs this check first.
    async fn ensure_leader_available(&self, leader_id: i64, exclude_cell: Option<i64>) -> Result<()> {
        let existing: Option<(i64,)> = match exclude_cell {
            Some(cell_id) => {
                sqlx::query_as("SELECT id FROM cells WHERE leader_id = $1 AND id != $2")
                    .bind(leader_id)
                    .bind(cell_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT id FROM cells WHERE leader_id = $1")
                    .bind(leader_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        if existing.is_some() {
            return Err(DatabaseError::DuplicateEntry(
                "this member already leads another cell".to_string(),
            ));
        }
        Ok(())
    }

    async fn ensure_name_available(&self, name: &str, exclude_cell: Option<i64>) -> Result<()> {
        let existing: Option<(i64,)> = match exclude_cell {
            Some(cell_id) => {
                sqlx::query_as("SELECT id FROM cells WHERE name = $1 AND id != $2")
                    .bind(name)
                    .bind(cell_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT id FROM cells WHERE name = $1")
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        if existing.is_some() {
            return Err(DatabaseError::duplicate("cell", "name"));
        }
        Ok(())
    }

    /// Create a cell. A leader id that matches no member trips the foreign
    /// key and comes back as `ForeignKeyViolation`.
    pub async fn create(&self, new_cell: &NewCell) -> Result<Cell> {
        if let Some(leader_id) = new_cell.leader_id {
            self.ensure_leader_available(leader_id, None).await?;
        }
        self.ensure_name_available(&new_cell.name, None).await?;

        let cell = sqlx::query_as::<_, Cell>(
            r#"
            INSERT INTO cells (name, leader_id, neighborhood, street)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new_cell.name)
        .bind(new_cell.leader_id)
        .bind(&new_cell.neighborhood)
        .bind(&new_cell.street)
        .fetch_one(&self.pool)
        .await?;

        Ok(cell)
    }

    pub async fn update(&self, id: i64, update: &UpdateCell) -> Result<Cell> {
        let current = self.find_by_id(id).await?;

        if let Some(Some(leader_id)) = update.leader_id.as_update() {
            self.ensure_leader_available(*leader_id, Some(id)).await?;
        }
        if let Some(name) = &update.name {
            self.ensure_name_available(name, Some(id)).await?;
        }

        if update.is_noop() {
            return Ok(current);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE cells SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(name) = &update.name {
                fields.push("name = ").push_bind_unseparated(name);
            }
            if let Some(leader_id) = update.leader_id.as_update() {
                fields
                    .push("leader_id = ")
                    .push_bind_unseparated(leader_id.copied());
            }
            if let Some(neighborhood) = update.neighborhood.as_update() {
                fields
                    .push("neighborhood = ")
                    .push_bind_unseparated(neighborhood.cloned());
            }
            if let Some(street) = update.street.as_update() {
                fields
                    .push("street = ")
                    .push_bind_unseparated(street.cloned());
            }
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING *");

        let cell = builder
            .build_query_as::<Cell>()
            .fetch_one(&self.pool)
            .await?;

        Ok(cell)
    }

    /// Hard delete; members referencing the cell get their reference
    /// nulled by the database, never left dangling.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM cells WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("cell", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Database, DatabaseConfig};
    use crate::repositories::members::MemberRepository;
    use ecclesia_models::member::NewMember;

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn deleting_a_cell_nulls_member_references() {
        let db = Database::new(DatabaseConfig::from_env())
            .await
            .expect("Failed to connect to database");
        let cells = CellRepository::new(db.pool().clone());
        let members = MemberRepository::new(db.pool().clone());

        let cell = cells
            .create(&NewCell {
                name: "Célula Norte Teste".to_string(),
                leader_id: None,
                neighborhood: None,
                street: None,
            })
            .await
            .expect("create cell");

        let member = members
            .create(&NewMember {
                full_name: "Morador Norte".to_string(),
                birth_date: None,
                phone: None,
                cell_id: Some(cell.id),
                department_ids: vec![],
            })
            .await
            .expect("create member");

        cells.delete(cell.id).await.expect("delete cell");

        let reloaded = members.find_by_id(member.id).await.expect("reload member");
        assert_eq!(reloaded.cell_id, None);

        members.delete(member.id).await.expect("cleanup member");
    }
}
