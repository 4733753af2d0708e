use crate::error::{DatabaseError, Result};
use ecclesia_models::department::{Department, DepartmentWithMemberCount, RosterEntry};
use sqlx::{PgPool, Postgres, QueryBuilder};

pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a department. The name pre-check gives a friendly conflict
    /// for the common case; a race between the check and the insert still
    /// surfaces as `DuplicateEntry` through the unique-violation
    /// translation.
    pub async fn create(&self, name: &str) -> Result<Department> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM departments WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(DatabaseError::duplicate("department", "name"));
        }

        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(department)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Department> {
        let department = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("department", id))?;

        Ok(department)
    }

    /// All departments with their member counts, name ascending.
    pub async fn list_with_member_count(&self) -> Result<Vec<DepartmentWithMemberCount>> {
        let departments = sqlx::query_as::<_, DepartmentWithMemberCount>(
            r#"
            SELECT d.id, d.name, d.created_at, COUNT(md.member_id) AS member_count
            FROM departments d
            LEFT JOIN member_departments md ON md.department_id = d.id
            GROUP BY d.id
            ORDER BY d.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<Department> {
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM departments WHERE name = $1 AND id != $2")
                .bind(name)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Err(DatabaseError::duplicate("department", "name"));
        }

        let department = sqlx::query_as::<_, Department>(
            "UPDATE departments SET name = $1 WHERE id = $2 RETURNING *",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("department", id))?;

        Ok(department)
    }

    /// Hard delete; the join rows go with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("department", id));
        }

        Ok(())
    }

    /// Every registered member, flagged with whether they belong to this
    /// department. Backs the membership-management view.
    pub async fn roster(&self, department_id: i64) -> Result<Vec<RosterEntry>> {
        self.find_by_id(department_id).await?;

        let roster = sqlx::query_as::<_, RosterEntry>(
            r#"
            SELECT m.id, m.full_name, m.phone,
                   (md.member_id IS NOT NULL) AS in_department
            FROM members m
            LEFT JOIN member_departments md
                ON md.member_id = m.id AND md.department_id = $1
            ORDER BY m.full_name ASC
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roster)
    }

    /// Replace the department's member set with exactly the given ids.
    ///
    /// Delete-all then bulk-insert inside one transaction: either the new
    /// set is fully committed or nothing changes. An id with no matching
    /// member trips the foreign key and rolls everything back.
    pub async fn sync_members(&self, department_id: i64, member_ids: &[i64]) -> Result<()> {
        self.find_by_id(department_id).await?;

        let mut ids = member_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM member_departments WHERE department_id = $1")
            .bind(department_id)
            .execute(&mut *tx)
            .await?;

        if !ids.is_empty() {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO member_departments (member_id, department_id) ");
            builder.push_values(ids, |mut row, member_id| {
                row.push_bind(member_id).push_bind(department_id);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Database, DatabaseConfig};
    use crate::repositories::members::MemberRepository;
    use ecclesia_models::member::NewMember;

    async fn connect() -> Database {
        Database::new(DatabaseConfig::from_env())
            .await
            .expect("Failed to connect to database")
    }

    async fn seed_member(db: &Database, name: &str) -> i64 {
        let repo = MemberRepository::new(db.pool().clone());
        let member = repo
            .create(&NewMember {
                full_name: name.to_string(),
                birth_date: None,
                phone: None,
                cell_id: None,
                department_ids: vec![],
            })
            .await
            .expect("Failed to create member");
        member.id
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn sync_replaces_the_association_set_exactly() {
        let db = connect().await;
        let repo = DepartmentRepository::new(db.pool().clone());

        let department = repo.create("Sync Test").await.expect("create department");
        let a = seed_member(&db, "Sync A").await;
        let b = seed_member(&db, "Sync B").await;
        let c = seed_member(&db, "Sync C").await;

        repo.sync_members(department.id, &[a, b, c])
            .await
            .expect("first sync");
        repo.sync_members(department.id, &[b])
            .await
            .expect("second sync");

        let roster = repo.roster(department.id).await.expect("roster");
        let linked: Vec<i64> = roster
            .iter()
            .filter(|entry| entry.in_department)
            .map(|entry| entry.id)
            .collect();
        assert_eq!(linked, vec![b]);

        repo.delete(department.id).await.expect("cleanup");
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn sync_with_unknown_member_rolls_back_entirely() {
        let db = connect().await;
        let repo = DepartmentRepository::new(db.pool().clone());

        let department = repo.create("Rollback Test").await.expect("create department");
        let a = seed_member(&db, "Rollback A").await;

        repo.sync_members(department.id, &[a]).await.expect("seed sync");

        let result = repo.sync_members(department.id, &[a, i64::MAX]).await;
        assert!(matches!(result, Err(DatabaseError::ForeignKeyViolation(_))));

        // The previous set survived untouched.
        let roster = repo.roster(department.id).await.expect("roster");
        let linked: Vec<i64> = roster
            .iter()
            .filter(|entry| entry.in_department)
            .map(|entry| entry.id)
            .collect();
        assert_eq!(linked, vec![a]);

        repo.delete(department.id).await.expect("cleanup");
    }
}
