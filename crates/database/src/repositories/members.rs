use crate::error::{DatabaseError, Result};
use chrono::NaiveDate;
use ecclesia_models::member::{Member, MemberFilter, MemberSummary, NewMember, UpdateMember};
use ecclesia_models::page::{Page, PageRequest};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

pub struct MemberRepository {
    pool: PgPool,
}

/// Raw listing row before the delimited department aggregates are split
/// back into real lists.
#[derive(Debug, sqlx::FromRow)]
struct MemberListRow {
    id: i64,
    full_name: String,
    birth_date: Option<NaiveDate>,
    phone: Option<String>,
    cell_id: Option<i64>,
    cell_name: Option<String>,
    department_ids: Option<String>,
    department_names: Option<String>,
}

impl MemberListRow {
    fn into_summary(self) -> MemberSummary {
        MemberSummary {
            id: self.id,
            full_name: self.full_name,
            birth_date: self.birth_date,
            phone: self.phone,
            cell_id: self.cell_id,
            cell_name: self.cell_name,
            department_ids: self
                .department_ids
                .map(|ids| ids.split(',').filter_map(|id| id.parse().ok()).collect())
                .unwrap_or_default(),
            department_names: self
                .department_names
                .map(|names| names.split(", ").map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

// Shared join clause for the listing and its count; both queries must see
// the same predicate over the same shape.
const LIST_JOINS: &str = r#"
    FROM members m
    LEFT JOIN cells c ON m.cell_id = c.id
    LEFT JOIN member_departments md ON md.member_id = m.id
    LEFT JOIN departments d ON d.id = md.department_id
"#;

fn push_filters(builder: &mut QueryBuilder<Postgres>, filter: &MemberFilter) {
    let mut prefix = " WHERE ";
    if let Some(name) = filter.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        builder
            .push(prefix)
            .push("m.full_name ILIKE ")
            .push_bind(format!("%{}%", name));
        prefix = " AND ";
    }
    if let Some(department_id) = filter.department_id {
        builder
            .push(prefix)
            .push("md.department_id = ")
            .push_bind(department_id);
        prefix = " AND ";
    }
    if let Some(cell_id) = filter.cell_id {
        builder.push(prefix).push("m.cell_id = ").push_bind(cell_id);
    }
}

/// Make the member's department links match exactly the given set:
/// delete everything, bulk-insert the survivors. Runs inside the caller's
/// transaction so a bad id rolls the whole operation back.
async fn replace_department_links(
    tx: &mut Transaction<'_, Postgres>,
    member_id: i64,
    department_ids: &[i64],
) -> Result<()> {
    sqlx::query("DELETE FROM member_departments WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut **tx)
        .await?;

    let mut ids = department_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if !ids.is_empty() {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO member_departments (member_id, department_id) ");
        builder.push_values(ids, |mut row, department_id| {
            row.push_bind(member_id).push_bind(department_id);
        });
        builder.build().execute(&mut **tx).await?;
    }

    Ok(())
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a member and attach the requested departments in one
    /// transaction.
    pub async fn create(&self, new_member: &NewMember) -> Result<Member> {
        let mut tx = self.pool.begin().await?;

        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (full_name, birth_date, phone, cell_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new_member.full_name)
        .bind(new_member.birth_date)
        .bind(&new_member.phone)
        .bind(new_member.cell_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_department_links(&mut tx, member.id, &new_member.department_ids).await?;

        tx.commit().await?;
        Ok(member)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Member> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("member", id))?;

        Ok(member)
    }

    /// Filtered, paginated listing. The count and page queries share one
    /// predicate builder; the page aggregates department ids/names into
    /// name-ordered delimited lists, split apart again in `into_summary`.
    pub async fn list(
        &self,
        filter: &MemberFilter,
        page: &PageRequest,
    ) -> Result<Page<MemberSummary>> {
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(DISTINCT m.id)");
        count_builder.push(LIST_JOINS);
        push_filters(&mut count_builder, filter);

        let total_items: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut list_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"SELECT m.id, m.full_name, m.birth_date, m.phone, m.cell_id,
                   c.name AS cell_name,
                   string_agg(d.id::text, ',' ORDER BY d.name) AS department_ids,
                   string_agg(d.name, ', ' ORDER BY d.name) AS department_names"#,
        );
        list_builder.push(LIST_JOINS);
        push_filters(&mut list_builder, filter);
        list_builder.push(" GROUP BY m.id, c.name ORDER BY m.full_name ASC LIMIT ");
        list_builder.push_bind(page.limit());
        list_builder.push(" OFFSET ");
        list_builder.push_bind(page.offset());

        let rows: Vec<MemberListRow> = list_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let members = rows.into_iter().map(MemberListRow::into_summary).collect();
        Ok(Page::new(members, total_items, page))
    }

    /// Apply a partial update; when `department_ids` is present the link
    /// set is replaced in the same transaction.
    pub async fn update(&self, id: i64, update: &UpdateMember) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DatabaseError::not_found("member", id));
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE members SET ");
        let mut wrote_field = false;
        {
            let mut fields = builder.separated(", ");
            if let Some(full_name) = &update.full_name {
                fields.push("full_name = ").push_bind_unseparated(full_name);
                wrote_field = true;
            }
            if let Some(birth_date) = update.birth_date.as_update() {
                fields
                    .push("birth_date = ")
                    .push_bind_unseparated(birth_date.copied());
                wrote_field = true;
            }
            if let Some(phone) = update.phone.as_update() {
                fields.push("phone = ").push_bind_unseparated(phone.cloned());
                wrote_field = true;
            }
            if let Some(cell_id) = update.cell_id.as_update() {
                fields
                    .push("cell_id = ")
                    .push_bind_unseparated(cell_id.copied());
                wrote_field = true;
            }
        }
        if wrote_field {
            builder.push(" WHERE id = ").push_bind(id);
            builder.build().execute(&mut *tx).await?;
        }

        if let Some(department_ids) = &update.department_ids {
            replace_department_links(&mut tx, id, department_ids).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a member, removing its department links first so the join
    /// table never dangles. Both statements share one transaction.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM member_departments WHERE member_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("member", id));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn no_filters_means_no_where_clause() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(DISTINCT m.id)");
        builder.push(LIST_JOINS);
        push_filters(&mut builder, &MemberFilter::default());

        let query = builder.build();
        assert!(!query.sql().contains("WHERE"));
    }

    #[test]
    fn filters_combine_with_and() {
        let filter = MemberFilter {
            name: Some("ana".to_string()),
            department_id: Some(2),
            cell_id: Some(3),
        };
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(DISTINCT m.id)");
        builder.push(LIST_JOINS);
        push_filters(&mut builder, &filter);

        let query = builder.build();
        let sql = query.sql();
        assert!(sql.contains("WHERE m.full_name ILIKE $1"));
        assert!(sql.contains("AND md.department_id = $2"));
        assert!(sql.contains("AND m.cell_id = $3"));
    }

    #[test]
    fn blank_name_filter_is_ignored() {
        let filter = MemberFilter {
            name: Some("   ".to_string()),
            department_id: None,
            cell_id: Some(3),
        };
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(DISTINCT m.id)");
        builder.push(LIST_JOINS);
        push_filters(&mut builder, &filter);

        let query = builder.build();
        let sql = query.sql();
        assert!(!sql.contains("ILIKE"));
        assert!(sql.contains("WHERE m.cell_id = $1"));
    }

    #[test]
    fn listing_row_aggregates_split_back_into_lists() {
        let row = MemberListRow {
            id: 7,
            full_name: "Ana Souza".to_string(),
            birth_date: None,
            phone: None,
            cell_id: None,
            cell_name: None,
            department_ids: Some("4,2,9".to_string()),
            department_names: Some("Intercessão, Louvor, Recepção".to_string()),
        };

        let summary = row.into_summary();
        assert_eq!(summary.department_ids, vec![4, 2, 9]);
        assert_eq!(
            summary.department_names,
            vec!["Intercessão", "Louvor", "Recepção"]
        );
    }

    #[test]
    fn listing_row_without_departments_yields_empty_lists() {
        let row = MemberListRow {
            id: 1,
            full_name: "Bruno Lima".to_string(),
            birth_date: None,
            phone: None,
            cell_id: None,
            cell_name: None,
            department_ids: None,
            department_names: None,
        };

        let summary = row.into_summary();
        assert!(summary.department_ids.is_empty());
        assert!(summary.department_names.is_empty());
    }
}
