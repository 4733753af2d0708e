use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DepartmentWithMemberCount {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub member_count: i64,
}

/// Create/rename payload. A department is just a unique name, so the same
/// body serves both operations.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDepartment {
    #[validate(length(min = 1, max = 15, message = "department name must be 1-15 characters"))]
    pub name: String,
}

impl NewDepartment {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
    }
}

/// One member of the roster view: every registered member, flagged with
/// whether they currently belong to the department in question.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RosterEntry {
    pub id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub in_department: bool,
}

/// Replace-all request for a department's member set. Entries must be
/// integers; garbage is rejected at deserialization rather than silently
/// dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncDepartmentMembers {
    pub member_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed_before_validation() {
        let mut department = NewDepartment {
            name: "  Louvor  ".to_string(),
        };
        department.normalize();
        assert_eq!(department.name, "Louvor");
        assert!(department.validate().is_ok());
    }

    #[test]
    fn overlong_name_fails_validation() {
        let department = NewDepartment {
            name: "Departamento Grande Demais".to_string(),
        };
        assert!(department.validate().is_err());
    }

    #[test]
    fn sync_body_rejects_non_numeric_ids() {
        let result: Result<SyncDepartmentMembers, _> =
            serde_json::from_str(r#"{"member_ids": [1, "x", 3]}"#);
        assert!(result.is_err());

        let ok: SyncDepartmentMembers =
            serde_json::from_str(r#"{"member_ids": [1, 2, 3]}"#).unwrap();
        assert_eq!(ok.member_ids, vec![1, 2, 3]);
    }
}
