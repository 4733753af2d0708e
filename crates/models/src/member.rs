use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::patch::Patch;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub cell_id: Option<i64>,
}

/// One row of the filtered member listing, with the aggregated display
/// fields (cell name, department ids/names) already joined in.
#[derive(Debug, Clone, Serialize)]
pub struct MemberSummary {
    pub id: i64,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub cell_id: Option<i64>,
    pub cell_name: Option<String>,
    pub department_ids: Vec<i64>,
    pub department_names: Vec<String>,
}

/// Filters for the member listing; absent filters impose no predicate and
/// present filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub name: Option<String>,
    pub department_id: Option<i64>,
    pub cell_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewMember {
    #[validate(length(min = 1, max = 30, message = "full name must be 1-30 characters"))]
    pub full_name: String,

    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = 20, message = "phone must be at most 20 characters"))]
    pub phone: Option<String>,

    pub cell_id: Option<i64>,

    #[serde(default)]
    pub department_ids: Vec<i64>,
}

impl NewMember {
    /// Trim string fields and collapse empty optionals to `None`. Run
    /// before `validate` so the length checks see the trimmed values.
    pub fn normalize(&mut self) {
        self.full_name = self.full_name.trim().to_string();
        if let Some(phone) = self.phone.take() {
            let phone = phone.trim();
            if !phone.is_empty() {
                self.phone = Some(phone.to_string());
            }
        }
    }
}

/// Partial update for a member. Absent fields are left unchanged; the
/// tri-state fields accept an explicit `null` to clear the column.
/// `department_ids`, when present, replaces the association set wholesale
/// (an empty list detaches the member from every department).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMember {
    #[validate(length(min = 1, max = 30, message = "full name must be 1-30 characters"))]
    pub full_name: Option<String>,

    #[serde(default)]
    pub birth_date: Patch<NaiveDate>,

    #[serde(default)]
    pub phone: Patch<String>,

    #[serde(default)]
    pub cell_id: Patch<i64>,

    pub department_ids: Option<Vec<i64>>,
}

impl UpdateMember {
    pub fn normalize(&mut self) {
        if let Some(full_name) = self.full_name.take() {
            self.full_name = Some(full_name.trim().to_string());
        }
        self.phone = match std::mem::take(&mut self.phone) {
            Patch::Value(phone) => {
                let phone = phone.trim().to_string();
                if phone.is_empty() {
                    Patch::Null
                } else {
                    Patch::Value(phone)
                }
            }
            other => other,
        };
    }

    /// Checks the derive cannot express for tri-state fields.
    pub fn patch_error(&self) -> Option<String> {
        if let Patch::Value(phone) = &self.phone {
            if phone.chars().count() > 20 {
                return Some("phone must be at most 20 characters".to_string());
            }
        }
        None
    }

    pub fn is_noop(&self) -> bool {
        self.full_name.is_none()
            && self.birth_date.is_absent()
            && self.phone.is_absent()
            && self.cell_id.is_absent()
            && self.department_ids.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_absent_null_and_value() {
        let update: UpdateMember =
            serde_json::from_str(r#"{"phone": null, "cell_id": 4}"#).unwrap();
        assert!(update.full_name.is_none());
        assert!(update.birth_date.is_absent());
        assert_eq!(update.phone, Patch::Null);
        assert_eq!(update.cell_id, Patch::Value(4));
        assert!(update.department_ids.is_none());
    }

    #[test]
    fn empty_phone_normalizes_to_a_clear() {
        let mut update: UpdateMember = serde_json::from_str(r#"{"phone": "  "}"#).unwrap();
        update.normalize();
        assert_eq!(update.phone, Patch::Null);
    }

    #[test]
    fn empty_department_list_is_a_sync_not_a_noop() {
        let update: UpdateMember = serde_json::from_str(r#"{"department_ids": []}"#).unwrap();
        assert_eq!(update.department_ids, Some(vec![]));
        assert!(!update.is_noop());
    }

    #[test]
    fn overlong_phone_is_reported() {
        let update = UpdateMember {
            phone: Patch::Value("x".repeat(21)),
            ..Default::default()
        };
        assert!(update.patch_error().is_some());
    }

    #[test]
    fn new_member_normalization_trims_and_drops_empties() {
        let mut member: NewMember = serde_json::from_str(
            r#"{"full_name": "  Ana Souza  ", "phone": ""}"#,
        )
        .unwrap();
        member.normalize();
        assert_eq!(member.full_name, "Ana Souza");
        assert_eq!(member.phone, None);
        assert!(member.department_ids.is_empty());
    }

    #[test]
    fn non_numeric_department_ids_are_rejected_by_deserialization() {
        let result: Result<NewMember, _> =
            serde_json::from_str(r#"{"full_name": "Ana", "department_ids": [1, "two"]}"#);
        assert!(result.is_err());
    }
}
