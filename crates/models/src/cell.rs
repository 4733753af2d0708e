use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::patch::Patch;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cell {
    pub id: i64,
    pub name: String,
    pub leader_id: Option<i64>,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
}

/// Listing row with the leader's name and the member count joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CellOverview {
    pub id: i64,
    pub name: String,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
    pub leader_id: Option<i64>,
    pub leader_name: Option<String>,
    pub member_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCell {
    #[validate(length(min = 1, max = 100, message = "cell name must be 1-100 characters"))]
    pub name: String,

    pub leader_id: Option<i64>,

    #[validate(length(max = 100, message = "neighborhood must be at most 100 characters"))]
    pub neighborhood: Option<String>,

    #[validate(length(max = 100, message = "street must be at most 100 characters"))]
    pub street: Option<String>,
}

impl NewCell {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        for field in [&mut self.neighborhood, &mut self.street] {
            if let Some(value) = field.take() {
                let value = value.trim();
                if !value.is_empty() {
                    *field = Some(value.to_string());
                }
            }
        }
    }
}

/// Partial update for a cell. An explicit `null` clears the leader or the
/// address fields; absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCell {
    #[validate(length(min = 1, max = 100, message = "cell name must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    pub leader_id: Patch<i64>,

    #[serde(default)]
    pub neighborhood: Patch<String>,

    #[serde(default)]
    pub street: Patch<String>,
}

impl UpdateCell {
    pub fn normalize(&mut self) {
        if let Some(name) = self.name.take() {
            self.name = Some(name.trim().to_string());
        }
        for field in [&mut self.neighborhood, &mut self.street] {
            *field = match std::mem::take(field) {
                Patch::Value(value) => {
                    let value = value.trim().to_string();
                    if value.is_empty() {
                        Patch::Null
                    } else {
                        Patch::Value(value)
                    }
                }
                other => other,
            };
        }
    }

    /// Checks the derive cannot express for tri-state fields.
    pub fn patch_error(&self) -> Option<String> {
        for (field, label) in [(&self.neighborhood, "neighborhood"), (&self.street, "street")] {
            if let Patch::Value(value) = field {
                if value.chars().count() > 100 {
                    return Some(format!("{} must be at most 100 characters", label));
                }
            }
        }
        None
    }

    pub fn is_noop(&self) -> bool {
        self.name.is_none()
            && self.leader_id.is_absent()
            && self.neighborhood.is_absent()
            && self.street.is_absent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_null_clears_the_leader() {
        let update: UpdateCell = serde_json::from_str(r#"{"leader_id": null}"#).unwrap();
        assert_eq!(update.leader_id, Patch::Null);
        assert!(update.name.is_none());
        assert!(!update.is_noop());
    }

    #[test]
    fn empty_address_fields_normalize_to_clears() {
        let mut update: UpdateCell =
            serde_json::from_str(r#"{"neighborhood": " ", "street": "Rua 7 "}"#).unwrap();
        update.normalize();
        assert_eq!(update.neighborhood, Patch::Null);
        assert_eq!(update.street, Patch::Value("Rua 7".to_string()));
    }

    #[test]
    fn overlong_address_is_reported() {
        let update = UpdateCell {
            street: Patch::Value("x".repeat(101)),
            ..Default::default()
        };
        assert!(update.patch_error().is_some());
    }
}
