use serde::{Deserialize, Deserializer};

/// Tri-state field for partial updates.
///
/// A JSON body can leave a key out entirely (leave the column alone), send
/// an explicit `null` (clear a nullable column), or send a value (set it).
/// `Option<T>` collapses the first two cases; this type keeps them apart.
///
/// Fields of this type must carry `#[serde(default)]` so a missing key
/// becomes [`Patch::Absent`]; the `Deserialize` impl below only runs when
/// the key is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

// Hand-written so `Patch<T>: Default` holds without a `T: Default` bound
// (the derive would add one, and types like `NaiveDate` don't have it).
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// The write this patch requests, if any: `None` when the field was
    /// absent, `Some(None)` to clear, `Some(Some(v))` to set.
    pub fn as_update(&self) -> Option<Option<&T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(value) => Some(Some(value)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        phone: Patch<String>,
    }

    #[test]
    fn absent_key_deserializes_to_absent() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.phone, Patch::Absent);
    }

    #[test]
    fn null_deserializes_to_null() {
        let body: Body = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(body.phone, Patch::Null);
    }

    #[test]
    fn value_deserializes_to_value() {
        let body: Body = serde_json::from_str(r#"{"phone": "11 91234-5678"}"#).unwrap();
        assert_eq!(body.phone, Patch::Value("11 91234-5678".to_string()));
    }

    #[test]
    fn as_update_distinguishes_the_three_states() {
        assert_eq!(Patch::<i64>::Absent.as_update(), None);
        assert_eq!(Patch::<i64>::Null.as_update(), Some(None));
        assert_eq!(Patch::Value(7i64).as_update(), Some(Some(&7)));
    }
}
