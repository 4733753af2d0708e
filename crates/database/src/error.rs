use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Referenced entity does not exist: {0}")]
    ForeignKeyViolation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database driver error: {0}")]
    Driver(sqlx::Error),

    #[error("Database error: {0}")]
    Other(String),
}

impl DatabaseError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        Self::NotFound(format!("{} with id {} not found", entity, id))
    }

    pub fn duplicate(entity: &str, field: &str) -> Self {
        Self::DuplicateEntry(format!("A {} with this {} already exists", entity, field))
    }
}

// PostgreSQL SQLSTATE codes.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Constraint violations are classified here, at the boundary, so callers
/// match on the taxonomy instead of driver error codes. The messages are
/// ours, not the driver's; raw driver text stays out of API responses.
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return DatabaseError::DuplicateEntry(
                        "a row with these unique values already exists".to_string(),
                    )
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return DatabaseError::ForeignKeyViolation(
                        "a referenced row does not exist".to_string(),
                    )
                }
                _ => {}
            }
        }
        DatabaseError::Driver(err)
    }
}
