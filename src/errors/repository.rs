use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(SqlxError),

    /// Entity not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Unique constraint violation, carries the constraint name
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Invalid input data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// True when the error is a unique violation on `constraint`
    pub fn is_duplicate_of(&self, constraint: &str) -> bool {
        matches!(self, Self::Duplicate(name) if name == constraint)
    }
}

// SQLSTATE classes raised by the schema's constraints
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        let db_err = match err {
            SqlxError::RowNotFound => return Self::NotFound("Resource not found".to_string()),
            SqlxError::Database(db_err) => db_err,
            other => return Self::Database(other),
        };

        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        let code = db_err.code().map(|code| code.into_owned());
        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => Self::Duplicate(constraint),
            Some(FOREIGN_KEY_VIOLATION) => {
                Self::InvalidData("Referenced resource does not exist".to_string())
            }
            Some(CHECK_VIOLATION) => Self::InvalidData(check_message(&constraint)),
            _ => Self::Database(SqlxError::Database(db_err)),
        }
    }
}

fn check_message(constraint: &str) -> String {
    match constraint {
        "follows_no_self_follow" => "You cannot subscribe to yourself".to_string(),
        "recipes_cooking_time_check" => "Cooking time must be at least 1 minute".to_string(),
        "recipe_ingredients_amount_check" => "Ingredient amount must be at least 1".to_string(),
        _ => "Data violates constraints".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = RepositoryError::from(SqlxError::RowNotFound);
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[test]
    fn test_check_messages() {
        assert_eq!(check_message("follows_no_self_follow"), "You cannot subscribe to yourself");
        assert_eq!(check_message("something_else"), "Data violates constraints");
    }

    #[test]
    fn test_is_duplicate_of() {
        let err = RepositoryError::Duplicate("short_links_code_key".to_string());
        assert!(err.is_duplicate_of("short_links_code_key"));
        assert!(!err.is_duplicate_of("short_links_recipe_key"));
        assert!(!RepositoryError::NotFound("x".into()).is_duplicate_of("short_links_code_key"));
    }
}
