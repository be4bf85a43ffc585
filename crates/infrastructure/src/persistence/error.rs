//! Shared error mapping for sqlx persistence layer

use application::error::ApplicationError;

/// Map a sqlx error to an application-layer error
pub fn map_sqlx_error(e: sqlx::Error) -> ApplicationError {
    match e {
        sqlx::Error::RowNotFound => ApplicationError::Storage("Database record not found".to_string()),
        sqlx::Error::Database(db_err) => {
            ApplicationError::Storage(format!("Database error: {db_err}"))
        },
        other => ApplicationError::Storage(format!("Database error: {other}")),
    }
}

/// Map a JSON (de)serialization failure of a stored document
pub fn map_document_error(e: &serde_json::Error) -> ApplicationError {
    ApplicationError::Internal(format!("Invalid document: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_a_storage_error() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), "Storage error: Database record not found");
    }

    #[test]
    fn pool_errors_are_storage_errors() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ApplicationError::Storage(_)));
    }
}
