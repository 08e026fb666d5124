use thiserror::Error;

/// Errors surfaced to the caller. Lookup and key-performance decode
/// failures are absorbed where they occur and never appear here.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Table or column metadata could not be obtained; the current
    /// request cannot be rendered without it.
    #[error("schema unavailable for table '{table}': {reason}")]
    Schema { table: String, reason: String },

    /// The store rejected an insert/update/delete or the connection
    /// failed. Reported to the user, never retried.
    #[error("database operation failed: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// Edit target vanished between listing and dialog open.
    #[error("row {id} not found in table '{table}'")]
    NotFound { table: String, id: i64 },
}

impl AdminError {
    pub fn schema(table: impl Into<String>, reason: impl Into<String>) -> Self {
        AdminError::Schema {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Human-readable message for the UI status line. No internal
    /// identifiers or driver details beyond the store's own message.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Schema { table, .. } => {
                format!("Could not load the structure of '{}'", table)
            }
            AdminError::Persistence(e) => format!("Database error: {}", e),
            AdminError::NotFound { .. } => "Entry not found or already deleted".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
