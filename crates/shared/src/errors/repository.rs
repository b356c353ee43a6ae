use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Custom: {0}")]
    Custom(String),
}

// Postgres SQLSTATE codes we care about.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        let violation = match &err {
            SqlxError::RowNotFound => return RepositoryError::NotFound,
            SqlxError::Database(db_err) => db_err.code().map(|code| {
                let detail = db_err
                    .constraint()
                    .map(str::to_owned)
                    .unwrap_or_else(|| db_err.message().to_string());
                (code.into_owned(), detail)
            }),
            _ => None,
        };

        match violation {
            Some((code, detail)) if code == UNIQUE_VIOLATION => {
                RepositoryError::AlreadyExists(detail)
            }
            Some((code, detail)) if code == FOREIGN_KEY_VIOLATION => {
                RepositoryError::ForeignKey(detail)
            }
            _ => RepositoryError::Sqlx(err),
        }
    }
}
