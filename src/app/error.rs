use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Write to {table} failed after {applied} rows: {source}")]
    PartialWrite {
        table: &'static str,
        applied: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Remote rejected request with status {status_code}{}", message_suffix(.message))]
    RemoteRejected {
        status_code: i64,
        message: Option<String>,
    },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification used by the sync pipeline to decide what is
/// recoverable per record and what aborts a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkFailure,
    RemoteRejected,
    MalformedRecord,
    StorageFailure,
    NotSupported,
    Other,
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Database(_)
            | CatalogError::PartialWrite { .. }
            | CatalogError::Migration(_) => ErrorKind::StorageFailure,
            CatalogError::Http(_) | CatalogError::Network(_) => ErrorKind::NetworkFailure,
            CatalogError::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            CatalogError::MalformedRecord(_) | CatalogError::Json(_) => {
                ErrorKind::MalformedRecord
            }
            CatalogError::NotSupported(_) => ErrorKind::NotSupported,
            CatalogError::InvalidUrl(_) | CatalogError::Io(_) | CatalogError::Config(_) => {
                ErrorKind::Other
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

fn message_suffix(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            CatalogError::Network("timed out".into()).kind(),
            ErrorKind::NetworkFailure
        );
        assert_eq!(
            CatalogError::MalformedRecord("missing overview".into()).kind(),
            ErrorKind::MalformedRecord
        );
        assert_eq!(
            CatalogError::PartialWrite {
                table: "movies",
                applied: 3,
                source: rusqlite::Error::InvalidQuery,
            }
            .kind(),
            ErrorKind::StorageFailure
        );
        assert_eq!(
            CatalogError::NotSupported("shows".into()).kind(),
            ErrorKind::NotSupported
        );
    }

    #[test]
    fn test_remote_rejected_display() {
        let err = CatalogError::RemoteRejected {
            status_code: 34,
            message: Some("The resource you requested could not be found.".into()),
        };
        assert_eq!(
            err.to_string(),
            "Remote rejected request with status 34: The resource you requested could not be found."
        );

        let bare = CatalogError::RemoteRejected {
            status_code: 7,
            message: None,
        };
        assert_eq!(bare.to_string(), "Remote rejected request with status 7");
    }

    #[test]
    fn test_partial_write_reports_progress() {
        let err = CatalogError::PartialWrite {
            table: "reviews",
            applied: 2,
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().starts_with("Write to reviews failed after 2 rows"));
    }
}
