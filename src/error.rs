//! Error types for the fetch and persistence stages.

use std::path::PathBuf;

use reqwest::StatusCode;

/// Failure of a single HTTP round trip against the bus API.
#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    /// The URL could not be built from the configured base.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// The body was not the JSON shape we expected.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure of one of the two fetch stages.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Listing all buses failed. Fatal for the run.
    #[error("failed to fetch bus list")]
    List(#[source] RequestError),
    /// Fetching one bus failed. The orchestrator skips the bus and continues.
    #[error("failed to fetch bus {id}")]
    Detail {
        id: i64,
        #[source]
        source: RequestError,
    },
}

impl FetchError {
    /// Identifier of the bus whose detail fetch failed, if any.
    pub fn entity_id(&self) -> Option<i64> {
        match self {
            FetchError::List(_) => None,
            FetchError::Detail { id, .. } => Some(*id),
        }
    }

    /// The underlying request failure.
    pub fn request_error(&self) -> &RequestError {
        match self {
            FetchError::List(source) | FetchError::Detail { source, .. } => source,
        }
    }
}

/// Failure while writing or reading the collected document.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bus data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_only_for_detail_failures() {
        let list = FetchError::List(RequestError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        });
        assert_eq!(list.entity_id(), None);

        let detail = FetchError::Detail {
            id: 42,
            source: RequestError::Status {
                status: StatusCode::NOT_FOUND,
                body: "missing".to_string(),
            },
        };
        assert_eq!(detail.entity_id(), Some(42));
        assert!(matches!(
            detail.request_error(),
            RequestError::Status { status, .. } if *status == StatusCode::NOT_FOUND
        ));
    }

    #[test]
    fn test_display_includes_context() {
        let err = FetchError::Detail {
            id: 7,
            source: RequestError::InvalidUrl {
                url: "nope".to_string(),
                reason: "relative URL without a base".to_string(),
            },
        };
        assert_eq!(err.to_string(), "failed to fetch bus 7");
        assert!(err.request_error().to_string().contains("nope"));
    }
}
