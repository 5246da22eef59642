//! Error types for edgectl-api.

use thiserror::Error;

use edgectl_sync::MAX_BATCH_ENTRIES;

/// All errors the API client can produce. Every variant names the operation
/// that failed so callers get context without wrapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status code.
    #[error("{op}: API returned status {status}")]
    Status { op: &'static str, status: u16 },

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("{op}: transport failure")]
    Transport {
        op: &'static str,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// The response body could not be decoded as the expected JSON shape.
    #[error("{op}: decoding response body")]
    Decode {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A batch mutation was handed more entries than one call may carry.
    /// Raised locally, before any request is made.
    #[error("batch of {len} entries exceeds the {}-entry limit", MAX_BATCH_ENTRIES)]
    BatchTooLarge { len: usize },
}

impl ApiError {
    /// True for 404-class answers: the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    pub(crate) fn from_ureq(op: &'static str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => ApiError::Status { op, status },
            ureq::Error::Transport(source) => ApiError::Transport {
                op,
                source: Box::new(source),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_limited_to_404() {
        let missing = ApiError::Status {
            op: "fetching dictionary",
            status: 404,
        };
        let denied = ApiError::Status {
            op: "fetching dictionary",
            status: 403,
        };

        assert!(missing.is_not_found());
        assert!(!denied.is_not_found());
        assert!(!ApiError::BatchTooLarge { len: 1001 }.is_not_found());
    }
}
