use reqwest::StatusCode;
use std::path::PathBuf;

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Redfin answered with a non-2xx status. The body is kept for diagnostics.
    #[error("Redfin request failed: HTTP {status} for url ({url}){}", status_hint(.status))]
    Request {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The body, after the 4-character preamble, is not JSON.
    #[error("failed to decode Redfin response (url={url}): {reason}")]
    Decode { url: String, reason: String },

    /// A decoded payload is missing a field or index a helper needs.
    #[error("missing `{pointer}` in Redfin payload: {reason}")]
    Extraction { pointer: String, reason: String },

    #[error("could not reach {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid default header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the payload decoded fine but did not contain what was asked for,
    /// e.g. a search that matched nothing or a property without photos.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Error::Extraction { .. })
    }

    pub(crate) fn extraction(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Extraction {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn status_hint(status: &StatusCode) -> &'static str {
    // Redfin blocks clients without a browser-like user-agent and throttles bursts.
    match *status {
        StatusCode::FORBIDDEN => {
            "\n- Redfin rejects requests without a real user-agent; set one via ClientConfig::with_user_agent or REDFIN_USER_AGENT"
        }
        StatusCode::TOO_MANY_REQUESTS => {
            "\n- Redfin is throttling this client; slow down concurrent callers"
        }
        StatusCode::NOT_FOUND => {
            "\n- The endpoint path may have changed, or the configured base URL is incorrect"
        }
        _ => "",
    }
}
