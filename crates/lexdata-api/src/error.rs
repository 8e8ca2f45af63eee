use thiserror::Error;

/// Coarse classification of [`Error`] variants.
///
/// Callers that only care about *what kind* of failure happened (bad
/// credentials vs. refused edit vs. malformed value) can branch on this
/// instead of matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Login was attempted and the server did not report success.
    Authentication,
    /// A write was refused by the server.
    Permission,
    /// Transport failure, non-200 response, or a failed read.
    Request,
    /// A native value does not fit the datatype it was encoded for.
    Type,
    /// Datatype or value discriminator unknown to the codec.
    NotImplemented,
    /// Data is present but in a state the library cannot interpret.
    InvalidState,
}

/// Top-level error type for the `lexdata-api` crate.
///
/// Covers the session (authentication, CSRF, maxlag, transport) and the
/// claim-value codec. `lexdata-core` wraps it in its own error type.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login did not report `Success`. Carries the server's reason.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A write asked for `__AUTO__` but the session holds no CSRF token.
    #[error("No CSRF token available -- log in or supply a token")]
    MissingCsrfToken,

    // ── API ─────────────────────────────────────────────────────────
    /// API-level error reported in the body of a POST response.
    #[error("API refused the request ({code}): {info}")]
    Permission { code: String, info: String },

    /// Non-200 response without a structured error, or an API-level
    /// error on a GET.
    #[error("Request failed (HTTP {status}): {body}")]
    Request {
        status: u16,
        code: Option<String>,
        body: String,
    },

    /// The server kept answering `maxlag` beyond the configured budget.
    #[error("Server still lagged after {attempts} maxlag retries")]
    MaxlagRetriesExhausted { attempts: u32 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The schema lookup for a property found no page.
    #[error("Property not found: {property}")]
    PropertyNotFound { property: String },

    // ── Codec ───────────────────────────────────────────────────────
    /// The native value does not have the shape the datatype requires.
    #[error("Cannot convert {found} to datatype {datatype}")]
    TypeMismatch { datatype: String, found: String },

    /// A wire payload is missing fields its `type` requires.
    #[error("Malformed {value_type} value: {reason}")]
    MalformedValue { value_type: String, reason: String },

    /// Encoding for this property datatype is not implemented.
    #[error("Datatype {0} not implemented")]
    UnsupportedDatatype(String),

    /// Decoding for this wire value type is not implemented.
    #[error("Value type {0} not implemented")]
    UnsupportedValueType(String),

    /// Snak carries no datavalue (`somevalue` / `novalue`).
    #[error("Snak for {property} has no value ({snaktype})")]
    NoValue { property: String, snaktype: String },

    /// Claim rank outside `preferred` / `normal` / `deprecated`.
    #[error("Unknown or invalid rank {0}")]
    InvalidRank(String),
}

impl Error {
    /// Project this error onto the coarse [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } | Self::MissingCsrfToken => ErrorKind::Authentication,
            Self::Permission { .. } => ErrorKind::Permission,
            Self::Request { .. }
            | Self::MaxlagRetriesExhausted { .. }
            | Self::Transport(_)
            | Self::InvalidUrl(_)
            | Self::Tls(_)
            | Self::Deserialization { .. }
            | Self::PropertyNotFound { .. } => ErrorKind::Request,
            Self::TypeMismatch { .. } | Self::MalformedValue { .. } => ErrorKind::Type,
            Self::UnsupportedDatatype(_) | Self::UnsupportedValueType(_) => {
                ErrorKind::NotImplemented
            }
            Self::NoValue { .. } | Self::InvalidRank(_) => ErrorKind::InvalidState,
        }
    }

    /// Returns `true` if recreating the session (fresh login / token)
    /// might resolve this error.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::MissingCsrfToken => true,
            Self::Permission { code, .. } => matches!(
                code.as_str(),
                "badtoken" | "notloggedin" | "assertuserfailed" | "assertbotfailed"
            ),
            _ => false,
        }
    }

    /// Extract the API error code, if the server reported one.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Permission { code, .. } => Some(code),
            Self::Request { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let err = Error::TypeMismatch {
            datatype: "quantity".into(),
            found: "string".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(
            Error::UnsupportedDatatype("foo".into()).kind(),
            ErrorKind::NotImplemented
        );
        assert_eq!(
            Error::InvalidRank("best".into()).kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            Error::MaxlagRetriesExhausted { attempts: 3 }.kind(),
            ErrorKind::Request
        );
    }

    #[test]
    fn badtoken_is_auth_failure() {
        let err = Error::Permission {
            code: "badtoken".into(),
            info: "Invalid CSRF token.".into(),
        };
        assert!(err.is_auth_failure());
        assert_eq!(err.api_error_code(), Some("badtoken"));

        let conflict = Error::Permission {
            code: "editconflict".into(),
            info: "Edit conflict.".into(),
        };
        assert!(!conflict.is_auth_failure());
    }
}
