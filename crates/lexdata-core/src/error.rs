// ── Core error types ──
//
// Errors from the entity layer. Session and codec failures pass through
// unchanged as `Api`; the rest describe responses that did not contain
// what an edit operation needs.

use lexdata_api::ErrorKind;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Session, transport, or codec failure.
    #[error(transparent)]
    Api(#[from] lexdata_api::Error),

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// A successful response lacked a field the operation reads.
    #[error("Response to {context} has no `{field}`")]
    MissingField {
        field: &'static str,
        context: &'static str,
    },

    #[error("Malformed entity data: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Edit rejected by server: {message}")]
    Rejected { message: String },

    /// Several lexemes matched a search that was required to be unique.
    #[error("{count} lexemes match lemma {lemma:?}")]
    Ambiguous { lemma: String, count: usize },
}

impl CoreError {
    /// Project onto the coarse error taxonomy shared with `lexdata-api`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api(err) => err.kind(),
            Self::NotFound { .. }
            | Self::MissingField { .. }
            | Self::Serialization(_)
            | Self::Rejected { .. } => ErrorKind::Request,
            Self::Ambiguous { .. } => ErrorKind::InvalidState,
        }
    }

    pub(crate) fn missing(field: &'static str, context: &'static str) -> Self {
        Self::MissingField { field, context }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_kind() {
        let err = CoreError::from(lexdata_api::Error::Permission {
            code: "protectedpage".into(),
            info: "This page has been protected.".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(
            err.to_string(),
            "API refused the request (protectedpage): This page has been protected."
        );
    }

    #[test]
    fn ambiguity_is_invalid_state() {
        let err = CoreError::Ambiguous {
            lemma: "bank".into(),
            count: 2,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(err.to_string(), "2 lexemes match lemma \"bank\"");
    }
}
