// ── Form domain type ──

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::claim::Claims;
use super::language::TermMap;
use super::Entity;

/// One inflected or variant spelling of a lexeme, e.g. `L2-F1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    #[serde(default)]
    pub representations: TermMap,
    /// Item ids, e.g. `Q110786` (singular).
    #[serde(default)]
    pub grammatical_features: Vec<String>,
    #[serde(default)]
    pub claims: Claims,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Form {
    /// The first representation.
    pub fn representation(&self) -> Option<&str> {
        self.representations
            .values()
            .next()
            .map(|term| term.value.as_str())
    }
}

impl Entity for Form {
    fn id(&self) -> &str {
        &self.id
    }

    fn claims(&self) -> &Claims {
        &self.claims
    }

    fn claims_mut(&mut self) -> &mut Claims {
        &mut self.claims
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Form {} ({})", self.id, self.representation().unwrap_or("?"))
    }
}
