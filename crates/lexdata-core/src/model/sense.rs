// ── Sense domain type ──

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::claim::Claims;
use super::language::TermMap;
use super::Entity;

/// One meaning of a lexeme, e.g. `L2-S1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    pub id: String,
    #[serde(default)]
    pub glosses: TermMap,
    #[serde(default)]
    pub claims: Claims,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sense {
    /// Gloss in `language`, else the English gloss, else whichever comes
    /// first. `None` only when the sense has no glosses at all.
    pub fn gloss(&self, language: &str) -> Option<&str> {
        self.glosses
            .get(language)
            .or_else(|| self.glosses.get("en"))
            .or_else(|| self.glosses.values().next())
            .map(|term| term.value.as_str())
    }
}

impl Entity for Sense {
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

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sense {} ({})", self.id, self.gloss("en").unwrap_or("?"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sense() -> Sense {
        serde_json::from_value(json!({
            "id": "L7-S1",
            "glosses": {
                "de": {"language": "de", "value": "Geldinstitut"},
                "en": {"language": "en", "value": "financial institution"}
            },
            "claims": []
        }))
        .unwrap()
    }

    #[test]
    fn gloss_in_requested_language() {
        assert_eq!(sense().gloss("de"), Some("Geldinstitut"));
    }

    #[test]
    fn gloss_falls_back_to_english() {
        assert_eq!(sense().gloss("fr"), Some("financial institution"));
    }

    #[test]
    fn gloss_falls_back_to_any() {
        let mut sense = sense();
        sense.glosses.shift_remove("en");
        assert_eq!(sense.gloss("fr"), Some("Geldinstitut"));
        sense.glosses.clear();
        assert_eq!(sense.gloss("fr"), None);
    }
}
