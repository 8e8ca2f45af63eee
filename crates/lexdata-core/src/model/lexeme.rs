// ── Lexeme domain type ──

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::claim::Claims;
use super::form::Form;
use super::language::TermMap;
use super::sense::Sense;
use super::Entity;

/// A lexeme as returned by `wbgetentities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lexeme {
    pub id: String,
    #[serde(default)]
    pub lemmas: TermMap,
    /// Item id of the lexeme's language.
    pub language: String,
    /// Item id of the lexical category (noun, verb, ...).
    pub lexical_category: String,
    #[serde(default)]
    pub forms: Vec<Form>,
    #[serde(default)]
    pub senses: Vec<Sense>,
    #[serde(default)]
    pub claims: Claims,
    /// `type`, `lastrevid`, `pageid`, ... kept for round-tripping.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Lexeme {
    /// The first lemma.
    pub fn lemma(&self) -> Option<&str> {
        self.lemmas.values().next().map(|term| term.value.as_str())
    }

    /// Term language code of the first lemma.
    pub fn lemma_language(&self) -> Option<&str> {
        self.lemmas.values().next().map(|term| term.language.as_str())
    }

    pub fn form(&self, id: &str) -> Option<&Form> {
        self.forms.iter().find(|form| form.id == id)
    }

    pub fn sense(&self, id: &str) -> Option<&Sense> {
        self.senses.iter().find(|sense| sense.id == id)
    }

    pub fn last_revision(&self) -> Option<u64> {
        self.extra.get("lastrevid").and_then(Value::as_u64)
    }
}

impl Entity for Lexeme {
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

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lexeme {} ({})", self.id, self.lemma().unwrap_or("?"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn lexeme_json() -> Value {
        json!({
            "type": "lexeme",
            "id": "L2",
            "lastrevid": 1_234_567,
            "lemmas": {"en": {"language": "en", "value": "first"}},
            "lexicalCategory": "Q1084",
            "language": "Q1860",
            "claims": {
                "P5185": [{
                    "mainsnak": {
                        "snaktype": "value",
                        "property": "P5185",
                        "datavalue": {
                            "value": {"entity-type": "item", "numeric-id": 499_327, "id": "Q499327"},
                            "type": "wikibase-entityid"
                        },
                        "datatype": "wikibase-item"
                    },
                    "type": "statement",
                    "id": "L2$0F0C7F5E-4D2B-4B57-9D28-0B3F7C9B3E11",
                    "rank": "normal"
                }]
            },
            "forms": [{
                "id": "L2-F1",
                "representations": {"en": {"language": "en", "value": "first"}},
                "grammaticalFeatures": [],
                "claims": []
            }],
            "senses": [{
                "id": "L2-S1",
                "glosses": {"en": {"language": "en", "value": "earliest in time"}},
                "claims": []
            }]
        })
    }

    #[test]
    fn parses_server_lexeme() {
        let lexeme: Lexeme = serde_json::from_value(lexeme_json()).unwrap();
        assert_eq!(lexeme.lemma(), Some("first"));
        assert_eq!(lexeme.lemma_language(), Some("en"));
        assert_eq!(lexeme.lexical_category, "Q1084");
        assert_eq!(lexeme.last_revision(), Some(1_234_567));
        assert_eq!(lexeme.claims().count(), 1);
        assert_eq!(lexeme.form("L2-F1").unwrap().representation(), Some("first"));
        assert!(lexeme.form("L2-F1").unwrap().claims().is_empty());
        assert_eq!(lexeme.sense("L2-S1").unwrap().gloss("en"), Some("earliest in time"));
        assert_eq!(lexeme.to_string(), "Lexeme L2 (first)");
    }

    #[test]
    fn claims_list_serializes_as_object() {
        let lexeme: Lexeme = serde_json::from_value(lexeme_json()).unwrap();
        let back = serde_json::to_value(&lexeme).unwrap();
        assert_eq!(back["forms"][0]["claims"], json!({}));
        assert_eq!(back["claims"], lexeme_json()["claims"]);
        assert_eq!(back["lexicalCategory"], "Q1084");
    }
}
