// ── Typed edit payloads ──
//
// The `data` parameter of `wbeditentity`, `wbladdform`, and `wbladdsense`
// is a JSON document. These structs build it instead of ad-hoc `json!`.

use serde::{Deserialize, Serialize};

use crate::model::{Language, TermMap, terms};

/// `data` for `wbeditentity` with `new=lexeme`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLexeme {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub lemmas: TermMap,
    pub language: String,
    pub lexical_category: String,
    pub forms: Vec<NewForm>,
}

impl NewLexeme {
    pub fn new(lemma: &str, language: &Language, lexical_category: &str) -> Self {
        Self {
            entity_type: "lexeme".into(),
            lemmas: terms([(language.code(), lemma)]),
            language: language.qid().to_owned(),
            lexical_category: lexical_category.to_owned(),
            forms: Vec::new(),
        }
    }
}

/// `data` for `wbladdform`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewForm {
    pub representations: TermMap,
    pub grammatical_features: Vec<String>,
}

impl NewForm {
    pub fn new(representation: &str, language_code: &str, grammatical_features: &[&str]) -> Self {
        Self {
            representations: terms([(language_code, representation)]),
            grammatical_features: grammatical_features
                .iter()
                .map(|&feature| feature.to_owned())
                .collect(),
        }
    }
}

/// `data` for `wbladdsense`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSense {
    pub glosses: TermMap,
}

impl NewSense {
    /// Glosses from `(language code, gloss)` pairs.
    pub fn new<'a>(glosses: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            glosses: terms(glosses),
        }
    }
}
