// ── Languages and terms ──

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A language as a lexeme needs it: the term language code used for
/// lemmas and representations, and the item describing the language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
    code: Cow<'static, str>,
    qid: Cow<'static, str>,
}

impl Language {
    pub const EN: Self = Self::from_static("en", "Q1860");
    pub const DE: Self = Self::from_static("de", "Q188");
    pub const FR: Self = Self::from_static("fr", "Q150");

    pub fn new(code: impl Into<String>, qid: impl Into<String>) -> Self {
        Self {
            code: Cow::Owned(code.into()),
            qid: Cow::Owned(qid.into()),
        }
    }

    pub const fn from_static(code: &'static str, qid: &'static str) -> Self {
        Self {
            code: Cow::Borrowed(code),
            qid: Cow::Borrowed(qid),
        }
    }

    /// Term language code, e.g. `en` or `mis-x-Q36790`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Item id of the language, e.g. `Q1860`.
    pub fn qid(&self) -> &str {
        &self.qid
    }

    /// Language to run `wbsearchentities` in.
    ///
    /// Search results do not depend much on it, but it must be a code the
    /// search accepts; `mis` codes are not, so those search in English.
    pub fn search_language(&self) -> &str {
        if self.code.starts_with("mis") {
            "en"
        } else {
            &self.code
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.qid)
    }
}

/// A string in one language: lemma, representation, or gloss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub language: String,
    pub value: String,
}

impl Term {
    pub fn new(language: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            value: value.into(),
        }
    }
}

/// Language code → term, in server order.
pub type TermMap = indexmap::IndexMap<String, Term>;

/// Build a [`TermMap`] from `(language, value)` pairs.
pub fn terms<I, L, V>(pairs: I) -> TermMap
where
    I: IntoIterator<Item = (L, V)>,
    L: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(language, value)| {
            let term = Term::new(language, value);
            (term.language.clone(), term)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_languages() {
        assert_eq!(Language::EN.code(), "en");
        assert_eq!(Language::EN.qid(), "Q1860");
        assert_eq!(Language::DE.qid(), "Q188");
        assert_eq!(Language::FR.to_string(), "fr (Q150)");
    }

    #[test]
    fn mis_codes_search_in_english() {
        let lang = Language::new("mis-x-Q36790", "Q36790");
        assert_eq!(lang.search_language(), "en");
        assert_eq!(Language::DE.search_language(), "de");
    }

    #[test]
    fn terms_keep_insertion_order() {
        let map = terms([("fr", "banque"), ("en", "bank")]);
        let codes: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(codes, ["fr", "en"]);
        assert_eq!(map["en"], Term::new("en", "bank"));
    }
}
