// ── Lexeme search and search-or-create ──

use lexdata_api::Params;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{Claim, Language, Lexeme};
use crate::repo::LexemeRepo;

/// What [`LexemeRepo::get_or_create_lexeme`] does when several existing
/// lexemes match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnMultiple {
    /// Take the first match in search order (logged at `warn`).
    #[default]
    First,
    /// Fail with [`CoreError::Ambiguous`].
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPolicy {
    /// Compare labels with the lemma case-sensitively.
    pub case_sensitive: bool,
    pub on_multiple: OnMultiple,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            on_multiple: OnMultiple::First,
        }
    }
}

impl SearchPolicy {
    fn label_matches(self, label: &str, lemma: &str) -> bool {
        if self.case_sensitive {
            label == lemma
        } else {
            label.to_lowercase() == lemma.to_lowercase()
        }
    }
}

impl LexemeRepo {
    /// Existing lexemes with exactly this lemma, language, and lexical
    /// category, in search order.
    ///
    /// Every label hit is fetched to check language and category, so this
    /// costs one request per candidate.
    pub async fn search_lexemes(
        &self,
        lemma: &str,
        language: &Language,
        lexical_category: &str,
        policy: &SearchPolicy,
    ) -> Result<Vec<Lexeme>, CoreError> {
        let data = self
            .session()
            .get(
                &Params::action("wbsearchentities")
                    .with("language", language.search_language())
                    .with("type", "lexeme")
                    .with("search", lemma),
            )
            .await?;
        let hits = data
            .get("search")
            .and_then(Value::as_array)
            .ok_or_else(|| CoreError::missing("search", "wbsearchentities"))?;

        let mut found = Vec::new();
        for hit in hits {
            let label = hit.get("label").and_then(Value::as_str).unwrap_or_default();
            let Some(id) = hit.get("id").and_then(Value::as_str) else {
                continue;
            };
            if !policy.label_matches(label, lemma) {
                continue;
            }

            let lexeme = self.get_lexeme(id).await?;
            if lexeme.language == language.qid() && lexeme.lexical_category == lexical_category {
                debug!(id, "lexeme matches");
                found.push(lexeme);
            } else {
                debug!(
                    id,
                    language = %lexeme.language,
                    category = %lexeme.lexical_category,
                    "label matches but lexeme differs"
                );
            }
        }
        Ok(found)
    }

    /// Find the lexeme with this lemma, language, and lexical category,
    /// creating it when none exists.
    pub async fn get_or_create_lexeme(
        &self,
        lemma: &str,
        language: &Language,
        lexical_category: &str,
        policy: &SearchPolicy,
    ) -> Result<Lexeme, CoreError> {
        let found = self
            .search_lexemes(lemma, language, lexical_category, policy)
            .await?;
        let count = found.len();

        let mut found = found.into_iter();
        match (found.next(), policy.on_multiple) {
            (None, _) => {
                info!(lemma, "no lexeme found, creating");
                self.create_lexeme(lemma, language, lexical_category, Vec::<Claim>::new())
                    .await
            }
            (Some(_), OnMultiple::Error) if count > 1 => Err(CoreError::Ambiguous {
                lemma: lemma.to_owned(),
                count,
            }),
            (Some(lexeme), _) => {
                if count > 1 {
                    warn!(lemma, count, id = %lexeme.id, "several lexemes match, using the first");
                } else {
                    info!(lemma, id = %lexeme.id, "found lexeme");
                }
                Ok(lexeme)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_case_sensitive() {
        let policy = SearchPolicy::default();
        assert!(policy.label_matches("Bank", "Bank"));
        assert!(!policy.label_matches("bank", "Bank"));
        assert_eq!(policy.on_multiple, OnMultiple::First);
    }

    #[test]
    fn case_insensitive_policy() {
        let policy = SearchPolicy {
            case_sensitive: false,
            ..SearchPolicy::default()
        };
        assert!(policy.label_matches("BANK", "bank"));
        assert!(!policy.label_matches("banks", "bank"));
    }
}
