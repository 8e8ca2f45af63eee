//! Lexeme data layer on top of `lexdata-api`.
//!
//! - **[`LexemeRepo`]** -- reads lexemes and performs the edits a
//!   lexicographical bot needs: create lexemes, forms, and senses, add
//!   claims to any of them, and apply raw `wbeditentity` documents.
//!   [`get_or_create_lexeme`](LexemeRepo::get_or_create_lexeme) looks a
//!   lemma up first and creates it only when no lexeme matches.
//!
//! - **Domain model** ([`model`]) -- [`Lexeme`], [`Form`], [`Sense`] and
//!   their [`Claims`], deserialized straight from `wbgetentities` JSON.
//!   The [`Entity`] trait is what claims get added to.

pub mod error;
pub mod model;
pub mod repo;
pub mod requests;
pub mod search;

pub use error::CoreError;
pub use model::{Claim, Claims, Entity, Form, Language, Lexeme, Sense, Term, TermMap};
pub use repo::LexemeRepo;
pub use requests::{NewForm, NewLexeme, NewSense};
pub use search::{OnMultiple, SearchPolicy};
