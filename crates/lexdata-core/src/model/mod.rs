// ── Domain model ──
//
// Lexemes, their forms and senses, and the claims all three carry. Types
// mirror the `wbgetentities` JSON; unknown fields are kept in `extra`.

pub mod claim;
pub mod form;
pub mod language;
pub mod lexeme;
pub mod sense;

pub use claim::{Claim, Claims};
pub use form::Form;
pub use language::{Language, Term, TermMap, terms};
pub use lexeme::Lexeme;
pub use sense::Sense;

/// Anything claims can be added to: a lexeme, form, or sense.
pub trait Entity {
    fn id(&self) -> &str;
    fn claims(&self) -> &Claims;
    fn claims_mut(&mut self) -> &mut Claims;
}
