// Session: one authenticated connection to an action API endpoint.

pub mod client;
pub mod login;

pub use client::{MaxlagPolicy, Session, WIKIDATA_API_URL};
pub use login::SessionBuilder;
