//! Session and claim-value codec for the Wikibase action API.
//!
//! - **[`Session`]** -- one authenticated connection to an `api.php`
//!   endpoint. [`Session::builder`] logs in (login token → credentials →
//!   CSRF token) when given a username and password. Writes get the CSRF
//!   token substituted for `__AUTO__`, an `assertuser` guard, and a
//!   `maxlag` threshold; `maxlag` errors are waited out per
//!   [`MaxlagPolicy`].
//!
//! - **[`codec`]** -- native values ([`NativeValue`]) to tagged wire
//!   datavalues ([`DataValue`]) and back to reduced [`PureValue`]s,
//!   dispatching on the property [`Datatype`] that [`Codec`] resolves
//!   through a [`DatatypeCache`].
//!
//! - **[`Rank`]** -- claim rank with its numeric projection.

pub mod auth;
pub mod codec;
pub mod error;
pub mod params;
pub mod rank;
pub mod session;
pub mod transport;

pub use auth::{AuthMode, Credentials, HttpAuth};
pub use codec::{
    Codec, DataValue, Datatype, DatatypeCache, NativeValue, PureValue, Snak, SnakType, ValueType,
};
pub use error::{Error, ErrorKind};
pub use params::{AUTO_TOKEN, Params};
pub use rank::Rank;
pub use session::{MaxlagPolicy, Session, SessionBuilder, WIKIDATA_API_URL};
pub use transport::{DEFAULT_USER_AGENT, TlsMode, TransportConfig};
