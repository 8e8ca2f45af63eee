// Claim-value codec
//
// Native values ⇄ the tagged `{type, value}` datavalues claims carry on the
// wire. Encoding needs the property's datatype, which `Codec` resolves
// through an injectable `DatatypeCache` backed by the session.

pub mod cache;
pub mod datatype;
pub mod value;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use cache::DatatypeCache;
pub use datatype::{Datatype, Family};
pub use value::{DataValue, NativeValue, PureValue, ValueType, decode, encode};

use crate::error::Error;
use crate::session::Session;

// ── Snak ────────────────────────────────────────────────────────────

/// Whether a snak states a value, an unknown value, or no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnakType {
    #[default]
    Value,
    SomeValue,
    NoValue,
}

impl SnakType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::SomeValue => "somevalue",
            Self::NoValue => "novalue",
        }
    }
}

impl fmt::Display for SnakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{snaktype, property, datavalue, datatype}` -- the main value of a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snak {
    #[serde(default)]
    pub snaktype: SnakType,
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datavalue: Option<DataValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<Datatype>,
    /// Server-side fields (`hash`, ...) kept for round-tripping.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Snak {
    /// A `value` snak for a freshly encoded datavalue.
    pub fn value(property: impl Into<String>, datatype: Datatype, datavalue: DataValue) -> Self {
        Self {
            snaktype: SnakType::Value,
            property: property.into(),
            datavalue: Some(datavalue),
            datatype: Some(datatype),
            extra: Map::new(),
        }
    }

    /// The decoded value; `somevalue`/`novalue` snaks have none.
    pub fn pure_value(&self) -> Result<PureValue, Error> {
        match &self.datavalue {
            Some(datavalue) => decode(datavalue),
            None => Err(Error::NoValue {
                property: self.property.clone(),
                snaktype: self.snaktype.to_string(),
            }),
        }
    }
}

// ── Codec ───────────────────────────────────────────────────────────

/// Datatype-aware encoder.
///
/// Cheap to clone; clones share the datatype cache.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    cache: Arc<DatatypeCache>,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-owned cache (shared between codecs, or pre-seeded).
    pub fn with_cache(cache: Arc<DatatypeCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<DatatypeCache> {
        &self.cache
    }

    pub async fn datatype(&self, session: &Session, property: &str) -> Result<Datatype, Error> {
        self.cache.resolve(session, property).await
    }

    /// Encode `value` for `property`, resolving its datatype first.
    pub async fn encode(
        &self,
        session: &Session,
        property: &str,
        value: NativeValue,
    ) -> Result<DataValue, Error> {
        let datatype = self.datatype(session, property).await?;
        encode(&datatype, value)
    }

    /// Build the main snak for a new claim on `property`.
    pub async fn snak(
        &self,
        session: &Session,
        property: &str,
        value: NativeValue,
    ) -> Result<Snak, Error> {
        let datatype = self.datatype(session, property).await?;
        let datavalue = encode(&datatype, value)?;
        Ok(Snak::value(property, datatype, datavalue))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn server_snak_parses() {
        let snak: Snak = serde_json::from_value(json!({
            "snaktype": "value",
            "property": "P5831",
            "hash": "abc",
            "datavalue": {"value": {"text": "He was first in line.", "language": "en"}, "type": "monolingualtext"},
            "datatype": "monolingualtext"
        }))
        .unwrap();
        assert_eq!(snak.datatype, Some(Datatype::MonolingualText));
        assert_eq!(snak.extra["hash"], "abc");
        assert_eq!(
            snak.pure_value().unwrap().as_str(),
            Some("He was first in line.")
        );
    }

    #[test]
    fn novalue_snak_has_no_pure_value() {
        let snak: Snak = serde_json::from_value(json!({
            "snaktype": "novalue",
            "property": "P31",
            "datatype": "wikibase-item"
        }))
        .unwrap();
        let err = snak.pure_value().unwrap_err();
        assert!(matches!(err, Error::NoValue { ref snaktype, .. } if snaktype == "novalue"));
    }

    #[test]
    fn value_snak_serializes_wire_shape() {
        let datavalue = encode(&Datatype::WikibaseItem, "Q100".into()).unwrap();
        let snak = Snak::value("P7", Datatype::WikibaseItem, datavalue);
        assert_eq!(
            serde_json::to_value(&snak).unwrap(),
            json!({
                "snaktype": "value",
                "property": "P7",
                "datavalue": {"type": "wikibase-entity", "value": {"entity-type": "item", "id": "Q100"}},
                "datatype": "wikibase-item"
            })
        );
    }
}
