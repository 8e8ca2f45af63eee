// ── Property datatypes ──
//
// The datatype string a property declares decides how a native value is
// encoded. Parsing never fails: unknown strings become `Other` and only
// fail once something tries to encode with them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declared datatype of a property (`"wikibase-item"`, `"time"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
    WikibaseItem,
    WikibaseProperty,
    WikibaseLexeme,
    WikibaseForm,
    WikibaseSense,
    String,
    ExternalId,
    Url,
    CommonsMedia,
    TabularData,
    GeoShape,
    MusicalNotation,
    Math,
    MonolingualText,
    GlobeCoordinate,
    Quantity,
    Time,
    /// Anything this library does not know how to encode.
    Other(String),
}

/// Encoding family a datatype belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Entity reference; carries the `entity-type` to emit.
    Entity(&'static str),
    /// Plain string payload (strings, identifiers, URLs, media, ...).
    Text,
    MonolingualText,
    GlobeCoordinate,
    Quantity,
    Time,
}

impl Datatype {
    pub fn as_str(&self) -> &str {
        match self {
            Self::WikibaseItem => "wikibase-item",
            Self::WikibaseProperty => "wikibase-property",
            Self::WikibaseLexeme => "wikibase-lexeme",
            Self::WikibaseForm => "wikibase-form",
            Self::WikibaseSense => "wikibase-sense",
            Self::String => "string",
            Self::ExternalId => "external-id",
            Self::Url => "url",
            Self::CommonsMedia => "commonsMedia",
            Self::TabularData => "tabular-data",
            Self::GeoShape => "geo-shape",
            Self::MusicalNotation => "musical-notation",
            Self::Math => "math",
            Self::MonolingualText => "monolingualtext",
            Self::GlobeCoordinate => "globe-coordinate",
            Self::Quantity => "quantity",
            Self::Time => "time",
            Self::Other(s) => s,
        }
    }

    /// The encoding family, or `None` for datatypes without an encoder.
    pub fn family(&self) -> Option<Family> {
        Some(match self {
            Self::WikibaseItem => Family::Entity("item"),
            Self::WikibaseProperty => Family::Entity("property"),
            Self::WikibaseLexeme => Family::Entity("lexeme"),
            Self::WikibaseForm => Family::Entity("form"),
            Self::WikibaseSense => Family::Entity("sense"),
            Self::String
            | Self::ExternalId
            | Self::Url
            | Self::CommonsMedia
            | Self::TabularData
            | Self::GeoShape
            | Self::MusicalNotation
            | Self::Math => Family::Text,
            Self::MonolingualText => Family::MonolingualText,
            Self::GlobeCoordinate => Family::GlobeCoordinate,
            Self::Quantity => Family::Quantity,
            Self::Time => Family::Time,
            Self::Other(_) => return None,
        })
    }
}

impl FromStr for Datatype {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "wikibase-item" => Self::WikibaseItem,
            "wikibase-property" => Self::WikibaseProperty,
            "wikibase-lexeme" => Self::WikibaseLexeme,
            "wikibase-form" => Self::WikibaseForm,
            "wikibase-sense" => Self::WikibaseSense,
            "string" => Self::String,
            "external-id" => Self::ExternalId,
            "url" => Self::Url,
            "commonsMedia" => Self::CommonsMedia,
            "tabular-data" => Self::TabularData,
            "geo-shape" => Self::GeoShape,
            "musical-notation" => Self::MusicalNotation,
            "math" => Self::Math,
            "monolingualtext" => Self::MonolingualText,
            "globe-coordinate" => Self::GlobeCoordinate,
            "quantity" => Self::Quantity,
            "time" => Self::Time,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl From<&str> for Datatype {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(datatype) => datatype,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Datatype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Datatype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_strings_round_trip() {
        for raw in [
            "wikibase-item",
            "wikibase-sense",
            "external-id",
            "commonsMedia",
            "globe-coordinate",
            "quantity",
            "time",
        ] {
            assert_eq!(Datatype::from(raw).as_str(), raw);
        }
    }

    #[test]
    fn unknown_string_is_other() {
        let datatype = Datatype::from("wikibase-entity-schema");
        assert_eq!(
            datatype,
            Datatype::Other("wikibase-entity-schema".to_owned())
        );
        assert_eq!(datatype.family(), None);
        assert_eq!(datatype.to_string(), "wikibase-entity-schema");
    }

    #[test]
    fn entity_family_carries_entity_type() {
        assert_eq!(
            Datatype::WikibaseLexeme.family(),
            Some(Family::Entity("lexeme"))
        );
        assert_eq!(Datatype::Url.family(), Some(Family::Text));
    }
}
