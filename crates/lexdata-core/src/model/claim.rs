// ── Claims ──
//
// A claim is either read from an entity (it has an id) or built locally
// from a property and a value and not yet uploaded ("detached").

use std::fmt;

use indexmap::IndexMap;
use lexdata_api::{Datatype, PureValue, Rank, Snak};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub mainsnak: Snak,
    /// Raw rank as sent by the server; see [`Claim::rank`].
    #[serde(default = "normal_rank")]
    pub rank: String,
    /// `type`, `qualifiers`, `references`, ... kept for round-tripping.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn normal_rank() -> String {
    Rank::Normal.to_string()
}

impl Claim {
    /// A detached claim with `normal` rank around a locally built snak.
    pub fn detached(mainsnak: Snak) -> Self {
        Self {
            id: None,
            mainsnak,
            rank: normal_rank(),
            extra: Map::new(),
        }
    }

    pub fn property(&self) -> &str {
        &self.mainsnak.property
    }

    pub fn datatype(&self) -> Option<&Datatype> {
        self.mainsnak.datatype.as_ref()
    }

    /// The raw datavalue payload, if the snak has one.
    pub fn value(&self) -> Option<&Value> {
        self.mainsnak.datavalue.as_ref().map(|dv| &dv.value)
    }

    pub fn rank_str(&self) -> &str {
        &self.rank
    }

    pub fn rank(&self) -> Result<Rank, lexdata_api::Error> {
        Rank::parse(&self.rank)
    }

    pub fn numeric_rank(&self) -> Result<i8, lexdata_api::Error> {
        self.rank().map(Rank::numeric)
    }

    pub fn pure_value(&self) -> Result<PureValue, lexdata_api::Error> {
        self.mainsnak.pure_value()
    }

    /// Built locally and not yet part of any entity.
    pub fn is_detached(&self) -> bool {
        self.id.is_none()
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self
            .value()
            .map_or_else(|| self.mainsnak.snaktype.to_string(), Value::to_string);
        if self.is_detached() {
            write!(f, "detached claim {} = {value}", self.property())
        } else {
            write!(f, "claim {} = {value}", self.property())
        }
    }
}

// ── Claims map ──────────────────────────────────────────────────────

/// Property id → claims for it, in server order.
///
/// The server sends an entity without claims as `[]` rather than `{}`;
/// both deserialize to an empty map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims(IndexMap<String, Vec<Claim>>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims for `property`; empty if there are none.
    pub fn get(&self, property: &str) -> &[Claim] {
        self.0.get(property).map_or(&[], Vec::as_slice)
    }

    /// Append `claim` under its own property.
    pub fn push(&mut self, claim: Claim) {
        self.0
            .entry(claim.property().to_owned())
            .or_default()
            .push(claim);
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Claim])> {
        self.0.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    /// Number of properties with at least one claim.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of claims over all properties.
    pub fn count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl FromIterator<Claim> for Claims {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        let mut claims = Self::new();
        for claim in iter {
            claims.push(claim);
        }
        claims
    }
}

impl<'de> Deserialize<'de> for Claims {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(list) if list.is_empty() => Ok(Self::default()),
            Value::Array(_) => Err(serde::de::Error::custom(
                "claims must be an object keyed by property id",
            )),
            other => IndexMap::<String, Vec<Claim>>::deserialize(other)
                .map(Self)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lexdata_api::{DataValue, ErrorKind, ValueType};
    use serde_json::json;

    use super::*;

    fn server_claim() -> Value {
        json!({
            "mainsnak": {
                "snaktype": "value",
                "property": "P5137",
                "hash": "5c3c2aa5",
                "datavalue": {
                    "value": {"entity-type": "item", "numeric-id": 19809, "id": "Q19809"},
                    "type": "wikibase-entityid"
                },
                "datatype": "wikibase-item"
            },
            "type": "statement",
            "id": "L2-S1$1B1A9A48-6B73-4A8D-A7C5-4B5B1E0E4A37",
            "rank": "preferred"
        })
    }

    #[test]
    fn server_claim_accessors() {
        let claim: Claim = serde_json::from_value(server_claim()).unwrap();
        assert!(!claim.is_detached());
        assert_eq!(claim.property(), "P5137");
        assert_eq!(claim.datatype(), Some(&Datatype::WikibaseItem));
        assert_eq!(claim.value().unwrap()["id"], "Q19809");
        assert_eq!(claim.rank().unwrap(), Rank::Preferred);
        assert_eq!(claim.numeric_rank().unwrap(), 1);
        assert_eq!(claim.pure_value().unwrap(), PureValue::String("Q19809".into()));
        assert_eq!(claim.extra["type"], "statement");
    }

    #[test]
    fn server_claim_round_trips() {
        let claim: Claim = serde_json::from_value(server_claim()).unwrap();
        assert_eq!(serde_json::to_value(&claim).unwrap(), server_claim());
    }

    #[test]
    fn detached_claim() {
        let datavalue = DataValue::new(ValueType::String, json!({"value": "ˈfɜːst"}));
        let claim = Claim::detached(Snak::value("P898", Datatype::String, datavalue));
        assert!(claim.is_detached());
        assert_eq!(claim.rank_str(), "normal");
        assert_eq!(claim.numeric_rank().unwrap(), 0);
        assert_eq!(claim.to_string(), r#"detached claim P898 = {"value":"ˈfɜːst"}"#);
    }

    #[test]
    fn unknown_rank_is_invalid_state() {
        let mut raw = server_claim();
        raw["rank"] = json!("best");
        let claim: Claim = serde_json::from_value(raw).unwrap();
        assert_eq!(claim.rank_str(), "best");
        assert_eq!(claim.numeric_rank().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn empty_list_is_empty_claims() {
        let claims: Claims = serde_json::from_value(json!([])).unwrap();
        assert!(claims.is_empty());
        assert!(serde_json::from_value::<Claims>(json!([server_claim()])).is_err());
    }

    #[test]
    fn claims_grouped_by_property() {
        let first: Claim = serde_json::from_value(server_claim()).unwrap();
        let mut claims: Claims = std::iter::once(first.clone()).collect();
        claims.push(first);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims.count(), 2);
        assert_eq!(claims.get("P5137").len(), 2);
        assert!(claims.get("P31").is_empty());
    }

    #[test]
    fn malformed_claim_reports_inner_error() {
        let mut raw = server_claim();
        raw["mainsnak"] = json!(5);
        let err = serde_json::from_value::<Claims>(json!({"P5137": [raw]})).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid type"), "got: {message}");
        assert!(!message.contains("untagged"), "got: {message}");
    }
}
