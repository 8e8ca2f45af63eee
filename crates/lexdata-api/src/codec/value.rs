// ── Claim values: native ⇄ wire ──
//
// `encode` turns a native value into the `{type, value}` datavalue a claim
// carries, dispatching on the property's datatype. `decode` goes the other
// way and is lossy: calendar model, precision, unit, and globe are dropped.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::codec::datatype::{Datatype, Family};
use crate::error::Error;

/// Calendar model attached to encoded timestamps (proleptic Gregorian).
pub const GREGORIAN_CALENDAR: &str = "http://www.wikidata.org/entity/Q1985727";

/// Time precision for a single day.
pub const PRECISION_DAY: u8 = 11;

// ── Native input ────────────────────────────────────────────────────

/// A value supplied by the caller for encoding.
///
/// Which variants a datatype accepts is checked by [`encode`]; `Payload`
/// is a pre-built wire payload and is passed through after a shape check.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    String(String),
    Integer(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Payload(Map<String, Value>),
}

impl NativeValue {
    /// Short name of the variant, used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::DateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Payload(_) => "mapping",
        }
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for NativeValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for NativeValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for NativeValue {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for NativeValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<NaiveDateTime> for NativeValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for NativeValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt.naive_utc())
    }
}

impl From<NaiveDate> for NativeValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<Map<String, Value>> for NativeValue {
    fn from(map: Map<String, Value>) -> Self {
        Self::Payload(map)
    }
}

// ── Wire value ──────────────────────────────────────────────────────

/// Discriminator of a wire datavalue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Entity,
    String,
    MonolingualText,
    GlobeCoordinate,
    Quantity,
    Time,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "wikibase-entity",
            Self::String => "string",
            Self::MonolingualText => "monolingualtext",
            Self::GlobeCoordinate => "globecoordinate",
            Self::Quantity => "quantity",
            Self::Time => "time",
        }
    }

    /// Parse a wire `type`. The server itself writes `wikibase-entityid`.
    pub fn from_wire(raw: &str) -> Option<Self> {
        Some(match raw {
            "wikibase-entity" | "wikibase-entityid" => Self::Entity,
            "string" => Self::String,
            "monolingualtext" => Self::MonolingualText,
            "globecoordinate" => Self::GlobeCoordinate,
            "quantity" => Self::Quantity,
            "time" => Self::Time,
            _ => return None,
        })
    }
}

/// `{"type": ..., "value": ...}` as found in a snak's `datavalue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValue {
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: Value,
}

impl DataValue {
    pub fn new(value_type: ValueType, value: Value) -> Self {
        Self {
            value_type: value_type.as_str().to_owned(),
            value,
        }
    }

    /// The parsed discriminator, or `None` if unknown.
    pub fn kind(&self) -> Option<ValueType> {
        ValueType::from_wire(&self.value_type)
    }

    /// The payload as `wbcreateclaim` expects it in its `value` parameter.
    ///
    /// String-family values are encoded as `{"value": "..."}` but the
    /// endpoint takes the bare JSON string.
    pub fn request_payload(&self) -> Value {
        if self.kind() == Some(ValueType::String) {
            if let Some(inner @ Value::String(_)) = self.value.get("value") {
                return inner.clone();
            }
        }
        self.value.clone()
    }

    pub fn pure_value(&self) -> Result<PureValue, Error> {
        decode(self)
    }
}

// ── Native output ───────────────────────────────────────────────────

/// The reduced value [`decode`] extracts from a datavalue.
#[derive(Debug, Clone, PartialEq)]
pub enum PureValue {
    /// Entity id (with its `Q`/`P`/`L` prefix), string, or monolingual text.
    String(String),
    /// Quantity amount.
    Number(f64),
    /// Timestamp exactly as stored, e.g. `+2021-03-04T00:00:00Z`.
    Time(String),
    /// Latitude, longitude.
    Coordinate(f64, f64),
}

impl PureValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Time(s) => Some(s),
            Self::Number(_) | Self::Coordinate(..) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_coordinate(&self) -> Option<(f64, f64)> {
        match self {
            Self::Coordinate(lat, lon) => Some((*lat, *lon)),
            _ => None,
        }
    }
}

impl fmt::Display for PureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Time(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Coordinate(lat, lon) => write!(f, "({lat}, {lon})"),
        }
    }
}

// ── Encode ──────────────────────────────────────────────────────────

/// Build the wire datavalue for `value` under the property datatype.
pub fn encode(datatype: &Datatype, value: NativeValue) -> Result<DataValue, Error> {
    let family = datatype
        .family()
        .ok_or_else(|| Error::UnsupportedDatatype(datatype.to_string()))?;
    let mismatch = |found: &str| Error::TypeMismatch {
        datatype: datatype.to_string(),
        found: found.to_owned(),
    };

    match (family, value) {
        (Family::Entity(entity_type), NativeValue::String(id)) => Ok(DataValue::new(
            ValueType::Entity,
            json!({ "entity-type": entity_type, "id": id }),
        )),
        (Family::Entity(_), NativeValue::Payload(map)) => {
            if !map.contains_key("id") && !map.contains_key("numeric-id") {
                return Err(mismatch("mapping without `id` or `numeric-id`"));
            }
            Ok(DataValue::new(ValueType::Entity, Value::Object(map)))
        }
        (Family::Text, NativeValue::String(s)) => {
            Ok(DataValue::new(ValueType::String, json!({ "value": s })))
        }
        (Family::Text, NativeValue::Payload(map)) => {
            require(&map, "value", Value::is_string).map_err(|f| mismatch(&f))?;
            Ok(DataValue::new(ValueType::String, Value::Object(map)))
        }
        (Family::MonolingualText, NativeValue::Payload(map)) => {
            require(&map, "text", Value::is_string).map_err(|f| mismatch(&f))?;
            require(&map, "language", Value::is_string).map_err(|f| mismatch(&f))?;
            Ok(DataValue::new(ValueType::MonolingualText, Value::Object(map)))
        }
        (Family::GlobeCoordinate, NativeValue::Payload(map)) => {
            require(&map, "latitude", Value::is_number).map_err(|f| mismatch(&f))?;
            require(&map, "longitude", Value::is_number).map_err(|f| mismatch(&f))?;
            Ok(DataValue::new(ValueType::GlobeCoordinate, Value::Object(map)))
        }
        (Family::Quantity, NativeValue::Payload(map)) => {
            require(&map, "amount", Value::is_string).map_err(|f| mismatch(&f))?;
            Ok(DataValue::new(ValueType::Quantity, Value::Object(map)))
        }
        (Family::Quantity, NativeValue::Integer(n)) => Ok(quantity(format!("{n:+}.000000"))),
        (Family::Quantity, NativeValue::Float(n)) => {
            if !n.is_finite() {
                return Err(mismatch("non-finite float"));
            }
            Ok(quantity(format!("{n:+.6}")))
        }
        (Family::Time, NativeValue::Payload(map)) => {
            require(&map, "time", Value::is_string).map_err(|f| mismatch(&f))?;
            Ok(DataValue::new(ValueType::Time, Value::Object(map)))
        }
        (Family::Time, NativeValue::DateTime(dt)) => Ok(day_timestamp(dt.date())),
        (Family::Time, NativeValue::Date(date)) => Ok(day_timestamp(date)),
        (_, other) => Err(mismatch(other.kind())),
    }
}

fn require(map: &Map<String, Value>, key: &str, check: fn(&Value) -> bool) -> Result<(), String> {
    match map.get(key) {
        Some(v) if check(v) => Ok(()),
        Some(_) => Err(format!("mapping with malformed `{key}`")),
        None => Err(format!("mapping without `{key}`")),
    }
}

fn quantity(amount: String) -> DataValue {
    DataValue::new(
        ValueType::Quantity,
        json!({ "amount": amount, "unit": "1" }),
    )
}

/// Day-precision timestamp; any time of day has already been dropped.
fn day_timestamp(date: NaiveDate) -> DataValue {
    let year = date.year();
    let sign = if year < 0 { '-' } else { '+' };
    let time = format!(
        "{sign}{:04}-{:02}-{:02}T00:00:00Z",
        year.unsigned_abs(),
        date.month(),
        date.day()
    );
    DataValue::new(
        ValueType::Time,
        json!({
            "time": time,
            "timezone": 0,
            "before": 0,
            "after": 0,
            "precision": PRECISION_DAY,
            "calendarmodel": GREGORIAN_CALENDAR,
        }),
    )
}

// ── Decode ──────────────────────────────────────────────────────────

/// Extract the reduced native value from a wire datavalue.
pub fn decode(value: &DataValue) -> Result<PureValue, Error> {
    let kind = value
        .kind()
        .ok_or_else(|| Error::UnsupportedValueType(value.value_type.clone()))?;
    let malformed = |reason: &str| Error::MalformedValue {
        value_type: value.value_type.clone(),
        reason: reason.to_owned(),
    };
    let payload = &value.value;

    match kind {
        ValueType::Entity => entity_id(payload)
            .map(PureValue::String)
            .ok_or_else(|| malformed("missing `id`")),
        ValueType::String => match payload {
            Value::String(s) => Ok(PureValue::String(s.clone())),
            other => other
                .get("value")
                .and_then(Value::as_str)
                .map(|s| PureValue::String(s.to_owned()))
                .ok_or_else(|| malformed("expected a string")),
        },
        ValueType::MonolingualText => payload
            .get("text")
            .and_then(Value::as_str)
            .map(|s| PureValue::String(s.to_owned()))
            .ok_or_else(|| malformed("missing `text`")),
        ValueType::Quantity => payload
            .get("amount")
            .and_then(number)
            .map(PureValue::Number)
            .ok_or_else(|| malformed("missing or non-numeric `amount`")),
        ValueType::Time => payload
            .get("time")
            .and_then(Value::as_str)
            .map(|s| PureValue::Time(s.to_owned()))
            .ok_or_else(|| malformed("missing `time`")),
        ValueType::GlobeCoordinate => {
            let lat = payload.get("latitude").and_then(number);
            let lon = payload.get("longitude").and_then(number);
            match (lat, lon) {
                (Some(lat), Some(lon)) => Ok(PureValue::Coordinate(lat, lon)),
                _ => Err(malformed("missing `latitude` or `longitude`")),
            }
        }
    }
}

/// Number from a JSON number or a decimal string such as `"+6.000000"`.
fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The prefixed id, rebuilt from `entity-type` + `numeric-id` if needed.
fn entity_id(payload: &Value) -> Option<String> {
    if let Some(id) = payload.get("id").and_then(Value::as_str) {
        return Some(id.to_owned());
    }
    let prefix = match payload.get("entity-type")?.as_str()? {
        "item" => 'Q',
        "property" => 'P',
        "lexeme" => 'L',
        _ => return None,
    };
    let numeric = payload.get("numeric-id")?;
    let numeric = numeric
        .as_u64()
        .or_else(|| numeric.as_str()?.parse().ok())?;
    Some(format!("{prefix}{numeric}"))
}
