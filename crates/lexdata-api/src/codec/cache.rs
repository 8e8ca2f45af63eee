// ── Property datatype cache ──
//
// Datatypes of live properties cannot change, so lookups are memoized
// without eviction. Two tasks missing on the same property may both fetch
// it; the second insert overwrites the first with the same value.

use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use crate::codec::datatype::Datatype;
use crate::error::Error;
use crate::params::Params;
use crate::session::Session;

/// Property id → declared datatype.
#[derive(Debug, Default)]
pub struct DatatypeCache {
    entries: DashMap<String, Datatype>,
}

impl DatatypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-populated with known datatypes (no lookups for these).
    pub fn seeded<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Datatype)>,
        K: Into<String>,
    {
        let cache = Self::new();
        for (property, datatype) in entries {
            cache.insert(property, datatype);
        }
        cache
    }

    pub fn get(&self, property: &str) -> Option<Datatype> {
        self.entries.get(property).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, property: impl Into<String>, datatype: Datatype) {
        self.entries.insert(property.into(), datatype);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Datatype of `property`, fetching the property page on a miss.
    pub async fn resolve(&self, session: &Session, property: &str) -> Result<Datatype, Error> {
        if let Some(datatype) = self.get(property) {
            return Ok(datatype);
        }

        debug!(property, "datatype cache miss");
        let data = session
            .get(
                &Params::action("query")
                    .with("prop", "revisions")
                    .with("titles", format!("Property:{property}"))
                    .with("rvprop", "content"),
            )
            .await?;
        let datatype = datatype_from_page(&data, property)?;

        self.insert(property, datatype.clone());
        Ok(datatype)
    }
}

/// Pull `datatype` out of the JSON page content of a `query` response.
///
/// Handles both the legacy `revisions[0]["*"]` shape and the slot-based
/// one (`revisions[0].slots.main["*" | "content"]`).
fn datatype_from_page(data: &Value, property: &str) -> Result<Datatype, Error> {
    let not_found = || Error::PropertyNotFound {
        property: property.to_owned(),
    };

    let page = data
        .pointer("/query/pages")
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next())
        .ok_or_else(not_found)?;
    if page.get("missing").is_some() || page.get("invalid").is_some() {
        return Err(not_found());
    }

    let revision = page.pointer("/revisions/0").ok_or_else(not_found)?;
    let content = revision
        .get("*")
        .or_else(|| revision.pointer("/slots/main/*"))
        .or_else(|| revision.pointer("/slots/main/content"))
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Deserialization {
            message: format!("no page content for Property:{property}"),
            body: page.to_string(),
        })?;

    let content: Value = serde_json::from_str(content).map_err(|e| Error::Deserialization {
        message: format!("Property:{property} content is not JSON: {e}"),
        body: content.to_owned(),
    })?;

    content
        .get("datatype")
        .and_then(Value::as_str)
        .map(Datatype::from)
        .ok_or_else(|| Error::Deserialization {
            message: format!("Property:{property} declares no datatype"),
            body: content.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn legacy_revision_shape() {
        let data = json!({"query": {"pages": {"123": {
            "title": "Property:P5831",
            "revisions": [{"*": "{\"type\":\"property\",\"datatype\":\"monolingualtext\"}"}]
        }}}});
        assert_eq!(
            datatype_from_page(&data, "P5831").unwrap(),
            Datatype::MonolingualText
        );
    }

    #[test]
    fn slot_revision_shape() {
        let data = json!({"query": {"pages": {"9": {
            "revisions": [{"slots": {"main": {"content": "{\"datatype\":\"external-id\"}"}}}]
        }}}});
        assert_eq!(
            datatype_from_page(&data, "P12682").unwrap(),
            Datatype::ExternalId
        );
    }

    #[test]
    fn missing_page_is_property_not_found() {
        let data = json!({"query": {"pages": {"-1": {"title": "Property:P0", "missing": ""}}}});
        assert!(matches!(
            datatype_from_page(&data, "P0"),
            Err(Error::PropertyNotFound { ref property }) if property == "P0"
        ));
    }

    #[test]
    fn seeded_entries_are_visible() {
        let cache = DatatypeCache::seeded([("P31", Datatype::WikibaseItem)]);
        assert_eq!(cache.get("P31"), Some(Datatype::WikibaseItem));
        assert_eq!(cache.get("P279"), None);
        assert_eq!(cache.len(), 1);
    }
}
