#![allow(clippy::unwrap_used)]
// Integration tests for datatype resolution and snak building.

use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lexdata_api::{Codec, Datatype, DatatypeCache, Error, NativeValue, PureValue, Session};

async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    let api_url = Url::parse(&format!("{}/w/api.php", server.uri())).unwrap();
    let session = Session::with_client(reqwest::Client::new(), api_url);
    (server, session)
}

fn property_page(property: &str, datatype: &str) -> serde_json::Value {
    let content = json!({"type": "property", "id": property, "datatype": datatype}).to_string();
    json!({
        "batchcomplete": "",
        "query": {"pages": {"4711": {
            "pageid": 4711,
            "ns": 120,
            "title": format!("Property:{property}"),
            "revisions": [{"contentformat": "application/json", "*": content}]
        }}}
    })
}

#[tokio::test]
async fn test_datatype_fetched_once_per_property() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(query_param("titles", "Property:P5137"))
        .and(query_param("prop", "revisions"))
        .and(query_param("rvprop", "content"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(property_page("P5137", "wikibase-item")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let codec = Codec::new();
    let first = codec.datatype(&session, "P5137").await.unwrap();
    let second = codec.datatype(&session, "P5137").await.unwrap();

    assert_eq!(first, Datatype::WikibaseItem);
    assert_eq!(second, Datatype::WikibaseItem);
    assert_eq!(codec.cache().len(), 1);
}

#[tokio::test]
async fn test_seeded_cache_skips_lookup() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let cache = Arc::new(DatatypeCache::seeded([("P1343", Datatype::WikibaseItem)]));
    let codec = Codec::with_cache(Arc::clone(&cache));
    let value = codec
        .encode(&session, "P1343", NativeValue::from("Q42"))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        json!({"type": "wikibase-entity", "value": {"entity-type": "item", "id": "Q42"}})
    );
}

#[tokio::test]
async fn test_clones_share_cache() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(property_page("P1476", "monolingualtext")))
        .expect(1)
        .mount(&server)
        .await;

    let codec = Codec::new();
    let other = codec.clone();
    codec.datatype(&session, "P1476").await.unwrap();
    assert_eq!(
        other.cache().get("P1476"),
        Some(Datatype::MonolingualText)
    );
}

#[tokio::test]
async fn test_snak_for_time_property() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(property_page("P585", "time")))
        .mount(&server)
        .await;

    let codec = Codec::new();
    let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
    let snak = codec
        .snak(&session, "P585", NativeValue::from(date))
        .await
        .unwrap();

    assert_eq!(snak.datatype, Some(Datatype::Time));
    assert_eq!(
        serde_json::to_value(&snak).unwrap()["datavalue"],
        json!({
            "type": "time",
            "value": {
                "time": "+2021-03-04T00:00:00Z",
                "timezone": 0,
                "before": 0,
                "after": 0,
                "precision": 11,
                "calendarmodel": "http://www.wikidata.org/entity/Q1985727"
            }
        })
    );
    assert_eq!(
        snak.pure_value().unwrap(),
        PureValue::Time("+2021-03-04T00:00:00Z".into())
    );
}

#[tokio::test]
async fn test_unknown_property() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": {"-1": {"ns": 120, "title": "Property:P999999999", "missing": ""}}}
        })))
        .mount(&server)
        .await;

    let codec = Codec::new();
    let err = codec
        .encode(&session, "P999999999", NativeValue::from("x"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::PropertyNotFound { ref property } if property == "P999999999"),
        "got: {err:?}"
    );
    assert!(codec.cache().is_empty());
}

#[tokio::test]
async fn test_type_mismatch_after_lookup() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(property_page("P2067", "quantity")))
        .mount(&server)
        .await;

    let codec = Codec::new();
    let err = codec
        .encode(&session, "P2067", NativeValue::from("heavy"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }), "got: {err:?}");
}
