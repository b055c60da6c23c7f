//! End-to-end behavior of `WeatherClient` against a mock provider.

use std::{sync::Arc, time::Duration};

use geoweather_core::{
    Coordinates, FetchError, FileStore, KeyValueStore, MemoryStore, OpenWeatherApi,
    SnapshotCache, StaticNetworkStatus, Units, WeatherClient, WeatherSnapshot,
    cache::{PREFERENCE_NAME, WEATHER_RESPONSE_DATA},
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_body() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": -77.0365, "lat": 38.8977 },
        "weather": [
            { "id": 211, "main": "Thunderstorm", "description": "thunderstorm", "icon": "11n" },
            { "id": 701, "main": "Mist", "description": "mist", "icon": "50n" }
        ],
        "main": {
            "temp": 24.5, "feels_like": 25.1, "temp_min": 22.75,
            "temp_max": 26.0, "pressure": 1009, "humidity": 88
        },
        "visibility": 8000,
        "wind": { "speed": 5.75, "deg": 180, "gust": 9.1 },
        "dt": 1700000000,
        "sys": {
            "type": 2, "id": 2041, "country": "US",
            "sunrise": 1699962000, "sunset": 1699998600
        },
        "timezone": -18000,
        "id": 4140963,
        "name": "Washington",
        "cod": 200
    })
}

fn previous_snapshot() -> WeatherSnapshot {
    WeatherSnapshot {
        condition_main: "Clear".into(),
        condition_description: "clear sky".into(),
        icon_code: "01d".into(),
        temp_current: 18.0,
        temp_min: 15.5,
        temp_max: 20.25,
        humidity_percent: 40,
        wind_speed: 2.0,
        sunrise_unix_seconds: 1_699_875_600,
        sunset_unix_seconds: 1_699_912_200,
        country_code: "US".into(),
        place_name: "Washington".into(),
        fetched_at_unix_seconds: 1_699_900_000,
    }
}

fn washington() -> Coordinates {
    Coordinates::new(38.8977, -77.0365).unwrap()
}

/// Store pre-seeded with `previous_snapshot()`.
fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let raw = SnapshotCache::encode(&previous_snapshot()).unwrap();
    store.put(WEATHER_RESPONSE_DATA, &raw).unwrap();
    store
}

fn client(server_uri: &str, online: bool, store: Arc<dyn KeyValueStore>) -> WeatherClient {
    WeatherClient::new(
        OpenWeatherApi::new(server_uri),
        Arc::new(StaticNetworkStatus(online)),
        store,
    )
}

async fn mock_status(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(template)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn success_maps_every_field_and_overwrites_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "38.8977"))
        .and(query_param("lon", "-77.0365"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "SECRET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store();
    let client = client(&server.uri(), true, store.clone());

    let before = chrono::Utc::now().timestamp();
    let snap = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap();
    let after = chrono::Utc::now().timestamp();

    assert_eq!(snap.condition_main, "Thunderstorm");
    assert_eq!(snap.condition_description, "thunderstorm");
    assert_eq!(snap.icon_code, "11n");
    assert_eq!(snap.temp_current, 24.5);
    assert_eq!(snap.temp_min, 22.75);
    assert_eq!(snap.temp_max, 26.0);
    assert_eq!(snap.humidity_percent, 88);
    assert_eq!(snap.wind_speed, 5.75);
    assert_eq!(snap.sunrise_unix_seconds, 1_699_962_000);
    assert_eq!(snap.sunset_unix_seconds, 1_699_998_600);
    assert_eq!(snap.country_code, "US");
    assert_eq!(snap.place_name, "Washington");
    assert!((before..=after).contains(&snap.fetched_at_unix_seconds));

    assert_eq!(client.last_snapshot().unwrap(), Some(snap));
}

#[tokio::test]
async fn cached_document_keeps_the_response_as_received() {
    let server = MockServer::start().await;
    mock_status(&server, ResponseTemplate::new(200).set_body_json(provider_body())).await;

    let store = seeded_store();
    let client = client(&server.uri(), true, store.clone());
    let snap = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap();

    let raw = store.get(WEATHER_RESPONSE_DATA).unwrap().unwrap();
    let cached: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(cached["coord"]["lat"], 38.8977);
    assert_eq!(cached["dt"], 1_700_000_000);
    assert_eq!(cached["main"]["pressure"], 1009);
    assert_eq!(cached["weather"][1]["main"], "Mist");
    assert_eq!(cached["fetched_at"], snap.fetched_at_unix_seconds);

    let mut expected = provider_body();
    expected["fetched_at"] = serde_json::json!(snap.fetched_at_unix_seconds);
    assert_eq!(cached, expected);
}

#[tokio::test]
async fn ocean_point_without_country_or_name_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "0"))
        .and(query_param("lon", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "coord": { "lon": 0, "lat": 0 },
            "weather": [
                { "id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d" }
            ],
            "main": { "temp": 27.5, "temp_min": 27.5, "temp_max": 27.5, "humidity": 74 },
            "wind": { "speed": 6.25 },
            "dt": 1700000000,
            "sys": { "sunrise": 1699941600, "sunset": 1699985200 },
            "name": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store();
    let client = client(&server.uri(), true, store.clone());
    let origin = Coordinates::new(0.0, 0.0).unwrap();

    let snap = client.fetch(origin, Units::Metric, "SECRET").await.unwrap();

    assert_eq!(snap.country_code, "");
    assert_eq!(snap.place_name, "");
    assert_eq!(snap.condition_main, "Clouds");
    assert_eq!(client.last_snapshot().unwrap(), Some(snap));
}

#[tokio::test]
async fn not_found_leaves_cache_untouched() {
    let server = MockServer::start().await;
    mock_status(&server, ResponseTemplate::new(404)).await;

    let store = seeded_store();
    let before = store.get(WEATHER_RESPONSE_DATA).unwrap();
    let client = client(&server.uri(), true, store.clone());

    let err = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap_err();

    assert_eq!(err, FetchError::NotFound);
    assert_eq!(store.get(WEATHER_RESPONSE_DATA).unwrap(), before);
}

#[tokio::test]
async fn bad_request_leaves_cache_untouched() {
    let server = MockServer::start().await;
    mock_status(
        &server,
        ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "cod": "400", "message": "wrong latitude"
        })),
    )
    .await;

    let store = seeded_store();
    let before = store.get(WEATHER_RESPONSE_DATA).unwrap();
    let client = client(&server.uri(), true, store.clone());

    let err = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap_err();

    assert_eq!(err, FetchError::BadRequest);
    assert_eq!(store.get(WEATHER_RESPONSE_DATA).unwrap(), before);
}

#[tokio::test]
async fn other_status_is_provider_error() {
    let server = MockServer::start().await;
    mock_status(&server, ResponseTemplate::new(503)).await;

    let store = seeded_store();
    let client = client(&server.uri(), true, store.clone());

    let err = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap_err();

    assert_eq!(err, FetchError::ProviderError(503));
    assert_eq!(client.last_snapshot().unwrap(), Some(previous_snapshot()));
}

#[tokio::test]
async fn malformed_success_body_leaves_cache_untouched() {
    let server = MockServer::start().await;
    let mut partial = provider_body();
    partial["main"] = serde_json::json!({ "temp": 24.5 });
    mock_status(&server, ResponseTemplate::new(200).set_body_json(partial)).await;

    let store = seeded_store();
    let client = client(&server.uri(), true, store.clone());

    let err = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap_err();

    assert!(matches!(err, FetchError::ParseError(_)));
    assert_eq!(client.last_snapshot().unwrap(), Some(previous_snapshot()));
}

#[tokio::test]
async fn empty_weather_list_leaves_cache_untouched() {
    let server = MockServer::start().await;
    let mut body = provider_body();
    body["weather"] = serde_json::json!([]);
    mock_status(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let store = seeded_store();
    let client = client(&server.uri(), true, store.clone());

    let err = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap_err();

    assert!(matches!(err, FetchError::ParseError(_)));
    assert_eq!(client.last_snapshot().unwrap(), Some(previous_snapshot()));
}

#[tokio::test]
async fn offline_fails_without_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body()))
        .expect(0)
        .mount(&server)
        .await;

    let store = seeded_store();
    let client = client(&server.uri(), false, store.clone());

    let err = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap_err();

    assert_eq!(err, FetchError::NoConnectivity);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(client.last_snapshot().unwrap(), Some(previous_snapshot()));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = seeded_store();
    let client = client(&format!("http://{addr}"), true, store.clone());

    let err = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
    assert_eq!(client.last_snapshot().unwrap(), Some(previous_snapshot()));
}

#[tokio::test]
async fn client_timeout_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = seeded_store();
    let client = WeatherClient::new(
        OpenWeatherApi::with_timeout(&server.uri(), Duration::from_millis(100)).unwrap(),
        Arc::new(StaticNetworkStatus(true)),
        store.clone(),
    );

    let err = client.fetch(washington(), Units::Metric, "SECRET").await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
    assert_eq!(client.last_snapshot().unwrap(), Some(previous_snapshot()));
}

#[tokio::test]
async fn cancelled_fetch_leaves_cache_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = seeded_store();
    let client = client(&server.uri(), true, store.clone());

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        client.fetch(washington(), Units::Metric, "SECRET"),
    )
    .await;

    assert!(outcome.is_err(), "fetch should have been cancelled by the deadline");
    assert_eq!(client.last_snapshot().unwrap(), Some(previous_snapshot()));
}

#[tokio::test]
async fn snapshot_survives_restart_with_file_store() {
    let server = MockServer::start().await;
    mock_status(&server, ResponseTemplate::new(200).set_body_json(provider_body())).await;
    let dir = tempfile::tempdir().unwrap();

    let fetched = {
        let store = Arc::new(FileStore::open(dir.path(), PREFERENCE_NAME).unwrap());
        client(&server.uri(), true, store)
            .fetch(washington(), Units::Metric, "SECRET")
            .await
            .unwrap()
    };

    let reopened = Arc::new(FileStore::open(dir.path(), PREFERENCE_NAME).unwrap());
    let restarted = client(&server.uri(), false, reopened);

    assert_eq!(restarted.last_snapshot().unwrap(), Some(fetched));
    assert!(dir.path().join("WeatherAppPreference.json").exists());
}

#[test]
fn cache_format_round_trip() {
    let snap = previous_snapshot();
    let raw = SnapshotCache::encode(&snap).unwrap();
    assert_eq!(SnapshotCache::decode(&raw).unwrap(), snap);

    let again = SnapshotCache::encode(&SnapshotCache::decode(&raw).unwrap()).unwrap();
    assert_eq!(again, raw);
}

#[test]
fn cached_provider_payload_is_readable() {
    let mut body = provider_body();
    body["fetched_at"] = serde_json::json!(1_700_000_050);

    let snap = SnapshotCache::decode(&body.to_string()).unwrap();
    assert_eq!(snap.place_name, "Washington");
    assert_eq!(snap.icon_code, "11n");
    assert_eq!(snap.fetched_at_unix_seconds, 1_700_000_050);
}
