//! Jamendo catalog client against a mock server

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jamendo_rs::config::CatalogConfig;
use jamendo_rs::error::ApiError;
use jamendo_rs::model::JamendoClient;

fn client(server: &MockServer) -> JamendoClient {
    JamendoClient::new(&CatalogConfig {
        base_url: server.uri(),
        client_id: "test-client".to_string(),
        page_size: 10,
    })
    .unwrap()
}

fn envelope(results: serde_json::Value) -> serde_json::Value {
    let count = results.as_array().map(Vec::len).unwrap_or(0);
    json!({
        "headers": {
            "status": "success",
            "code": 0,
            "error_message": "",
            "results_count": count,
        },
        "results": results,
    })
}

#[tokio::test]
async fn search_sends_client_id_and_parses_tracks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tracks/"))
        .and(query_param("client_id", "test-client"))
        .and(query_param("search", "lofi"))
        .and(query_param("limit", "10"))
        .and(query_param("audioformat", "mp32"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            {
                "id": "1532771",
                "name": "Rainy Window",
                "duration": 184,
                "artist_id": "7",
                "artist_name": "Quiet Rooms",
                "album_image": "https://img/album.jpg",
                "audio": "https://cdn/1532771.mp3"
            },
            {
                "id": "99",
                "name": "No Stream",
                "duration": 120,
                "artist_name": "Nobody",
                "audio": ""
            }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let tracks = client(&server).search_tracks("lofi").await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].name, "Rainy Window");
    assert_eq!(tracks[0].duration, 184);
    assert_eq!(tracks[0].audio, "https://cdn/1532771.mp3");
    // Fields missing from the payload fall back to defaults
    assert_eq!(tracks[1].artist_id, "");
    assert_eq!(tracks[1].audio, "");
}

#[tokio::test]
async fn artist_search_uses_the_artists_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artists/"))
        .and(query_param("namesearch", "quiet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "7", "name": "Quiet Rooms", "image": "" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let artists = client(&server).search_artists("quiet").await.unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].id, "7");
}

#[tokio::test]
async fn single_track_lookup_returns_none_when_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tracks/"))
        .and(query_param("id", "404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .mount(&server)
        .await;

    assert!(client(&server).track("404").await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_request_becomes_catalog_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tracks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "headers": {
                "status": "failed",
                "code": 5,
                "error_message": "Your credential is not authorized.",
                "results_count": 0
            },
            "results": []
        })))
        .mount(&server)
        .await;

    match client(&server).popular_tracks().await {
        Err(ApiError::Catalog { code, message }) => {
            assert_eq!(code, 5);
            assert!(message.contains("not authorized"));
        }
        other => panic!("expected catalog error, got {:?}", other),
    }
}

#[tokio::test]
async fn http_failure_keeps_the_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tracks/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).artist_tracks("7").await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tracks/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).popular_tracks().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}
