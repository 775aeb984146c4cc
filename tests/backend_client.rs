//! Playlist/auth backend client and session flows against a mock server

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jamendo_rs::auth::{self, SessionStore};
use jamendo_rs::error::ApiError;
use jamendo_rs::model::{BackendClient, CatalogTrack};

fn auth_body(token: &str) -> serde_json::Value {
    json!({
        "token": token,
        "user": { "id": "u1", "username": "ana", "email": "ana@example.com" }
    })
}

async fn logged_in(server: &MockServer) -> BackendClient {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-1")))
        .mount(server)
        .await;

    let client = BackendClient::new(&server.uri()).unwrap();
    client.login("ana@example.com", "hunter2").await.unwrap();
    client
}

#[tokio::test]
async fn login_keeps_the_token_for_later_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "ana@example.com", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-1")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlists"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "name": "Road trip", "createdAt": "2024-03-01T10:00:00Z", "tracks": [] },
            { "id": "p2", "name": "Focus" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri()).unwrap();
    let response = client.login("ana@example.com", "hunter2").await.unwrap();
    assert_eq!(response.user.username, "ana");
    assert!(client.is_authenticated().await);

    let playlists = client.playlists().await.unwrap();
    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[0].name, "Road trip");
    assert!(playlists[0].created_at.is_some());
    assert!(playlists[1].tracks.is_empty());
}

#[tokio::test]
async fn unauthorized_maps_to_auth_required() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/liked"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "token expired" })))
        .mount(&server)
        .await;

    assert!(matches!(client.liked_tracks().await, Err(ApiError::AuthRequired)));
}

#[tokio::test]
async fn error_status_carries_the_server_message() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/playlists/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Playlist not found" })))
        .mount(&server)
        .await;

    match client.delete_playlist("missing").await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Playlist not found");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn adding_a_track_posts_the_catalog_shape() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    let track = CatalogTrack {
        id: "1532771".to_string(),
        name: "Rainy Window".to_string(),
        duration: 184,
        audio: "https://cdn/1532771.mp3".to_string(),
        ..CatalogTrack::default()
    };

    Mock::given(method("POST"))
        .and(path("/playlists/p1/tracks"))
        .and(body_json(json!({ "track": track })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1",
            "name": "Road trip",
            "tracks": [track]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let playlist = client.add_track_to_playlist("p1", &track).await.unwrap();
    assert_eq!(playlist.tracks, vec![track]);
}

#[tokio::test]
async fn like_and_unlike_hit_the_liked_routes() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("POST"))
        .and(path("/liked"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/liked/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let track = CatalogTrack {
        id: "42".to_string(),
        ..CatalogTrack::default()
    };
    client.like_track(&track).await.unwrap();
    client.unlike_track("42").await.unwrap();
}

#[tokio::test]
async fn login_flow_persists_and_restores_the_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-9")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer tok-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1", "username": "ana", "email": "ana@example.com"
        })))
        .mount(&server)
        .await;

    let backend = BackendClient::new(&server.uri()).unwrap();
    let session = auth::login(&backend, &store, "ana@example.com", "pw").await.unwrap();
    assert_eq!(session.token, "tok-9");

    // A fresh client picks the token up from disk
    let restarted = BackendClient::new(&server.uri()).unwrap();
    let user = auth::restore_session(&restarted, &store).await.unwrap();
    assert_eq!(user.map(|u| u.username), Some("ana".to_string()));
    assert!(restarted.is_authenticated().await);
}

#[tokio::test]
async fn rejected_session_is_cleared() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("stale")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let backend = BackendClient::new(&server.uri()).unwrap();
    auth::login(&backend, &store, "ana@example.com", "pw").await.unwrap();

    let restarted = BackendClient::new(&server.uri()).unwrap();
    assert_eq!(auth::restore_session(&restarted, &store).await.unwrap(), None);
    assert!(!restarted.is_authenticated().await);
    assert_eq!(store.load().unwrap(), None);
}
