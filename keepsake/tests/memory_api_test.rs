mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{build_app, create_memory, curator_login, send, test_app, test_config};

#[tokio::test]
async fn create_minimal_memory_and_read_it_back() {
    let app = test_app(vec![]);

    let (status, json) = send(
        &app,
        "POST",
        "/api/memory",
        Some(json!({"name": "A", "email": "a@x.com", "body": "hello"})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = json["data"]["id"].as_str().expect("id is a string");
    assert!(!id.is_empty());
    assert!(json["data"]["editToken"].is_string());

    // Read-after-write: the id is immediately retrievable.
    let (status, json) = send(&app, "GET", &format!("/api/memory/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["body"], "hello");
    assert_eq!(json["data"]["photoCount"], 0);
    assert_eq!(json["data"]["photos"], json!([]));
    // Authorization-only fields never leave the server.
    assert!(json["data"].get("email").is_none());
    assert!(json["data"].get("editToken").is_none());
}

#[tokio::test]
async fn create_rejects_empty_body() {
    let app = test_app(vec![]);
    let (status, json) = send(
        &app,
        "POST",
        "/api/memory",
        Some(json!({"name": "A", "email": "a@x.com", "body": "   "})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "invalid_request");
}

#[tokio::test]
async fn create_rejects_invalid_email() {
    let app = test_app(vec![]);
    let (status, json) = send(
        &app,
        "POST",
        "/api/memory",
        Some(json!({"name": "A", "email": "nope", "body": "hello"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "invalid_request");
}

#[tokio::test]
async fn create_rejects_oversized_body() {
    let app = test_app(vec![]);
    let (status, json) = send(
        &app,
        "POST",
        "/api/memory",
        Some(json!({"name": "A", "email": "a@x.com", "body": "x".repeat(5001)})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("5000 character limit"));
}

#[tokio::test]
async fn list_previews_are_truncated_to_exactly_200_chars_plus_ellipsis() {
    let app = test_app(vec![]);
    let long_body = "m".repeat(300);
    create_memory(&app, "Long", "long@x.com", &long_body).await;
    create_memory(&app, "Short", "short@x.com", "brief and verbatim").await;

    let (status, json) = send(&app, "GET", "/api/memories", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let memories = json["data"]["memories"].as_array().expect("memories");
    assert_eq!(memories.len(), 2);
    assert_eq!(json["meta"]["total"], 2);

    for memory in memories {
        let preview = memory["preview"].as_str().expect("preview");
        if memory["name"] == "Long" {
            assert_eq!(preview.chars().count(), 201);
            assert!(preview.ends_with('…'));
            assert_eq!(&preview[..200], &long_body[..200]);
        } else {
            assert_eq!(preview, "brief and verbatim");
        }
    }
}

#[tokio::test]
async fn photo_ordering_round_trips_in_ascending_sort_index() {
    let app = test_app(vec![]);

    let (status, json) = send(
        &app,
        "POST",
        "/api/memory",
        Some(json!({
            "name": "A",
            "email": "a@x.com",
            "body": "with photos",
            "photos": [
                {"publicId": "last", "sortIndex": 7},
                {"caption": "no public id, dropped"},
                {"publicId": "first", "sortIndex": 0},
                {"publicId": "middle", "sortIndex": 3}
            ]
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let (_, json) = send(&app, "GET", &format!("/api/memory/{id}"), None, None).await;
    let photos = json["data"]["photos"].as_array().expect("photos");
    assert_eq!(photos.len(), 3);

    let ids: Vec<&str> = photos.iter().map(|p| p["publicId"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["first", "middle", "last"]);
    let indices: Vec<u64> = photos.iter().map(|p| p["sortIndex"].as_u64().unwrap()).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    // The list view's cover is the first photo.
    let (_, json) = send(&app, "GET", "/api/memories", None, None).await;
    assert_eq!(json["data"]["memories"][0]["coverPublicId"], "first");
    assert_eq!(json["data"]["memories"][0]["photoCount"], 3);
    let cover_url = json["data"]["memories"][0]["coverUrl"].as_str().unwrap();
    assert!(cover_url.contains("f_auto,q_auto,w_600,h_400,c_fill,g_auto/first"));
}

#[tokio::test]
async fn delete_removes_from_list_and_detail_returns_404() {
    let app = test_app(vec![]);
    let (id, edit_token) = create_memory(&app, "A", "a@x.com", "to be removed").await;
    create_memory(&app, "B", "b@x.com", "stays").await;

    let (status, json) = send(
        &app,
        "DELETE",
        &format!("/api/memory/{id}"),
        Some(json!({"editToken": edit_token})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["deleted"], true);

    let (_, json) = send(&app, "GET", "/api/memories", None, None).await;
    let memories = json["data"]["memories"].as_array().unwrap();
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0]["name"], "B");

    let (status, _) = send(&app, "GET", &format!("/api/memory/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_requires_valid_credentials() {
    let app = test_app(vec![]);
    let (id, edit_token) = create_memory(&app, "A", "a@x.com", "original").await;

    // No credentials at all.
    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/api/memory/{id}"),
        Some(json!({"body": "hijacked"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");

    // Wrong edit token.
    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/api/memory/{id}"),
        Some(json!({"body": "hijacked", "editToken": "wrong"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "forbidden");

    // The right token updates in place and the list preview follows.
    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/api/memory/{id}"),
        Some(json!({"body": "revised", "title": "Now titled", "editToken": edit_token})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], id.as_str());
    assert_eq!(json["data"]["body"], "revised");

    let (_, json) = send(&app, "GET", "/api/memories", None, None).await;
    assert_eq!(json["data"]["memories"][0]["preview"], "revised");
    assert_eq!(json["data"]["memories"][0]["title"], "Now titled");
}

#[tokio::test]
async fn curator_session_grants_edit_and_delete_over_any_memory() {
    let app = test_app(vec!["hunter2"]);
    let (id, _) = create_memory(&app, "A", "a@x.com", "visitor memory").await;

    // Wrong password is rejected.
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/session",
        Some(json!({"password": "wrong"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = curator_login(&app, "hunter2").await;

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/memory/{id}"),
        Some(json!({"body": "moderated"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/api/memory/{id}"), None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/api/memory/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_bulk_seed_and_purge_round_trip() {
    let app = test_app(vec!["hunter2"]);
    let (real_id, _) = create_memory(&app, "Real", "real@x.com", "a real tribute").await;

    let token = curator_login(&app, "hunter2").await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/admin/bulk-memories",
        Some(json!({"count": 10})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["created"], 10);

    let (_, json) = send(&app, "GET", "/api/memories", None, None).await;
    assert_eq!(json["meta"]["total"], 11);

    let (status, json) = send(&app, "DELETE", "/api/admin/bulk-memories", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["deleted"], 10);

    let (_, json) = send(&app, "GET", "/api/memories", None, None).await;
    let memories = json["data"]["memories"].as_array().unwrap();
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0]["id"], real_id.as_str());
}

#[tokio::test]
async fn admin_index_repair_reports_counts() {
    let app = test_app(vec!["hunter2"]);
    create_memory(&app, "A", "a@x.com", "healthy").await;

    let token = curator_login(&app, "hunter2").await;
    let (status, json) = send(&app, "POST", "/api/admin/index:repair", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["scanned"], 1);
    assert_eq!(json["data"]["repaired"], 0);
}

#[tokio::test]
async fn list_caps_at_500_and_drops_the_oldest() {
    let app = test_app(vec![]);

    let mut first_id = String::new();
    for i in 0..501 {
        let (id, _) = create_memory(
            &app,
            "Seq",
            &format!("seq-{i}@x.com"),
            &format!("memory number {i}"),
        )
        .await;
        if i == 0 {
            first_id = id;
        }
    }

    let (status, json) = send(&app, "GET", "/api/memories", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let memories = json["data"]["memories"].as_array().unwrap();
    assert_eq!(memories.len(), 500);

    // Newest first; the very first create has fallen off the end.
    assert_eq!(memories[0]["preview"], "memory number 500");
    assert!(memories
        .iter()
        .all(|m| m["id"].as_str().unwrap() != first_id));
}

#[tokio::test]
async fn enforced_verification_rejects_create_without_token() {
    let mut config = test_config(vec![]);
    config.verification.secret = Some("shh".to_string());
    let app = build_app(config);

    let (status, json) = send(
        &app,
        "POST",
        "/api/memory",
        Some(json!({"name": "A", "email": "a@x.com", "body": "hello"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("verification failed"));
}
