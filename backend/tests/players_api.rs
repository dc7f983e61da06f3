//! HTTP-level tests for the player endpoints.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common::{Form, body_json, build_test_app, create, delete, get, send, strings};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_with_only_a_name_gets_defaults() {
    let app = build_test_app();
    let player = create(&app.router, Form::new().text("name", "Aria")).await;

    assert_eq!(player["name"], "Aria");
    assert_eq!(player["campaign"], "default");
    assert_eq!(player["life"], 10);
    assert_eq!(player["exp"], 0);
    assert_eq!(player["level"], 1);
    assert_eq!(player["itemImages"], serde_json::json!([]));
    assert_eq!(player["itemDescriptions"], serde_json::json!([]));
    assert!(player["portraitImage"].is_null());
    assert!(Uuid::parse_str(player["id"].as_str().unwrap()).is_ok());
    assert_eq!(player["createdAt"], player["updatedAt"]);
    assert_eq!(app.images.upload_count(), 0);
}

#[tokio::test]
async fn create_uploads_portrait_and_items() {
    let app = build_test_app();
    let form = Form::new()
        .text("name", "Borin")
        .text("skills", r#"["Smithing", "", "Axes"]"#)
        .text("itemDescriptions", r#"["hammer"]"#)
        .png("charImg", "face.png")
        .png("items", "hammer.png")
        .png("items", "anvil.png");
    let player = create(&app.router, form).await;

    assert_eq!(player["portraitImage"], "mem://0/face.png");
    assert_eq!(
        strings(&player["itemImages"]),
        vec!["mem://1/hammer.png", "mem://2/anvil.png"]
    );
    assert_eq!(strings(&player["itemDescriptions"]), vec!["hammer", ""]);
    assert_eq!(strings(&player["skills"]), vec!["Smithing", "Axes"]);
}

#[tokio::test]
async fn create_coerces_bad_numbers() {
    let app = build_test_app();
    let form = Form::new()
        .text("name", "Cael")
        .text("life", "0")
        .text("exp", "-5")
        .text("level", "zero");
    let player = create(&app.router, form).await;

    assert_eq!(player["life"], 0);
    assert_eq!(player["exp"], 0);
    assert_eq!(player["level"], 1);
}

#[tokio::test]
async fn create_folds_legacy_skill_fields() {
    let app = build_test_app();
    let form = Form::new()
        .text("name", "Dara")
        .text("skill1", "Tracking")
        .text("skill2", "Archery");
    let player = create(&app.router, form).await;
    assert_eq!(strings(&player["skills"]), vec!["Tracking", "Archery"]);
}

#[tokio::test]
async fn create_without_name_is_rejected() {
    let app = build_test_app();
    let response = send(
        &app.router,
        Form::new().text("life", "5").request(Method::POST, "/api/players"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn create_rejects_bad_files() {
    let app = build_test_app();

    let two_portraits = Form::new()
        .text("name", "Eve")
        .png("charImg", "a.png")
        .png("charImg", "b.png");
    let response = send(&app.router, two_portraits.request(Method::POST, "/api/players")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut seven_items = Form::new().text("name", "Eve");
    for i in 0..7 {
        seven_items = seven_items.png("items", &format!("{i}.png"));
    }
    let response = send(&app.router, seven_items.request(Method::POST, "/api/players")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let pdf = Form::new()
        .text("name", "Eve")
        .file("items", "notes.pdf", "application/pdf", b"%PDF");
    let response = send(&app.router, pdf.request(Method::POST, "/api/players")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.images.upload_count(), 0);
    let list = body_json(get(&app.router, "/api/players").await).await;
    assert_eq!(list, serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_by_id_and_campaign() {
    let app = build_test_app();
    let aria = create(
        &app.router,
        Form::new().text("name", "Aria").text("campaign", "strahd"),
    )
    .await;
    create(&app.router, Form::new().text("name", "Borin")).await;

    let id = aria["id"].as_str().unwrap();
    let response = get(&app.router, &format!("/api/players/id/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, aria);

    let strahd = body_json(get(&app.router, "/api/players/strahd").await).await;
    assert_eq!(strahd.as_array().unwrap().len(), 1);
    assert_eq!(strahd[0]["name"], "Aria");

    let all = body_json(get(&app.router, "/api/players").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_ids_are_404() {
    let app = build_test_app();
    let missing = Uuid::new_v4();

    let response = get(&app.router, &format!("/api/players/id/{missing}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app.router, "/api/players/id/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(&app.router, &format!("/api/players/{missing}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app.router,
        Form::new()
            .text("name", "Ghost")
            .request(Method::PUT, &format!("/api/players/{missing}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// ETag
// ---------------------------------------------------------------------------

fn if_none_match(uri: &str, etag: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::IF_NONE_MATCH, etag)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn matching_etag_is_not_modified() {
    let app = build_test_app();
    create(&app.router, Form::new().text("name", "Aria")).await;

    let response = get(&app.router, "/api/players").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    let etag = response.headers()[header::ETAG].to_str().unwrap().to_string();
    assert!(etag.starts_with('"') && etag.ends_with('"'));

    let response = send(&app.router, if_none_match("/api/players", &etag)).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(response.headers()[header::ETAG], etag.as_str());
    assert!(common::body_bytes(response).await.is_empty());

    let response = send(&app.router, if_none_match("/api/players", "\"stale\"")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn mutations_change_the_etag() {
    let app = build_test_app();
    let aria = create(&app.router, Form::new().text("name", "Aria")).await;
    let id = aria["id"].as_str().unwrap();

    let first = get(&app.router, "/api/players").await;
    let etag = first.headers()[header::ETAG].to_str().unwrap().to_string();

    let response = send(
        &app.router,
        Form::new()
            .text("exp", "40")
            .request(Method::PUT, &format!("/api/players/{id}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app.router, if_none_match("/api/players", &etag)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fresh = response.headers()[header::ETAG].to_str().unwrap().to_string();
    assert_ne!(fresh, etag);
    let list = body_json(response).await;
    assert_eq!(list[0]["exp"], 40);
}

#[tokio::test]
async fn campaign_listing_honours_etag() {
    let app = build_test_app();
    create(
        &app.router,
        Form::new().text("name", "Aria").text("campaign", "strahd"),
    )
    .await;

    let response = get(&app.router, "/api/players/strahd").await;
    let etag = response.headers()[header::ETAG].to_str().unwrap().to_string();
    let response = send(&app.router, if_none_match("/api/players/strahd", &etag)).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

async fn create_with_items(app: &common::TestApp, count: usize) -> serde_json::Value {
    let mut form = Form::new().text("name", "Aria");
    for i in 0..count {
        form = form.png("items", &format!("item{i}.png"));
    }
    create(&app.router, form).await
}

#[tokio::test]
async fn update_overwrites_only_sent_fields() {
    let app = build_test_app();
    let aria = create(
        &app.router,
        Form::new()
            .text("name", "Aria")
            .text("life", "8")
            .text("skills", r#"["Stealth"]"#),
    )
    .await;
    let id = aria["id"].as_str().unwrap();

    let response = send(
        &app.router,
        Form::new()
            .text("life", "not a number")
            .text("milestones", "Slew the *wyrm*")
            .request(Method::PUT, &format!("/api/players/{id}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;

    assert_eq!(updated["name"], "Aria");
    assert_eq!(updated["life"], 8);
    assert_eq!(updated["milestones"], "Slew the *wyrm*");
    assert_eq!(strings(&updated["skills"]), vec!["Stealth"]);
    assert_eq!(updated["createdAt"], aria["createdAt"]);
    assert_ne!(updated["updatedAt"], aria["updatedAt"]);
}

#[tokio::test]
async fn appending_past_six_keeps_the_earliest() {
    let app = build_test_app();
    let aria = create_with_items(&app, 5).await;
    let id = aria["id"].as_str().unwrap();

    let response = send(
        &app.router,
        Form::new()
            .png("items", "extra1.png")
            .png("items", "extra2.png")
            .request(Method::PUT, &format!("/api/players/{id}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;

    let items = strings(&updated["itemImages"]);
    assert_eq!(items.len(), 6);
    assert_eq!(items[..5], strings(&aria["itemImages"])[..]);
    assert_eq!(items[5], "mem://5/extra1.png");
    assert_eq!(strings(&updated["itemDescriptions"]).len(), 6);
    // The upload that could not fit never reached the host.
    assert_eq!(app.images.upload_count(), 6);
}

#[tokio::test]
async fn keep_list_replaces_items_and_releases_the_rest() {
    let app = build_test_app();
    let aria = create_with_items(&app, 3).await;
    let id = aria["id"].as_str().unwrap();
    let old = strings(&aria["itemImages"]);

    let keep = serde_json::to_string(&[old[2].as_str(), old[0].as_str(), "mem://99/forged.png"]).unwrap();
    let response = send(
        &app.router,
        Form::new()
            .text("keepItems", &keep)
            .png("items", "new.png")
            .request(Method::PUT, &format!("/api/players/{id}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;

    assert_eq!(
        strings(&updated["itemImages"]),
        vec![old[2].clone(), old[0].clone(), "mem://3/new.png".to_string()]
    );
    assert_eq!(app.images.deleted(), vec![old[1].clone()]);
}

#[tokio::test]
async fn descriptions_stay_with_their_items() {
    let app = build_test_app();
    let aria = create(
        &app.router,
        Form::new()
            .text("name", "Aria")
            .text("itemDescriptions", r#"["sword", "shield"]"#)
            .png("items", "sword.png")
            .png("items", "shield.png"),
    )
    .await;
    let id = aria["id"].as_str().unwrap();
    let old = strings(&aria["itemImages"]);

    let keep = serde_json::to_string(&[old[1].as_str()]).unwrap();
    let updated = body_json(
        send(
            &app.router,
            Form::new()
                .text("keepItems", &keep)
                .request(Method::PUT, &format!("/api/players/{id}")),
        )
        .await,
    )
    .await;

    assert_eq!(strings(&updated["itemImages"]), vec![old[1].clone()]);
    assert_eq!(strings(&updated["itemDescriptions"]), vec!["shield"]);
}

#[tokio::test]
async fn new_portrait_releases_the_old_one() {
    let app = build_test_app();
    let aria = create(
        &app.router,
        Form::new().text("name", "Aria").png("charImg", "old.png"),
    )
    .await;
    let id = aria["id"].as_str().unwrap();

    let updated = body_json(
        send(
            &app.router,
            Form::new()
                .png("charImg", "new.png")
                .request(Method::PUT, &format!("/api/players/{id}")),
        )
        .await,
    )
    .await;

    assert_eq!(updated["portraitImage"], "mem://1/new.png");
    assert_eq!(app.images.deleted(), vec!["mem://0/old.png".to_string()]);
}

#[tokio::test]
async fn blank_name_on_update_is_rejected() {
    let app = build_test_app();
    let aria = create(&app.router, Form::new().text("name", "Aria")).await;
    let id = aria["id"].as_str().unwrap();

    let response = send(
        &app.router,
        Form::new()
            .text("name", "  ")
            .request(Method::PUT, &format!("/api/players/{id}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_returns_the_record_and_releases_images() {
    let app = build_test_app();
    let aria = create(
        &app.router,
        Form::new()
            .text("name", "Aria")
            .png("charImg", "face.png")
            .png("items", "sword.png"),
    )
    .await;
    let id = aria["id"].as_str().unwrap();

    let response = delete(&app.router, &format!("/api/players/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["deleted"], aria);

    let mut deleted = app.images.deleted();
    deleted.sort();
    assert_eq!(deleted, vec!["mem://0/face.png", "mem://1/sword.png"]);

    let response = get(&app.router, &format!("/api/players/id/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_version() {
    let app = build_test_app();
    let response = get(&app.router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn mutations_invalidate_the_cache() {
    let app = build_test_app();
    get(&app.router, "/api/players").await;
    assert!(app.state.cache.get().await.is_some());

    create(&app.router, Form::new().text("name", "Aria")).await;
    assert!(app.state.cache.get().await.is_none());
}
