#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header};
use backend::dbs::{Database, DbError, DbResult, LocalDatabase};
use backend::images::{ImageHost, ImageResult, ImageUpload};
use backend::{AppState, router};
use http_body_util::BodyExt;
use shared::models::Player;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const BOUNDARY: &str = "tavern-test-boundary";
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// Image host that hands out `mem://` references and remembers what it was
/// asked to do.
#[derive(Default)]
pub struct RecordingImageHost {
    uploads: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl RecordingImageHost {
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for RecordingImageHost {
    async fn upload(&self, upload: ImageUpload) -> ImageResult<String> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("mem://{}/{}", n, upload.file_name))
    }

    async fn delete(&self, reference: &str) -> ImageResult<bool> {
        if !reference.starts_with("mem://") {
            return Ok(false);
        }
        self.deleted.lock().unwrap().push(reference.to_string());
        Ok(true)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WriteFailure {
    /// Writes fail the way a broken disk or connection would.
    Store,
    /// Updates are refused as if another edit got there first.
    Stale,
}

/// In-memory store whose writes can be made to fail on demand.
pub struct FlakyDatabase {
    inner: LocalDatabase,
    failure: Mutex<Option<WriteFailure>>,
}

impl FlakyDatabase {
    pub fn new() -> Self {
        Self {
            inner: LocalDatabase::in_memory(),
            failure: Mutex::new(None),
        }
    }

    pub fn fail_writes(&self, failure: WriteFailure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    fn check(&self, player_id: Uuid) -> DbResult<()> {
        match *self.failure.lock().unwrap() {
            Some(WriteFailure::Store) => Err(DbError::Internal("write failed".into())),
            Some(WriteFailure::Stale) => Err(DbError::Conflict(player_id.to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Database for FlakyDatabase {
    async fn get_players(&self, campaign: Option<&str>) -> DbResult<Vec<Player>> {
        self.inner.get_players(campaign).await
    }

    async fn get_player(&self, player_id: Uuid) -> DbResult<Player> {
        self.inner.get_player(player_id).await
    }

    async fn create_player(&self, player: Player) -> DbResult<Player> {
        self.check(player.id)?;
        self.inner.create_player(player).await
    }

    async fn update_player(&self, player: Player) -> DbResult<Player> {
        self.check(player.id)?;
        self.inner.update_player(player).await
    }

    async fn delete_player(&self, player_id: Uuid) -> DbResult<Player> {
        self.check(player_id)?;
        self.inner.delete_player(player_id).await
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub images: Arc<RecordingImageHost>,
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(LocalDatabase::in_memory()))
}

pub fn build_test_app_with(db: Arc<dyn Database>) -> TestApp {
    let images = Arc::new(RecordingImageHost::default());
    let state = AppState::new(db, images.clone(), None);
    TestApp {
        router: router(state.clone()),
        state,
        images,
    }
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct Form {
    body: Vec<u8>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn png(self, name: &str, file_name: &str) -> Self {
        self.file(name, file_name, "image/png", PNG)
    }

    pub fn request(mut self, method: Method, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::delete(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Creates a player through the API and returns the JSON record.
pub async fn create(app: &Router, form: Form) -> serde_json::Value {
    let response = send(app, form.request(Method::POST, "/api/players")).await;
    assert_eq!(response.status(), 200);
    body_json(response).await
}

pub fn strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}
