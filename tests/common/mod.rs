#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tower::Layer;

use link_pulse::domain::click_event::{ClickEvent, ClickMeta};
use link_pulse::domain::click_pipeline::{ClickPipeline, PipelineConfig};
use link_pulse::domain::entities::{Link, NewLink};
use link_pulse::domain::repositories::{ClickRepository, LinkRepository};
use link_pulse::error::AppError;
use link_pulse::state::AppState;

pub const BASE_URL: &str = "http://s.test";
pub const PEER_ADDR: &str = "127.0.0.1:12345";

/// In-memory link store.
#[derive(Default)]
pub struct FakeLinkRepository {
    links: Mutex<HashMap<String, Link>>,
    next_id: AtomicI64,
    pub ping_fails: AtomicBool,
}

impl FakeLinkRepository {
    pub fn insert(&self, code: &str, url: &str) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let link = Link::new(id, code.to_string(), url.to_string(), Utc::now());
        self.links.lock().unwrap().insert(code.to_string(), link);
        id
    }

    pub fn get(&self, code: &str) -> Option<Link> {
        self.links.lock().unwrap().get(code).cloned()
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

#[async_trait]
impl LinkRepository for FakeLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();
        if links.contains_key(&new_link.code) {
            return Err(AppError::conflict("Unique constraint violation", json!({})));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let link = Link::new(id, new_link.code, new_link.original_url, Utc::now());
        links.insert(link.code.clone(), link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.get(code))
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.ping_fails.load(Ordering::SeqCst) {
            return Err(AppError::internal("connection refused", json!({})));
        }
        Ok(())
    }
}

/// In-memory click store that records every batch write attempt.
///
/// `fail` makes writes return an error; `hang` makes them never complete.
/// `flush_started` is notified at the start of every write.
pub struct FakeClickRepository {
    links: Arc<FakeLinkRepository>,
    attempts: Mutex<Vec<Vec<ClickEvent>>>,
    persisted: Mutex<Vec<ClickEvent>>,
    pub fail: AtomicBool,
    pub hang: AtomicBool,
    pub flush_started: Notify,
}

impl FakeClickRepository {
    pub fn new(links: Arc<FakeLinkRepository>) -> Self {
        Self {
            links,
            attempts: Mutex::new(Vec::new()),
            persisted: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            hang: AtomicBool::new(false),
            flush_started: Notify::new(),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.attempts.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn persisted(&self) -> Vec<ClickEvent> {
        self.persisted.lock().unwrap().clone()
    }

    pub fn persisted_link_ids(&self) -> Vec<i64> {
        self.persisted().iter().map(|e| e.link_id).collect()
    }
}

#[async_trait]
impl ClickRepository for FakeClickRepository {
    async fn insert_clicks(&self, batch: &[ClickEvent]) -> Result<(), AppError> {
        self.attempts.lock().unwrap().push(batch.to_vec());
        self.flush_started.notify_one();

        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::internal("Database error", json!({})));
        }

        self.persisted.lock().unwrap().extend_from_slice(batch);
        Ok(())
    }

    async fn total_clicks(&self, code: &str) -> Result<Option<i64>, AppError> {
        let Some(link) = self.links.get(code) else {
            return Ok(None);
        };
        let total = self
            .persisted
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.link_id == link.id)
            .count();
        Ok(Some(total as i64))
    }
}

pub struct TestContext {
    pub state: AppState,
    pub links: Arc<FakeLinkRepository>,
    pub clicks: Arc<FakeClickRepository>,
    pub pipeline: Arc<ClickPipeline>,
}

/// Builds application state over in-memory repositories with a running pipeline.
pub fn create_test_state(config: PipelineConfig) -> TestContext {
    let links = Arc::new(FakeLinkRepository::default());
    let clicks = Arc::new(FakeClickRepository::new(links.clone()));
    let pipeline = Arc::new(ClickPipeline::start(config, clicks.clone()));

    let state = AppState::new(links.clone(), clicks.clone(), pipeline.clone(), BASE_URL, 7);

    TestContext {
        state,
        links,
        clicks,
        pipeline,
    }
}

/// Pipeline that flushes every click immediately.
pub fn eager_pipeline_config() -> PipelineConfig {
    PipelineConfig::new(64, 1, 1, Duration::from_secs(1), Duration::from_secs(2))
}

pub fn click(link_id: i64) -> ClickEvent {
    ClickEvent::now(link_id, ClickMeta::new("127.0.0.1", "test-agent"))
}

/// Injects a fixed `ConnectInfo` so handlers can be tested without a socket.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = PEER_ADDR.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Full route table with a mocked peer address.
pub fn test_server(state: AppState) -> axum_test::TestServer {
    let app = link_pulse::routes::router(state).layer(MockConnectInfoLayer);
    axum_test::TestServer::new(app).unwrap()
}
