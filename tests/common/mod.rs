#![allow(dead_code)]

use axum::extract::ConnectInfo;
use chrono::{DateTime, Utc};
use shortlink_lifecycle::application::services::LinkService;
use shortlink_lifecycle::domain::repositories::LinkRepository;
use shortlink_lifecycle::infrastructure::cache::MemoryCache;
use shortlink_lifecycle::infrastructure::counter::MemoryCounter;
use shortlink_lifecycle::infrastructure::persistence::MemoryLinkRepository;
use shortlink_lifecycle::state::AppState;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;

pub const BASE_URL: &str = "http://sho.rt";

/// Lifecycle service over in-memory adapters, with handles to each adapter.
pub struct TestContext {
    pub repo: Arc<MemoryLinkRepository>,
    pub cache: Arc<MemoryCache>,
    pub counter: Arc<MemoryCounter>,
    pub service: Arc<LinkService<dyn LinkRepository>>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_repository(MemoryLinkRepository::new())
    }

    pub fn with_first_id(first_id: i64) -> Self {
        Self::with_repository(MemoryLinkRepository::with_first_id(first_id))
    }

    fn with_repository(repo: MemoryLinkRepository) -> Self {
        let repo = Arc::new(repo);
        let cache = Arc::new(MemoryCache::new());
        let counter = Arc::new(MemoryCounter::new());

        let store: Arc<dyn LinkRepository> = repo.clone();
        let service = Arc::new(LinkService::new(store, cache.clone(), counter.clone()));

        Self {
            repo,
            cache,
            counter,
            service,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(Arc::clone(&self.service), BASE_URL.to_string())
    }

    /// Creates a live link and returns its code.
    pub async fn create(&self, url: &str) -> String {
        self.create_expiring(url, None).await
    }

    pub async fn create_expiring(&self, url: &str, expires_at: Option<DateTime<Utc>>) -> String {
        self.service
            .create_link(url.to_string(), expires_at, None)
            .await
            .unwrap()
            .code
            .unwrap()
    }
}

/// Lifecycle service over PostgreSQL with in-memory cache and counter.
pub fn pg_state(pool: PgPool) -> AppState {
    let store: Arc<dyn LinkRepository> = Arc::new(
        shortlink_lifecycle::infrastructure::persistence::PgLinkRepository::new(Arc::new(pool)),
    );
    let service = Arc::new(LinkService::new(
        store,
        Arc::new(MemoryCache::new()),
        Arc::new(MemoryCounter::new()),
    ));

    AppState::new(service, BASE_URL.to_string())
}

/// Inserts a link directly, bypassing the service.
pub async fn insert_link(
    pool: &PgPool,
    code: &str,
    url: &str,
    expires_at: Option<DateTime<Utc>>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (code, target_url, expires_at) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(code)
    .bind(url)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Injects a fixed peer address, standing in for `into_make_service_with_connect_info`.
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
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
