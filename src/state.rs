//! Shared application state passed to HTTP handlers.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;

/// Handler state: the lifecycle service and the public base URL.
///
/// The repository is type-erased so the same router serves PostgreSQL in
/// production and the in-memory store in tests.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub base_url: String,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService<dyn LinkRepository>>, base_url: String) -> Self {
        Self {
            link_service,
            base_url,
        }
    }

    /// Full short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        self.link_service.short_url(&self.base_url, code)
    }
}
