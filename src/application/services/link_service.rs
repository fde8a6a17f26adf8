//! Link lifecycle service: creation, resolution, click accounting and expiry.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{Click, ClickMeta, Link, NewClick, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::domain::{LinkAnalytics, ReconcileReport, Resolution, SweepReport};
use crate::error::AppError;
use crate::infrastructure::cache::{CacheError, ResolutionCache};
use crate::infrastructure::counter::ClickCounter;
use crate::utils::base62;

/// Seven days, the TTL of a cached short code.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
/// Links read per page while sweeping.
pub const DEFAULT_SWEEP_PAGE_SIZE: i64 = 500;
/// Age after which a code-less link is treated as an abandoned creation.
pub const DEFAULT_ORPHAN_GRACE_SECONDS: i64 = 600;

/// Tunables of [`LinkService`].
#[derive(Debug, Clone)]
pub struct LinkServiceOptions {
    pub cache_ttl_seconds: u64,
    pub sweep_page_size: i64,
    pub orphan_grace: Duration,
}

impl Default for LinkServiceOptions {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            sweep_page_size: DEFAULT_SWEEP_PAGE_SIZE,
            orphan_grace: Duration::seconds(DEFAULT_ORPHAN_GRACE_SECONDS),
        }
    }
}

/// Reachability of the three backends.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub store: Result<(), String>,
    pub cache: bool,
    pub counter: bool,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.store.is_ok() && self.cache && self.counter
    }
}

/// Orchestrates the link store, the resolution cache and the click counter.
///
/// The link store is authoritative for existence and expiry. The cache and
/// the counter are optimizations: when they fail, operations carry on against
/// the store and the failure only shows up in logs and metrics.
///
/// Two counting paths feed the same `click_count` column and are kept apart:
///
/// - [`LinkService::record_redirect_click`] writes one durable click per
///   redirect;
/// - [`LinkService::resolve_link`] only bumps the lookup counter, which
///   [`LinkService::reconcile`] later folds into the durable total.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    cache: Arc<dyn ResolutionCache>,
    counter: Arc<dyn ClickCounter>,
    options: LinkServiceOptions,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service with default options.
    pub fn new(
        link_repository: Arc<L>,
        cache: Arc<dyn ResolutionCache>,
        counter: Arc<dyn ClickCounter>,
    ) -> Self {
        Self {
            link_repository,
            cache,
            counter,
            options: LinkServiceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LinkServiceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LinkServiceOptions {
        &self.options
    }

    /// Creates a short link for `target_url`.
    ///
    /// # Steps
    ///
    /// 1. Insert the row without a code to obtain its id
    /// 2. Derive the code from the id (base62)
    /// 3. Store the code on the same row
    /// 4. Write the code → target mapping to the cache
    ///
    /// Steps 1-3 run on a spawned task: once the row exists, dropping the
    /// caller's future must not stop the code from being assigned. If step 3
    /// fails anyway the row stays code-less and is removed by the orphan
    /// purge of [`Self::sweep_expired`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the target is not an absolute
    /// http(s) URL and [`AppError::StoreUnavailable`] if the store fails.
    /// A failing cache is logged and ignored.
    pub async fn create_link(
        &self,
        target_url: String,
        expires_at: Option<DateTime<Utc>>,
        owner: Option<String>,
    ) -> Result<Link, AppError> {
        validate_target_url(&target_url)?;

        let new_link = NewLink {
            target_url,
            owner: owner
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty()),
            expires_at,
        };

        let repository = Arc::clone(&self.link_repository);
        let link = tokio::spawn(async move { persist_new_link(repository.as_ref(), new_link).await })
            .await
            .map_err(|e| {
                AppError::internal("Link creation task failed", json!({ "reason": e.to_string() }))
            })??;

        let Some(code) = link.code.as_deref() else {
            return Err(AppError::internal(
                "Link stored without a short code",
                json!({ "id": link.id }),
            ));
        };

        if let Err(e) = self
            .cache
            .set_url(code, &link.target_url, self.options.cache_ttl_seconds)
            .await
        {
            cache_degraded("set", code, &e);
        }

        info!(id = link.id, code, "Short link created");
        Ok(link)
    }

    /// Resolves a short code to its target URL.
    ///
    /// A cache hit is never served on its own: the store is always asked for
    /// the link, because only the store knows whether it still exists and
    /// whether it has expired. A hit saves nothing but the target value.
    ///
    /// On success the lookup counter for `code` is incremented; no durable
    /// click is written here. On a miss the cache is populated.
    ///
    /// # Errors
    ///
    /// Only store failures are errors ([`AppError::StoreUnavailable`]).
    /// Unknown and expired codes are reported through [`Resolution`].
    pub async fn resolve_link(&self, code: &str) -> Result<Resolution, AppError> {
        if !base62::is_valid_code(code) {
            record_resolution("not_found");
            return Ok(Resolution::NotFound);
        }

        let cached = match self.cache.get_url(code).await {
            Ok(cached) => cached,
            Err(e) => {
                cache_degraded("get", code, &e);
                None
            }
        };

        let now = Utc::now();
        let Some(link) = self.link_repository.find_by_code(code).await? else {
            if cached.is_some() {
                debug!(code, "Dropping cache entry for a link the store does not have");
                self.invalidate_quietly(code).await;
            }
            record_resolution("not_found");
            return Ok(Resolution::NotFound);
        };

        if link.is_expired_at(now) {
            record_resolution("expired");
            return Ok(Resolution::Expired);
        }

        let target = match cached {
            Some(target) => {
                record_resolution("hit");
                target
            }
            None => {
                record_resolution("miss");
                if let Err(e) = self
                    .cache
                    .set_url(code, &link.target_url, self.options.cache_ttl_seconds)
                    .await
                {
                    cache_degraded("set", code, &e);
                }
                link.target_url
            }
        };

        if let Err(e) = self.counter.increment(code).await {
            counter_degraded("increment", code, &e);
        }

        Ok(Resolution::Found(target))
    }

    /// Records a durable click for a redirect that was just served.
    ///
    /// Inserts the click event, increments the link's click count by one and
    /// sets its last access time, atomically in the store.
    ///
    /// Expiry is not checked here: call it only after [`Self::resolve_link`]
    /// returned [`Resolution::Found`] for the same code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code (for example
    /// because the sweep removed it in the meantime).
    pub async fn record_redirect_click(
        &self,
        code: &str,
        meta: ClickMeta,
    ) -> Result<Click, AppError> {
        let link = self.find_existing(code).await?;

        self.link_repository
            .record_click(NewClick::from_meta(link.id, Utc::now(), meta))
            .await
    }

    /// Folds the lookup counter for `code` into the durable click count.
    ///
    /// Reads the delta, adds it to `click_count` (also setting
    /// `last_accessed_at`), then subtracts that delta from the counter, so
    /// lookups counted in the meantime stay pending for the next run. The two
    /// stores are not updated atomically: if the subtraction fails after the
    /// store write, the same delta is applied again next time. Click totals
    /// are advisory, so this is accepted.
    ///
    /// # Errors
    ///
    /// - [`AppError::CacheUnavailable`] if the counter cannot be read
    /// - [`AppError::NotFound`] if no link has this code
    /// - [`AppError::StoreUnavailable`] on store failures
    pub async fn reconcile(&self, code: &str) -> Result<Link, AppError> {
        self.reconcile_code(code).await.map(|(link, _)| link)
    }

    /// Reconciles every code that currently holds a lookup counter.
    ///
    /// A failure on one code is logged and does not stop the batch. Counters
    /// of links that no longer exist are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CacheUnavailable`] if the pending codes cannot be
    /// listed.
    pub async fn reconcile_pending(&self) -> Result<ReconcileReport, AppError> {
        let codes = self.counter.pending_codes().await.map_err(|e| {
            AppError::cache_unavailable("Click counter unavailable", json!({ "reason": e.to_string() }))
        })?;

        let mut report = ReconcileReport::default();

        for code in codes {
            match self.reconcile_code(&code).await {
                Ok((_, delta)) => {
                    report.reconciled += 1;
                    report.clicks_applied += delta;
                }
                Err(AppError::NotFound { .. }) => {
                    debug!(code = %code, "Dropping counter of a deleted link");
                    if let Err(e) = self.counter.reset(&code).await {
                        counter_degraded("reset", &code, &e);
                    }
                }
                Err(e) => {
                    warn!(code = %code, error = %e, "Reconciliation failed");
                    report.failed += 1;
                }
            }
        }

        if report.reconciled > 0 || report.failed > 0 {
            info!(
                reconciled = report.reconciled,
                failed = report.failed,
                clicks = report.clicks_applied,
                "Reconciliation finished"
            );
        }

        Ok(report)
    }

    /// Deletes every link whose expiry lies strictly before now.
    ///
    /// Walks the store page by page; for each expired link the cache entry is
    /// invalidated first, then the link is deleted together with its clicks.
    /// Finally, code-less rows older than the orphan grace period are purged.
    ///
    /// Safe to run next to resolution: a link deleted here is simply not
    /// found by the next store check of a concurrent resolution.
    ///
    /// # Errors
    ///
    /// Store failures abort the sweep with [`AppError::StoreUnavailable`];
    /// links deleted before the failure stay deleted.
    pub async fn sweep_expired(&self) -> Result<SweepReport, AppError> {
        let now = Utc::now();
        let page_size = self.options.sweep_page_size.max(1);
        let mut report = SweepReport::default();
        let mut after_id = 0;

        loop {
            let page = self.link_repository.list_page(after_id, page_size).await?;
            let Some(last) = page.last() else {
                break;
            };
            after_id = last.id;
            let page_len = page.len() as i64;

            for link in page {
                report.scanned += 1;

                if !link.is_sweepable_at(now) {
                    continue;
                }

                if let Some(code) = link.code.as_deref() {
                    self.invalidate_quietly(code).await;
                    if let Err(e) = self.counter.reset(code).await {
                        counter_degraded("reset", code, &e);
                    }
                }

                if self.link_repository.delete(link.id).await? {
                    debug!(id = link.id, code = ?link.code, "Expired link deleted");
                    report.deleted += 1;
                }
            }

            if page_len < page_size {
                break;
            }
        }

        report.orphans_purged = self
            .link_repository
            .purge_orphans(now - self.options.orphan_grace)
            .await?;

        metrics::counter!("shortlink_swept_links_total").increment(report.deleted);
        info!(
            scanned = report.scanned,
            deleted = report.deleted,
            orphans = report.orphans_purged,
            "Expiry sweep finished"
        );

        Ok(report)
    }

    /// Returns aggregate analytics for a link.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no link has this code
    /// - [`AppError::Expired`] if the link has expired
    pub async fn get_analytics(&self, code: &str) -> Result<LinkAnalytics, AppError> {
        let link = self.find_existing(code).await?;

        if link.is_expired() {
            return Err(AppError::expired(
                "This short URL has expired",
                json!({ "code": code, "expires_at": link.expires_at }),
            ));
        }

        let pending_lookups = match self.counter.get(code).await {
            Ok(delta) => delta,
            Err(e) => {
                counter_degraded("get", code, &e);
                0
            }
        };

        Ok(LinkAnalytics::from_link(link, code.to_string(), pending_lookups))
    }

    /// Checks the store, the cache and the counter.
    pub async fn health(&self) -> HealthReport {
        HealthReport {
            store: self
                .link_repository
                .ping()
                .await
                .map_err(|e| e.to_string()),
            cache: self.cache.health_check().await,
            counter: self.counter.health_check().await,
        }
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    async fn reconcile_code(&self, code: &str) -> Result<(Link, i64), AppError> {
        let delta = self.counter.get(code).await.map_err(|e| {
            AppError::cache_unavailable("Click counter unavailable", json!({ "reason": e.to_string() }))
        })?;

        let link = self.find_existing(code).await?;

        let delta = delta.max(0);
        let updated = self
            .link_repository
            .update_click_stats(link.id, delta, Utc::now())
            .await?;

        if let Err(e) = self.counter.subtract(code, delta).await {
            // The delta is already durable; it will be applied again next run.
            counter_degraded("subtract", code, &e);
        }

        debug!(code, delta, click_count = updated.click_count, "Counter reconciled");
        Ok((updated, delta))
    }

    async fn find_existing(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    async fn invalidate_quietly(&self, code: &str) {
        if let Err(e) = self.cache.invalidate(code).await {
            cache_degraded("invalidate", code, &e);
        }
    }
}

/// Runs the two creation writes: insert without a code, then assign it.
async fn persist_new_link<L: LinkRepository + ?Sized>(
    repository: &L,
    new_link: NewLink,
) -> Result<Link, AppError> {
    let pending = repository.insert_pending(new_link).await?;
    let code = base62::encode(pending.id)?;
    repository.assign_code(pending.id, &code).await
}

/// Accepts absolute `http`/`https` URLs with a host.
fn validate_target_url(target_url: &str) -> Result<(), AppError> {
    let parsed = url::Url::parse(target_url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "Only http and https URLs can be shortened",
            json!({ "scheme": parsed.scheme() }),
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::bad_request(
            "URL must have a host",
            json!({ "url": target_url }),
        ));
    }

    Ok(())
}

fn record_resolution(outcome: &'static str) {
    metrics::counter!("shortlink_resolutions_total", "outcome" => outcome).increment(1);
}

fn cache_degraded(op: &'static str, code: &str, err: &CacheError) {
    warn!(op, code, error = %err, "Resolution cache unavailable, continuing without it");
    metrics::counter!("shortlink_cache_degraded_total", "op" => op).increment(1);
}

fn counter_degraded(op: &'static str, code: &str, err: &CacheError) {
    warn!(op, code, error = %err, "Click counter unavailable, continuing without it");
    metrics::counter!("shortlink_counter_degraded_total", "op" => op).increment(1);
}
