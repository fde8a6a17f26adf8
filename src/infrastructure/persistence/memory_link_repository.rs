//! In-memory implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Click, Link, NewClick, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link store held in process memory.
///
/// Mirrors the PostgreSQL semantics the lifecycle service relies on: ids
/// start at 1, codes are unique and write-once, counter updates happen under
/// the row's shard lock, and deleting a link deletes its clicks.
///
/// Lock order is always `links` before `codes`/`clicks`, never the reverse.
#[derive(Debug)]
pub struct MemoryLinkRepository {
    links: DashMap<i64, Link>,
    codes: DashMap<String, i64>,
    clicks: DashMap<i64, Vec<Click>>,
    next_link_id: AtomicI64,
    next_click_id: AtomicI64,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            codes: DashMap::new(),
            clicks: DashMap::new(),
            next_link_id: AtomicI64::new(1),
            next_click_id: AtomicI64::new(1),
        }
    }

    /// Starts id assignment at `first_id` instead of 1.
    pub fn with_first_id(first_id: i64) -> Self {
        let repo = Self::new();
        repo.next_link_id.store(first_id, Ordering::SeqCst);
        repo
    }

    /// Number of links stored, pending ones included.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Looks a link up by id, pending or not.
    pub fn get(&self, id: i64) -> Option<Link> {
        self.links.get(&id).map(|l| l.clone())
    }

    fn remove_link(&self, id: i64) -> bool {
        let Some((_, link)) = self.links.remove(&id) else {
            return false;
        };

        if let Some(code) = link.code {
            self.codes.remove(&code);
        }
        self.clicks.remove(&id);
        true
    }
}

impl Default for MemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert_pending(&self, new_link: NewLink) -> Result<Link, AppError> {
        let id = self.next_link_id.fetch_add(1, Ordering::SeqCst);
        let link = Link::new(
            id,
            None,
            new_link.target_url,
            new_link.owner,
            Utc::now(),
            new_link.expires_at,
            0,
            None,
        );

        self.links.insert(id, link.clone());
        Ok(link)
    }

    async fn assign_code(&self, id: i64, code: &str) -> Result<Link, AppError> {
        let mut link = match self.links.get_mut(&id) {
            Some(link) if link.code.is_none() => link,
            _ => {
                return Err(AppError::not_found(
                    "No pending link to assign a code to",
                    json!({ "id": id }),
                ));
            }
        };

        match self.codes.entry(code.to_string()) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": "links_code_key" }),
                ));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        link.code = Some(code.to_string());
        Ok(link.clone())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let Some(id) = self.codes.get(code).map(|id| *id) else {
            return Ok(None);
        };

        Ok(self.links.get(&id).map(|l| l.clone()))
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.codes.contains_key(code))
    }

    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let Some(mut link) = self.links.get_mut(&new_click.link_id) else {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "link_id": new_click.link_id }),
            ));
        };

        link.click_count += 1;
        link.last_accessed_at = Some(new_click.clicked_at);

        let click = Click::new(
            self.next_click_id.fetch_add(1, Ordering::SeqCst),
            new_click.link_id,
            new_click.clicked_at,
            new_click.ip,
            new_click.user_agent,
            new_click.referrer,
        );

        self.clicks
            .entry(new_click.link_id)
            .or_default()
            .push(click.clone());

        Ok(click)
    }

    async fn update_click_stats(
        &self,
        id: i64,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<Link, AppError> {
        let Some(mut link) = self.links.get_mut(&id) else {
            return Err(AppError::not_found("Link not found", json!({ "id": id })));
        };

        link.click_count += delta;
        link.last_accessed_at = Some(now);
        Ok(link.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.remove_link(id))
    }

    async fn list_page(&self, after_id: i64, limit: i64) -> Result<Vec<Link>, AppError> {
        let mut page: Vec<Link> = self
            .links
            .iter()
            .filter(|e| *e.key() > after_id)
            .map(|e| e.value().clone())
            .collect();

        page.sort_by_key(|l| l.id);
        page.truncate(limit.max(0) as usize);
        Ok(page)
    }

    async fn purge_orphans(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let candidates: Vec<i64> = self
            .links
            .iter()
            .filter(|e| e.code.is_none() && e.created_at < cutoff)
            .map(|e| *e.key())
            .collect();

        let mut purged = 0;
        for id in candidates {
            // Re-check: the code may have been assigned since the scan.
            if self
                .links
                .remove_if(&id, |_, l| l.code.is_none() && l.created_at < cutoff)
                .is_some()
            {
                self.clicks.remove(&id);
                purged += 1;
            }
        }

        Ok(purged)
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        Ok(self
            .clicks
            .get(&link_id)
            .map(|c| c.len() as i64)
            .unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
