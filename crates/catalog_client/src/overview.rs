//! The last response to arrive is displayed, even when it answers a superseded
//! query. `OverviewSnapshot::is_stale` reports that case.

use std::sync::Arc;

use async_trait::async_trait;
use catalog_shared::{
    domain::{ArtistId, LabelId, SortField, SortOrder},
    protocol::{ArtistOverview, LabelOverview, PaginationMeta},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    error::CatalogError,
    feedback::{failure_feedback, FeedbackChannel},
    pagination::page_window,
    scope::ViewScope,
    ActionOutcome, CatalogApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverviewQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl OverviewQuery {
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn resorted(self, field: SortField) -> Self {
        let (sort_field, sort_order) = if field == self.sort_field {
            (field, self.sort_order.flipped())
        } else {
            (field, SortOrder::Desc)
        };
        Self {
            page: 1,
            sort_field,
            sort_order,
            ..self
        }
    }
}

#[async_trait]
pub trait OverviewSource: Send + Sync {
    type Overview: Clone + Send + Sync + 'static;

    async fn fetch(&self, query: &OverviewQuery) -> Result<Self::Overview, CatalogError>;

    fn pagination(overview: &Self::Overview) -> PaginationMeta;
}

pub struct ArtistOverviewSource {
    api: Arc<dyn CatalogApi>,
    artist_id: ArtistId,
}

impl ArtistOverviewSource {
    pub fn new(api: Arc<dyn CatalogApi>, artist_id: ArtistId) -> Self {
        Self { api, artist_id }
    }
}

#[async_trait]
impl OverviewSource for ArtistOverviewSource {
    type Overview = ArtistOverview;

    async fn fetch(&self, query: &OverviewQuery) -> Result<ArtistOverview, CatalogError> {
        self.api.artist_overview(self.artist_id, query).await
    }

    fn pagination(overview: &ArtistOverview) -> PaginationMeta {
        overview.releases.pagination
    }
}

pub struct LabelOverviewSource {
    api: Arc<dyn CatalogApi>,
    label_id: LabelId,
}

impl LabelOverviewSource {
    pub fn new(api: Arc<dyn CatalogApi>, label_id: LabelId) -> Self {
        Self { api, label_id }
    }
}

#[async_trait]
impl OverviewSource for LabelOverviewSource {
    type Overview = LabelOverview;

    async fn fetch(&self, query: &OverviewQuery) -> Result<LabelOverview, CatalogError> {
        self.api.label_overview(self.label_id, query).await
    }

    fn pagination(overview: &LabelOverview) -> PaginationMeta {
        overview.releases.pagination
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewSnapshot<T> {
    pub query: OverviewQuery,
    pub data: Option<T>,
    pub pagination: Option<PaginationMeta>,
    pub loading: bool,
    pub error: Option<String>,
    pub not_found: bool,
    pub loaded_query: Option<OverviewQuery>,
}

impl<T> OverviewSnapshot<T> {
    pub fn is_stale(&self) -> bool {
        self.loaded_query.is_some_and(|loaded| loaded != self.query)
    }
}

struct OverviewState<T> {
    query: OverviewQuery,
    data: Option<T>,
    pagination: Option<PaginationMeta>,
    pending: usize,
    error: Option<String>,
    not_found: bool,
    loaded_query: Option<OverviewQuery>,
}

pub struct OverviewLoader<S: OverviewSource> {
    source: S,
    feedback: FeedbackChannel,
    scope: ViewScope,
    inner: Mutex<OverviewState<S::Overview>>,
}

impl<S: OverviewSource> OverviewLoader<S> {
    pub fn new(source: S, feedback: FeedbackChannel, scope: ViewScope, query: OverviewQuery) -> Self {
        Self {
            source,
            feedback,
            scope,
            inner: Mutex::new(OverviewState {
                query,
                data: None,
                pagination: None,
                pending: 0,
                error: None,
                not_found: false,
                loaded_query: None,
            }),
        }
    }

    pub async fn snapshot(&self) -> OverviewSnapshot<S::Overview> {
        let guard = self.inner.lock().await;
        OverviewSnapshot {
            query: guard.query,
            data: guard.data.clone(),
            pagination: guard.pagination,
            loading: guard.pending > 0,
            error: guard.error.clone(),
            not_found: guard.not_found,
            loaded_query: guard.loaded_query,
        }
    }

    pub async fn query(&self) -> OverviewQuery {
        self.inner.lock().await.query
    }

    pub async fn load(&self) -> ActionOutcome {
        let query = self.inner.lock().await.query;
        self.fetch(query).await
    }

    pub async fn retry(&self) -> ActionOutcome {
        self.load().await
    }

    pub async fn change_sort(&self, field: SortField) -> ActionOutcome {
        let query = {
            let mut guard = self.inner.lock().await;
            guard.query = guard.query.resorted(field);
            guard.query
        };
        self.fetch(query).await
    }

    /// Sets the page verbatim; callers clamp to `1..=pages` first.
    pub async fn change_page(&self, page: u32) -> ActionOutcome {
        let query = {
            let mut guard = self.inner.lock().await;
            guard.query.page = page;
            guard.query
        };
        self.fetch(query).await
    }

    pub async fn page_links(&self, size: u32) -> Vec<u32> {
        let guard = self.inner.lock().await;
        match guard.pagination {
            Some(meta) => page_window(guard.query.page, meta.pages, size),
            None => Vec::new(),
        }
    }

    async fn fetch(&self, query: OverviewQuery) -> ActionOutcome {
        self.inner.lock().await.pending += 1;
        let result = self.source.fetch(&query).await;
        if self.scope.is_closed() {
            debug!(page = query.page, "overview: view closed, dropping response");
            return ActionOutcome::Discarded;
        }

        let mut guard = self.inner.lock().await;
        guard.pending = guard.pending.saturating_sub(1);
        match result {
            Ok(data) => {
                if guard.query != query {
                    debug!(
                        loaded_page = query.page,
                        current_page = guard.query.page,
                        "overview: applying response for a superseded query"
                    );
                }
                guard.pagination = Some(S::pagination(&data));
                guard.data = Some(data);
                guard.loaded_query = Some(query);
                guard.error = None;
                guard.not_found = false;
                ActionOutcome::Completed
            }
            Err(CatalogError::NotFound) => {
                guard.not_found = true;
                guard.error = None;
                guard.data = None;
                guard.pagination = None;
                guard.loaded_query = None;
                ActionOutcome::Failed
            }
            Err(err) => {
                warn!(page = query.page, error = %err, "overview: fetch failed");
                guard.error = Some(err.to_string());
                drop(guard);
                self.feedback.emit(failure_feedback("load releases", &err));
                ActionOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/overview_tests.rs"]
mod tests;
