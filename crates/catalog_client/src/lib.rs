use std::sync::Arc;

use async_trait::async_trait;
use catalog_shared::{
    domain::{ArtistId, EntityRef, LabelId, ReleaseId},
    error::ApiError,
    protocol::{
        ArtistOverview, CollectionEntryPayload, FollowStatusResponse, LabelOverview,
        ReleaseOverview,
    },
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub mod collection;
pub mod config;
pub mod error;
pub mod feedback;
pub mod overview;
pub mod pagination;
pub mod presentation;
pub mod relationship;
pub mod scope;
pub mod session;

pub use collection::{CollectionEditor, EditBuffer};
pub use error::CatalogError;
pub use feedback::{Feedback, FeedbackChannel, Severity};
pub use overview::{
    ArtistOverviewSource, LabelOverviewSource, OverviewLoader, OverviewQuery, OverviewSource,
};
pub use pagination::page_window;
pub use relationship::{FollowState, RelationshipStore};
pub use scope::ViewScope;
pub use session::{SharedSession, StaticSession, ViewerSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    Denied,
    Busy,
    Invalid,
    Failed,
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOverviewParams {
    pub include_master: bool,
    pub currency: String,
    pub master_per_page: u32,
}

impl Default for ReleaseOverviewParams {
    fn default() -> Self {
        Self {
            include_master: true,
            currency: "USD".to_string(),
            master_per_page: 10,
        }
    }
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn follow_status(&self, entity: EntityRef) -> Result<FollowStatusResponse, CatalogError>;
    async fn follow(&self, entity: EntityRef) -> Result<(), CatalogError>;
    async fn unfollow(&self, entity: EntityRef) -> Result<(), CatalogError>;
    async fn release_overview(
        &self,
        release_id: ReleaseId,
        params: &ReleaseOverviewParams,
    ) -> Result<ReleaseOverview, CatalogError>;
    async fn save_collection_entry(
        &self,
        release_id: ReleaseId,
        payload: &CollectionEntryPayload,
    ) -> Result<(), CatalogError>;
    async fn remove_collection_entry(&self, release_id: ReleaseId) -> Result<(), CatalogError>;
    async fn artist_overview(
        &self,
        artist_id: ArtistId,
        query: &OverviewQuery,
    ) -> Result<ArtistOverview, CatalogError>;
    async fn label_overview(
        &self,
        label_id: LabelId,
        query: &OverviewQuery,
    ) -> Result<LabelOverview, CatalogError>;
}

pub struct HttpCatalogApi {
    http: Client,
    base_url: Url,
    session: Arc<dyn ViewerSession>,
}

impl HttpCatalogApi {
    pub fn new(base_url: &str, session: Arc<dyn ViewerSession>) -> Result<Self, CatalogError> {
        Self::with_client(Client::new(), base_url, session)
    }

    pub fn with_client(
        http: Client,
        base_url: &str,
        session: Arc<dyn ViewerSession>,
    ) -> Result<Self, CatalogError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(&format!("{trimmed}/"))?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.base_url.join(path)?)
    }

    fn follow_path(entity: EntityRef, action: &str) -> String {
        format!("api/{}/{}/{action}", entity.kind.path_segment(), entity.id.0)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CatalogError> {
        let request = match self.session.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, CatalogError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| CatalogError::Decode(err.to_string()))
    }
}

async fn check_status(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    debug!(status = status.as_u16(), url = %response.url(), "catalog request rejected");
    match status {
        StatusCode::UNAUTHORIZED => Err(CatalogError::AuthRequired),
        StatusCode::FORBIDDEN => Err(CatalogError::Forbidden),
        StatusCode::NOT_FOUND => Err(CatalogError::NotFound),
        _ => {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|err| err.message)
                .unwrap_or(body);
            Err(CatalogError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn follow_status(&self, entity: EntityRef) -> Result<FollowStatusResponse, CatalogError> {
        let url = self.endpoint(&Self::follow_path(entity, "follow-status"))?;
        self.send_json(self.http.get(url)).await
    }

    async fn follow(&self, entity: EntityRef) -> Result<(), CatalogError> {
        let url = self.endpoint(&Self::follow_path(entity, "follow"))?;
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    async fn unfollow(&self, entity: EntityRef) -> Result<(), CatalogError> {
        let url = self.endpoint(&Self::follow_path(entity, "unfollow"))?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn release_overview(
        &self,
        release_id: ReleaseId,
        params: &ReleaseOverviewParams,
    ) -> Result<ReleaseOverview, CatalogError> {
        let url = self.endpoint(&format!("api/releases/{}/overview", release_id.0))?;
        let request = self.http.get(url).query(&[
            ("includeMaster", params.include_master.to_string()),
            ("curr_abbr", params.currency.clone()),
            ("master_per_page", params.master_per_page.to_string()),
        ]);
        self.send_json(request).await
    }

    async fn save_collection_entry(
        &self,
        release_id: ReleaseId,
        payload: &CollectionEntryPayload,
    ) -> Result<(), CatalogError> {
        let url = self.endpoint(&format!("api/releases/{}/collection", release_id.0))?;
        self.send(self.http.post(url).json(payload)).await?;
        Ok(())
    }

    async fn remove_collection_entry(&self, release_id: ReleaseId) -> Result<(), CatalogError> {
        let url = self.endpoint(&format!("api/releases/{}/collection", release_id.0))?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn artist_overview(
        &self,
        artist_id: ArtistId,
        query: &OverviewQuery,
    ) -> Result<ArtistOverview, CatalogError> {
        let url = self.endpoint(&format!("api/artists/{}/overview", artist_id.0))?;
        let request = self.http.get(url).query(&[
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
            ("sort", query.sort_field.as_str().to_string()),
            ("sort_order", query.sort_order.as_str().to_string()),
        ]);
        self.send_json(request).await
    }

    async fn label_overview(
        &self,
        label_id: LabelId,
        query: &OverviewQuery,
    ) -> Result<LabelOverview, CatalogError> {
        let url = self.endpoint(&format!("api/labels/{}/overview", label_id.0))?;
        let request = self.http.get(url).query(&[
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
        ]);
        self.send_json(request).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
