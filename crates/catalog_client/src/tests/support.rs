//! In-memory catalog backend shared by the component tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use catalog_shared::{
    domain::{ArtistId, EntityRef, LabelId, ReleaseId},
    protocol::{
        ArtistDetail, ArtistOverview, CollectionEntry, CollectionEntryPayload, CommunityRating,
        EntityStats, FollowStatusResponse, LabelDetail, LabelOverview, PaginationMeta,
        ReleaseDetail, ReleaseListing, ReleaseOverview, ReleasePage, ReleaseStats,
    },
};
use tokio::sync::{Mutex, Notify};

use crate::{
    feedback::FeedbackChannel, scope::ViewScope, session::StaticSession, CatalogApi,
    CatalogError, OverviewQuery, ReleaseOverviewParams, ViewerSession,
};

pub(crate) struct FakeCatalog {
    pub following: bool,
    pub follower_count: u64,
    /// Followers gained from other viewers whenever a follow lands.
    pub concurrent_followers: u64,
    pub entry: Option<CollectionEntry>,
    pub fail_status: bool,
    pub fail_mutations: bool,
    pub fail_overview: bool,
    pub missing: bool,
    pub pages: u32,
    pub calls: Vec<String>,
}

impl Default for FakeCatalog {
    fn default() -> Self {
        Self {
            following: false,
            follower_count: 0,
            concurrent_followers: 0,
            entry: None,
            fail_status: false,
            fail_mutations: false,
            fail_overview: false,
            missing: false,
            pages: 20,
            calls: Vec::new(),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeCatalogApi {
    pub state: Mutex<FakeCatalog>,
    gates: Mutex<HashMap<u32, Arc<Notify>>>,
    mutation_gate: Mutex<Option<Arc<Notify>>>,
}

fn transport() -> CatalogError {
    CatalogError::Transport("connection reset by peer".into())
}

fn listing_page(query: &OverviewQuery, label: &str, pages: u32) -> ReleasePage {
    ReleasePage {
        releases: vec![ReleaseListing {
            id: ReleaseId(i64::from(query.page)),
            title: format!(
                "{label} page {} {} {}",
                query.page,
                query.sort_field.as_str(),
                query.sort_order.as_str()
            ),
            year: Some(1960),
            format: Some("LP".into()),
            label: None,
            thumb: None,
        }],
        pagination: PaginationMeta {
            page: query.page,
            pages,
            per_page: query.per_page,
            total: u64::from(pages) * u64::from(query.per_page),
        },
    }
}

impl FakeCatalogApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_state(state: FakeCatalog) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            gates: Mutex::new(HashMap::new()),
            mutation_gate: Mutex::new(None),
        })
    }

    /// Holds overview responses for `page` until the returned gate is notified.
    pub async fn hold_page(&self, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().await.insert(page, Arc::clone(&gate));
        gate
    }

    /// Holds the next mutation (follow, unfollow, save, remove) until notified.
    pub async fn hold_next_mutation(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.mutation_gate.lock().await = Some(Arc::clone(&gate));
        gate
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    async fn record(&self, call: String) {
        self.state.lock().await.calls.push(call);
    }

    async fn wait_for_mutation_gate(&self) {
        let gate = self.mutation_gate.lock().await.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    async fn wait_for_gate(&self, page: u32) {
        let gate = self.gates.lock().await.get(&page).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalogApi {
    async fn follow_status(&self, entity: EntityRef) -> Result<FollowStatusResponse, CatalogError> {
        self.record(format!("GET follow-status {entity}")).await;
        let state = self.state.lock().await;
        if state.fail_status {
            return Err(transport());
        }
        Ok(FollowStatusResponse {
            is_following: state.following,
            follower_count: state.follower_count,
        })
    }

    async fn follow(&self, entity: EntityRef) -> Result<(), CatalogError> {
        self.record(format!("POST follow {entity}")).await;
        self.wait_for_mutation_gate().await;
        let mut state = self.state.lock().await;
        if state.fail_mutations {
            return Err(transport());
        }
        if !state.following {
            state.following = true;
            state.follower_count += 1;
        }
        state.follower_count += state.concurrent_followers;
        Ok(())
    }

    async fn unfollow(&self, entity: EntityRef) -> Result<(), CatalogError> {
        self.record(format!("DELETE unfollow {entity}")).await;
        self.wait_for_mutation_gate().await;
        let mut state = self.state.lock().await;
        if state.fail_mutations {
            return Err(transport());
        }
        if state.following {
            state.following = false;
            state.follower_count = state.follower_count.saturating_sub(1);
        }
        Ok(())
    }

    async fn release_overview(
        &self,
        release_id: ReleaseId,
        _params: &ReleaseOverviewParams,
    ) -> Result<ReleaseOverview, CatalogError> {
        self.record(format!("GET release overview {release_id}")).await;
        let state = self.state.lock().await;
        if state.missing {
            return Err(CatalogError::NotFound);
        }
        if state.fail_overview {
            return Err(transport());
        }
        Ok(ReleaseOverview {
            release: ReleaseDetail {
                id: release_id,
                title: "Blue Train".into(),
                year: Some(1957),
                artists: vec!["John Coltrane".into()],
                formats: vec!["LP".into()],
                country: Some("US".into()),
            },
            stats: ReleaseStats {
                in_collection: 12,
                in_wantlist: 30,
                lowest_price: Some(41.5),
            },
            collection_entry: state.entry.clone(),
            community_rating: Some(CommunityRating {
                average: 4.6,
                count: 18,
            }),
            master_versions: None,
        })
    }

    async fn save_collection_entry(
        &self,
        release_id: ReleaseId,
        payload: &CollectionEntryPayload,
    ) -> Result<(), CatalogError> {
        self.record(format!("POST collection {release_id}")).await;
        self.wait_for_mutation_gate().await;
        let mut state = self.state.lock().await;
        if state.fail_mutations {
            return Err(transport());
        }
        // The server trims notes; clients only learn that by reloading.
        state.entry = Some(CollectionEntry {
            release_id,
            wishlist: payload.wishlist,
            notes: payload.notes.trim().to_string(),
            price_threshold: payload.price_threshold,
            rating: payload.rating,
        });
        Ok(())
    }

    async fn remove_collection_entry(&self, release_id: ReleaseId) -> Result<(), CatalogError> {
        self.record(format!("DELETE collection {release_id}")).await;
        self.wait_for_mutation_gate().await;
        let mut state = self.state.lock().await;
        if state.fail_mutations {
            return Err(transport());
        }
        state.entry = None;
        Ok(())
    }

    async fn artist_overview(
        &self,
        artist_id: ArtistId,
        query: &OverviewQuery,
    ) -> Result<ArtistOverview, CatalogError> {
        self.record(format!(
            "GET artist overview {artist_id} page={} sort={} {}",
            query.page,
            query.sort_field.as_str(),
            query.sort_order.as_str()
        ))
        .await;
        self.wait_for_gate(query.page).await;
        let state = self.state.lock().await;
        if state.missing {
            return Err(CatalogError::NotFound);
        }
        if state.fail_overview {
            return Err(transport());
        }
        Ok(ArtistOverview {
            artist: ArtistDetail {
                id: artist_id,
                name: "Art Blakey".into(),
                profile: None,
            },
            releases: listing_page(query, "artist", state.pages),
            stats: EntityStats {
                release_count: u64::from(state.pages),
                follower_count: state.follower_count,
            },
        })
    }

    async fn label_overview(
        &self,
        label_id: LabelId,
        query: &OverviewQuery,
    ) -> Result<LabelOverview, CatalogError> {
        self.record(format!("GET label overview {label_id} page={}", query.page))
            .await;
        self.wait_for_gate(query.page).await;
        let state = self.state.lock().await;
        if state.missing {
            return Err(CatalogError::NotFound);
        }
        if state.fail_overview {
            return Err(transport());
        }
        Ok(LabelOverview {
            label: LabelDetail {
                id: label_id,
                name: "Blue Note".into(),
                profile: None,
            },
            releases: listing_page(query, "label", state.pages),
            stats: EntityStats::default(),
        })
    }
}

pub(crate) struct Harness {
    pub fake: Arc<FakeCatalogApi>,
    pub api: Arc<dyn CatalogApi>,
    pub session: Arc<dyn ViewerSession>,
    pub feedback: FeedbackChannel,
    pub scope: ViewScope,
}

impl Harness {
    pub fn new(fake: Arc<FakeCatalogApi>, authenticated: bool) -> Self {
        let session: Arc<dyn ViewerSession> = if authenticated {
            Arc::new(StaticSession::with_token("viewer-token"))
        } else {
            Arc::new(StaticSession::anonymous())
        };
        let api: Arc<dyn CatalogApi> = fake.clone();
        Self {
            fake,
            api,
            session,
            feedback: FeedbackChannel::new(),
            scope: ViewScope::new(),
        }
    }
}
