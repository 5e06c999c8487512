use serde::{Deserialize, Serialize};

use crate::domain::{ArtistId, LabelId, Rating, ReleaseId};

/// `GET /api/{entity}/{id}/follow-status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FollowStatusResponse {
    pub is_following: bool,
    pub follower_count: u64,
}

/// The viewer's relationship to a release. `wishlist == true` means wantlist,
/// otherwise the release is in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    #[serde(alias = "release_id")]
    pub release_id: ReleaseId,
    #[serde(default)]
    pub wishlist: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default, alias = "price_threshold")]
    pub price_threshold: Option<f64>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

/// Upsert body for `POST /api/releases/{id}/collection`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntryPayload {
    pub wishlist: bool,
    pub notes: String,
    pub price_threshold: Option<f64>,
    pub rating: Option<Rating>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub pages: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default, alias = "items")]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseListing {
    pub id: ReleaseId,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasePage {
    #[serde(default)]
    pub releases: Vec<ReleaseListing>,
    #[serde(default)]
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDetail {
    pub id: ReleaseId,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub formats: Vec<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReleaseStats {
    #[serde(default)]
    pub in_collection: u64,
    #[serde(default)]
    pub in_wantlist: u64,
    #[serde(default)]
    pub lowest_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CommunityRating {
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub count: u64,
}

/// `GET /api/releases/{id}/overview`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOverview {
    pub release: ReleaseDetail,
    #[serde(default)]
    pub stats: ReleaseStats,
    #[serde(default)]
    pub collection_entry: Option<CollectionEntry>,
    #[serde(default)]
    pub community_rating: Option<CommunityRating>,
    #[serde(default)]
    pub master_versions: Option<ReleasePage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistDetail {
    pub id: ArtistId,
    pub name: String,
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDetail {
    pub id: LabelId,
    pub name: String,
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityStats {
    #[serde(default)]
    pub release_count: u64,
    #[serde(default)]
    pub follower_count: u64,
}

/// `GET /api/artists/{id}/overview`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistOverview {
    pub artist: ArtistDetail,
    pub releases: ReleasePage,
    #[serde(default)]
    pub stats: EntityStats,
}

/// `GET /api/labels/{id}/overview`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelOverview {
    pub label: LabelDetail,
    pub releases: ReleasePage,
    #[serde(default)]
    pub stats: EntityStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_overview_decodes_null_collection_entry() {
        let raw = r#"{
            "release": {"id": 9, "title": "Blue Train"},
            "stats": {"in_collection": 4},
            "collectionEntry": null,
            "communityRating": {"average": 4.5, "count": 2},
            "masterVersions": null
        }"#;
        let overview: ReleaseOverview = serde_json::from_str(raw).expect("decode");
        assert_eq!(overview.release.id, ReleaseId(9));
        assert!(overview.collection_entry.is_none());
        assert_eq!(overview.stats.in_collection, 4);
    }

    #[test]
    fn collection_payload_serializes_camel_case_with_nulls() {
        let payload = CollectionEntryPayload {
            wishlist: true,
            notes: "VG+ sleeve".into(),
            price_threshold: None,
            rating: Rating::new(4),
        };
        let value = serde_json::to_value(&payload).expect("encode");
        assert_eq!(
            value,
            serde_json::json!({
                "wishlist": true,
                "notes": "VG+ sleeve",
                "priceThreshold": null,
                "rating": 4
            })
        );
    }
}
