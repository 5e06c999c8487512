use std::{collections::HashSet, hash::Hash};

use catalog_shared::protocol::{ArtistDetail, LabelDetail, ReleaseListing};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn copyright_notice(clock: &dyn Clock, holder: &str) -> String {
    format!("© {} {holder}", clock.today().year())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStyle {
    Resting,
    Hovered,
}

impl ItemStyle {
    pub fn class(self) -> &'static str {
        match self {
            ItemStyle::Resting => "card",
            ItemStyle::Hovered => "card card--hovered",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoverState<K> {
    hovered: HashSet<K>,
}

impl<K> Default for HoverState<K> {
    fn default() -> Self {
        Self {
            hovered: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash> HoverState<K> {
    pub fn enter(&mut self, id: K) {
        self.hovered.insert(id);
    }

    pub fn leave(&mut self, id: &K) {
        self.hovered.remove(id);
    }

    pub fn is_hovered(&self, id: &K) -> bool {
        self.hovered.contains(id)
    }

    pub fn style_for(&self, id: &K) -> ItemStyle {
        if self.is_hovered(id) {
            ItemStyle::Hovered
        } else {
            ItemStyle::Resting
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchHit {
    Release(ReleaseListing),
    Artist(ArtistDetail),
    Label(LabelDetail),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHit {
    pub title: String,
    pub subtitle: String,
    pub href: String,
}

impl SearchHit {
    pub fn render(&self) -> RenderedHit {
        match self {
            SearchHit::Release(release) => render_release(release),
            SearchHit::Artist(artist) => render_artist(artist),
            SearchHit::Label(label) => render_label(label),
        }
    }
}

fn render_release(release: &ReleaseListing) -> RenderedHit {
    let mut details = Vec::new();
    if let Some(year) = release.year {
        details.push(year.to_string());
    }
    if let Some(format) = &release.format {
        details.push(format.clone());
    }
    if let Some(label) = &release.label {
        details.push(label.clone());
    }
    RenderedHit {
        title: release.title.clone(),
        subtitle: details.join(" · "),
        href: format!("/releases/{}", release.id),
    }
}

fn render_artist(artist: &ArtistDetail) -> RenderedHit {
    RenderedHit {
        title: artist.name.clone(),
        subtitle: "Artist".into(),
        href: format!("/artists/{}", artist.id),
    }
}

fn render_label(label: &LabelDetail) -> RenderedHit {
    RenderedHit {
        title: label.name.clone(),
        subtitle: "Label".into(),
        href: format!("/labels/{}", label.id),
    }
}

#[cfg(test)]
mod tests {
    use catalog_shared::domain::{ArtistId, ReleaseId};

    use super::*;

    #[test]
    fn copyright_year_comes_from_the_clock() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(1999, 6, 1).expect("date"));
        assert_eq!(copyright_notice(&clock, "Crate"), "© 1999 Crate");
    }

    #[test]
    fn hover_state_drives_item_style() {
        let mut hover = HoverState::default();
        hover.enter(3_i64);
        assert_eq!(hover.style_for(&3), ItemStyle::Hovered);
        assert_eq!(hover.style_for(&4).class(), "card");
        hover.leave(&3);
        assert_eq!(hover.style_for(&3), ItemStyle::Resting);
    }

    #[test]
    fn search_hits_dispatch_on_type_tag() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"type":"release","id":5,"title":"Kind of Blue","year":1959,"format":"LP"}"#,
        )
        .expect("decode");
        assert_eq!(
            hit.render(),
            RenderedHit {
                title: "Kind of Blue".into(),
                subtitle: "1959 · LP".into(),
                href: format!("/releases/{}", ReleaseId(5)),
            }
        );

        let artist = SearchHit::Artist(ArtistDetail {
            id: ArtistId(8),
            name: "Sun Ra".into(),
            profile: None,
        });
        assert_eq!(artist.render().href, "/artists/8");
    }
}
