use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ArtistId);
id_newtype!(LabelId);
id_newtype!(ReleaseId);
id_newtype!(EntityId);

/// Kinds of catalog entity a viewer can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Artist,
    Label,
}

impl EntityKind {
    /// Path segment used by the follow endpoints (`/api/{segment}/{id}/...`).
    pub fn path_segment(self) -> &'static str {
        match self {
            EntityKind::Artist => "artist",
            EntityKind::Label => "label",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn artist(id: ArtistId) -> Self {
        Self {
            kind: EntityKind::Artist,
            id: EntityId(id.0),
        }
    }

    pub fn label(id: LabelId) -> Self {
        Self {
            kind: EntityKind::Label,
            id: EntityId(id.0),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Year,
    Title,
    Format,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Year => "year",
            SortField::Title => "title",
            SortField::Format => "format",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "year" => Ok(SortField::Year),
            "title" => Ok(SortField::Title),
            "format" => Ok(SortField::Format),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// A star rating constrained to `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value).ok_or_else(|| format!("rating out of range: {value}"))
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_rejects_values_outside_one_to_five() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(6).is_none());
        assert_eq!(Rating::new(5).map(Rating::get), Some(5));
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn follow_paths_use_singular_entity_segment() {
        let entity = EntityRef::label(LabelId(42));
        assert_eq!(entity.kind.path_segment(), "label");
        assert_eq!(entity.to_string(), "label 42");
    }

    #[test]
    fn sort_field_parses_case_insensitively() {
        assert_eq!("Title".parse::<SortField>(), Ok(SortField::Title));
        assert!("genre".parse::<SortField>().is_err());
    }
}
