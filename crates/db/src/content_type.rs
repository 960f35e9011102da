//! Discriminator for generic (type + id) associations.
//!
//! Tags and likes point at rows of several tables through a
//! `(content_type, object_id)` pair instead of one join table per target.
//! The set of targets is closed and known at compile time, so the
//! discriminator is an enum stored as a short string: a type always yields
//! the same value, and a stored value always maps back to exactly one type.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entities::{country, place, state, transit};

/// Entity types that tags and likes may point at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[sea_orm(string_value = "place")]
    Place,
    #[sea_orm(string_value = "country")]
    Country,
    #[sea_orm(string_value = "state")]
    State,
    #[sea_orm(string_value = "transit")]
    Transit,
}

impl ContentType {
    /// Discriminator of an entity type.
    #[must_use]
    pub const fn of<E: Discriminated>() -> Self {
        E::CONTENT_TYPE
    }

    /// Stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Place => "place",
            Self::Country => "country",
            Self::State => "state",
            Self::Transit => "transit",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a discriminator value no entity type owns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "place" => Ok(Self::Place),
            "country" => Ok(Self::Country),
            "state" => Ok(Self::State),
            "transit" => Ok(Self::Transit),
            other => Err(UnknownContentType(other.to_string())),
        }
    }
}

/// An entity that generic associations may target.
pub trait Discriminated: EntityTrait {
    /// Discriminator stored alongside the target id.
    const CONTENT_TYPE: ContentType;
}

impl Discriminated for place::Entity {
    const CONTENT_TYPE: ContentType = ContentType::Place;
}

impl Discriminated for country::Entity {
    const CONTENT_TYPE: ContentType = ContentType::Country;
}

impl Discriminated for state::Entity {
    const CONTENT_TYPE: ContentType = ContentType::State;
}

impl Discriminated for transit::Entity {
    const CONTENT_TYPE: ContentType = ContentType::Transit;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use sea_orm::{ActiveEnum, Iterable};

    use super::*;

    #[test]
    fn test_every_type_round_trips() {
        for content_type in ContentType::iter() {
            let parsed: ContentType = content_type.as_str().parse().unwrap();
            assert_eq!(parsed, content_type);
            assert_eq!(content_type.to_value(), content_type.as_str());
            assert_eq!(
                ContentType::try_from_value(&content_type.to_value()).unwrap(),
                content_type
            );
        }
    }

    #[test]
    fn test_values_are_distinct() {
        let values: HashSet<&str> = ContentType::iter().map(ContentType::as_str).collect();
        assert_eq!(values.len(), ContentType::iter().count());
    }

    #[test]
    fn test_entity_mapping_is_stable() {
        assert_eq!(ContentType::of::<place::Entity>(), ContentType::Place);
        assert_eq!(ContentType::of::<country::Entity>(), ContentType::Country);
        assert_eq!(ContentType::of::<state::Entity>(), ContentType::State);
        assert_eq!(ContentType::of::<transit::Entity>(), ContentType::Transit);
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        assert_eq!(
            "trip".parse::<ContentType>(),
            Err(UnknownContentType("trip".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&ContentType::Place).unwrap(), "\"place\"");
        let parsed: ContentType = serde_json::from_str("\"state\"").unwrap();
        assert_eq!(parsed, ContentType::State);
    }
}
