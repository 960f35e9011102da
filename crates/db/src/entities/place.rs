//! Place entity.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication status of a place.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum PlaceStatus {
    #[sea_orm(string_value = "A")]
    #[serde(rename = "A")]
    #[default]
    Active,
    #[sea_orm(string_value = "I")]
    #[serde(rename = "I")]
    Inactive,
}

/// Coarse rating bucket shown next to a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingBand {
    /// Below 3
    Bad,
    /// From 3, below 4
    Average,
    /// From 4, below 5
    Good,
    /// Exactly 5
    Perfect,
}

impl RatingBand {
    /// Band a rating falls into.
    #[must_use]
    pub fn of(rating: Decimal) -> Self {
        if rating < Decimal::from(3) {
            Self::Bad
        } else if rating < Decimal::from(4) {
            Self::Average
        } else if rating < Decimal::from(5) {
            Self::Good
        } else {
            Self::Perfect
        }
    }

    /// Inclusive lower and exclusive upper rating bound.
    #[must_use]
    pub fn bounds(self) -> (Option<Decimal>, Option<Decimal>) {
        match self {
            Self::Bad => (None, Some(Decimal::from(3))),
            Self::Average => (Some(Decimal::from(3)), Some(Decimal::from(4))),
            Self::Good => (Some(Decimal::from(4)), Some(Decimal::from(5))),
            Self::Perfect => (Some(Decimal::from(5)), None),
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bad => "Bad",
            Self::Average => "Average",
            Self::Good => "Good",
            Self::Perfect => "Perfect",
        }
    }
}

impl std::str::FromStr for RatingBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bad" => Ok(Self::Bad),
            "average" => Ok(Self::Average),
            "good" => Ok(Self::Good),
            "perfect" => Ok(Self::Perfect),
            other => Err(format!("unknown rating band: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "place")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((9, 6)))")]
    pub lat: Decimal,

    #[sea_orm(column_type = "Decimal(Some((9, 6)))")]
    pub lon: Decimal,

    /// 1.00 to 5.00
    #[sea_orm(column_type = "Decimal(Some((4, 2)))")]
    pub rating: Decimal,

    pub status: PlaceStatus,

    #[sea_orm(indexed)]
    pub slug: String,

    pub created_at: DateTimeWithTimeZone,

    /// Touched on every save.
    pub status_change_at: DateTimeWithTimeZone,

    /// Touched on every save.
    pub last_update: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::address::Entity")]
    Address,
    #[sea_orm(has_many = "super::visitor::Entity")]
    Visitors,
    #[sea_orm(has_many = "super::trip_place::Entity")]
    TripPlaces,
    #[sea_orm(has_many = "super::place_transit::Entity")]
    PlaceTransits,
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<super::visitor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visitors.def()
    }
}

impl Related<super::trip_place::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TripPlaces.def()
    }
}

impl Related<super::transit::Entity> for Entity {
    fn to() -> RelationDef {
        super::place_transit::Relation::Transit.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::place_transit::Relation::Place.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now: DateTimeWithTimeZone = Utc::now().into();
        if insert && self.created_at.is_not_set() {
            self.created_at = Set(now);
        }
        self.status_change_at = Set(now);
        self.last_update = Set(now);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_band_edges() {
        assert_eq!(RatingBand::of(Decimal::new(299, 2)), RatingBand::Bad);
        assert_eq!(RatingBand::of(Decimal::from(3)), RatingBand::Average);
        assert_eq!(RatingBand::of(Decimal::new(399, 2)), RatingBand::Average);
        assert_eq!(RatingBand::of(Decimal::from(4)), RatingBand::Good);
        assert_eq!(RatingBand::of(Decimal::new(499, 2)), RatingBand::Good);
        assert_eq!(RatingBand::of(Decimal::new(500, 2)), RatingBand::Perfect);
    }

    #[test]
    fn test_rating_band_parse() {
        assert_eq!("Good".parse::<RatingBand>(), Ok(RatingBand::Good));
        assert!("great".parse::<RatingBand>().is_err());
    }
}
