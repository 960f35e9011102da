//! Transit entity: a way of getting to places.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a transit stop is served.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")]
pub enum TransitMode {
    #[sea_orm(string_value = "C")]
    #[serde(rename = "C")]
    Car,
    #[sea_orm(string_value = "CB")]
    #[serde(rename = "CB")]
    CommercialBus,
    #[sea_orm(string_value = "PB")]
    #[serde(rename = "PB")]
    PublicBus,
    #[sea_orm(string_value = "IT")]
    #[serde(rename = "IT")]
    IntercityTrain,
    #[sea_orm(string_value = "CT")]
    #[serde(rename = "CT")]
    CityTrain,
    #[sea_orm(string_value = "F")]
    #[serde(rename = "F")]
    Flight,
    #[sea_orm(string_value = "W")]
    #[serde(rename = "W")]
    #[default]
    Walk,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transit")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(column_type = "Decimal(Some((9, 6)))")]
    pub lat: Decimal,

    #[sea_orm(column_type = "Decimal(Some((9, 6)))")]
    pub long: Decimal,

    pub mode: TransitMode,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::place_transit::Entity")]
    PlaceTransits,
}

impl Related<super::place::Entity> for Entity {
    fn to() -> RelationDef {
        super::place_transit::Relation::Place.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::place_transit::Relation::Transit.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
