//! Visitor entity: a member's review of a place.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Why the reviewer visited.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum VisitType {
    #[sea_orm(string_value = "L")]
    #[serde(rename = "L")]
    Local,
    #[sea_orm(string_value = "H")]
    #[serde(rename = "H")]
    #[default]
    Holiday,
    #[sea_orm(string_value = "B")]
    #[serde(rename = "B")]
    Business,
    #[sea_orm(string_value = "E")]
    #[serde(rename = "E")]
    Expert,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visitor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Author; cleared when the member is deleted, the review stays.
    #[sea_orm(nullable, indexed)]
    pub member_id: Option<i32>,

    #[sea_orm(column_type = "Decimal(Some((4, 2)))")]
    pub rating: Decimal,

    #[sea_orm(column_type = "Text")]
    pub review: String,

    pub visit_type: VisitType,

    #[sea_orm(indexed)]
    pub place_id: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
    #[sea_orm(
        belongs_to = "super::place::Entity",
        from = "Column::PlaceId",
        to = "super::place::Column::Id"
    )]
    Place,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::place::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Place.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
