//! Trip entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trip")]
pub struct Model {
    /// Random, so a trip link cannot be guessed from another.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub created_at: DateTimeWithTimeZone,

    /// Owner; cleared when the member is deleted.
    #[sea_orm(nullable, indexed)]
    pub member_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
    #[sea_orm(has_many = "super::trip_place::Entity")]
    TripPlaces,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::trip_place::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TripPlaces.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
