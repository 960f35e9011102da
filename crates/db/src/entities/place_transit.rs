//! Place <-> transit link table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "place_transit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub place_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub transit_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::place::Entity",
        from = "Column::PlaceId",
        to = "super::place::Column::Id"
    )]
    Place,
    #[sea_orm(
        belongs_to = "super::transit::Entity",
        from = "Column::TransitId",
        to = "super::transit::Column::Id"
    )]
    Transit,
}

impl Related<super::place::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Place.def()
    }
}

impl Related<super::transit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, JoinType, QuerySelect, QueryTrait, RelationTrait};

    use super::*;
    use crate::entities::{place, transit};

    #[test]
    fn test_link_table_joins_both_sides() {
        let sql = place::Entity::find()
            .join(JoinType::InnerJoin, place::Relation::PlaceTransits.def())
            .join(JoinType::InnerJoin, Relation::Transit.def())
            .build(DatabaseBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#"INNER JOIN "place_transit" ON "place"."id" = "place_transit"."place_id""#));
        assert!(sql.contains(r#"INNER JOIN "transit" ON "place_transit"."transit_id" = "transit"."id""#));

        let reverse = transit::Entity::find()
            .find_with_related(place::Entity)
            .build(DatabaseBackend::Postgres)
            .to_string();
        assert!(reverse.contains(r#""place_transit""#));
    }
}
