//! Create place, transit, place_transit and address tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Place::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Place::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Place::Name).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(Place::Description).text())
                    .col(ColumnDef::new(Place::Lat).decimal_len(9, 6).not_null())
                    .col(ColumnDef::new(Place::Lon).decimal_len(9, 6).not_null())
                    .col(
                        ColumnDef::new(Place::Rating)
                            .decimal_len(4, 2)
                            .not_null()
                            .default(5),
                    )
                    .col(ColumnDef::new(Place::Status).string_len(1).not_null().default("A"))
                    .col(ColumnDef::new(Place::Slug).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Place::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Place::StatusChangeAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Place::LastUpdate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Place::Rating).between(1, 5))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_place_slug")
                    .table(Place::Table)
                    .col(Place::Slug)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_place_rating")
                    .table(Place::Table)
                    .col(Place::Rating)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transit::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transit::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Transit::Lat).decimal_len(9, 6).not_null())
                    .col(ColumnDef::new(Transit::Long).decimal_len(9, 6).not_null())
                    .col(ColumnDef::new(Transit::Mode).string_len(2).not_null().default("W"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlaceTransit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlaceTransit::PlaceId).integer().not_null())
                    .col(ColumnDef::new(PlaceTransit::TransitId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(PlaceTransit::PlaceId)
                            .col(PlaceTransit::TransitId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_transit_place")
                            .from(PlaceTransit::Table, PlaceTransit::PlaceId)
                            .to(Place::Table, Place::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_transit_transit")
                            .from(PlaceTransit::Table, PlaceTransit::TransitId)
                            .to(Transit::Table, Transit::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Address::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Address::PlaceId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Address::Street).string_len(255))
                    .col(ColumnDef::new(Address::City).string_len(255))
                    .col(ColumnDef::new(Address::Postcode).string_len(255))
                    .col(ColumnDef::new(Address::StateId).integer())
                    .col(ColumnDef::new(Address::CountryId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_address_place")
                            .from(Address::Table, Address::PlaceId)
                            .to(Place::Table, Place::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Geography rows stay while any address points at them
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_address_state")
                            .from(Address::Table, Address::StateId)
                            .to(State::Table, State::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_address_country")
                            .from(Address::Table, Address::CountryId)
                            .to(Country::Table, Country::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_address_state_id")
                    .table(Address::Table)
                    .col(Address::StateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_address_country_id")
                    .table(Address::Table)
                    .col(Address::CountryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Address::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PlaceTransit::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Transit::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Place::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Place {
    Table,
    Id,
    Name,
    Description,
    Lat,
    Lon,
    Rating,
    Status,
    Slug,
    CreatedAt,
    StatusChangeAt,
    LastUpdate,
}

#[derive(Iden)]
enum Transit {
    Table,
    Id,
    Name,
    Lat,
    Long,
    Mode,
}

#[derive(Iden)]
enum PlaceTransit {
    Table,
    PlaceId,
    TransitId,
}

#[derive(Iden)]
enum Address {
    Table,
    PlaceId,
    Street,
    City,
    Postcode,
    StateId,
    CountryId,
}

#[derive(Iden)]
enum State {
    Table,
    Id,
}

#[derive(Iden)]
enum Country {
    Table,
    Id,
}
