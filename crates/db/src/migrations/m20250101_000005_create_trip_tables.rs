//! Create trip and trip_place tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trip::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Trip::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Trip::MemberId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_member")
                            .from(Trip::Table, Trip::MemberId)
                            .to(Member::Table, Member::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_member_id")
                    .table(Trip::Table)
                    .col(Trip::MemberId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TripPlace::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TripPlace::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TripPlace::TripId).uuid().not_null())
                    .col(ColumnDef::new(TripPlace::PlaceId).integer().not_null())
                    .col(ColumnDef::new(TripPlace::Date).date())
                    .col(ColumnDef::new(TripPlace::Duration).decimal_len(9, 2).not_null())
                    .col(
                        ColumnDef::new(TripPlace::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(TripPlace::Duration).gt(Expr::cust("0.1")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_place_trip")
                            .from(TripPlace::Table, TripPlace::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_place_place")
                            .from(TripPlace::Table, TripPlace::PlaceId)
                            .to(Place::Table, Place::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (trip, place, date); an undated visit counts as a date too
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_trip_place_trip_place_date
                ON trip_place (trip_id, place_id, date) NULLS NOT DISTINCT
                ",
            )
            .await?;

        // Backs the (place, date) availability check
        manager
            .create_index(
                Index::create()
                    .name("idx_trip_place_place_date")
                    .table(TripPlace::Table)
                    .col(TripPlace::PlaceId)
                    .col(TripPlace::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TripPlace::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Trip::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Trip {
    Table,
    Id,
    CreatedAt,
    MemberId,
}

#[derive(Iden)]
enum TripPlace {
    Table,
    Id,
    TripId,
    PlaceId,
    Date,
    Duration,
    CreatedAt,
}

#[derive(Iden)]
enum Member {
    Table,
    Id,
}

#[derive(Iden)]
enum Place {
    Table,
    Id,
}
