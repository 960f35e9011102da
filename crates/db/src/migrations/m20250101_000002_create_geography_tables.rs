//! Create country and state tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Country::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Country::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Country::Code).string_len(3).not_null())
                    .col(ColumnDef::new(Country::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Country::Lat).decimal_len(9, 6).not_null())
                    .col(ColumnDef::new(Country::Lon).decimal_len(9, 6).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_country_name")
                    .table(Country::Table)
                    .col(Country::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(State::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(State::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(State::Name).string_len(255).not_null())
                    .col(ColumnDef::new(State::Lat).decimal_len(9, 6).not_null())
                    .col(ColumnDef::new(State::Lon).decimal_len(9, 6).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_state_name")
                    .table(State::Table)
                    .col(State::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(State::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Country::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Country {
    Table,
    Id,
    Code,
    Name,
    Lat,
    Lon,
}

#[derive(Iden)]
enum State {
    Table,
    Id,
    Name,
    Lat,
    Lon,
}
