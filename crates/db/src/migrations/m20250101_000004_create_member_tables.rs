//! Create member and visitor tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Member::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Member::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Member::UserId).integer().not_null().unique_key())
                    .col(ColumnDef::new(Member::BirthDate).date())
                    .col(
                        ColumnDef::new(Member::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_user")
                            .from(Member::Table, Member::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Visitor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Visitor::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Visitor::MemberId).integer())
                    .col(ColumnDef::new(Visitor::Rating).decimal_len(4, 2).not_null())
                    .col(ColumnDef::new(Visitor::Review).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Visitor::VisitType)
                            .string_len(1)
                            .not_null()
                            .default("H"),
                    )
                    .col(ColumnDef::new(Visitor::PlaceId).integer().not_null())
                    .col(
                        ColumnDef::new(Visitor::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Visitor::Rating).between(1, 5))
                    // Reviews outlive their author
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_visitor_member")
                            .from(Visitor::Table, Visitor::MemberId)
                            .to(Member::Table, Member::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_visitor_place")
                            .from(Visitor::Table, Visitor::PlaceId)
                            .to(Place::Table, Place::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_visitor_place_id")
                    .table(Visitor::Table)
                    .col(Visitor::PlaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_visitor_member_id")
                    .table(Visitor::Table)
                    .col(Visitor::MemberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Visitor::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Member::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Member {
    Table,
    Id,
    UserId,
    BirthDate,
    JoinedAt,
}

#[derive(Iden)]
enum Visitor {
    Table,
    Id,
    MemberId,
    Rating,
    Review,
    VisitType,
    PlaceId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Place {
    Table,
    Id,
}
