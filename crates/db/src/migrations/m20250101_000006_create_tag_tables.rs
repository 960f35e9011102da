//! Create tag, tagged_item and liked_item tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tag::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tag::Label).string_len(255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaggedItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaggedItem::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaggedItem::TagId).integer().not_null())
                    .col(ColumnDef::new(TaggedItem::ContentType).string_len(32).not_null())
                    .col(ColumnDef::new(TaggedItem::ObjectId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tagged_item_tag")
                            .from(TaggedItem::Table, TaggedItem::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tagged_item_tag_target")
                    .table(TaggedItem::Table)
                    .col(TaggedItem::TagId)
                    .col(TaggedItem::ContentType)
                    .col(TaggedItem::ObjectId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tagged_item_target")
                    .table(TaggedItem::Table)
                    .col(TaggedItem::ContentType)
                    .col(TaggedItem::ObjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LikedItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LikedItem::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LikedItem::MemberId).integer().not_null())
                    .col(ColumnDef::new(LikedItem::ContentType).string_len(32).not_null())
                    .col(ColumnDef::new(LikedItem::ObjectId).integer().not_null())
                    .col(
                        ColumnDef::new(LikedItem::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_liked_item_member")
                            .from(LikedItem::Table, LikedItem::MemberId)
                            .to(Member::Table, Member::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_liked_item_member_target")
                    .table(LikedItem::Table)
                    .col(LikedItem::MemberId)
                    .col(LikedItem::ContentType)
                    .col(LikedItem::ObjectId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_liked_item_target")
                    .table(LikedItem::Table)
                    .col(LikedItem::ContentType)
                    .col(LikedItem::ObjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LikedItem::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TaggedItem::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
    Label,
}

#[derive(Iden)]
enum TaggedItem {
    Table,
    Id,
    TagId,
    ContentType,
    ObjectId,
}

#[derive(Iden)]
enum LikedItem {
    Table,
    Id,
    MemberId,
    ContentType,
    ObjectId,
    CreatedAt,
}

#[derive(Iden)]
enum Member {
    Table,
    Id,
}
