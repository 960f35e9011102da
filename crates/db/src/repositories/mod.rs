//! Repositories wrapping entity queries.

mod address;
mod geography;
mod like;
mod member;
mod place;
mod tag;
mod transit;
mod trip;
mod trip_place;
mod user;
mod visitor;

pub use address::AddressRepository;
pub use geography::{CountryRepository, StateRepository};
pub use like::LikeRepository;
pub use member::MemberRepository;
pub use place::{AddressChange, PlaceFilter, PlaceOrdering, PlaceRepository};
pub use tag::TagRepository;
pub use transit::TransitRepository;
pub use trip::TripRepository;
pub use trip_place::{TripPlaceRepository, Upserted};
pub use user::UserRepository;
pub use visitor::VisitorRepository;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, SqlErr,
};
use wayfarer_common::AppError;

use crate::content_type::ContentType;
use crate::entities::{
    Country, LikedItem, Place, State, TaggedItem, Transit, liked_item, tagged_item,
};

/// Map an insert/update failure, surfacing constraint violations as client errors.
pub(crate) fn write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => AppError::Conflict(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => AppError::BadRequest(msg),
        _ => AppError::Database(err.to_string()),
    }
}

/// Map a delete failure; a restricting foreign key means the row is still referenced.
pub(crate) fn delete_error(err: DbErr, what: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::Protected(format!("{what} is still referenced and cannot be deleted"))
        }
        _ => AppError::Database(err.to_string()),
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Escape `LIKE` wildcards in user input.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Whether the row a generic association points at exists.
pub(crate) async fn target_exists<C: ConnectionTrait>(
    db: &C,
    content_type: ContentType,
    object_id: i32,
) -> Result<bool, DbErr> {
    let count = match content_type {
        ContentType::Place => Place::find_by_id(object_id).count(db).await?,
        ContentType::Country => Country::find_by_id(object_id).count(db).await?,
        ContentType::State => State::find_by_id(object_id).count(db).await?,
        ContentType::Transit => Transit::find_by_id(object_id).count(db).await?,
    };
    Ok(count > 0)
}

/// Remove the tags and likes attached to a row about to be deleted.
pub(crate) async fn detach_all<C: ConnectionTrait>(
    db: &C,
    content_type: ContentType,
    object_id: i32,
) -> Result<(), DbErr> {
    TaggedItem::delete_many()
        .filter(tagged_item::Column::ContentType.eq(content_type))
        .filter(tagged_item::Column::ObjectId.eq(object_id))
        .exec(db)
        .await?;
    LikedItem::delete_many()
        .filter(liked_item::Column::ContentType.eq(content_type))
        .filter(liked_item::Column::ObjectId.eq(object_id))
        .exec(db)
        .await?;
    Ok(())
}
