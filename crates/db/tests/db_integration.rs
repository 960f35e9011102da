//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` (15 or newer) instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `wayfarer_test`)
//!   `TEST_DB_PASSWORD` (default: `wayfarer_test`)
//!   `TEST_DB_NAME` (default: `wayfarer_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait};
use uuid::Uuid;
use wayfarer_common::AppError;
use wayfarer_db::ContentType;
use wayfarer_db::entities::{
    Address, TripPlace, Visitor, address, member, place, state, trip, user, visitor,
};
use wayfarer_db::repositories::{
    MemberRepository, PlaceRepository, StateRepository, TagRepository, TripPlaceRepository,
    TripRepository, Upserted,
};
use wayfarer_db::test_utils::{TestDatabase, TestDbConfig};

async fn insert_place(db: &DatabaseConnection, name: &str) -> place::Model {
    place::ActiveModel {
        name: Set(name.to_string()),
        lat: Set(Decimal::new(5_438_918, 6)),
        lon: Set(Decimal::new(100_180_263, 6)),
        rating: Set(Decimal::from(3)),
        status: Set(place::PlaceStatus::Active),
        slug: Set(name.to_lowercase().replace(' ', "-")),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

async fn insert_trip(db: &DatabaseConnection, member_id: Option<i32>) -> trip::Model {
    trip::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Utc::now().into()),
        member_id: Set(member_id),
    }
    .insert(db)
    .await
    .unwrap()
}

async fn insert_member(db: &DatabaseConnection, username: &str) -> member::Model {
    let user = user::ActiveModel {
        username: Set(username.to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        email: Set(format!("{username}@example.com")),
        token: Set(None),
        is_staff: Set(false),
        is_superuser: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    member::ActiveModel {
        user_id: Set(user.id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

async fn insert_state(db: &DatabaseConnection, id: Option<i32>, name: &str) -> state::Model {
    let mut model = state::ActiveModel {
        name: Set(name.to_string()),
        lat: Set(Decimal::new(6_120_000, 6)),
        lon: Set(Decimal::new(100_370_000, 6)),
        ..Default::default()
    };
    if let Some(id) = id {
        model.id = Set(id);
    }
    model.insert(db).await.unwrap()
}

fn new_year() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 1, 1)
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_repeated_itinerary_create_merges_duration() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let conn = test_db.shared();

    let place = insert_place(&conn, "Pasir Buaya").await;
    let trip = insert_trip(&conn, None).await;
    let repo = TripPlaceRepository::new(conn.clone());

    let first = repo
        .upsert(trip.id, place.id, new_year(), Decimal::new(25, 1))
        .await
        .unwrap();
    assert!(matches!(first, Upserted::Created(_)));

    let second = repo
        .upsert(trip.id, place.id, new_year(), Decimal::new(30, 1))
        .await
        .unwrap();
    let Upserted::Merged(merged) = second else {
        panic!("expected merge, got {second:?}");
    };
    assert_eq!(merged.duration, Decimal::new(30, 1));

    let rows = repo.list_by_trip(trip.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].duration, Decimal::new(30, 1));

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_place_date_taken_across_trips() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let conn = test_db.shared();

    let place = insert_place(&conn, "Bukit Bendera").await;
    let first_trip = insert_trip(&conn, None).await;
    let second_trip = insert_trip(&conn, None).await;
    let repo = TripPlaceRepository::new(conn.clone());

    repo.upsert(first_trip.id, place.id, new_year(), Decimal::ONE)
        .await
        .unwrap();
    let outcome = repo
        .upsert(second_trip.id, place.id, new_year(), Decimal::ONE)
        .await
        .unwrap();

    assert_eq!(outcome, Upserted::PlaceDateTaken);
    assert!(repo.list_by_trip(second_trip.id).await.unwrap().is_empty());

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_undated_visits_are_unique_per_trip_and_place() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let conn = test_db.shared();

    let place = insert_place(&conn, "Tasik Kenyir").await;
    let trip = insert_trip(&conn, None).await;
    let repo = TripPlaceRepository::new(conn.clone());

    repo.upsert(trip.id, place.id, None, Decimal::ONE).await.unwrap();
    let outcome = repo
        .upsert(trip.id, place.id, None, Decimal::TWO)
        .await
        .unwrap();
    assert!(matches!(outcome, Upserted::Merged(_)));

    let duplicate = wayfarer_db::entities::trip_place::ActiveModel {
        trip_id: Set(trip.id),
        place_id: Set(place.id),
        date: Set(None),
        duration: Set(Decimal::ONE),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(conn.as_ref())
    .await;
    assert!(duplicate.is_err(), "unique index must treat NULL dates as equal");

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_referenced_state_cannot_be_deleted() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let conn = test_db.shared();

    let place = insert_place(&conn, "Pantai Merdeka").await;
    let used = insert_state(&conn, None, "Kedah").await;
    let unused = insert_state(&conn, None, "Perlis").await;
    address::ActiveModel {
        place_id: Set(place.id),
        street: Set(None),
        city: Set(Some("Yan".to_string())),
        postcode: Set(None),
        state_id: Set(Some(used.id)),
        country_id: Set(None),
    }
    .insert(conn.as_ref())
    .await
    .unwrap();

    let repo = StateRepository::new(conn.clone());
    assert!(matches!(repo.delete(used.id).await, Err(AppError::Protected(_))));
    assert!(repo.delete(unused.id).await.unwrap());
    assert!(repo.find_by_id(used.id).await.unwrap().is_some());

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_place_delete_cascades_owned_rows() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let conn = test_db.shared();

    let place = insert_place(&conn, "Gunung Jerai").await;
    let trip = insert_trip(&conn, None).await;
    address::ActiveModel {
        place_id: Set(place.id),
        street: Set(None),
        city: Set(Some("Gurun".to_string())),
        postcode: Set(None),
        state_id: Set(None),
        country_id: Set(None),
    }
    .insert(conn.as_ref())
    .await
    .unwrap();
    visitor::ActiveModel {
        member_id: Set(None),
        rating: Set(Decimal::from(4)),
        review: Set("Cool air".to_string()),
        visit_type: Set(visitor::VisitType::Holiday),
        place_id: Set(place.id),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(conn.as_ref())
    .await
    .unwrap();
    TripPlaceRepository::new(conn.clone())
        .upsert(trip.id, place.id, new_year(), Decimal::ONE)
        .await
        .unwrap();
    let tag = TagRepository::new(conn.clone())
        .create("hills".to_string())
        .await
        .unwrap();
    TagRepository::new(conn.clone())
        .attach(tag.id, ContentType::Place, place.id)
        .await
        .unwrap();

    assert!(PlaceRepository::new(conn.clone()).delete(place.id).await.unwrap());

    assert!(Address::find_by_id(place.id).one(conn.as_ref()).await.unwrap().is_none());
    assert!(Visitor::find().all(conn.as_ref()).await.unwrap().is_empty());
    assert!(TripPlace::find().all(conn.as_ref()).await.unwrap().is_empty());
    assert!(TagRepository::new(conn.clone()).places_for(tag.id).await.unwrap().is_empty());
    assert!(TripRepository::new(conn.clone()).exists(trip.id).await.unwrap());

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_member_delete_keeps_reviews() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let conn = test_db.shared();

    let place = insert_place(&conn, "Pulau Payar").await;
    let member = insert_member(&conn, "aisyah").await;
    let trip = insert_trip(&conn, Some(member.id)).await;
    let review = visitor::ActiveModel {
        member_id: Set(Some(member.id)),
        rating: Set(Decimal::from(5)),
        review: Set("Clear water".to_string()),
        visit_type: Set(visitor::VisitType::Local),
        place_id: Set(place.id),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(conn.as_ref())
    .await
    .unwrap();

    assert!(MemberRepository::new(conn.clone()).delete(member.id).await.unwrap());

    let kept = Visitor::find_by_id(review.id)
        .one(conn.as_ref())
        .await
        .unwrap()
        .expect("review survives its author");
    assert!(kept.member_id.is_none());

    let kept_trip = TripRepository::new(conn.clone()).get_by_id(trip.id).await.unwrap();
    assert!(kept_trip.member_id.is_none());

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_tags_for_ignores_other_types_with_same_id() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let conn = test_db.shared();

    let place = insert_place(&conn, "Langkawi").await;
    let state = insert_state(&conn, Some(place.id), "Kedah").await;
    assert_eq!(place.id, state.id);

    let tags = TagRepository::new(conn.clone());
    let beach = tags.create("beach".to_string()).await.unwrap();
    let region = tags.create("region".to_string()).await.unwrap();
    tags.attach(beach.id, ContentType::Place, place.id).await.unwrap();
    tags.attach(region.id, ContentType::State, state.id).await.unwrap();

    let for_place = tags.tags_for(ContentType::Place, place.id).await.unwrap();
    assert_eq!(for_place.len(), 1);
    assert_eq!(for_place[0].0.label, "beach");
    assert_eq!(for_place[0].1.content_type, ContentType::Place);

    assert_eq!(tags.places_for(region.id).await.unwrap(), Vec::<i32>::new());
    assert_eq!(tags.places_for(beach.id).await.unwrap(), vec![place.id]);

    test_db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
