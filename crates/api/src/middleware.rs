//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use sea_orm::DatabaseConnection;
use wayfarer_core::{
    AddressService, AuthService, GeographyService, ItineraryService, LikeService, MemberService,
    PlaceService, TagService, TransitService, TripService, VisitorService,
};
use wayfarer_db::repositories::{
    AddressRepository, CountryRepository, LikeRepository, MemberRepository, PlaceRepository,
    StateRepository, TagRepository, TransitRepository, TripPlaceRepository, TripRepository,
    UserRepository, VisitorRepository,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub place_service: PlaceService,
    pub address_service: AddressService,
    pub geography_service: GeographyService,
    pub transit_service: TransitService,
    pub visitor_service: VisitorService,
    pub member_service: MemberService,
    pub trip_service: TripService,
    pub itinerary_service: ItineraryService,
    pub tag_service: TagService,
    pub like_service: LikeService,
}

impl AppState {
    /// Wire every repository and service to one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let member_repo = MemberRepository::new(Arc::clone(&db));
        let place_repo = PlaceRepository::new(Arc::clone(&db));
        let address_repo = AddressRepository::new(Arc::clone(&db));
        let country_repo = CountryRepository::new(Arc::clone(&db));
        let state_repo = StateRepository::new(Arc::clone(&db));
        let transit_repo = TransitRepository::new(Arc::clone(&db));
        let visitor_repo = VisitorRepository::new(Arc::clone(&db));
        let trip_repo = TripRepository::new(Arc::clone(&db));
        let trip_place_repo = TripPlaceRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));
        let like_repo = LikeRepository::new(db);

        let auth_service = AuthService::new(user_repo);
        let address_service = AddressService::new(
            address_repo.clone(),
            place_repo.clone(),
            state_repo.clone(),
            country_repo.clone(),
        );
        let place_service = PlaceService::new(
            place_repo.clone(),
            address_repo.clone(),
            transit_repo.clone(),
            address_service.clone(),
        );
        let geography_service = GeographyService::new(country_repo, state_repo, address_repo);
        let transit_service = TransitService::new(transit_repo);
        let visitor_service =
            VisitorService::new(visitor_repo.clone(), place_repo.clone(), member_repo.clone());
        let member_service = MemberService::new(
            member_repo.clone(),
            visitor_repo,
            trip_repo.clone(),
            auth_service.clone(),
        );
        let trip_service = TripService::new(
            trip_repo.clone(),
            trip_place_repo.clone(),
            place_repo.clone(),
            member_repo.clone(),
        );
        let itinerary_service = ItineraryService::new(
            trip_repo,
            trip_place_repo,
            place_repo.clone(),
            member_repo.clone(),
        );
        let tag_service = TagService::new(tag_repo, place_repo);
        let like_service = LikeService::new(like_repo, member_repo);

        Self {
            auth_service,
            place_service,
            address_service,
            geography_service,
            transit_service,
            visitor_service,
            member_service,
            trip_service,
            itinerary_service,
            tag_service,
            like_service,
        }
    }
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to its user and stores it in the request
/// extensions. Unknown tokens leave the request anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);

    if let Some(token) = token {
        match state.auth_service.authenticate(&token).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => tracing::debug!("Unknown bearer token"),
            Err(e) => tracing::warn!(error = %e, "Token lookup failed"),
        }
    }

    next.run(req).await
}
