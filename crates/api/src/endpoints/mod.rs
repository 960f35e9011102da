//! API endpoints.

mod addresses;
mod geography;
mod likes;
mod members;
mod places;
mod tags;
mod transits;
mod trip_places;
mod trips;
mod visitors;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;

pub use addresses::AddressResponse;
pub use places::{PlaceResponse, PlaceSummary};
pub use trip_places::TripPlaceResponse;
pub use trips::TripResponse;
pub use visitors::VisitorResponse;

/// Search and paging parameters shared by the simple list endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/places", places::router())
        .nest("/places/{place_id}/addresses", addresses::router())
        .nest("/places/{place_id}/visitors", visitors::router())
        .nest("/transits", transits::router())
        .nest("/trips", trips::router())
        .nest("/trips/{trip_id}/places", trip_places::router())
        .nest("/members", members::router())
        .nest("/countries", geography::countries_router())
        .nest("/states", geography::states_router())
        .nest("/tags", tags::router())
        .nest("/likes", likes::router())
}
