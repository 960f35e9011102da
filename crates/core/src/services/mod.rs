//! Business logic services.

pub mod address;
pub mod auth;
pub mod geography;
pub mod itinerary;
pub mod like;
pub mod member;
pub mod place;
pub mod tag;
pub mod transit;
pub mod trip;
pub mod visitor;

pub use address::{AddressDetails, AddressInput, AddressService, UpdateAddressInput};
pub use auth::{AuthService, ensure_staff};
pub use geography::{
    CountryInput, GeographyService, StateInput, UpdateCountryInput, UpdateStateInput,
};
pub use itinerary::{ItineraryEntry, ItineraryService, TripPlaceInput, UpdateTripPlaceInput};
pub use like::LikeService;
pub use member::{CreateMemberInput, MemberHistory, MemberInput, MemberService};
pub use place::{PlaceDetails, PlaceInput, PlaceListQuery, PlaceService, UpdatePlaceInput};
pub use tag::{TagInput, TagService};
pub use transit::{TransitInput, TransitService, UpdateTransitInput};
pub use trip::{TripDetails, TripService};
pub use visitor::{UpdateVisitorInput, VisitorInput, VisitorService};

use serde::{Deserialize, Deserializer};

/// Deserialize a field where `null` and absence mean different things.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: a missing
/// field stays `None`, an explicit `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Clamp a page size to 1..=100, defaulting to 20.
pub(crate) fn page_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(20).clamp(1, 100)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        description: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"description": "Sunset"}"#).unwrap();

        assert_eq!(missing.description, None);
        assert_eq!(null.description, Some(None));
        assert_eq!(set.description, Some(Some("Sunset".to_string())));
    }

    #[test]
    fn test_page_limit() {
        assert_eq!(page_limit(None), 20);
        assert_eq!(page_limit(Some(0)), 1);
        assert_eq!(page_limit(Some(500)), 100);
    }
}
