//! Database entities.

#![allow(missing_docs)]

pub mod address;
pub mod country;
pub mod liked_item;
pub mod member;
pub mod place;
pub mod place_transit;
pub mod state;
pub mod tag;
pub mod tagged_item;
pub mod transit;
pub mod trip;
pub mod trip_place;
pub mod user;
pub mod user_permission;
pub mod visitor;

pub use address::Entity as Address;
pub use country::Entity as Country;
pub use liked_item::Entity as LikedItem;
pub use member::Entity as Member;
pub use place::Entity as Place;
pub use place_transit::Entity as PlaceTransit;
pub use state::Entity as State;
pub use tag::Entity as Tag;
pub use tagged_item::Entity as TaggedItem;
pub use transit::Entity as Transit;
pub use trip::Entity as Trip;
pub use trip_place::Entity as TripPlace;
pub use user::Entity as User;
pub use user_permission::Entity as UserPermission;
pub use visitor::Entity as Visitor;
