pub mod favorites;
pub mod listing_photos;
pub mod listings;
pub mod memberships;
pub mod users;

pub use favorites as favorite_entity;
pub use listing_photos as listing_photo_entity;
pub use listings as listing_entity;
pub use memberships as membership_entity;
pub use users as user_entity;

pub use listings::{ListingStatus, PropertyType};
pub use memberships::MembershipStatus;
