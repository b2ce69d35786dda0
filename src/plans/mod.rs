pub mod catalog;
pub mod limits;

pub use catalog::{PlanCatalog, PlanTier};
pub use limits::{can_attach_photos, can_create_listing, LimitDecision};
