pub mod common;
pub mod favorite;
pub mod listing;
pub mod membership;
pub mod pagination;
pub mod plan;
pub mod user;

pub use common::{ApiError, ApiResponse};
pub use pagination::{PaginatedResponse, PaginationInfo, PaginationParams};
