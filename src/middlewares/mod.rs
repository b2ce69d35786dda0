pub mod auth;
pub mod cors;

pub use auth::{current_user_id, optional_user_id, AuthMiddleware};
pub use cors::create_cors;
