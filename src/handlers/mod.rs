pub mod auth;
pub mod favorite;
pub mod listing;
pub mod plan;
pub mod user;
pub mod webhook;

pub use auth::auth_config;
pub use favorite::favorite_config;
pub use listing::listing_config;
pub use plan::plan_config;
pub use user::user_config;
pub use webhook::webhook_config;
