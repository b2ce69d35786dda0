pub mod stripe;

pub use stripe::StripeService;
