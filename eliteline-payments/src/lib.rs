// Stripe provider: hosted checkout sessions plus webhook verification.

pub mod checkout;
pub mod errors;
pub mod types;
pub mod webhook;

pub use checkout::StripeClient;
