//! Payment gateway adapters.
//!
//! Provides the Stripe HTTP implementation of the `PaymentGateway` port.

mod stripe;

pub use stripe::StripePaymentGateway;
