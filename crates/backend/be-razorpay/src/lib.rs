//! Razorpay payment provider integration: Orders API client plus checkout
//! and webhook signature verification.

pub mod client;
pub mod config;
pub mod error;
pub mod signature;

pub use client::{RazorpayClient, RazorpayOrder};
pub use config::RazorpayConfig;
pub use error::RazorpayError;
pub use signature::{payment_signature, verify_payment_signature, verify_webhook_signature};
