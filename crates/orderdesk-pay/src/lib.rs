//! # orderdesk-pay: Payment Provider Adapter
//!
//! Turns a [`CheckoutRequest`](orderdesk_core::CheckoutRequest) into provider
//! calls and reports payment status back.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            orderdesk-pay                                │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────────┐   ┌────────────────────────┐   │
//! │  │   config     │   │    provider      │   │        stripe          │   │
//! │  │ keys, base   │──►│ PaymentProvider  │◄──│ StripeProvider         │   │
//! │  │ url, timeout │   │ (async trait)    │   │ form params + reqwest  │   │
//! │  └──────────────┘   └──────────────────┘   └────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use orderdesk_pay::{PaymentProvider, ProviderConfig, RedirectUrls, StripeProvider};
//!
//! let provider = StripeProvider::new(ProviderConfig::from_env()?)?;
//! let urls = RedirectUrls::for_order("http://localhost:8000", &request.order_id);
//! let session = provider.create_checkout_session(&request, &urls).await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod stripe;

pub use config::{ConfigError, ProviderConfig};
pub use error::{PaymentError, PaymentResult};
pub use provider::{CheckoutSession, PaymentIntent, PaymentProvider, PaymentStatus, RedirectUrls};
pub use stripe::StripeProvider;
