//! # Orderdesk API
//!
//! HTTP server for order pricing, checkout and payment confirmation.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Orderdesk API                                  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐ │
//! │  │  routes        │  │  service       │  │  state                     │ │
//! │  │                │  │                │  │                            │ │
//! │  │ • orders       │─►│ • checkout     │─►│ • Database (orderdesk-db)  │ │
//! │  │ • catalog      │  │ • confirmation │  │ • PaymentProvider          │ │
//! │  │ • health       │  │ • cancellation │  │ • ApiConfig                │ │
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘ │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - HTTP server port (default: 8000)
//! - `DATABASE_PATH` - SQLite file (default: ./orderdesk.db)
//! - `PUBLIC_BASE_URL` - Base for provider redirect URLs (default: http://localhost:8000)
//! - `ORDER_LIST_LIMIT` - Default order listing size (default: 50)
//! - `STRIPE_SECRET_KEY`, `STRIPE_PUBLIC_KEY` - Provider credentials (required)
//! - `STRIPE_API_BASE`, `STRIPE_TIMEOUT_SECS`, `STRIPE_TAX_COUNTRY` - Provider tuning
//! - `RUST_LOG` - Log filter

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::router;
pub use state::AppState;
