//! # Rentora Client
//!
//! Typed client for the Rentora vacation-rental API.
//!
//! Every call from every domain module runs through one resilient request
//! pipeline: read-only guard, sliding-window rate limit, retry with
//! exponential backoff (honoring server `Retry-After` hints), and error
//! normalization into [`rentora_domain::RentoraError`].
//!
//! ```rust,no_run
//! use rentora_client::{ClientConfig, RentoraClient};
//! use rentora_domain::PropertyFilter;
//!
//! # async fn example() -> rentora_domain::Result<()> {
//! let client = RentoraClient::new(ClientConfig::builder("my-api-key").build()?)?;
//!
//! let page = client.properties().list(&PropertyFilter::default()).await?;
//! for property in &page.items {
//!     println!("{} ({})", property.name, property.id);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod config;
pub mod http;
pub mod modules;
pub mod registry;
pub mod retry;

pub use client::{
    BatchRequest, RateLimitStatus, RentoraClient, RequestOptions, TransactionStep,
};
pub use config::{ApiVersion, ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use modules::{
    AvailabilityApi, BookingsApi, MessagingApi, PropertiesApi, RatesApi, WebhooksApi,
};
pub use registry::{ApiModule, ModuleRegistry};
pub use retry::HttpRetryPolicy;

// Callers build requests with the same method type the pipeline consumes.
pub use reqwest::Method;
