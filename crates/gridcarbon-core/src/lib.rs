//! # gridcarbon Core
//!
//! Grid carbon-intensity data source adapters for carbon-aware callers.
//!
//! ## Overview
//!
//! This crate answers "what is the carbon intensity at time T for location L"
//! regardless of which emissions-data provider supplies the numbers:
//!
//! - **Location resolution** from caller locations to coordinates
//! - **Region resolution** from coordinates to provider region identifiers
//! - **Provider clients** for WattTime and electricityMap
//! - **Unit normalization** into grams CO2e per kilowatt-hour
//! - **Forecast assembly** with per-sample durations inferred from timestamps
//! - **Authenticated transport** with a one-shot retry on 401/403
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider clients (WattTime, electricityMap) |
//! | [`config`] | Provider settings and snapshot accessors |
//! | [`data_source`] | Caller-facing data source |
//! | [`domain`] | Domain models (Location, RegionId, EmissionsData, ...) |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`location`] | Location resolver contract |
//! | [`provider`] | Provider client contract and source errors |
//! | [`query`] | Query-string builder |
//! | [`region`] | Region resolver |
//! | [`source`] | Provider identifiers |
//! | [`transport`] | Authenticated transport |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  Caller              │
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ Carbon Intensity     │────▶│ Location Resolver│
//! │ Data Source          │     └──────────────────┘
//! └──────────┬───────────┘     ┌──────────────────┐
//!            │────────────────▶│ Region Resolver  │
//!            ▼                 └────────┬─────────┘
//! ┌──────────────────────┐              │
//! │ Provider Client      │◀─────────────┘
//! │ (WattTime, eMap)     │
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ Authenticated        │────▶│ HTTP Client      │
//! │ Transport            │     │ (reqwest)        │
//! └──────────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`SourceError`], classified by [`SourceErrorKind`]:
//!
//! ```rust
//! use gridcarbon_core::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::Transport if error.retryable() => {
//!             // Network or upstream outage; try again later
//!         }
//!         SourceErrorKind::ProviderData => {
//!             // Provider has nothing usable for this region
//!         }
//!         SourceErrorKind::Location | SourceErrorKind::Region => {
//!             // Report to user
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Provider tokens are read from configuration or the environment only
//! - `HttpAuth` redacts credentials in its `Debug` output

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod location;
pub mod provider;
pub mod query;
pub mod region;
pub mod source;
pub mod transport;

// Provider clients
pub use adapters::{ElectricityMapClient, ProviderRecord, WattTimeClient};

// Configuration
pub use config::{ConfigSource, ProviderConfig, ReloadableConfig, StaticConfig};

// Data source
pub use data_source::{
    forecast_records, CarbonIntensityDataSource, DataSourceOptions, EmissionsDataSource,
    MIN_FORECAST_POINTS,
};

// Domain models
pub use domain::{
    convert_moer_to_grams_per_kwh, CloudProvider, Coordinates, EmissionsData, EmissionsForecast,
    EmissionsUnit, Forecast, GridEmissionDataPoint, Location, LocationKind, RegionId,
};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Resolvers
pub use location::{LocationResolver, StaticLocationResolver};
pub use region::RegionResolver;

// Provider contract
pub use provider::{ProviderClient, SourceError, SourceErrorKind, SourceFuture};

// Query building and transport
pub use query::build_query_string;
pub use transport::{AuthenticatedTransport, RequestTags, RETRIABLE_AUTH_STATUS_CODES};

// Source identifiers
pub use source::ProviderId;
