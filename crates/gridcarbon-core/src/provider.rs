//! Provider client contract and the error taxonomy shared by every layer
//! above the transport.
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | [`SourceErrorKind::Location`] | a location cannot be resolved to coordinates |
//! | [`SourceErrorKind::Region`] | coordinates fall outside provider coverage |
//! | [`SourceErrorKind::Transport`] | non-success HTTP status after the auth retry, or a network failure |
//! | [`SourceErrorKind::ProviderData`] | malformed payload, or the provider has no data (incl. too-short forecasts) |
//! | [`SourceErrorKind::InvalidRequest`] | caller arguments are inconsistent |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use time::OffsetDateTime;

use crate::http_client::HttpError;
use crate::{Forecast, GridEmissionDataPoint, ProviderId, RegionId, ValidationError};

/// Failure classification for data-source operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Location,
    Region,
    Transport,
    ProviderData,
    InvalidRequest,
}

/// Structured error returned by provider clients and the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    status: Option<u16>,
    retryable: bool,
}

impl SourceError {
    pub fn location(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Location,
            message: message.into(),
            status: None,
            retryable: false,
        }
    }

    pub fn region(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Region,
            message: message.into(),
            status: None,
            retryable: false,
        }
    }

    /// Wraps a transport failure, keeping its status code.
    pub fn transport(provider: ProviderId, error: &HttpError) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: format!("{provider} transport error: {error}"),
            status: error.status(),
            retryable: error.retryable(),
        }
    }

    pub fn provider_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::ProviderData,
            message: message.into(),
            status: None,
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            status: None,
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Location => "source.location",
            SourceErrorKind::Region => "source.region",
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::ProviderData => "source.provider_data",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::MissingCoordinates { .. }
            | ValidationError::InvalidLatitude { .. }
            | ValidationError::InvalidLongitude { .. } => Self::location(error.to_string()),
            ValidationError::EmptyRegion => Self::region(error.to_string()),
            other => Self::invalid_request(other.to_string()),
        }
    }
}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Emissions-data provider contract.
///
/// Implementations talk to the provider exclusively through
/// [`AuthenticatedTransport`](crate::AuthenticatedTransport) and normalize
/// provider records into [`GridEmissionDataPoint`]s.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single client serves concurrent
/// calls without shared mutable state.
pub trait ProviderClient: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Samples for `region` within the closed window `[start, end]`, in
    /// provider order. An empty vector is a valid answer.
    fn get_data_points<'a>(
        &'a self,
        region: &'a RegionId,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> SourceFuture<'a, Vec<GridEmissionDataPoint>>;

    /// The provider's current forecast for `region`.
    ///
    /// # Errors
    ///
    /// [`SourceErrorKind::ProviderData`] when the provider reports no forecast.
    fn get_current_forecast<'a>(&'a self, region: &'a RegionId) -> SourceFuture<'a, Forecast>;

    /// The provider region covering a coordinate pair.
    ///
    /// # Errors
    ///
    /// [`SourceErrorKind::Region`] when the provider has no coverage there.
    fn get_region_for_coordinates<'a>(
        &'a self,
        latitude: f64,
        longitude: f64,
    ) -> SourceFuture<'a, RegionId>;
}
