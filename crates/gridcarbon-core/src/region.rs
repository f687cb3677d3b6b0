use std::sync::Arc;

use tracing::debug;

use crate::provider::{ProviderClient, SourceError};
use crate::{Location, RegionId};

/// Maps a resolved [`Location`] to the provider region covering it.
#[derive(Clone)]
pub struct RegionResolver {
    provider: Arc<dyn ProviderClient>,
}

impl RegionResolver {
    pub fn new(provider: Arc<dyn ProviderClient>) -> Self {
        Self { provider }
    }

    /// # Errors
    ///
    /// Location error when `location` has no valid coordinates; region error
    /// when the provider does not cover them.
    pub async fn resolve(&self, location: &Location) -> Result<RegionId, SourceError> {
        let coordinates = location.coordinates()?;
        let region = self
            .provider
            .get_region_for_coordinates(coordinates.latitude(), coordinates.longitude())
            .await?;

        debug!(
            provider = %self.provider.id(),
            location = %location,
            region = %region,
            "resolved provider region"
        );
        Ok(region)
    }
}
