//! Location resolution: turning caller locations into coordinates.

use std::collections::HashMap;

use tracing::debug;

use crate::provider::{SourceError, SourceFuture};
use crate::{CloudProvider, Coordinates, Location, LocationKind};

/// Resolves a [`Location`] to a copy carrying coordinates.
///
/// # Errors
///
/// Implementations fail with [`SourceErrorKind::Location`](crate::SourceErrorKind::Location)
/// when the location cannot be geocoded.
pub trait LocationResolver: Send + Sync {
    fn resolve<'a>(&'a self, location: &'a Location) -> SourceFuture<'a, Location>;
}

/// Table-backed resolver for cloud regions.
///
/// Geoposition locations pass through once their coordinates validate.
#[derive(Debug, Clone, Default)]
pub struct StaticLocationResolver {
    regions: HashMap<(CloudProvider, String), Coordinates>,
}

impl StaticLocationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cloud region. Region names match case-insensitively.
    pub fn with_region(
        mut self,
        provider: CloudProvider,
        region_name: &str,
        coordinates: Coordinates,
    ) -> Self {
        self.regions
            .insert((provider, normalize_name(region_name)), coordinates);
        self
    }

    fn lookup(&self, location: &Location) -> Result<Location, SourceError> {
        match location.kind {
            LocationKind::Geoposition => {
                let coordinates = location.coordinates()?;
                Ok(location.with_coordinates(coordinates))
            }
            LocationKind::CloudProvider(provider) => {
                let key = (provider, normalize_name(&location.name));
                let coordinates = self.regions.get(&key).ok_or_else(|| {
                    SourceError::location(format!("unknown {} region '{}'", provider.as_str(), location.name))
                })?;
                debug!(location = %location, ?coordinates, "resolved cloud region");
                Ok(location.with_coordinates(*coordinates))
            }
        }
    }
}

impl LocationResolver for StaticLocationResolver {
    fn resolve<'a>(&'a self, location: &'a Location) -> SourceFuture<'a, Location> {
        let resolved = self.lookup(location);
        Box::pin(async move { resolved })
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
