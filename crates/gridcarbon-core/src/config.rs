//! Provider connection settings and the accessors the transport reads them
//! through.

use std::sync::{Arc, RwLock};

use crate::http_client::HttpAuth;
use crate::{ProviderId, ValidationError};

pub const WATTTIME_DEFAULT_BASE_URL: &str = "https://api2.watttime.org/v2";
pub const ELECTRICITY_MAP_DEFAULT_BASE_URL: &str = "https://api.electricitymap.org/v3";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Connection settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub auth: HttpAuth,
    pub timeout_ms: u64,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, auth: HttpAuth) -> Result<Self, ValidationError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl { value: base_url });
        }

        Ok(Self {
            base_url: trimmed.to_owned(),
            auth,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        })
    }

    /// WattTime settings authenticating with a bearer token.
    pub fn watttime(token: impl Into<String>) -> Self {
        Self {
            base_url: String::from(WATTTIME_DEFAULT_BASE_URL),
            auth: HttpAuth::BearerToken(token.into()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// electricityMap settings authenticating with the `auth-token` header.
    pub fn electricity_map(token: impl Into<String>) -> Self {
        Self {
            base_url: String::from(ELECTRICITY_MAP_DEFAULT_BASE_URL),
            auth: electricity_map_auth(token.into()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(self, base_url: impl Into<String>) -> Result<Self, ValidationError> {
        let mut config = Self::new(base_url, self.auth)?;
        config.timeout_ms = self.timeout_ms;
        Ok(config)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Reads `GRIDCARBON_<PROVIDER>_BASE_URL`, `GRIDCARBON_<PROVIDER>_TOKEN`
    /// and `GRIDCARBON_<PROVIDER>_TIMEOUT_MS`, falling back to provider
    /// defaults for anything unset.
    pub fn from_env(provider: ProviderId) -> Result<Self, ValidationError> {
        Self::from_lookup(provider, |name| std::env::var(name).ok())
    }

    fn from_lookup<F>(provider: ProviderId, lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = format!("GRIDCARBON_{}", provider.as_str().to_ascii_uppercase());
        let token = lookup(&format!("{prefix}_TOKEN"));

        let mut config = match provider {
            ProviderId::WattTime => match token {
                Some(token) => Self::watttime(token),
                None => Self {
                    auth: HttpAuth::None,
                    ..Self::watttime(String::new())
                },
            },
            ProviderId::ElectricityMap => match token {
                Some(token) => Self::electricity_map(token),
                None => Self {
                    auth: HttpAuth::None,
                    ..Self::electricity_map(String::new())
                },
            },
        };

        if let Some(base_url) = lookup(&format!("{prefix}_BASE_URL")) {
            config = config.with_base_url(base_url)?;
        }

        if let Some(raw) = lookup(&format!("{prefix}_TIMEOUT_MS")) {
            let timeout_ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ValidationError::InvalidSetting {
                    name: "timeout_ms",
                    value: raw.clone(),
                })?;
            config.timeout_ms = timeout_ms;
        }

        Ok(config)
    }
}

fn electricity_map_auth(token: String) -> HttpAuth {
    HttpAuth::Header {
        name: String::from("auth-token"),
        value: token,
    }
}

/// Source of the configuration snapshot a transport call runs with.
///
/// Implementations are read once per request, so a replaced value takes
/// effect on the next call without affecting calls already in flight.
pub trait ConfigSource: Send + Sync {
    fn snapshot(&self) -> ProviderConfig;
}

/// Configuration fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticConfig(ProviderConfig);

impl StaticConfig {
    pub fn new(config: ProviderConfig) -> Self {
        Self(config)
    }
}

impl ConfigSource for StaticConfig {
    fn snapshot(&self) -> ProviderConfig {
        self.0.clone()
    }
}

/// Configuration that can be swapped at runtime, e.g. after a credential
/// rotation.
#[derive(Debug, Clone)]
pub struct ReloadableConfig {
    current: Arc<RwLock<ProviderConfig>>,
}

impl ReloadableConfig {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            current: Arc::new(RwLock::new(config)),
        }
    }

    pub fn replace(&self, config: ProviderConfig) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = config;
    }
}

impl ConfigSource for ReloadableConfig {
    fn snapshot(&self) -> ProviderConfig {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
