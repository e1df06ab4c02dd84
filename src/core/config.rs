

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use super::error::Result;


/// What the location resolver does when the query names no place at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmptyLocationPolicy {
    /// Center the search on the user with the default radius.
    #[default]
    UseUserLocation,
    /// Apply no location restriction.
    NoFilter,
}


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PawfinderConfig {

    pub region: String,
    pub default_radius_miles: f64,
    pub empty_location_policy: EmptyLocationPolicy,
    pub strict_location_fields: bool,


    pub per_page: u32,
    pub store_timeout_ms: u64,
    pub geocode_timeout_ms: u64,
    pub geocoder_url: Option<String>,


    pub cache_enabled: bool,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub cache_eviction_interval_secs: u64,
}

impl PawfinderConfig {

    pub fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
            default_radius_miles: crate::DEFAULT_RADIUS_MILES,
            empty_location_policy: EmptyLocationPolicy::UseUserLocation,
            strict_location_fields: false,

            per_page: 20,
            store_timeout_ms: 5_000,
            geocode_timeout_ms: 3_000,
            geocoder_url: None,

            cache_enabled: true,
            cache_capacity: crate::DEFAULT_CACHE_SIZE,
            cache_ttl_secs: crate::DEFAULT_CACHE_TTL,
            cache_eviction_interval_secs: 60,
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.geocode_timeout_ms)
    }


    /// Defaults overlaid with `PAWFINDER_*` environment variables, no config file.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Layers an optional config file under `PAWFINDER_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("PAWFINDER").try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

impl Default for PawfinderConfig {
    fn default() -> Self {
        Self::new(crate::DEFAULT_REGION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PawfinderConfig::default();
        assert_eq!(config.region, "IN");
        assert_eq!(config.empty_location_policy, EmptyLocationPolicy::UseUserLocation);
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("no_filter".parse::<EmptyLocationPolicy>().unwrap(), EmptyLocationPolicy::NoFilter);
        assert_eq!(
            "use_user_location".parse::<EmptyLocationPolicy>().unwrap(),
            EmptyLocationPolicy::UseUserLocation
        );
        assert!("sometimes".parse::<EmptyLocationPolicy>().is_err());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = PawfinderConfig::load(None).unwrap();
        assert_eq!(config.per_page, 20);
        assert!(config.cache_capacity > 0);
    }

    #[test]
    fn test_from_env_reads_every_field() {
        // Only this test sets these variables.
        unsafe {
            std::env::set_var("PAWFINDER_CACHE_EVICTION_INTERVAL_SECS", "7");
            std::env::set_var("PAWFINDER_GEOCODE_TIMEOUT_MS", "1250");
        }
        let config = PawfinderConfig::from_env().unwrap();
        unsafe {
            std::env::remove_var("PAWFINDER_CACHE_EVICTION_INTERVAL_SECS");
            std::env::remove_var("PAWFINDER_GEOCODE_TIMEOUT_MS");
        }
        assert_eq!(config.cache_eviction_interval_secs, 7);
        assert_eq!(config.geocode_timeout(), Duration::from_millis(1250));
        assert_eq!(config.region, "IN");
    }
}
