//! Injector configuration. Most of the defaults of [Injector](crate::injector::Injector)
//! operations can be changed by providing an [InjectorConfig].
//!
//! By default, the config is created with opinionated default values, which can then be
//! overwritten by environment variables prefixed with `AUTOWIRE_` or `autowire.json` file, when
//! using [InjectorConfig::init_from_environment].

pub use config::ConfigError;
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "AUTOWIRE";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "autowire.json";

/// Injector configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InjectorConfig {
    /// Should retrieval use and populate shared instances, unless requested otherwise.
    pub use_shared: bool,
    /// Should aliases check the resolved instance against the contract of the aliased key, unless
    /// requested otherwise.
    pub strict_aliases: bool,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            use_shared: true,
            strict_aliases: true,
        }
    }
}

impl From<OptionalInjectorConfig> for InjectorConfig {
    fn from(value: OptionalInjectorConfig) -> Self {
        let default = Self::default();
        Self {
            use_shared: value.use_shared.unwrap_or(default.use_shared),
            strict_aliases: value.strict_aliases.unwrap_or(default.strict_aliases),
        }
    }
}

impl InjectorConfig {
    pub fn new(use_shared: bool, strict_aliases: bool) -> Self {
        Self {
            use_shared,
            strict_aliases,
        }
    }

    /// Creates config from defaults, overridden by the optional config file and environment.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalInjectorConfig>())
            .map(|config| config.into())
    }
}

#[derive(Deserialize, Default)]
struct OptionalInjectorConfig {
    use_shared: Option<bool>,
    strict_aliases: Option<bool>,
}

#[cfg(test)]
mod tests {
    use crate::config::{InjectorConfig, OptionalInjectorConfig};

    #[test]
    fn should_default_missing_values() {
        assert_eq!(
            InjectorConfig::from(OptionalInjectorConfig::default()),
            InjectorConfig::default()
        );
    }

    #[test]
    fn should_override_present_values() {
        let config = InjectorConfig::from(OptionalInjectorConfig {
            use_shared: Some(false),
            strict_aliases: None,
        });

        assert!(!config.use_shared);
        assert!(config.strict_aliases);
    }
}
