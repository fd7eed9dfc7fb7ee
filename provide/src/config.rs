//! Framework configuration is represented by [ApplicationConfig].
//! [Application](crate::application::Application) uses this config to configure itself, and also registers it in the injector, so it can be
//! injected into any other component.
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by environment variables prefixed with `PROVIDE_` or `provide.json` file.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use provide_di::error::ModuleError;
use provide_di::injector::{FailedResolutionPolicy, InjectorConfig};
use provide_di::instance_provider::InstancePtr;
use provide_di::module::{Module, ModulePtr};
use provide_di::provider::Provider;
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "PROVIDE";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "provide.json";

/// Framework configuration.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ApplicationConfig {
    /// Should a default tracing logger be installed in the scope of the application.
    pub install_tracing_logger: bool,
    /// What the injector does with dependencies which failed to resolve.
    pub failed_resolution_policy: FailedResolutionPolicy,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            failed_resolution_policy: FailedResolutionPolicy::default(),
        }
    }
}

impl From<OptionalApplicationConfig> for ApplicationConfig {
    fn from(value: OptionalApplicationConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            failed_resolution_policy: value
                .failed_resolution_policy
                .map(FailedResolutionPolicy::from)
                .unwrap_or(default.failed_resolution_policy),
        }
    }
}

impl ApplicationConfig {
    /// Loads the config from [CONFIG_FILE] and `PROVIDE_` environment variables.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Self::init_from_sources(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true)),
        )
    }

    fn init_from_sources(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .build()
            .and_then(|config| config.try_deserialize::<OptionalApplicationConfig>())
            .map(|config| config.into())
    }

    /// Configuration for the application [Injector](provide_di::injector::Injector).
    pub fn injector_config(&self) -> InjectorConfig {
        InjectorConfig::default().with_failed_resolution_policy(self.failed_resolution_policy)
    }
}

/// Creates a module providing given config as [ApplicationConfig].
pub fn config_module(config: ApplicationConfig) -> Result<ModulePtr, ModuleError> {
    Module::builder("ApplicationConfigModule")
        .provider(
            Provider::<ApplicationConfig>::new("provide_application_config")
                .instance(move |_| Ok(InstancePtr::new(config.clone()))),
        )
        .build()
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum FailedResolutionPolicyConfig {
    Retry,
    Poison,
}

impl From<FailedResolutionPolicyConfig> for FailedResolutionPolicy {
    fn from(value: FailedResolutionPolicyConfig) -> Self {
        match value {
            FailedResolutionPolicyConfig::Retry => Self::Retry,
            FailedResolutionPolicyConfig::Poison => Self::Poison,
        }
    }
}

#[derive(Deserialize)]
struct OptionalApplicationConfig {
    install_tracing_logger: Option<bool>,
    failed_resolution_policy: Option<FailedResolutionPolicyConfig>,
}
