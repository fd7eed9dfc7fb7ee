//! Core application framework functionality.
//!
//! ```no_run
//! use provide::application::Application;
//! use provide::runner::{ApplicationRunner, ApplicationRunnerPtr, ErrorPtr};
//! use provide_di::instance_provider::InstancePtr;
//! use provide_di::module::Module;
//! use provide_di::provider::Provider;
//! use provide_di::provider::Redirect;
//! use provide_di::Injectable;
//!
//! #[derive(Injectable)]
//! struct HelloRunner;
//!
//! impl ApplicationRunner for HelloRunner {
//!     fn run(&self) -> Result<(), ErrorPtr> {
//!         println!("Hello world!");
//!         Ok(())
//!     }
//! }
//!
//! let module = Module::builder("HelloModule")
//!     .provider(Provider::<ApplicationRunnerPtr>::new("provide_runner").redirect(|_| {
//!         Ok(Redirect::to::<HelloRunner>(|runner| {
//!             runner as InstancePtr<ApplicationRunnerPtr>
//!         }))
//!     }))
//!     .build()
//!     .expect("error building HelloModule");
//!
//! Application::new([module])
//!     .run()
//!     .expect("error running application");
//! ```

use crate::config::{config_module, ApplicationConfig};
use crate::runner::ApplicationRunnerPtr;
use derive_more::Constructor;
use provide_di::error::{DependencyError, InjectorError, ModuleError};
use provide_di::injector::Injector;
use provide_di::instance_provider::{ErrorPtr, InstanceProvider, TypedInstanceProvider};
use provide_di::module::ModulePtr;
use std::cmp::Reverse;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Error, Debug)]
pub enum ApplicationError {
    #[error("Error loading configuration: {0}")]
    ConfigError(Arc<config::ConfigError>),
    #[error("Error creating module: {0}")]
    ModuleError(#[from] ModuleError),
    #[error("Error creating injector: {0}")]
    InjectorError(#[from] InjectorError),
    #[error("Error retrieving runners: {0}")]
    RunnerInjectionError(DependencyError),
    #[error("Runner error: {0}")]
    RunnerError(ErrorPtr),
}

/// Main entrypoint for the application. Bootstraps the application and runs
/// [ApplicationRunners](crate::runner::ApplicationRunner) provided by given modules.
pub struct Application {
    modules: Vec<ModulePtr>,
    runners: Vec<Option<String>>,
    config: Option<ApplicationConfig>,
}

impl Application {
    /// Creates an application from given modules. An [ApplicationConfig] provider is added
    /// automatically, so the modules must not provide one.
    pub fn new<I: IntoIterator<Item = ModulePtr>>(modules: I) -> Self {
        Self {
            modules: modules.into_iter().collect(),
            runners: vec![],
            config: None,
        }
    }

    /// Runs the runner registered with given name. If no runners are added, the unnamed one is
    /// run.
    pub fn with_runner(mut self, name: impl Into<String>) -> Self {
        self.runners.push(Some(name.into()));
        self
    }

    /// Runs the unnamed runner, in addition to named ones.
    pub fn with_default_runner(mut self) -> Self {
        self.runners.push(None);
        self
    }

    /// Uses given config instead of loading it from the environment.
    pub fn with_config(mut self, config: ApplicationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn run(&self) -> Result<(), ApplicationError> {
        let config = match &self.config {
            Some(config) => config.clone(),
            None => ApplicationConfig::init_from_environment()
                .map_err(|error| ApplicationError::ConfigError(Arc::new(error)))?,
        };

        let _guard = config.install_tracing_logger.then(install_tracing_logger);

        info!("Creating injector...");

        let injector = Injector::builder()
            .with_modules(self.modules.iter().cloned())
            .with_module(config_module(config.clone())?)
            .with_config(config.injector_config())
            .build()?;

        let runners = if self.runners.is_empty() {
            vec![None]
        } else {
            self.runners.clone()
        };

        RunnerExecutor::new(injector, runners).run()
    }
}

fn install_tracing_logger() -> tracing::subscriber::DefaultGuard {
    tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
}

/// Resolves runners with given names and runs them in priority order.
#[derive(Constructor)]
pub struct RunnerExecutor<IP: InstanceProvider> {
    instance_provider: IP,
    runners: Vec<Option<String>>,
}

impl<IP: InstanceProvider> RunnerExecutor<IP> {
    pub fn run(&self) -> Result<(), ApplicationError> {
        info!("Searching for application runners...");

        let mut runners = self
            .runners
            .iter()
            .map(|name| match name {
                Some(name) => self
                    .instance_provider
                    .get_named_instance::<ApplicationRunnerPtr>(name),
                None => self
                    .instance_provider
                    .get_instance::<ApplicationRunnerPtr>(),
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApplicationError::RunnerInjectionError)?;

        runners.sort_by_key(|runner| Reverse(runner.priority()));

        info!("Running application runners...");

        for runner in &runners {
            debug!(priority = runner.priority(), "Running runner.");
            runner.run().map_err(ApplicationError::RunnerError)?;
        }

        Ok(())
    }
}
