//! Runners executing actual application logic.

#[cfg(test)]
use mockall::automock;
pub use provide_di::instance_provider::ErrorPtr;

pub type ApplicationRunnerPtr = dyn ApplicationRunner + Send + Sync;

/// Runs application logic. Runners are resolved from the injector by the
/// [Application](crate::application::Application), so they can have their own dependencies.
#[cfg_attr(test, automock)]
pub trait ApplicationRunner {
    /// Runs any application code.
    fn run(&self) -> Result<(), ErrorPtr>;

    /// Returns the priority for this runner. Higher priorities get run first. Default 0.
    fn priority(&self) -> i8 {
        0
    }
}
