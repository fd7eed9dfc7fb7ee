//! Application framework based on [provide_di] dependency injection.
//!
//! Traditional applications start in the `main()` function and often explicitly initialize and pass
//! around various domain/application services. With dependency injection in place, services become
//! decoupled and form a dependency graph managed by an [Injector](provide_di::injector::Injector).
//! This, in turn, requires an entrypoint which creates the injector and runs the actual business
//! logic of the application. This crate provides such entrypoint in the form of
//! [Application](application::Application), which also configures additional supporting
//! infrastructure, e.g. logging.

pub mod application;
pub mod config;
pub mod runner;
