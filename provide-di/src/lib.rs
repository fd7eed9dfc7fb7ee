//! Runtime dependency injection with explicit modules, lazily constructed singletons and cycle
//! detection.
//!
//! Dependencies are identified by a [key::DependencyKey] - a type with an optional name. They come
//! either from explicit [providers](provider) grouped in [modules](module), or from
//! [injectable] types, which know how to construct themselves from other dependencies. An
//! [injector::Injector] flattens a module tree into a registry, creates each dependency at most
//! once, on first request, and reports cycles and missing providers with the full chain of
//! dependencies which led to them.
//!
//! ### Features
//!
//! * `derive` (default) - automatic derivation of [injectable::Injectable] for structs

pub mod error;
pub mod injectable;
pub mod injector;
pub mod instance_provider;
pub mod key;
pub mod module;
pub mod provider;
pub mod provider_registry;

mod cache;

pub use injectable::Injectable;
