use crate::instance_provider::ErrorPtr;
use crate::key::DependencyType;
use crate::module::ProviderOrigin;
use itertools::Itertools;
use thiserror::Error;

/// Reasons for failing to provide a dependency.
#[derive(Error, Clone, Debug)]
pub enum DependencyErrorKind {
    #[error("Detected dependency cycle")]
    DependencyCycle,
    #[error("Could not find or create provider for dependency")]
    NoProvider,
    #[error("Dependency parameter \"{parameter}\" in \"{entry}\" missing type")]
    MissingParameterType { parameter: String, entry: String },
    #[error("Type provider \"{provider}\" returned a non-type")]
    NonTypeRedirect { provider: String },
    #[error("Type provider \"{provider}\" returned a non-decorated type: {target}")]
    UndecoratedRedirect {
        provider: String,
        target: DependencyType,
    },
    #[error("Instance provider \"{provider}\" returned a type redirect")]
    UnexpectedRedirect { provider: String },
    #[error("Tried to downcast instance to incompatible type: {0}")]
    IncompatibleInstance(DependencyType),
    #[error("\"{entry}\" failed: {error}")]
    ProviderFailed { entry: String, error: ErrorPtr },
}

/// Error raised when an injector cannot provide a dependency. Carries the chain of dependencies
/// which led to the failure, most recent first, and the name of the requested dependency.
#[derive(Error, Clone, Debug)]
#[error("{kind}{}: {}", format_name(.name), format_chain(.chain))]
pub struct DependencyError {
    pub kind: DependencyErrorKind,
    pub chain: Vec<DependencyType>,
    pub name: Option<String>,
}

impl DependencyError {
    pub fn new(kind: DependencyErrorKind, chain: Vec<DependencyType>, name: Option<&str>) -> Self {
        Self {
            kind,
            chain,
            name: name.map(str::to_string),
        }
    }
}

fn format_name(name: &Option<String>) -> String {
    name.as_ref()
        .map(|name| format!(" (\"{name}\")"))
        .unwrap_or_default()
}

fn format_chain(chain: &[DependencyType]) -> String {
    chain.iter().join(", required by ")
}

/// Errors related to building a [Module](crate::module::Module).
#[derive(Error, Clone, Debug)]
pub enum ModuleError {
    #[error("Found colliding providers: {0} and {1}")]
    CollidingProviders(ProviderOrigin, ProviderOrigin),
}

/// Errors related to creating an [Injector](crate::injector::Injector).
#[derive(Error, Clone, Debug)]
pub enum InjectorError {
    #[error("Found duplicate providers: {}", format_duplicates(.0))]
    DuplicateProviders(Vec<(ProviderOrigin, ProviderOrigin)>),
}

fn format_duplicates(duplicates: &[(ProviderOrigin, ProviderOrigin)]) -> String {
    duplicates
        .iter()
        .map(|(existing, new)| format!("{existing} and {new}"))
        .join("; ")
}

/// Errors related to taking resolved [Arguments](crate::instance_provider::Arguments).
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum ArgumentError {
    #[error("Missing argument at position {0}")]
    MissingArgument(usize),
    #[error("Argument at position {position} is not an instance of {expected}")]
    IncompatibleArgument {
        position: usize,
        expected: DependencyType,
    },
}
