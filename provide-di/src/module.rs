//! [Module]s group [providers](crate::provider) and form a tree by installing other modules. An
//! [Injector](crate::injector::Injector) flattens the whole tree into a single registry when it's
//! created. Modules themselves are inert - they never resolve anything.
//!
//! ```
//! use provide_di::instance_provider::InstancePtr;
//! use provide_di::module::Module;
//! use provide_di::provider::Provider;
//!
//! let database = Module::builder("DatabaseModule")
//!     .provider(
//!         Provider::<String>::new("provide_url")
//!             .named("database_url")
//!             .instance(|_| Ok(InstancePtr::new("postgres://localhost".to_string()))),
//!     )
//!     .build()
//!     .expect("error building DatabaseModule");
//!
//! let application = Module::builder("ApplicationModule")
//!     .install([database])
//!     .build()
//!     .expect("error building ApplicationModule");
//! ```

use crate::error::ModuleError;
use crate::key::DependencyKey;
use crate::provider::ProviderDefinition;
use fxhash::FxHashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Shared pointer to a [Module]. Modules are identified by pointer, so the same module installed in
/// multiple places is registered only once.
pub type ModulePtr = Arc<Module>;

/// Describes where a provider comes from, for diagnostics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderOrigin {
    pub key: DependencyKey,
    pub provider: String,
    pub module: String,
}

impl ProviderOrigin {
    pub fn new(module: &str, definition: &ProviderDefinition) -> Self {
        Self {
            key: definition.key.clone(),
            provider: definition.name.clone(),
            module: module.to_string(),
        }
    }
}

impl Display for ProviderOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Provider {} in {} for {}",
            self.provider,
            self.module,
            self.key.ty()
        )?;

        if let Some(name) = self.key.name() {
            write!(f, " (named {name})")?;
        }

        Ok(())
    }
}

/// Immutable container of providers and installed sub-modules.
#[derive(Debug)]
pub struct Module {
    name: String,
    providers: Vec<ProviderDefinition>,
    sub_modules: Vec<ModulePtr>,
}

impl Module {
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            name: name.into(),
            providers: vec![],
            sub_modules: vec![],
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Providers declared locally in this module, in declaration order.
    #[inline]
    pub fn providers(&self) -> &[ProviderDefinition] {
        &self.providers
    }

    #[inline]
    pub fn sub_modules(&self) -> &[ModulePtr] {
        &self.sub_modules
    }
}

/// Builder for [Module]s.
pub struct ModuleBuilder {
    name: String,
    providers: Vec<ProviderDefinition>,
    sub_modules: Vec<ModulePtr>,
}

impl ModuleBuilder {
    /// Declares a provider local to this module.
    pub fn provider(mut self, definition: ProviderDefinition) -> Self {
        self.providers.push(definition);
        self
    }

    /// Installs given modules as sub-modules.
    pub fn install<I: IntoIterator<Item = ModulePtr>>(mut self, modules: I) -> Self {
        self.sub_modules.extend(modules);
        self
    }

    /// Builds the module. Fails if two local providers provide the same dependency.
    pub fn build(self) -> Result<ModulePtr, ModuleError> {
        let mut declared: FxHashMap<&DependencyKey, &ProviderDefinition> = FxHashMap::default();
        for definition in &self.providers {
            if let Some(existing) = declared.insert(&definition.key, definition) {
                return Err(ModuleError::CollidingProviders(
                    ProviderOrigin::new(&self.name, existing),
                    ProviderOrigin::new(&self.name, definition),
                ));
            }
        }

        Ok(Arc::new(Module {
            name: self.name,
            providers: self.providers,
            sub_modules: self.sub_modules,
        }))
    }
}
