//! Route module registry.
//!
//! A *module* is a named route handler registered by a feature at startup.
//! Requests carrying `module=<name>` are dispatched to the module's callback
//! with `(action, module)`.
//!
//! # Registration filters
//!
//! Every configuration passes through the registry's filters, in insertion
//! order, before it is stored. Filters let other features amend a module's
//! configuration without owning it:
//!
//! ```rust,ignore
//! let mut registry = ModuleRegistry::new();
//! registry.add_filter(|config, name| {
//!     if name == "json" { config.with("cache", false) } else { config }
//! });
//! registry.register("json", ModuleConfig::new(json_redirect));
//! ```
//!
//! # Duplicates
//!
//! Registering a name twice is a configuration mistake but not an error:
//! a warning is logged and the later configuration replaces the earlier one.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use trellis_core::Response;

/// A module callback, invoked with `(action, module, response)`.
///
/// The callback may halt the response to end the request.
pub type ModuleCallback = Arc<dyn Fn(&str, &str, &mut Response) + Send + Sync>;

/// A registration filter, invoked with `(config, name)`.
pub type RegistrationFilter = Arc<dyn Fn(ModuleConfig, &str) -> ModuleConfig + Send + Sync>;

/// Configuration of a route module.
///
/// Besides the callback, a module carries an opaque JSON object of extra
/// settings that filters and other features may read.
#[derive(Clone)]
pub struct ModuleConfig {
    callback: ModuleCallback,
    extra: Map<String, Value>,
}

impl ModuleConfig {
    /// Creates a configuration with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str, &str, &mut Response) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            extra: Map::new(),
        }
    }

    /// Adds an extra setting.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Replaces the callback.
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &str, &mut Response) + Send + Sync + 'static,
    {
        self.callback = Arc::new(callback);
        self
    }

    /// Returns an extra setting.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// All extra settings.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

impl fmt::Debug for ModuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleConfig")
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

/// A registered module.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    name: String,
    config: ModuleConfig,
}

impl ModuleEntry {
    /// The module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored (filtered) configuration.
    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Invokes the callback with `(action, name)`.
    pub fn invoke(&self, action: &str, response: &mut Response) {
        (self.config.callback)(action, &self.name, response);
    }
}

/// Source of module entries for the router.
///
/// Entries are returned owned so that callers holding the registry behind a
/// lock can release it before the callback runs.
pub trait ModuleLookup {
    /// Looks up a module by name.
    fn lookup_module(&self, name: &str) -> Option<ModuleEntry>;
}

impl ModuleLookup for ModuleRegistry {
    fn lookup_module(&self, name: &str) -> Option<ModuleEntry> {
        self.lookup(name).cloned()
    }
}

impl<F> ModuleLookup for F
where
    F: Fn(&str) -> Option<ModuleEntry>,
{
    fn lookup_module(&self, name: &str) -> Option<ModuleEntry> {
        self(name)
    }
}

/// Name-keyed store of route modules.
///
/// Populated during startup and read while routing. The registry itself does
/// no locking; the owner decides how it is shared.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ModuleEntry>,
    filters: Vec<RegistrationFilter>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a registration filter. Applies to later registrations only.
    pub fn add_filter<F>(&mut self, filter: F)
    where
        F: Fn(ModuleConfig, &str) -> ModuleConfig + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
    }

    /// Registers a module, replacing (with a warning) any module of the same name.
    pub fn register(&mut self, name: impl Into<String>, config: ModuleConfig) {
        let name = name.into();

        let config = self
            .filters
            .iter()
            .fold(config, |config, filter| filter(config, &name));

        if self.modules.contains_key(&name) {
            warn!(module = %name, "Route module already registered, replacing");
        } else {
            debug!(module = %name, "Registered route module");
        }

        self.modules
            .insert(name.clone(), ModuleEntry { name, config });
    }

    /// Removes a module. Unknown names are ignored.
    pub fn unregister(&mut self, name: &str) {
        if self.modules.remove(name).is_some() {
            debug!(module = %name, "Unregistered route module");
        }
    }

    /// Looks up a module by name.
    pub fn lookup(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.get(name)
    }

    /// Returns `true` if a module with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .field("filters", &self.filters.len())
            .finish()
    }
}
