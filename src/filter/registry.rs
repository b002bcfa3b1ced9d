//! # Filter Registry
//!
//! Maps filter names to factories so filters can be attached by name.
//! A lookup for `a.b.c` falls back to `a.b.*` and then `a.*`.

use crate::error::{FilterError, FilterResult};
use crate::filter::builtin::{AccumulateFilter, Rot13Filter, ToLowerFilter, ToUpperFilter};
use crate::filter::default::StreamFilter;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Factory producing a fresh filter instance
pub type FilterFactory = Box<dyn Fn() -> Box<dyn StreamFilter> + Send + Sync>;

fn factory<F>() -> FilterFactory
where
    F: StreamFilter + Default + 'static,
{
    Box::new(|| Box::new(F::default()) as Box<dyn StreamFilter>)
}

/// Registry of named filter factories
#[derive(Default)]
pub struct FilterRegistry {
    factories: HashMap<String, FilterFactory>,
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl FilterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the stock `string.*` and `buffer.*` filters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, FilterFactory); 4] = [
            ("string.toupper", factory::<ToUpperFilter>()),
            ("string.tolower", factory::<ToLowerFilter>()),
            ("string.rot13", factory::<Rot13Filter>()),
            ("buffer.accumulate", factory::<AccumulateFilter>()),
        ];
        for (name, factory) in builtins {
            registry.factories.insert(name.to_string(), factory);
        }
        registry
    }

    /// Register a factory under `name`. Names ending in `.*` match every
    /// name under that prefix that has no closer registration.
    pub fn register<F>(&mut self, name: &str, factory: F) -> FilterResult<()>
    where
        F: Fn() -> Box<dyn StreamFilter> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(FilterError::InvalidConfig {
                reason: "filter name must not be empty".to_string(),
            });
        }
        if self.factories.contains_key(name) {
            return Err(FilterError::AlreadyExists {
                name: name.to_string(),
            });
        }

        debug!(filter = name, "registered filter");
        self.factories.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    /// Remove a registration
    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    /// Whether `name` resolves to a factory, wildcards included
    pub fn is_registered(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the filter registered under `name`.
    ///
    /// The new filter carries the requested `name` and `parameters`, even
    /// when it was resolved through a wildcard.
    pub fn create(&self, name: &str, parameters: Value) -> FilterResult<Box<dyn StreamFilter>> {
        let factory = self.resolve(name).ok_or_else(|| FilterError::NotFound {
            name: name.to_string(),
        })?;

        let mut filter = factory();
        filter.set_name(name.to_string());
        filter.set_parameters(parameters);
        Ok(filter)
    }

    fn resolve(&self, name: &str) -> Option<&FilterFactory> {
        if let Some(factory) = self.factories.get(name) {
            return Some(factory);
        }

        let mut prefix = name;
        while let Some(dot) = prefix.rfind('.') {
            prefix = &prefix[..dot];
            if let Some(factory) = self.factories.get(&format!("{prefix}.*")) {
                return Some(factory);
            }
        }
        None
    }
}
