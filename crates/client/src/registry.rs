//! Lazy, memoized registry of domain API modules.
//!
//! The registry maps a unique module name to the module instance bound to
//! one client. Entries are created on first access and live until an
//! explicit [`ModuleRegistry::clear`]. Each module is a concrete type
//! behind the small [`ApiModule`] capability surface; typed access goes
//! through [`ModuleRegistry::get_or_create`] with a downcast.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::config::ApiVersion;

/// Capability surface every domain module exposes to generic callers.
pub trait ApiModule: Send + Sync + 'static {
    /// Unique registry name of the module.
    fn name(&self) -> &'static str;

    /// API version the module's endpoints live under.
    fn version(&self) -> ApiVersion;

    fn as_any(&self) -> &dyn Any;
}

/// Name-keyed module map owned by the orchestrator.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Mutex<BTreeMap<String, Arc<dyn ApiModule>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized module registered under `name`, creating it via
    /// `factory` on first access.
    pub fn get_or_create<M, F>(&self, name: &str, factory: F) -> M
    where
        M: ApiModule + Clone,
        F: FnOnce() -> M,
    {
        let mut modules = self.lock();

        if let Some(existing) = modules.get(name) {
            if let Some(module) = existing.as_any().downcast_ref::<M>() {
                return module.clone();
            }
            warn!(module = name, "registered module has unexpected type, replacing");
        }

        debug!(module = name, "registering api module");
        let module = factory();
        modules.insert(name.to_string(), Arc::new(module.clone()));
        module
    }

    /// Look up a registered module by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ApiModule>> {
        self.lock().get(name).cloned()
    }

    /// Whether a module is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Names of all registered modules, sorted.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// All registered modules.
    pub fn all(&self) -> Vec<Arc<dyn ApiModule>> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every registered module. Intended for tests that need a clean
    /// registry; production code has no reason to call this.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Arc<dyn ApiModule>>> {
        match self.modules.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("module registry lock poisoned");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Clone)]
    struct FakeModule {
        tag: u32,
    }

    impl ApiModule for FakeModule {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn version(&self) -> ApiVersion {
            ApiVersion::V2
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn factory_runs_once_per_name() {
        let registry = ModuleRegistry::new();
        let created = AtomicU32::new(0);

        let first = registry.get_or_create("fake", || {
            created.fetch_add(1, Ordering::SeqCst);
            FakeModule { tag: 7 }
        });
        let second = registry.get_or_create("fake", || {
            created.fetch_add(1, Ordering::SeqCst);
            FakeModule { tag: 99 }
        });

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(first.tag, 7);
        assert_eq!(second.tag, 7);
    }

    #[test]
    fn lookup_and_enumeration() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains("fake"));
        assert!(registry.get("fake").is_none());

        registry.get_or_create("fake", || FakeModule { tag: 1 });

        assert!(registry.contains("fake"));
        assert_eq!(registry.names(), vec!["fake".to_string()]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.all().len(), 1);
        assert_eq!(registry.get("fake").map(|m| m.name()), Some("fake"));
    }

    #[test]
    fn clear_empties_the_registry() {
        let registry = ModuleRegistry::new();
        registry.get_or_create("fake", || FakeModule { tag: 1 });

        registry.clear();

        assert!(registry.is_empty());
        assert!(!registry.contains("fake"));
    }
}
