//! Method name to operation lookup for transport frames.

use std::collections::HashMap;
use std::sync::Arc;

use crate::operation::Operation;

/// A registered operation and how it is invoked.
#[derive(Clone)]
pub struct CatalogEntry {
    /// The operation.
    pub operation: Arc<dyn Operation>,
    /// Whether invocations receive a progress callback.
    pub progress: bool,
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("identity", &self.operation.identity())
            .field("params", &self.operation.params().len())
            .field("progress", &self.progress)
            .finish()
    }
}

/// Registry of operations keyed by their wire method name.
#[derive(Clone, Debug, Default)]
pub struct OperationCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl OperationCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain operation under `method`. Replaces any previous entry.
    pub fn register(&mut self, method: impl Into<String>, op: impl Operation) {
        let _ = self.entries.insert(
            method.into(),
            CatalogEntry {
                operation: Arc::new(op),
                progress: false,
            },
        );
    }

    /// Register an operation whose invocations get a progress callback.
    pub fn register_with_progress(&mut self, method: impl Into<String>, op: impl Operation) {
        let _ = self.entries.insert(
            method.into(),
            CatalogEntry {
                operation: Arc::new(op),
                progress: true,
            },
        );
    }

    /// Look up a method.
    pub fn get(&self, method: &str) -> Option<&CatalogEntry> {
        self.entries.get(method)
    }

    /// Whether `method` is registered.
    pub fn has_method(&self, method: &str) -> bool {
        self.entries.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no methods are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InvocationContext;
    use crate::operation::operation;

    async fn ping(_ctx: InvocationContext) -> String {
        "pong".into()
    }

    async fn upload(_ctx: InvocationContext, _path: String) {}

    #[test]
    fn empty_catalog() {
        let c = OperationCatalog::new();
        assert!(c.is_empty());
        assert!(c.get("Ping").is_none());
        assert!(!c.has_method("Ping"));
    }

    #[test]
    fn register_and_lookup() {
        let mut c = OperationCatalog::new();
        c.register("Ping", operation(ping));
        c.register_with_progress("Upload", operation(upload));

        assert_eq!(c.len(), 2);
        assert!(!c.get("Ping").unwrap().progress);
        let up = c.get("Upload").unwrap();
        assert!(up.progress);
        assert_eq!(up.operation.params().len(), 1);
    }

    #[test]
    fn methods_sorted() {
        let mut c = OperationCatalog::new();
        c.register("Zeta", operation(ping));
        c.register("Alpha", operation(ping));
        c.register("Mid", operation(ping));
        assert_eq!(c.methods(), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn register_replaces() {
        let mut c = OperationCatalog::new();
        c.register("Ping", operation(ping));
        c.register_with_progress("Ping", operation(ping));
        assert_eq!(c.len(), 1);
        assert!(c.get("Ping").unwrap().progress);
    }
}
