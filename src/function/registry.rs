//! Registry of viewer functions available to the local runtime.

use crate::function::handler::{FunctionError, ViewerFunction};
use crate::http::ViewerRequest;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::info;

struct FunctionEntry {
    function: Arc<dyn ViewerFunction>,
    invocations: AtomicU64,
}

/// Registry mapping function names to viewer function implementations.
///
/// Functions are stateless and synchronous, so entries are registered once
/// and invoked concurrently without further coordination. Invocation counts
/// are the only mutable state and feed the runtime's status endpoint.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: RwLock<HashMap<String, FunctionEntry>>,
}

impl FunctionRegistry {
    /// Create a new function registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under its own name.
    pub fn register(&self, function: Arc<dyn ViewerFunction>) -> Result<(), FunctionError> {
        let name = function.name().to_string();
        let mut functions = self
            .functions
            .write()
            .map_err(|_| FunctionError::new("function registry lock poisoned"))?;

        if functions.contains_key(&name) {
            return Err(FunctionError::new(format!(
                "function '{}' is already registered",
                name
            )));
        }

        functions.insert(
            name.clone(),
            FunctionEntry {
                function,
                invocations: AtomicU64::new(0),
            },
        );
        info!("registered function: {}", name);
        Ok(())
    }

    /// Invoke a registered function on a viewer request.
    pub fn invoke(
        &self,
        name: &str,
        request: ViewerRequest,
    ) -> Result<ViewerRequest, FunctionError> {
        let functions = self
            .functions
            .read()
            .map_err(|_| FunctionError::new("function registry lock poisoned"))?;

        let entry = functions
            .get(name)
            .ok_or_else(|| FunctionError::new(format!("function '{}' not found", name)))?;

        entry.invocations.fetch_add(1, Ordering::Relaxed);
        entry.function.handle(request)
    }

    /// Invocation count for a function, if registered.
    pub fn invocations(&self, name: &str) -> Option<u64> {
        let functions = self.functions.read().ok()?;
        functions
            .get(name)
            .map(|entry| entry.invocations.load(Ordering::Relaxed))
    }

    /// List registered functions with their invocation counts.
    pub fn list(&self) -> Vec<(String, u64)> {
        match self.functions.read() {
            Ok(functions) => {
                let mut entries: Vec<_> = functions
                    .iter()
                    .map(|(name, entry)| {
                        (name.clone(), entry.invocations.load(Ordering::Relaxed))
                    })
                    .collect();
                entries.sort();
                entries
            }
            Err(_) => Vec::new(),
        }
    }
}
