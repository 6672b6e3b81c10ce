//! Agent registry
//!
//! The registry is built once at startup and shared immutably across
//! every session. Turn handling only reads it, so sessions never
//! contend on agent lookup.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Agent, AgentKind, CoordinatorAgent, SpecialistAgent};

/// Immutable lookup table from catalog variant to implementation
pub struct AgentRegistry {
    agents: HashMap<AgentKind, Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Empty registry, for tests that inject their own agents
    pub fn new() -> Self {
        Self { agents: HashMap::new() }
    }

    /// Registry with a built-in implementation for every catalog entry
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in AgentKind::ALL {
            let agent: Arc<dyn Agent> = match kind {
                AgentKind::Coordinator => Arc::new(CoordinatorAgent),
                other => Arc::new(SpecialistAgent::new(other)),
            };
            registry.register(agent);
        }
        registry
    }

    /// Register an implementation under its own kind, replacing any
    /// previous entry for that kind
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.kind(), agent);
    }

    /// Look up the implementation for a catalog variant
    pub fn get(&self, kind: AgentKind) -> Option<Arc<dyn Agent>> {
        self.agents.get(&kind).cloned()
    }

    /// Number of registered implementations
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_cover_catalog() {
        let registry = AgentRegistry::with_builtins();
        assert_eq!(registry.len(), AgentKind::ALL.len());
        for kind in AgentKind::ALL {
            let agent = registry.get(kind).expect("missing builtin");
            assert_eq!(agent.kind(), kind);
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = AgentRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(SpecialistAgent::new(AgentKind::Financial)));
        registry.register(Arc::new(SpecialistAgent::new(AgentKind::Financial)));
        assert_eq!(registry.len(), 1);
    }
}
