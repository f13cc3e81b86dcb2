use std::sync::Arc;

use parking_lot::RwLock;

use crate::graph::KnowledgeGraph;

/// Shared slot for the current knowledge graph.
///
/// Readers take a snapshot (`Arc` clone) and drop the lock before doing any
/// work; a reload swaps in a freshly built graph with a single write. Graphs are
/// never mutated in place, so in-flight requests keep a consistent view.
#[derive(Debug, Clone, Default)]
pub struct GraphHandle {
    inner: Arc<RwLock<Option<Arc<KnowledgeGraph>>>>,
}

impl GraphHandle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_graph(graph: KnowledgeGraph) -> Self {
        let handle = Self::empty();
        handle.replace(graph);
        handle
    }

    /// Current graph, or `None` when nothing has been loaded.
    pub fn snapshot(&self) -> Option<Arc<KnowledgeGraph>> {
        self.inner.read().clone()
    }

    /// Installs `graph`, returning the previous one.
    pub fn replace(&self, graph: KnowledgeGraph) -> Option<Arc<KnowledgeGraph>> {
        let next = Arc::new(graph);
        self.inner.write().replace(next)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }
}
