use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::graph::DependencyGraph;

/// Default time a built graph stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
struct Generation {
    graph: Arc<DependencyGraph>,
    built: Instant,
}

/// Holds the current graph generation and decides when it must be rebuilt.
///
/// Readers clone the `Arc` of a complete generation and keep it as long as they
/// like. A rebuild happens under a single-writer lock and replaces the pointer in
/// one step, so no reader ever sees a partially built graph. Generations are
/// replaced wholesale, never patched.
pub struct GraphCache {
    ttl: Duration,
    current: RwLock<Option<Generation>>,
    build_lock: Mutex<()>,
}

impl GraphCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: RwLock::new(None),
            build_lock: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The current generation, fresh or stale, without building.
    pub fn current(&self) -> Option<Arc<DependencyGraph>> {
        self.read_generation().map(|g| g.graph)
    }

    /// The current generation if it is younger than the TTL.
    pub fn fresh(&self) -> Option<Arc<DependencyGraph>> {
        self.read_generation()
            .filter(|g| g.built.elapsed() < self.ttl)
            .map(|g| g.graph)
    }

    /// Return the cached graph when fresh and `force` is false; otherwise run
    /// `build` and install its result as the new generation.
    ///
    /// A failed build leaves the previous generation in place.
    pub fn get_or_build<F>(&self, force: bool, build: F) -> Result<Arc<DependencyGraph>>
    where
        F: FnOnce() -> Result<DependencyGraph>,
    {
        // Fast path: no write lock, no I/O.
        if !force && let Some(graph) = self.fresh() {
            tracing::debug!("graph cache hit");
            return Ok(graph);
        }

        let _writer = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have rebuilt while we waited for the writer lock.
        if !force && let Some(graph) = self.fresh() {
            tracing::debug!("graph rebuilt by a concurrent caller");
            return Ok(graph);
        }

        tracing::debug!(force, "rebuilding dependency graph");
        let graph = Arc::new(build()?);
        let generation = Generation {
            graph: Arc::clone(&graph),
            built: Instant::now(),
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(generation);

        Ok(graph)
    }

    /// Drop the current generation; the next `get_or_build` rebuilds.
    pub fn invalidate(&self) {
        let _writer = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn read_generation(&self) -> Option<Generation> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
