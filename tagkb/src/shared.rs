//! The process-wide "current index".
//!
//! Readers take a cheap `Arc` snapshot and query it without holding any lock.
//! A reload builds a complete new index first and only then swaps the
//! reference, so no reader ever sees a half-built trie.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use prefix_tags::PrefixTagIndex;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::LoadError;
use crate::record::load_index;

/// Atomically replaceable handle to a [`PrefixTagIndex`].
pub struct SharedIndex {
    current: RwLock<Arc<PrefixTagIndex>>,
    /// Bumped on every successful swap
    generation: AtomicU64,
}

impl SharedIndex {
    /// Publishes `index` as the initial generation.
    pub fn new(index: PrefixTagIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
            generation: AtomicU64::new(0),
        }
    }

    /// Loads the knowledge base named by `config`.
    pub fn load(config: &Config) -> Result<Self, LoadError> {
        Ok(Self::new(load_index(config)?))
    }

    /// Snapshot of the currently published index.
    pub fn current(&self) -> Arc<PrefixTagIndex> {
        self.current.read().clone()
    }

    /// Looks `addr` up in the current index.
    pub fn lookup(&self, addr: u32) -> Vec<String> {
        self.current()
            .lookup(addr)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Publishes a fully built index and returns the one it replaced.
    pub fn replace(&self, index: PrefixTagIndex) -> Arc<PrefixTagIndex> {
        self.publish(index).1
    }

    /// Rebuilds from the knowledge base and swaps the result in, returning
    /// the generation it was published as.
    ///
    /// On failure the current index stays published.
    pub fn reload(&self, config: &Config) -> Result<u64, LoadError> {
        match load_index(config) {
            Ok(index) => Ok(self.publish(index).0),
            Err(err) => {
                warn!(
                    path = %config.knowledge_base.display(),
                    error = %err,
                    "knowledge base reload failed, keeping current index"
                );
                Err(err)
            }
        }
    }

    /// Swaps `index` in and bumps the generation under the same write lock,
    /// so a reader holding the lock never sees one without the other.
    fn publish(&self, index: PrefixTagIndex) -> (u64, Arc<PrefixTagIndex>) {
        let new = Arc::new(index);
        let mut current = self.current.write();
        let old = std::mem::replace(&mut *current, new);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        drop(current);
        info!(generation, "published new prefix tag index");
        (generation, old)
    }

    /// Number of swaps since creation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Snapshot of the current index together with its generation.
    pub fn current_with_generation(&self) -> (u64, Arc<PrefixTagIndex>) {
        let current = self.current.read();
        (self.generation(), current.clone())
    }
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new(PrefixTagIndex::default())
    }
}
