//! Resolution: load every listed file in order and merge it over the result.
//!
//! With `reload = false` the first successful result is kept in an
//! [`ArcSwapOption`] and handed out to every later caller without touching
//! the file system. The initial computation runs under a mutex so concurrent
//! first resolutions produce exactly one result.

use super::document;
use super::merge::{MergedConfig, merge_into};
use super::source::{FileSpec, SourceSpec, Subpath};
use crate::error::ResolveError;
use arc_swap::ArcSwapOption;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use tracing::{debug, info};

/// Process-wide resolvers keyed by spec identity.
static SHARED: LazyLock<Mutex<HashMap<SourceSpec, Arc<Resolver>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Counters describing how often a resolver actually hit the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveStats {
    /// Full load-and-merge passes started.
    pub loads: u64,
    /// Calls answered from the cache.
    pub cache_hits: u64,
}

pub struct Resolver {
    spec: SourceSpec,
    cached: ArcSwapOption<MergedConfig>,
    /// Held while computing the cached value.
    init: Mutex<()>,
    loads: AtomicU64,
    cache_hits: AtomicU64,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("spec", &self.spec)
            .field("cached", &self.cached.load().is_some())
            .field("stats", &self.stats())
            .finish()
    }
}

impl Resolver {
    pub fn new(spec: SourceSpec) -> Self {
        Self {
            spec,
            cached: ArcSwapOption::empty(),
            init: Mutex::new(()),
            loads: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    /// The process-wide resolver for `spec`.
    ///
    /// Equal specs get the same resolver, so a non-reloading spec is read
    /// from disk at most once per process no matter how many consumers
    /// declare it.
    pub fn shared(spec: SourceSpec) -> Arc<Self> {
        let mut shared = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            shared
                .entry(spec)
                .or_insert_with_key(|spec| Arc::new(Resolver::new(spec.clone()))),
        )
    }

    pub fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    pub fn stats(&self) -> ResolveStats {
        ResolveStats {
            loads: self.loads.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }

    /// Produce the merged mapping according to the reload policy.
    ///
    /// Failures are never cached: a failed first resolution is retried on
    /// the next call.
    pub fn resolve(&self) -> Result<Arc<MergedConfig>, ResolveError> {
        if self.spec.reload {
            debug!(files = self.spec.files.len(), "Reloading configuration files");
            return self.load().map(Arc::new);
        }

        if let Some(merged) = self.cached.load_full() {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(merged);
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(merged) = self.cached.load_full() {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(merged);
        }

        debug!(
            files = self.spec.files.len(),
            "Loading configuration files, result will be reused"
        );
        let merged = Arc::new(self.load()?);
        self.cached.store(Some(Arc::clone(&merged)));
        Ok(merged)
    }

    /// Run a full load-and-merge pass, ignoring the cache.
    pub fn load(&self) -> Result<MergedConfig, ResolveError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        load_files(&self.spec.files)
    }
}

/// Load and merge `files` in order, stopping at the first failure.
pub fn load_files(files: &[FileSpec]) -> Result<MergedConfig, ResolveError> {
    if files.is_empty() {
        return Err(ResolveError::EmptySpec);
    }

    let mut merged = MergedConfig::new();
    let mut loaded = 0usize;

    for (index, file) in files.iter().enumerate() {
        let subpath = file
            .subpath
            .as_deref()
            .map(Subpath::parse)
            .transpose()
            .map_err(|reason| ResolveError::InvalidSubpath {
                index,
                path: file.path.clone(),
                subpath: file.subpath.clone().unwrap_or_default(),
                reason,
            })?;

        if !file.required && !file.path.is_file() {
            debug!(index, path = %file.path.display(), "Skipping missing optional file");
            continue;
        }

        debug!(index, path = %file.path.display(), "Loading configuration file");
        let document = document::load_extracted(&file.path, subpath.as_ref())
            .map_err(|source| ResolveError::Load { index, source })?;

        merge_into(&mut merged, document);
        loaded += 1;
    }

    info!(
        listed = files.len(),
        loaded,
        keys = merged.len(),
        "Merged configuration files"
    );
    Ok(merged)
}
