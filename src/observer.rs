//! Observers for bean lifecycle and timing events.
//!
//! Observers are notified synchronously from the thread that triggers the
//! event. Keep implementations lightweight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::aop::TimingRecord;
use crate::error::DiError;

/// Observer trait for container events.
///
/// Every hook has an empty default, so implementations only override what
/// they care about.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{BeanObserver, Container, RegistryBuilder};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct PrintObserver;
///
/// impl BeanObserver for PrintObserver {
///     fn created(&self, name: &str, duration: Duration, proxied: bool) {
///         println!("created {} in {:?} (proxied: {})", name, duration, proxied);
///     }
/// }
///
/// let registry = RegistryBuilder::new().build().unwrap();
/// let container = Container::builder(registry)
///     .observer(Arc::new(PrintObserver))
///     .build();
/// ```
pub trait BeanObserver: Send + Sync {
    /// Called before a bean's dependencies are resolved.
    fn creating(&self, name: &str) {
        let _ = name;
    }

    /// Called once a bean is constructed, initialized and possibly wrapped.
    fn created(&self, name: &str, duration: Duration, proxied: bool) {
        let _ = (name, duration, proxied);
    }

    /// Called when building a bean fails. Nothing is cached in that case.
    fn creation_failed(&self, name: &str, error: &DiError) {
        let _ = (name, error);
    }

    /// Called after a lifecycle hook completes.
    fn initialized(&self, name: &str, hook: &str) {
        let _ = (name, hook);
    }

    /// Called when a bean is wrapped in a timing proxy.
    fn wrapped(&self, name: &str, methods: &[&'static str]) {
        let _ = (name, methods);
    }

    /// Called after each intercepted method call.
    fn method_timed(&self, record: &TimingRecord) {
        let _ = record;
    }
}

/// Collection of observers shared by a container and its proxies.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn BeanObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn BeanObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn creating(&self, name: &str) {
        for observer in &self.observers {
            observer.creating(name);
        }
    }

    #[inline]
    pub(crate) fn created(&self, name: &str, duration: Duration, proxied: bool) {
        for observer in &self.observers {
            observer.created(name, duration, proxied);
        }
    }

    #[inline]
    pub(crate) fn creation_failed(&self, name: &str, error: &DiError) {
        for observer in &self.observers {
            observer.creation_failed(name, error);
        }
    }

    #[inline]
    pub(crate) fn initialized(&self, name: &str, hook: &str) {
        for observer in &self.observers {
            observer.initialized(name, hook);
        }
    }

    #[inline]
    pub(crate) fn wrapped(&self, name: &str, methods: &[&'static str]) {
        for observer in &self.observers {
            observer.wrapped(name, methods);
        }
    }

    #[inline]
    pub(crate) fn method_timed(&self, record: &TimingRecord) {
        for observer in &self.observers {
            observer.method_timed(record);
        }
    }
}

/// Observer that reports lifecycle events through `tracing` at INFO.
///
/// ```
/// use ferrous_ioc::{Container, RegistryBuilder, TracingObserver};
/// use std::sync::Arc;
///
/// let registry = RegistryBuilder::new().build().unwrap();
/// let container = Container::builder(registry)
///     .observer(Arc::new(TracingObserver::with_prefix("[app]")))
///     .build();
/// ```
pub struct TracingObserver {
    prefix: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-ioc]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanObserver for TracingObserver {
    fn creating(&self, name: &str) {
        tracing::info!(bean = name, "{} Creating: {}", self.prefix, name);
    }

    fn created(&self, name: &str, duration: Duration, proxied: bool) {
        tracing::info!(
            bean = name,
            proxied,
            "{} Created: {} in {:?}",
            self.prefix,
            name,
            duration
        );
    }

    fn creation_failed(&self, name: &str, error: &DiError) {
        tracing::error!(
            bean = name,
            kind = error.kind(),
            "{} FAILED {}: {}",
            self.prefix,
            name,
            error
        );
    }

    fn initialized(&self, name: &str, hook: &str) {
        tracing::info!(bean = name, hook, "{} Initialized: {}", self.prefix, name);
    }

    fn wrapped(&self, name: &str, methods: &[&'static str]) {
        tracing::info!(
            bean = name,
            "{} Wrapped: {} (intercepting {})",
            self.prefix,
            name,
            methods.join(", ")
        );
    }
}

/// Observer counting bean creations and failures.
#[derive(Default)]
pub struct CreationMetrics {
    created: AtomicU64,
    failed: AtomicU64,
    proxied: AtomicU64,
    total_creation_time: AtomicU64,
}

impl CreationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Beans built successfully.
    pub fn created_count(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Failed build attempts.
    pub fn failure_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Beans that ended up behind a timing proxy.
    pub fn proxied_count(&self) -> u64 {
        self.proxied.load(Ordering::Relaxed)
    }

    /// Total creation time, dependencies included.
    pub fn total_creation_time(&self) -> Duration {
        Duration::from_nanos(self.total_creation_time.load(Ordering::Relaxed))
    }

    pub fn reset(&self) {
        self.created.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.proxied.store(0, Ordering::Relaxed);
        self.total_creation_time.store(0, Ordering::Relaxed);
    }
}

impl BeanObserver for CreationMetrics {
    fn created(&self, _name: &str, duration: Duration, proxied: bool) {
        self.created.fetch_add(1, Ordering::Relaxed);
        if proxied {
            self.proxied.fetch_add(1, Ordering::Relaxed);
        }
        self.total_creation_time
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn creation_failed(&self, _name: &str, _error: &DiError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Observer that keeps every timing record it receives.
///
/// ```
/// use ferrous_ioc::TimingCollector;
///
/// let collector = TimingCollector::new();
/// assert!(collector.records().is_empty());
/// ```
#[derive(Default)]
pub struct TimingCollector {
    records: Mutex<Vec<TimingRecord>>,
}

impl TimingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records collected so far, oldest first.
    pub fn records(&self) -> Vec<TimingRecord> {
        self.records.lock().clone()
    }

    /// Records for `method`, across all beans.
    pub fn records_for(&self, method: &str) -> Vec<TimingRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl BeanObserver for TimingCollector {
    fn method_timed(&self, record: &TimingRecord) {
        self.records.lock().push(record.clone());
    }
}
