//! Marker-driven method interception.
//!
//! A bean whose type marks at least one method with [`Marker::Benchmark`] is
//! handed out wrapped in a [`BeanProxy`]. Calls to marked methods through the
//! proxy are timed, and each call produces a [`TimingRecord`] that goes to the
//! `ferrous_ioc::benchmark` tracing target and to every registered observer.
//! Calls to unmarked methods are forwarded untouched.
//!
//! The proxy reaches the instance through capability traits. A capability
//! that should stay timed is implemented for `BeanProxy` by routing each
//! method through [`BeanProxy::intercept`] on the target's view:
//!
//! ```rust
//! use ferrous_ioc::BeanProxy;
//!
//! pub trait Repository: Send + Sync {
//!     fn calculate(&self) -> f64;
//!     fn describe(&self) -> String;
//! }
//!
//! impl Repository for BeanProxy {
//!     fn calculate(&self) -> f64 {
//!         let target = self.target_view::<dyn Repository>();
//!         self.intercept("calculate", || target.calculate())
//!     }
//!
//!     fn describe(&self) -> String {
//!         let target = self.target_view::<dyn Repository>();
//!         self.intercept("describe", || target.describe())
//!     }
//! }
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::LogLevel;
use crate::descriptors::AnyArc;
use crate::error::{DiError, DiResult};
use crate::instance::{Bean, CallArgs, Value};
use crate::observer::Observers;

/// Tracing target of timing records.
pub const BENCHMARK_TARGET: &str = "ferrous_ioc::benchmark";

/// Annotation attached to a method in a bean type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Marker {
    /// Time every call made through the bean's proxy.
    Benchmark,
}

/// Wall-clock duration of one intercepted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingRecord {
    pub bean: String,
    pub method: String,
    pub elapsed: Duration,
}

impl TimingRecord {
    /// Elapsed time in whole microseconds, truncated.
    pub fn elapsed_micros(&self) -> u128 {
        self.elapsed.as_micros()
    }
}

impl fmt::Display for TimingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Method {} has worked for {} µs",
            self.method,
            self.elapsed_micros()
        )
    }
}

/// Timing proxy around a bean with marked methods.
///
/// The proxy keeps the target's capabilities: every capability the target
/// type registers can also be obtained from the proxy's [`Bean`] handle.
pub struct BeanProxy {
    target: Bean,
    intercepted: Vec<&'static str>,
    target_views: HashMap<TypeId, AnyArc>,
    observers: Observers,
    level: LogLevel,
}

impl BeanProxy {
    pub(crate) fn new(target: Bean, observers: Observers, level: LogLevel) -> Self {
        let bean_type = target.bean_type();
        let mut intercepted: Vec<&'static str> = Vec::new();
        for method in bean_type.marked_methods(Marker::Benchmark) {
            if !intercepted.contains(&method.name()) {
                intercepted.push(method.name());
            }
        }
        let target_views = bean_type
            .capabilities()
            .iter()
            .filter_map(|view| {
                (view.from_instance)(target.instance_object()).map(|erased| (view.type_id, erased))
            })
            .collect();

        Self {
            target,
            intercepted,
            target_views,
            observers,
            level,
        }
    }

    /// The wrapped bean.
    pub fn target(&self) -> &Bean {
        &self.target
    }

    pub fn bean_name(&self) -> &str {
        self.target.name()
    }

    /// Names of the methods this proxy times.
    pub fn intercepted_methods(&self) -> &[&'static str] {
        &self.intercepted
    }

    pub fn is_intercepted(&self, method: &str) -> bool {
        self.intercepted.iter().any(|m| *m == method)
    }

    /// The target viewed as the capability `C`, bypassing interception.
    ///
    /// Fails with `TypeMismatch` if the target type does not register `C`.
    pub fn try_target_view<C: ?Sized + Send + Sync + 'static>(&self) -> DiResult<&C> {
        match self
            .target_views
            .get(&TypeId::of::<C>())
            .and_then(|erased| (**erased).downcast_ref::<Arc<C>>())
        {
            Some(view) => Ok(&**view),
            None => Err(DiError::TypeMismatch {
                bean: self.bean_name().to_string(),
                requested: std::any::type_name::<C>(),
            }),
        }
    }

    /// Like [`try_target_view`](Self::try_target_view), for use inside
    /// capability impls on `BeanProxy`.
    ///
    /// # Panics
    ///
    /// Panics if the target type does not register the capability `C`. Proxy
    /// views only exist for registered capabilities, so this indicates a
    /// capability implemented for `BeanProxy` but missing from the type
    /// descriptor.
    pub fn target_view<C: ?Sized + Send + Sync + 'static>(&self) -> &C {
        match self.try_target_view::<C>() {
            Ok(view) => view,
            Err(err) => panic!("{}", err),
        }
    }

    /// Runs `call`, timing it if `method` is marked.
    pub fn intercept<R>(&self, method: &str, call: impl FnOnce() -> R) -> R {
        if self.is_intercepted(method) {
            self.timed(method, call)
        } else {
            call()
        }
    }

    /// Reflective call through the proxy; marked methods are timed.
    pub fn invoke(&self, method: &str, args: CallArgs) -> DiResult<Value> {
        if self.is_intercepted(method) {
            self.timed(method, || self.target.invoke_direct(method, args))
        } else {
            self.target.invoke_direct(method, args)
        }
    }

    fn timed<R>(&self, method: &str, call: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = call();
        let record = TimingRecord {
            bean: self.bean_name().to_string(),
            method: method.to_string(),
            elapsed: start.elapsed(),
        };
        emit_timing(self.level, &record);
        self.observers.method_timed(&record);
        result
    }
}

impl fmt::Debug for BeanProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanProxy")
            .field("target", &self.target)
            .field("intercepted", &self.intercepted)
            .field("level", &self.level)
            .finish()
    }
}

fn emit_timing(level: LogLevel, record: &TimingRecord) {
    let micros = record.elapsed_micros() as u64;
    match level {
        LogLevel::Trace => tracing::trace!(target: BENCHMARK_TARGET, bean = %record.bean, method = %record.method, elapsed_us = micros, "{}", record),
        LogLevel::Debug => tracing::debug!(target: BENCHMARK_TARGET, bean = %record.bean, method = %record.method, elapsed_us = micros, "{}", record),
        LogLevel::Info => tracing::info!(target: BENCHMARK_TARGET, bean = %record.bean, method = %record.method, elapsed_us = micros, "{}", record),
        LogLevel::Warn => tracing::warn!(target: BENCHMARK_TARGET, bean = %record.bean, method = %record.method, elapsed_us = micros, "{}", record),
        LogLevel::Error => tracing::error!(target: BENCHMARK_TARGET, bean = %record.bean, method = %record.method, elapsed_us = micros, "{}", record),
    }
}

/// Wraps `bean` in a timing proxy if its type marks any method.
pub(crate) fn wrap_if_marked(bean: Bean, observers: &Observers, level: LogLevel) -> Bean {
    if !bean.bean_type().is_marked(Marker::Benchmark) {
        return bean;
    }
    let proxy = BeanProxy::new(bean, observers.clone(), level);
    tracing::debug!(
        bean = proxy.bean_name(),
        methods = ?proxy.intercepted_methods(),
        "wrapping bean in timing proxy"
    );
    observers.wrapped(proxy.bean_name(), proxy.intercepted_methods());
    Bean::proxy(proxy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::BeanType;
    use crate::error::BoxError;
    use crate::observer::TimingCollector;

    struct Adder {
        base: i64,
    }

    trait Add: Send + Sync {
        fn add(&self, n: i64) -> i64;
        fn base(&self) -> i64;
    }

    impl Add for Adder {
        fn add(&self, n: i64) -> i64 {
            self.base + n
        }

        fn base(&self) -> i64 {
            self.base
        }
    }

    impl Add for BeanProxy {
        fn add(&self, n: i64) -> i64 {
            let target = self.target_view::<dyn Add>();
            self.intercept("add", || target.add(n))
        }

        fn base(&self) -> i64 {
            let target = self.target_view::<dyn Add>();
            self.intercept("base", || target.base())
        }
    }

    fn adder_type() -> Arc<BeanType> {
        Arc::new(
            BeanType::of::<Adder>()
                .default_constructor(|| Adder { base: 40 })
                .method_with_args("add", 1, |a: &Adder, mut args: CallArgs| {
                    let n: i64 = args.take(0)?;
                    Ok::<i64, BoxError>(a.add(n))
                })
                .marked(Marker::Benchmark)
                .method("base", |a: &Adder| a.base)
                .capability::<dyn Add>(|a| a as Arc<dyn Add>, |p| p as Arc<dyn Add>)
                .build(),
        )
    }

    fn wrapped(collector: Arc<TimingCollector>) -> Bean {
        let mut observers = Observers::new();
        observers.add(collector);
        let bean = Bean::instance("adder", adder_type(), Arc::new(Adder { base: 40 }));
        wrap_if_marked(bean, &observers, LogLevel::Debug)
    }

    #[test]
    fn test_marked_calls_are_timed() {
        let collector = Arc::new(TimingCollector::new());
        let bean = wrapped(collector.clone());
        assert!(bean.is_proxy());

        let add = bean.capability::<dyn Add>().unwrap();
        assert_eq!(add.add(2), 42);
        assert_eq!(add.base(), 40);

        let records = collector.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bean, "adder");
        assert_eq!(records[0].method, "add");
    }

    #[test]
    fn test_reflective_invoke_through_proxy() {
        let collector = Arc::new(TimingCollector::new());
        let bean = wrapped(collector.clone());
        let value = bean.invoke("add", CallArgs::new().with(1i64)).unwrap();
        assert_eq!(*value.downcast::<i64>().unwrap(), 41);
        let value = bean.invoke("base", CallArgs::new()).unwrap();
        assert_eq!(*value.downcast::<i64>().unwrap(), 40);
        assert_eq!(collector.records_for("add").len(), 1);
        assert!(collector.records_for("base").is_empty());
    }

    #[test]
    fn test_unmarked_type_is_not_wrapped() {
        let ty = Arc::new(
            BeanType::of::<Adder>()
                .default_constructor(|| Adder { base: 1 })
                .method("base", |a: &Adder| a.base)
                .build(),
        );
        let bean = Bean::instance("adder", ty, Arc::new(Adder { base: 1 }));
        let same = wrap_if_marked(bean.clone(), &Observers::new(), LogLevel::Info);
        assert!(!same.is_proxy());
        assert!(Bean::ptr_eq(&bean, &same));
    }

    #[test]
    fn test_downcast_unwraps_proxy() {
        let bean = wrapped(Arc::new(TimingCollector::new()));
        assert_eq!(bean.downcast::<Adder>().unwrap().base, 40);
    }

    trait Unregistered: Send + Sync {}

    #[test]
    fn test_try_target_view_reports_missing_capability() {
        let bean = wrapped(Arc::new(TimingCollector::new()));
        let proxy = bean.as_proxy().unwrap();
        assert_eq!(proxy.try_target_view::<dyn Add>().unwrap().base(), 40);
        match proxy.try_target_view::<dyn Unregistered>() {
            Err(DiError::TypeMismatch { bean, requested }) => {
                assert_eq!(bean, "adder");
                assert!(requested.contains("Unregistered"));
            }
            Ok(_) => panic!("expected TypeMismatch"),
            Err(other) => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "cannot be viewed as")]
    fn test_target_view_panics_on_missing_capability() {
        let bean = wrapped(Arc::new(TimingCollector::new()));
        bean.as_proxy().unwrap().target_view::<dyn Unregistered>();
    }

    #[test]
    fn test_timing_record_display() {
        let record = TimingRecord {
            bean: "repoBean".to_string(),
            method: "calculate".to_string(),
            elapsed: Duration::from_nanos(12_999),
        };
        assert_eq!(record.elapsed_micros(), 12);
        assert_eq!(record.to_string(), "Method calculate has worked for 12 µs");
    }
}
