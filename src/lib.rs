//! # ferrous-ioc
//!
//! A minimal name-based inversion-of-control container for Rust.
//!
//! ## Features
//!
//! - **Named beans**: every bean is declared under a unique name in a registry
//! - **Lazy singletons**: beans are built on first request and cached
//! - **Convention-based wiring**: a constructor parameter of type `RepoBean`
//!   is filled with the bean named `repoBean`
//! - **Lifecycle hook**: a zero-argument `init` method runs once after construction
//! - **Timing interception**: methods marked [`Marker::Benchmark`] are timed
//!   through a [`BeanProxy`]
//! - **Thread-safe**: concurrent first requests build a bean exactly once
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_ioc::{BeanType, Container, Param, RegistryBuilder};
//! use std::sync::Arc;
//!
//! struct RepoBean;
//!
//! struct ReportService {
//!     repo: Arc<RepoBean>,
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .register("repoBean", BeanType::of::<RepoBean>().default_constructor(|| RepoBean))
//!     .register(
//!         "reportService",
//!         BeanType::of::<ReportService>().constructor(vec![Param::of::<RepoBean>()], |args| {
//!             Ok::<_, ferrous_ioc::DiError>(ReportService { repo: args.get::<RepoBean>(0)? })
//!         }),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let container = Container::new(registry);
//! assert_eq!(container.list_bean_names().unwrap(), vec!["repoBean", "reportService"]);
//!
//! let report = container.get_bean_as::<ReportService>("reportService").unwrap();
//! let repo = container.get_bean_as::<RepoBean>("repoBean").unwrap();
//! assert!(Arc::ptr_eq(&report.repo, &repo));
//! ```
//!
//! ## Capabilities and Interception
//!
//! ```rust
//! use ferrous_ioc::{BeanProxy, BeanType, Container, Marker, RegistryBuilder, TimingCollector};
//! use std::sync::Arc;
//!
//! pub trait Calculator: Send + Sync {
//!     fn calculate(&self) -> f64;
//! }
//!
//! struct RepoBean;
//!
//! impl Calculator for RepoBean {
//!     fn calculate(&self) -> f64 {
//!         (0..100).map(|i| (i as f64).sin().powi(2) + (i as f64).cos().powi(2)).sum()
//!     }
//! }
//!
//! impl Calculator for BeanProxy {
//!     fn calculate(&self) -> f64 {
//!         let target = self.target_view::<dyn Calculator>();
//!         self.intercept("calculate", || target.calculate())
//!     }
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .register(
//!         "repoBean",
//!         BeanType::of::<RepoBean>()
//!             .default_constructor(|| RepoBean)
//!             .method("calculate", |bean: &RepoBean| bean.calculate())
//!             .marked(Marker::Benchmark)
//!             .capability::<dyn Calculator>(
//!                 |bean| bean as Arc<dyn Calculator>,
//!                 |proxy| proxy as Arc<dyn Calculator>,
//!             ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let timings = Arc::new(TimingCollector::new());
//! let container = Container::builder(registry).observer(timings.clone()).build();
//!
//! let calculator = container.get_capability::<dyn Calculator>("repoBean").unwrap();
//! assert!((calculator.calculate() - 100.0).abs() < 1e-9);
//! assert_eq!(timings.records_for("calculate").len(), 1);
//! ```

// Module declarations
pub mod aop;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod instance;
pub mod lifecycle;
pub mod naming;
pub mod observer;
pub mod provider;
pub mod registration;

// Internal modules
mod internal;

// Re-export core types
pub use aop::{BeanProxy, Marker, TimingRecord, BENCHMARK_TARGET};
pub use config::{ContainerOptions, LogLevel};
pub use descriptors::{BeanType, BeanTypeBuilder, Constructor, MethodDescriptor, Param};
pub use error::{BoxError, DiError, DiResult, ErrorSource, MessageError};
pub use instance::{Args, Bean, CallArgs, Value};
pub use internal::DEFAULT_MAX_DEPTH;
pub use lifecycle::INIT_HOOK;
pub use observer::{BeanObserver, CreationMetrics, TimingCollector, TracingObserver};
pub use provider::{Container, ContainerBuilder};
pub use registration::{BeanDefinition, BeanRegistry, RegistryBuilder, StaticRegistry};
