//! The bean container.
//!
//! This module contains the [`Container`] type: it lists and builds beans
//! from a [`BeanRegistry`] and caches each bean once built.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, ReentrantMutex};

use crate::aop;
use crate::config::ContainerOptions;
use crate::error::{DiError, DiResult};
use crate::instance::Bean;
use crate::internal::{current_depth, ResolutionGuard};
use crate::lifecycle;
use crate::observer::{BeanObserver, Observers};
use crate::registration::{ensure_unique, BeanDefinition, BeanRegistry};

mod resolver;

/// Name-based bean container.
///
/// Beans are built on first request, together with everything their
/// constructor depends on, and cached for the container's lifetime. A failed
/// build caches nothing, so a later request retries.
///
/// # Thread Safety
///
/// `Container` is `Send + Sync` and cheap to clone (it uses `Arc` internally).
/// Concurrent first requests for the same name build the bean once; every
/// caller gets the same instance.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{BeanType, Container, Param, RegistryBuilder};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let registry = RegistryBuilder::new()
///     .register(
///         "database",
///         BeanType::of::<Database>()
///             .default_constructor(|| Database { url: "postgres://localhost".to_string() }),
///     )
///     .register(
///         "userService",
///         BeanType::of::<UserService>()
///             .constructor(vec![Param::of::<Database>()], |args| {
///                 Ok::<_, ferrous_ioc::DiError>(UserService { db: args.get::<Database>(0)? })
///             }),
///     )
///     .build()
///     .unwrap();
///
/// let container = Container::new(registry);
/// let users = container.get_bean_as::<UserService>("userService").unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
///
/// let db = container.get_bean_as::<Database>("database").unwrap();
/// assert!(Arc::ptr_eq(&users.db, &db));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    registry: Arc<dyn BeanRegistry>,
    beans: Mutex<HashMap<String, Bean>>,
    // Held for the whole of a build. Reentrant so a cycle on one thread runs
    // into the depth budget; other threads wait for the build to finish.
    creation_lock: ReentrantMutex<()>,
    observers: Observers,
    options: ContainerOptions,
}

/// Builder for a [`Container`] with options and observers.
pub struct ContainerBuilder {
    registry: Arc<dyn BeanRegistry>,
    observers: Observers,
    options: ContainerOptions,
}

impl ContainerBuilder {
    /// Replaces the options. A depth budget of 0 is raised to 1.
    pub fn options(mut self, mut options: ContainerOptions) -> Self {
        if options.max_resolution_depth == 0 {
            tracing::warn!("max_resolution_depth must be at least 1; using 1");
            options.max_resolution_depth = 1;
        }
        self.options = options;
        self
    }

    /// Adds an observer notified of lifecycle and timing events.
    pub fn observer(mut self, observer: Arc<dyn BeanObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn build(self) -> Container {
        Container {
            inner: Arc::new(ContainerInner {
                registry: self.registry,
                beans: Mutex::new(HashMap::new()),
                creation_lock: ReentrantMutex::new(()),
                observers: self.observers,
                options: self.options,
            }),
        }
    }
}

impl Container {
    /// Creates a container over `registry` with default options.
    pub fn new<R: BeanRegistry + 'static>(registry: R) -> Self {
        Self::builder(registry).build()
    }

    pub fn builder<R: BeanRegistry + 'static>(registry: R) -> ContainerBuilder {
        Self::builder_shared(Arc::new(registry))
    }

    /// Builder over a registry shared with other owners.
    pub fn builder_shared(registry: Arc<dyn BeanRegistry>) -> ContainerBuilder {
        ContainerBuilder {
            registry,
            observers: Observers::new(),
            options: ContainerOptions::default(),
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Declared bean names, in declaration order.
    ///
    /// Fails with `DuplicateDefinition` if the registry declares a name twice.
    pub fn list_bean_names(&self) -> DiResult<Vec<String>> {
        let names = self.inner.registry.bean_names()?;
        ensure_unique(&names)?;
        Ok(names)
    }

    /// The bean named `name`, building and caching it on first request.
    ///
    /// Errors from dependencies propagate unchanged, so the error's bean name
    /// points at the bean that actually failed.
    pub fn get_bean(&self, name: &str) -> DiResult<Bean> {
        if let Some(bean) = self.cached(name) {
            return Ok(bean);
        }

        // Unknown names never reach the cache
        let definition = self.inner.registry.definition_for(name)?;
        let _guard = ResolutionGuard::enter(name, self.inner.options.max_resolution_depth)?;

        let _creation = self.inner.creation_lock.lock();
        if let Some(bean) = self.cached(name) {
            return Ok(bean);
        }

        match self.create_bean(&definition) {
            Ok(bean) => {
                self.inner
                    .beans
                    .lock()
                    .insert(name.to_string(), bean.clone());
                Ok(bean)
            }
            Err(err) => {
                tracing::warn!(bean = name, kind = err.kind(), error = %err, "bean creation failed");
                self.inner.observers.creation_failed(name, &err);
                Err(err)
            }
        }
    }

    /// The bean named `name` as its concrete type.
    pub fn get_bean_as<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        self.get_bean(name)?.downcast::<T>()
    }

    /// The bean named `name` viewed as the capability `C`.
    pub fn get_capability<C: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<C>> {
        self.get_bean(name)?.capability::<C>()
    }

    /// True if `name` has already been built and cached.
    pub fn contains_bean(&self, name: &str) -> bool {
        self.cached(name).is_some()
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str(&format!(
            "Options: max_resolution_depth={}, timing_log_level={}\n",
            self.inner.options.max_resolution_depth, self.inner.options.timing_log_level
        ));
        s.push_str(&format!("Observers: {}\n", self.inner.observers.len()));
        s.push_str("Beans:\n");
        match self.inner.registry.bean_names() {
            Ok(names) => {
                for name in names {
                    let state = match self.cached(&name) {
                        Some(bean) if bean.is_proxy() => "built (proxied)",
                        Some(_) => "built",
                        None => "unrequested",
                    };
                    s.push_str(&format!("  {}: {}\n", name, state));
                }
            }
            Err(err) => s.push_str(&format!("  <listing failed: {}>\n", err)),
        }
        s
    }

    fn cached(&self, name: &str) -> Option<Bean> {
        self.inner.beans.lock().get(name).cloned()
    }

    fn create_bean(&self, definition: &BeanDefinition) -> DiResult<Bean> {
        let name = definition.name();
        let bean_type = definition.bean_type();

        let constructor = bean_type.sole_constructor(name)?;
        bean_type.check_interceptable(name)?;

        tracing::debug!(
            bean = name,
            type_name = bean_type.type_name(),
            depth = current_depth(),
            "creating bean"
        );
        self.inner.observers.creating(name);
        let start = Instant::now();

        let args = resolver::resolve_arguments(self, name, constructor)?;
        let object = resolver::instantiate(name, constructor, &args)?;
        let bean = Bean::instance(name, bean_type.clone(), object);

        lifecycle::invoke_init(&bean, &self.inner.observers)?;
        let bean = aop::wrap_if_marked(bean, &self.inner.observers, self.inner.options.timing_log_level);

        let elapsed = start.elapsed();
        tracing::debug!(bean = name, proxied = bean.is_proxy(), ?elapsed, "bean created");
        self.inner.observers.created(name, elapsed, bean.is_proxy());
        Ok(bean)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("options", &self.inner.options)
            .field("cached", &self.inner.beans.lock().len())
            .field("observers", &self.inner.observers.len())
            .finish()
    }
}
