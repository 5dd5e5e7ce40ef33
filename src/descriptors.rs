//! Type descriptors for constructible bean types.
//!
//! Rust has no runtime reflection, so every bean type is described by an
//! explicit table: its constructors with their parameter types, its callable
//! members and the capability traits it can be viewed as. The container only
//! ever looks at a type through its [`BeanType`].

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::aop::{BeanProxy, Marker};
use crate::error::{BoxError, DiError, DiResult, MessageError};
use crate::instance::{Args, CallArgs, Value};
use crate::naming;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

type ConstructFn = dyn Fn(&Args) -> Result<AnyArc, BoxError> + Send + Sync;
type InvokeFn = dyn Fn(&AnyArc, CallArgs) -> Result<Value, BoxError> + Send + Sync;
type InstanceViewFn = dyn Fn(&AnyArc) -> Option<AnyArc> + Send + Sync;
type ProxyViewFn = dyn Fn(Arc<BeanProxy>) -> AnyArc + Send + Sync;

/// Declared type of a constructor parameter.
///
/// The parameter's bean name is derived from the simple name of its type;
/// see [`crate::naming`].
///
/// ```rust
/// use ferrous_ioc::Param;
///
/// struct RepoBean;
///
/// let param = Param::of::<RepoBean>();
/// assert_eq!(param.simple_name(), "RepoBean");
/// assert_eq!(param.bean_name(), "repoBean");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    type_id: TypeId,
    type_name: &'static str,
}

impl Param {
    /// Describes a parameter declared with type `P`.
    pub fn of<P: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: std::any::type_name::<P>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name, as reported by `std::any::type_name`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Unqualified type name.
    pub fn simple_name(&self) -> &'static str {
        naming::simple_type_name(self.type_name)
    }

    /// Name of the bean this parameter is wired to.
    pub fn bean_name(&self) -> String {
        naming::decapitalize(self.simple_name())
    }
}

/// A constructor of a bean type: ordered parameter list plus factory.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<Param>,
    factory: Arc<ConstructFn>,
}

impl Constructor {
    /// Parameters in positional order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn construct(&self, args: &Args) -> Result<AnyArc, BoxError> {
        (self.factory)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .finish()
    }
}

/// A callable member of a bean type.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: &'static str,
    arity: usize,
    markers: Vec<Marker>,
    invoker: Arc<InvokeFn>,
}

impl MethodDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of arguments the method takes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }

    pub(crate) fn invoke(&self, target: &AnyArc, args: CallArgs) -> Result<Value, BoxError> {
        (self.invoker)(target, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("markers", &self.markers)
            .finish()
    }
}

/// How an instance (or a proxy around it) is viewed as `Arc<dyn Capability>`.
///
/// Views produce `Arc<Arc<dyn C>>` erased to `AnyArc`, since `dyn C` has no
/// `TypeId`-checked downcast of its own.
#[derive(Clone)]
pub(crate) struct CapabilityView {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) from_instance: Arc<InstanceViewFn>,
    pub(crate) from_proxy: Option<Arc<ProxyViewFn>>,
}

/// Descriptor of a constructible bean type.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{BeanProxy, BeanType, Marker};
/// use std::sync::Arc;
///
/// pub trait Calculator: Send + Sync {
///     fn calculate(&self) -> f64;
/// }
///
/// pub struct RepoBean;
///
/// impl Calculator for RepoBean {
///     fn calculate(&self) -> f64 { 100.0 }
/// }
///
/// impl Calculator for BeanProxy {
///     fn calculate(&self) -> f64 {
///         let target = self.target_view::<dyn Calculator>();
///         self.intercept("calculate", || target.calculate())
///     }
/// }
///
/// let repo_bean = BeanType::of::<RepoBean>()
///     .default_constructor(|| RepoBean)
///     .method("calculate", |bean: &RepoBean| bean.calculate())
///     .marked(Marker::Benchmark)
///     .capability::<dyn Calculator>(
///         |bean| bean as Arc<dyn Calculator>,
///         |proxy| proxy as Arc<dyn Calculator>,
///     )
///     .build();
///
/// assert_eq!(repo_bean.simple_name(), "RepoBean");
/// assert_eq!(repo_bean.constructors().len(), 1);
/// assert!(repo_bean.is_marked(Marker::Benchmark));
/// ```
#[derive(Clone)]
pub struct BeanType {
    type_id: TypeId,
    type_name: &'static str,
    constructors: Vec<Constructor>,
    methods: Vec<MethodDescriptor>,
    capabilities: Vec<CapabilityView>,
}

impl BeanType {
    /// Starts describing the concrete type `T`.
    pub fn of<T: Send + Sync + 'static>() -> BeanTypeBuilder<T> {
        BeanTypeBuilder {
            bean_type: BeanType {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                constructors: Vec::new(),
                methods: Vec::new(),
                capabilities: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn simple_name(&self) -> &'static str {
        naming::simple_type_name(self.type_name)
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// Callable members in declaration order.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// First method declared under `name`, regardless of arity.
    pub fn method_named(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Method declared under `name` taking exactly `arity` arguments.
    pub fn find_method(&self, name: &str, arity: usize) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name && m.arity == arity)
    }

    /// Methods carrying `marker`.
    pub fn marked_methods(&self, marker: Marker) -> impl Iterator<Item = &MethodDescriptor> + '_ {
        self.methods.iter().filter(move |m| m.has_marker(marker))
    }

    /// True if any method carries `marker`.
    pub fn is_marked(&self, marker: Marker) -> bool {
        self.marked_methods(marker).next().is_some()
    }

    /// Names of the registered capability traits.
    pub fn capability_names(&self) -> Vec<&'static str> {
        self.capabilities.iter().map(|c| c.type_name).collect()
    }

    pub(crate) fn capabilities(&self) -> &[CapabilityView] {
        &self.capabilities
    }

    pub(crate) fn capability_view(&self, type_id: TypeId) -> Option<&CapabilityView> {
        self.capabilities.iter().find(|c| c.type_id == type_id)
    }

    /// The unique constructor, or `InvalidDefinition` for zero or several.
    pub(crate) fn sole_constructor(&self, bean: &str) -> DiResult<&Constructor> {
        match self.constructors.as_slice() {
            [constructor] => Ok(constructor),
            other => Err(DiError::InvalidDefinition {
                bean: bean.to_string(),
                reason: format!(
                    "{} declares {} constructors, expected exactly 1",
                    self.type_name,
                    other.len()
                ),
            }),
        }
    }

    /// A type with marked methods must be viewable through a proxy for each of
    /// its capabilities.
    pub(crate) fn check_interceptable(&self, bean: &str) -> DiResult<()> {
        if !self.is_marked(Marker::Benchmark) {
            return Ok(());
        }
        match self.capabilities.iter().find(|c| c.from_proxy.is_none()) {
            Some(view) => Err(DiError::InvalidDefinition {
                bean: bean.to_string(),
                reason: format!(
                    "{} has intercepted methods but capability {} has no proxy view",
                    self.type_name, view.type_name
                ),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanType")
            .field("type_name", &self.type_name)
            .field("constructors", &self.constructors)
            .field("methods", &self.methods)
            .field("capabilities", &self.capability_names())
            .finish()
    }
}

/// Builder for [`BeanType`] over the concrete type `T`.
pub struct BeanTypeBuilder<T> {
    bean_type: BeanType,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> BeanTypeBuilder<T> {
    /// Adds a constructor taking no parameters.
    pub fn default_constructor<F>(self, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.constructor(Vec::new(), move |_: &Args| Ok::<T, BoxError>(factory()))
    }

    /// Adds a constructor with the given parameter list.
    ///
    /// The factory receives one resolved bean per parameter, in order.
    pub fn constructor<F, E>(mut self, params: Vec<Param>, factory: F) -> Self
    where
        F: Fn(&Args) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let factory = move |args: &Args| -> Result<AnyArc, BoxError> {
            factory(args)
                .map(|value| Arc::new(value) as AnyArc)
                .map_err(Into::into)
        };
        self.bean_type.constructors.push(Constructor {
            params,
            factory: Arc::new(factory),
        });
        self
    }

    /// Adds a zero-argument method.
    pub fn method<F, R>(self, name: &'static str, f: F) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: Any + Send,
    {
        self.push_method(name, 0, move |bean: &T, _: CallArgs| Ok::<R, BoxError>(f(bean)))
    }

    /// Adds a zero-argument method that can fail.
    pub fn try_method<F, R, E>(self, name: &'static str, f: F) -> Self
    where
        F: Fn(&T) -> Result<R, E> + Send + Sync + 'static,
        R: Any + Send,
        E: Into<BoxError>,
    {
        self.push_method(name, 0, move |bean: &T, _: CallArgs| f(bean))
    }

    /// Adds a method taking `arity` arguments.
    pub fn method_with_args<F, R, E>(self, name: &'static str, arity: usize, f: F) -> Self
    where
        F: Fn(&T, CallArgs) -> Result<R, E> + Send + Sync + 'static,
        R: Any + Send,
        E: Into<BoxError>,
    {
        self.push_method(name, arity, f)
    }

    /// Attaches `marker` to the most recently declared method.
    pub fn marked(mut self, marker: Marker) -> Self {
        match self.bean_type.methods.last_mut() {
            Some(method) => {
                if !method.markers.contains(&marker) {
                    method.markers.push(marker);
                }
            }
            None => tracing::warn!(
                type_name = self.bean_type.type_name,
                ?marker,
                "marker declared before any method; ignored"
            ),
        }
        self
    }

    /// Registers the capability trait `C`, viewable from the instance and from
    /// a proxy around it.
    pub fn capability<C>(
        mut self,
        from_instance: fn(Arc<T>) -> Arc<C>,
        from_proxy: fn(Arc<BeanProxy>) -> Arc<C>,
    ) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let view = Self::view::<C>(from_instance, Some(from_proxy));
        self.push_capability(view);
        self
    }

    /// Registers the capability trait `C` for a type that is never intercepted.
    pub fn plain_capability<C>(mut self, from_instance: fn(Arc<T>) -> Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let view = Self::view::<C>(from_instance, None);
        self.push_capability(view);
        self
    }

    pub fn build(self) -> BeanType {
        self.bean_type
    }

    fn push_method<F, R, E>(mut self, name: &'static str, arity: usize, f: F) -> Self
    where
        F: Fn(&T, CallArgs) -> Result<R, E> + Send + Sync + 'static,
        R: Any + Send,
        E: Into<BoxError>,
    {
        let invoker = move |target: &AnyArc, args: CallArgs| -> Result<Value, BoxError> {
            let bean = (**target).downcast_ref::<T>().ok_or_else(|| {
                MessageError(format!("receiver is not a {}", std::any::type_name::<T>()))
            })?;
            f(bean, args)
                .map(|value| Box::new(value) as Value)
                .map_err(Into::into)
        };
        self.bean_type.methods.push(MethodDescriptor {
            name,
            arity,
            markers: Vec::new(),
            invoker: Arc::new(invoker),
        });
        self
    }

    fn push_capability(&mut self, view: CapabilityView) {
        let capabilities = &mut self.bean_type.capabilities;
        match capabilities.iter_mut().find(|c| c.type_id == view.type_id) {
            Some(existing) => *existing = view,
            None => capabilities.push(view),
        }
    }

    fn view<C>(
        from_instance: fn(Arc<T>) -> Arc<C>,
        from_proxy: Option<fn(Arc<BeanProxy>) -> Arc<C>>,
    ) -> CapabilityView
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let instance_view = move |object: &AnyArc| -> Option<AnyArc> {
            let typed = object.clone().downcast::<T>().ok()?;
            Some(Arc::new(from_instance(typed)) as AnyArc)
        };
        let proxy_view = from_proxy.map(|from_proxy| {
            Arc::new(move |proxy: Arc<BeanProxy>| Arc::new(from_proxy(proxy)) as AnyArc)
                as Arc<ProxyViewFn>
        });
        CapabilityView {
            type_id: TypeId::of::<C>(),
            type_name: std::any::type_name::<C>(),
            from_instance: Arc::new(instance_view),
            from_proxy: proxy_view,
        }
    }
}

impl<T: Send + Sync + 'static> From<BeanTypeBuilder<T>> for BeanType {
    fn from(builder: BeanTypeBuilder<T>) -> Self {
        builder.build()
    }
}
