//! Bean handles and argument containers.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::aop::BeanProxy;
use crate::descriptors::{AnyArc, BeanType};
use crate::error::{BoxError, DiError, DiResult, MessageError};

/// Type-erased value passed to or returned from a reflective call.
pub type Value = Box<dyn Any + Send>;

/// Positional arguments for [`Bean::invoke`].
///
/// ```rust
/// use ferrous_ioc::CallArgs;
///
/// let mut args = CallArgs::new().with(2u32).with("two".to_string());
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.take::<u32>(0).unwrap(), 2);
/// assert_eq!(args.take::<String>(1).unwrap(), "two");
/// assert!(args.take::<u32>(0).is_err());
/// ```
#[derive(Default)]
pub struct CallArgs {
    values: Vec<Option<Value>>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument.
    pub fn with<A: Any + Send>(mut self, value: A) -> Self {
        self.push(value);
        self
    }

    pub fn push<A: Any + Send>(&mut self, value: A) {
        self.values.push(Some(Box::new(value)));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Moves the argument at `index` out as an `A`.
    ///
    /// Fails if the index is out of range, the argument was already taken, or
    /// it has a different type. A mistyped argument stays in place.
    pub fn take<A: Any>(&mut self, index: usize) -> Result<A, BoxError> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or_else(|| MessageError(format!("no argument at position {}", index)))?;
        let value = slot
            .take()
            .ok_or_else(|| MessageError(format!("argument {} was already taken", index)))?;
        match value.downcast::<A>() {
            Ok(typed) => Ok(*typed),
            Err(original) => {
                *slot = Some(original);
                Err(MessageError(format!(
                    "argument {} is not a {}",
                    index,
                    std::any::type_name::<A>()
                ))
                .into())
            }
        }
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }
}

impl fmt::Debug for CallArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallArgs").field("len", &self.values.len()).finish()
    }
}

/// Resolved constructor arguments, one bean per declared parameter.
pub struct Args {
    bean: String,
    beans: Vec<Bean>,
}

impl Args {
    pub(crate) fn new(bean: impl Into<String>, beans: Vec<Bean>) -> Self {
        Self {
            bean: bean.into(),
            beans,
        }
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }

    /// The bean resolved for the parameter at `index`.
    pub fn bean(&self, index: usize) -> DiResult<&Bean> {
        self.beans.get(index).ok_or_else(|| DiError::ArityMismatch {
            bean: self.bean.clone(),
            method: "constructor".to_string(),
            expected: self.beans.len(),
            actual: index + 1,
        })
    }

    /// The argument at `index` as its concrete type.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        self.bean(index)?.downcast::<T>()
    }

    /// The argument at `index` viewed as the capability `C`.
    ///
    /// Keeps interception in place when the argument is a proxy.
    pub fn capability<C: ?Sized + Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<C>> {
        self.bean(index)?.capability::<C>()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bean> {
        self.beans.iter()
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("bean", &self.bean)
            .field("beans", &self.beans)
            .finish()
    }
}

enum BeanObject {
    Instance(AnyArc),
    Proxy(Arc<BeanProxy>),
}

struct BeanInner {
    name: String,
    bean_type: Arc<BeanType>,
    object: BeanObject,
}

/// Handle to a constructed bean: either the instance itself or a timing proxy
/// around it.
///
/// Handles are cheap to clone. Two handles obtained for the same name from the
/// same container refer to the same object; see [`Bean::ptr_eq`].
#[derive(Clone)]
pub struct Bean {
    inner: Arc<BeanInner>,
}

impl Bean {
    pub(crate) fn instance(name: impl Into<String>, bean_type: Arc<BeanType>, object: AnyArc) -> Self {
        Self {
            inner: Arc::new(BeanInner {
                name: name.into(),
                bean_type,
                object: BeanObject::Instance(object),
            }),
        }
    }

    pub(crate) fn proxy(proxy: BeanProxy) -> Self {
        let name = proxy.bean_name().to_string();
        let bean_type = proxy.target().inner.bean_type.clone();
        Self {
            inner: Arc::new(BeanInner {
                name,
                bean_type,
                object: BeanObject::Proxy(Arc::new(proxy)),
            }),
        }
    }

    /// Name the bean was registered under.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Runtime type descriptor of the underlying instance.
    pub fn bean_type(&self) -> &BeanType {
        &self.inner.bean_type
    }

    pub fn is_proxy(&self) -> bool {
        matches!(self.inner.object, BeanObject::Proxy(_))
    }

    pub fn as_proxy(&self) -> Option<&Arc<BeanProxy>> {
        match &self.inner.object {
            BeanObject::Proxy(proxy) => Some(proxy),
            BeanObject::Instance(_) => None,
        }
    }

    /// True if both handles refer to the same bean object.
    pub fn ptr_eq(a: &Bean, b: &Bean) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// The underlying instance as its concrete type.
    ///
    /// A proxy is unwrapped, so the result bypasses interception.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.instance_object()
            .clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch {
                bean: self.inner.name.clone(),
                requested: std::any::type_name::<T>(),
            })
    }

    /// The bean viewed as the capability trait `C`.
    ///
    /// For a proxy the view goes through the proxy, so marked methods stay
    /// timed.
    pub fn capability<C: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<C>> {
        let mismatch = || DiError::TypeMismatch {
            bean: self.inner.name.clone(),
            requested: std::any::type_name::<C>(),
        };
        let view = self
            .bean_type()
            .capability_view(TypeId::of::<C>())
            .ok_or_else(mismatch)?;
        let erased = match &self.inner.object {
            BeanObject::Instance(object) => (view.from_instance)(object),
            BeanObject::Proxy(proxy) => view.from_proxy.as_ref().map(|f| f(proxy.clone())),
        }
        .ok_or_else(mismatch)?;
        (*erased).downcast_ref::<Arc<C>>().cloned().ok_or_else(mismatch)
    }

    /// Calls the method `method` with `args`, through the proxy if there is one.
    pub fn invoke(&self, method: &str, args: CallArgs) -> DiResult<Value> {
        match &self.inner.object {
            BeanObject::Instance(_) => self.invoke_direct(method, args),
            BeanObject::Proxy(proxy) => proxy.invoke(method, args),
        }
    }

    /// Calls `method` on the underlying instance, bypassing any proxy.
    pub(crate) fn invoke_direct(&self, method: &str, args: CallArgs) -> DiResult<Value> {
        let bean_type = self.bean_type();
        let descriptor = match bean_type.find_method(method, args.len()) {
            Some(descriptor) => descriptor,
            None => {
                return Err(match bean_type.method_named(method) {
                    Some(other) => DiError::ArityMismatch {
                        bean: self.inner.name.clone(),
                        method: method.to_string(),
                        expected: other.arity(),
                        actual: args.len(),
                    },
                    None => DiError::MethodNotFound {
                        bean: self.inner.name.clone(),
                        method: method.to_string(),
                    },
                })
            }
        };
        descriptor
            .invoke(self.instance_object(), args)
            .map_err(|source| DiError::InvocationFailure {
                bean: self.inner.name.clone(),
                method: method.to_string(),
                source: Arc::from(source),
            })
    }

    /// The instance behind this handle, looking through proxies.
    pub(crate) fn instance_object(&self) -> &AnyArc {
        match &self.inner.object {
            BeanObject::Instance(object) => object,
            BeanObject::Proxy(proxy) => proxy.target().instance_object(),
        }
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("name", &self.inner.name)
            .field("type_name", &self.inner.bean_type.type_name())
            .field("proxy", &self.is_proxy())
            .finish()
    }
}
