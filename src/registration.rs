//! Bean registry: the source of bean names and their definitions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptors::BeanType;
use crate::error::{DiError, DiResult};

/// A bean name bound to the type descriptor it is built from.
#[derive(Clone)]
pub struct BeanDefinition {
    name: String,
    bean_type: Arc<BeanType>,
}

impl BeanDefinition {
    pub fn new(name: impl Into<String>, bean_type: impl Into<BeanType>) -> Self {
        Self::shared(name, Arc::new(bean_type.into()))
    }

    /// Binds `name` to a descriptor that may also back other names.
    pub fn shared(name: impl Into<String>, bean_type: Arc<BeanType>) -> Self {
        Self {
            name: name.into(),
            bean_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bean_type(&self) -> &Arc<BeanType> {
        &self.bean_type
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("type_name", &self.bean_type.type_name())
            .finish()
    }
}

/// Source of bean names and definitions.
///
/// Implementations may be backed by anything, but must answer consistently:
/// the names listed by [`bean_names`](BeanRegistry::bean_names) are the names
/// [`definition_for`](BeanRegistry::definition_for) can resolve. The container
/// reports duplicate names in a listing as `DuplicateDefinition`.
pub trait BeanRegistry: Send + Sync {
    /// All declared bean names, in declaration order.
    fn bean_names(&self) -> DiResult<Vec<String>>;

    /// The definition registered under `name`, or `NotFound`.
    fn definition_for(&self, name: &str) -> DiResult<BeanDefinition>;
}

impl<R: BeanRegistry + ?Sized> BeanRegistry for Arc<R> {
    fn bean_names(&self) -> DiResult<Vec<String>> {
        (**self).bean_names()
    }

    fn definition_for(&self, name: &str) -> DiResult<BeanDefinition> {
        (**self).definition_for(name)
    }
}

/// Fails with `DuplicateDefinition` on the first name seen twice.
pub(crate) fn ensure_unique(names: &[String]) -> DiResult<()> {
    let mut seen = std::collections::HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(DiError::DuplicateDefinition(name.clone()));
        }
    }
    Ok(())
}

/// Immutable registry built by [`RegistryBuilder`].
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{BeanRegistry, BeanType, RegistryBuilder};
///
/// struct RepoBean;
///
/// let registry = RegistryBuilder::new()
///     .register("repoBean", BeanType::of::<RepoBean>().default_constructor(|| RepoBean))
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.bean_names().unwrap(), vec!["repoBean".to_string()]);
/// assert!(registry.definition_for("other").is_err());
/// ```
pub struct StaticRegistry {
    names: Vec<String>,
    definitions: HashMap<String, BeanDefinition>,
}

impl StaticRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Definitions in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = &BeanDefinition> + '_ {
        self.names.iter().filter_map(move |name| self.definitions.get(name))
    }
}

impl BeanRegistry for StaticRegistry {
    fn bean_names(&self) -> DiResult<Vec<String>> {
        Ok(self.names.clone())
    }

    fn definition_for(&self, name: &str) -> DiResult<BeanDefinition> {
        self.definitions
            .get(name)
            .cloned()
            .ok_or_else(|| DiError::NotFound(name.to_string()))
    }
}

impl fmt::Debug for StaticRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticRegistry")
            .field("names", &self.names)
            .finish()
    }
}

/// Collects bean definitions in declaration order.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<BeanDefinition>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the bean `name`, built from `bean_type`.
    pub fn register(mut self, name: impl Into<String>, bean_type: impl Into<BeanType>) -> Self {
        self.entries.push(BeanDefinition::new(name, bean_type));
        self
    }

    /// Declares the bean `name` over a shared descriptor.
    pub fn register_shared(mut self, name: impl Into<String>, bean_type: Arc<BeanType>) -> Self {
        self.entries.push(BeanDefinition::shared(name, bean_type));
        self
    }

    pub fn register_definition(mut self, definition: BeanDefinition) -> Self {
        self.entries.push(definition);
        self
    }

    /// Validates the declarations and freezes them.
    ///
    /// Fails with `DuplicateDefinition` when a name is declared twice and
    /// with `InvalidDefinition` for an empty name.
    pub fn build(self) -> DiResult<StaticRegistry> {
        let names: Vec<String> = self.entries.iter().map(|d| d.name.clone()).collect();
        if names.iter().any(|n| n.is_empty()) {
            return Err(DiError::InvalidDefinition {
                bean: String::new(),
                reason: "bean name must not be empty".to_string(),
            });
        }
        ensure_unique(&names)?;

        let definitions = self
            .entries
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Ok(StaticRegistry { names, definitions })
    }
}
