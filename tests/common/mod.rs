//! Repository fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ferrous_ioc::{BeanProxy, BeanType, DiError, Marker, Param, RegistryBuilder, StaticRegistry};

pub trait RepoBeanInterface: Send + Sync {
    fn calculate(&self) -> f64;
    fn label(&self) -> String;
}

impl RepoBeanInterface for BeanProxy {
    fn calculate(&self) -> f64 {
        let target = self.target_view::<dyn RepoBeanInterface>();
        self.intercept("calculate", || target.calculate())
    }

    fn label(&self) -> String {
        let target = self.target_view::<dyn RepoBeanInterface>();
        self.intercept("label", || target.label())
    }
}

pub fn sum_of_identities() -> f64 {
    let mut sum = 0.0_f64;
    for _ in 0..100 {
        let x = sum;
        sum += x.sin().powi(2) + x.cos().powi(2);
    }
    sum
}

#[derive(Default)]
pub struct RepoBean {
    inits: AtomicUsize,
}

impl RepoBean {
    pub fn init(&self) {
        self.inits.fetch_add(1, Ordering::SeqCst);
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }
}

impl RepoBeanInterface for RepoBean {
    fn calculate(&self) -> f64 {
        sum_of_identities()
    }

    fn label(&self) -> String {
        "repo".to_string()
    }
}

pub struct RepoBeanWithParam {
    repo_bean: Arc<dyn RepoBeanInterface>,
}

impl RepoBeanWithParam {
    pub fn repo_bean(&self) -> &Arc<dyn RepoBeanInterface> {
        &self.repo_bean
    }
}

impl RepoBeanInterface for RepoBeanWithParam {
    fn calculate(&self) -> f64 {
        sum_of_identities()
    }

    fn label(&self) -> String {
        format!("with-param({})", self.repo_bean.label())
    }
}

/// `RepoBean` descriptor; `constructed` counts constructor runs.
pub fn repo_bean_type(constructed: Arc<AtomicUsize>) -> BeanType {
    BeanType::of::<RepoBean>()
        .default_constructor(move || {
            constructed.fetch_add(1, Ordering::SeqCst);
            RepoBean::default()
        })
        .method("init", RepoBean::init)
        .method("calculate", |bean: &RepoBean| bean.calculate())
        .marked(Marker::Benchmark)
        .method("label", |bean: &RepoBean| bean.label())
        .capability::<dyn RepoBeanInterface>(
            |bean| bean as Arc<dyn RepoBeanInterface>,
            |proxy| proxy as Arc<dyn RepoBeanInterface>,
        )
        .build()
}

/// `RepoBeanWithParam` descriptor; `constructed` counts constructor runs.
pub fn repo_bean_with_param_type(constructed: Arc<AtomicUsize>) -> BeanType {
    BeanType::of::<RepoBeanWithParam>()
        .constructor(vec![Param::of::<RepoBean>()], move |args| {
            constructed.fetch_add(1, Ordering::SeqCst);
            Ok::<_, DiError>(RepoBeanWithParam {
                repo_bean: args.capability::<dyn RepoBeanInterface>(0)?,
            })
        })
        .method("calculate", |bean: &RepoBeanWithParam| bean.calculate())
        .marked(Marker::Benchmark)
        .method("label", |bean: &RepoBeanWithParam| bean.label())
        .capability::<dyn RepoBeanInterface>(
            |bean| bean as Arc<dyn RepoBeanInterface>,
            |proxy| proxy as Arc<dyn RepoBeanInterface>,
        )
        .build()
}

pub struct Counters {
    pub repo_bean: Arc<AtomicUsize>,
    pub repo_bean_with_param: Arc<AtomicUsize>,
}

impl Counters {
    pub fn new() -> Self {
        Self {
            repo_bean: Arc::new(AtomicUsize::new(0)),
            repo_bean_with_param: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// `{"repoBean", "repoBeanWithParam"}` in that order.
pub fn repository_registry(counters: &Counters) -> StaticRegistry {
    RegistryBuilder::new()
        .register("repoBean", repo_bean_type(counters.repo_bean.clone()))
        .register(
            "repoBeanWithParam",
            repo_bean_with_param_type(counters.repo_bean_with_param.clone()),
        )
        .build()
        .expect("repository registry is valid")
}

/// True if both handles point at the same allocation.
pub fn same_object<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
