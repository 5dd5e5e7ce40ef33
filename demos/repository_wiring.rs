//! Wires two repository beans by name and calls the timed `calculate` method.
//!
//! Run with `RUST_LOG=ferrous_ioc=debug` to also see lifecycle events.

use std::sync::Arc;

use ferrous_ioc::{
    BeanProxy, BeanType, Container, ContainerOptions, DiError, Marker, Param, RegistryBuilder,
    StaticRegistry,
};
use tracing_subscriber::EnvFilter;

pub trait RepoBeanInterface: Send + Sync {
    fn calculate(&self) -> f64;
}

fn sum_of_identities() -> f64 {
    let mut sum = 0.0_f64;
    for _ in 0..100 {
        let x = sum;
        sum += x.sin().powi(2) + x.cos().powi(2);
    }
    sum
}

pub struct RepoBean;

impl RepoBean {
    fn new() -> Self {
        println!("RepoBean was created");
        RepoBean
    }

    fn init(&self) {
        println!("RepoBean init was called");
    }
}

impl RepoBeanInterface for RepoBean {
    fn calculate(&self) -> f64 {
        sum_of_identities()
    }
}

pub struct RepoBeanWithParam {
    repo_bean: Arc<dyn RepoBeanInterface>,
}

impl RepoBeanWithParam {
    fn new(repo_bean: Arc<dyn RepoBeanInterface>) -> Self {
        println!("RepoBeanWithParam was created");
        Self { repo_bean }
    }

    fn init(&self) {
        println!("RepoBeanWithParam init was called");
    }

    pub fn repo_bean(&self) -> &Arc<dyn RepoBeanInterface> {
        &self.repo_bean
    }
}

impl RepoBeanInterface for RepoBeanWithParam {
    fn calculate(&self) -> f64 {
        sum_of_identities()
    }
}

impl RepoBeanInterface for BeanProxy {
    fn calculate(&self) -> f64 {
        let target = self.target_view::<dyn RepoBeanInterface>();
        self.intercept("calculate", || target.calculate())
    }
}

fn registry() -> Result<StaticRegistry, DiError> {
    RegistryBuilder::new()
        .register(
            "repoBean",
            BeanType::of::<RepoBean>()
                .default_constructor(RepoBean::new)
                .method("init", RepoBean::init)
                .method("calculate", |bean: &RepoBean| bean.calculate())
                .marked(Marker::Benchmark)
                .capability::<dyn RepoBeanInterface>(
                    |bean| bean as Arc<dyn RepoBeanInterface>,
                    |proxy| proxy as Arc<dyn RepoBeanInterface>,
                ),
        )
        .register(
            "repoBeanWithParam",
            BeanType::of::<RepoBeanWithParam>()
                .constructor(vec![Param::of::<RepoBean>()], |args| {
                    Ok::<_, DiError>(RepoBeanWithParam::new(
                        args.capability::<dyn RepoBeanInterface>(0)?,
                    ))
                })
                .method("init", RepoBeanWithParam::init)
                .method("calculate", |bean: &RepoBeanWithParam| bean.calculate())
                .marked(Marker::Benchmark)
                .capability::<dyn RepoBeanInterface>(
                    |bean| bean as Arc<dyn RepoBeanInterface>,
                    |proxy| proxy as Arc<dyn RepoBeanInterface>,
                ),
        )
        .build()
}

fn run() -> Result<(), DiError> {
    let options = ContainerOptions::from_env()?;
    let container = Container::builder(registry()?).options(options).build();

    println!("Beans: {:?}", container.list_bean_names()?);

    let repo_bean = container.get_capability::<dyn RepoBeanInterface>("repoBean")?;
    println!("repoBean.calculate() = {}", repo_bean.calculate());

    let with_param = container.get_bean("repoBeanWithParam")?;
    let with_param_view = with_param.capability::<dyn RepoBeanInterface>()?;
    println!("repoBeanWithParam.calculate() = {}", with_param_view.calculate());

    let concrete = with_param.downcast::<RepoBeanWithParam>()?;
    println!(
        "injected repoBean.calculate() = {}",
        concrete.repo_bean().calculate()
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ferrous_ioc::benchmark=info")),
        )
        .init();

    if let Err(err) = run() {
        eprintln!(
            "error [{}] in bean '{}': {}",
            err.kind(),
            err.bean_name().unwrap_or("<none>"),
            err
        );
        std::process::exit(1);
    }
}
