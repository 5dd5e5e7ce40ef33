/// Concurrent access integration tests
///
/// These tests verify that concurrent first requests build each bean exactly
/// once and that every thread observes the same instance.

use ferrous_ioc::{Bean, BeanType, Container, DiError, Param, RegistryBuilder, TimingCollector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

mod common;
use common::{repository_registry, same_object, Counters, RepoBeanInterface, RepoBeanWithParam};

const THREADS: usize = 16;

#[test]
fn test_concurrent_first_requests_build_once() {
    let counters = Counters::new();
    let container = Container::new(repository_registry(&counters));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                // Half the threads start from the dependent bean
                let name = if i % 2 == 0 { "repoBeanWithParam" } else { "repoBean" };
                container.get_bean(name).unwrap()
            })
        })
        .collect();

    let beans: Vec<Bean> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(counters.repo_bean.load(Ordering::SeqCst), 1);
    assert_eq!(counters.repo_bean_with_param.load(Ordering::SeqCst), 1);

    let repo = container.get_bean("repoBean").unwrap();
    let with_param = container.get_bean("repoBeanWithParam").unwrap();
    for bean in &beans {
        let expected = if bean.name() == "repoBean" { &repo } else { &with_param };
        assert!(Bean::ptr_eq(bean, expected));
    }
}

#[test]
fn test_slow_constructor_is_shared_by_waiting_threads() {
    struct Slow;

    let constructed = Arc::new(AtomicUsize::new(0));
    let constructed_clone = constructed.clone();
    let registry = RegistryBuilder::new()
        .register(
            "slow",
            BeanType::of::<Slow>().default_constructor(move || {
                constructed_clone.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                Slow
            }),
        )
        .build()
        .unwrap();
    let container = Container::new(registry);
    let barrier = Arc::new(Barrier::new(THREADS));

    let instances: Vec<Arc<Slow>> = (0..THREADS)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                container.get_bean_as::<Slow>("slow").unwrap()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn test_concurrent_intercepted_calls_are_all_recorded() {
    let counters = Counters::new();
    let collector = Arc::new(TimingCollector::new());
    let container = Container::builder(repository_registry(&counters))
        .observer(collector.clone())
        .build();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let repo = container
                    .get_capability::<dyn RepoBeanInterface>("repoBean")
                    .unwrap();
                repo.calculate()
            })
        })
        .collect();

    let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(collector.records_for("calculate").len(), THREADS);
}

#[test]
fn test_dependents_built_on_different_threads_share_dependency() {
    struct Consumer {
        repo: Arc<dyn RepoBeanInterface>,
    }

    let counters = Counters::new();
    let registry = RegistryBuilder::new()
        .register("repoBean", common::repo_bean_type(counters.repo_bean.clone()))
        .register(
            "repoBeanWithParam",
            common::repo_bean_with_param_type(counters.repo_bean_with_param.clone()),
        )
        .register(
            "consumer",
            BeanType::of::<Consumer>().constructor(vec![Param::of::<common::RepoBean>()], |args| {
                Ok::<_, DiError>(Consumer {
                    repo: args.capability::<dyn RepoBeanInterface>(0)?,
                })
            }),
        )
        .build()
        .unwrap();
    let container = Container::new(registry);

    let c1 = container.clone();
    let c2 = container.clone();
    let t1 = thread::spawn(move || c1.get_bean_as::<RepoBeanWithParam>("repoBeanWithParam").unwrap());
    let t2 = thread::spawn(move || c2.get_bean_as::<Consumer>("consumer").unwrap());
    let with_param = t1.join().unwrap();
    let consumer = t2.join().unwrap();

    assert!(same_object(with_param.repo_bean(), &consumer.repo));
    assert_eq!(counters.repo_bean.load(Ordering::SeqCst), 1);
}
