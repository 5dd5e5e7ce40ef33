use ferrous_ioc::{
    BeanType, CallArgs, Container, ContainerOptions, DiError, LogLevel, Marker, RegistryBuilder,
    TimingCollector,
};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

mod common;
use common::{repository_registry, sum_of_identities, Counters, RepoBean, RepoBeanInterface};

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn timed_container(options: ContainerOptions) -> (Container, Arc<TimingCollector>) {
    let counters = Counters::new();
    let collector = Arc::new(TimingCollector::new());
    let container = Container::builder(repository_registry(&counters))
        .options(options)
        .observer(collector.clone())
        .build();
    (container, collector)
}

#[test]
fn test_intercepted_result_matches_direct_call() {
    let (container, collector) = timed_container(ContainerOptions::default());

    let repo = container
        .get_capability::<dyn RepoBeanInterface>("repoBean")
        .unwrap();
    let direct = RepoBean::default().calculate();
    assert_eq!(repo.calculate(), direct);
    assert_eq!(direct, sum_of_identities());

    let records = collector.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bean, "repoBean");
    assert_eq!(records[0].method, "calculate");
}

#[test]
fn test_unmarked_method_is_forwarded_untimed() {
    let (container, collector) = timed_container(ContainerOptions::default());
    let repo = container
        .get_capability::<dyn RepoBeanInterface>("repoBean")
        .unwrap();
    assert_eq!(repo.label(), "repo");
    assert!(collector.records().is_empty());
}

#[test]
fn test_every_call_produces_a_record() {
    let (container, collector) = timed_container(ContainerOptions::default());
    let repo = container
        .get_capability::<dyn RepoBeanInterface>("repoBean")
        .unwrap();
    for _ in 0..3 {
        repo.calculate();
    }
    assert_eq!(collector.records_for("calculate").len(), 3);
}

#[test]
fn test_reflective_invoke_is_timed() {
    let (container, collector) = timed_container(ContainerOptions::default());
    let bean = container.get_bean("repoBean").unwrap();

    let value = bean.invoke("calculate", CallArgs::new()).unwrap();
    assert_eq!(*value.downcast::<f64>().unwrap(), sum_of_identities());

    let label = bean.invoke("label", CallArgs::new()).unwrap();
    assert_eq!(*label.downcast::<String>().unwrap(), "repo");

    assert!(matches!(
        bean.invoke("calculate", CallArgs::new().with(1u8)),
        Err(DiError::ArityMismatch { expected: 0, actual: 1, .. })
    ));
    assert_eq!(collector.records_for("calculate").len(), 1);
    assert!(collector.records_for("label").is_empty());
}

#[test]
fn test_injected_dependency_keeps_interception() {
    let (container, collector) = timed_container(ContainerOptions::default());
    let with_param = container.get_bean("repoBeanWithParam").unwrap();
    let concrete = with_param
        .downcast::<common::RepoBeanWithParam>()
        .unwrap();

    concrete.repo_bean().calculate();
    let records = collector.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bean, "repoBean");
}

#[test]
fn test_timing_record_is_logged_on_benchmark_target() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let (container, _) = timed_container(ContainerOptions::default());
        let repo = container
            .get_capability::<dyn RepoBeanInterface>("repoBean")
            .unwrap();
        repo.calculate();
    });

    let output = logs.contents();
    assert!(output.contains(ferrous_ioc::BENCHMARK_TARGET), "{}", output);
    assert!(output.contains("Method calculate has worked for"), "{}", output);
    assert!(output.contains("elapsed_us"), "{}", output);
}

#[test]
fn test_timing_level_is_configurable() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let options = ContainerOptions::new().with_timing_log_level(LogLevel::Debug);
        let (container, collector) = timed_container(options);
        let repo = container
            .get_capability::<dyn RepoBeanInterface>("repoBean")
            .unwrap();
        repo.calculate();
        // Observers see the record whatever the level
        assert_eq!(collector.records().len(), 1);
    });

    assert!(!logs.contents().contains("has worked for"));
}

#[test]
fn test_capability_without_proxy_view_is_invalid_for_marked_type() {
    trait Plain: Send + Sync {}
    struct Timed;
    impl Plain for Timed {}

    let registry = RegistryBuilder::new()
        .register(
            "timed",
            BeanType::of::<Timed>()
                .default_constructor(|| Timed)
                .method("work", |_: &Timed| 1u8)
                .marked(Marker::Benchmark)
                .plain_capability::<dyn Plain>(|t| t as Arc<dyn Plain>),
        )
        .build()
        .unwrap();
    let container = Container::new(registry);
    assert!(matches!(
        container.get_bean("timed"),
        Err(DiError::InvalidDefinition { .. })
    ));
}
