//! di-impl 的集中集成测试

use core_common::{ComponentDescriptor, ComponentKey, DependencyError};
use di_abstractions::{ComponentRegistry, ContainerConfig};
use di_impl::{ComponentRegistryImpl, DiContainer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

trait Repository: Send + Sync {
    fn table(&self) -> &str;
}

#[derive(Debug)]
struct MemoryRepository;

impl Repository for MemoryRepository {
    fn table(&self) -> &str {
        "memory"
    }
}

trait Service: Send + Sync {
    fn repository(&self) -> &Arc<dyn Repository>;
}

struct DefaultService {
    repository: Arc<dyn Repository>,
}

impl Service for DefaultService {
    fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }
}

fn repository(counter: Arc<AtomicUsize>) -> ComponentDescriptor {
    ComponentDescriptor::builder::<dyn Repository, MemoryRepository>().construct_with(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        let repository: Arc<dyn Repository> = Arc::new(MemoryRepository);
        Ok(repository)
    })
}

fn service() -> ComponentDescriptor {
    ComponentDescriptor::builder::<dyn Service, DefaultService>()
        .depends_on::<dyn Repository>()
        .construct_with(|deps| {
            let service: Arc<dyn Service> = Arc::new(DefaultService {
                repository: deps.get::<dyn Repository>(0)?,
            });
            Ok(service)
        })
}

#[tokio::test]
async fn test_singleton_shared_between_lookup_and_injection() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let container = DiContainer::builder()
        .register(service())
        .register(repository(Arc::clone(&constructed)))
        .build()
        .unwrap();

    let service = container.get::<dyn Service>().unwrap();
    let again = container.get::<dyn Service>().unwrap();
    let repository = container.get::<dyn Repository>().unwrap();

    assert!(Arc::ptr_eq(&service, &again));
    assert!(Arc::ptr_eq(service.repository(), &repository));
    assert_eq!(repository.table(), "memory");
    assert_eq!(constructed.load(Ordering::SeqCst), 1);

    let stats = container.stats();
    assert_eq!(stats.registered_components, 2);
    assert_eq!(stats.active_singletons, 2);
    assert_eq!(stats.constructions, 2);
}

#[tokio::test]
async fn test_register_after_close_leaves_registry_unchanged() {
    let registry = Arc::new(ComponentRegistryImpl::new());
    registry
        .register(repository(Arc::new(AtomicUsize::new(0))))
        .unwrap();
    let container = DiContainer::from_registry(Arc::clone(&registry)).unwrap();

    let error = registry.register(service()).unwrap_err();
    assert!(matches!(error, DependencyError::RegistrationClosed { .. }));
    assert_eq!(container.component_names(), vec!["memoryRepository"]);
    assert!(!container.contains(&ComponentKey::of::<dyn Service>()));
}

trait Alpha: Send + Sync {}
trait Beta: Send + Sync {}

struct AlphaImpl;
impl Alpha for AlphaImpl {}

struct BetaImpl;
impl Beta for BetaImpl {}

fn alpha() -> ComponentDescriptor {
    ComponentDescriptor::builder::<dyn Alpha, AlphaImpl>()
        .depends_on::<dyn Beta>()
        .construct_with(|deps| {
            deps.get::<dyn Beta>(0)?;
            let alpha: Arc<dyn Alpha> = Arc::new(AlphaImpl);
            Ok(alpha)
        })
}

fn beta() -> ComponentDescriptor {
    ComponentDescriptor::builder::<dyn Beta, BetaImpl>()
        .depends_on::<dyn Alpha>()
        .construct_with(|deps| {
            deps.get::<dyn Alpha>(0)?;
            let beta: Arc<dyn Beta> = Arc::new(BetaImpl);
            Ok(beta)
        })
}

/// 关闭静态环检测，只依靠解析期检测
fn runtime_cycle_config() -> ContainerConfig {
    ContainerConfig {
        check_cycles_on_close: false,
        ..ContainerConfig::default()
    }
}

#[tokio::test]
async fn test_circular_dependency_is_reported_and_nothing_cached() {
    let container = DiContainer::builder()
        .with_config(runtime_cycle_config())
        .register(alpha())
        .register(beta())
        .register(repository(Arc::new(AtomicUsize::new(0))))
        .build()
        .unwrap();

    match container.get::<dyn Alpha>().err().unwrap() {
        DependencyError::CircularDependency { chain } => {
            assert_eq!(
                chain,
                vec!["Alpha[alphaImpl]", "Beta[betaImpl]", "Alpha[alphaImpl]"]
            );
        }
        other => panic!("期望循环依赖错误, 实际: {other}"),
    }

    let stats = container.stats();
    assert_eq!(stats.active_singletons, 0);
    assert_eq!(stats.constructions, 0);
    assert_eq!(stats.resolution_errors, 1);

    // 无关组件不受影响
    assert!(container.get::<dyn Repository>().is_ok());
    assert!(container.get::<dyn Beta>().err().unwrap().is_circular());
}

#[tokio::test]
async fn test_validate_reports_cycles_and_missing_dependencies() {
    let container = DiContainer::builder()
        .with_config(runtime_cycle_config())
        .register(alpha())
        .register(beta())
        .register(service())
        .build()
        .unwrap();

    let errors = container.validate().unwrap_err();
    assert!(errors.iter().any(DependencyError::is_circular));
    assert!(errors
        .iter()
        .any(|e| matches!(e, DependencyError::UnresolvedDependency { .. })));
}

#[tokio::test]
async fn test_validate_on_close_rejects_cyclic_graph() {
    let error = DiContainer::builder()
        .with_config(ContainerConfig {
            validate_on_close: true,
            ..ContainerConfig::default()
        })
        .register(alpha())
        .register(beta())
        .register(service())
        .build()
        .unwrap_err();

    // 循环依赖和缺失依赖一并返回
    let errors = error.errors();
    assert!(errors.iter().any(DependencyError::is_circular));
    assert!(errors
        .iter()
        .any(|e| matches!(e, DependencyError::UnresolvedDependency { .. })));
}

#[tokio::test]
async fn test_build_rejects_cyclic_graph_by_default() {
    let error = DiContainer::builder()
        .register(alpha())
        .register(beta())
        .register(service())
        .build()
        .unwrap_err();

    match error {
        DependencyError::ValidationFailed { errors } => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].is_circular());
        }
        other => panic!("期望验证失败, 实际: {other}"),
    }
}

#[tokio::test]
async fn test_failed_construction_is_not_cached() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let container = DiContainer::builder()
        .register(
            ComponentDescriptor::builder::<dyn Repository, MemoryRepository>().construct_with(
                move |_| {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        return Err(DependencyError::creation_failed(
                            "Repository",
                            "连接尚未就绪",
                        ));
                    }
                    let repository: Arc<dyn Repository> = Arc::new(MemoryRepository);
                    Ok(repository)
                },
            ),
        )
        .build()
        .unwrap();

    let error = container.get::<dyn Repository>().err().unwrap();
    assert!(matches!(error, DependencyError::ComponentCreationFailed { .. }));
    assert_eq!(container.stats().active_singletons, 0);

    let first = container.get::<dyn Repository>().unwrap();
    let second = container.get::<dyn Repository>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(container.stats().constructions, 1);
}

#[tokio::test]
async fn test_depth_limit_stops_long_chains() {
    let container = DiContainer::builder()
        .with_config(ContainerConfig {
            max_resolution_depth: 1,
            ..ContainerConfig::default()
        })
        .register(service())
        .register(repository(Arc::new(AtomicUsize::new(0))))
        .build()
        .unwrap();

    let error = container.get::<dyn Service>().err().unwrap();
    assert!(matches!(
        error,
        DependencyError::ResolutionDepthExceeded { max_depth: 1, .. }
    ));
    assert!(container.get::<dyn Repository>().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_constructs_once() {
    init_tracing();

    const CALLERS: usize = 16;
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructed);
    let container = DiContainer::builder()
        .register(
            ComponentDescriptor::builder::<dyn Repository, MemoryRepository>().construct_with(
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(50));
                    let repository: Arc<dyn Repository> = Arc::new(MemoryRepository);
                    Ok(repository)
                },
            ),
        )
        .register(service())
        .build()
        .unwrap();

    let barrier = Arc::new(Barrier::new(CALLERS));
    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let container = container.clone();
            let barrier = Arc::clone(&barrier);
            tokio::task::spawn_blocking(move || {
                barrier.wait();
                container.get::<dyn Service>()
            })
        })
        .collect();

    let mut services = Vec::with_capacity(CALLERS);
    for handle in handles {
        services.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(services.iter().all(|s| Arc::ptr_eq(s, &services[0])));
    assert_eq!(container.stats().constructions, 2);
}

trait Slow: Send + Sync {}
struct SlowImpl;
impl Slow for SlowImpl {}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_construction_does_not_block_other_keys() -> anyhow::Result<()> {
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let release_rx = Mutex::new(release_rx);

    let container = DiContainer::builder()
        .register(
            ComponentDescriptor::builder::<dyn Slow, SlowImpl>().construct_with(move |_| {
                let _ = started_tx.lock().unwrap().send(());
                release_rx
                    .lock()
                    .unwrap()
                    .recv_timeout(Duration::from_secs(5))
                    .map_err(|e| DependencyError::creation_failed("Slow", e))?;
                let slow: Arc<dyn Slow> = Arc::new(SlowImpl);
                Ok(slow)
            }),
        )
        .register(repository(Arc::new(AtomicUsize::new(0))))
        .build()?;

    let slow_container = container.clone();
    let slow = tokio::task::spawn_blocking(move || slow_container.get::<dyn Slow>().map(|_| ()));

    started_rx.recv_timeout(Duration::from_secs(5))?;

    // 慢组件仍在构造中，其他组件可以正常解析
    let other = container.clone();
    let repository = tokio::task::spawn_blocking(move || other.get::<dyn Repository>()).await??;
    assert_eq!(repository.table(), "memory");

    release_tx.send(())?;
    slow.await??;
    assert_eq!(container.stats().active_singletons, 2);
    Ok(())
}
