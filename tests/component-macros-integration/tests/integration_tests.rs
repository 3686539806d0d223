//! 组件宏与扫描器集成测试

use component_macros::component;
use core_common::{catalog, ComponentDescriptor, ComponentError, DependencyError, Stereotype};
use core_composition::{BootstrapConfig, ComponentScannerImpl, ContextBootstrapper, ScanConfig};
use std::sync::Arc;

pub mod greeting {
    use super::*;

    pub trait Greeter: Send + Sync {
        fn greet(&self, name: &str) -> String;
    }

    pub struct EnglishGreeter;

    impl Greeter for EnglishGreeter {
        fn greet(&self, name: &str) -> String {
            format!("Hello, {name}")
        }
    }

    #[component(provides = dyn Greeter, name = "english")]
    impl EnglishGreeter {
        pub fn new() -> Self {
            Self
        }
    }

    pub struct KoreanGreeter;

    impl Greeter for KoreanGreeter {
        fn greet(&self, name: &str) -> String {
            format!("안녕하세요, {name}")
        }
    }

    #[component(provides = dyn Greeter, name = "korean")]
    impl KoreanGreeter {
        pub fn new() -> Self {
            Self
        }
    }

    pub struct Announcer {
        pub greeter: Arc<dyn Greeter>,
    }

    #[component(stereotype = service)]
    impl Announcer {
        pub fn new(#[qualifier("korean")] greeter: Arc<dyn Greeter>) -> Self {
            Self { greeter }
        }

        pub fn announce(&self, name: &str) -> String {
            self.greeter.greet(name)
        }
    }

    pub struct GreetingSetup;

    #[component(stereotype = configuration, constructor = create)]
    impl GreetingSetup {
        pub fn create() -> Self {
            Self
        }
    }
}

pub mod storage {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static OPEN_ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

    pub struct FlakyStore;

    #[component(stereotype = repository, constructor = open)]
    impl FlakyStore {
        pub fn open() -> Result<Self, String> {
            if OPEN_ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err("存储尚未就绪".to_string());
            }
            Ok(Self)
        }
    }
}

use greeting::{Announcer, Greeter, GreetingSetup};
use storage::FlakyStore;

fn base_path(module: &str) -> String {
    format!("{}::{}", module_path!(), module)
}

#[test]
fn test_candidates_are_submitted_before_main() {
    let names: Vec<String> = catalog::candidates()
        .iter()
        .map(ComponentDescriptor::component_name)
        .collect();

    for expected in ["english", "korean", "announcer", "greetingSetup", "flakyStore"] {
        assert!(names.iter().any(|n| n == expected), "缺少候选组件 {expected}");
    }
}

#[test]
fn test_generated_descriptor_metadata() {
    let announcer = catalog::candidates()
        .into_iter()
        .find(|d| d.component_name() == "announcer")
        .unwrap();

    assert!(announcer.has_stereotype(Stereotype::Service));
    assert_eq!(announcer.dependencies().len(), 1);
    assert_eq!(announcer.dependencies()[0].qualifier(), Some("korean"));
    assert_eq!(announcer.provider().module_path, base_path("greeting"));
}

#[test]
fn test_scan_excluding_configuration_and_resolve() {
    let scanner = ComponentScannerImpl::new(base_path("greeting"))
        .exclude_stereotypes([Stereotype::Configuration]);

    let selected = scanner.scan_catalog().unwrap();
    let names: Vec<String> = selected.iter().map(ComponentDescriptor::component_name).collect();
    assert_eq!(names, vec!["announcer", "english", "korean"]);

    let container = di_impl::DiContainer::builder()
        .register_all(selected)
        .build()
        .unwrap();

    let announcer = container.get::<Announcer>().unwrap();
    let korean = container.get_named::<dyn Greeter>("korean").unwrap();
    assert!(Arc::ptr_eq(&announcer.greeter, &korean));
    assert_eq!(announcer.announce("민지"), "안녕하세요, 민지");
    assert!(container.get::<GreetingSetup>().is_err());
}

#[test]
fn test_bootstrap_from_catalog() {
    let config = BootstrapConfig {
        scan: ScanConfig {
            base_path: base_path("greeting"),
            exclude_names: vec!["english".to_string()],
            ..ScanConfig::default()
        },
        ..BootstrapConfig::default()
    };

    let container = ContextBootstrapper::new(config).bootstrap().unwrap();

    // 只剩一个 Greeter，不带名称也能解析
    let greeter = container.get::<dyn Greeter>().unwrap();
    assert_eq!(greeter.greet("Kim"), "안녕하세요, Kim");
    assert!(container.get::<GreetingSetup>().is_ok());
}

#[test]
fn test_scan_unknown_path_is_not_found() {
    let error = ComponentScannerImpl::new(base_path("billing"))
        .scan_catalog()
        .unwrap_err();

    assert!(matches!(error, ComponentError::ScanTargetNotFound { .. }));
}

#[test]
fn test_fallible_constructor_error_is_not_cached() {
    let selected = ComponentScannerImpl::new(base_path("storage"))
        .scan_catalog()
        .unwrap();
    let container = di_impl::DiContainer::builder()
        .register_all(selected)
        .build()
        .unwrap();

    let error = container.get::<FlakyStore>().err().unwrap();
    assert!(matches!(error, DependencyError::ComponentCreationFailed { .. }));
    assert!(container.get::<FlakyStore>().is_ok());
}
