use component_macros::component;
use core_common::catalog;
use std::sync::Arc;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        42
    }
}

#[component(provides = dyn Clock)]
impl FixedClock {
    fn new() -> Self {
        FixedClock
    }
}

struct Reporter {
    clock: Arc<dyn Clock>,
}

#[component(stereotype = service)]
impl Reporter {
    fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

fn main() {
    assert_eq!(catalog::candidate_count(), 2);

    let container = di_impl::DiContainer::builder()
        .register_all(catalog::candidates())
        .build()
        .unwrap();
    assert_eq!(container.get::<Reporter>().unwrap().clock.now(), 42);
}
