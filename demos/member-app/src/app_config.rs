//! 手动装配配置

use crate::member::{MemberRepository, MemberService, MemberServiceImpl, MemoryMemberRepository};
use core_common::{ComponentDescriptor, ComponentResult, DependencyError};
use core_composition::ManualWiring;
use std::sync::Arc;

/// 会员服务的手动装配
///
/// 每次调用装配方法都会构造新的对象图。
pub struct AppConfig {
    wiring: ManualWiring,
}

impl AppConfig {
    pub const MEMBER_SERVICE: &'static str = "memberService";
    pub const MEMBER_REPOSITORY: &'static str = "memberRepository";

    pub fn new() -> Self {
        Self { wiring: wiring() }
    }

    pub fn member_service(&self) -> Result<Arc<dyn MemberService>, DependencyError> {
        self.wiring.build(Self::MEMBER_SERVICE)
    }

    pub fn member_repository(&self) -> Result<Arc<dyn MemberRepository>, DependencyError> {
        self.wiring.build(Self::MEMBER_REPOSITORY)
    }

    /// 把装配方法导出为 `Configuration` 组件，交给容器管理
    ///
    /// `memberService` 声明了对 `memberRepository` 的依赖，容器中两者共享同一个存储。
    pub fn descriptors() -> ComponentResult<Vec<ComponentDescriptor>> {
        wiring().into_descriptors()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn wiring() -> ManualWiring {
    ManualWiring::new::<AppConfig>()
        .recipe_using::<dyn MemberService, _>(
            AppConfig::MEMBER_SERVICE,
            &[AppConfig::MEMBER_REPOSITORY],
            |wiring| {
                let member_repository = wiring.build::<dyn MemberRepository>(AppConfig::MEMBER_REPOSITORY)?;
                let service: Arc<dyn MemberService> = Arc::new(MemberServiceImpl::new(member_repository));
                Ok(service)
            },
        )
        .recipe::<dyn MemberRepository, _>(AppConfig::MEMBER_REPOSITORY, |_| {
            let repository: Arc<dyn MemberRepository> = Arc::new(MemoryMemberRepository::new());
            Ok(repository)
        })
}
