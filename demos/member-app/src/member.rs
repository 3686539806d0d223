//! 会员领域

use component_macros::component;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 会员等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Basic,
    Vip,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => f.write_str("BASIC"),
            Self::Vip => f.write_str("VIP"),
        }
    }
}

/// 会员
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub grade: Grade,
}

impl Member {
    pub fn new(id: i64, name: impl Into<String>, grade: Grade) -> Self {
        Self {
            id,
            name: name.into(),
            grade,
        }
    }
}

/// 会员存储
pub trait MemberRepository: Send + Sync {
    /// 保存会员，相同编号会覆盖
    fn save(&self, member: Member);

    /// 按编号查找会员
    fn find_by_id(&self, member_id: i64) -> Option<Member>;
}

/// 内存会员存储
#[derive(Debug, Default)]
pub struct MemoryMemberRepository {
    store: RwLock<HashMap<i64, Member>>,
}

#[component(provides = dyn MemberRepository, stereotype = repository)]
impl MemoryMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemberRepository for MemoryMemberRepository {
    fn save(&self, member: Member) {
        debug!("保存会员: {} ({})", member.name, member.id);
        self.store.write().insert(member.id, member);
    }

    fn find_by_id(&self, member_id: i64) -> Option<Member> {
        self.store.read().get(&member_id).cloned()
    }
}

/// 会员服务
pub trait MemberService: Send + Sync {
    /// 会员加入
    fn join(&self, member: Member);

    /// 查找会员
    fn find_member(&self, member_id: i64) -> Option<Member>;
}

/// 会员服务实现
pub struct MemberServiceImpl {
    member_repository: Arc<dyn MemberRepository>,
}

#[component(provides = dyn MemberService, stereotype = service)]
impl MemberServiceImpl {
    pub fn new(member_repository: Arc<dyn MemberRepository>) -> Self {
        Self { member_repository }
    }
}

impl MemberService for MemberServiceImpl {
    fn join(&self, member: Member) {
        self.member_repository.save(member);
    }

    fn find_member(&self, member_id: i64) -> Option<Member> {
        self.member_repository.find_by_id(member_id)
    }
}
