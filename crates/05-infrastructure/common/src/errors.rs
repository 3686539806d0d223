//! 错误类型定义

use thiserror::Error;

/// 装箱的通用错误类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 依赖注入错误类型
///
/// 所有变体对当前请求都是致命的，不做自动重试。
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件重复注册: {key}, 已存在提供者: {existing}")]
    DuplicateRegistration { key: String, existing: String },

    #[error("注册阶段已关闭, 拒绝注册: {key}")]
    RegistrationClosed { key: String },

    #[error("注册阶段尚未关闭, 无法解析: {key}")]
    RegistrationOpen { key: String },

    #[error("依赖未注册: {key}, 请求方: {requester}")]
    UnresolvedDependency { key: String, requester: String },

    #[error("存在多个候选提供者: {key}, 候选: {}", .candidates.join(", "))]
    AmbiguousProvider { key: String, candidates: Vec<String> },

    #[error("循环依赖检测到: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("依赖解析深度超过上限 {max_depth}: {key}")]
    ResolutionDepthExceeded { key: String, max_depth: usize },

    #[error("组件创建失败: {key}, 原因: {source}")]
    ComponentCreationFailed { key: String, source: BoxError },

    #[error("组件类型不匹配: {key}, 期望类型: {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("依赖验证失败: {}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    ValidationFailed { errors: Vec<DependencyError> },
}

impl DependencyError {
    /// 创建组件创建失败错误
    pub fn creation_failed(key: impl ToString, source: impl Into<BoxError>) -> Self {
        Self::ComponentCreationFailed {
            key: key.to_string(),
            source: source.into(),
        }
    }

    /// 创建依赖未注册错误
    pub fn unresolved(key: impl ToString, requester: impl ToString) -> Self {
        Self::UnresolvedDependency {
            key: key.to_string(),
            requester: requester.to_string(),
        }
    }

    /// 是否为循环依赖错误
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// 验证失败时包含的全部错误；其他错误返回自身
    pub fn errors(&self) -> &[DependencyError] {
        match self {
            Self::ValidationFailed { errors } => errors,
            other => std::slice::from_ref(other),
        }
    }
}

/// 组件错误类型
///
/// 扫描和启动阶段使用
#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("扫描路径下未发现任何候选组件: {base_path}")]
    ScanTargetNotFound { base_path: String },

    #[error("组件元数据无效: {message}")]
    InvalidMetadata { message: String },

    #[error("依赖注入错误: {source}")]
    Dependency {
        #[source]
        source: DependencyError,
    },

    #[error("容器验证失败, 共 {} 个错误", .errors.len())]
    ValidationFailed { errors: Vec<DependencyError> },
}

impl From<DependencyError> for ComponentError {
    fn from(error: DependencyError) -> Self {
        match error {
            DependencyError::ValidationFailed { errors } => Self::ValidationFailed { errors },
            source => Self::Dependency { source },
        }
    }
}

impl ComponentError {
    /// 创建元数据无效错误
    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            message: message.into(),
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {message}")]
    ParseError { message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type ComponentResult<T> = Result<T, ComponentError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
