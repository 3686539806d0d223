//! 组件扫描
//!
//! 从候选描述符（显式列表或 `#[component]` 生成的候选目录）中挑选位于基础路径之下、
//! 且未被任何排除过滤器命中的组件，并注册到注册表。

use crate::config::ScanConfig;
use core_common::{catalog, ComponentDescriptor, ComponentError, Stereotype};
use di_abstractions::{ComponentFilter, ComponentRegistry, ComponentScanner};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// 按构造型排除
#[derive(Debug, Clone)]
pub struct StereotypeFilter {
    stereotypes: HashSet<Stereotype>,
}

impl StereotypeFilter {
    pub fn new(stereotypes: impl IntoIterator<Item = Stereotype>) -> Self {
        Self {
            stereotypes: stereotypes.into_iter().collect(),
        }
    }
}

impl ComponentFilter for StereotypeFilter {
    fn matches(&self, descriptor: &ComponentDescriptor) -> bool {
        descriptor
            .stereotypes()
            .iter()
            .any(|s| self.stereotypes.contains(s))
    }

    fn describe(&self) -> String {
        let mut names: Vec<&str> = self.stereotypes.iter().map(Stereotype::as_str).collect();
        names.sort_unstable();
        format!("stereotype({})", names.join(", "))
    }
}

/// 按组件名称排除
#[derive(Debug, Clone)]
pub struct NameFilter {
    names: HashSet<String>,
}

impl NameFilter {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ComponentFilter for NameFilter {
    fn matches(&self, descriptor: &ComponentDescriptor) -> bool {
        self.names.contains(&descriptor.component_name())
    }

    fn describe(&self) -> String {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        format!("name({})", names.join(", "))
    }
}

/// 组件扫描器实现
#[derive(Debug)]
pub struct ComponentScannerImpl {
    /// 扫描器名称
    name: String,
    /// 基础模块路径
    base_path: String,
    /// 排除过滤器
    exclude_filters: Vec<Box<dyn ComponentFilter>>,
    /// 未扫描到组件时是否报错
    fail_on_empty: bool,
}

impl ComponentScannerImpl {
    /// 创建扫描指定基础路径的扫描器
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            name: "component-scanner".to_string(),
            base_path: base_path.into(),
            exclude_filters: Vec::new(),
            fail_on_empty: true,
        }
    }

    /// 根据扫描配置创建扫描器
    pub fn from_config(config: &ScanConfig) -> Self {
        let mut scanner = Self::new(config.base_path.clone()).fail_on_empty(config.fail_on_empty);
        if !config.exclude_stereotypes.is_empty() {
            scanner = scanner.exclude_stereotypes(config.exclude_stereotypes.iter().copied());
        }
        if !config.exclude_names.is_empty() {
            scanner = scanner.exclude_names(config.exclude_names.iter().cloned());
        }
        scanner
    }

    /// 设置扫描器名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 添加排除过滤器
    pub fn exclude(mut self, filter: impl ComponentFilter + 'static) -> Self {
        self.exclude_filters.push(Box::new(filter));
        self
    }

    /// 排除带有指定构造型的组件
    pub fn exclude_stereotypes(self, stereotypes: impl IntoIterator<Item = Stereotype>) -> Self {
        self.exclude(StereotypeFilter::new(stereotypes))
    }

    /// 排除指定名称的组件
    pub fn exclude_names<S: Into<String>>(self, names: impl IntoIterator<Item = S>) -> Self {
        self.exclude(NameFilter::new(names))
    }

    /// 设置未扫描到组件时是否报错
    pub fn fail_on_empty(mut self, fail_on_empty: bool) -> Self {
        self.fail_on_empty = fail_on_empty;
        self
    }

    /// 扫描候选组件目录
    pub fn scan_catalog(&self) -> Result<Vec<ComponentDescriptor>, ComponentError> {
        self.scan(catalog::candidates())
    }

    /// 扫描候选组件，注册到注册表并关闭注册阶段
    ///
    /// 返回注册的组件数量
    pub fn scan_and_register(
        &self,
        registry: &dyn ComponentRegistry,
        candidates: Vec<ComponentDescriptor>,
    ) -> Result<usize, ComponentError> {
        let selected = self.scan(candidates)?;
        let count = selected.len();

        for descriptor in selected {
            registry.register(descriptor)?;
        }
        registry.close_registration()?;

        info!("扫描器 {} 注册了 {} 个组件", self.name, count);
        Ok(count)
    }

    fn excluded_by(&self, descriptor: &ComponentDescriptor) -> Option<&dyn ComponentFilter> {
        self.exclude_filters
            .iter()
            .map(Box::as_ref)
            .find(|filter| filter.matches(descriptor))
    }
}

impl ComponentScanner for ComponentScannerImpl {
    fn scan(&self, candidates: Vec<ComponentDescriptor>) -> Result<Vec<ComponentDescriptor>, ComponentError> {
        debug!("开始扫描: {} (候选 {} 个)", self.base_path, candidates.len());

        let mut selected: Vec<ComponentDescriptor> = candidates
            .into_iter()
            .filter(|descriptor| {
                if !descriptor.provider().is_under(&self.base_path) {
                    return false;
                }
                match self.excluded_by(descriptor) {
                    Some(filter) => {
                        debug!("排除组件: {} (过滤器 {})", descriptor, filter.describe());
                        false
                    }
                    None => true,
                }
            })
            .collect();

        // 候选目录的提交顺序取决于链接顺序，排序保证扫描结果稳定
        selected.sort_by_key(|descriptor| (descriptor.provider().full_name(), descriptor.component_name()));

        if selected.is_empty() {
            if self.fail_on_empty {
                return Err(ComponentError::ScanTargetNotFound {
                    base_path: self.base_path.clone(),
                });
            }
            warn!("扫描路径下未发现任何组件: {}", self.base_path);
        }

        for descriptor in &selected {
            debug!("发现组件: {}", descriptor);
        }
        Ok(selected)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }
}
