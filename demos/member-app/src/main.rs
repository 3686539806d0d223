//! # 会员服务演示
//!
//! 对比三种获取会员服务的方式：
//! - `manual` - 手动装配，每次调用构造新实例
//! - `container` - 把手动装配导出给容器，容器只构造一次
//! - `scan` - 扫描 `#[component]` 登记的组件并自动注入依赖

mod app_config;
mod auto_app_config;
mod member;

use anyhow::{ensure, Context, Result};
use app_config::AppConfig;
use auto_app_config::AutoAppConfig;
use clap::{Parser, ValueEnum};
use core_composition::BootstrapConfig;
use di_impl::DiContainer;
use member::{Grade, Member, MemberRepository, MemberService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 演示模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// 手动装配
    Manual,
    /// 单例容器
    Container,
    /// 组件扫描
    Scan,
    /// 依次运行全部模式
    All,
}

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "member-app")]
#[command(about = "hello-core 会员服务演示")]
struct Args {
    /// 演示模式
    #[arg(short, long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// 配置文件路径（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖扫描的基础路径
    #[arg(long)]
    base_path: Option<String>,

    /// 并发解析的调用方数量
    #[arg(long, default_value_t = 8)]
    callers: usize,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("启动会员服务演示, 模式: {:?}", args.mode);

    let config = load_config(&args)?;

    if matches!(args.mode, Mode::Manual | Mode::All) {
        run_manual()?;
    }
    if matches!(args.mode, Mode::Container | Mode::All) {
        let container = DiContainer::builder()
            .with_config(config.container.clone())
            .register_all(AppConfig::descriptors()?)
            .build()?;
        run_container("container", &container, args.callers).await?;
    }
    if matches!(args.mode, Mode::Scan | Mode::All) {
        let container = AutoAppConfig::container(config)?;
        run_container("scan", &container, args.callers).await?;
    }

    info!("演示结束");
    Ok(())
}

/// 加载启动配置，命令行参数优先
fn load_config(args: &Args) -> Result<BootstrapConfig> {
    let mut config = match &args.config {
        Some(path) => BootstrapConfig::from_file(path)
            .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
        None => BootstrapConfig {
            scan: AutoAppConfig::scan_config(),
            ..BootstrapConfig::default()
        },
    };

    if let Some(base_path) = &args.base_path {
        config.scan.base_path.clone_from(base_path);
    }
    if config.scan.base_path.is_empty() {
        warn!("扫描路径为空, 将扫描所有候选组件");
    }

    Ok(config)
}

/// 手动装配：每次调用都是新实例
fn run_manual() -> Result<()> {
    info!("=== 手动装配 ===");
    let app_config = AppConfig::new();

    let first = app_config.member_service()?;
    let second = app_config.member_service()?;
    info!("memberService1 = {:p}", Arc::as_ptr(&first));
    info!("memberService2 = {:p}", Arc::as_ptr(&second));
    ensure!(!Arc::ptr_eq(&first, &second), "手动装配应当每次构造新实例");

    join_and_find(first.as_ref())?;

    // 每个服务持有各自的存储
    let repository = app_config.member_repository()?;
    ensure!(
        repository.find_by_id(1).is_none() && second.find_member(1).is_none(),
        "手动装配的存储不应共享"
    );
    Ok(())
}

/// 容器：多个调用方并发获取，只构造一次
async fn run_container(label: &str, container: &DiContainer, callers: usize) -> Result<()> {
    info!("=== {} ===", label);
    info!("已注册组件: {:?}", container.component_names());

    let handles: Vec<_> = (0..callers.max(1))
        .map(|_| {
            let container = container.clone();
            tokio::task::spawn_blocking(move || container.get::<dyn MemberService>())
        })
        .collect();

    let mut services = Vec::with_capacity(handles.len());
    for handle in handles {
        services.push(handle.await??);
    }

    let first = &services[0];
    info!("memberService = {:p} ({} 个调用方)", Arc::as_ptr(first), services.len());
    ensure!(
        services.iter().all(|s| Arc::ptr_eq(s, first)),
        "容器应当返回同一个实例"
    );

    join_and_find(first.as_ref())?;

    // 服务中注入的存储就是容器中的存储单例
    let repository = container.get::<dyn MemberRepository>()?;
    ensure!(
        repository.find_by_id(1).is_some(),
        "容器中的服务与存储应当共享同一个存储单例"
    );

    let stats = container.stats();
    info!(
        "容器统计: 组件 {}, 单例 {}, 构造 {}, 解析错误 {}",
        stats.registered_components, stats.active_singletons, stats.constructions, stats.resolution_errors
    );
    Ok(())
}

fn join_and_find(member_service: &dyn MemberService) -> Result<()> {
    let member = Member::new(1, "memberA", Grade::Vip);
    member_service.join(member.clone());

    let found = member_service
        .find_member(1)
        .context("刚加入的会员不存在")?;
    info!("new member = {}, find member = {} ({})", member.name, found.name, found.grade);
    ensure!(found == member, "查到的会员与加入的会员不一致");
    Ok(())
}
