/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

/// 初始化 tracing 订阅者
///
/// 优先使用 `RUST_LOG`，未设置时按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n奖学金申请处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 奖学金申请批量评估");
    info!("🤖 评估引擎: {:?}", config.evaluator);
    info!("📊 最大并发数: {}", config.max_concurrent_applications);
    info!("📜 规则文件: {}", config.rules_file);
    info!("{}", "=".repeat(60));
}

/// 记录申请加载信息
///
/// # 参数
/// - `total`: 申请总数
/// - `max_concurrent`: 最大并发数
pub fn log_applications_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 份待处理的申请", total);
    info!("📋 最多同时处理 {} 份\n", max_concurrent);
}

/// 打印最终统计信息
pub fn print_final_stats(
    success: usize,
    failed: usize,
    cancelled: usize,
    total: usize,
    config: &Config,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    if cancelled > 0 {
        info!("⏹️ 已取消: {}", cancelled);
    }
    info!("{}", "=".repeat(60));
    info!("\n决策记录已保存至: {}", config.output_folder);
    info!("日志已保存至: {}", config.output_log_file);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
