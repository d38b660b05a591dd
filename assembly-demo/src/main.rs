//! `assembly-demo`：用内存存储跑一个班次，并输出批次与看板 JSON。
//!
//! 用法：
//!   assembly-demo [--config <path>] [--units <n>] [--period today|this_week|all_time]
//!
//! 未指定 `--config` 时读取 `ASSEMBLY_CONFIG` 环境变量，均缺省则使用默认配置。

use anyhow::Context;
use assembly_application::AssemblyApi;
use assembly_application::config::{AssemblyConfig, CONFIG_ENV};
use assembly_application::context::AppContext;
use assembly_domain::access::{Actor, Role};
use assembly_domain::dashboard::TimePeriod;
use assembly_domain::product::NewProduct;
use assembly_domain::stage::STAGE_SEQUENCE;
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "assembly-demo", about = "Run a scripted assembly shift")]
struct Cli {
    /// 配置文件路径
    #[arg(short = 'c', long = "config", env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// 批次中的单件数量
    #[arg(long, default_value_t = 6)]
    units: u32,

    /// 看板统计的时间段
    #[arg(long, default_value = "all_time")]
    period: TimePeriod,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            AssemblyConfig::load(path)?
        }
        None => AssemblyConfig::default(),
    };
    let api = AssemblyApi::in_memory(&config)?;

    let admin = AppContext::authenticated(Actor::new("admin-1", "Avery", Role::Admin))
        .with_correlation_id("shift-setup");
    let lead = AppContext::authenticated(Actor::new("lead-1", "Sam", Role::Supervisor))
        .with_correlation_id("shift-setup");
    let operator = AppContext::authenticated(Actor::new("op-1", "Robin", Role::Operator))
        .with_correlation_id("shift-floor");

    let product = api
        .create_product(
            &admin,
            NewProduct::builder()
                .name("Compact 9")
                .model_number("C9-2025")
                .description("Compact striker-fired pistol")
                .build(),
        )
        .await?;

    let serials: Vec<String> = (1..=cli.units).map(|n| format!("{:05}", 10000 + n)).collect();
    let batch = api
        .create_batch(&lead, "C9-Shift-A", *product.id(), cli.units, Some(serials))
        .await?;

    // 第 n 件推进 2n 道工序，每隔两件在枪管装配处驳回一次
    for (n, unit) in batch.serialized_items.iter().enumerate() {
        for (i, stage) in STAGE_SEQUENCE.iter().take(2 * n).enumerate() {
            if n % 2 == 1 && i == 3 {
                api.reject_stage(&operator, unit.id, *stage, "barrel lockup out of spec")
                    .await?;
            }
            api.mark_stage_complete(&operator, unit.id, *stage)
                .await
                .with_context(|| format!("unit {} at {stage}", unit.serial_number))?;
        }
    }

    let batch = api.get_batch_by_id(&operator, *batch.batch.id()).await?;
    let report = json!({
        "period": cli.period,
        "batch": batch,
        "production": api.get_production_summary(&operator, cli.period).await?,
        "rejections": api.get_rejection_summary(&operator, cli.period).await?,
        "wip": api.get_wip_by_stage(&operator).await?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!(
        completed = batch.completed_count,
        progress = batch.progress_percent,
        "shift finished"
    );
    Ok(())
}
