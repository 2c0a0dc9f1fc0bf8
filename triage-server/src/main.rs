//! 分诊队列服务器主程序

mod config;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use triage_web::WebServer;
use triage_workflow::TriageEngine;

use crate::config::ServerSettings;

/// 分诊服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "triage-server")]
#[command(about = "急诊分诊优先级队列服务器")]
struct Args {
    /// 监听地址
    #[arg(long)]
    host: Option<String>,

    /// 服务器端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings =
        ServerSettings::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(level) = args.log_level {
        settings.logging.level = level;
    }
    settings.validate().context("Invalid configuration")?;

    // 初始化日志
    let filter = EnvFilter::try_new(&settings.logging.level)
        .with_context(|| format!("Invalid log level: {}", settings.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("启动分诊队列服务器...");
    info!("  监听地址: {}:{}", settings.server.host, settings.server.port);
    info!("  允许跨域: {}", settings.cors.allow_any_origin);

    let addr = settings.socket_addr()?;
    let server = WebServer::new(addr, TriageEngine::new(), settings.cors.allow_any_origin);

    if let Err(e) = server.run().await {
        error!("服务器运行失败: {}", e);
        return Err(e.into());
    }

    Ok(())
}
