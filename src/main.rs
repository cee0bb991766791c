use clap::{Parser, Subcommand};
use label_reorder::{api, AppConfig, DefaultReconciler};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

/// 纳品书 / 送り状对账并按纳品书顺序重排送り状
#[derive(Debug, Parser)]
#[command(name = "label-reorder", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 处理一组 PDF 并把结果写到输出目录
    Run {
        #[arg(long)]
        delivery_note: PathBuf,
        #[arg(long)]
        shipping_label: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// 每个文档最多处理的页数
        #[arg(long)]
        max_pages: Option<usize>,
    },
    /// 启动 HTTP 服务
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    // 加载配置
    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Run {
            delivery_note,
            shipping_label,
            output_dir,
            max_pages,
        } => {
            if max_pages.is_some() {
                config.render.max_pages = max_pages;
            }
            let output_dir = output_dir.unwrap_or_else(|| config.output.dir.clone());

            // 执行对账
            let reconciler = DefaultReconciler::from_config(&config)?;

            match reconciler.run(&delivery_note, &shipping_label, &output_dir).await {
                Ok(summary) => {
                    info!(
                        "处理完成: 订单 {}, 送り状 {}, 已匹配 {}, 未匹配 {}",
                        summary.orders_extracted,
                        summary.labels_extracted,
                        summary.matched,
                        summary.unmatched.len()
                    );
                    for path in summary.artifacts() {
                        info!("输出: {}", path.display());
                    }
                }
                Err(e) => {
                    tracing::error!("处理失败: {}", e);
                    return Err(e.into());
                }
            }
        }
        Command::Serve => serve(config).await?,
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting server with config: {:?}", config);

    // 创建服务
    let reconciler = Arc::new(DefaultReconciler::from_config(&config)?);

    // 构建路由
    let app = api::router(reconciler, config.server.max_upload_bytes);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /health");
    info!("  POST /api/reconcile  - multipart: delivery_note, shipping_label");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
