use axum::{routing::{get, post}, Router};
use cofc_compare_rust::{api, AppConfig};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    let state = api::AppState::new(config.cache.max_entries, config.tolerances());

    // 构建路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/compare", post(api::compare))
        .route("/api/compare/export", post(api::export))
        .route("/api/compare/batch", post(api::compare_batch))
        .with_state(state)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/compare         - CO x FC 比对");
    info!("  POST /api/compare/export  - 导出差异 (CSV)");
    info!("  POST /api/compare/batch   - 批量比对");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
