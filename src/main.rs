//! 服务入口

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use course_mall::config::Config;
use course_mall::infrastructure::database::{create_tables, DatabaseManager};
use course_mall::infrastructure::logger::Logger;
use course_mall::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    Logger::init();

    info!("Starting course-mall server...");

    let config = Config::load()?;

    let database = DatabaseManager::new(&config.database).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        e
    })?;
    create_tables(database.get_pool()).await?;

    let state = AppState {
        db: database.get_pool().clone(),
        config: Arc::new(config.clone()),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 course-mall server running on http://{}", addr);
    info!("📖 API 端点:");
    info!("   POST   /api/auth/register         - 注册");
    info!("   POST   /api/auth/login            - 登录");
    info!("   GET    /api/videos                - 课程列表 (支持 ?page=1&limit=10&search=)");
    info!("   GET    /api/videos/:id            - 课程详情");
    info!("   POST   /api/videos                - 创建课程 (管理员)");
    info!("   PUT    /api/videos/:id            - 更新课程 (管理员)");
    info!("   DELETE /api/videos/:id            - 下架课程 (管理员)");
    info!("   GET    /api/cart                  - 查看购物车");
    info!("   POST   /api/cart                  - 加入购物车");
    info!("   DELETE /api/cart/:video_id        - 移出购物车");
    info!("   POST   /api/orders                - 创建订单");
    info!("   GET    /api/orders                - 订单列表");
    info!("   POST   /api/orders/:id/pay        - 发起支付");
    info!("   POST   /api/payments/notify       - 支付回调");
    info!("   GET    /api/commissions           - 佣金列表");
    info!("   GET    /api/commissions/summary   - 佣金汇总");
    info!("   POST   /api/commissions/:id/confirm - 确认佣金 (管理员)");
    info!("   POST   /api/withdrawals           - 申请提现");
    info!("   GET    /api/withdrawals           - 提现记录");
    info!("   GET    /api/withdrawals/pending   - 待审核提现 (管理员)");
    info!("   GET    /health                    - 健康检查");

    axum::serve(listener, app).await?;

    Ok(())
}
