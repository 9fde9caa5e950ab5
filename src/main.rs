use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use crm_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::WebhookService,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

/// Excel 上传大小上限
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建JWT服务
    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
        config.jwt.mall_token_expires_in,
    );

    // 创建服务
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let user_service = UserService::new(pool.clone());
    let order_service = OrderService::new(pool.clone());
    let customer_service = CustomerService::new(pool.clone());
    let excel_service = ExcelService::new(order_service.clone(), customer_service.clone());
    let ticket_service = TicketService::new(pool.clone());
    let chatbot_config_service = ChatbotConfigService::new(pool.clone());
    let chat_service = ChatService::new(
        pool.clone(),
        chatbot_config_service.clone(),
        WebhookService::new(),
    );
    let campaign_service = CampaignService::new(pool.clone());
    let coupon_service = CouponService::new(pool.clone());
    let mall_service = MallService::new(pool.clone(), jwt_service.clone(), config.mall.clone());
    let product_service = MallProductService::new(pool.clone());
    let review_service = ReviewService::new(pool.clone());
    let performance_service = PerformanceService::new(pool.clone(), config.performance.clone());
    let dashboard_service = DashboardService::new(pool.clone(), chat_service.clone());

    // 首次启动创建管理员
    if let (Some(email), Some(password)) = (
        config.bootstrap.admin_email.as_deref(),
        config.bootstrap.admin_password.as_deref(),
    ) {
        if let Err(e) = user_service.ensure_bootstrap_admin(email, password).await {
            log::error!("Failed to bootstrap admin account: {e:?}");
        }
    }

    // 启动后台任务
    tasks::spawn_all(chat_service.clone(), &config.chat);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(customer_service.clone()))
            .app_data(web::Data::new(excel_service.clone()))
            .app_data(web::Data::new(ticket_service.clone()))
            .app_data(web::Data::new(chatbot_config_service.clone()))
            .app_data(web::Data::new(chat_service.clone()))
            .app_data(web::Data::new(campaign_service.clone()))
            .app_data(web::Data::new(coupon_service.clone()))
            .app_data(web::Data::new(mall_service.clone()))
            .app_data(web::Data::new(product_service.clone()))
            .app_data(web::Data::new(review_service.clone()))
            .app_data(web::Data::new(performance_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::dashboard_config)
                    .configure(handlers::order_config)
                    .configure(handlers::customer_config)
                    .configure(handlers::ticket_config)
                    .configure(handlers::review_config)
                    .configure(handlers::chat_config)
                    .configure(handlers::chatbot_config)
                    .configure(handlers::campaign_config)
                    .configure(handlers::coupon_config)
                    .configure(handlers::mall_config)
                    .configure(handlers::mall_admin_config)
                    .configure(handlers::performance_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
