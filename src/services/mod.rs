pub mod auth_service;
pub mod campaign_service;
pub mod chat_service;
pub mod chatbot_config_service;
pub mod coupon_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod excel_service;
pub mod mall_service;
pub mod order_service;
pub mod performance_service;
pub mod product_service;
pub mod review_service;
pub mod ticket_service;
pub mod user_service;

pub use auth_service::*;
pub use campaign_service::*;
pub use chat_service::*;
pub use chatbot_config_service::*;
pub use coupon_service::*;
pub use customer_service::*;
pub use dashboard_service::*;
pub use excel_service::*;
pub use mall_service::*;
pub use order_service::*;
pub use performance_service::*;
pub use product_service::*;
pub use review_service::*;
pub use ticket_service::*;
pub use user_service::*;
