pub mod auth;
pub mod campaign;
pub mod chat;
pub mod chatbot;
pub mod coupon;
pub mod customer;
pub mod dashboard;
pub mod mall;
pub mod order;
pub mod performance;
pub mod product;
pub mod review;
pub mod ticket;
pub mod user;

pub use auth::auth_config;
pub use campaign::campaign_config;
pub use chat::chat_config;
pub use chatbot::chatbot_config;
pub use coupon::coupon_config;
pub use customer::customer_config;
pub use dashboard::dashboard_config;
pub use mall::{mall_admin_config, mall_config};
pub use order::order_config;
pub use performance::performance_config;
pub use review::review_config;
pub use ticket::ticket_config;
pub use user::user_config;
