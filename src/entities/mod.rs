pub mod app_settings;
pub mod base_products;
pub mod campaigns;
pub mod chat_messages;
pub mod chat_sessions;
pub mod chatbot_configs;
pub mod chatbot_prompt_templates;
pub mod coupon_usages;
pub mod coupons;
pub mod customers;
pub mod mall_orders;
pub mod mall_products;
pub mod mall_qna;
pub mod mall_user_coupons;
pub mod mall_users;
pub mod orders;
pub mod reviews;
pub mod roles;
pub mod ticket_comments;
pub mod tickets;
pub mod users;

pub use app_settings as app_setting_entity;
pub use base_products as base_product_entity;
pub use campaigns as campaign_entity;
pub use chat_messages as chat_message_entity;
pub use chat_sessions as chat_session_entity;
pub use chatbot_configs as chatbot_config_entity;
pub use chatbot_prompt_templates as prompt_template_entity;
pub use coupon_usages as coupon_usage_entity;
pub use coupons as coupon_entity;
pub use customers as customer_entity;
pub use mall_orders as mall_order_entity;
pub use mall_products as mall_product_entity;
pub use mall_qna as mall_qna_entity;
pub use mall_user_coupons as mall_user_coupon_entity;
pub use mall_users as mall_user_entity;
pub use orders as order_entity;
pub use reviews as review_entity;
pub use roles as role_entity;
pub use ticket_comments as ticket_comment_entity;
pub use tickets as ticket_entity;
pub use users as user_entity;

pub use campaigns::{CampaignStatus, CampaignType};
pub use chat_messages::ChatSenderType;
pub use chat_sessions::ChatSessionStatus;
pub use coupons::DiscountType;
pub use mall_orders::MallOrderStatus;
pub use orders::OrderStatus;
pub use reviews::{ReviewAlertStatus, ReviewSentiment};
pub use tickets::{TicketPriority, TicketStatus};
