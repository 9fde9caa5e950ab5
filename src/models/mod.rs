pub mod auth;
pub mod campaign;
pub mod chat;
pub mod chatbot;
pub mod common;
pub mod coupon;
pub mod customer;
pub mod dashboard;
pub mod import;
pub mod mall;
pub mod order;
pub mod pagination;
pub mod performance;
pub mod product;
pub mod review;
pub mod role;
pub mod ticket;
pub mod user;

pub use auth::*;
pub use campaign::*;
pub use chat::*;
pub use chatbot::*;
pub use common::*;
pub use coupon::*;
pub use customer::*;
pub use dashboard::*;
pub use import::*;
pub use mall::*;
pub use order::*;
pub use pagination::*;
pub use performance::*;
pub use product::*;
pub use review::*;
pub use role::*;
pub use ticket::*;
pub use user::*;
