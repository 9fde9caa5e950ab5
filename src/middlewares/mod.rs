pub mod auth;
pub mod cors;

pub use auth::{
    AuthMiddleware, MallIdentity, StaffIdentity, current_mall_user, current_staff, require_staff,
};
pub use cors::create_cors;
