pub mod code_generator;
pub mod jwt;
pub mod masking;
pub mod password;
pub mod phone;
pub mod spreadsheet;
pub mod time;

pub use code_generator::{generate_coupon_code, generate_mall_order_number, generate_order_number};
pub use jwt::*;
pub use masking::mask_name;
pub use password::*;
pub use phone::*;
