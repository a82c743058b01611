pub mod carriers;
pub mod common;
pub mod health;
pub mod quotes;

pub use carriers::get_carriers;
pub use health::{health, ready};
pub use quotes::{post_smart_quote, post_smart_quote_ai};
