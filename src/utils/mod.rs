pub mod expiry;
pub mod parameter_error_handler;
pub mod password;
pub mod sql;
pub mod validate;

pub use expiry::next_expiry;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;
