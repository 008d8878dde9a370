pub mod error_code;
pub mod pagination;
pub mod patch;
pub mod response;
pub mod status;

pub use error_code::ErrorCode;
pub use pagination::{ListQuery, PageResult};
pub use patch::double_option;
pub use response::ApiResponse;
pub use status::EntityStatus;
