//! 业务模型定义
//!
//! 与 `entity` 中的数据库实体分离，存储层负责两者之间的转换。

pub mod classes;
pub mod common;
pub mod promo_codes;
pub mod relationships;
pub mod students;
pub mod teachers;

pub use common::{ApiResponse, EntityStatus, ErrorCode, ListQuery, PageResult, double_option};
