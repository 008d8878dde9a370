//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! 仓储层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 时间字段统一存储为 Unix 时间戳（秒）。

pub mod class_students;
pub mod class_teachers;
pub mod classes;
pub mod promo_code_classes;
pub mod promo_codes;
pub mod students;
pub mod teachers;
