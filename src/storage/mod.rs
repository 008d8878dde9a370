//! 存储层
//!
//! `sea_orm_storage` 提供连接管理与各实体仓储，`schema` 负责迁移与版本检查。

pub mod schema;
pub mod sea_orm_storage;

pub use schema::SchemaManager;
pub use sea_orm_storage::{
    ClassRepository, PromoCodeRepository, RelationshipManager, SeaOrmStorage, StudentRepository,
    TeacherRepository,
};
