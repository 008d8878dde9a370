pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_tables;
mod m20250310_000001_create_assignment_tables;

/// 当前数据库结构版本，随迁移一起递增
pub const SCHEMA_VERSION: &str = "1.1.0";

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_tables::Migration),
            Box::new(m20250310_000001_create_assignment_tables::Migration),
        ]
    }
}
