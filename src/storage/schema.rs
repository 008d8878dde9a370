//! 数据库结构管理
//!
//! 迁移只做增量：创建缺失的表、列和索引，不删除已有数据。

use migration::{Migrator, MigratorTrait, SCHEMA_VERSION};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::{Result, SchoolError};

#[derive(Clone)]
pub struct SchemaManager {
    db: DatabaseConnection,
}

impl SchemaManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 执行所有待处理的迁移，可重复调用
    pub async fn ensure_schema(&self) -> Result<()> {
        let pending = self.pending_migrations().await?;
        if pending.is_empty() {
            return Ok(());
        }

        info!("Applying {} pending migrations: {}", pending.len(), pending.join(", "));
        Migrator::up(&self.db, None)
            .await
            .map_err(|e| SchoolError::database_config(format!("数据库迁移失败: {e}")))?;

        info!("Database schema is at version {}", SCHEMA_VERSION);
        Ok(())
    }

    /// 当前代码对应的结构版本
    pub fn schema_version(&self) -> &'static str {
        SCHEMA_VERSION
    }

    /// 已安装版本是否低于当前版本；空值或无法解析的版本视为需要升级
    pub fn needs_upgrade(&self, installed_version: &str) -> bool {
        needs_upgrade(installed_version, SCHEMA_VERSION)
    }

    /// 尚未执行的迁移名称
    pub async fn pending_migrations(&self) -> Result<Vec<String>> {
        let pending = Migrator::get_pending_migrations(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询迁移状态失败: {e}")))?;

        Ok(pending.iter().map(|m| m.name().to_string()).collect())
    }
}

fn parse_version(version: &str) -> Option<Vec<u64>> {
    let version = version.trim();
    if version.is_empty() {
        return None;
    }
    version
        .split('.')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect()
}

/// 逐段比较点分数字版本，缺失的段按 0 处理
pub(crate) fn needs_upgrade(installed: &str, current: &str) -> bool {
    let (Some(installed), Some(current)) = (parse_version(installed), parse_version(current))
    else {
        return true;
    };

    let len = installed.len().max(current.len());
    for i in 0..len {
        let a = installed.get(i).copied().unwrap_or(0);
        let b = current.get(i).copied().unwrap_or(0);
        if a != b {
            return a < b;
        }
    }
    false
}
