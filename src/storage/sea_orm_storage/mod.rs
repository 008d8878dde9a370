//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! `SeaOrmStorage` 只持有连接池句柄，各实体仓储从它派生，连接通过构造函数注入。

mod classes;
mod promo_codes;
pub(crate) mod query;
mod relationships;
mod students;
mod teachers;

pub use classes::ClassRepository;
pub use promo_codes::PromoCodeRepository;
pub use relationships::RelationshipManager;
pub use students::StudentRepository;
pub use teachers::TeacherRepository;

use crate::config::{Argon2Config, DatabaseConfig};
use crate::errors::{Result, SchoolError};
use crate::storage::schema::SchemaManager;
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, SqlErr,
};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    argon2: Argon2Config,
}

impl SeaOrmStorage {
    /// 连接数据库并执行待处理的迁移
    pub async fn connect(database: &DatabaseConfig, argon2: Argon2Config) -> Result<Self> {
        let db_url = Self::build_database_url(&database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, database).await?
        } else {
            Self::connect_generic(&db_url, database).await?
        };

        let storage = Self::from_connection(db, argon2);
        storage.schema().ensure_schema().await?;

        info!("SeaORM 存储初始化完成，数据库: {}", redact_url(&db_url));

        Ok(storage)
    }

    /// 内存 SQLite 数据库（单连接），用于测试和演示
    pub async fn in_memory(argon2: Argon2Config) -> Result<Self> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| SchoolError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true);

        // 内存库随连接销毁，连接池必须固定为一个长期存活的连接
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| SchoolError::database_connection(format!("SQLite 连接失败: {e}")))?;

        let storage =
            Self::from_connection(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool), argon2);
        storage.schema().ensure_schema().await?;

        Ok(storage)
    }

    /// 使用已有连接构建（不执行迁移）
    pub fn from_connection(db: DatabaseConnection, argon2: Argon2Config) -> Self {
        Self { db, argon2 }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn teachers(&self) -> TeacherRepository {
        TeacherRepository::new(self.db.clone(), self.argon2)
    }

    pub fn students(&self) -> StudentRepository {
        StudentRepository::new(self.db.clone(), self.argon2)
    }

    pub fn classes(&self) -> ClassRepository {
        ClassRepository::new(self.db.clone())
    }

    pub fn promo_codes(&self) -> PromoCodeRepository {
        PromoCodeRepository::new(self.db.clone())
    }

    pub fn relationships(&self) -> RelationshipManager {
        RelationshipManager::new(self.db.clone())
    }

    pub fn schema(&self) -> SchemaManager {
        SchemaManager::new(self.db.clone())
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchoolError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| SchoolError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| SchoolError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SchoolError::database_config(format!(
                "无法从 URL 推断数据库类型: {}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径",
                redact_url(url)
            )))
        }
    }
}

/// 隐藏连接 URL 中的密码
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.rsplit_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{scheme}://{user}:***@{host}")
        }
        None => url.to_string(),
    }
}

/// 写操作错误映射：唯一约束冲突转为 Conflict，其余转为 Persistence
///
/// `unique_values` 为写入前校验过的唯一列及其取值，并发写入绕过
/// `ensure_unique` 时据约束名找回冲突的列。
pub(crate) fn write_error(
    context: &str,
    err: DbErr,
    unique_values: &[(&'static str, String)],
) -> SchoolError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            let constraint = constraint_name(&detail);
            match unique_values
                .iter()
                .find(|(field, _)| constraint_matches(&constraint, field))
            {
                Some((field, value)) => SchoolError::conflict(*field, value.as_str()),
                None => SchoolError::conflict(constraint, detail),
            }
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            SchoolError::validation("reference", detail)
        }
        _ => SchoolError::persistence(format!("{context}: {err}")),
    }
}

/// 从驱动错误信息中取出约束名
///
/// - SQLite: `UNIQUE constraint failed: students.mobile`
/// - PostgreSQL: `duplicate key value violates unique constraint "students_mobile_key"`
/// - MySQL: `Duplicate entry '050' for key 'students.mobile'`
fn constraint_name(detail: &str) -> String {
    if let Some((_, columns)) = detail.split_once("constraint failed:") {
        return columns.split(',').next().unwrap_or_default().trim().to_string();
    }
    let quoted: Vec<&str> = detail.split(['"', '\'']).collect();
    // 引号内的片段位于奇数下标，取最后一个
    quoted
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, part)| part.trim())
        .next_back()
        .unwrap_or(detail)
        .to_string()
}

fn constraint_matches(constraint: &str, field: &str) -> bool {
    let constraint = constraint.to_ascii_lowercase();
    constraint == field
        || constraint.ends_with(&format!(".{field}"))
        || constraint.ends_with(&format!("_{field}"))
        || constraint.ends_with(&format!("_{field}_key"))
}

/// 唯一性检查，`exclude_id` 用于更新时排除自身
pub(crate) async fn ensure_unique<E, C>(
    db: &C,
    column: E::Column,
    id_column: E::Column,
    field: &str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<()>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let mut select = E::find().filter(column.eq(value));
    if let Some(id) = exclude_id {
        select = select.filter(id_column.ne(id));
    }

    let count = select
        .count(db)
        .await
        .map_err(|e| SchoolError::persistence(format!("唯一性检查失败 ({field}): {e}")))?;

    if count > 0 {
        return Err(SchoolError::conflict(field, value));
    }
    Ok(())
}

/// 校验一组 ID 全部存在，返回第一个缺失的 ID 对应的 NotFound
pub(crate) async fn ensure_all_exist<E, C>(
    db: &C,
    id_column: E::Column,
    entity_name: &str,
    ids: &BTreeSet<i64>,
) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(());
    }

    let found: Vec<i64> = E::find()
        .select_only()
        .column(id_column)
        .filter(id_column.is_in(ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| SchoolError::persistence(format!("查询{entity_name}失败: {e}")))?;

    let found: BTreeSet<i64> = found.into_iter().collect();
    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(SchoolError::not_found(entity_name, *missing)),
        None => Ok(()),
    }
}
