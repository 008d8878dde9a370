use crate::config::AppConfig;
use crate::errors::Result;
use crate::middlewares::{AdminCapability, StaticTokenCapability};
use crate::runtime::seed::seed_sample_data;
use crate::services::TransferSettings;
use crate::storage::SeaOrmStorage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: SeaOrmStorage,
    pub capability: Arc<dyn AdminCapability>,
    pub transfer: TransferSettings,
}

/// 创建管理权限校验器
fn create_capability(config: &AppConfig) -> Arc<dyn AdminCapability> {
    if config.admin.api_token.is_empty() {
        warn!("==========================================================");
        warn!("  ADMIN TOKEN NOT SET - ALL ADMIN REQUESTS WILL BE DENIED");
        warn!("  Please set the ADMIN_TOKEN env var");
        warn!("==========================================================");
    }
    Arc::new(StaticTokenCapability::new(config.admin.api_token.clone()))
}

/// 准备服务器启动的上下文
/// 包括存储、迁移、示例数据和管理权限校验
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let storage = SeaOrmStorage::connect(&config.database, config.argon2).await?;
    warn!("Storage backend initialized and migrations completed");

    if config.seed.enabled {
        if config.is_production() {
            warn!("Sample data seeding is disabled in production, ignoring seed.enabled");
        } else {
            let report = seed_sample_data(&storage).await?;
            debug!("Seed report: {:?}", report);
        }
    }

    Ok(StartupContext {
        storage,
        capability: create_capability(config),
        transfer: TransferSettings::from(config),
    })
}
