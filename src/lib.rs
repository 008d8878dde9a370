//! School Manager - 学校管理后台服务
//!
//! 管理教师、学生、班级和优惠码，支持 CSV 批量导入导出，基于 Actix Web 和 SeaORM 构建。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 管理权限中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理与示例数据
//! - `services`: HTTP 业务处理层
//! - `storage`: 数据存储层（仓储、关联管理、数据库结构）
//! - `transfer`: CSV 导入导出引擎
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod transfer;
pub mod utils;
