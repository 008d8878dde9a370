//! CSV 导入导出
//!
//! - `schema`：各实体的列定义
//! - `coerce`：单元格文本到领域类型的转换
//! - `import`：逐行校验、新建或更新，汇总结果
//! - `export`：分页导出与导入模板

pub mod coerce;
pub mod export;
pub mod import;
pub mod schema;

pub use export::{CsvExporter, ExportFilter, write_template};
pub use import::{CsvImporter, CsvOptions, ImportResult};
pub use schema::{ColumnSpec, EntityKind};
