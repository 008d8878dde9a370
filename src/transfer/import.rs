//! CSV 导入
//!
//! 文件级错误（缺少必需列、超出行数上限）直接返回，没有数据行时得到空结果；
//! 行级错误被收集到 `ImportResult.errors`，不影响其他行，每行独立提交。

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use super::coerce::{
    parse_capacity, parse_discount_type, parse_end_of_day, parse_id, parse_number, parse_status,
    parse_usage_limit,
};
use super::schema::{CREATED_AT, EntityKind, ID};
use crate::config::ImportConfig;
use crate::errors::{Result, SchoolError};
use crate::models::EntityStatus;
use crate::models::classes::requests::{CreateClassRequest, UpdateClassRequest};
use crate::models::promo_codes::requests::{CreatePromoCodeRequest, UpdatePromoCodeRequest};
use crate::models::students::requests::{CreateStudentRequest, UpdateStudentRequest};
use crate::models::teachers::requests::{CreateTeacherRequest, UpdateTeacherRequest};
use crate::storage::SeaOrmStorage;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV 解析选项
#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub quote: u8,
    pub has_header: bool,
    pub max_rows: usize,
    pub max_errors: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            has_header: true,
            max_rows: 10_000,
            max_errors: 200,
        }
    }
}

impl From<&ImportConfig> for CsvOptions {
    fn from(config: &ImportConfig) -> Self {
        let defaults = Self::default();
        Self {
            delimiter: single_byte(&config.delimiter).unwrap_or(defaults.delimiter),
            quote: single_byte(&config.enclosure).unwrap_or(defaults.quote),
            has_header: config.has_header,
            max_rows: config.max_rows,
            max_errors: config.max_errors,
        }
    }
}

/// 配置中的分隔符必须是单个 ASCII 字符，`\t` 表示制表符
fn single_byte(value: &str) -> Option<u8> {
    match value {
        "\\t" => Some(b'\t'),
        v if v.len() == 1 && v.is_ascii() => v.bytes().next(),
        _ => None,
    }
}

/// 导入结果汇总，满足 total = inserted + updated + skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub total: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub blank: usize,
    pub errors: Vec<String>,
    pub errors_omitted: usize,
}

impl ImportResult {
    fn push_error(&mut self, message: String, max_errors: usize) {
        if self.errors.len() < max_errors {
            self.errors.push(message);
        } else {
            self.errors_omitted += 1;
        }
    }
}

/// 一行数据：列 key 到单元格文本（已去除首尾空白）
///
/// 只包含表头中出现的列；更新时据此区分“未提供”和“清空”。
#[derive(Debug, Default)]
struct CsvRow {
    number: usize,
    cells: BTreeMap<&'static str, String>,
}

impl CsvRow {
    fn get(&self, key: &str) -> Option<&str> {
        self.cells.get(key).map(String::as_str)
    }

    /// 非空值
    fn text(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).map(str::to_string)
    }

    /// 列存在时：空值表示清空
    fn patch_text(&self, key: &str) -> Option<Option<String>> {
        self.get(key).map(|v| Some(v.to_string()).filter(|v| !v.is_empty()))
    }

    /// 空白状态不覆盖现有值
    fn status(&self) -> Option<EntityStatus> {
        self.get("status").filter(|v| !v.is_empty()).map(parse_status)
    }

    fn value(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.is_empty())
    }

    fn missing_required(&self, kind: EntityKind) -> Vec<&'static str> {
        kind.required_keys()
            .filter(|key| self.get(key).is_none_or(str::is_empty))
            .collect()
    }
}

/// 解析后的文件：行号从 1 开始，按数据行计数
fn parse_rows(kind: EntityKind, data: &[u8], options: &CsvOptions) -> Result<Vec<CsvRow>> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .quote(options.quote)
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = reader.byte_records();

    // 每个位置对应的列 key，None 表示未知列
    let mapping: Vec<Option<&'static str>> = if options.has_header {
        let header = match records.next() {
            Some(record) => record?,
            None => return Ok(Vec::new()),
        };

        let mut seen = Vec::new();
        let mapping: Vec<Option<&'static str>> = header
            .iter()
            .map(|cell| {
                let cell = String::from_utf8_lossy(cell);
                let key = kind
                    .match_header(&cell)
                    .map(|c| c.key)
                    .filter(|key| !seen.contains(key));
                if let Some(key) = key {
                    seen.push(key);
                }
                key
            })
            .collect();

        let missing: Vec<String> = kind
            .required_keys()
            .filter(|key| !seen.contains(key))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(SchoolError::missing_columns(missing));
        }
        mapping
    } else {
        kind.columns().iter().map(|c| Some(c.key)).collect()
    };

    let mut rows = Vec::new();
    for (index, record) in records.enumerate() {
        let record = record?;
        if rows.len() >= options.max_rows {
            return Err(SchoolError::validation(
                "file",
                format!("a single import supports at most {} rows", options.max_rows),
            ));
        }

        let mut row = CsvRow {
            number: index + 1,
            ..Default::default()
        };
        for (position, key) in mapping.iter().enumerate() {
            let Some(key) = key else { continue };
            // created_at 只读
            if *key == CREATED_AT {
                continue;
            }
            let cell = record
                .get(position)
                .map(|c| String::from_utf8_lossy(c).trim().to_string())
                .unwrap_or_default();
            row.cells.insert(*key, cell);
        }
        rows.push(row);
    }

    Ok(rows)
}

enum RowOutcome {
    Inserted,
    Updated,
}

/// CSV 导入器
pub struct CsvImporter {
    storage: SeaOrmStorage,
    options: CsvOptions,
}

impl CsvImporter {
    pub fn new(storage: SeaOrmStorage, options: CsvOptions) -> Self {
        Self { storage, options }
    }

    /// 导入一个文件，id 非空的行更新已有记录，其余新建
    pub async fn import(&self, kind: EntityKind, data: &[u8]) -> Result<ImportResult> {
        let rows = parse_rows(kind, data, &self.options)?;
        let mut result = ImportResult::default();
        if rows.is_empty() {
            info!("{} import: no data to import", kind);
            return Ok(result);
        }

        for row in rows {
            if row.is_blank() {
                result.blank += 1;
                continue;
            }
            result.total += 1;

            let missing = row.missing_required(kind);
            if !missing.is_empty() {
                let message = format!(
                    "Row {}: Missing required fields: {}",
                    row.number,
                    missing.join(", ")
                );
                warn!("{} import: {}", kind, message);
                result.skipped += 1;
                result.push_error(message, self.options.max_errors);
                continue;
            }

            let outcome = match row.text(ID) {
                Some(raw_id) => self.update_row(kind, &raw_id, &row).await.map_err(|e| {
                    format!("Row {}: Failed to update record: {}", row.number, e.message())
                }),
                None => self.insert_row(kind, &row).await.map_err(|e| {
                    format!("Row {}: Failed to insert record: {}", row.number, e.message())
                }),
            };

            match outcome {
                Ok(RowOutcome::Inserted) => result.inserted += 1,
                Ok(RowOutcome::Updated) => result.updated += 1,
                Err(message) => {
                    warn!("{} import: {}", kind, message);
                    result.skipped += 1;
                    result.push_error(message, self.options.max_errors);
                }
            }
        }

        info!(
            "{} import finished: total={}, inserted={}, updated={}, skipped={}, blank={}",
            kind, result.total, result.inserted, result.updated, result.skipped, result.blank
        );

        Ok(result)
    }

    async fn insert_row(&self, kind: EntityKind, row: &CsvRow) -> Result<RowOutcome> {
        match kind {
            EntityKind::Teachers => {
                let req = CreateTeacherRequest {
                    first_name: row.text("first_name"),
                    last_name: row.text("last_name"),
                    email: row.value("email"),
                    mobile: row.value("mobile"),
                    password: None,
                    status: row.status().unwrap_or_default(),
                };
                self.storage.teachers().create(req).await?;
            }
            EntityKind::Students => {
                let req = CreateStudentRequest {
                    first_name: row.value("first_name"),
                    last_name: row.value("last_name"),
                    email: row.text("email"),
                    mobile: row.value("mobile"),
                    password: None,
                    promo_code: row.text("promo_code"),
                    status: row.status().unwrap_or_default(),
                };
                self.storage.students().create(req).await?;
            }
            EntityKind::Classes => {
                let req = CreateClassRequest {
                    name: row.value("name"),
                    description: row.text("description"),
                    teacher_id: row
                        .text("teacher_id")
                        .map(|v| parse_id("teacher_id", &v))
                        .transpose()?,
                    capacity: row.get("capacity").and_then(parse_capacity),
                    status: row.status().unwrap_or_default(),
                };
                self.storage.classes().create(req).await?;
            }
            EntityKind::PromoCodes => {
                let req = CreatePromoCodeRequest {
                    code: row.value("code"),
                    description: row.text("description"),
                    discount_type: row
                        .get("discount_type")
                        .map(parse_discount_type)
                        .unwrap_or_default(),
                    discount_value: parse_number(&row.value("amount")),
                    usage_limit: row.get("usage_limit").and_then(parse_usage_limit),
                    start_date: None,
                    expiry_date: row.get("expiry_date").and_then(parse_end_of_day),
                    status: row.status().unwrap_or_default(),
                };
                self.storage.promo_codes().create(req).await?;
            }
        }
        Ok(RowOutcome::Inserted)
    }

    /// 更新已有记录，只修改表头中出现的列；记录不存在时报 NotFound
    async fn update_row(&self, kind: EntityKind, raw_id: &str, row: &CsvRow) -> Result<RowOutcome> {
        let id = parse_id(ID, raw_id)?;

        match kind {
            EntityKind::Teachers => {
                let req = UpdateTeacherRequest {
                    first_name: row.patch_text("first_name"),
                    last_name: row.patch_text("last_name"),
                    email: row.text("email"),
                    mobile: row.text("mobile"),
                    password: None,
                    status: row.status(),
                };
                self.storage.teachers().update(id, req).await?;
            }
            EntityKind::Students => {
                let req = UpdateStudentRequest {
                    first_name: row.text("first_name"),
                    last_name: row.text("last_name"),
                    email: row.patch_text("email"),
                    mobile: row.text("mobile"),
                    password: None,
                    promo_code: row.patch_text("promo_code"),
                    status: row.status(),
                };
                self.storage.students().update(id, req).await?;
            }
            EntityKind::Classes => {
                let teacher_id = match row.get("teacher_id") {
                    None => None,
                    Some("") => Some(None),
                    Some(v) => Some(Some(parse_id("teacher_id", v)?)),
                };
                let req = UpdateClassRequest {
                    name: row.text("name"),
                    description: row.patch_text("description"),
                    teacher_id,
                    capacity: row.get("capacity").and_then(parse_capacity),
                    status: row.status(),
                };
                self.storage.classes().update(id, req).await?;
            }
            EntityKind::PromoCodes => {
                let req = UpdatePromoCodeRequest {
                    code: row.text("code"),
                    description: row.patch_text("description"),
                    discount_type: row
                        .text("discount_type")
                        .map(|v| parse_discount_type(&v)),
                    discount_value: row.get("amount").map(parse_number),
                    usage_limit: row.get("usage_limit").map(parse_usage_limit),
                    start_date: None,
                    expiry_date: row.get("expiry_date").map(parse_end_of_day),
                    status: row.status(),
                };
                self.storage.promo_codes().update(id, req).await?;
            }
        }
        Ok(RowOutcome::Updated)
    }
}
