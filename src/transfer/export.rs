//! CSV 导出与导入模板

use std::future::Future;
use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use super::schema::EntityKind;
use crate::errors::{Result, SchoolError};
use crate::models::classes::entities::Class;
use crate::models::promo_codes::entities::PromoCode;
use crate::models::students::entities::Student;
use crate::models::teachers::entities::Teacher;
use crate::models::{EntityStatus, ListQuery, PageResult};
use crate::storage::SeaOrmStorage;
use crate::storage::sea_orm_storage::query::{CREATED_FROM, CREATED_TO};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// 导出筛选条件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportFilter {
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub status: Option<EntityStatus>,
}

impl ExportFilter {
    fn to_query(&self, page_size: u64, page_offset: u64) -> ListQuery {
        let mut query = ListQuery::new().page(page_size, page_offset);
        if let Some(from) = self.created_from {
            query = query.filter(CREATED_FROM, from.format(DATE_FORMAT).to_string());
        }
        if let Some(to) = self.created_to {
            query = query.filter(CREATED_TO, to.format(DATE_FORMAT).to_string());
        }
        if let Some(status) = self.status {
            query = query.filter("status", status.to_string());
        }
        query
    }
}

fn datetime_cell(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

fn teacher_row(t: &Teacher) -> Vec<String> {
    vec![
        t.id.to_string(),
        t.first_name.clone().unwrap_or_default(),
        t.last_name.clone().unwrap_or_default(),
        t.email.clone(),
        t.mobile.clone(),
        t.status.to_string(),
        datetime_cell(&t.created_at),
    ]
}

fn student_row(s: &Student) -> Vec<String> {
    vec![
        s.id.to_string(),
        s.first_name.clone(),
        s.last_name.clone(),
        s.email.clone().unwrap_or_default(),
        s.mobile.clone(),
        s.promo_code.clone().unwrap_or_default(),
        s.status.to_string(),
        datetime_cell(&s.created_at),
    ]
}

fn class_row(c: &Class) -> Vec<String> {
    vec![
        c.id.to_string(),
        c.name.clone(),
        c.description.clone().unwrap_or_default(),
        c.teacher_id.map(|id| id.to_string()).unwrap_or_default(),
        c.capacity.to_string(),
        c.status.to_string(),
        datetime_cell(&c.created_at),
    ]
}

fn promo_code_row(p: &PromoCode) -> Vec<String> {
    vec![
        p.id.to_string(),
        p.code.clone(),
        p.description.clone().unwrap_or_default(),
        p.discount_type.to_string(),
        p.discount_value.to_string(),
        p.usage_limit.map(|l| l.to_string()).unwrap_or_default(),
        p.expiry_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        p.status.to_string(),
        datetime_cell(&p.created_at),
    ]
}

/// CSV 导出器，按批分页读取，避免一次加载整张表
pub struct CsvExporter {
    storage: SeaOrmStorage,
    batch_size: u64,
}

impl CsvExporter {
    pub fn new(storage: SeaOrmStorage, batch_size: u64) -> Self {
        Self {
            storage,
            batch_size: batch_size.max(1),
        }
    }

    /// 导出到任意 `Write`，返回写出的数据行数（不含表头）
    pub async fn export<W: Write>(
        &self,
        kind: EntityKind,
        filter: &ExportFilter,
        sink: &mut W,
    ) -> Result<u64> {
        sink.write_all(UTF8_BOM)?;
        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(kind.columns().iter().map(|c| c.label))?;

        let written = match kind {
            EntityKind::Teachers => {
                let repo = self.storage.teachers();
                self.write_pages(&mut writer, filter, teacher_row, |q| {
                    let repo = repo.clone();
                    async move { repo.list(&q).await }
                })
                .await?
            }
            EntityKind::Students => {
                let repo = self.storage.students();
                self.write_pages(&mut writer, filter, student_row, |q| {
                    let repo = repo.clone();
                    async move { repo.list(&q).await }
                })
                .await?
            }
            EntityKind::Classes => {
                let repo = self.storage.classes();
                self.write_pages(&mut writer, filter, class_row, |q| {
                    let repo = repo.clone();
                    async move { repo.list(&q).await }
                })
                .await?
            }
            EntityKind::PromoCodes => {
                let repo = self.storage.promo_codes();
                self.write_pages(&mut writer, filter, promo_code_row, |q| {
                    let repo = repo.clone();
                    async move { repo.list(&q).await }
                })
                .await?
            }
        };

        writer.flush()?;
        info!("{} export finished: {} rows", kind, written);
        Ok(written)
    }

    async fn write_pages<W, T, F, Fut>(
        &self,
        writer: &mut csv::Writer<W>,
        filter: &ExportFilter,
        to_row: fn(&T) -> Vec<String>,
        fetch: F,
    ) -> Result<u64>
    where
        W: Write,
        F: Fn(ListQuery) -> Fut,
        Fut: Future<Output = Result<PageResult<T>>>,
    {
        let mut offset = 0;
        let mut written = 0;

        loop {
            let page = fetch(filter.to_query(self.batch_size, offset)).await?;
            for item in &page.items {
                writer.write_record(to_row(item))?;
            }
            written += page.items.len() as u64;
            offset += page.items.len() as u64;

            if page.items.is_empty() || !page.has_more() {
                break;
            }
        }

        Ok(written)
    }
}

/// 导入模板：表头、示例行、说明行
pub fn write_template<W: Write>(kind: EntityKind, sink: &mut W) -> Result<()> {
    sink.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(sink);

    let columns = kind.columns();
    writer.write_record(columns.iter().map(|c| c.label))?;
    writer.write_record(columns.iter().map(|c| format!("example_{}", c.key)))?;
    writer.write_record(columns.iter().map(|c| format!("// {}", c.label)))?;

    writer
        .flush()
        .map_err(|e| SchoolError::file_operation(format!("写入模板失败: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_layout() {
        let mut out = Vec::new();
        write_template(EntityKind::PromoCodes, &mut out).unwrap();
        assert!(out.starts_with(UTF8_BOM));

        let text = String::from_utf8(out[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID,Code,Description,Discount Type,Amount"));
        assert!(lines[1].starts_with("example_id,example_code,"));
        assert!(lines[2].starts_with("// ID,// Code,// Description"));
    }

    #[test]
    fn test_filter_to_query() {
        let filter = ExportFilter {
            created_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            created_to: None,
            status: Some(EntityStatus::Inactive),
        };
        let query = filter.to_query(50, 100);
        assert_eq!(query.filters.get(CREATED_FROM).map(String::as_str), Some("2025-01-01"));
        assert_eq!(query.filters.get("status").map(String::as_str), Some("inactive"));
        assert!(!query.filters.contains_key(CREATED_TO));
        assert_eq!(query.effective_page_size(), 50);
        assert_eq!(query.effective_offset(), 100);
    }
}
