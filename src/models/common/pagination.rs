use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::errors::{Result, SchoolError};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 200;

// 列表查询参数（用于存储层）
//
// 搜索、筛选和排序字段由各实体的白名单校验，未知字段返回 Validation 错误。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    pub sort_field: Option<String>,
    #[serde(default)]
    pub sort_desc: bool,
    pub page_size: Option<u64>,
    pub page_offset: Option<u64>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, desc: bool) -> Self {
        self.sort_field = Some(field.into());
        self.sort_desc = desc;
        self
    }

    pub fn page(mut self, size: u64, offset: u64) -> Self {
        self.page_size = Some(size);
        self.page_offset = Some(offset);
        self
    }

    /// 实际分页大小，默认 20，限制在 [1, 200]
    pub fn effective_page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn effective_offset(&self) -> u64 {
        self.page_offset.unwrap_or(0)
    }

    /// 从 HTTP 查询参数构建
    ///
    /// 保留参数：search、sort、order、page_size、page_offset，其余参数全部视为筛选条件。
    pub fn from_params(params: HashMap<String, String>) -> Result<Self> {
        let mut query = ListQuery::new();

        for (key, value) in params {
            match key.as_str() {
                "search" => query.search = Some(value),
                "sort" => query.sort_field = Some(value),
                "order" => {
                    query.sort_desc = match value.to_ascii_lowercase().as_str() {
                        "asc" => false,
                        "desc" => true,
                        _ => {
                            return Err(SchoolError::validation(
                                "order",
                                format!("expected asc or desc, got '{value}'"),
                            ));
                        }
                    }
                }
                "page_size" => query.page_size = Some(parse_number("page_size", &value)?),
                "page_offset" => query.page_offset = Some(parse_number("page_offset", &value)?),
                _ => {
                    query.filters.insert(key, value);
                }
            }
        }

        Ok(query)
    }
}

fn parse_number(field: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| SchoolError::validation(field, format!("'{value}' is not a valid number")))
}

// 分页列表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page_size: u64,
    pub page_offset: u64,
}

impl<T> PageResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page_size: self.page_size,
            page_offset: self.page_offset,
        }
    }

    /// 是否还有下一页
    pub fn has_more(&self) -> bool {
        self.page_offset + (self.items.len() as u64) < self.total
    }
}
