//! 列表查询公共逻辑：搜索、排序白名单、时间范围筛选与分页

use chrono::{NaiveDate, NaiveTime};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use std::str::FromStr;

use crate::errors::{Result, SchoolError};
use crate::models::{ListQuery, PageResult};
use crate::utils::escape_like_pattern;

/// 所有实体通用的创建时间筛选键
pub(crate) const CREATED_FROM: &str = "created_from";
pub(crate) const CREATED_TO: &str = "created_to";

/// 在固定列集合上做不区分大小写的子串搜索（OR 组合）
pub(crate) fn apply_search<E>(select: Select<E>, columns: &[E::Column], search: Option<&str>) -> Select<E>
where
    E: EntityTrait,
{
    // 仅在此处引入，避免与 ColumnTrait 的同名方法冲突
    use sea_orm::sea_query::ExprTrait;

    let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) else {
        return select;
    };

    let pattern = format!("%{}%", escape_like_pattern(&term.to_lowercase()));
    let condition = columns.iter().fold(Condition::any(), |condition, column| {
        condition.add(
            Expr::expr(Func::lower(Expr::col((E::default(), *column))))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    });

    select.filter(condition)
}

/// 按白名单解析排序列，未指定时使用默认列
pub(crate) fn resolve_sort<C: Copy>(
    field: Option<&str>,
    sortable: &[(&'static str, C)],
    default: C,
) -> Result<C> {
    let Some(field) = field.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok(default);
    };

    sortable
        .iter()
        .find(|(key, _)| *key == field)
        .map(|(_, column)| *column)
        .ok_or_else(|| {
            let allowed: Vec<&str> = sortable.iter().map(|(key, _)| *key).collect();
            SchoolError::validation(
                "sort_field",
                format!(
                    "unsupported sort field '{field}', allowed: {}",
                    allowed.join(", ")
                ),
            )
        })
}

/// 解析筛选值
pub(crate) fn parse_filter<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| SchoolError::validation(key, format!("invalid filter value '{value}'")))
}

pub(crate) fn unsupported_filter(key: &str, allowed: &[&str]) -> SchoolError {
    SchoolError::validation(
        key,
        format!("unsupported filter, allowed: {}", allowed.join(", ")),
    )
}

/// 创建时间范围筛选（YYYY-MM-DD，含首尾两天）
pub(crate) fn created_range<E>(
    select: Select<E>,
    column: E::Column,
    key: &str,
    value: &str,
) -> Result<Select<E>>
where
    E: EntityTrait,
{
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SchoolError::validation(key, format!("expected a YYYY-MM-DD date, got '{value}'"))
    })?;
    let start_of_day = date.and_time(NaiveTime::MIN).and_utc().timestamp();

    if key == CREATED_FROM {
        Ok(select.filter(column.gte(start_of_day)))
    } else {
        Ok(select.filter(column.lte(start_of_day + 86_399)))
    }
}

/// 统计总数并按偏移量取一页，id 作为排序的最终依据
pub(crate) async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    sort: E::Column,
    id_column: E::Column,
    query: &ListQuery,
) -> Result<PageResult<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let page_size = query.effective_page_size();
    let page_offset = query.effective_offset();

    let total = select
        .clone()
        .count(db)
        .await
        .map_err(|e| SchoolError::persistence(format!("查询总数失败: {e}")))?;

    let order = if query.sort_desc {
        Order::Desc
    } else {
        Order::Asc
    };

    let items = select
        .order_by(sort, order)
        .order_by_asc(id_column)
        .offset(page_offset)
        .limit(page_size)
        .all(db)
        .await
        .map_err(|e| SchoolError::persistence(format!("查询列表失败: {e}")))?;

    Ok(PageResult {
        items,
        total,
        page_size,
        page_offset,
    })
}
