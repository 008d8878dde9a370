//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 每个变体携带结构化字段，便于调用方按字段匹配而不是解析字符串。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义（结构体变体）
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - 便捷构造函数（snake_case，参数接受 `impl Into<字段类型>`）
macro_rules! define_school_errors {
    ($(
        $variant:ident { $($field:ident : $ty:ty),* $(,)? } = ($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SchoolError {
            $($variant { $($field: $ty),* },)*
        }

        impl SchoolError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(SchoolError::$variant { .. } => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(SchoolError::$variant { .. } => $type_name,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl SchoolError {
                $(
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        SchoolError::$variant { $($field: $field.into()),* }
                    }
                )*
            }
        }
    };
}

define_school_errors! {
    DatabaseConfig { message: String } = ("E003", "Database Configuration Error"),
    DatabaseConnection { message: String } = ("E004", "Database Connection Error"),
    Persistence { message: String } = ("E005", "Persistence Error"),
    FileOperation { message: String } = ("E006", "File Operation Error"),
    Validation { field: String, reason: String } = ("E007", "Validation Error"),
    NotFound { entity: String, id: i64 } = ("E008", "Resource Not Found"),
    Serialization { message: String } = ("E009", "Serialization Error"),
    Authorization { message: String } = ("E013", "Authorization Error"),
    Conflict { field: String, value: String } = ("E014", "Conflict Error"),
    MissingColumns { columns: Vec<String> } = ("E015", "Missing Columns"),
}

impl SchoolError {
    /// 获取错误详情
    pub fn message(&self) -> String {
        match self {
            SchoolError::DatabaseConfig { message }
            | SchoolError::DatabaseConnection { message }
            | SchoolError::Persistence { message }
            | SchoolError::FileOperation { message }
            | SchoolError::Serialization { message }
            | SchoolError::Authorization { message } => message.clone(),
            SchoolError::Validation { field, reason } => format!("{field}: {reason}"),
            SchoolError::NotFound { entity, id } => format!("{entity} {id} not found"),
            SchoolError::Conflict { field, value } => {
                format!("{field} '{value}' already exists")
            }
            SchoolError::MissingColumns { columns } => {
                format!("Missing required columns: {}", columns.join(", "))
            }
        }
    }

    /// 是否为调用方输入导致的错误（非基础设施故障）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SchoolError::Validation { .. }
                | SchoolError::NotFound { .. }
                | SchoolError::Conflict { .. }
                | SchoolError::MissingColumns { .. }
                | SchoolError::Authorization { .. }
        )
    }

    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SchoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SchoolError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SchoolError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                SchoolError::conflict("unique", detail)
            }
            _ => SchoolError::persistence(err.to_string()),
        }
    }
}

impl From<std::io::Error> for SchoolError {
    fn from(err: std::io::Error) -> Self {
        SchoolError::file_operation(err.to_string())
    }
}

impl From<csv::Error> for SchoolError {
    fn from(err: csv::Error) -> Self {
        SchoolError::file_operation(format!("CSV 处理失败: {err}"))
    }
}

impl From<serde_json::Error> for SchoolError {
    fn from(err: serde_json::Error) -> Self {
        SchoolError::serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SchoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchoolError::database_config("test").code(), "E003");
        assert_eq!(SchoolError::persistence("test").code(), "E005");
        assert_eq!(SchoolError::validation("email", "bad").code(), "E007");
        assert_eq!(SchoolError::not_found("teacher", 3).code(), "E008");
        assert_eq!(SchoolError::conflict("mobile", "0501").code(), "E014");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            SchoolError::missing_columns(vec!["code".to_string()]).error_type(),
            "Missing Columns"
        );
        assert_eq!(
            SchoolError::validation("name", "required").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            SchoolError::validation("capacity", "must be at least 1").message(),
            "capacity: must be at least 1"
        );
        assert_eq!(
            SchoolError::not_found("class", 42).message(),
            "class 42 not found"
        );
        assert_eq!(
            SchoolError::conflict("mobile", "0501234567").message(),
            "mobile '0501234567' already exists"
        );
        assert_eq!(
            SchoolError::missing_columns(vec!["code".to_string(), "amount".to_string()])
                .message(),
            "Missing required columns: code, amount"
        );
    }

    #[test]
    fn test_structured_fields() {
        let err = SchoolError::not_found("student", 7);
        assert!(matches!(
            err,
            SchoolError::NotFound { ref entity, id: 7 } if entity == "student"
        ));
        assert!(err.is_client_error());
        assert!(!SchoolError::persistence("disk full").is_client_error());
    }

    #[test]
    fn test_format_simple() {
        let err = SchoolError::validation("email", "Email format is invalid");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Email format is invalid"));
    }
}
