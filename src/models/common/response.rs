use serde::{Deserialize, Serialize};

use super::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T> {
    fn new(code: ErrorCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Success, Some(data), message)
    }

    /// 附带结构化详情的错误响应，例如缺失的列名
    pub fn error(code: ErrorCode, details: T, message: impl Into<String>) -> Self {
        Self::new(code, Some(details), message)
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success as i32
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Success, None, message)
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, None, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_data_is_omitted() {
        let response = ApiResponse::error_empty(ErrorCode::NotFound, "gone");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["code"], ErrorCode::NotFound as i32);
        assert!(json.get("data").is_none());
        assert!(!ApiResponse::error_empty(ErrorCode::NotFound, "gone").is_success());
        assert!(ApiResponse::success(1, "ok").is_success());
    }
}
