use serde::Serialize;

use crate::errors::SchoolError;

// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1999
    BadRequest = 1000,
    ValidationFailed = 1001,
    Unauthorized = 1002,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,

    // 导入导出 4000-4999
    ImportFileMissingColumn = 4001,
    ImportFileParseFailed = 4002,
    ImportFileDataInvalid = 4003,
    FileUploadFailed = 4004,
    ExportFailed = 4005,
    FileSizeExceeded = 4006,
}

impl From<&SchoolError> for ErrorCode {
    fn from(err: &SchoolError) -> Self {
        match err {
            SchoolError::Validation { .. } => ErrorCode::ValidationFailed,
            SchoolError::NotFound { .. } => ErrorCode::NotFound,
            SchoolError::Conflict { .. } => ErrorCode::Conflict,
            SchoolError::MissingColumns { .. } => ErrorCode::ImportFileMissingColumn,
            SchoolError::Authorization { .. } => ErrorCode::Unauthorized,
            SchoolError::FileOperation { .. } => ErrorCode::ImportFileParseFailed,
            _ => ErrorCode::InternalServerError,
        }
    }
}
