use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, SchoolError};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

// 可选的国际前缀 +，允许空格和连字符分隔，数字部分 6-20 位
static MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 -]{4,23}[0-9]$").expect("Invalid mobile regex"));

pub fn validate_email(email: &str) -> std::result::Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_mobile(mobile: &str) -> std::result::Result<(), &'static str> {
    if !MOBILE_RE.is_match(mobile) {
        return Err("Mobile number format is invalid");
    }
    let digits = mobile.chars().filter(char::is_ascii_digit).count();
    if !(6..=20).contains(&digits) {
        return Err("Mobile number must contain between 6 and 20 digits");
    }
    Ok(())
}

/// 必填文本：去除首尾空白后不能为空
pub fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SchoolError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// 可选文本：去除首尾空白，空字符串视为 None
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 必填邮箱
pub fn checked_email(value: &str) -> Result<String> {
    let email = required_text("email", value)?;
    validate_email(&email).map_err(|msg| SchoolError::validation("email", msg))?;
    Ok(email)
}

/// 必填手机号
pub fn checked_mobile(value: &str) -> Result<String> {
    let mobile = required_text("mobile", value)?;
    validate_mobile(&mobile).map_err(|msg| SchoolError::validation("mobile", msg))?;
    Ok(mobile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("ann.lee@school.example").is_ok());
        assert!(validate_email("ann.lee@").is_err());
        assert!(validate_email("no-at-sign.example.com").is_err());
    }

    #[test]
    fn test_valid_mobile() {
        assert!(validate_mobile("0501234567").is_ok());
        assert!(validate_mobile("+972 50-123-4567").is_ok());
        assert!(validate_mobile("12345").is_err());
        assert!(validate_mobile("05o1234567").is_err());
        assert!(validate_mobile("-0501234567").is_err());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", "  Algebra ").unwrap(), "Algebra");
        let err = required_text("name", "   ").unwrap_err();
        assert_eq!(err, SchoolError::validation("name", "must not be empty"));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(optional_text(Some("   ".into())), None);
        assert_eq!(optional_text(None), None);
    }
}
