//! 커맨드 입력 정리 공통 함수
use crate::error::{BidError, Result};

/// 필수 문자열 (앞뒤 공백 제거 후 비어 있으면 검증 에러)
pub fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BidError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// 선택 문자열 (공백뿐이면 None)
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// endregion: --- Tests
