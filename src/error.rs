// region:    --- Imports
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use tracing::error;

use crate::bidding::model::BidStatus;

// endregion: --- Imports

// region:    --- Error
/// 입찰 서비스 에러
#[derive(Debug, thiserror::Error)]
pub enum BidError {
    /// 필수 값 누락 또는 잘못된 입력 (저장소 접근 전에 검출)
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("caller identity missing: {0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("bid is no longer active")]
    NotActive,

    #[error("bidding period ended")]
    BiddingEnded,

    #[error("offer too low, must exceed starting price ({starting_price})")]
    BelowStartingPrice { starting_price: Decimal },

    #[error("offer too low, must exceed current highest bid ({highest_bid})")]
    BelowHighestBid { highest_bid: Decimal },

    #[error("not allowed: {0}")]
    Forbidden(String),

    #[error("cannot change bid status from {from} to {to}")]
    InvalidTransition { from: BidStatus, to: BidStatus },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("gave up after {0} attempts due to concurrent updates")]
    MaxRetriesExceeded(u32),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, BidError>;

impl BidError {
    /// 클라이언트에 전달되는 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            BidError::Validation(_) => "VALIDATION",
            BidError::Unauthorized(_) => "UNAUTHORIZED",
            BidError::NotFound(_) => "NOT_FOUND",
            BidError::NotActive => "NOT_ACTIVE",
            BidError::BiddingEnded => "ALREADY_ENDED",
            BidError::BelowStartingPrice { .. } => "BELOW_STARTING_PRICE",
            BidError::BelowHighestBid { .. } => "BELOW_HIGHEST_BID",
            BidError::Forbidden(_) => "FORBIDDEN",
            BidError::InvalidTransition { .. } => "INVALID_TRANSITION",
            BidError::Conflict(_) => "CONFLICT",
            BidError::MaxRetriesExceeded(_) => "MAX_RETRIES_EXCEEDED",
            BidError::Config(_) => "CONFIG",
            BidError::Storage(_) => "STORAGE",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BidError::Validation(_) => StatusCode::BAD_REQUEST,
            BidError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BidError::NotFound(_) => StatusCode::NOT_FOUND,
            BidError::Forbidden(_) => StatusCode::FORBIDDEN,
            BidError::NotActive
            | BidError::BiddingEnded
            | BidError::InvalidTransition { .. }
            | BidError::Conflict(_)
            | BidError::MaxRetriesExceeded(_) => StatusCode::CONFLICT,
            BidError::BelowStartingPrice { .. } | BidError::BelowHighestBid { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BidError::Config(_) | BidError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 요청 본문 파싱 실패 (잘못된 JSON, 타입 불일치, 필드 누락)
impl From<JsonRejection> for BidError {
    fn from(rejection: JsonRejection) -> Self {
        BidError::Validation(rejection.body_text())
    }
}

impl IntoResponse for BidError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{:<12} --> 요청 처리 실패: {:?}", "Handler", self);
        }

        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        // 금액 관련 실패는 기준 금액을 함께 돌려준다
        match &self {
            BidError::BelowStartingPrice { starting_price } => {
                body["starting_price"] = serde_json::json!(starting_price);
            }
            BidError::BelowHighestBid { highest_bid } => {
                body["current_price"] = serde_json::json!(highest_bid);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}
// endregion: --- Error

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rule_messages_are_distinct() {
        let low_start = BidError::BelowStartingPrice {
            starting_price: Decimal::from(1000),
        };
        let low_high = BidError::BelowHighestBid {
            highest_bid: Decimal::from(1800),
        };
        let ended = BidError::BiddingEnded;

        assert!(low_start.to_string().contains("starting price"));
        assert!(low_high.to_string().contains("current highest bid"));
        assert_eq!(ended.to_string(), "bidding period ended");
        assert_ne!(low_start.code(), low_high.code());
    }

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(
            BidError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BidError::NotFound("bid 1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(BidError::NotActive.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            BidError::Storage(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
// endregion: --- Tests
