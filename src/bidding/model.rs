use crate::error::{BidError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 저장소가 부여하는 입찰 식별자
pub type BidId = i64;

/// 오퍼 식별자 (생성 시각 기반)
pub type OfferId = String;

// region:    --- Caller Identity
/// 요청자 신원
/// 전역 로그인 상태 대신 모든 커맨드에 명시적으로 전달한다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CallerIdentity {
    email: String,
}

impl CallerIdentity {
    pub fn new(email: impl AsRef<str>) -> Result<Self> {
        let email = email.as_ref().trim().to_lowercase();
        if email.is_empty() {
            return Err(BidError::Validation("caller email is required".to_string()));
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(BidError::Validation(format!(
                "caller email is malformed: {email}"
            )));
        }
        Ok(Self { email })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
// endregion: --- Caller Identity

// region:    --- Bid Status
/// 입찰 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Active,
    Closed,
    Sold,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Active => "active",
            BidStatus::Closed => "closed",
            BidStatus::Sold => "sold",
        }
    }

    /// 상태 전이 허용 여부 (closed, sold 는 종료 상태)
    pub fn can_transition_to(&self, next: BidStatus) -> bool {
        matches!(
            (self, next),
            (BidStatus::Active, BidStatus::Closed) | (BidStatus::Active, BidStatus::Sold)
        )
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BidStatus {
    type Err = BidError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(BidStatus::Active),
            "closed" => Ok(BidStatus::Closed),
            "sold" => Ok(BidStatus::Sold),
            other => Err(BidError::Validation(format!("unknown bid status: {other}"))),
        }
    }
}
// endregion: --- Bid Status

// region:    --- Offer
/// 구매 희망자의 입찰 제안
/// 한 번 기록되면 수정, 삭제되지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub amount: Decimal,
    pub bidder_email: String,
    pub created_at: DateTime<Utc>,
    /// 재전송 시 중복 등록 방지 키
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}
// endregion: --- Offer

// region:    --- Bid
/// 판매자가 등록한 입찰 목록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_number: Option<String>,
    pub category: String,
    pub item: String,
    pub description: String,
    pub starting_price: Decimal,
    pub start_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    /// 등록자 이메일
    pub email: String,
    pub image: String,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
    pub offers: Vec<Offer>,
    /// 낙관적 잠금용 버전
    pub version: i64,
}

impl Bid {
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.email == email
    }

    /// 해당 이메일의 오퍼가 하나 이상 있는지
    pub fn has_offer_from(&self, email: &str) -> bool {
        self.offers.iter().any(|offer| offer.bidder_email == email)
    }
}

/// 저장소에 새로 기록할 입찰 (id, version 은 저장소가 부여)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBid {
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_number: Option<String>,
    pub category: String,
    pub item: String,
    pub description: String,
    pub starting_price: Decimal,
    pub start_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub email: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl NewBid {
    /// 저장소가 부여한 id 로 입찰 생성 (상태는 항상 active, 오퍼 없음)
    pub fn into_bid(self, id: BidId) -> Bid {
        Bid {
            id,
            name: self.name,
            contact_name: self.contact_name,
            contact_number: self.contact_number,
            category: self.category,
            item: self.item,
            description: self.description,
            starting_price: self.starting_price,
            start_date: self.start_date,
            due_date: self.due_date,
            email: self.email,
            image: self.image,
            status: BidStatus::Active,
            created_at: self.created_at,
            offers: Vec::new(),
            version: 0,
        }
    }
}
// endregion: --- Bid

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_identity_normalizes_email() {
        let caller = CallerIdentity::new("  Farmer@Example.COM ").unwrap();
        assert_eq!(caller.email(), "farmer@example.com");
    }

    #[test]
    fn caller_identity_rejects_blank_or_malformed_email() {
        assert!(CallerIdentity::new("   ").is_err());
        assert!(CallerIdentity::new("no-at-sign").is_err());
        assert!(CallerIdentity::new("@example.com").is_err());
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [BidStatus::Active, BidStatus::Closed, BidStatus::Sold] {
            assert_eq!(status.as_str().parse::<BidStatus>().unwrap(), status);
        }
        assert!("pending".parse::<BidStatus>().is_err());
    }

    #[test]
    fn only_active_bids_can_change_status() {
        assert!(BidStatus::Active.can_transition_to(BidStatus::Closed));
        assert!(BidStatus::Active.can_transition_to(BidStatus::Sold));
        assert!(!BidStatus::Closed.can_transition_to(BidStatus::Sold));
        assert!(!BidStatus::Sold.can_transition_to(BidStatus::Active));
        assert!(!BidStatus::Active.can_transition_to(BidStatus::Active));
    }

    #[test]
    fn new_bid_starts_active_without_offers() {
        let now = Utc::now();
        let bid = NewBid {
            name: "Paddy harvest".to_string(),
            contact_name: None,
            contact_number: Some("0771234567".to_string()),
            category: "Grains".to_string(),
            item: "500kg".to_string(),
            description: "Samba paddy".to_string(),
            starting_price: Decimal::from(1000),
            start_date: now,
            due_date: now,
            email: "seller@example.com".to_string(),
            image: "bids/paddy.jpg".to_string(),
            created_at: now,
        }
        .into_bid(7);

        assert_eq!(bid.id, 7);
        assert_eq!(bid.status, BidStatus::Active);
        assert!(bid.offers.is_empty());
        assert_eq!(bid.version, 0);
    }
}
// endregion: --- Tests
