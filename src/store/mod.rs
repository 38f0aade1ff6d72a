//! 문서 저장소 경계
//! 입찰 코어는 이 트레이트만 통해 저장소에 접근한다.
// region:    --- Imports
use crate::bidding::model::{Bid, BidId, BidStatus, NewBid, Offer};
use crate::error::Result;
use crate::profile::model::{NewProfile, UserProfile};
use async_trait::async_trait;

// endregion: --- Imports

// region:    --- Modules
pub mod memory;
pub mod postgres;

pub use memory::{InMemoryBidStore, InMemoryProfileStore};
pub use postgres::{PostgresBidStore, PostgresProfileStore};
// endregion: --- Modules

// region:    --- Bid Filter
/// 입찰 목록 조회 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidFilter {
    All,
    /// 등록자 이메일 일치 (판매자 화면)
    Creator(String),
    /// 해당 이메일의 오퍼를 포함 (참여자 화면)
    Participant(String),
}

impl BidFilter {
    pub fn matches(&self, bid: &Bid) -> bool {
        match self {
            BidFilter::All => true,
            BidFilter::Creator(email) => bid.is_owned_by(email),
            BidFilter::Participant(email) => bid.has_offer_from(email),
        }
    }
}
// endregion: --- Bid Filter

// region:    --- Store Traits
/// 입찰 저장소
#[async_trait]
pub trait BidStore: Send + Sync {
    /// 새 입찰 저장 (id 부여, 상태 active, 오퍼 없음)
    async fn create_bid(&self, new_bid: NewBid) -> Result<Bid>;

    async fn get_bid(&self, id: BidId) -> Result<Option<Bid>>;

    /// 생성 시각 내림차순
    async fn list_bids(&self, filter: &BidFilter) -> Result<Vec<Bid>>;

    /// 오퍼 목록 전체 교체
    /// 저장된 버전이 `expected_version` 과 다르면 `None` (버전 충돌)
    async fn replace_offers(
        &self,
        id: BidId,
        offers: Vec<Offer>,
        expected_version: i64,
    ) -> Result<Option<Bid>>;

    /// 상태 변경 (버전 충돌 시 `None`)
    async fn set_status(
        &self,
        id: BidId,
        status: BidStatus,
        expected_version: i64,
    ) -> Result<Option<Bid>>;
}

/// 사용자 프로필 저장소
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// 이메일 중복 시 `BidError::Conflict`
    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile>;

    async fn get_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>>;

    /// 없는 프로필이면 `BidError::NotFound`
    async fn update_profile(&self, profile: UserProfile) -> Result<UserProfile>;
}
// endregion: --- Store Traits

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn sample_bid() -> Bid {
        let now = Utc::now();
        let mut bid = NewBid {
            name: "Coconut".to_string(),
            contact_name: None,
            contact_number: None,
            category: "Fruits".to_string(),
            item: "1000 nuts".to_string(),
            description: "King coconut".to_string(),
            starting_price: Decimal::from(50_000),
            start_date: now,
            due_date: now + Duration::days(7),
            email: "owner@example.com".to_string(),
            image: "bids/coconut.jpg".to_string(),
            created_at: now,
        }
        .into_bid(3);
        bid.offers.push(Offer {
            id: "1".to_string(),
            amount: Decimal::from(60_000),
            bidder_email: "buyer@example.com".to_string(),
            created_at: now,
            idempotency_key: None,
        });
        bid
    }

    #[test]
    fn filters_select_owner_and_participant_views() {
        let bid = sample_bid();

        assert!(BidFilter::All.matches(&bid));
        assert!(BidFilter::Creator("owner@example.com".into()).matches(&bid));
        assert!(!BidFilter::Creator("buyer@example.com".into()).matches(&bid));
        assert!(BidFilter::Participant("buyer@example.com".into()).matches(&bid));
        assert!(!BidFilter::Participant("owner@example.com".into()).matches(&bid));
    }
}
// endregion: --- Tests
