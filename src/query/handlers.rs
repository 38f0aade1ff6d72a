// region:    --- Imports
use crate::bidding::model::{Bid, BidId, CallerIdentity, Offer};
use crate::bidding::ranking::{self, TimeRemaining};
use crate::error::{BidError, Result};
use crate::store::{BidFilter, BidStore};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

// endregion: --- Imports

// region:    --- Views
/// 화면 표시용 입찰 정보 (파생 값 포함)
#[derive(Debug, Clone, Serialize)]
pub struct BidView {
    #[serde(flatten)]
    pub bid: Bid,
    pub highest_bid: Decimal,
    pub time_remaining: TimeRemaining,
    pub time_remaining_label: String,
    pub accepting: bool,
}

impl BidView {
    pub fn new(bid: Bid, now: DateTime<Utc>) -> Self {
        let time_remaining = ranking::time_remaining(&bid, now);
        Self {
            highest_bid: ranking::highest_bid(&bid),
            time_remaining_label: time_remaining.to_string(),
            accepting: ranking::is_accepting(&bid, now),
            time_remaining,
            bid,
        }
    }
}
// endregion: --- Views

// region:    --- Query Handlers

async fn load_bid(store: &dyn BidStore, bid_id: BidId) -> Result<Bid> {
    store
        .get_bid(bid_id)
        .await?
        .ok_or_else(|| BidError::NotFound(format!("bid {bid_id}")))
}

/// 입찰 상세 조회
pub async fn get_bid_view(
    store: &dyn BidStore,
    bid_id: BidId,
    now: DateTime<Utc>,
) -> Result<BidView> {
    info!("{:<12} --> 입찰 상세 조회 id: {}", "Query", bid_id);
    Ok(BidView::new(load_bid(store, bid_id).await?, now))
}

/// 최고 입찰가 조회
pub async fn get_highest_bid(store: &dyn BidStore, bid_id: BidId) -> Result<Decimal> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", bid_id);
    Ok(ranking::highest_bid(&load_bid(store, bid_id).await?))
}

/// 오퍼 이력 조회 (최신순)
pub async fn get_offer_history(store: &dyn BidStore, bid_id: BidId) -> Result<Vec<Offer>> {
    info!("{:<12} --> 오퍼 이력 조회 id: {}", "Query", bid_id);
    let mut offers = load_bid(store, bid_id).await?.offers;
    offers.reverse();
    Ok(offers)
}

/// 조건별 입찰 목록 조회
pub async fn list_bids(
    store: &dyn BidStore,
    filter: &BidFilter,
    now: DateTime<Utc>,
) -> Result<Vec<BidView>> {
    info!("{:<12} --> 입찰 목록 조회: {:?}", "Query", filter);
    let bids = store.list_bids(filter).await?;
    Ok(bids.into_iter().map(|bid| BidView::new(bid, now)).collect())
}

/// 모든 입찰 조회
pub async fn list_all_bids(store: &dyn BidStore, now: DateTime<Utc>) -> Result<Vec<BidView>> {
    list_bids(store, &BidFilter::All, now).await
}

/// 내가 등록한 입찰 조회
pub async fn list_owned_bids(
    store: &dyn BidStore,
    caller: &CallerIdentity,
    now: DateTime<Utc>,
) -> Result<Vec<BidView>> {
    list_bids(store, &BidFilter::Creator(caller.email().to_string()), now).await
}

/// 내가 오퍼를 넣은 입찰 조회
pub async fn list_participating_bids(
    store: &dyn BidStore,
    caller: &CallerIdentity,
    now: DateTime<Utc>,
) -> Result<Vec<BidView>> {
    list_bids(
        store,
        &BidFilter::Participant(caller.email().to_string()),
        now,
    )
    .await
}

// endregion: --- Query Handlers

// endregion: --- Tests
