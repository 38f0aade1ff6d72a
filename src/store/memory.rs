//! 인메모리 저장소 (테스트 및 DATABASE_URL 미설정 실행용)
// region:    --- Imports
use super::{BidFilter, BidStore, ProfileStore};
use crate::bidding::model::{Bid, BidId, BidStatus, NewBid, Offer};
use crate::error::{BidError, Result};
use crate::profile::model::{NewProfile, UserProfile};
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

// endregion: --- Imports

// region:    --- In-Memory Bid Store
#[derive(Debug, Default)]
struct BidTable {
    next_id: BidId,
    rows: HashMap<BidId, Bid>,
}

/// 인메모리 입찰 저장소
/// 버전 비교와 교체가 하나의 쓰기 잠금 안에서 수행된다.
#[derive(Debug, Default)]
pub struct InMemoryBidStore {
    table: RwLock<BidTable>,
}

impl InMemoryBidStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BidStore for InMemoryBidStore {
    async fn create_bid(&self, new_bid: NewBid) -> Result<Bid> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let bid = new_bid.into_bid(table.next_id);
        table.rows.insert(bid.id, bid.clone());
        debug!("{:<12} --> 입찰 저장 id: {}", "Store", bid.id);
        Ok(bid)
    }

    async fn get_bid(&self, id: BidId) -> Result<Option<Bid>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list_bids(&self, filter: &BidFilter) -> Result<Vec<Bid>> {
        let table = self.table.read().await;
        let mut bids: Vec<Bid> = table
            .rows
            .values()
            .filter(|bid| filter.matches(bid))
            .cloned()
            .collect();
        bids.sort_by_key(|bid| Reverse((bid.created_at, bid.id)));
        Ok(bids)
    }

    async fn replace_offers(
        &self,
        id: BidId,
        offers: Vec<Offer>,
        expected_version: i64,
    ) -> Result<Option<Bid>> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(bid) if bid.version == expected_version => {
                bid.offers = offers;
                bid.version += 1;
                Ok(Some(bid.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn set_status(
        &self,
        id: BidId,
        status: BidStatus,
        expected_version: i64,
    ) -> Result<Option<Bid>> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(bid) if bid.version == expected_version => {
                bid.status = status;
                bid.version += 1;
                Ok(Some(bid.clone()))
            }
            _ => Ok(None),
        }
    }
}
// endregion: --- In-Memory Bid Store

// region:    --- In-Memory Profile Store
#[derive(Debug, Default)]
struct ProfileTable {
    next_id: i64,
    rows: HashMap<String, UserProfile>,
}

/// 인메모리 프로필 저장소 (이메일 기준)
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    table: RwLock<ProfileTable>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile> {
        let mut table = self.table.write().await;
        if table.rows.contains_key(&profile.email) {
            return Err(BidError::Conflict(format!(
                "profile already exists for {}",
                profile.email
            )));
        }
        table.next_id += 1;
        let profile = profile.into_profile(table.next_id);
        table.rows.insert(profile.email.clone(), profile.clone());
        Ok(profile)
    }

    async fn get_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        Ok(self.table.read().await.rows.get(email).cloned())
    }

    async fn update_profile(&self, profile: UserProfile) -> Result<UserProfile> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&profile.email) {
            Some(existing) => {
                *existing = profile.clone();
                Ok(profile)
            }
            None => Err(BidError::NotFound(format!("profile {}", profile.email))),
        }
    }
}
// endregion: --- In-Memory Profile Store

// endregion: --- Tests
