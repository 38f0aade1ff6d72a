//! Postgres 저장소
//! 오퍼는 입찰 행의 JSONB 컬럼에 내장된다.
//! `version` 컬럼으로 낙관적 잠금을 건다.
// region:    --- Imports
use super::{BidFilter, BidStore, ProfileStore};
use crate::bidding::model::{Bid, BidId, BidStatus, NewBid, Offer};
use crate::database::DatabaseManager;
use crate::error::{BidError, Result};
use crate::profile::model::{NewProfile, UserProfile};
use crate::query::queries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Rows
// 입찰 테이블 행
#[derive(sqlx::FromRow)]
struct BidRow {
    id: i64,
    name: String,
    contact_name: Option<String>,
    contact_number: Option<String>,
    category: String,
    item: String,
    description: String,
    starting_price: Decimal,
    start_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    email: String,
    image: String,
    status: String,
    created_at: DateTime<Utc>,
    offers: Json<Vec<Offer>>,
    version: i64,
}

impl TryFrom<BidRow> for Bid {
    type Error = sqlx::Error;

    fn try_from(row: BidRow) -> std::result::Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BidStatus>()
            .map_err(|e| sqlx::Error::Decode(e.to_string().into()))?;
        Ok(Bid {
            id: row.id,
            name: row.name,
            contact_name: row.contact_name,
            contact_number: row.contact_number,
            category: row.category,
            item: row.item,
            description: row.description,
            starting_price: row.starting_price,
            start_date: row.start_date,
            due_date: row.due_date,
            email: row.email,
            image: row.image,
            status,
            created_at: row.created_at,
            offers: row.offers.0,
            version: row.version,
        })
    }
}

// 프로필 테이블 행
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    address: Option<String>,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            avatar: row.avatar,
            created_at: row.created_at,
        }
    }
}

fn into_bids(rows: Vec<BidRow>) -> Result<Vec<Bid>> {
    rows.into_iter()
        .map(|row| Bid::try_from(row).map_err(BidError::from))
        .collect()
}
// endregion: --- Rows

// region:    --- Postgres Bid Store
pub struct PostgresBidStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresBidStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl BidStore for PostgresBidStore {
    async fn create_bid(&self, new_bid: NewBid) -> Result<Bid> {
        let row = sqlx::query_as::<_, BidRow>(queries::INSERT_BID)
            .bind(new_bid.name)
            .bind(new_bid.contact_name)
            .bind(new_bid.contact_number)
            .bind(new_bid.category)
            .bind(new_bid.item)
            .bind(new_bid.description)
            .bind(new_bid.starting_price)
            .bind(new_bid.start_date)
            .bind(new_bid.due_date)
            .bind(new_bid.email)
            .bind(new_bid.image)
            .bind(new_bid.created_at)
            .fetch_one(self.db_manager.pool())
            .await?;
        info!("{:<12} --> 입찰 저장 id: {}", "Store", row.id);
        Ok(Bid::try_from(row)?)
    }

    async fn get_bid(&self, id: BidId) -> Result<Option<Bid>> {
        let row = sqlx::query_as::<_, BidRow>(queries::GET_BID)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(row.map(Bid::try_from).transpose()?)
    }

    async fn list_bids(&self, filter: &BidFilter) -> Result<Vec<Bid>> {
        let rows = match filter {
            BidFilter::Creator(email) => {
                sqlx::query_as::<_, BidRow>(queries::GET_BIDS_BY_CREATOR)
                    .bind(email)
                    .fetch_all(self.db_manager.pool())
                    .await?
            }
            // 오퍼는 별도 인덱스가 없으므로 전체 조회 후 걸러낸다
            BidFilter::All | BidFilter::Participant(_) => {
                sqlx::query_as::<_, BidRow>(queries::GET_ALL_BIDS)
                    .fetch_all(self.db_manager.pool())
                    .await?
            }
        };

        let bids = into_bids(rows)?;
        Ok(bids.into_iter().filter(|bid| filter.matches(bid)).collect())
    }

    async fn replace_offers(
        &self,
        id: BidId,
        offers: Vec<Offer>,
        expected_version: i64,
    ) -> Result<Option<Bid>> {
        let row = self
            .db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, BidRow>(queries::REPLACE_OFFERS)
                        .bind(Json(offers))
                        .bind(id)
                        .bind(expected_version)
                        .fetch_optional(&mut **tx)
                        .await
                })
            })
            .await?;

        if row.is_none() {
            warn!(
                "{:<12} --> 오퍼 교체 버전 충돌 id: {}, version: {}",
                "Store", id, expected_version
            );
        }
        Ok(row.map(Bid::try_from).transpose()?)
    }

    async fn set_status(
        &self,
        id: BidId,
        status: BidStatus,
        expected_version: i64,
    ) -> Result<Option<Bid>> {
        let row = self
            .db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, BidRow>(queries::UPDATE_BID_STATUS)
                        .bind(status.as_str())
                        .bind(id)
                        .bind(expected_version)
                        .fetch_optional(&mut **tx)
                        .await
                })
            })
            .await?;
        Ok(row.map(Bid::try_from).transpose()?)
    }
}
// endregion: --- Postgres Bid Store

// region:    --- Postgres Profile Store
pub struct PostgresProfileStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresProfileStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile> {
        let email = profile.email.clone();
        let result = sqlx::query_as::<_, ProfileRow>(queries::INSERT_PROFILE)
            .bind(profile.name)
            .bind(profile.email)
            .bind(profile.phone)
            .bind(profile.address)
            .bind(profile.avatar)
            .bind(profile.created_at)
            .fetch_one(self.db_manager.pool())
            .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                BidError::Conflict(format!("profile already exists for {email}")),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(queries::GET_PROFILE_BY_EMAIL)
            .bind(email)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(row.map(UserProfile::from))
    }

    async fn update_profile(&self, profile: UserProfile) -> Result<UserProfile> {
        let row = sqlx::query_as::<_, ProfileRow>(queries::UPDATE_PROFILE)
            .bind(&profile.name)
            .bind(&profile.phone)
            .bind(&profile.address)
            .bind(&profile.avatar)
            .bind(&profile.email)
            .fetch_optional(self.db_manager.pool())
            .await?;
        row.map(UserProfile::from)
            .ok_or_else(|| BidError::NotFound(format!("profile {}", profile.email)))
    }
}
// endregion: --- Postgres Profile Store
