//! 입찰 관련 커맨드 처리
//! 1. 입찰 등록
//! 2. 오퍼(입찰 참여) 등록
//! 3. 입찰 상태 변경
// region:    --- Imports
use crate::bidding::model::{Bid, BidId, BidStatus, CallerIdentity, NewBid, Offer};
use crate::bidding::ranking::{check_offer, leading_offer};
use crate::config::BidSettings;
use crate::error::{BidError, Result};
use crate::store::BidStore;
use crate::validation::{non_blank, required};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands
/// 금액 입력 (문자열 또는 숫자)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(Decimal),
}

impl PriceInput {
    /// 양수 금액으로 변환
    pub fn parse_positive(&self, field: &str) -> Result<Decimal> {
        let value = match self {
            PriceInput::Number(value) => *value,
            PriceInput::Text(text) => text.trim().parse::<Decimal>().map_err(|_| {
                BidError::Validation(format!("{field} must be a number, got '{text}'"))
            })?,
        };
        if value <= Decimal::ZERO {
            return Err(BidError::Validation(format!("{field} must be positive")));
        }
        Ok(value)
    }
}

/// 입찰 등록 명령
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBidCommand {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub starting_price: Option<PriceInput>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image: Option<String>,
}

/// 오퍼 등록 명령
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOfferCommand {
    pub amount: Decimal,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// 상태 변경 명령
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusCommand {
    pub status: BidStatus,
}

/// 오퍼 등록 결과 (기록된 오퍼와 기록 직후의 입찰)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferReceipt {
    pub offer: Offer,
    pub bid: Bid,
}

/// 입찰 등록 입력 검증 (저장소 접근 전)
pub fn validate_create_bid(
    cmd: CreateBidCommand,
    caller: &CallerIdentity,
    settings: &BidSettings,
    now: DateTime<Utc>,
) -> Result<NewBid> {
    let name = required(&cmd.name, "name")?;
    let category = required(&cmd.category, "category")?;
    let item = required(&cmd.item, "item")?;
    let description = required(&cmd.description, "description")?;
    let starting_price = cmd
        .starting_price
        .as_ref()
        .ok_or_else(|| BidError::Validation("starting_price is required".to_string()))?
        .parse_positive("starting_price")?;
    let image = required(cmd.image.as_deref().unwrap_or_default(), "image")?;

    let start_date = cmd.start_date.unwrap_or(now);
    let due_date = cmd
        .due_date
        .unwrap_or_else(|| now + settings.default_bid_duration);
    if due_date < start_date {
        return Err(BidError::Validation(
            "due_date must not be earlier than start_date".to_string(),
        ));
    }

    Ok(NewBid {
        name,
        contact_name: non_blank(cmd.contact_name),
        contact_number: non_blank(cmd.contact_number),
        category,
        item,
        description,
        starting_price,
        start_date,
        due_date,
        email: caller.email().to_string(),
        image,
        created_at: now,
    })
}

/// 1. 입찰 등록
pub async fn handle_create_bid(
    cmd: CreateBidCommand,
    caller: &CallerIdentity,
    store: &dyn BidStore,
    settings: &BidSettings,
    now: DateTime<Utc>,
) -> Result<Bid> {
    info!(
        "{:<12} --> 입찰 등록 요청: {} by {}",
        "Command",
        cmd.name,
        caller.email()
    );
    let new_bid = validate_create_bid(cmd, caller, settings, now)?;
    let bid = store.create_bid(new_bid).await?;
    info!("{:<12} --> 입찰 등록 완료 id: {}", "Command", bid.id);
    Ok(bid)
}

/// 2. 오퍼 등록
/// 읽기 -> 검증 -> 버전 조건부 쓰기, 버전 충돌 시 다시 읽어서 재시도
pub async fn handle_place_offer(
    bid_id: BidId,
    cmd: PlaceOfferCommand,
    caller: &CallerIdentity,
    store: &dyn BidStore,
    settings: &BidSettings,
    now: DateTime<Utc>,
) -> Result<OfferReceipt> {
    info!(
        "{:<12} --> 오퍼 등록 요청 bid: {}, amount: {}, bidder: {}",
        "Command",
        bid_id,
        cmd.amount,
        caller.email()
    );
    if cmd.amount <= Decimal::ZERO {
        return Err(BidError::Validation("amount must be positive".to_string()));
    }
    let idempotency_key = non_blank(cmd.idempotency_key);

    for attempt in 1..=settings.max_offer_retries {
        let bid = store
            .get_bid(bid_id)
            .await?
            .ok_or_else(|| BidError::NotFound(format!("bid {bid_id}")))?;

        // 같은 키로 이미 등록된 오퍼는 그대로 돌려준다
        if let Some(key) = idempotency_key.as_deref() {
            if let Some(existing) = bid.offers.iter().find(|offer| {
                offer.bidder_email == caller.email()
                    && offer.idempotency_key.as_deref() == Some(key)
            }) {
                info!(
                    "{:<12} --> 중복 오퍼 요청, 기존 오퍼 반환 id: {}",
                    "Command", existing.id
                );
                return Ok(OfferReceipt {
                    offer: existing.clone(),
                    bid: bid.clone(),
                });
            }
        }

        check_offer(&bid, cmd.amount, now)?;

        let offer = Offer {
            id: format!("{}-{}", now.timestamp_millis(), bid.offers.len()),
            amount: cmd.amount,
            bidder_email: caller.email().to_string(),
            created_at: now,
            idempotency_key: idempotency_key.clone(),
        };
        let mut offers = bid.offers;
        offers.push(offer.clone());

        match store.replace_offers(bid_id, offers, bid.version).await? {
            Some(updated) => {
                info!(
                    "{:<12} --> 오퍼 등록 완료 bid: {}, offer: {}",
                    "Command", bid_id, offer.id
                );
                return Ok(OfferReceipt {
                    offer,
                    bid: updated,
                });
            }
            None => {
                warn!(
                    "{:<12} --> 낙관적 업데이트로 인한 버전 충돌: 재시도 ({}/{})",
                    "Command", attempt, settings.max_offer_retries
                );
            }
        }
    }

    Err(BidError::MaxRetriesExceeded(settings.max_offer_retries))
}

/// 3. 상태 변경 (등록자만, active -> closed | sold)
pub async fn handle_update_status(
    bid_id: BidId,
    cmd: UpdateStatusCommand,
    caller: &CallerIdentity,
    store: &dyn BidStore,
    settings: &BidSettings,
) -> Result<Bid> {
    info!(
        "{:<12} --> 상태 변경 요청 bid: {}, status: {}",
        "Command", bid_id, cmd.status
    );

    for attempt in 1..=settings.max_offer_retries {
        let bid = store
            .get_bid(bid_id)
            .await?
            .ok_or_else(|| BidError::NotFound(format!("bid {bid_id}")))?;

        if !bid.is_owned_by(caller.email()) {
            return Err(BidError::Forbidden(
                "only the seller can change the bid status".to_string(),
            ));
        }
        if !bid.status.can_transition_to(cmd.status) {
            return Err(BidError::InvalidTransition {
                from: bid.status,
                to: cmd.status,
            });
        }
        if cmd.status == BidStatus::Sold && leading_offer(&bid).is_none() {
            return Err(BidError::Validation(
                "a bid without offers cannot be marked sold".to_string(),
            ));
        }

        match store.set_status(bid_id, cmd.status, bid.version).await? {
            Some(updated) => return Ok(updated),
            None => warn!(
                "{:<12} --> 상태 변경 버전 충돌: 재시도 ({}/{})",
                "Command", attempt, settings.max_offer_retries
            ),
        }
    }

    Err(BidError::MaxRetriesExceeded(settings.max_offer_retries))
}
// endregion: --- Commands

// endregion: --- Tests
