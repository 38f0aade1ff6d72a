//! 최고 입찰가, 남은 시간 계산
//! 저장하지 않고 조회, 검증 시마다 오퍼 목록을 순회해 다시 계산한다.
// region:    --- Imports
use crate::bidding::model::{Bid, BidStatus, Offer};
use crate::error::{BidError, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

// endregion: --- Imports

const HOURS_PER_DAY: i64 = 24;

// region:    --- Highest Bid
/// 최고 입찰가 (오퍼가 없으면 시작가)
pub fn highest_bid(bid: &Bid) -> Decimal {
    bid.offers
        .iter()
        .map(|offer| offer.amount)
        .max()
        .unwrap_or(bid.starting_price)
}

/// 최고가 오퍼 (동일 금액이면 먼저 들어온 오퍼)
pub fn leading_offer(bid: &Bid) -> Option<&Offer> {
    bid.offers.iter().fold(None, |best: Option<&Offer>, offer| match best {
        Some(current) if current.amount >= offer.amount => Some(current),
        _ => Some(offer),
    })
}
// endregion: --- Highest Bid

// region:    --- Time Remaining
/// 마감까지 남은 시간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TimeRemaining {
    Ended,
    Remaining { days: i64, hours: i64 },
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRemaining::Ended => f.write_str("ended"),
            TimeRemaining::Remaining { days, hours } => write!(f, "{days}d {hours}h left"),
        }
    }
}

/// 남은 시간 계산
/// 남은 시간 조각은 올림 처리한다 (1시간 미만도 1시간으로 표시).
pub fn time_remaining(bid: &Bid, now: DateTime<Utc>) -> TimeRemaining {
    if bid.due_date <= now {
        return TimeRemaining::Ended;
    }

    let left = bid.due_date - now;
    let whole_hours = left.num_hours();
    let total_hours = if left > Duration::hours(whole_hours) {
        whole_hours + 1
    } else {
        whole_hours
    };

    TimeRemaining::Remaining {
        days: total_hours / HOURS_PER_DAY,
        hours: total_hours % HOURS_PER_DAY,
    }
}

/// 새 오퍼를 받을 수 있는 상태인지
pub fn is_accepting(bid: &Bid, now: DateTime<Utc>) -> bool {
    bid.status == BidStatus::Active && now < bid.due_date
}
// endregion: --- Time Remaining

// region:    --- Offer Check
/// 오퍼 금액 검증
/// 순서: 상태 -> 마감 -> 시작가 -> 현재 최고가
pub fn check_offer(bid: &Bid, amount: Decimal, now: DateTime<Utc>) -> Result<()> {
    if bid.status != BidStatus::Active {
        return Err(BidError::NotActive);
    }
    if now >= bid.due_date {
        return Err(BidError::BiddingEnded);
    }
    if amount <= bid.starting_price {
        return Err(BidError::BelowStartingPrice {
            starting_price: bid.starting_price,
        });
    }
    let highest = highest_bid(bid);
    if amount <= highest {
        return Err(BidError::BelowHighestBid {
            highest_bid: highest,
        });
    }
    Ok(())
}
// endregion: --- Offer Check

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidding::model::NewBid;

    fn bid_with_offers(starting_price: i64, amounts: &[i64], now: DateTime<Utc>) -> Bid {
        let mut bid = NewBid {
            name: "Tea leaves".to_string(),
            contact_name: Some("Nimal".to_string()),
            contact_number: None,
            category: "Tea".to_string(),
            item: "200kg".to_string(),
            description: "Fresh tea leaves".to_string(),
            starting_price: Decimal::from(starting_price),
            start_date: now - Duration::days(1),
            due_date: now + Duration::days(3),
            email: "seller@example.com".to_string(),
            image: "bids/tea.jpg".to_string(),
            created_at: now - Duration::days(1),
        }
        .into_bid(1);
        bid.offers = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| Offer {
                id: format!("offer-{i}"),
                amount: Decimal::from(*amount),
                bidder_email: format!("buyer{i}@example.com"),
                created_at: now,
                idempotency_key: None,
            })
            .collect();
        bid
    }

    #[test]
    fn highest_bid_defaults_to_starting_price() {
        let bid = bid_with_offers(1000, &[], Utc::now());
        assert_eq!(highest_bid(&bid), Decimal::from(1000));
        assert!(leading_offer(&bid).is_none());
    }

    #[test]
    fn highest_bid_is_max_offer_regardless_of_order() {
        let bid = bid_with_offers(1000, &[1500, 1900, 1800], Utc::now());
        assert_eq!(highest_bid(&bid), Decimal::from(1900));
        assert_eq!(leading_offer(&bid).unwrap().id, "offer-1");
    }

    #[test]
    fn leading_offer_prefers_earliest_on_tie() {
        let bid = bid_with_offers(1000, &[1500, 1500], Utc::now());
        assert_eq!(leading_offer(&bid).unwrap().id, "offer-0");
    }

    #[test]
    fn derivations_are_repeatable() {
        let now = Utc::now();
        let bid = bid_with_offers(1000, &[1200], now);
        assert_eq!(highest_bid(&bid), highest_bid(&bid));
        assert_eq!(time_remaining(&bid, now), time_remaining(&bid, now));
    }

    #[test]
    fn time_remaining_rounds_partial_hours_up() {
        let now = Utc::now();
        let mut bid = bid_with_offers(1000, &[], now);

        bid.due_date = now + Duration::days(2) + Duration::minutes(90);
        assert_eq!(
            time_remaining(&bid, now),
            TimeRemaining::Remaining { days: 2, hours: 2 }
        );

        bid.due_date = now + Duration::minutes(1);
        assert_eq!(
            time_remaining(&bid, now),
            TimeRemaining::Remaining { days: 0, hours: 1 }
        );

        bid.due_date = now + Duration::nanoseconds(500);
        assert_eq!(
            time_remaining(&bid, now),
            TimeRemaining::Remaining { days: 0, hours: 1 }
        );

        bid.due_date = now + Duration::hours(3);
        assert_eq!(
            time_remaining(&bid, now),
            TimeRemaining::Remaining { days: 0, hours: 3 }
        );

        bid.due_date = now + Duration::hours(23) + Duration::minutes(30);
        assert_eq!(
            time_remaining(&bid, now),
            TimeRemaining::Remaining { days: 1, hours: 0 }
        );
    }

    #[test]
    fn time_remaining_ends_at_due_date() {
        let now = Utc::now();
        let mut bid = bid_with_offers(1000, &[], now);

        bid.due_date = now;
        assert_eq!(time_remaining(&bid, now), TimeRemaining::Ended);
        assert!(!is_accepting(&bid, now));

        bid.due_date = now - Duration::hours(5);
        assert_eq!(time_remaining(&bid, now).to_string(), "ended");
    }

    #[test]
    fn check_offer_against_starting_price() {
        let now = Utc::now();
        let bid = bid_with_offers(1000, &[], now);

        let err = check_offer(&bid, Decimal::from(900), now).unwrap_err();
        assert!(matches!(err, BidError::BelowStartingPrice { .. }));
        let err = check_offer(&bid, Decimal::from(1000), now).unwrap_err();
        assert!(matches!(err, BidError::BelowStartingPrice { .. }));
        assert!(check_offer(&bid, Decimal::from(1500), now).is_ok());
    }

    #[test]
    fn check_offer_against_current_highest() {
        let now = Utc::now();
        let bid = bid_with_offers(1000, &[1500, 1800], now);

        let err = check_offer(&bid, Decimal::from(1700), now).unwrap_err();
        assert!(matches!(
            err,
            BidError::BelowHighestBid { highest_bid } if highest_bid == Decimal::from(1800)
        ));
        assert!(check_offer(&bid, Decimal::from(1900), now).is_ok());
    }

    #[test]
    fn check_offer_rejects_expired_or_inactive_bids_first() {
        let now = Utc::now();
        let mut bid = bid_with_offers(1000, &[], now);

        bid.due_date = now - Duration::minutes(1);
        let err = check_offer(&bid, Decimal::from(1_000_000), now).unwrap_err();
        assert!(matches!(err, BidError::BiddingEnded));

        bid.due_date = now + Duration::days(1);
        bid.status = BidStatus::Closed;
        let err = check_offer(&bid, Decimal::from(500), now).unwrap_err();
        assert!(matches!(err, BidError::NotActive));
    }
}
// endregion: --- Tests
