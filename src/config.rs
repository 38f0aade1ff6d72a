//! 환경 변수 기반 설정
//! 서비스 시작 시 한 번 읽어 들인다.
// region:    --- Imports
use crate::error::{BidError, Result};
use chrono::Duration;
use std::str::FromStr;

// endregion: --- Imports

// region:    --- Defaults
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// 마감일 미지정 시 기본 입찰 기간 (일)
pub const DEFAULT_BID_DURATION_DAYS: i64 = 7;
/// 버전 충돌 시 오퍼 등록 최대 재시도 횟수
pub const DEFAULT_MAX_OFFER_RETRIES: u32 = 10;
// endregion: --- Defaults

// region:    --- Bid Settings
/// 입찰 커맨드가 참조하는 설정
#[derive(Debug, Clone)]
pub struct BidSettings {
    pub default_bid_duration: Duration,
    pub max_offer_retries: u32,
}

impl Default for BidSettings {
    fn default() -> Self {
        Self {
            default_bid_duration: Duration::days(DEFAULT_BID_DURATION_DAYS),
            max_offer_retries: DEFAULT_MAX_OFFER_RETRIES,
        }
    }
}
// endregion: --- Bid Settings

// region:    --- Config
#[derive(Debug, Clone)]
pub struct Config {
    /// 없으면 인메모리 저장소로 동작
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub max_connections: u32,
    /// 시작 시 테이블 재생성 여부
    pub reset_database: bool,
    pub bids: BidSettings,
}

impl Config {
    /// 프로세스 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정 로드 (테스트용)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let max_connections =
            parse_var(&lookup, "DB_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let duration_days =
            parse_var(&lookup, "DEFAULT_BID_DURATION_DAYS")?.unwrap_or(DEFAULT_BID_DURATION_DAYS);
        let max_offer_retries =
            parse_var(&lookup, "MAX_OFFER_RETRIES")?.unwrap_or(DEFAULT_MAX_OFFER_RETRIES);
        let reset_database = parse_var(&lookup, "RESET_DATABASE")?.unwrap_or(false);

        if duration_days <= 0 {
            return Err(BidError::Config(
                "DEFAULT_BID_DURATION_DAYS must be positive".to_string(),
            ));
        }
        if max_offer_retries == 0 {
            return Err(BidError::Config(
                "MAX_OFFER_RETRIES must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            reset_database,
            bids: BidSettings {
                default_bid_duration: Duration::days(duration_days),
                max_offer_retries,
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| BidError::Config(format!("{key} has an invalid value: {raw}"))),
    }
}
// endregion: --- Config

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.bids.default_bid_duration, Duration::days(7));
        assert_eq!(config.bids.max_offer_retries, DEFAULT_MAX_OFFER_RETRIES);
        assert!(!config.reset_database);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/agri"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DEFAULT_BID_DURATION_DAYS", "3"),
            ("RESET_DATABASE", "true"),
        ]))
        .unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/agri")
        );
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.bids.default_bid_duration, Duration::days(3));
        assert!(config.reset_database);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[("DB_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert!(matches!(err, BidError::Config(_)));

        let err =
            Config::from_lookup(lookup_from(&[("DEFAULT_BID_DURATION_DAYS", "0")])).unwrap_err();
        assert!(matches!(err, BidError::Config(_)));
    }
}
// endregion: --- Tests
