//! 사용자 프로필 커맨드 처리
// region:    --- Imports
use crate::bidding::model::CallerIdentity;
use crate::error::{BidError, Result};
use crate::profile::model::{NewProfile, UserProfile};
use crate::store::ProfileStore;
use crate::validation::{non_blank, required};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands
/// 회원 가입 시 프로필 생성 명령
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterProfileCommand {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// 프로필 수정 명령 (없는 필드는 유지, 빈 문자열은 선택 필드 삭제)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileCommand {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// 프로필 등록 (이메일은 요청자 신원에서 가져온다)
pub async fn handle_register_profile(
    cmd: RegisterProfileCommand,
    caller: &CallerIdentity,
    store: &dyn ProfileStore,
    now: DateTime<Utc>,
) -> Result<UserProfile> {
    info!("{:<12} --> 프로필 등록 요청: {}", "Command", caller.email());
    let profile = NewProfile {
        name: required(&cmd.name, "name")?,
        email: caller.email().to_string(),
        phone: required(&cmd.phone, "phone")?,
        address: non_blank(cmd.address),
        avatar: non_blank(cmd.avatar),
        created_at: now,
    };
    store.insert_profile(profile).await
}

/// 본인 프로필 수정
pub async fn handle_update_profile(
    cmd: UpdateProfileCommand,
    caller: &CallerIdentity,
    store: &dyn ProfileStore,
) -> Result<UserProfile> {
    info!("{:<12} --> 프로필 수정 요청: {}", "Command", caller.email());
    let mut profile = get_profile(caller.email(), store).await?;

    if let Some(name) = cmd.name {
        profile.name = required(&name, "name")?;
    }
    if let Some(phone) = cmd.phone {
        profile.phone = required(&phone, "phone")?;
    }
    if cmd.address.is_some() {
        profile.address = non_blank(cmd.address);
    }
    if cmd.avatar.is_some() {
        profile.avatar = non_blank(cmd.avatar);
    }

    store.update_profile(profile).await
}

/// 프로필 조회
pub async fn get_profile(email: &str, store: &dyn ProfileStore) -> Result<UserProfile> {
    let email = email.trim().to_lowercase();
    store
        .get_profile_by_email(&email)
        .await?
        .ok_or_else(|| BidError::NotFound(format!("profile {email}")))
}
// endregion: --- Commands

// endregion: --- Tests
