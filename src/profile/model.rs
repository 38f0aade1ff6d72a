use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 사용자 프로필 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

// 신규 프로필 (id 는 저장소가 부여)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewProfile {
    pub fn into_profile(self, id: i64) -> UserProfile {
        UserProfile {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            avatar: self.avatar,
            created_at: self.created_at,
        }
    }
}
