/// 입찰 컬럼 목록
macro_rules! bid_columns {
    () => {
        concat!(
            "id, name, contact_name, contact_number, category, item, description, ",
            "starting_price, start_date, due_date, email, image, status, created_at, ",
            "offers, version"
        )
    };
}

/// 입찰 생성
pub const INSERT_BID: &str = concat!(
    "INSERT INTO bids (name, contact_name, contact_number, category, item, description, ",
    "starting_price, start_date, due_date, email, image, status, created_at, offers, version) ",
    "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, ",
    "'active', $12, '[]'::jsonb, 0) ",
    "RETURNING ",
    bid_columns!()
);

/// 입찰 조회
pub const GET_BID: &str = concat!("SELECT ", bid_columns!(), " FROM bids WHERE id = $1");

/// 모든 입찰 조회
pub const GET_ALL_BIDS: &str = concat!(
    "SELECT ",
    bid_columns!(),
    " FROM bids ORDER BY created_at DESC, id DESC"
);

/// 등록자 입찰 조회
pub const GET_BIDS_BY_CREATOR: &str = concat!(
    "SELECT ",
    bid_columns!(),
    " FROM bids WHERE email = $1 ORDER BY created_at DESC, id DESC"
);

/// 오퍼 목록 교체 (버전 일치 시에만)
pub const REPLACE_OFFERS: &str = concat!(
    "UPDATE bids SET offers = $1, version = version + 1 WHERE id = $2 AND version = $3 RETURNING ",
    bid_columns!()
);

/// 입찰 상태 변경 (버전 일치 시에만)
pub const UPDATE_BID_STATUS: &str = concat!(
    "UPDATE bids SET status = $1, version = version + 1 WHERE id = $2 AND version = $3 RETURNING ",
    bid_columns!()
);

/// 프로필 생성
pub const INSERT_PROFILE: &str = r#"
    INSERT INTO user_profiles (name, email, phone, address, avatar, created_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, name, email, phone, address, avatar, created_at
"#;

/// 이메일로 프로필 조회
pub const GET_PROFILE_BY_EMAIL: &str = r#"
    SELECT id, name, email, phone, address, avatar, created_at
    FROM user_profiles
    WHERE email = $1
"#;

/// 프로필 수정
pub const UPDATE_PROFILE: &str = r#"
    UPDATE user_profiles
    SET name = $1, phone = $2, address = $3, avatar = $4
    WHERE email = $5
    RETURNING id, name, email, phone, address, avatar, created_at
"#;
