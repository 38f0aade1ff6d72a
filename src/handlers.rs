// region:    --- Imports
use crate::bidding::commands::{
    handle_create_bid, handle_place_offer, handle_update_status, CreateBidCommand,
    PlaceOfferCommand, UpdateStatusCommand,
};
use crate::bidding::model::{BidId, CallerIdentity};
use crate::bidding::ranking::highest_bid;
use crate::config::BidSettings;
use crate::database::DatabaseManager;
use crate::error::BidError;
use crate::profile::commands::{
    get_profile, handle_register_profile, handle_update_profile, RegisterProfileCommand,
    UpdateProfileCommand,
};
use crate::query;
use crate::store::{
    BidFilter, BidStore, InMemoryBidStore, InMemoryProfileStore, PostgresBidStore,
    PostgresProfileStore, ProfileStore,
};
use axum::extract::{DefaultBodyLimit, FromRequest, FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

/// 요청자 이메일을 담는 헤더
pub const CALLER_HEADER: &str = "x-caller-email";

// region:    --- App State
#[derive(Clone)]
pub struct AppState {
    pub bids: Arc<dyn BidStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub settings: Arc<BidSettings>,
}

impl AppState {
    /// 인메모리 저장소로 상태 생성
    pub fn in_memory(settings: BidSettings) -> Self {
        Self {
            bids: Arc::new(InMemoryBidStore::new()),
            profiles: Arc::new(InMemoryProfileStore::new()),
            settings: Arc::new(settings),
        }
    }

    /// Postgres 저장소로 상태 생성
    pub fn postgres(db_manager: Arc<DatabaseManager>, settings: BidSettings) -> Self {
        Self {
            bids: Arc::new(PostgresBidStore::new(Arc::clone(&db_manager))),
            profiles: Arc::new(PostgresProfileStore::new(db_manager)),
            settings: Arc::new(settings),
        }
    }
}
// endregion: --- App State

// region:    --- Caller Extractor
#[axum::async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = BidError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| BidError::Unauthorized(format!("{CALLER_HEADER} header is required")))?;
        let email = value
            .to_str()
            .map_err(|_| BidError::Unauthorized(format!("{CALLER_HEADER} is not valid text")))?;
        CallerIdentity::new(email).map_err(|e| BidError::Unauthorized(e.to_string()))
    }
}
// endregion: --- Caller Extractor

// region:    --- Json Extractor
/// `Json` 과 같지만 본문 오류를 `BidError` 형식(`{"error", "code"}`)으로 돌려준다
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(BidError))]
pub struct JsonBody<T>(pub T);
// endregion: --- Json Extractor

// region:    --- Router
pub fn router(state: AppState) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/bids", post(handle_create).get(handle_list_bids))
        .route("/bids/:id", get(handle_get_bid))
        .route("/bids/:id/highest-bid", get(handle_get_highest_bid))
        .route(
            "/bids/:id/offers",
            post(handle_place).get(handle_get_offer_history),
        )
        .route("/bids/:id/status", patch(handle_change_status))
        .route("/me/bids", get(handle_get_my_bids))
        .route("/me/offers", get(handle_get_my_offers))
        .route("/profiles", post(handle_register))
        .route("/profiles/me", put(handle_update_me))
        .route("/profiles/:email", get(handle_get_profile))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}
// endregion: --- Router

// region:    --- Command Handlers

/// 입찰 등록 요청 처리
pub async fn handle_create(
    State(state): State<AppState>,
    caller: CallerIdentity,
    JsonBody(cmd): JsonBody<CreateBidCommand>,
) -> Result<impl IntoResponse, BidError> {
    info!("{:<12} --> 입찰 등록 요청 처리 시작: {:?}", "Handler", cmd);
    let now = Utc::now();
    let bid = handle_create_bid(cmd, &caller, state.bids.as_ref(), &state.settings, now).await?;
    Ok((
        StatusCode::CREATED,
        Json(query::handlers::BidView::new(bid, now)),
    ))
}

/// 오퍼 등록 요청 처리
pub async fn handle_place(
    State(state): State<AppState>,
    Path(bid_id): Path<BidId>,
    caller: CallerIdentity,
    JsonBody(cmd): JsonBody<PlaceOfferCommand>,
) -> Result<impl IntoResponse, BidError> {
    info!(
        "{:<12} --> 오퍼 등록 요청 처리 시작 bid: {}, {:?}",
        "Handler", bid_id, cmd
    );
    let receipt = handle_place_offer(
        bid_id,
        cmd,
        &caller,
        state.bids.as_ref(),
        &state.settings,
        Utc::now(),
    )
    .await?;
    // 기록 직후의 입찰 기준 현재가
    let current_price = highest_bid(&receipt.bid);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Offer placed successfully",
            "offer": receipt.offer,
            "current_price": current_price,
        })),
    ))
}

/// 상태 변경 요청 처리
pub async fn handle_change_status(
    State(state): State<AppState>,
    Path(bid_id): Path<BidId>,
    caller: CallerIdentity,
    JsonBody(cmd): JsonBody<UpdateStatusCommand>,
) -> Result<impl IntoResponse, BidError> {
    info!(
        "{:<12} --> 상태 변경 요청 처리 시작 bid: {}, {:?}",
        "Handler", bid_id, cmd
    );
    let bid = handle_update_status(
        bid_id,
        cmd,
        &caller,
        state.bids.as_ref(),
        &state.settings,
    )
    .await?;
    Ok(Json(query::handlers::BidView::new(bid, Utc::now())))
}

/// 프로필 등록 요청 처리
pub async fn handle_register(
    State(state): State<AppState>,
    caller: CallerIdentity,
    JsonBody(cmd): JsonBody<RegisterProfileCommand>,
) -> Result<impl IntoResponse, BidError> {
    info!("{:<12} --> 프로필 등록 요청 처리 시작", "Handler");
    let profile =
        handle_register_profile(cmd, &caller, state.profiles.as_ref(), Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// 프로필 수정 요청 처리
pub async fn handle_update_me(
    State(state): State<AppState>,
    caller: CallerIdentity,
    JsonBody(cmd): JsonBody<UpdateProfileCommand>,
) -> Result<impl IntoResponse, BidError> {
    info!("{:<12} --> 프로필 수정 요청 처리 시작", "Handler");
    let profile = handle_update_profile(cmd, &caller, state.profiles.as_ref()).await?;
    Ok(Json(profile))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub creator: Option<String>,
    pub participant: Option<String>,
}

/// 입찰 목록 조회
pub async fn handle_list_bids(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, BidError> {
    info!("{:<12} --> 입찰 목록 조회: {:?}", "HandlerQuery", params);
    let filter = match (params.creator, params.participant) {
        (Some(_), Some(_)) => {
            return Err(BidError::Validation(
                "use either creator or participant, not both".to_string(),
            ))
        }
        (Some(creator), None) => {
            BidFilter::Creator(CallerIdentity::new(creator)?.email().to_string())
        }
        (None, Some(participant)) => {
            BidFilter::Participant(CallerIdentity::new(participant)?.email().to_string())
        }
        (None, None) => BidFilter::All,
    };
    let bids = query::handlers::list_bids(state.bids.as_ref(), &filter, Utc::now()).await?;
    Ok(Json(bids))
}

/// 입찰 상세 조회
pub async fn handle_get_bid(
    State(state): State<AppState>,
    Path(bid_id): Path<BidId>,
) -> Result<impl IntoResponse, BidError> {
    info!("{:<12} --> 입찰 상세 조회 id: {}", "HandlerQuery", bid_id);
    let view = query::handlers::get_bid_view(state.bids.as_ref(), bid_id, Utc::now()).await?;
    Ok(Json(view))
}

/// 최고 입찰가 조회
pub async fn handle_get_highest_bid(
    State(state): State<AppState>,
    Path(bid_id): Path<BidId>,
) -> Result<impl IntoResponse, BidError> {
    info!(
        "{:<12} --> 최고 입찰가 조회 id: {}",
        "HandlerQuery", bid_id
    );
    let highest = query::handlers::get_highest_bid(state.bids.as_ref(), bid_id).await?;
    Ok(Json(serde_json::json!({
        "bid_id": bid_id,
        "highest_bid": highest,
    })))
}

/// 오퍼 이력 조회
pub async fn handle_get_offer_history(
    State(state): State<AppState>,
    Path(bid_id): Path<BidId>,
) -> Result<impl IntoResponse, BidError> {
    info!("{:<12} --> 오퍼 이력 조회 id: {}", "HandlerQuery", bid_id);
    let offers = query::handlers::get_offer_history(state.bids.as_ref(), bid_id).await?;
    Ok(Json(offers))
}

/// 내가 등록한 입찰 조회
pub async fn handle_get_my_bids(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<impl IntoResponse, BidError> {
    info!("{:<12} --> 내 입찰 조회: {}", "HandlerQuery", caller.email());
    let bids = query::handlers::list_owned_bids(state.bids.as_ref(), &caller, Utc::now()).await?;
    Ok(Json(bids))
}

/// 내가 참여한 입찰 조회
pub async fn handle_get_my_offers(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<impl IntoResponse, BidError> {
    info!("{:<12} --> 참여 입찰 조회: {}", "HandlerQuery", caller.email());
    let bids =
        query::handlers::list_participating_bids(state.bids.as_ref(), &caller, Utc::now()).await?;
    Ok(Json(bids))
}

/// 프로필 조회
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, BidError> {
    info!("{:<12} --> 프로필 조회: {}", "HandlerQuery", email);
    let profile = get_profile(&email, state.profiles.as_ref()).await?;
    Ok(Json(profile))
}

// endregion: --- Query Handlers
