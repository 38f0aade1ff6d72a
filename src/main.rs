// region:    --- Imports
use agrisaviya_bidding::config::Config;
use agrisaviya_bidding::database::DatabaseManager;
use agrisaviya_bidding::handlers::{self, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = Config::from_env()?;

    // 저장소 선택 (DATABASE_URL 이 없으면 인메모리)
    let state = match DatabaseManager::from_config(&config).await {
        Ok(Some(db_manager)) => {
            let db_manager = Arc::new(db_manager);
            if let Err(e) = db_manager.initialize_database(config.reset_database).await {
                error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            AppState::postgres(db_manager, config.bids.clone())
        }
        Ok(None) => {
            warn!(
                "{:<12} --> DATABASE_URL 미설정: 인메모리 저장소 사용",
                "Main"
            );
            AppState::in_memory(config.bids.clone())
        }
        Err(e) => {
            error!("{:<12} --> 데이터베이스 연결 실패: {:?}", "Main", e);
            return Err(e.into());
        }
    };

    // 라우터 설정
    let routes_all = handlers::router(state);

    // 리스너 생성
    let listener = TcpListener::bind(config.bind_addr.as_str()).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
