//! Community Onboarding server.
//!
//! Loads configuration, initializes tracing, wires the Supabase adapters and
//! serves the HTTP API until Ctrl+C or SIGTERM.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use community_onboarding::adapters::http::{
    api_router, AuthState, CommunityAppState, HttpOptions, OnboardingAppState,
};
use community_onboarding::adapters::memory::InMemoryRealtime;
use community_onboarding::adapters::supabase::{
    SupabaseClient, SupabaseJwtValidator, SupabasePostRepository, SupabaseProfileRepository,
    SupabaseSessionFactory, SupabaseSurveyRepository,
};
use community_onboarding::config::AppConfig;
use community_onboarding::ports::{
    PostRepository, ProfileRepository, RealtimeChannel, SessionStoreFactory, SurveyRepository,
};

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    info!(environment = ?config.server.environment, "Starting community-onboarding");

    if config.supabase.service_role_key.is_none() {
        tracing::warn!("No service role key; row-level security applies to server requests");
    }
    let client_config = config.supabase.client_config();
    let client = Arc::new(SupabaseClient::new(client_config.clone())?);

    let profiles: Arc<dyn ProfileRepository> =
        Arc::new(SupabaseProfileRepository::new(client.clone()));
    let surveys: Arc<dyn SurveyRepository> =
        Arc::new(SupabaseSurveyRepository::new(client.clone()));
    let posts: Arc<dyn PostRepository> = Arc::new(SupabasePostRepository::new(client));
    let auth: Arc<dyn SessionStoreFactory> = Arc::new(SupabaseSessionFactory::new(client_config)?);
    let realtime: Arc<dyn RealtimeChannel> = Arc::new(InMemoryRealtime::new());
    let validator: AuthState =
        Arc::new(SupabaseJwtValidator::new(config.supabase.jwt_secret.clone()));

    let onboarding = OnboardingAppState::new(
        auth,
        profiles.clone(),
        surveys,
        config.guard.fetch_timeout(),
    );
    let community = CommunityAppState::new(profiles, posts, realtime, validator.clone());
    let options = HttpOptions {
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    };
    let app = api_router(onboarding, community, validator, &options);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
