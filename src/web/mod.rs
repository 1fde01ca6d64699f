//! The HTTP side of the bot: the endpoint the web form posts to.

mod error;
mod origin;
mod payload;
mod submit;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::{get, post},
    Json, Router,
};
use tokio::{net::TcpListener, sync::Notify};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::{discord::GuildGateway, roles::RoleGranter, settings::SettingsStore};

pub use error::{ApiError, StatusBody};
pub use origin::AllowedOrigins;
pub use payload::SubmissionPayload;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<SettingsStore>,
    pub gateway: Arc<dyn GuildGateway>,
    pub granter: Arc<RoleGranter>,
    pub origins: Arc<AllowedOrigins>,
}

pub fn router(state: AppState) -> Router {
    let allow_origin = if state.origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(state.origins.values().iter().cloned())
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/submit", post(submit::submit))
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            origin::require_allowed_origin,
        ))
        .layer(cors)
        .with_state(state)
}

/// Serves the router until `shutdown` is notified.
pub async fn serve(state: AppState, address: SocketAddr, shutdown: Arc<Notify>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!("Web API listening on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await?;

    info!("Web API stopped");
    Ok(())
}

async fn health() -> Json<StatusBody> {
    Json(StatusBody::ok())
}
