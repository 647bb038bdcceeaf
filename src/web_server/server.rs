use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::compiler::CompiledRule;
use crate::profile::Profile;
use crate::sync::{RefreshRequest, RefreshResponse, RuleSynchronizer};

#[derive(Clone)]
pub struct WebServer {
    pub port: u16,
    pub host: String,
    pub synchronizer: RuleSynchronizer,
}

impl WebServer {
    pub fn new(port: u16, host: String, synchronizer: RuleSynchronizer) -> Self {
        Self {
            port,
            host,
            synchronizer,
        }
    }

    pub async fn start(&self) -> Result<()> {
        let app = self.create_app();
        // Convert localhost to 127.0.0.1 for proper parsing
        let host = if self.host == "localhost" {
            "127.0.0.1"
        } else {
            &self.host
        };
        let addr: SocketAddr = format!("{}:{}", host, self.port).parse()?;

        let listener = TcpListener::bind(addr).await?;
        info!(
            "Message endpoint listening on http://{}:{}",
            self.host, self.port
        );

        axum::serve(listener, app).await?;

        Ok(())
    }

    pub fn create_app(&self) -> Router {
        Router::new()
            .route("/api/message", post(handle_message))
            .route("/api/rules", get(list_rules))
            .route("/api/profiles", get(list_profiles))
            .with_state(self.synchronizer.clone())
            .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
    }
}

async fn handle_message(
    State(synchronizer): State<RuleSynchronizer>,
    Json(request): Json<RefreshRequest>,
) -> (StatusCode, Json<RefreshResponse>) {
    info!("Message received: {}", request.action);

    match synchronizer.handle_message(&request).await {
        Some(response) => (StatusCode::OK, Json(response)),
        None => (
            StatusCode::BAD_REQUEST,
            Json(RefreshResponse::failed(format!(
                "Unknown action: {}",
                request.action
            ))),
        ),
    }
}

async fn list_rules(
    State(synchronizer): State<RuleSynchronizer>,
) -> Result<Json<Vec<CompiledRule>>, (StatusCode, String)> {
    synchronizer
        .engine()
        .get_dynamic_rules()
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Failed to list rules: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}

async fn list_profiles(
    State(synchronizer): State<RuleSynchronizer>,
) -> Result<Json<Vec<Profile>>, (StatusCode, String)> {
    synchronizer
        .repository()
        .list()
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Failed to list profiles: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}
