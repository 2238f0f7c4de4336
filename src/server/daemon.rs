use axum::{
  http::HeaderValue,
  routing::get,
  Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::ServerConfig;
use crate::access::StorageAccess;
use crate::auth::BasicAuthResolver;
use crate::collection::{self, CollectionService};
use crate::storage::SessionFactory;
use crate::user::{self, UserService};

/// State shared by all HTTP handlers
pub struct AppState {
  pub collections: CollectionService,
  pub users: UserService,
}

impl AppState {
  pub fn new(access: StorageAccess) -> Self {
    Self {
      collections: CollectionService::new(access.clone()),
      users: UserService::new(access),
    }
  }
}

/// Build the HTTP API router
pub fn build_router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/collection", get(collection::get_collection_without_path))
    .route("/collection/", get(collection::get_collection_without_path))
    .route("/collection/{*path}", get(collection::get_collection))
    .route("/user/{user_name}", get(user::get_user).put(user::put_user))
    .with_state(state)
}

async fn health() -> &'static str {
  "OK"
}

pub struct Daemon {
  config: ServerConfig,
  state: Arc<AppState>,
  shutdown_tx: broadcast::Sender<()>,
}

impl Daemon {
  pub fn new(config: ServerConfig, sessions: Arc<dyn SessionFactory>) -> Self {
    let (shutdown_tx, _) = broadcast::channel(1);
    let resolver = Arc::new(BasicAuthResolver::new(&config.irods));
    tracing::info!(
      "Credentials bound to {}:{} zone={} resource={}",
      config.irods.host,
      config.irods.port,
      config.irods.zone,
      config.irods.default_resource
    );
    let state = Arc::new(AppState::new(StorageAccess::new(resolver, sessions)));

    Self {
      config,
      state,
      shutdown_tx,
    }
  }

  /// Trigger graceful shutdown
  pub fn shutdown(&self) {
    tracing::info!("Initiating graceful shutdown...");
    let _ = self.shutdown_tx.send(());
  }

  /// Router with CORS and request tracing applied
  pub fn router(&self) -> Router {
    build_router(self.state.clone())
      .layer(self.cors_layer())
      .layer(TraceLayer::new_for_http())
  }

  fn cors_layer(&self) -> CorsLayer {
    let origins = &self.config.server.cors_origins;
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
      return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
      .iter()
      .filter_map(|o| match HeaderValue::from_str(o) {
        Ok(value) => Some(value),
        Err(_) => {
          tracing::warn!("Ignoring invalid CORS origin: {}", o);
          None
        }
      })
      .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
  }

  pub async fn run(&self) -> Result<(), anyhow::Error> {
    let addr = self.config.address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("irods-rest listening on {}", addr);

    let mut shutdown_rx = self.shutdown_tx.subscribe();
    axum::serve(listener, self.router())
      .with_graceful_shutdown(async move {
        let _ = shutdown_rx.recv().await;
      })
      .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
  }
}
