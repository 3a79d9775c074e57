//! HTTP surface of the tree service.
//!
//! | Method & Path             | Handler                      |
//! |---------------------------|------------------------------|
//! | `GET /api/tree`           | [`handlers::get_tree`]       |
//! | `GET /api/tree/all`       | [`handlers::get_all_items`]  |
//! | `GET /api/tree/{id}`      | [`handlers::get_subtree`]    |
//! | `POST /api/tree`          | [`handlers::replace_tree`]   |
//! | `PUT /api/tree/{id}/data` | [`handlers::update_data`]    |
//! | `DELETE /api/tree/{id}`   | [`handlers::delete_node`]    |
//! | `GET /health`             | [`handlers::health`]         |

mod cors;
mod error;
pub mod handlers;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, put};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use ulid::Ulid;

pub use cors::cors_layer;
pub use error::ApiError;

use crate::service::{ServiceConfig, TreeService};

/// Build the application router.
pub fn router(service: TreeService, config: &ServiceConfig) -> Router {
    Router::new()
        .route(
            "/api/tree",
            get(handlers::get_tree).post(handlers::replace_tree),
        )
        .route("/api/tree/all", get(handlers::get_all_items))
        .route(
            "/api/tree/{id}",
            get(handlers::get_subtree).delete(handlers::delete_node),
        )
        .route("/api/tree/{id}/data", put(handlers::update_data))
        .route("/health", get(handlers::health))
        .layer(cors_layer(&config.allowed_origins))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Ulid::new(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(service)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(service: TreeService, config: &ServiceConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(service, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
