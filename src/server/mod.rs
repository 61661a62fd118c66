use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::signal;
use tracing::{debug, info, warn};

use crate::registry::Tracker;

pub mod api;
pub mod routes;

use routes::HttpResponse;

/// All routes go through [routes::route_request]; axum only carries the transport.
pub fn router(tracker: Arc<Tracker>) -> Router {
    Router::new().fallback(dispatch).with_state(tracker)
}

async fn dispatch(State(tracker): State<Arc<Tracker>>, method: Method, uri: Uri) -> Response {
    let target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    let response = routes::route_request(&tracker, method.as_str(), target);
    debug!(%method, path = target, status = response.status_code, "request");
    response.into_response()
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Blocking entry point for the CLI: runs the server on a fresh tokio runtime until Ctrl+C.
pub fn run_server(bind_addr: &str, tracker: Arc<Tracker>) -> std::io::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(bind_addr, tracker))
}

pub async fn serve(bind_addr: &str, tracker: Arc<Tracker>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("vitrack server listening on http://{bind_addr}");
    axum::serve(listener, router(tracker))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "Ctrl+C handler installation failed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
