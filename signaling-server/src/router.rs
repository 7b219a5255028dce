use axum::extract::ws::WebSocketUpgrade;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};

use crate::relay::{self, Connections};

#[allow(clippy::unused_async)]
async fn health_handler() -> &'static str {
    "OK"
}

#[allow(clippy::unused_async)]
async fn call_handler(
    ws: WebSocketUpgrade,
    Extension(connections): Extension<Connections>,
) -> Response {
    ws.on_upgrade(move |socket| relay::peer_connected(socket, connections))
}

pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/call", get(call_handler))
        .layer(Extension(Connections::default()))
}
