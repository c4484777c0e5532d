#![allow(dead_code)]

mod event;
mod routes;
mod services;
mod state;
mod timers;
mod words;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()
        .expect("invalid PORT");
    let allowed_origin = std::env::var("ALLOWED_ORIGIN").ok();

    let state = state::AppState::new();
    let app = routes::app(state, allowed_origin.as_deref());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "sketchroom listening");
    axum::serve(listener, app).await.expect("server failed");
}
