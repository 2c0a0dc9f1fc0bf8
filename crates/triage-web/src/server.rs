//! Web服务器

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use triage_core::Result;
use triage_workflow::TriageEngine;

use crate::handlers::{
    api_root, assign_patient, busy_doctors, get_patient, get_queue, get_stats, health,
    list_patients, override_priority, remove_patient, submit_triage, update_status,
};

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, engine: TriageEngine, allow_any_origin: bool) -> Self {
        let mut app = create_app(engine);
        if allow_any_origin {
            app = app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        Self { addr, app }
    }

    pub async fn run(self) -> Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app).await?;

        Ok(())
    }
}

/// 构建路由
pub fn create_app(engine: TriageEngine) -> Router {
    Router::new()
        // 根路径
        .route("/", get(api_root))
        // 健康检查
        .route("/health", get(health))
        // API路由
        .nest("/api", api_routes())
        .with_state(engine)
        // 全局中间件
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// API 路由
fn api_routes() -> Router<TriageEngine> {
    Router::new()
        .route("/patients", get(list_patients))
        .route("/patients/queue", get(get_queue))
        .route("/patients/stats", get(get_stats))
        .route("/patients/triage", post(submit_triage))
        .route("/patients/:id", get(get_patient).delete(remove_patient))
        .route("/patients/:id/status", patch(update_status))
        .route("/patients/:id/assign", patch(assign_patient))
        .route("/patients/:id/override", patch(override_priority))
        .route("/doctors/busy", get(busy_doctors))
}
