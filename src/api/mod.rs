pub mod handlers;

pub use handlers::*;

use crate::extract::{PageRenderer, VisionOracle};
use crate::service::Reconciler;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 构建路由: /health 与 /api/reconcile
pub fn router<R, O>(reconciler: Arc<Reconciler<R, O>>, max_upload_bytes: usize) -> Router
where
    R: PageRenderer + Send + Sync + 'static,
    O: VisionOracle + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/reconcile", post(reconcile::<R, O>))
        .with_state(reconciler)
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(max_upload_bytes)))
}
