use crate::extract::{PageRenderer, VisionOracle};
use crate::models::{OrderRecord, RunSummary};
use crate::service::Reconciler;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine as _;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

const DELIVERY_NOTE_FIELD: &str = "delivery_note";
const SHIPPING_LABEL_FIELD: &str = "shipping_label";

/// 响应体
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub success: bool,
    pub message: String,
    pub report: Option<ReconcileReport>,
}

/// 对账结果，生成的文件随响应一起返回
#[derive(Debug, Serialize)]
pub struct ReconcileReport {
    pub orders_extracted: usize,
    pub labels_extracted: usize,
    pub matched: usize,
    pub unmatched: Vec<OrderRecord>,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub content_base64: String,
}

impl ReconcileResponse {
    fn failure(status: StatusCode, message: String) -> Response {
        let body = Self {
            success: false,
            message,
            report: None,
        };
        (status, Json(body)).into_response()
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 上传纳品书与送り状两个 PDF，执行对账
pub async fn reconcile<R, O>(
    State(reconciler): State<Arc<Reconciler<R, O>>>,
    mut multipart: Multipart,
) -> Response
where
    R: PageRenderer + Send + Sync + 'static,
    O: VisionOracle + Send + Sync + 'static,
{
    let mut delivery_note = None;
    let mut shipping_label = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return ReconcileResponse::failure(StatusCode::BAD_REQUEST, format!("Error: {e}")),
        };
        let name = field.name().map(str::to_owned);
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return ReconcileResponse::failure(StatusCode::BAD_REQUEST, format!("Error: {e}")),
        };
        match name.as_deref() {
            Some(DELIVERY_NOTE_FIELD) => delivery_note = Some(bytes),
            Some(SHIPPING_LABEL_FIELD) => shipping_label = Some(bytes),
            _ => {}
        }
    }

    let (Some(delivery_note), Some(shipping_label)) = (delivery_note, shipping_label) else {
        return ReconcileResponse::failure(
            StatusCode::BAD_REQUEST,
            "Both delivery_note and shipping_label PDFs are required".to_string(),
        );
    };

    // 上传文件和生成的文件只在本次请求内存在，返回后随目录删除
    let workspace = match tempfile::Builder::new().prefix("reconcile_").tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            return ReconcileResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}"))
        }
    };
    let delivery_note_path = workspace.path().join("delivery_note.pdf");
    let shipping_label_path = workspace.path().join("shipping_label.pdf");
    let output_dir = workspace.path().join("out");

    let written = async {
        tokio::fs::write(&delivery_note_path, &delivery_note).await?;
        tokio::fs::write(&shipping_label_path, &shipping_label).await
    }
    .await;
    if let Err(e) = written {
        return ReconcileResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}"));
    }

    let summary = match reconciler
        .run(&delivery_note_path, &shipping_label_path, &output_dir)
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("对账失败: {}", e);
            return ReconcileResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}"));
        }
    };

    let report = match build_report(summary).await {
        Ok(report) => report,
        Err(e) => {
            return ReconcileResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}"))
        }
    };

    let response = ReconcileResponse {
        success: true,
        message: format!(
            "Matched {} of {} orders, {} unmatched",
            report.matched,
            report.orders_extracted,
            report.unmatched.len()
        ),
        report: Some(report),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 读取生成的文件并内联到响应中，不暴露服务器本地路径
async fn build_report(summary: RunSummary) -> std::io::Result<ReconcileReport> {
    let mut artifacts = Vec::new();
    for path in summary.artifacts() {
        let content = tokio::fs::read(path).await?;
        artifacts.push(Artifact {
            file_name: file_name(path),
            content_base64: base64::engine::general_purpose::STANDARD.encode(content),
        });
    }

    Ok(ReconcileReport {
        orders_extracted: summary.orders_extracted,
        labels_extracted: summary.labels_extracted,
        matched: summary.matched,
        unmatched: summary.unmatched,
        artifacts,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
