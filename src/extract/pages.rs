use super::oracle::VisionOracle;
use super::render::PageRenderer;
use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{LabelRecord, OrderRecord};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 抽取参数
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub store_name: String,
    pub delivery_note_max_tokens: u32,
    pub shipping_label_max_tokens: u32,
    pub max_pages: Option<usize>,
}

impl ExtractSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            store_name: config.vision.store_name.clone(),
            delivery_note_max_tokens: config.vision.delivery_note_max_tokens,
            shipping_label_max_tokens: config.vision.shipping_label_max_tokens,
            max_pages: config.render.max_pages,
        }
    }
}

pub fn delivery_note_prompt(store_name: &str) -> String {
    format!(
        r#"この納品書画像から以下の情報を抽出してください:
1. 店舗名（「{store_name}」かどうか）
2. 管理番号（No.）
3. 注文番号
4. お届け先の郵便番号（〒を除く）
5. お届け先の名前（姓名の間のスペースを除く）

店舗名が「{store_name}」の場合のみ、JSON形式で返してください:
{{"is_amazon": true, "no": "00082345", "order_id": "249-2620196-4843868", "postal_code": "6610034", "name": "渡部奈央"}}

Amazon店でない場合は:
{{"is_amazon": false}}"#
    )
}

pub const SHIPPING_LABEL_PROMPT: &str = r#"この送り状画像から以下の情報を抽出してください:
1. お届け先の郵便番号（〒とハイフンを除く）
2. お届け先の名前（姓名の間のスペースを除く）

JSON形式で返してください:
{"postal_code": "6610034", "name": "渡部奈央"}"#;

#[derive(Debug, Deserialize)]
struct DeliveryNoteReply {
    #[serde(default)]
    is_amazon: Value,
    no: Option<String>,
    order_id: Option<String>,
    postal_code: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShippingLabelReply {
    postal_code: String,
    name: String,
}

/// 纳品书单页的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryNotePage {
    Order(OrderRecord),
    /// 其他店铺的订单
    OtherStore,
    /// 回复无法解析，该页丢弃
    Unreadable,
}

pub fn parse_delivery_note_reply(page: u32, reply: &str) -> DeliveryNotePage {
    let Ok(parsed) = serde_json::from_str::<DeliveryNoteReply>(reply) else {
        return DeliveryNotePage::Unreadable;
    };
    if !is_truthy(&parsed.is_amazon) {
        return DeliveryNotePage::OtherStore;
    }

    match (parsed.no, parsed.order_id, parsed.postal_code, parsed.name) {
        (Some(no), Some(order_id), Some(postal_code), Some(name)) => {
            DeliveryNotePage::Order(OrderRecord::new(page, no, order_id, &postal_code, &name))
        }
        _ => DeliveryNotePage::Unreadable,
    }
}

/// 模型偶尔返回 1 或 "true" 而不是布尔值，按 JSON 真值判断
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// 送り状单页解析；失败时返回占位记录，页位保留
pub fn parse_shipping_label_reply(page: u32, reply: &str) -> LabelRecord {
    match serde_json::from_str::<ShippingLabelReply>(reply) {
        Ok(parsed) => LabelRecord::new(page, &parsed.postal_code, &parsed.name),
        Err(e) => {
            tracing::warn!("送り状第 {} 页解析失败, 以空记录占位: {}", page, e);
            LabelRecord::placeholder(page)
        }
    }
}

/// 渲染到独立临时目录；目录随返回的 TempDir 一起清理
async fn render_scoped<R: PageRenderer>(
    renderer: &R,
    pdf: &Path,
    prefix: &str,
    max_pages: Option<usize>,
) -> Result<(TempDir, Vec<PathBuf>)> {
    let scratch = tempfile::Builder::new().prefix(prefix).tempdir()?;
    let mut pages = renderer.render_pages(pdf, scratch.path()).await?;
    if let Some(limit) = max_pages {
        pages.truncate(limit);
    }
    Ok((scratch, pages))
}

/// 从纳品书抽取目标店铺的订单，按页序
pub async fn extract_orders<R: PageRenderer, O: VisionOracle>(
    renderer: &R,
    oracle: &O,
    settings: &ExtractSettings,
    pdf: &Path,
) -> Result<Vec<OrderRecord>> {
    tracing::info!("读取纳品书: {}", pdf.display());
    let (_scratch, pages) = render_scoped(renderer, pdf, "delivery_note_", settings.max_pages).await?;
    let prompt = delivery_note_prompt(&settings.store_name);

    let total = pages.len();
    let mut orders = Vec::new();
    for (idx, image_path) in pages.iter().enumerate() {
        let page = idx as u32 + 1;
        tracing::info!("纳品书 {}/{} 页处理中", page, total);

        let image = tokio::fs::read(image_path).await?;
        let reply = oracle
            .extract(&prompt, &image, settings.delivery_note_max_tokens)
            .await?;

        match parse_delivery_note_reply(page, &reply) {
            DeliveryNotePage::Order(order) => orders.push(order),
            DeliveryNotePage::OtherStore => {
                tracing::debug!("纳品书第 {} 页不是目标店铺, 跳过", page);
            }
            DeliveryNotePage::Unreadable => {
                tracing::warn!("纳品书第 {} 页解析失败, 跳过: {:?}", page, reply);
            }
        }
    }

    tracing::info!("纳品书抽取完成: {} 页, {} 条订单", total, orders.len());
    Ok(orders)
}

/// 从送り状抽取每一页，每页必有一条记录
pub async fn extract_labels<R: PageRenderer, O: VisionOracle>(
    renderer: &R,
    oracle: &O,
    settings: &ExtractSettings,
    pdf: &Path,
) -> Result<Vec<LabelRecord>> {
    tracing::info!("读取送り状: {}", pdf.display());
    let (_scratch, pages) = render_scoped(renderer, pdf, "shipping_label_", settings.max_pages).await?;

    let total = pages.len();
    let mut labels = Vec::with_capacity(total);
    for (idx, image_path) in pages.iter().enumerate() {
        let page = idx as u32 + 1;
        tracing::info!("送り状 {}/{} 页处理中", page, total);

        let image = tokio::fs::read(image_path).await?;
        let reply = oracle
            .extract(SHIPPING_LABEL_PROMPT, &image, settings.shipping_label_max_tokens)
            .await?;
        labels.push(parse_shipping_label_reply(page, &reply));
    }

    tracing::info!("送り状抽取完成: {} 页", total);
    Ok(labels)
}
