use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::extract::{
    extract_labels, extract_orders, ExtractSettings, OpenAiVisionClient, PageRenderer,
    PdftoppmRenderer, VisionOracle,
};
use crate::models::{MatchOutcome, RunSummary};
use crate::service::{matcher, reorder, report};
use chrono::Local;
use std::path::{Path, PathBuf};

/// 纳品书与送り状对账服务
pub struct Reconciler<R, O> {
    renderer: R,
    oracle: O,
    settings: ExtractSettings,
}

/// 生产环境组合: pdftoppm + OpenAI
pub type DefaultReconciler = Reconciler<PdftoppmRenderer, OpenAiVisionClient>;

impl DefaultReconciler {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            PdftoppmRenderer::new(&config.render),
            OpenAiVisionClient::new(&config.vision)?,
            ExtractSettings::from_config(config),
        ))
    }
}

impl<R, O> Reconciler<R, O> {
    pub fn new(renderer: R, oracle: O, settings: ExtractSettings) -> Self {
        Self {
            renderer,
            oracle,
            settings,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<R: PageRenderer, O: VisionOracle> Reconciler<R, O> {
    /// 完整流程: 校验输入 -> 抽取订单 -> 抽取送り状 -> 匹配 -> 重排 PDF / 导出不一致列表
    ///
    /// 结果写在 output_dir 下本次运行独占的子目录中。
    /// 没有任何匹配时不生成 PDF，没有未匹配订单时不生成 CSV，两者都不算错误。
    pub async fn run(
        &self,
        delivery_note: &Path,
        shipping_label: &Path,
        output_dir: &Path,
    ) -> Result<RunSummary> {
        ensure_input("delivery note", delivery_note).await?;
        ensure_input("shipping label", shipping_label).await?;

        let orders = extract_orders(&self.renderer, &self.oracle, &self.settings, delivery_note).await?;
        let mut labels =
            extract_labels(&self.renderer, &self.oracle, &self.settings, shipping_label).await?;
        tracing::info!("纳品书中抽取到 {} 条 Amazon 订单", orders.len());
        tracing::info!("送り状中抽取到 {} 页", labels.len());

        let outcome = matcher::match_orders(&orders, &mut labels);

        if !outcome.unmatched.is_empty() {
            tracing::warn!("{} 条订单没有找到对应的送り状", outcome.unmatched.len());
            for order in &outcome.unmatched {
                tracing::warn!(
                    "管理番号: {}, 注文番号: {}, 郵便番号: {}, 名前: {}",
                    order.management_number, order.order_id, order.postal_code, order.recipient_name
                );
            }
        }

        // lopdf 与 csv 都是同步 IO，放到阻塞线程池
        let shipping_label = shipping_label.to_path_buf();
        let output_dir = output_dir.to_path_buf();
        let (order_count, label_count) = (orders.len(), labels.len());
        let summary = tokio::task::spawn_blocking(move || {
            export_artifacts(&shipping_label, &output_dir, outcome, order_count, label_count)
        })
        .await??;

        Ok(summary)
    }
}

/// 在 output_dir 下新建 run_<时间戳>_<随机> 目录并写出本次的 PDF / CSV
///
/// 同一秒内的多次运行各自独占目录，互不覆盖。
pub fn export_artifacts(
    shipping_label: &Path,
    output_dir: &Path,
    outcome: MatchOutcome,
    orders_extracted: usize,
    labels_extracted: usize,
) -> Result<RunSummary> {
    std::fs::create_dir_all(output_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let run_dir = tempfile::Builder::new()
        .prefix(&format!("run_{timestamp}_"))
        .tempdir_in(output_dir)?
        .into_path();

    let mut summary = RunSummary {
        orders_extracted,
        labels_extracted,
        matched: outcome.matches.len(),
        unmatched: outcome.unmatched.clone(),
        run_dir: run_dir.clone(),
        sorted_labels_pdf: None,
        missing_by_no_csv: None,
        missing_by_order_csv: None,
    };

    if !outcome.matches.is_empty() {
        let path = run_dir.join(format!("sorted_labels_{timestamp}.pdf"));
        reorder::export_reordered(shipping_label, &outcome.page_order(), &path)?;
        summary.sorted_labels_pdf = Some(path);
    }

    if !outcome.unmatched.is_empty() {
        let reports = report::build_reports(&outcome.unmatched);
        let by_no = run_dir.join(format!("missing_by_no_{timestamp}.csv"));
        report::export_report(&reports.by_management_number, &by_no)?;
        let by_order = run_dir.join(format!("missing_by_order_{timestamp}.csv"));
        report::export_report(&reports.by_order_id, &by_order)?;

        summary.missing_by_no_csv = Some(by_no);
        summary.missing_by_order_csv = Some(by_order);
    }

    tracing::info!("输出目录: {}", run_dir.display());
    Ok(summary)
}

async fn ensure_input(what: &str, path: &Path) -> Result<()> {
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if is_file {
        Ok(())
    } else {
        Err(Error::MissingInput(format!("{what} PDF not found: {}", path.display())))
    }
}
