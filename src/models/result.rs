use super::OrderRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 订单与送り状页的配对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub order: OrderRecord,
    pub label_page: u32,
    pub score: f64,
}

/// 一次匹配的输出：配对按订单处理顺序排列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    pub unmatched: Vec<OrderRecord>,
}

impl MatchOutcome {
    /// 重排用的送り状页序列
    pub fn page_order(&self) -> Vec<u32> {
        self.matches.iter().map(|m| m.label_page).collect()
    }
}

/// 不一致列表的两种排序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmatchedReports {
    pub by_management_number: Vec<OrderRecord>,
    pub by_order_id: Vec<OrderRecord>,
}

/// 单次运行统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub orders_extracted: usize,
    pub labels_extracted: usize,
    pub matched: usize,
    pub unmatched: Vec<OrderRecord>,
    pub run_dir: PathBuf, // 本次运行独占的输出目录
    pub sorted_labels_pdf: Option<PathBuf>,
    pub missing_by_no_csv: Option<PathBuf>,
    pub missing_by_order_csv: Option<PathBuf>,
}

impl RunSummary {
    /// 本次生成的文件，顺序: PDF, 按管理番号, 按注文番号
    pub fn artifacts(&self) -> impl Iterator<Item = &PathBuf> {
        [
            &self.sorted_labels_pdf,
            &self.missing_by_no_csv,
            &self.missing_by_order_csv,
        ]
        .into_iter()
        .flatten()
    }
}
