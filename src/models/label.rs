use crate::service::normalize::{normalize_name, normalize_postal_code};
use serde::{Deserialize, Serialize};

/// 送り状的一页
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub source_page: u32, // 原送り状 PDF 中的页码 (1起)，重排时使用
    pub postal_code: String,
    pub recipient_name: String,
    consumed: bool,
}

impl LabelRecord {
    pub fn new(source_page: u32, postal_code: &str, recipient_name: &str) -> Self {
        Self {
            source_page,
            postal_code: normalize_postal_code(postal_code),
            recipient_name: normalize_name(recipient_name),
            consumed: false,
        }
    }

    /// 抽取失败时的占位记录：保留页位，但永远不会被匹配
    pub fn placeholder(source_page: u32) -> Self {
        Self::new(source_page, "", "")
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// 标记为已使用，只能发生一次
    pub(crate) fn consume(&mut self) {
        debug_assert!(!self.consumed, "label page {} consumed twice", self.source_page);
        self.consumed = true;
    }
}
