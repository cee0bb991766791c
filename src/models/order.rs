use crate::service::normalize::{normalize_name, normalize_postal_code};
use serde::{Deserialize, Serialize};

/// 纳品书上的一条 Amazon 订单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub source_page: u32,          // 纳品书页码 (1起)
    pub management_number: String, // 管理番号 No.，仅用于排序，不保证唯一
    pub order_id: String,          // 注文番号
    pub postal_code: String,       // 已规范化
    pub recipient_name: String,    // 已规范化
}

impl OrderRecord {
    /// 由抽取结果构建，邮编与姓名在此规范化
    pub fn new(
        source_page: u32,
        management_number: impl Into<String>,
        order_id: impl Into<String>,
        postal_code: &str,
        recipient_name: &str,
    ) -> Self {
        Self {
            source_page,
            management_number: management_number.into(),
            order_id: order_id.into(),
            postal_code: normalize_postal_code(postal_code),
            recipient_name: normalize_name(recipient_name),
        }
    }
}
