use crate::error::Result;
use crate::models::{OrderRecord, UnmatchedReports};
use csv::{Terminator, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Excel 打开 UTF-8 CSV 需要 BOM
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADER: [&str; 5] = ["page", "no", "order_id", "postal_code", "name"];

/// 未匹配订单按管理番号、注文番号各排一次（字符串字典序，稳定排序）
pub fn build_reports(unmatched: &[OrderRecord]) -> UnmatchedReports {
    let mut by_management_number = unmatched.to_vec();
    by_management_number.sort_by(|a, b| a.management_number.cmp(&b.management_number));

    let mut by_order_id = unmatched.to_vec();
    by_order_id.sort_by(|a, b| a.order_id.cmp(&b.order_id));

    UnmatchedReports {
        by_management_number,
        by_order_id,
    }
}

/// 写出不一致列表 CSV：BOM + 表头 + 每订单一行，CRLF 换行
pub fn write_report<W: Write>(mut out: W, rows: &[OrderRecord]) -> Result<()> {
    out.write_all(UTF8_BOM)?;

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::CRLF)
        .from_writer(out);

    writer.write_record(HEADER)?;
    for order in rows {
        writer.write_record(&[
            order.source_page.to_string(),
            order.management_number.clone(),
            order.order_id.clone(),
            order.postal_code.clone(),
            order.recipient_name.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// 导出到文件
pub fn export_report(rows: &[OrderRecord], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    write_report(file, rows)?;
    tracing::info!("不一致列表已导出: {} 行 -> {}", rows.len(), output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn order(page: u32, no: &str, order_id: &str) -> OrderRecord {
        OrderRecord::new(page, no, order_id, "〒661-0034", "渡部 奈央")
    }

    #[test]
    fn sorts_by_management_number_as_strings() {
        let unmatched = vec![
            order(1, "00082345", "249-3"),
            order(2, "00082100", "249-1"),
            order(3, "00082999", "249-2"),
        ];

        let reports = build_reports(&unmatched);

        let numbers: Vec<&str> = reports
            .by_management_number
            .iter()
            .map(|o| o.management_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["00082100", "00082345", "00082999"]);

        let ids: Vec<&str> = reports.by_order_id.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["249-1", "249-2", "249-3"]);
    }

    #[test]
    fn lexicographic_not_numeric_and_stable() {
        let unmatched = vec![
            order(1, "9", "b"),
            order(2, "10", "a"),
            order(3, "10", "a"),
        ];

        let reports = build_reports(&unmatched);

        let pages: Vec<u32> = reports.by_management_number.iter().map(|o| o.source_page).collect();
        assert_eq!(pages, vec![2, 3, 1]);
        let pages: Vec<u32> = reports.by_order_id.iter().map(|o| o.source_page).collect();
        assert_eq!(pages, vec![2, 3, 1]);
    }

    #[test]
    fn csv_has_bom_header_and_crlf_rows() {
        let mut buf = Vec::new();
        write_report(&mut buf, &[order(4, "00082345", "249-2620196-4843868")]).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&buf[UTF8_BOM.len()..]).unwrap();
        assert_eq!(
            text,
            "page,no,order_id,postal_code,name\r\n4,00082345,249-2620196-4843868,6610034,渡部奈央\r\n"
        );
    }

    #[test]
    fn empty_report_still_has_header() {
        let mut buf = Vec::new();
        write_report(&mut buf, &[]).unwrap();
        assert_eq!(&buf[UTF8_BOM.len()..], b"page,no,order_id,postal_code,name\r\n");
    }
}
