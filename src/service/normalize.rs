/// 去掉邮编中的 〒 和连字符，其他字符原样保留
pub fn normalize_postal_code(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '〒' | '-')).collect()
}

/// 去掉姓名中的半角和全角空格
pub fn normalize_name(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, ' ' | '\u{3000}')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_postal_marker_and_hyphen() {
        assert_eq!(normalize_postal_code("〒661-0034"), "6610034");
        assert_eq!(normalize_postal_code("661-0034"), "6610034");
        assert_eq!(normalize_postal_code("SW1A-1AA"), "SW1A1AA");
    }

    #[test]
    fn strips_half_and_full_width_spaces() {
        assert_eq!(normalize_name("渡部 奈央"), "渡部奈央");
        assert_eq!(normalize_name("渡部\u{3000}奈央"), "渡部奈央");
        assert_eq!(normalize_name(" 渡 部　奈 央 "), "渡部奈央");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["〒661-0034", "6610034", "--〒〒", "", "abc-12"] {
            let once = normalize_postal_code(raw);
            assert_eq!(normalize_postal_code(&once), once);
        }
        for raw in ["渡部 奈央", "渡部\u{3000}奈央", "  ", "", "Jane Doe"] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once);
        }
    }
}
