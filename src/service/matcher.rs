use crate::models::{LabelRecord, MatchOutcome, MatchResult, OrderRecord};
use crate::service::similarity::similarity;

/// 姓名相似度阈值（严格大于）
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.8;

/// 订单与送り状的匹配
///
/// 按纳品书顺序逐个处理订单，对每个订单扫描所有未使用的送り状：
/// 邮编完全相同且姓名相似度 > 0.8 的为候选，取分数严格最高者（同分取先扫描到的），
/// 命中后该送り状标记为已使用，不再参与后续订单。
/// 贪心且依赖顺序，订单顺序决定了最终送り状的排列。
pub fn match_orders(orders: &[OrderRecord], labels: &mut [LabelRecord]) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for order in orders {
        let mut best: Option<(usize, f64)> = None;

        for (idx, label) in labels.iter().enumerate() {
            if label.is_consumed() || label.postal_code != order.postal_code {
                continue;
            }

            let score = similarity(&order.recipient_name, &label.recipient_name);
            if score <= NAME_SIMILARITY_THRESHOLD {
                continue;
            }

            let is_better = match best {
                None => true,
                Some((_, best_score)) => score > best_score,
            };
            if is_better {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) => {
                let label = &mut labels[idx];
                label.consume();
                tracing::debug!(
                    "订单 {} (纳品书第 {} 页) -> 送り状第 {} 页, 相似度 {:.3}",
                    order.order_id, order.source_page, label.source_page, score
                );
                outcome.matches.push(MatchResult {
                    order: order.clone(),
                    label_page: label.source_page,
                    score,
                });
            }
            None => {
                tracing::debug!("订单 {} 没有对应的送り状", order.order_id);
                outcome.unmatched.push(order.clone());
            }
        }
    }

    tracing::info!(
        "匹配完成: 订单 {}, 已匹配 {}, 未匹配 {}",
        orders.len(),
        outcome.matches.len(),
        outcome.unmatched.len()
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn order(page: u32, no: &str, postal: &str, name: &str) -> OrderRecord {
        OrderRecord::new(page, no, format!("249-0000000-{page:07}"), postal, name)
    }

    #[test]
    fn matches_after_name_normalization() {
        let orders = vec![order(1, "00082345", "6610034", "渡部奈央")];
        let mut labels = vec![LabelRecord::new(1, "〒661-0034", "渡部 奈央")];

        let outcome = match_orders(&orders, &mut labels);

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].label_page, 1);
        assert!((outcome.matches[0].score - 1.0).abs() < 1e-9);
        assert!(outcome.unmatched.is_empty());
        assert!(labels[0].is_consumed());
    }

    #[test]
    fn different_postal_code_never_matches() {
        let orders = vec![order(1, "1", "6610034", "渡部奈央")];
        let mut labels = vec![LabelRecord::new(1, "6610035", "渡部奈央")];

        let outcome = match_orders(&orders, &mut labels);

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unmatched, orders);
        assert!(!labels[0].is_consumed());
    }

    #[test]
    fn similarity_at_threshold_is_rejected() {
        // 2*4/10 = 0.8, 不满足严格大于
        let orders = vec![order(1, "1", "1000001", "abcdX")];
        let mut labels = vec![LabelRecord::new(1, "1000001", "abcdY")];

        let outcome = match_orders(&orders, &mut labels);

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unmatched.len(), 1);
    }

    #[test]
    fn first_processed_order_consumes_the_label() {
        let orders = vec![
            order(1, "00000001", "6610034", "渡部奈央"),
            order(2, "00000002", "6610034", "渡部奈央"),
        ];
        let mut labels = vec![LabelRecord::new(7, "6610034", "渡部奈央")];

        let outcome = match_orders(&orders, &mut labels);

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].order.source_page, 1);
        assert_eq!(outcome.unmatched, vec![orders[1].clone()]);
    }

    #[test]
    fn picks_highest_score_then_first_seen() {
        let orders = vec![order(1, "1", "1500001", "山田太郎丸")];
        let mut labels = vec![
            LabelRecord::new(1, "1500001", "山田太郎"),   // 8/9
            LabelRecord::new(2, "1500001", "山田太郎丸"), // 1.0
            LabelRecord::new(3, "1500001", "山田太郎丸"), // 1.0, 后出现
        ];

        let outcome = match_orders(&orders, &mut labels);
        assert_eq!(outcome.page_order(), vec![2]);
        assert!(!labels[0].is_consumed());
        assert!(labels[1].is_consumed());
        assert!(!labels[2].is_consumed());

        let orders = vec![order(1, "1", "1500001", "山田太郎")];
        let mut labels = vec![
            LabelRecord::new(4, "1500001", "山田太郎丸"),
            LabelRecord::new(5, "1500001", "山田太郎子"),
        ];
        let outcome = match_orders(&orders, &mut labels);
        assert_eq!(outcome.page_order(), vec![4]);
    }

    #[test]
    fn placeholder_labels_only_match_empty_orders() {
        let orders = vec![OrderRecord::new(1, "1", "x", "", "")];
        let mut labels = vec![LabelRecord::placeholder(1)];

        let outcome = match_orders(&orders, &mut labels);

        // 订单自身邮编和姓名也为空时会命中占位页（逐字比较）
        assert_eq!(outcome.matches.len(), 1);

        let orders = vec![order(1, "1", "6610034", "渡部奈央")];
        let mut labels = vec![LabelRecord::placeholder(1)];
        let outcome = match_orders(&orders, &mut labels);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn output_follows_order_sequence_and_pages_are_unique() {
        let orders = vec![
            order(1, "3", "1000003", "佐藤一郎"),
            order(2, "1", "1000001", "鈴木花子"),
            order(3, "2", "1000002", "高橋健"),
            order(4, "4", "1000009", "存在しない"),
        ];
        let mut labels = vec![
            LabelRecord::new(1, "1000001", "鈴木 花子"),
            LabelRecord::new(2, "1000002", "高橋　健"),
            LabelRecord::new(3, "1000003", "佐藤一郎"),
            LabelRecord::placeholder(4),
        ];

        let outcome = match_orders(&orders, &mut labels);

        assert_eq!(outcome.page_order(), vec![3, 1, 2]);
        assert_eq!(outcome.unmatched, vec![orders[3].clone()]);

        let pages: HashSet<u32> = outcome.page_order().into_iter().collect();
        assert_eq!(pages.len(), outcome.matches.len());
    }

    #[test]
    fn matching_is_deterministic() {
        let orders = vec![
            order(1, "1", "1000001", "鈴木花子"),
            order(2, "2", "1000001", "鈴木花江"),
        ];
        let labels = vec![
            LabelRecord::new(1, "1000001", "鈴木花江"),
            LabelRecord::new(2, "1000001", "鈴木花子"),
        ];

        let first = match_orders(&orders, &mut labels.clone());
        let second = match_orders(&orders, &mut labels.clone());
        assert_eq!(first, second);
        assert_eq!(first.page_order(), vec![2, 1]);
    }
}
