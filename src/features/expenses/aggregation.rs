use crate::features::expenses::models::{Expense, ExpenseStatistics};
use std::collections::HashMap;

/// 経費集合をカテゴリ別・月別に集計する
///
/// # 引数
/// * `expenses` - 集計対象の経費（呼び出し側で絞り込み済み）
///
/// # 戻り値
/// カテゴリ別・月別の合計金額
///
/// # 集計規則
/// - カテゴリは格納されている文字列そのままでグループ化する
/// - 月は日付から導出した英語の月名（January〜December）でグループ化する
/// - 経費のない月はマップに含まれない（12か月のゼロ埋めは表示層の責務）
pub fn aggregate(expenses: &[Expense]) -> ExpenseStatistics {
    let mut by_category: HashMap<String, f64> = HashMap::new();
    let mut by_month: HashMap<String, f64> = HashMap::new();

    for expense in expenses {
        *by_category.entry(expense.category.clone()).or_insert(0.0) += expense.amount;

        let month = expense.date.format("%B").to_string();
        *by_month.entry(month).or_insert(0.0) += expense.amount;
    }

    ExpenseStatistics {
        by_category,
        by_month,
    }
}
