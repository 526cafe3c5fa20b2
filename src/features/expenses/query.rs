use crate::features::expenses::models::ExpenseFilter;
use rusqlite::ToSql;

/// ページサイズが未指定の場合のデフォルト値
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 一覧取得の並び順（日付の新しい順、同日内はIDの大きい順）
///
/// 並び順が決定的であることで、データが変化しない限りページ間で
/// レコードの重複・欠落が発生しない。
pub const ORDER_CLAUSE: &str = " ORDER BY date DESC, id DESC";

/// 動的SQLのバインドパラメータ列
pub type SqlParams = Vec<Box<dyn ToSql>>;

/// 絞り込み条件からWHERE句とバインドパラメータを構築する
///
/// # 引数
/// * `user_id` - 認証済みの所有者ID（常に先頭の条件になる）
/// * `filter` - 絞り込み条件（すべて任意、AND結合）
///
/// # 戻り値
/// WHERE句（先頭に空白を含む）とバインドパラメータの組
pub fn build_where(user_id: i64, filter: &ExpenseFilter) -> (String, SqlParams) {
    let mut clause = String::from(" WHERE user_id = ?");
    let mut params: SqlParams = vec![Box::new(user_id)];

    // カテゴリの部分一致（大文字小文字を区別しない）
    if let Some(category) = non_blank(filter.category.as_deref()) {
        clause.push_str(" AND LOWER(category) LIKE ?");
        params.push(Box::new(format!("%{}%", category.to_lowercase())));
    }

    // 支払い方法の部分一致（大文字小文字を区別しない）
    if let Some(method) = non_blank(filter.payment_method.as_deref()) {
        clause.push_str(" AND LOWER(payment_method) LIKE ?");
        params.push(Box::new(format!("%{}%", method.to_lowercase())));
    }

    // 日付範囲（両端を含む）。ISO形式のTEXTは文字列比較で日付順になる
    if let Some(start_date) = filter.start_date {
        clause.push_str(" AND date >= ?");
        params.push(Box::new(start_date.format("%Y-%m-%d").to_string()));
    }
    if let Some(end_date) = filter.end_date {
        clause.push_str(" AND date <= ?");
        params.push(Box::new(end_date.format("%Y-%m-%d").to_string()));
    }

    // 説明文の全文検索（大文字小文字を区別しない部分一致）
    if let Some(search) = non_blank(filter.search.as_deref()) {
        clause.push_str(" AND LOWER(description) LIKE ?");
        params.push(Box::new(format!("%{}%", search.to_lowercase())));
    }

    (clause, params)
}

/// ページサイズを正規化する（未指定・0の場合はデフォルト値）
pub fn normalize_page_size(page_size: Option<u32>) -> u32 {
    match page_size {
        Some(size) if size > 0 => size,
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// 総ページ数を計算する
///
/// # 引数
/// * `matching_count` - 絞り込み条件に一致した件数
/// * `page_size` - ページサイズ
///
/// # 戻り値
/// 切り上げたページ数。0件の場合でも最低1ページを返す
/// （呼び出し側が常に有効なページ数を描画できるようにするため）
pub fn total_pages(matching_count: u64, page_size: u32) -> u32 {
    let pages = matching_count.div_ceil(u64::from(page_size));
    pages.max(1) as u32
}

/// 空白のみの文字列をNoneとして扱う
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_build_where_always_scopes_to_owner() {
        // フィルターなしでも所有者スコープは必ず付く
        let (clause, params) = build_where(7, &ExpenseFilter::default());
        assert_eq!(clause, " WHERE user_id = ?");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_build_where_combines_filters_with_and() {
        let filter = ExpenseFilter {
            category: Some("食".to_string()),
            payment_method: Some("cash".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            search: Some("昼".to_string()),
        };

        let (clause, params) = build_where(1, &filter);
        assert!(clause.contains("LOWER(category) LIKE ?"));
        assert!(clause.contains("LOWER(payment_method) LIKE ?"));
        assert!(clause.contains("date >= ?"));
        assert!(clause.contains("date <= ?"));
        assert!(clause.contains("LOWER(description) LIKE ?"));
        assert_eq!(clause.matches(" AND ").count(), 5);
        assert_eq!(params.len(), 6);
    }

    #[test]
    fn test_build_where_ignores_blank_filters() {
        // 空白のみの条件は無視される
        let filter = ExpenseFilter {
            category: Some("  ".to_string()),
            search: Some("".to_string()),
            ..ExpenseFilter::default()
        };

        let (clause, params) = build_where(1, &filter);
        assert_eq!(clause, " WHERE user_id = ?");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_normalize_page_size() {
        assert_eq!(normalize_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(normalize_page_size(Some(0)), DEFAULT_PAGE_SIZE);
        assert_eq!(normalize_page_size(Some(25)), 25);
    }

    #[test]
    fn test_total_pages() {
        // 0件でも最低1ページ
        assert_eq!(total_pages(0, 10), 1);

        // 切り上げの確認
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }
}
