use crate::features::expenses::csv_import::CsvRow;
use crate::features::expenses::models::{
    Expense, ExpenseFilter, ExpensePage, ExpensePatch, NewExpense, PaymentMethod, RejectedRow,
};
use crate::features::expenses::query::{self, SqlParams, ORDER_CLAUSE};
use crate::shared::errors::{AppError, AppResult};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, ToSql};

/// SELECT句で使用するカラム一覧（map_expenseのインデックスと対応）
const EXPENSE_COLUMNS: &str =
    "id, user_id, amount, description, category, payment_method, date, created_at, updated_at";

/// 行を経費モデルに変換する
fn map_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let method_text: String = row.get(5)?;
    let payment_method = PaymentMethod::parse(&method_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("不正な支払い方法: {method_text}").into(),
        )
    })?;

    let date_text: String = row.get(6)?;
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        payment_method,
        date,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// 経費を作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `record` - 検証済みの新規経費レコード
///
/// # 戻り値
/// 作成された経費（IDはストアが採番する）、または失敗時はエラー
pub fn create(conn: &Connection, record: &NewExpense) -> AppResult<Expense> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO expenses (user_id, amount, description, category, payment_method, date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.user_id,
            record.amount,
            record.description,
            record.category,
            record.payment_method.as_str(),
            record.date.format("%Y-%m-%d").to_string(),
            now,
            now
        ],
    )?;

    let id = conn.last_insert_rowid();
    find_by_id(conn, id, record.user_id)
}

/// IDで経費を取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - 経費ID
/// * `user_id` - 所有者のユーザーID
///
/// # 戻り値
/// 経費、または該当ユーザーの経費として存在しない場合はNotFound
pub fn find_by_id(conn: &Connection, id: i64, user_id: i64) -> AppResult<Expense> {
    conn.query_row(
        &format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        map_expense,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::not_found("経費"),
        _ => AppError::Database(e.to_string()),
    })
}

/// 取込済みバッチを1件ずつ保存する
///
/// レコード単位で独立に保存します。ある行の保存失敗は該当行の却下として
/// 記録され、残りの行の保存は継続します（バッチ全体を中断しない）。
///
/// # 引数
/// * `conn` - データベース接続
/// * `batch` - 検証済みのCSV行（元の行番号つき）
///
/// # 戻り値
/// 保存された経費の一覧と、保存に失敗した行の却下リスト
pub fn bulk_create(conn: &Connection, batch: &[CsvRow]) -> (Vec<Expense>, Vec<RejectedRow>) {
    let mut inserted = Vec::new();
    let mut rejected = Vec::new();

    for row in batch {
        match create(conn, &row.record) {
            Ok(expense) => inserted.push(expense),
            Err(e) => {
                log::warn!(
                    "一括保存: {}行目の保存に失敗しました: {}",
                    row.row_number,
                    e.details()
                );
                rejected.push(RejectedRow {
                    row_number: row.row_number,
                    reason: "StorageError".to_string(),
                });
            }
        }
    }

    (inserted, rejected)
}

/// 経費一覧をページ単位で取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 所有者のユーザーID
/// * `filter` - 絞り込み条件
/// * `page` - 0始まりのページ番号
/// * `page_size` - ページサイズ
///
/// # 戻り値
/// 経費の一覧と総ページ数。範囲外のページを指定した場合は空の一覧と
/// 正しい総ページ数を返す（エラーにしない）
pub fn find_page(
    conn: &Connection,
    user_id: i64,
    filter: &ExpenseFilter,
    page: u32,
    page_size: u32,
) -> AppResult<ExpensePage> {
    let (where_clause, mut params) = query::build_where(user_id, filter);

    // 該当件数を取得
    let matching_count: i64 = {
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.query_row(
            &format!("SELECT COUNT(*) FROM expenses{where_clause}"),
            param_refs.as_slice(),
            |row| row.get(0),
        )?
    };
    let total_pages = query::total_pages(matching_count as u64, page_size);

    // 対象ページを取得
    params.push(Box::new(i64::from(page_size)));
    params.push(Box::new(i64::from(page) * i64::from(page_size)));
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses{where_clause}{ORDER_CLAUSE} LIMIT ? OFFSET ?"
    ))?;
    let expenses = stmt
        .query_map(param_refs.as_slice(), map_expense)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExpensePage {
        expenses,
        total_pages,
    })
}

/// 絞り込み条件に一致する経費をすべて取得する（統計の集計用）
///
/// 一覧取得と同じ絞り込み・並び順の契約を共有します。
pub fn find_all(conn: &Connection, user_id: i64, filter: &ExpenseFilter) -> AppResult<Vec<Expense>> {
    let (where_clause, params) = query::build_where(user_id, filter);
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses{where_clause}{ORDER_CLAUSE}"
    ))?;
    let expenses = stmt
        .query_map(param_refs.as_slice(), map_expense)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

/// 経費を更新する（指定フィールドのみ置換、所有者とIDは不変）
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - 経費ID
/// * `patch` - 検証済みの更新パッチ
/// * `user_id` - 所有者のユーザーID
///
/// # 戻り値
/// 更新された経費、または該当ユーザーの経費として存在しない場合はNotFound
pub fn update(
    conn: &Connection,
    id: i64,
    patch: &ExpensePatch,
    user_id: i64,
) -> AppResult<Expense> {
    let now = Utc::now().to_rfc3339();

    // 既存の経費を取得（他ユーザーの経費は存在しないものとして扱う）
    let existing = find_by_id(conn, id, user_id)?;

    // 更新するフィールドを決定
    let amount = patch.amount.unwrap_or(existing.amount);
    let description = patch.description.clone().unwrap_or(existing.description);
    let category = patch.category.clone().unwrap_or(existing.category);
    let payment_method = patch.payment_method.unwrap_or(existing.payment_method);
    let date = patch.date.unwrap_or(existing.date);

    conn.execute(
        "UPDATE expenses SET amount = ?1, description = ?2, category = ?3, payment_method = ?4, date = ?5, updated_at = ?6
         WHERE id = ?7 AND user_id = ?8",
        params![
            amount,
            description,
            category,
            payment_method.as_str(),
            date.format("%Y-%m-%d").to_string(),
            now,
            id,
            user_id
        ],
    )?;

    find_by_id(conn, id, user_id)
}

/// 複数の経費を削除する
///
/// 呼び出し元が所有するIDのみ削除します。所有していない・存在しないIDは
/// 静かに読み飛ばされ、削除件数に含まれません。
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 所有者のユーザーID
/// * `ids` - 削除対象のID一覧
///
/// # 戻り値
/// 実際に削除された件数、または失敗時はエラー
pub fn delete_many(conn: &Connection, user_id: i64, ids: &[i64]) -> AppResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    // ID数に応じたプレースホルダを組み立てる
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("DELETE FROM expenses WHERE user_id = ? AND id IN ({placeholders})");

    let mut sql_params: SqlParams = vec![Box::new(user_id)];
    for id in ids {
        sql_params.push(Box::new(*id));
    }
    let param_refs: Vec<&dyn ToSql> = sql_params.iter().map(|p| p.as_ref()).collect();

    let deleted = conn.execute(&sql, param_refs.as_slice())?;
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::connection::open_in_memory;
    use std::collections::HashSet;

    fn new_expense(user_id: i64, amount: f64, category: &str, date: &str) -> NewExpense {
        NewExpense {
            user_id,
            amount,
            description: format!("{category}の支出"),
            category: category.to_string(),
            payment_method: PaymentMethod::Cash,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        }
    }

    #[test]
    fn test_expense_crud_operations() {
        let conn = open_in_memory().unwrap();
        let user_id = 1;

        // 経費作成のテスト
        let expense = create(&conn, &new_expense(user_id, 1000.0, "食費", "2024-01-01")).unwrap();
        assert_eq!(expense.amount, 1000.0);
        assert_eq!(expense.category, "食費");
        assert_eq!(expense.user_id, user_id);

        // 経費取得のテスト
        let retrieved = find_by_id(&conn, expense.id, user_id).unwrap();
        assert_eq!(retrieved, expense);

        // 経費更新のテスト（指定フィールドのみ置換）
        let patch = ExpensePatch {
            amount: Some(1500.0),
            description: Some("更新された支出".to_string()),
            ..ExpensePatch::default()
        };
        let updated = update(&conn, expense.id, &patch, user_id).unwrap();
        assert_eq!(updated.amount, 1500.0);
        assert_eq!(updated.description, "更新された支出");
        // 未指定のフィールドは変わらない
        assert_eq!(updated.category, "食費");
        assert_eq!(updated.date, expense.date);
        // IDと所有者は不変
        assert_eq!(updated.id, expense.id);
        assert_eq!(updated.user_id, user_id);

        // 経費削除のテスト
        let deleted = delete_many(&conn, user_id, &[expense.id]).unwrap();
        assert_eq!(deleted, 1);
        assert!(find_by_id(&conn, expense.id, user_id).is_err());
    }

    #[test]
    fn test_update_not_found() {
        let conn = open_in_memory().unwrap();

        let result = update(&conn, 999, &ExpensePatch::default(), 1);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_user_data_isolation() {
        let conn = open_in_memory().unwrap();

        let expense_a = create(&conn, &new_expense(1, 1000.0, "食費", "2024-01-01")).unwrap();
        let expense_b = create(&conn, &new_expense(2, 2000.0, "交通費", "2024-01-02")).unwrap();

        // ユーザー1は自分の経費のみ取得できる
        let page = find_page(&conn, 1, &ExpenseFilter::default(), 0, 10).unwrap();
        assert_eq!(page.expenses.len(), 1);
        assert_eq!(page.expenses[0].id, expense_a.id);

        // 他ユーザーの経費は更新できない（存在も明かさない）
        let result = update(&conn, expense_b.id, &ExpensePatch::default(), 1);
        assert!(matches!(result, Err(AppError::NotFound(_))));

        // 他ユーザーの経費は削除できず、件数にも含まれない
        let deleted = delete_many(&conn, 1, &[expense_a.id, expense_b.id]).unwrap();
        assert_eq!(deleted, 1);
        assert!(find_by_id(&conn, expense_b.id, 2).is_ok());
    }

    #[test]
    fn test_delete_many_skips_missing_ids() {
        let conn = open_in_memory().unwrap();

        let expense = create(&conn, &new_expense(1, 500.0, "雑費", "2024-01-01")).unwrap();

        // 存在しないIDは読み飛ばされ、件数に含まれない
        let deleted = delete_many(&conn, 1, &[expense.id, 9999]).unwrap();
        assert_eq!(deleted, 1);

        // 空のID一覧は0件
        assert_eq!(delete_many(&conn, 1, &[]).unwrap(), 0);
    }

    #[test]
    fn test_bulk_create_isolates_storage_failures() {
        let conn = open_in_memory().unwrap();

        // 2行目はスキーマのCHECK制約（amount > 0）に違反する
        // （バリデーション層を通らない値を直接与えてストレージ失敗を再現）
        let batch = vec![
            CsvRow {
                row_number: 1,
                record: new_expense(1, 100.0, "食費", "2024-01-01"),
            },
            CsvRow {
                row_number: 2,
                record: new_expense(1, -100.0, "食費", "2024-01-02"),
            },
            CsvRow {
                row_number: 3,
                record: new_expense(1, 300.0, "食費", "2024-01-03"),
            },
        ];

        let (inserted, rejected) = bulk_create(&conn, &batch);

        assert_eq!(inserted.len(), 2);
        assert_eq!(
            rejected,
            vec![RejectedRow {
                row_number: 2,
                reason: "StorageError".to_string(),
            }]
        );
    }

    #[test]
    fn test_find_page_pagination_covers_all_records() {
        let conn = open_in_memory().unwrap();
        let user_id = 1;

        // 25件を作成（ページサイズ10で3ページ）
        for i in 0..25 {
            let date = format!("2024-01-{:02}", (i % 28) + 1);
            create(&conn, &new_expense(user_id, 100.0 + f64::from(i), "食費", &date)).unwrap();
        }

        let filter = ExpenseFilter::default();
        let first_page = find_page(&conn, user_id, &filter, 0, 10).unwrap();
        assert_eq!(first_page.total_pages, 3);

        // 全ページを列挙: 件数の合計は25、IDの重複なし
        let mut seen_ids = HashSet::new();
        let mut total_items = 0;
        for page in 0..first_page.total_pages {
            let result = find_page(&conn, user_id, &filter, page, 10).unwrap();
            assert_eq!(result.total_pages, 3);
            total_items += result.expenses.len();
            for expense in &result.expenses {
                assert!(seen_ids.insert(expense.id), "id {} が重複", expense.id);
            }
        }
        assert_eq!(total_items, 25);
    }

    #[test]
    fn test_find_page_beyond_last_page() {
        let conn = open_in_memory().unwrap();

        // 2ページ分のデータのみ作成
        for _ in 0..15 {
            create(&conn, &new_expense(1, 100.0, "食費", "2024-01-01")).unwrap();
        }

        // 範囲外のページは空の一覧と正しい総ページ数を返す
        let page = find_page(&conn, 1, &ExpenseFilter::default(), 5, 10).unwrap();
        assert!(page.expenses.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_find_page_empty_set_has_one_page() {
        let conn = open_in_memory().unwrap();

        let page = find_page(&conn, 1, &ExpenseFilter::default(), 0, 10).unwrap();
        assert!(page.expenses.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_find_page_ordering_is_newest_first() {
        let conn = open_in_memory().unwrap();

        create(&conn, &new_expense(1, 100.0, "食費", "2024-01-10")).unwrap();
        create(&conn, &new_expense(1, 200.0, "食費", "2024-03-05")).unwrap();
        create(&conn, &new_expense(1, 300.0, "食費", "2024-02-20")).unwrap();
        // 同日のレコードはIDの大きい順
        let same_day = create(&conn, &new_expense(1, 400.0, "食費", "2024-03-05")).unwrap();

        let page = find_page(&conn, 1, &ExpenseFilter::default(), 0, 10).unwrap();
        let dates: Vec<String> = page
            .expenses
            .iter()
            .map(|e| e.date.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(
            dates,
            vec!["2024-03-05", "2024-03-05", "2024-02-20", "2024-01-10"]
        );
        assert_eq!(page.expenses[0].id, same_day.id);
    }

    #[test]
    fn test_filter_category_substring_case_insensitive() {
        let conn = open_in_memory().unwrap();

        create(&conn, &new_expense(1, 100.0, "Food", "2024-01-01")).unwrap();
        create(&conn, &new_expense(1, 200.0, "Transport", "2024-01-02")).unwrap();

        let filter = ExpenseFilter {
            category: Some("foo".to_string()),
            ..ExpenseFilter::default()
        };
        let page = find_page(&conn, 1, &filter, 0, 10).unwrap();
        assert_eq!(page.expenses.len(), 1);
        assert_eq!(page.expenses[0].category, "Food");
    }

    #[test]
    fn test_filter_date_range_inclusive() {
        let conn = open_in_memory().unwrap();

        create(&conn, &new_expense(1, 100.0, "食費", "2024-01-01")).unwrap();
        create(&conn, &new_expense(1, 200.0, "食費", "2024-01-15")).unwrap();
        create(&conn, &new_expense(1, 300.0, "食費", "2024-01-31")).unwrap();
        create(&conn, &new_expense(1, 400.0, "食費", "2024-02-01")).unwrap();

        // 両端の日付を含む
        let filter = ExpenseFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..ExpenseFilter::default()
        };
        let page = find_page(&conn, 1, &filter, 0, 10).unwrap();
        assert_eq!(page.expenses.len(), 3);
    }

    #[test]
    fn test_filter_search_description() {
        let conn = open_in_memory().unwrap();

        create(
            &conn,
            &NewExpense {
                description: "Monthly Train Pass".to_string(),
                ..new_expense(1, 100.0, "交通費", "2024-01-01")
            },
        )
        .unwrap();
        create(&conn, &new_expense(1, 200.0, "食費", "2024-01-02")).unwrap();

        let filter = ExpenseFilter {
            search: Some("train".to_string()),
            ..ExpenseFilter::default()
        };
        let page = find_page(&conn, 1, &filter, 0, 10).unwrap();
        assert_eq!(page.expenses.len(), 1);
        assert_eq!(page.expenses[0].description, "Monthly Train Pass");
    }

    #[test]
    fn test_find_all_matches_find_page_filter_contract() {
        let conn = open_in_memory().unwrap();

        create(&conn, &new_expense(1, 100.0, "食費", "2024-01-01")).unwrap();
        create(&conn, &new_expense(1, 200.0, "交通費", "2024-01-02")).unwrap();
        create(&conn, &new_expense(2, 300.0, "食費", "2024-01-03")).unwrap();

        let filter = ExpenseFilter {
            category: Some("食費".to_string()),
            ..ExpenseFilter::default()
        };

        let all = find_all(&conn, 1, &filter).unwrap();
        let page = find_page(&conn, 1, &filter, 0, 10).unwrap();
        assert_eq!(all, page.expenses);
    }
}
