use crate::features::expenses::models::{
    DeleteSummary, Expense, ExpenseFilter, ExpensePage, ExpenseStatistics, ImportSummary,
    RawExpense,
};
use crate::features::expenses::{aggregation, csv_import, query, repository, validator};
use crate::shared::errors::AppResult;
use log::info;
use rusqlite::Connection;

/// 経費を1件登録する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 認証済みの所有者ID
/// * `raw` - 未検証の経費レコード（JSONボディ・フォーム）
///
/// # 戻り値
/// 作成された経費、または失敗時はエラー
pub fn add_one(conn: &Connection, user_id: i64, raw: &RawExpense) -> AppResult<Expense> {
    let record = validator::validate(raw, user_id)?;
    let expense = repository::create(conn, &record)?;

    info!("経費を作成しました: id={}, user_id={user_id}", expense.id);

    Ok(expense)
}

/// CSVファイルから経費を一括登録する
///
/// 取込はファイル全体の解析・検証を終えてから保存を開始します。行単位の
/// 失敗（検証・保存とも）は却下リストに集約され、バッチ全体を中断しません。
/// 有効な行を含むバッチが「取込失敗」として一括で報告されることはありません。
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 認証済みの所有者ID
/// * `bytes` - アップロードされたCSVファイルの生バイト列
///
/// # 戻り値
/// 登録件数と却下された行の一覧、またはファイル自体が読み取れない場合はエラー
pub fn add_bulk(conn: &Connection, user_id: i64, bytes: &[u8]) -> AppResult<ImportSummary> {
    let ingest = csv_import::ingest(bytes, user_id)?;
    let (inserted, storage_rejected) = repository::bulk_create(conn, &ingest.accepted);

    // 検証段階と保存段階の却下を行番号順に統合する
    let mut rejected = ingest.rejected;
    rejected.extend(storage_rejected);
    rejected.sort_by_key(|r| r.row_number);

    info!(
        "CSV一括取込: user_id={user_id}, 登録={}件, 却下={}件",
        inserted.len(),
        rejected.len()
    );

    Ok(ImportSummary {
        inserted_count: inserted.len(),
        rejected,
    })
}

/// 経費一覧をページ単位で取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 認証済みの所有者ID
/// * `filter` - 絞り込み条件
/// * `page` - 0始まりのページ番号
/// * `page_size` - ページサイズ（未指定・0の場合はデフォルトの10）
///
/// # 戻り値
/// 経費の一覧と総ページ数、または失敗時はエラー
pub fn list(
    conn: &Connection,
    user_id: i64,
    filter: &ExpenseFilter,
    page: u32,
    page_size: Option<u32>,
) -> AppResult<ExpensePage> {
    let page_size = query::normalize_page_size(page_size);
    repository::find_page(conn, user_id, filter, page, page_size)
}

/// 経費を更新する
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 認証済みの所有者ID
/// * `id` - 経費ID
/// * `raw` - 未検証の更新フィールド（指定フィールドのみ）
///
/// # 戻り値
/// 更新された経費、または該当ユーザーの経費として存在しない場合はNotFound
pub fn update(conn: &Connection, user_id: i64, id: i64, raw: &RawExpense) -> AppResult<Expense> {
    let patch = validator::validate_patch(raw)?;
    let expense = repository::update(conn, id, &patch, user_id)?;

    info!("経費を更新しました: id={id}, user_id={user_id}");

    Ok(expense)
}

/// 複数の経費を削除する
///
/// 所有していない・存在しないIDが含まれていてもエラーにならず、
/// 実際に削除された件数のみ報告します。
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 認証済みの所有者ID
/// * `ids` - 削除対象のID一覧
///
/// # 戻り値
/// 削除件数のサマリー、または失敗時はエラー
pub fn delete_many(conn: &Connection, user_id: i64, ids: &[i64]) -> AppResult<DeleteSummary> {
    let deleted_count = repository::delete_many(conn, user_id, ids)?;

    info!("経費を削除しました: user_id={user_id}, 削除={deleted_count}件");

    Ok(DeleteSummary { deleted_count })
}

/// 経費の統計（カテゴリ別・月別の合計）を取得する
///
/// 一覧取得と同じ絞り込み契約を共有するため、統計画面と一覧画面で
/// 同じ条件を指定すれば同じ母集団が集計されます。
///
/// # 引数
/// * `conn` - データベース接続
/// * `user_id` - 認証済みの所有者ID
/// * `filter` - 絞り込み条件
///
/// # 戻り値
/// カテゴリ別・月別の合計金額、または失敗時はエラー
pub fn statistics(
    conn: &Connection,
    user_id: i64,
    filter: &ExpenseFilter,
) -> AppResult<ExpenseStatistics> {
    let expenses = repository::find_all(conn, user_id, filter)?;
    Ok(aggregation::aggregate(&expenses))
}
