use crate::shared::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;

/// データベース接続を初期化し、テーブルを作成する
///
/// # 引数
/// * `path` - データベースファイルのパス
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
///
/// # 処理内容
/// 1. 親ディレクトリの確保（存在しない場合は作成）
/// 2. データベース接続の開設
/// 3. テーブルとインデックスの作成
pub fn initialize_database(path: &Path) -> AppResult<Connection> {
    // ディレクトリが存在しない場合は作成
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            log::info!("データディレクトリを作成しました: {}", parent.display());
        }
    }

    let conn = Connection::open(path)?;
    create_tables(&conn)?;

    log::info!("データベースを初期化しました: {}", path.display());

    Ok(conn)
}

/// インメモリデータベースを開く（テスト・一時利用向け）
///
/// # 戻り値
/// テーブル作成済みのデータベース接続、または失敗時はエラー
pub fn open_in_memory() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

/// データベーステーブルを作成する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
///
/// # スキーマの制約
/// - AUTOINCREMENTによりidは削除後も再利用されない
/// - amountは正の数値のみ（バリデーション層と二重の防御）
/// - payment_methodはcash/creditのみ
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            amount REAL NOT NULL CHECK(amount > 0),
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            payment_method TEXT NOT NULL DEFAULT 'cash'
                CHECK(payment_method IN ('cash', 'credit')),
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    create_indexes(conn)?;

    Ok(())
}

/// インデックスを作成する
fn create_indexes(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_user ON expenses(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category)",
        [],
    )?;

    Ok(())
}
