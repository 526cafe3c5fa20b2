/// 経費機能モジュール
///
/// このモジュールは経費管理に関連するすべての機能を提供します：
/// - 経費の作成、読み取り、更新、削除（CRUD操作）
/// - 経費データのバリデーション
/// - CSVファイルからの一括取込
/// - 絞り込み・ページネーション付きの一覧取得
/// - カテゴリ別・月別の集計（統計）
// サブモジュールの宣言
pub mod aggregation;
pub mod csv_import;
pub mod models;
pub mod query;
pub mod repository;
pub mod service;
pub mod validator;

// 公開インターフェース：外部から使用可能な型と関数をエクスポート

// モデル
pub use models::{
    DeleteSummary, Expense, ExpenseFilter, ExpensePage, ExpensePatch, ExpenseStatistics,
    ImportSummary, NewExpense, PaymentMethod, RawExpense, RejectedRow,
};

// サービス操作（HTTPコントローラー等の協調レイヤーから呼び出す）
pub use service::{add_bulk, add_one, delete_many, list, statistics, update};
