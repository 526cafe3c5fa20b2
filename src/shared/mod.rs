/// 共有モジュール
///
/// このモジュールは、アプリケーション全体で使用される共有コンポーネントを提供します。
// エラーハンドリング
pub mod errors;

// データベース関連
pub mod database;

// 設定関連
pub mod config;
