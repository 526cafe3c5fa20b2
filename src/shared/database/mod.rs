/// データベースモジュール
///
/// SQLiteデータベースの接続とスキーマ管理を提供します。
pub mod connection;
