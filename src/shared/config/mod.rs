/// 設定モジュール
///
/// 実行環境の判定、環境変数の読み込み、ログシステムの初期化を提供します。
pub mod environment;
