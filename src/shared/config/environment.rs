use std::path::PathBuf;

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: Environment,
    /// デバッグモードの有効/無効
    pub debug_mode: bool,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # 戻り値
    /// 環境設定
    pub fn from_env() -> Self {
        let environment = get_environment();
        let debug_mode = environment == Environment::Development;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if debug_mode {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment,
            debug_mode,
            log_level,
        }
    }
}

/// データベース設定を管理する構造体
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// データベースファイルのパス
    pub path: PathBuf,
}

impl DatabaseConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # 戻り値
    /// データベース設定
    ///
    /// # パスの決定規則
    /// 1. KAKEIBO_DATA_DIR が設定されていればそのディレクトリを使用
    /// 2. 未設定の場合はカレントディレクトリを使用
    /// 3. ファイル名は環境に応じて決定（開発: dev_expenses.db、本番: expenses.db）
    pub fn from_env() -> Self {
        let data_dir = std::env::var("KAKEIBO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        Self {
            path: data_dir.join(database_filename()),
        }
    }
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # 戻り値
/// データベースファイル名
///
/// # ファイル名の規則
/// - 開発環境: "dev_expenses.db"
/// - プロダクション環境: "expenses.db"
fn database_filename() -> &'static str {
    match get_environment() {
        Environment::Production => "expenses.db",
        Environment::Development => "dev_expenses.db",
    }
}

/// 現在の実行環境を判定する
///
/// # 戻り値
/// 現在の実行環境（Development または Production）
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    // 実行時環境変数を確認
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    // フォールバック: ビルド設定に基づく判定
    if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    }
}

/// 環境変数の読み込みを確認する
///
/// # 処理内容
/// 1. 開発環境（デバッグビルド）の場合のみ.envファイルを読み込み
/// 2. 本番ビルドでは環境変数は実行時に設定されることを前提とする
///
/// # 注意
/// 本番環境では.envファイルは読み込まれません（秘匿情報がバイナリに
/// 埋め込まれるのを防ぐため）。本番実行時は環境変数を設定してから
/// アプリケーションを起動してください。
pub fn load_environment_variables() {
    // 開発環境かどうかを判定（デバッグビルド）
    if cfg!(debug_assertions) {
        // 開発環境の場合のみ.envファイルを読み込む
        match dotenv::dotenv() {
            Ok(path) => {
                log::debug!("環境ファイルを読み込みました: {}", path.display());
            }
            Err(e) => {
                log::debug!("環境ファイルの読み込みに失敗: {e}");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. 環境設定を取得
/// 2. ログレベルを設定
/// 3. env_loggerを初期化
///
/// # 注意
/// プロセス内で一度だけ呼び出してください（組み込み側アプリケーションの起動時）。
pub fn initialize_logging_system() {
    // 環境設定を取得
    let env_config = EnvironmentConfig::from_env();

    // ログレベルを設定
    let log_level = match env_config.log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    // env_loggerを初期化
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();

    log::info!(
        "ログシステムを初期化しました: level={}, environment={:?}",
        env_config.log_level,
        env_config.environment
    );
}
