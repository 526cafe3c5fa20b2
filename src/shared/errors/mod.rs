use thiserror::Error;

/// 経費入力のバリデーションエラー（フィールド単位、ユーザーが修正可能）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 金額が解析できない、または正の数値でない
    #[error("金額は正の数値で入力してください")]
    InvalidAmount,

    /// 必須フィールドが未入力
    #[error("{0}は必須項目です")]
    MissingField(&'static str),

    /// 日付が解析できない
    #[error("日付の形式が正しくありません（YYYY-MM-DD形式で入力してください）")]
    InvalidDate,

    /// 支払い方法が不正
    #[error("支払い方法はcashまたはcreditを指定してください")]
    InvalidPaymentMethod,

    /// CSV行そのものが解析できない
    #[error("行の形式が正しくありません")]
    MalformedRow,
}

impl ValidationError {
    /// 一括取込の却下理由などで使用する安定したエラーコードを取得
    ///
    /// # 戻り値
    /// バリアント名に対応するコード文字列
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidAmount => "InvalidAmount",
            ValidationError::MissingField(_) => "MissingField",
            ValidationError::InvalidDate => "InvalidDate",
            ValidationError::InvalidPaymentMethod => "InvalidPaymentMethod",
            ValidationError::MalformedRow => "MalformedRow",
        }
    }
}

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// データベース関連のエラー（呼び出し側で再試行可能として扱う）
    #[error("データベースエラー: {0}")]
    Database(String),

    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(#[from] ValidationError),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// アップロードされたファイルがテキストとして解釈できない場合のエラー
    #[error("ファイルを読み取れません: {0}")]
    UnreadableFile(String),

    /// I/O関連のエラー（データディレクトリの作成失敗など）
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（ファイル操作エラーなど）
    Medium,
    /// 高重要度（データベースエラーなど）
    High,
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "データベース操作でエラーが発生しました".to_string(),
            AppError::Validation(e) => e.to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::UnreadableFile(_) => {
                "ファイルを読み取れませんでした。UTF-8形式のCSVファイルを指定してください"
                    .to_string()
            }
            AppError::Io(_) => "ファイル操作でエラーが発生しました".to_string(),
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Database(_) => ErrorSeverity::High,
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::UnreadableFile(_) => ErrorSeverity::Low,
            AppError::Io(_) => ErrorSeverity::Medium,
        }
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    ///
    /// # 戻り値
    /// リソース未発見エラー
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// ファイル読み取りエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - エラーメッセージ
    ///
    /// # 戻り値
    /// ファイル読み取りエラー
    pub fn unreadable_file<S: Into<String>>(message: S) -> Self {
        AppError::UnreadableFile(message.into())
    }
}

/// AppErrorからStringへの変換（コントローラー層での使用のため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message()
    }
}

/// rusqlite::ErrorからAppErrorへの変換
impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        AppError::Database(error.to_string())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
