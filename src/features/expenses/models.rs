use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// 支払い方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Credit,
}

impl PaymentMethod {
    /// データベース格納用の文字列表現を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Credit => "credit",
        }
    }

    /// 文字列から支払い方法を解析する（大文字小文字を区別しない）
    ///
    /// # 引数
    /// * `value` - 入力文字列
    ///
    /// # 戻り値
    /// 解析できた場合は支払い方法、不正な値の場合はNone
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "credit" => Some(PaymentMethod::Credit),
            _ => None,
        }
    }
}

/// 経費データモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    /// 所有者のユーザーID（認証済みの呼び出し元から設定される）
    pub user_id: i64,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
    pub created_at: String,
    pub updated_at: String,
}

/// 未検証の経費レコード（フォーム・JSONボディ・CSV行から受け取る）
///
/// フィールドの型や有無は保証されません。バリデーターを通して
/// `NewExpense`/`ExpensePatch`に正規化してから使用してください。
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawExpense {
    /// 金額（JSONでは数値・文字列のどちらでも受け付ける）
    #[serde(deserialize_with = "deserialize_loose_amount")]
    pub amount: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub date: Option<String>,
}

/// 金額フィールドをJSON数値・文字列のどちらからでも読み込む
fn deserialize_loose_amount<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// バリデーション済みの新規経費レコード
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub user_id: i64,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
}

/// バリデーション済みの更新パッチ（指定されたフィールドのみ置き換える）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub date: Option<NaiveDate>,
}

/// 経費一覧の絞り込み条件（すべて任意、AND結合）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseFilter {
    /// カテゴリの部分一致（大文字小文字を区別しない）
    pub category: Option<String>,
    /// 支払い方法の部分一致（大文字小文字を区別しない）
    pub payment_method: Option<String>,
    /// 日付範囲の開始日（この日を含む）
    pub start_date: Option<NaiveDate>,
    /// 日付範囲の終了日（この日を含む）
    pub end_date: Option<NaiveDate>,
    /// 説明文の全文検索（大文字小文字を区別しない部分一致）
    pub search: Option<String>,
}

/// ページ化された経費一覧
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub total_pages: u32,
}

/// 一括取込で却下された行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRow {
    /// データ行の1始まり行番号（ヘッダー行を除く）
    pub row_number: usize,
    /// 却下理由のエラーコード
    pub reason: String,
}

/// 一括取込の結果サマリー
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub inserted_count: usize,
    pub rejected: Vec<RejectedRow>,
}

/// 削除操作の結果サマリー
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: usize,
}

/// 経費の集計結果（統計画面向け）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStatistics {
    /// カテゴリ別の合計金額
    pub by_category: HashMap<String, f64>,
    /// 月別の合計金額（キーは英語の月名、経費のない月は含まれない）
    pub by_month: HashMap<String, f64>,
}
