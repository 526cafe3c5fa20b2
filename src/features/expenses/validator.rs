use crate::features::expenses::models::{ExpensePatch, NewExpense, PaymentMethod, RawExpense};
use crate::shared::errors::ValidationError;
use chrono::NaiveDate;

/// 金額の上限（10桁以内）
pub const MAX_AMOUNT: f64 = 10_000_000_000.0;

/// 未検証レコードを検証し、新規経費レコードに正規化する
///
/// # 引数
/// * `raw` - 未検証の経費レコード（フォーム・JSONボディ・CSV行）
/// * `user_id` - 認証済みの所有者ID
///
/// # 戻り値
/// 検証済みの新規経費レコード、または失敗時はバリデーションエラー
///
/// # バリデーション規則
/// - 金額: 数値として解析でき、0より大きく10桁以内であること
/// - 説明・カテゴリ: 空白を除いて空でないこと
/// - 日付: YYYY-MM-DD形式の実在する日付であること
/// - 支払い方法: 未指定の場合はcash、指定された場合はcash/creditのいずれか
pub fn validate(raw: &RawExpense, user_id: i64) -> Result<NewExpense, ValidationError> {
    let amount = parse_amount(raw.amount.as_deref())?;
    let description = required_text(raw.description.as_deref(), "description")?;
    let category = required_text(raw.category.as_deref(), "category")?;
    let date = parse_date(raw.date.as_deref())?;
    let payment_method = parse_payment_method(raw.payment_method.as_deref())?;

    Ok(NewExpense {
        user_id,
        amount,
        description,
        category,
        payment_method,
        date,
    })
}

/// 未検証レコードを部分的に検証し、更新パッチに正規化する
///
/// 指定されたフィールドのみ検証・置換の対象となります。必須フィールドを
/// 空文字で上書きすることはできません。
///
/// # 引数
/// * `raw` - 未検証の経費レコード（指定フィールドのみ）
///
/// # 戻り値
/// 検証済みの更新パッチ、または失敗時はバリデーションエラー
pub fn validate_patch(raw: &RawExpense) -> Result<ExpensePatch, ValidationError> {
    let mut patch = ExpensePatch::default();

    if raw.amount.is_some() {
        patch.amount = Some(parse_amount(raw.amount.as_deref())?);
    }
    if raw.description.is_some() {
        patch.description = Some(required_text(raw.description.as_deref(), "description")?);
    }
    if raw.category.is_some() {
        patch.category = Some(required_text(raw.category.as_deref(), "category")?);
    }
    if raw.date.is_some() {
        patch.date = Some(parse_date(raw.date.as_deref())?);
    }
    if raw.payment_method.is_some() {
        patch.payment_method = Some(parse_payment_method(raw.payment_method.as_deref())?);
    }

    Ok(patch)
}

/// 金額を解析する
fn parse_amount(raw: Option<&str>) -> Result<f64, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or("");
    let amount: f64 = raw.parse().map_err(|_| ValidationError::InvalidAmount)?;

    // ゼロ・負数・非数・桁あふれは受け付けない（切り詰めも行わない）
    if !amount.is_finite() || amount <= 0.0 || amount >= MAX_AMOUNT {
        return Err(ValidationError::InvalidAmount);
    }

    Ok(amount)
}

/// 必須テキストフィールドを検証する
fn required_text(raw: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// 日付を解析する
fn parse_date(raw: Option<&str>) -> Result<NaiveDate, ValidationError> {
    let raw = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(ValidationError::MissingField("date")),
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate)
}

/// 支払い方法を解析する（未指定の場合はcash）
fn parse_payment_method(raw: Option<&str>) -> Result<PaymentMethod, ValidationError> {
    match raw.map(str::trim) {
        None => Ok(PaymentMethod::Cash),
        Some(value) if value.is_empty() => Ok(PaymentMethod::Cash),
        Some(value) => PaymentMethod::parse(value).ok_or(ValidationError::InvalidPaymentMethod),
    }
}
