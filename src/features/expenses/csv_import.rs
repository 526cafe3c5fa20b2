use crate::features::expenses::models::{NewExpense, RawExpense, RejectedRow};
use crate::features::expenses::validator;
use crate::shared::errors::{AppError, AppResult, ValidationError};
use log::warn;

/// 取込に成功したCSV行（元の行番号つき）
#[derive(Debug, Clone)]
pub struct CsvRow {
    /// データ行の1始まり行番号（ヘッダー行を除く）
    pub row_number: usize,
    /// 検証済みの経費レコード
    pub record: NewExpense,
}

/// CSV取込の結果（受理された行と却下された行）
#[derive(Debug, Default)]
pub struct CsvIngest {
    pub accepted: Vec<CsvRow>,
    pub rejected: Vec<RejectedRow>,
}

/// CSVペイロードを解析し、行ごとに検証する
///
/// # 引数
/// * `bytes` - アップロードされたファイルの生バイト列
/// * `user_id` - 認証済みの所有者ID
///
/// # 戻り値
/// 受理された行と却下された行、またはファイル自体が読み取れない場合はエラー
///
/// # 処理規則
/// - 1行目をヘッダーとして扱い、列名は大文字小文字を区別せずフィールドに対応付ける
///   （列の順序は自由）
/// - 行は独立に処理される: ある行の解析・検証失敗は却下リストに記録され、
///   後続行の処理は継続する
/// - 空のファイル（ヘッダーのみ・0バイト）は空の結果を返す（エラーではない）
/// - ここでは永続化を行わない（保存は呼び出し側のサービス層が行う）
pub fn ingest(bytes: &[u8], user_id: i64) -> AppResult<CsvIngest> {
    // ファイル全体がテキストとして解釈できない場合のみ致命的エラー
    let text = std::str::from_utf8(bytes)
        .map_err(|e| AppError::unreadable_file(format!("UTF-8として解釈できません: {e}")))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    // ヘッダー行を小文字に正規化して読み込む
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::unreadable_file(format!("ヘッダー行を解析できません: {e}")))?
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();

    let mut result = CsvIngest::default();

    for (index, record) in reader.records().enumerate() {
        let row_number = index + 1;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                // 壊れた行は却下として記録し、後続行の処理を継続する
                warn!("CSV取込: {row_number}行目を解析できません: {e}");
                result.rejected.push(RejectedRow {
                    row_number,
                    reason: ValidationError::MalformedRow.code().to_string(),
                });
                continue;
            }
        };

        // 全フィールドが空の行は読み飛ばす
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let raw = raw_from_record(&headers, &record);
        match validator::validate(&raw, user_id) {
            Ok(expense) => result.accepted.push(CsvRow {
                row_number,
                record: expense,
            }),
            Err(e) => {
                warn!("CSV取込: {row_number}行目を却下しました: {e}");
                result.rejected.push(RejectedRow {
                    row_number,
                    reason: e.code().to_string(),
                });
            }
        }
    }

    Ok(result)
}

/// ヘッダーとCSVレコードから未検証の経費レコードを組み立てる
fn raw_from_record(headers: &[String], record: &csv::StringRecord) -> RawExpense {
    let mut raw = RawExpense::default();

    for (header, value) in headers.iter().zip(record.iter()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match header.as_str() {
            "amount" => raw.amount = Some(value.to_string()),
            "description" => raw.description = Some(value.to_string()),
            "category" => raw.category = Some(value.to_string()),
            "paymentmethod" | "payment_method" | "payment method" => {
                raw.payment_method = Some(value.to_string());
            }
            "date" => raw.date = Some(value.to_string()),
            // 未知の列は無視する
            _ => {}
        }
    }

    raw
}
