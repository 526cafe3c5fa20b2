// 機能モジュール構造
pub mod features;
pub mod shared;

// 公開インターフェース：外部（HTTPコントローラー等）から使用する型と操作
pub use features::expenses::models::{
    DeleteSummary, Expense, ExpenseFilter, ExpensePage, ExpenseStatistics, ImportSummary,
    PaymentMethod, RawExpense, RejectedRow,
};
pub use features::expenses::service;
pub use shared::errors::{AppError, AppResult, ValidationError};
