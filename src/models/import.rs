use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportFailure {
    /// 表格中的行号（表头为第 1 行）
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ImportResult {
    pub total_rows: usize,
    pub success_count: usize,
    pub created_count: usize,
    pub updated_count: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportResult {
    pub fn record_failure(&mut self, row: usize, message: impl Into<String>) {
        self.failures.push(ImportFailure {
            row,
            message: message.into(),
        });
    }

    pub fn message(&self) -> String {
        format!(
            "{} of {} row(s) imported, {} failed",
            self.success_count,
            self.total_rows,
            self.failures.len()
        )
    }
}
