use crate::domain::model::{CaseTable, ExportPayload};
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Turns a projected table into a downloadable payload.
pub trait Exporter {
    fn extension(&self) -> &'static str;
    fn file_type(&self) -> &'static str;
    fn export(&self, table: &CaseTable, file_stem: &str) -> Result<ExportPayload>;
}
