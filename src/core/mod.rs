pub mod converter;
pub mod extract;
pub mod projection;
pub mod usage;

pub use crate::domain::model::{CaseTable, ExportedRow, TestCase};
pub use crate::domain::ports::{Exporter, Storage};
pub use crate::utils::error::Result;
