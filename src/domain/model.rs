use crate::utils::error::{ConvertError, Result};
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_MIME: &str = "text/csv";

pub const COLUMN_COUNT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Locale {
    #[default]
    En,
    Zh,
}

/// 預覽文字使用的標籤
#[derive(Debug, Clone, Copy)]
pub struct PreviewLabels {
    pub overview: &'static str,
    pub rows: &'static str,
    pub columns: &'static str,
    pub column_list: &'static str,
    pub first_rows: &'static str,
    pub row: &'static str,
    pub empty: &'static str,
}

impl Locale {
    pub fn not_executed(self) -> &'static str {
        match self {
            Locale::En => "not executed",
            Locale::Zh => "未执行",
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            Locale::En => "Test Cases",
            Locale::Zh => "测试用例",
        }
    }

    pub fn success_message(self, count: usize) -> String {
        match self {
            Locale::En => format!("Converted {} test cases", count),
            Locale::Zh => format!("成功转换 {} 个测试用例", count),
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Locale::En => "Conversion failed",
            Locale::Zh => "转换失败",
        }
    }

    pub fn preview_labels(self) -> PreviewLabels {
        match self {
            Locale::En => PreviewLabels {
                overview: "Overview:",
                rows: "Rows",
                columns: "Columns",
                column_list: "Fields:",
                first_rows: "First 3 rows:",
                row: "Row",
                empty: "Empty table",
            },
            Locale::Zh => PreviewLabels {
                overview: "数据概览:",
                rows: "总行数",
                columns: "总列数",
                column_list: "字段列表:",
                first_rows: "前3行数据:",
                row: "行",
                empty: "空表",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Name,
    Module,
    Priority,
    Preconditions,
    Steps,
    Expected,
    TestData,
    Status,
    Author,
    Created,
    Remarks,
}

impl Column {
    /// 匯出欄位的固定順序
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Id,
        Column::Name,
        Column::Module,
        Column::Priority,
        Column::Preconditions,
        Column::Steps,
        Column::Expected,
        Column::TestData,
        Column::Status,
        Column::Author,
        Column::Created,
        Column::Remarks,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => match self {
                Column::Id => "ID",
                Column::Name => "Name",
                Column::Module => "Module",
                Column::Priority => "Priority",
                Column::Preconditions => "Preconditions",
                Column::Steps => "Steps",
                Column::Expected => "Expected",
                Column::TestData => "Test Data",
                Column::Status => "Status",
                Column::Author => "Author",
                Column::Created => "Created",
                Column::Remarks => "Remarks",
            },
            Locale::Zh => match self {
                Column::Id => "用例ID",
                Column::Name => "用例名称",
                Column::Module => "模块",
                Column::Priority => "优先级",
                Column::Preconditions => "前置条件",
                Column::Steps => "测试步骤",
                Column::Expected => "预期结果",
                Column::TestData => "测试数据",
                Column::Status => "状态",
                Column::Author => "创建人",
                Column::Created => "创建时间",
                Column::Remarks => "备注",
            },
        }
    }
}

/// Renders a loosely-typed JSON value as cell text. `null` is treated as absent.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_text(&value))
}

/// One entry of a `steps` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepItem {
    Text(String),
    Action(String),
    /// Any other element shape. It produces no line but still takes its number.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Steps {
    List(Vec<StepItem>),
    Text(String),
    Other,
}

impl From<Value> for Steps {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Steps::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(text) => StepItem::Text(text),
                        Value::Object(detail) => {
                            let action = ["action", "step"]
                                .iter()
                                .filter_map(|key| detail.get(*key).and_then(value_text))
                                .find(|text| !text.is_empty())
                                .unwrap_or_default();
                            StepItem::Action(action)
                        }
                        _ => StepItem::Skipped,
                    })
                    .collect(),
            ),
            Value::String(text) => Steps::Text(text),
            _ => Steps::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    List(Vec<String>),
    Text(String),
    Other,
}

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Expected::List(
                items
                    .iter()
                    .map(|item| value_text(item).unwrap_or_default())
                    .collect(),
            ),
            Value::String(text) => Expected::Text(text),
            _ => Expected::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestData {
    Fields(Vec<(String, String)>),
    Text(String),
    Other,
}

impl From<Value> for TestData {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => TestData::Fields(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value_text(&value).unwrap_or_default()))
                    .collect(),
            ),
            Value::String(text) => TestData::Text(text),
            _ => TestData::Other,
        }
    }
}

macro_rules! deserialize_from_value {
    ($($ty:ty),*) => {
        $(
            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    Value::deserialize(deserializer).map(<$ty>::from)
                }
            }
        )*
    };
}

deserialize_from_value!(Steps, Expected, TestData);

/// A test case as found in the input document. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TestCase {
    #[serde(deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub case_id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub module: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub preconditions: Option<String>,
    pub steps: Option<Steps>,
    pub expected: Option<Expected>,
    pub test_data: Option<TestData>,
    #[serde(deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub created_date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub remarks: Option<String>,
}

impl TestCase {
    /// `position` is the zero-based index of the candidate, used in error messages.
    pub fn from_json(value: &Value, position: usize) -> Result<Self> {
        if !value.is_object() {
            return Err(ConvertError::invalid_input(format!(
                "test case #{} is not a JSON object",
                position + 1
            )));
        }
        Ok(serde_json::from_value(value.clone())?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedRow {
    cells: [String; COLUMN_COUNT],
}

impl ExportedRow {
    pub fn new(cells: [String; COLUMN_COUNT]) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// The projected table handed to an exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseTable {
    pub locale: Locale,
    pub rows: Vec<ExportedRow>,
}

impl CaseTable {
    pub fn new(locale: Locale, rows: Vec<ExportedRow>) -> Self {
        Self { locale, rows }
    }

    pub fn headers(&self) -> [&'static str; COLUMN_COUNT] {
        Column::ALL.map(|column| column.label(self.locale))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub file_content: String,
    pub filename: String,
    pub file_type: String,
    pub preview: String,
}

impl ExportPayload {
    /// 取回實際檔案位元組：Excel 內容為 base64，CSV 為原文
    pub fn decoded_bytes(&self) -> Result<Vec<u8>> {
        if self.file_type == XLSX_MIME {
            Ok(base64::engine::general_purpose::STANDARD.decode(&self.file_content)?)
        } else {
            Ok(self.file_content.as_bytes().to_vec())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionMetadata {
    pub test_case_count: usize,
    pub output_format: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSuccess {
    pub success: bool,
    pub data: ExportPayload,
    pub message: String,
    pub metadata: ConversionMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailure {
    pub success: bool,
    pub error: String,
    pub message: String,
}

/// The structured result returned to the calling orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConversionResult {
    Success(ConversionSuccess),
    Failure(ConversionFailure),
}

impl ConversionResult {
    pub fn failure(error: &ConvertError, locale: Locale) -> Self {
        ConversionResult::Failure(ConversionFailure {
            success: false,
            error: error.to_string(),
            message: locale.failure_message().to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }

    pub fn payload(&self) -> Option<&ExportPayload> {
        match self {
            ConversionResult::Success(success) => Some(&success.data),
            ConversionResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ConversionResult::Success(_) => None,
            ConversionResult::Failure(failure) => Some(&failure.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_scalar_fields() {
        let case = TestCase::from_json(
            &json!({"id": 42, "title": null, "priority": true, "module": ["a", "b"]}),
            0,
        )
        .unwrap();

        assert_eq!(case.id.as_deref(), Some("42"));
        assert_eq!(case.title, None);
        assert_eq!(case.priority.as_deref(), Some("true"));
        assert_eq!(case.module.as_deref(), Some(r#"["a","b"]"#));
    }

    #[test]
    fn test_step_shapes() {
        let case = TestCase::from_json(
            &json!({"steps": [
                "open page",
                {"step": 2, "action": "click login"},
                {"step": 3},
                7
            ]}),
            0,
        )
        .unwrap();

        assert_eq!(
            case.steps,
            Some(Steps::List(vec![
                StepItem::Text("open page".to_string()),
                StepItem::Action("click login".to_string()),
                StepItem::Action("3".to_string()),
                StepItem::Skipped,
            ]))
        );
    }

    #[test]
    fn test_unusual_shapes_become_other() {
        let case = TestCase::from_json(
            &json!({"steps": 5, "expected": {"a": 1}, "test_data": [1, 2]}),
            0,
        )
        .unwrap();

        assert_eq!(case.steps, Some(Steps::Other));
        assert_eq!(case.expected, Some(Expected::Other));
        assert_eq!(case.test_data, Some(TestData::Other));
    }

    #[test]
    fn test_non_object_candidate_is_rejected() {
        let err = TestCase::from_json(&json!("just text"), 2).unwrap_err();
        assert!(err.to_string().contains("test case #3"));
    }

    #[test]
    fn test_column_labels_follow_locale() {
        assert_eq!(Column::TestData.label(Locale::En), "Test Data");
        assert_eq!(Column::TestData.label(Locale::Zh), "测试数据");
        assert_eq!(Column::ALL[Column::Status.index()], Column::Status);
    }

    #[test]
    fn test_failure_result_shape() {
        let err = ConvertError::invalid_input("boom");
        let value = serde_json::to_value(ConversionResult::failure(&err, Locale::En)).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": "Invalid input: boom", "message": "Conversion failed"})
        );
    }
}
