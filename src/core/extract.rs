use crate::domain::model::TestCase;
use crate::utils::error::Result;
use serde_json::{Map, Value};

/// Container keys checked, in order, on an object document.
pub const CONTAINER_KEYS: [&str; 5] = ["test_cases", "cases", "testCases", "testcases", "items"];

/// An object holding any of these keys is treated as a test case by the deep search.
pub const RECORD_INDICATORS: [&str; 5] = ["id", "case_id", "title", "name", "steps"];

/// Where the test cases of a document were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    /// The document itself is an array of test cases.
    List,
    /// The document holds an array under one of the container keys.
    Keyed(&'static str),
    /// JSON pointers of objects found by the deep search, in document order.
    DeepMatch(Vec<String>),
    Empty,
}

impl RecordSource {
    pub fn detect(document: &Value) -> Self {
        match document {
            Value::Array(_) => RecordSource::List,
            Value::Object(map) => {
                // 只看第一個指向陣列的容器鍵；陣列為空時改用深度搜尋
                let keyed = CONTAINER_KEYS.iter().find_map(|key| {
                    map.get(*key)
                        .and_then(Value::as_array)
                        .map(|cases| (*key, cases))
                });
                if let Some((key, cases)) = keyed {
                    if !cases.is_empty() {
                        return RecordSource::Keyed(key);
                    }
                }

                let mut paths = Vec::new();
                collect_matches(document, String::new(), &mut paths);
                if paths.is_empty() {
                    RecordSource::Empty
                } else {
                    RecordSource::DeepMatch(paths)
                }
            }
            _ => RecordSource::Empty,
        }
    }

    /// Candidate records of `document`, which must be the document this source was detected on.
    pub fn candidates<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        match self {
            RecordSource::List => document
                .as_array()
                .map(|items| items.iter().collect())
                .unwrap_or_default(),
            RecordSource::Keyed(key) => document
                .get(*key)
                .and_then(Value::as_array)
                .map(|items| items.iter().collect())
                .unwrap_or_default(),
            RecordSource::DeepMatch(paths) => paths
                .iter()
                .filter_map(|path| document.pointer(path))
                .collect(),
            RecordSource::Empty => Vec::new(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            RecordSource::List => "top-level array".to_string(),
            RecordSource::Keyed(key) => format!("'{}' array", key),
            RecordSource::DeepMatch(paths) => format!("deep search ({} matches)", paths.len()),
            RecordSource::Empty => "no test cases".to_string(),
        }
    }
}

pub fn is_test_case(object: &Map<String, Value>) -> bool {
    RECORD_INDICATORS.iter().any(|key| object.contains_key(*key))
}

// Matched objects are not descended into.
fn collect_matches(value: &Value, path: String, out: &mut Vec<String>) {
    match value {
        Value::Object(object) if is_test_case(object) => out.push(path),
        Value::Object(object) => {
            for (key, child) in object {
                collect_matches(child, format!("{}/{}", path, escape_pointer(key)), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_matches(child, format!("{}/{}", path, index), out);
            }
        }
        _ => {}
    }
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub source: RecordSource,
    pub test_cases: Vec<TestCase>,
}

pub fn extract_test_cases(document: &Value) -> Result<Extraction> {
    let source = RecordSource::detect(document);
    tracing::debug!("Test case source: {}", source.describe());

    let test_cases = source
        .candidates(document)
        .into_iter()
        .enumerate()
        .map(|(position, candidate)| TestCase::from_json(candidate, position))
        .collect::<Result<Vec<_>>>()?;

    Ok(Extraction { source, test_cases })
}
