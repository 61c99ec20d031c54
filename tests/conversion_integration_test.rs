use anyhow::Result;
use serde_json::json;
use std::io::Read;
use tempfile::TempDir;
use testcase_export::app::tool;
use testcase_export::domain::model::XLSX_MIME;
use testcase_export::{convert, ConversionResult, ConvertOptions, Locale, OutputFormat};

fn csv_options() -> ConvertOptions {
    ConvertOptions {
        output_format: OutputFormat::Csv,
        ..ConvertOptions::default()
    }
}

fn csv_records(result: &ConversionResult) -> Vec<csv::StringRecord> {
    let content = &result.payload().expect("conversion should succeed").file_content;
    let mut reader = csv::Reader::from_reader(content.trim_start_matches('\u{feff}').as_bytes());
    reader.records().map(|record| record.unwrap()).collect()
}

/// 端到端：items 容器 + CSV 輸出
#[test]
fn test_items_document_to_csv_row() -> Result<()> {
    let input = r#"{"items":[{"id":"TC1","title":"Login","steps":["open","submit"]}]}"#;
    let result = convert(input, &csv_options());

    let value = serde_json::to_value(&result)?;
    assert_eq!(value["success"], true);
    assert_eq!(value["metadata"]["test_case_count"], 1);
    assert_eq!(value["metadata"]["output_format"], "csv");
    assert_eq!(value["data"]["file_type"], "text/csv");

    let records = csv_records(&result);
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][0], "TC1");
    assert_eq!(&records[0][1], "Login");
    assert_eq!(&records[0][5], "1. open\n2. submit");
    assert_eq!(&records[0][8], "not executed");
    Ok(())
}

#[test]
fn test_full_test_case_projection() -> Result<()> {
    let input = json!({
        "test_cases": [{
            "case_id": "TC001",
            "name": "User login",
            "category": "Auth",
            "priority": "High",
            "preconditions": "Account exists",
            "steps": [
                {"step": 1, "action": "Open login page", "expected": "Page shown"},
                {"step": 2, "action": "Enter credentials", "expected": "Accepted"}
            ],
            "expected": ["Dashboard shown", "Welcome banner"],
            "test_data": {"username": "a", "password": "b"},
            "status": "passed",
            "author": "qa",
            "created_date": "2024-05-01",
            "remarks": "smoke"
        }]
    })
    .to_string();

    let records = csv_records(&convert(&input, &csv_options()));
    let row: Vec<&str> = records[0].iter().collect();

    assert_eq!(
        row,
        vec![
            "TC001",
            "User login",
            "Auth",
            "High",
            "Account exists",
            "1. Open login page\n2. Enter credentials",
            "1. Dashboard shown\n2. Welcome banner",
            "username: a\npassword: b",
            "passed",
            "qa",
            "2024-05-01",
            "smoke",
        ]
    );
    Ok(())
}

#[test]
fn test_bare_array_keeps_every_record() {
    let input = json!([{"id": 1}, {"title": "second"}, {"unrelated": true}]).to_string();
    let result = convert(&input, &csv_options());

    assert_eq!(csv_records(&result).len(), 3);
}

#[test]
fn test_deep_search_through_wrappers() {
    let input = json!({
        "project": {"name_of_project": "demo", "modules": {"auth": {"suite": [{"id": "DEEP"}]}}}
    })
    .to_string();
    let records = csv_records(&convert(&input, &csv_options()));

    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][0], "DEEP");
}

#[test]
fn test_empty_container_falls_back_to_deep_search() {
    let input = r#"{"test_cases": [], "suite": {"id": "HIDDEN", "title": "still a case"}}"#;
    let result = convert(input, &csv_options());

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["metadata"]["test_case_count"], 1);
    let records = csv_records(&result);
    assert_eq!(&records[0][0], "HIDDEN");
    assert_eq!(&records[0][1], "still a case");
}

#[test]
fn test_invalid_json_never_panics() {
    for input in ["{not json", "", "[1, 2", "\"unterminated"] {
        let result = convert(input, &ConvertOptions::default());
        assert!(!result.is_success(), "input {:?} should fail", input);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["error"].is_string());
        assert!(value.get("data").is_none());
    }
}

#[test]
fn test_non_object_record_fails_without_partial_output() {
    let result = convert(r#"{"cases": [{"id": "ok"}, 5]}"#, &csv_options());

    assert!(!result.is_success());
    assert!(result.payload().is_none());
}

#[test]
fn test_characters_excel_cannot_store_fail_the_export() {
    for input in [
        r#"[{"id": "TC1", "title": "bad\uffffchar"}]"#,
        r#"[{"id": "TC1", "title": "bell\u0001"}]"#,
    ] {
        let result = convert(input, &ConvertOptions::default());

        assert!(!result.is_success(), "input {} should fail", input);
        assert!(result.payload().is_none());
        assert!(result.error().unwrap().contains("cannot be stored in an Excel cell"));
    }

    // CSV 可以保存這些字元
    let result = convert(r#"[{"id": "TC1", "title": "bell\u0001"}]"#, &csv_options());
    assert_eq!(&csv_records(&result)[0][1], "bell\u{1}");
}

#[test]
fn test_excel_workbook_round_trip() -> Result<()> {
    let options = ConvertOptions {
        filename: "login_suite".to_string(),
        locale: Locale::Zh,
        ..ConvertOptions::default()
    };
    let input = json!({"cases": [{"id": "TC1", "title": "登录", "steps": ["打开登录页面"]}]}).to_string();
    let result = convert(&input, &options);

    let payload = result.payload().expect("excel conversion should succeed");
    assert_eq!(payload.filename, "login_suite.xlsx");
    assert_eq!(payload.file_type, XLSX_MIME);
    assert!(payload.preview.contains("总行数: 1"));
    assert!(payload.preview.contains("  - 用例ID"));

    let bytes = payload.decoded_bytes()?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;
    let mut sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")?
        .read_to_string(&mut sheet)?;

    assert!(sheet.contains("用例ID"));
    assert!(sheet.contains("1. 打开登录页面"));
    assert!(sheet.contains("未执行"));
    Ok(())
}

#[test]
fn test_file_input_and_tool_execute() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input_path = temp_dir.path().join("cases.json");
    std::fs::write(&input_path, r#"{"testCases": [{"id": "FILE-1"}, {"id": "FILE-2"}]}"#)?;

    let result = tool::execute(&json!({
        "json_input": input_path.to_str().unwrap(),
        "output_format": "csv"
    }));

    let records = csv_records(&result);
    assert_eq!(records.len(), 2);
    assert_eq!(&records[1][0], "FILE-2");
    Ok(())
}
