use anyhow::Result;
use std::io::Read;
use tempfile::TempDir;
use testcase_export::domain::ports::Storage;
use testcase_export::{Converter, LocalStorage, TomlConfig};

/// 依 TOML 配置轉換並寫入輸出目錄
#[tokio::test]
async fn test_convert_and_write_with_toml_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_dir = temp_dir.path().join("exports");
    let normalized_path = output_dir.to_str().unwrap().replace('\\', "/");

    let config = TomlConfig::from_toml_str(&format!(
        r#"
[convert]
output_format = "excel"
include_styling = true
filename = "nightly"

[output]
dir = "{}"
"#,
        normalized_path
    ))?;

    let converter = Converter::new(config.convert.clone());
    let output = converter.convert(r#"[{"id": "N1", "title": "nightly smoke"}]"#)?;

    let storage = LocalStorage::new(config.output_dir().to_string());
    storage
        .write_file(&output.payload.filename, &output.payload.decoded_bytes()?)
        .await?;

    let written = output_dir.join("nightly.xlsx");
    assert!(written.exists());

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&written)?)?;
    let mut sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")?
        .read_to_string(&mut sheet)?;
    assert!(sheet.contains("nightly smoke"));
    assert!(sheet.contains("<cols>"));
    Ok(())
}

#[tokio::test]
async fn test_csv_file_keeps_bom() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

    let config = TomlConfig::from_toml_str("[convert]\noutput_format = \"csv\"\n")?;
    let output = Converter::new(config.convert).convert(r#"{"items": [{"id": "B1"}]}"#)?;
    storage
        .write_file(&output.payload.filename, &output.payload.decoded_bytes()?)
        .await?;

    let bytes = storage.read_file("test_cases.csv").await?;
    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
    Ok(())
}
