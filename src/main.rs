use clap::Parser;
use testcase_export::app::tool;
use testcase_export::config::cli::{Command, ConvertArgs, UsageArgs};
use testcase_export::core::usage::UsageAccumulator;
use testcase_export::domain::ports::Storage;
use testcase_export::utils::{logger, validation::Validate};
use testcase_export::{CliArgs, ConvertError, Converter, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let outcome = match args.command {
        Command::Convert(convert_args) => run_convert(convert_args).await,
        Command::Manifest => {
            println!("{}", serde_json::to_string_pretty(&tool::descriptor())?);
            Ok(())
        }
        Command::Usage(usage_args) => run_usage(usage_args).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?})",
            e,
            e.category()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run_convert(args: ConvertArgs) -> Result<(), ConvertError> {
    let config = args.resolve_config()?;
    config.validate()?;
    tracing::debug!("Resolved configuration: {:?}", config);

    let converter = Converter::new(config.convert.clone());
    let output = match converter.convert(&args.input) {
        Ok(output) => output,
        Err(e) => {
            if args.print_result {
                let failure = testcase_export::ConversionResult::failure(&e, config.convert.locale);
                println!("{}", serde_json::to_string_pretty(&failure)?);
            }
            return Err(e);
        }
    };

    let bytes = output.payload.decoded_bytes()?;
    let storage = LocalStorage::new(config.output_dir().to_string());
    storage.write_file(&output.payload.filename, &bytes).await?;
    let written = storage.full_path(&output.payload.filename);

    tracing::info!("✅ Conversion completed successfully!");
    tracing::info!("📁 Output saved to: {}", written.display());

    if args.print_result {
        let result = converter.success(output);
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("✅ Converted {} test cases", output.test_case_count);
        println!("📁 Output saved to: {}", written.display());
        println!("{}", output.payload.preview);
    }

    Ok(())
}

async fn run_usage(args: UsageArgs) -> Result<(), ConvertError> {
    let storage = LocalStorage::new(".".to_string());
    let data = storage.read_file(&args.responses).await?;

    let accumulator = UsageAccumulator::new();
    let recorded = accumulator.record_lines(data.as_slice())?;
    tracing::info!("📊 Recorded {} responses", recorded);

    println!("{}", serde_json::to_string_pretty(&accumulator.snapshot())?);
    Ok(())
}
