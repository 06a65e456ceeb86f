use clap::Parser;
use tow_billing::utils::{logger, validation::Validate};
use tow_billing::{CliConfig, ConversionEngine, ConversionError, ConversionSummary};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting tow-billing CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(&config) {
        let conversion_error = e.downcast_ref::<ConversionError>();

        tracing::error!("❌ Conversion failed: {:#}", e);
        eprintln!("❌ {:#}", e);

        // 根據錯誤類別決定退出碼
        let exit_code = match conversion_error {
            Some(err) => {
                tracing::error!("Category: {:?}", err.category());
                eprintln!("💡 Suggestion: {}", err.recovery_suggestion());
                err.exit_code()
            }
            None => 3,
        };
        std::process::exit(exit_code);
    }
}

fn run(config: &CliConfig) -> anyhow::Result<()> {
    // 驗證配置
    config.validate()?;

    let outputs = config.output_paths();
    outputs.ensure_available(config.overwrite)?;

    let options = config.conversion_options()?;
    tracing::info!(
        "Invoice date {}, due {}",
        options.dates.invoice_date,
        options.dates.due_date
    );

    let engine = ConversionEngine::new(options);
    let (member, vendor) = engine.convert_all(
        &config.input,
        &outputs.member_invoice,
        &outputs.vendor_bill,
        config.overwrite,
    )?;

    print_summary("Member invoice", &member);
    print_summary("Vendor bill", &vendor);
    Ok(())
}

fn print_summary(label: &str, summary: &ConversionSummary) {
    tracing::info!(
        "✅ {} saved to {} ({} lines, {})",
        label,
        summary.output.display(),
        summary.lines,
        summary.total
    );
    println!(
        "📁 {}: {} ({} lines, total {})",
        label,
        summary.output.display(),
        summary.lines,
        summary.total
    );
}
