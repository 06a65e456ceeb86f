pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use crate::app::derivers::BillingDates;
    use crate::config::cli::OutputPaths;
    use crate::config::toml_config::RateConfig;
    use crate::core::etl::ConversionOptions;
    use crate::core::writer::RowLayout;
    use crate::utils::error::{ConversionError, Result};
    use crate::utils::validation::Validate;
    use chrono::NaiveDate;
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "tow-billing")]
    #[command(about = "Convert a tow ticket export into member invoice and vendor bill CSV files")]
    pub struct CliConfig {
        /// Tow ticket CSV exported from the dispatch system
        pub input: PathBuf,

        #[arg(long, help = "Replace existing output files")]
        pub overwrite: bool,

        #[arg(long, help = "Directory for the output files (default: next to the input)")]
        pub output_dir: Option<PathBuf>,

        #[arg(long, help = "TOML file with vendor rates, glider hourly rates and payment terms")]
        pub rates: Option<PathBuf>,

        #[arg(long, help = "Invoice and bill date, YYYY-MM-DD (default: today)")]
        pub invoice_date: Option<NaiveDate>,

        #[arg(long, help = "Group output rows by payee")]
        pub group_by_payee: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        pub fn output_paths(&self) -> OutputPaths {
            OutputPaths::for_input(&self.input, self.output_dir.as_deref())
        }

        pub fn rate_config(&self) -> Result<RateConfig> {
            let rates = match &self.rates {
                Some(path) => RateConfig::from_file(path)?,
                None => RateConfig::default(),
            };
            rates.validate()?;
            Ok(rates)
        }

        pub fn layout(&self) -> RowLayout {
            if self.group_by_payee {
                RowLayout::GroupedByPayee
            } else {
                RowLayout::InputOrder
            }
        }

        /// 唯一讀取系統時鐘的地方
        pub fn billing_dates(&self, rates: &RateConfig) -> BillingDates {
            let invoice_date = self
                .invoice_date
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            BillingDates::with_terms(invoice_date, rates.billing.due_days)
        }

        pub fn conversion_options(&self) -> Result<ConversionOptions> {
            let rates = self.rate_config()?;
            let dates = self.billing_dates(&rates);
            Ok(ConversionOptions::new(dates)
                .with_rates(rates)
                .with_layout(self.layout()))
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if self.input.as_os_str().is_empty() {
                return Err(ConversionError::Config {
                    message: "input file path is empty".to_string(),
                });
            }
            if let Some(dir) = &self.output_dir {
                if !dir.is_dir() {
                    return Err(ConversionError::Config {
                        message: format!("output directory {} does not exist", dir.display()),
                    });
                }
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn parse(args: &[&str]) -> CliConfig {
            CliConfig::try_parse_from(std::iter::once("tow-billing").chain(args.iter().copied()))
                .unwrap()
        }

        #[test]
        fn test_defaults() {
            let config = parse(&["tickets.csv"]);
            assert!(!config.overwrite);
            assert_eq!(config.layout(), RowLayout::InputOrder);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_invoice_date_and_terms() {
            let config = parse(&["tickets.csv", "--invoice-date", "2024-06-30", "--group-by-payee"]);
            let dates = config.billing_dates(&RateConfig::default());
            assert_eq!(dates.invoice_date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
            assert_eq!(dates.due_date, NaiveDate::from_ymd_opt(2024, 7, 30).unwrap());
            assert_eq!(config.layout(), RowLayout::GroupedByPayee);
        }

        #[test]
        fn test_bad_invoice_date_is_rejected() {
            let result = CliConfig::try_parse_from(["tow-billing", "t.csv", "--invoice-date", "06/30/2024"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_missing_output_dir_is_config_error() {
            let config = parse(&["t.csv", "--output-dir", "/definitely/not/here"]);
            assert!(matches!(config.validate(), Err(ConversionError::Config { .. })));
            assert_eq!(config.validate().unwrap_err().exit_code(), 4);
        }

        #[test]
        fn test_missing_rates_file() {
            let config = parse(&["t.csv", "--rates", "/definitely/not/rates.toml"]);
            assert!(matches!(config.rate_config(), Err(ConversionError::FileRead { .. })));
        }
    }
}
